//! Signed session cookies: `<sid>.<hex hmac-sha256(sid, secret)>`.
//!
//! The session id alone is an unguessable uuid; the signature additionally
//! rejects cookies minted against a different `SESSION_SECRET`.

use {
    hmac::{Hmac, Mac},
    sha2::Sha256,
};

pub const SESSION_COOKIE: &str = "sid";

type HmacSha256 = Hmac<Sha256>;

fn mac_for(secret: &str) -> anyhow::Result<HmacSha256> {
    HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| anyhow::anyhow!("invalid session secret"))
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Produce the signed cookie value for a session id.
pub fn sign_cookie(session_id: &str, secret: &str) -> anyhow::Result<String> {
    let mut mac = mac_for(secret)?;
    mac.update(session_id.as_bytes());
    Ok(format!("{session_id}.{}", hex(&mac.finalize().into_bytes())))
}

/// Recover the session id from a signed cookie value. Returns `None` for
/// unsigned, malformed, or tampered values — never an error.
pub fn verify_cookie(value: &str, secret: &str) -> Option<String> {
    let (session_id, signature) = value.rsplit_once('.')?;
    if session_id.is_empty() {
        return None;
    }
    let mut mac = mac_for(secret).ok()?;
    mac.update(session_id.as_bytes());
    let expected = hex(&mac.finalize().into_bytes());
    // hex strings are fixed-length; compare without early exit.
    let mismatch = expected
        .bytes()
        .zip(signature.bytes())
        .fold(expected.len() != signature.len(), |acc, (a, b)| {
            acc | (a != b)
        });
    if mismatch { None } else { Some(session_id.to_string()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_cookie_round_trips() {
        let value = sign_cookie("abc-123", "s3cret").unwrap();
        assert_eq!(verify_cookie(&value, "s3cret").as_deref(), Some("abc-123"));
    }

    #[test]
    fn tampered_sid_is_rejected() {
        let value = sign_cookie("abc-123", "s3cret").unwrap();
        let forged = value.replacen("abc-123", "abc-124", 1);
        assert!(verify_cookie(&forged, "s3cret").is_none());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let value = sign_cookie("abc-123", "s3cret").unwrap();
        assert!(verify_cookie(&value, "other").is_none());
    }

    #[test]
    fn malformed_values_are_rejected() {
        assert!(verify_cookie("no-signature", "s3cret").is_none());
        assert!(verify_cookie(".deadbeef", "s3cret").is_none());
        assert!(verify_cookie("", "s3cret").is_none());
    }
}
