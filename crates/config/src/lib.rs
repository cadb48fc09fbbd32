//! Environment configuration.
//!
//! Required values are checked once at startup; a missing `DATABASE_URL` or
//! `SESSION_SECRET` aborts the process before anything is bound or connected.

use tracing::debug;

pub const DEFAULT_PORT: u16 = 8080;

/// Resolved process configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub session_secret: String,
}

impl Config {
    /// Read configuration from the process environment. Fails fast on any
    /// missing required value or malformed `PORT`.
    pub fn from_env() -> anyhow::Result<Self> {
        let cfg = Self::from_lookup(|name| std::env::var(name).ok())?;
        debug!(port = cfg.port, "configuration loaded");
        Ok(cfg)
    }

    /// Resolve configuration through an arbitrary lookup (tests pass a map
    /// instead of touching the process environment).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| anyhow::anyhow!("PORT is not a valid port number: {raw:?}"))?,
            None => DEFAULT_PORT,
        };
        let database_url = required(&lookup, "DATABASE_URL")?;
        let session_secret = required(&lookup, "SESSION_SECRET")?;
        Ok(Self {
            port,
            database_url,
            session_secret,
        })
    }
}

fn required(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> anyhow::Result<String> {
    match lookup(name) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => anyhow::bail!("{name} is not defined in the environment"),
    }
}

#[cfg(test)]
mod tests {
    use {super::*, std::collections::HashMap};

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn missing_database_url_fails() {
        let err = Config::from_lookup(env(&[("SESSION_SECRET", "s3cret")])).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn missing_session_secret_fails() {
        let err =
            Config::from_lookup(env(&[("DATABASE_URL", "sqlite::memory:")])).unwrap_err();
        assert!(err.to_string().contains("SESSION_SECRET"));
    }

    #[test]
    fn empty_required_value_is_missing() {
        let err = Config::from_lookup(env(&[
            ("DATABASE_URL", ""),
            ("SESSION_SECRET", "s3cret"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn port_defaults_to_8080() {
        let cfg = Config::from_lookup(env(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("SESSION_SECRET", "s3cret"),
        ]))
        .unwrap();
        assert_eq!(cfg.port, DEFAULT_PORT);
    }

    #[test]
    fn bad_port_is_rejected() {
        let err = Config::from_lookup(env(&[
            ("PORT", "not-a-port"),
            ("DATABASE_URL", "sqlite::memory:"),
            ("SESSION_SECRET", "s3cret"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }
}
