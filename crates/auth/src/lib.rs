//! Authentication: credential hashing and the session-backed identity
//! gateway. Cookie signing lives in `tienda-sessions`; this crate only sees
//! session ids.

use {
    argon2::{
        Argon2,
        password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
    },
    serde::Serialize,
    tracing::debug,
};

use {
    tienda_sessions::{Session, SessionStore},
    tienda_store::{StoreError, Users},
};

// ── Errors ───────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Unknown email or wrong password; maps to HTTP 401.
    #[error("invalid credentials")]
    InvalidCredentials,
    /// Authenticated but not allowed; maps to HTTP 403.
    #[error("forbidden")]
    Forbidden,
    /// Input problems and store failures keep their own taxonomy.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Hashing or session-store breakage.
    #[error("auth failure: {0}")]
    Internal(String),
}

pub type AuthResult<T> = Result<T, AuthError>;

// ── Identity ─────────────────────────────────────────────────────────────────

/// The authenticated principal attached to a request or connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub user_id: String,
    pub email: String,
    pub role: String,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

// ── Service ──────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct AuthService {
    users: Users,
    sessions: SessionStore,
}

impl AuthService {
    pub fn new(users: Users, sessions: SessionStore) -> Self {
        Self { users, sessions }
    }

    /// Create an account. Password policy is minimal: non-empty.
    pub async fn register(&self, email: &str, password: &str) -> AuthResult<Identity> {
        if password.is_empty() {
            return Err(StoreError::Validation("password must not be empty".into()).into());
        }
        let hash = hash_password(password)?;
        let user = self.users.create(email, &hash, "user").await?;
        debug!(email = %user.email, "account registered");
        Ok(Identity {
            user_id: user.id,
            email: user.email,
            role: user.role,
        })
    }

    /// Verify credentials and open a session.
    pub async fn login(&self, email: &str, password: &str) -> AuthResult<(Identity, Session)> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;
        verify_password(password, &user.password_hash)?;
        let session = self
            .sessions
            .create(&user.id)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?;
        debug!(email = %user.email, "login ok");
        Ok((
            Identity {
                user_id: user.id,
                email: user.email,
                role: user.role,
            },
            session,
        ))
    }

    /// Resolve the identity behind a session id. Absent, expired, or
    /// dangling sessions all come back as `None`, never as an error.
    pub async fn attach(&self, session_id: &str) -> AuthResult<Option<Identity>> {
        let Some(session) = self
            .sessions
            .get(session_id)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
        else {
            return Ok(None);
        };
        match self.users.find_by_id(&session.user_id).await? {
            Some(user) => Ok(Some(Identity {
                user_id: user.id,
                email: user.email,
                role: user.role,
            })),
            None => {
                // Account deleted out from under a live session.
                self.sessions
                    .destroy(session_id)
                    .await
                    .map_err(|e| AuthError::Internal(e.to_string()))?;
                Ok(None)
            },
        }
    }

    /// Destroy the session behind a session id, if any.
    pub async fn logout(&self, session_id: &str) -> AuthResult<()> {
        self.sessions
            .destroy(session_id)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))
    }
}

// ── Password hashing ─────────────────────────────────────────────────────────

fn hash_password(password: &str) -> AuthResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AuthError::Internal(e.to_string()))
}

fn verify_password(password: &str, hash: &str) -> AuthResult<()> {
    let parsed = PasswordHash::new(hash).map_err(|e| AuthError::Internal(e.to_string()))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
mod tests {
    use {super::*, tienda_store::connect};

    async fn service() -> AuthService {
        let pool = connect("sqlite::memory:").await.unwrap();
        let sessions = SessionStore::init(pool.clone()).await.unwrap();
        AuthService::new(Users::new(pool), sessions)
    }

    #[tokio::test]
    async fn register_login_attach_logout_cycle() {
        let auth = service().await;
        auth.register("ana@example.com", "hunter2").await.unwrap();
        let (identity, session) = auth.login("ana@example.com", "hunter2").await.unwrap();
        assert_eq!(identity.email, "ana@example.com");

        let attached = auth.attach(&session.id).await.unwrap().unwrap();
        assert_eq!(attached, identity);

        auth.logout(&session.id).await.unwrap();
        assert!(auth.attach(&session.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn wrong_password_is_invalid_credentials() {
        let auth = service().await;
        auth.register("ana@example.com", "hunter2").await.unwrap();
        assert!(matches!(
            auth.login("ana@example.com", "wrong").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login("nobody@example.com", "hunter2").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn duplicate_registration_is_validation_error() {
        let auth = service().await;
        auth.register("ana@example.com", "hunter2").await.unwrap();
        assert!(matches!(
            auth.register("ana@example.com", "other").await,
            Err(AuthError::Store(StoreError::Validation(_)))
        ));
    }

    #[tokio::test]
    async fn attach_unknown_session_is_none() {
        let auth = service().await;
        assert!(auth.attach("missing").await.unwrap().is_none());
    }
}
