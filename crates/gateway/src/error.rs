//! Centralized error-to-HTTP mapping. Every route handler returns
//! `Result<_, ApiError>`; the taxonomy maps onto status codes exactly once,
//! here.

use {
    axum::{
        Json,
        http::StatusCode,
        response::{IntoResponse, Response},
    },
    tracing::error,
};

use {
    tienda_auth::AuthError,
    tienda_protocol::{Envelope, error_codes},
    tienda_store::StoreError,
};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        Self::Internal(e.to_string())
    }
}

/// Stable `(status, code)` pair for a store failure; shared with the
/// realtime error acks.
pub fn store_error_code(err: &StoreError) -> (StatusCode, &'static str) {
    match err {
        StoreError::Validation(_) => (StatusCode::BAD_REQUEST, error_codes::VALIDATION),
        StoreError::NotFound(_) => (StatusCode::NOT_FOUND, error_codes::NOT_FOUND),
        StoreError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, error_codes::STORE),
    }
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Store(err) => store_error_code(err),
            Self::Auth(AuthError::InvalidCredentials) => {
                (StatusCode::UNAUTHORIZED, error_codes::UNAUTHORIZED)
            },
            Self::Auth(AuthError::Forbidden) => (StatusCode::FORBIDDEN, error_codes::FORBIDDEN),
            Self::Auth(AuthError::Store(err)) => store_error_code(err),
            Self::Auth(AuthError::Internal(_)) | Self::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, error_codes::STORE)
            },
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, error_codes::BAD_REQUEST),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        let message = match &self {
            // Do not leak internal detail on 500s.
            Self::Internal(_) | Self::Auth(AuthError::Internal(_)) => {
                "internal server error".to_string()
            },
            Self::Store(StoreError::Database(_))
            | Self::Auth(AuthError::Store(StoreError::Database(_))) => {
                "internal server error".to_string()
            },
            other => other.to_string(),
        };
        (status, Json(Envelope::error(code, message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_expected_statuses() {
        let (status, code) = store_error_code(&StoreError::Validation("x".into()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(code, error_codes::VALIDATION);

        let (status, _) = store_error_code(&StoreError::NotFound("product"));
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn auth_errors_map_to_401_and_403() {
        let (status, _) = ApiError::Auth(AuthError::InvalidCredentials).status_and_code();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (status, _) = ApiError::Auth(AuthError::Forbidden).status_and_code();
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}
