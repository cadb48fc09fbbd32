use {serde::Serialize, serde_json::Value};

/// Application-level HTTP response envelope: `{status, payload}` on success,
/// `{status, error}` on failure.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Envelope {
    Success { payload: Value },
    Error { error: Value },
}

impl Envelope {
    pub fn success(payload: impl Serialize) -> Self {
        Self::Success {
            payload: serde_json::json!(payload),
        }
    }

    pub fn error(code: &str, message: impl Into<String>) -> Self {
        Self::Error {
            error: serde_json::json!({
                "code": code,
                "message": message.into(),
            }),
        }
    }
}
