//! The `{statusCode, body}` envelope returned by every action.

use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;

/// Result of a proxy action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl ActionResponse {
    /// 200 with a JSON body.
    pub fn ok(body: Value) -> Self {
        Self {
            status_code: 200,
            body: Some(body),
        }
    }

    /// 404 without a body.
    pub fn not_found() -> Self {
        Self {
            status_code: 404,
            body: None,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// Error message carried in the body, if any.
    pub fn error_message(&self) -> Option<&str> {
        self.body
            .as_ref()
            .and_then(|b| b.get("error"))
            .and_then(Value::as_str)
    }
}

/// Build an error envelope `{statusCode, body: {error}}` and log it.
pub fn error_response(status_code: u16, message: impl Into<String>) -> ActionResponse {
    let message = message.into();
    info!(status = status_code, "{}: {}", status_code, message);
    ActionResponse {
        status_code,
        body: Some(json!({ "error": message })),
    }
}
