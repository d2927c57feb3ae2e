//! Client error types

use reqwest::StatusCode;
use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure, including timeouts
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response, `message` is the server's reason
    #[error("{message}")]
    Status { status: StatusCode, message: String },

    /// 2xx response with a body we could not read
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            ClientError::Http(e) => e.status(),
            _ => None,
        }
    }
}

impl From<ClientError> for domain::Error {
    fn from(err: ClientError) -> Self {
        domain::Error::remote(err.to_string())
    }
}

/// Human-readable reason for a failed response.
///
/// JSON bodies contribute their `message` field, anything else is taken
/// as plain text. Empty or message-less bodies get a generic reason.
pub fn error_reason(status: StatusCode, body: &str) -> String {
    let body = body.trim();

    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::Object(map)) => map
            .get("message")
            .and_then(|m| m.as_str())
            .filter(|m| !m.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| generic_reason(status)),
        Ok(serde_json::Value::String(text)) if !text.trim().is_empty() => text,
        _ if !body.is_empty() => body.to_string(),
        _ => generic_reason(status),
    }
}

fn generic_reason(status: StatusCode) -> String {
    format!("Request failed with status {}", status.as_u16())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reason_prefers_json_message() {
        assert_eq!(
            error_reason(StatusCode::CONFLICT, r#"{"message":"already dispatched","code":409}"#),
            "already dispatched"
        );
    }

    #[test]
    fn reason_falls_back_to_text_then_generic() {
        assert_eq!(
            error_reason(StatusCode::BAD_REQUEST, "pharmacy closed\n"),
            "pharmacy closed"
        );
        assert_eq!(
            error_reason(StatusCode::BAD_GATEWAY, ""),
            "Request failed with status 502"
        );
        assert_eq!(
            error_reason(StatusCode::FORBIDDEN, r#"{"error":"forbidden"}"#),
            "Request failed with status 403"
        );
    }

    #[test]
    fn converts_to_remote_failure_unmodified() {
        let err = ClientError::Status {
            status: StatusCode::CONFLICT,
            message: "already dispatched".to_string(),
        };
        assert_eq!(domain::Error::from(err), domain::Error::remote("already dispatched"));
    }
}
