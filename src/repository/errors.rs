use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Failures of a request against the REST backend.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    /// No response was received.
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response carrying an error payload.
    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },

    /// The backend rejected the request parameters or body.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The response body did not have the expected shape.
    #[error("Malformed response: {0}")]
    Decode(String),

    /// The owning view was unmounted before the request finished.
    #[error("Request cancelled")]
    Cancelled,
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Deserialize)]
struct ErrorPayload {
    detail: Value,
}

impl ApiError {
    /// Builds the error for a non-2xx response from its status and body.
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = error_message(body).unwrap_or_else(|| {
            let body = body.trim();
            if body.is_empty() {
                format!("HTTP {status}")
            } else {
                body.to_string()
            }
        });

        match status {
            400 | 422 => ApiError::Validation(message),
            _ => ApiError::Server { status, message },
        }
    }

    /// Network failures and gateway errors are worth retrying for
    /// idempotent requests.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ApiError::Network(_)
                | ApiError::Server {
                    status: 502..=504,
                    ..
                }
        )
    }
}

/// Extracts `detail` from `{"detail": "..."}` or `{"detail": [{"msg": ...}]}`.
fn error_message(body: &str) -> Option<String> {
    let payload: ErrorPayload = serde_json::from_str(body).ok()?;
    match payload.detail {
        Value::String(detail) => Some(detail),
        Value::Array(errors) => {
            let messages: Vec<String> = errors
                .iter()
                .filter_map(|error| {
                    let msg = error.get("msg")?.as_str()?;
                    let field = error
                        .get("loc")
                        .and_then(Value::as_array)
                        .and_then(|loc| loc.last())
                        .and_then(Value::as_str);
                    Some(match field {
                        Some(field) => format!("{field}: {msg}"),
                        None => msg.to_string(),
                    })
                })
                .collect();
            (!messages.is_empty()).then(|| messages.join("; "))
        }
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_string_becomes_the_message() {
        let err = ApiError::from_response(404, r#"{"detail": "Config not found"}"#);
        assert_eq!(
            err,
            ApiError::Server {
                status: 404,
                message: "Config not found".into()
            }
        );
        assert!(!err.is_transient());
    }

    #[test]
    fn unprocessable_entity_lists_field_errors() {
        let body = r#"{"detail": [
            {"loc": ["query", "page_size"], "msg": "ensure this value is less than or equal to 100"}
        ]}"#;
        assert_eq!(
            ApiError::from_response(422, body),
            ApiError::Validation(
                "page_size: ensure this value is less than or equal to 100".into()
            )
        );
    }

    #[test]
    fn gateway_errors_are_transient() {
        assert!(ApiError::from_response(503, "").is_transient());
        assert!(ApiError::Network("connection refused".into()).is_transient());
        assert!(!ApiError::from_response(500, "boom").is_transient());
        assert!(!ApiError::Decode("bad".into()).is_transient());
    }
}
