use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// The backend answered with an envelope whose code is not 200
    #[error("Backend returned code {code}: {}", message.as_deref().unwrap_or("no message"))]
    Backend { code: i64, message: Option<String> },

    /// The backend answered with a non-2xx HTTP status
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Network failure, timeout or invalid request
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body was not a valid envelope
    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Input rejected before any request was issued
    #[error("{message}")]
    Validation { message: String },

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// True for failures where the backend understood the request and refused it.
    pub fn is_backend(&self) -> bool {
        matches!(self, Error::Backend { .. } | Error::Validation { .. })
    }

    /// Returns the message shown to the operator.
    ///
    /// Backend refusals carry the server's own message when it has one. Transport-level
    /// failures never leak internals and use `fallback` instead.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Error::Backend {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            Error::Validation { message } => message.clone(),
            _ => fallback.to_string(),
        }
    }

    /// Log the error at a level that matches its kind.
    pub(crate) fn log(&self, operation: &str) {
        match self {
            Error::Backend { .. } | Error::Http { .. } => {
                tracing::warn!(operation, error = %self, "Backend rejected request");
            }
            Error::Validation { .. } => {
                tracing::debug!(operation, error = %self, "Request rejected by validation");
            }
            Error::Transport(_) | Error::Decode(_) | Error::Other(_) => {
                tracing::error!(operation, error = %self, "Request failed");
            }
        }
    }
}

/// Type alias for console operation results
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_message_is_preferred() {
        let err = Error::Backend {
            code: 400,
            message: Some("description too long".to_string()),
        };
        assert_eq!(err.user_message("Failed to create API key"), "description too long");
        assert!(err.is_backend());
    }

    #[test]
    fn blank_backend_message_uses_fallback() {
        let err = Error::Backend {
            code: 500,
            message: Some("  ".to_string()),
        };
        assert_eq!(err.user_message("Failed to load projects"), "Failed to load projects");

        let err = Error::Backend { code: 500, message: None };
        assert_eq!(err.user_message("Failed to load projects"), "Failed to load projects");
    }

    #[test]
    fn transport_errors_never_leak_details() {
        let err = Error::Http {
            status: 502,
            body: "<html>upstream exploded</html>".to_string(),
        };
        assert_eq!(err.user_message("Failed to load API keys"), "Failed to load API keys");
        assert!(!err.is_backend());
    }
}
