use crate::app::session_controller::SessionState;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SwipeError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Non-2xx (other than a listing 404), transport failure or an undecodable body.
    #[error("Upstream error{}: {message}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    Upstream { status: Option<u16>, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    /// A store read or write failed. After a write failure in-memory state has
    /// already been updated.
    #[error("Persistence error for slot '{key}': {message}")]
    Persistence { key: String, message: String },

    #[error("Malformed stored data in slot '{key}': {message}")]
    MalformedStoredData { key: String, message: String },

    #[error("Cannot {action} while {state:?}")]
    InvalidAction {
        action: &'static str,
        state: SessionState,
    },
}

impl SwipeError {
    pub fn upstream(status: Option<u16>, message: impl Into<String>) -> Self {
        SwipeError::Upstream {
            status,
            message: message.into(),
        }
    }

    pub fn persistence(key: &str, message: impl ToString) -> Self {
        SwipeError::Persistence {
            key: key.to_string(),
            message: message.to_string(),
        }
    }

    pub fn is_persistence(&self) -> bool {
        matches!(self, SwipeError::Persistence { .. })
    }
}

pub type Result<T> = std::result::Result<T, SwipeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_message_includes_status_when_known() {
        let err = SwipeError::upstream(Some(502), "bad gateway");
        assert_eq!(err.to_string(), "Upstream error (HTTP 502): bad gateway");

        let err = SwipeError::upstream(None, "connection reset");
        assert_eq!(err.to_string(), "Upstream error: connection reset");
    }

    #[test]
    fn persistence_errors_are_classified() {
        let err = SwipeError::persistence("stats", "disk full");
        assert!(err.is_persistence());
        assert!(!SwipeError::NotFound("7".into()).is_persistence());
    }
}
