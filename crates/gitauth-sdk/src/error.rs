use reqwest::StatusCode;
use thiserror::Error;

/// Unified error type for git auth operations
#[derive(Error, Debug)]
pub enum GitAuthError {
    /// The request never produced an HTTP response (connection, timeout, TLS).
    #[error("transport error: {0}")]
    Transport(String),

    /// Any non-success HTTP outcome, carrying the server's message verbatim.
    #[error("{}", provider_display(.message, .detail))]
    Provider {
        status: u16,
        message: String,
        detail: Option<String>,
    },

    /// A success status whose body could not be decoded. The parser detail is kept for logs only.
    #[error("unexpected response from server")]
    Decode(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

fn provider_display(message: &str, detail: &Option<String>) -> String {
    match detail {
        Some(detail) if !detail.is_empty() => format!("{}: {}", message, detail),
        _ => message.to_string(),
    }
}

impl GitAuthError {
    pub(crate) fn provider(status: StatusCode, message: impl Into<String>, detail: Option<String>) -> Self {
        GitAuthError::Provider {
            status: status.as_u16(),
            message: message.into(),
            detail,
        }
    }

    /// HTTP status of a provider error
    pub fn status(&self) -> Option<u16> {
        match self {
            GitAuthError::Provider { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND.as_u16())
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, GitAuthError::Transport(_))
    }
}

impl From<reqwest::Error> for GitAuthError {
    fn from(e: reqwest::Error) -> Self {
        GitAuthError::Transport(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GitAuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_display_is_verbatim() {
        let err = GitAuthError::provider(StatusCode::BAD_REQUEST, "Device code is pending.", None);
        assert_eq!(err.to_string(), "Device code is pending.");

        let err = GitAuthError::provider(
            StatusCode::NOT_FOUND,
            "Resource not found",
            Some("provider \"gitlab\" is not configured".to_string()),
        );
        assert_eq!(
            err.to_string(),
            "Resource not found: provider \"gitlab\" is not configured"
        );
        assert!(err.is_not_found());
    }

    #[test]
    fn test_decode_hides_parser_detail() {
        let err = GitAuthError::Decode("missing field `user_code` at line 1 column 20".to_string());
        assert_eq!(err.to_string(), "unexpected response from server");
        assert_eq!(err.status(), None);
    }
}
