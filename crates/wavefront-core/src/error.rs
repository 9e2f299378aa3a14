use thiserror::Error;

/// Errors surfaced by Wavefront operations.
///
/// None of these are retried internally; every variant propagates to the
/// invocation result with its message intact.
#[derive(Debug, Error)]
pub enum WavefrontError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: String, id: String },

    #[error("Authentication failed (HTTP {status}): {message}")]
    Auth { status: u16, message: String },

    #[error("Upstream error (HTTP {status}): {message}")]
    Upstream { status: u16, message: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Failed to reach Wavefront API: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to decode API response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid endpoint URL: {0}")]
    InvalidEndpoint(#[from] url::ParseError),
}

impl WavefrontError {
    /// Create a new NotFound error
    pub fn not_found(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: kind.into(),
            id: id.into(),
        }
    }

    /// Create a new InvalidArgument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Get error category for logging and result records
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::Auth { .. } => ErrorCategory::Auth,
            Self::Upstream { .. } | Self::Decode(_) => ErrorCategory::Upstream,
            Self::InvalidArgument(_) | Self::InvalidEndpoint(_) => ErrorCategory::InvalidArgument,
            Self::Transport(_) => ErrorCategory::Transport,
        }
    }
}

/// Error categories matching the operation failure taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    NotFound,
    Auth,
    Upstream,
    InvalidArgument,
    Transport,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::Auth => write!(f, "auth_error"),
            Self::Upstream => write!(f, "upstream_error"),
            Self::InvalidArgument => write!(f, "invalid_argument"),
            Self::Transport => write!(f, "transport_error"),
        }
    }
}

/// Convenience result type for Wavefront operations
pub type Result<T> = std::result::Result<T, WavefrontError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error() {
        let err = WavefrontError::not_found("Source", "app-01");
        assert_eq!(err.to_string(), "Source not found: app-01");
        assert!(err.is_not_found());
        assert_eq!(err.category(), ErrorCategory::NotFound);
    }

    #[test]
    fn test_auth_error() {
        let err = WavefrontError::Auth {
            status: 401,
            message: "invalid token".into(),
        };
        assert_eq!(
            err.to_string(),
            "Authentication failed (HTTP 401): invalid token"
        );
        assert_eq!(err.category(), ErrorCategory::Auth);
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{ nope").unwrap_err();
        let err: WavefrontError = json_err.into();
        assert!(matches!(err, WavefrontError::Decode(_)));
        assert_eq!(err.category(), ErrorCategory::Upstream);
    }

    #[test]
    fn test_url_error_conversion() {
        let url_err = url::Url::parse("not a url").unwrap_err();
        let err: WavefrontError = url_err.into();
        assert_eq!(err.category(), ErrorCategory::InvalidArgument);
    }

    #[test]
    fn test_error_categories_display() {
        assert_eq!(ErrorCategory::NotFound.to_string(), "not_found");
        assert_eq!(ErrorCategory::Auth.to_string(), "auth_error");
        assert_eq!(ErrorCategory::Upstream.to_string(), "upstream_error");
        assert_eq!(ErrorCategory::InvalidArgument.to_string(), "invalid_argument");
        assert_eq!(ErrorCategory::Transport.to_string(), "transport_error");
    }
}
