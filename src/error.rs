use http::StatusCode;
use std::fmt;
use thiserror::Error;

/// Which side of the service an availability check guarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Operation {
    Read,
    Write,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Read => write!(f, "read"),
            Operation::Write => write!(f, "write"),
        }
    }
}

#[derive(Error, Debug, Clone)]
pub enum SearchServiceError {
    #[error("Index {index} unavailable for {operation} operations: {message}")]
    ServiceUnavailable {
        index: String,
        operation: Operation,
        message: String,
    },

    #[error("Resource not found in index {index}: {message}")]
    NotFound { index: String, message: String },

    #[error("Unsupported target index: only {expected} is supported, got {actual}")]
    UnsupportedTarget {
        expected: &'static str,
        actual: String,
    },

    #[error("Connection string error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("JSON error: {0}")]
    Json(String),
}

pub type Result<T> = std::result::Result<T, SearchServiceError>;

impl From<serde_json::Error> for SearchServiceError {
    fn from(e: serde_json::Error) -> Self {
        SearchServiceError::Json(e.to_string())
    }
}

impl SearchServiceError {
    pub fn unavailable(
        index: impl Into<String>,
        operation: Operation,
        message: impl Into<String>,
    ) -> Self {
        SearchServiceError::ServiceUnavailable {
            index: index.into(),
            operation,
            message: message.into(),
        }
    }

    pub fn not_found(index: impl Into<String>, message: impl Into<String>) -> Self {
        SearchServiceError::NotFound {
            index: index.into(),
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, SearchServiceError::NotFound { .. })
    }

    /// Transient kinds a caller may reasonably try again later.
    ///
    /// The service itself never retries these; only a single not-found
    /// recovery is performed inside `post_documents`.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SearchServiceError::ServiceUnavailable { .. })
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            SearchServiceError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            SearchServiceError::NotFound { .. } => StatusCode::NOT_FOUND,
            SearchServiceError::UnsupportedTarget { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            SearchServiceError::Connection(_) => StatusCode::BAD_REQUEST,
            SearchServiceError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            SearchServiceError::Transport(_) => StatusCode::BAD_GATEWAY,
            SearchServiceError::Schema(_) => StatusCode::INTERNAL_SERVER_ERROR,
            SearchServiceError::Json(_) => StatusCode::BAD_REQUEST,
        }
    }
}
