//! Common error types and handling for SiteDesk

/// Common result type
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the SiteDesk application
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Get the error code used in logs and CLI output
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Serialization(_) => "SERIALIZATION_ERROR",
            Error::Query(_) => "QUERY_ERROR",
            Error::Authentication(_) => "AUTHENTICATION_ERROR",
            Error::Validation(_) => "VALIDATION_ERROR",
            Error::NotFound(_) => "NOT_FOUND",
            Error::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to show in a toast. Backend detail stays in the logs.
    pub fn user_message(&self) -> String {
        match self {
            Error::Authentication(_) => "Invalid credentials".to_string(),
            Error::Validation(msg) | Error::NotFound(msg) => msg.clone(),
            Error::Query(_) | Error::Serialization(_) | Error::Internal(_) => {
                "Something went wrong. Please try again.".to_string()
            }
        }
    }
}
