//! Error types with client/internal classification.

/// Error type for docaccess operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // Resolution errors
    #[error("Security error")]
    Security,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // Collaborator errors
    #[error("Account directory error: {0}")]
    Directory(String),

    // Data errors
    #[error("Corrupt record: {0}")]
    Corrupt(String),

    // Config errors
    #[error("Configuration error: {0}")]
    Config(String),

    // System errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] libsql::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether the caller can act on this error (bad principal, missing
    /// document, meaningless request) as opposed to a backend failure.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::Security | Error::NotFound(_) | Error::InvalidArgument(_)
        )
    }

    /// Message safe to hand to an outer surface.
    ///
    /// Internal errors are logged and replaced by a generic message so that
    /// SQL fragments, file paths and collaborator details stay server-side.
    pub fn public_message(&self) -> String {
        if self.is_client_error() {
            self.to_string()
        } else {
            tracing::error!("Internal error: {self}");
            "Internal error".to_string()
        }
    }
}

/// Result type alias using docaccess's Error.
pub type Result<T> = std::result::Result<T, Error>;
