//! Error types for vidqa.

use thiserror::Error;

/// Library-level error type for vidqa operations.
#[derive(Error, Debug)]
pub enum VidqaError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// The hosted embedding service failed or returned nothing usable.
    #[error("Embedding service error: {0}")]
    Embedding(String),

    /// The hosted vector database failed or returned a malformed response.
    #[error("Search service error: {0}")]
    Search(String),

    /// The hosted chat-completion service failed or returned no content.
    #[error("Chat service error: {0}")]
    Chat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl VidqaError {
    /// Whether this error came from one of the hosted services.
    pub fn is_service_error(&self) -> bool {
        matches!(
            self,
            VidqaError::Embedding(_) | VidqaError::Search(_) | VidqaError::Chat(_)
        )
    }
}

/// Result type alias for vidqa operations.
pub type Result<T> = std::result::Result<T, VidqaError>;
