/// Custom error type for notifier operations
#[derive(Debug, thiserror::Error)]
pub enum NotifierError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("GitHub fetch failed for commit {sha}: {message}")]
    Fetch { sha: String, message: String },

    #[error("Malformed GitHub response for commit {sha}: {message}")]
    MalformedResponse { sha: String, message: String },

    #[error("Mail delivery failed: {0}")]
    Delivery(String),
}

/// Helper type for Results that use NotifierError
pub type Result<T> = std::result::Result<T, NotifierError>;
