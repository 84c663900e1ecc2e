// ABOUTME: Error types for the authorization flow
// ABOUTME: Separates usage, configuration, storage, callback, and token exchange failures

use thiserror::Error;

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Usage error: {0}")]
    Usage(String),

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Callback server error: {0}")]
    CallbackServer(String),

    #[error("Timed out after {0:?} waiting for the authorization callback")]
    CallbackTimeout(std::time::Duration),

    #[error("Failed to open browser: {0}")]
    BrowserOpen(String),

    #[error("Token exchange failed: {0}")]
    TokenExchange(String),

    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AuthError {
    /// Whether the caller can fix the problem and call again without side effects
    pub fn is_usage(&self) -> bool {
        matches!(self, AuthError::Usage(_))
    }
}
