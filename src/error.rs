use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Authentication rejected: {0}")]
    Auth(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Issue tracker API error: {0}")]
    TrackerApi(String),

    #[error("Completion API error: {0}")]
    CompletionApi(String),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl AppError {
    /// Whether a fresh attempt at the same call could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, AppError::Transport(_))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            AppError::UnexpectedResponse(e.to_string())
        } else {
            AppError::Transport(e.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
