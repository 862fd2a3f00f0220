pub mod anthropic;
pub mod openai;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::config::{CompletionConfig, Provider};
use crate::error::{AppError, Result};

/// A single-turn request to the text generation service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    /// Framing for the model: who it is acting as.
    pub system: String,
    /// The task itself, including the input context.
    pub user: String,
}

/// Opaque text generation: prompt in, text out.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, prompt: &Prompt) -> Result<String>;
}

/// Construct the backend selected by `completion.provider`.
pub fn build_backend(config: &CompletionConfig) -> Result<Arc<dyn CompletionBackend>> {
    let backend: Arc<dyn CompletionBackend> = match config.provider {
        Provider::OpenAi => Arc::new(openai::OpenAiClient::new(config)?),
        Provider::Anthropic => Arc::new(anthropic::AnthropicClient::new(config)?),
    };
    Ok(backend)
}

/// Map a non-success status from a completion API onto the error taxonomy.
///
/// Rate limiting and server errors are transient; credential rejection is
/// an auth failure; everything else is a plain API error.
fn classify_status(service: &str, status: StatusCode, body: &str) -> AppError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            AppError::Auth(format!("{service} returned {status}"))
        }
        StatusCode::TOO_MANY_REQUESTS => {
            AppError::Transport(format!("{service} rate limited: {body}"))
        }
        s if s.is_server_error() => AppError::Transport(format!("{service} returned {status}: {body}")),
        _ => AppError::CompletionApi(format!("{service} returned {status}: {body}")),
    }
}
