use serde::Deserialize;
use std::collections::HashMap;

use crate::error::{AppError, Result};

/// Flat variable names set by the automation runner, mapped onto config keys.
const RUNNER_ENV_OVERRIDES: &[(&str, &str)] = &[
    ("batch.ticket_ids", "JIRA_TICKET_IDS"),
    ("jira.base_url", "JIRA_BASE_URL"),
    ("jira.email", "JIRA_USER_EMAIL"),
    ("jira.api_token", "JIRA_API_TOKEN"),
    ("completion.api_key", "OPENAI_API_KEY"),
];

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub batch: BatchConfig,
    pub jira: JiraConfig,
    pub completion: CompletionConfig,
    #[serde(default)]
    pub retry: RetryConfig,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct BatchConfig {
    /// Comma-separated ticket identifiers.
    pub ticket_ids: Option<String>,
}

#[derive(Deserialize, Clone)]
pub struct JiraConfig {
    pub base_url: String,
    pub email: String,
    pub api_token: String,
    #[serde(default = "default_jira_timeout_secs")]
    pub timeout_secs: u64,
}

// Manual Debug impl to avoid leaking the API token
impl std::fmt::Debug for JiraConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JiraConfig")
            .field("base_url", &self.base_url)
            .field("email", &self.email)
            .field("api_token", &"[REDACTED]")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    OpenAi,
    Anthropic,
}

#[derive(Deserialize, Clone)]
pub struct CompletionConfig {
    #[serde(default)]
    pub provider: Provider,
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_completion_timeout_secs")]
    pub timeout_secs: u64,
    /// Endpoint override; defaults to the provider's public API.
    pub base_url: Option<String>,
}

// Manual Debug impl to avoid leaking the API key
impl std::fmt::Debug for CompletionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionConfig")
            .field("provider", &self.provider)
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetryConfig {
    #[serde(default)]
    pub transport_retries: u32,
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            transport_retries: 0,
            backoff_ms: default_backoff_ms(),
        }
    }
}

fn default_jira_timeout_secs() -> u64 {
    10
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

fn default_max_tokens() -> u32 {
    2048
}

fn default_completion_timeout_secs() -> u64 {
    120
}

fn default_backoff_ms() -> u64 {
    500
}

impl AppConfig {
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        Self::load_with_env(config_path, std::env::vars().collect())
    }

    /// Load against an explicit environment snapshot.
    pub fn load_with_env(config_path: Option<&str>, env: HashMap<String, String>) -> Result<Self> {
        let mut builder = config::Config::builder();

        // Load from file if specified
        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        } else {
            builder = builder.add_source(config::File::with_name("qaplan").required(false));
        }

        // Environment variable overrides with QAPLAN_ prefix
        builder = builder.add_source(
            config::Environment::with_prefix("QAPLAN")
                .separator("__")
                .try_parsing(true)
                .source(Some(env.clone())),
        );

        for (key, var) in RUNNER_ENV_OVERRIDES {
            builder = builder
                .set_override_option(*key, env.get(*var).cloned())
                .map_err(|e| AppError::Config(e.to_string()))?;
        }

        let config: AppConfig = builder
            .build()
            .map_err(|e| AppError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| AppError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let base = self.jira.base_url.trim();
        if !(base.starts_with("https://") || base.starts_with("http://")) {
            return Err(AppError::Config(format!(
                "jira.base_url must be an http(s) URL, got {base:?}"
            )));
        }
        if self.jira.email.trim().is_empty() || self.jira.api_token.trim().is_empty() {
            return Err(AppError::Config(
                "jira.email and jira.api_token must be non-empty".to_string(),
            ));
        }
        if self.completion.api_key.trim().is_empty() {
            return Err(AppError::Config("completion.api_key must be non-empty".to_string()));
        }
        Ok(())
    }
}
