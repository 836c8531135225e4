//! OpenRouter explanation provider.
//!
//! This module provides the [`OpenRouterProvider`] which implements the
//! [`ExplanationProvider`] trait for the OpenRouter chat-completions API
//! (<https://openrouter.ai/>).

use super::ExplanationProvider;
use crate::types::Report;
use anyhow::{Result, anyhow};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use tracing::debug;

/// Default OpenRouter API endpoint.
const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Default model when none is configured explicitly.
const DEFAULT_MODEL: &str = "deepseek/deepseek-chat";

/// Default timeout for API requests in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default temperature for model responses.
const DEFAULT_TEMPERATURE: f32 = 0.2;

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";

/// Environment variable holding the model name.
pub const MODEL_ENV: &str = "OPENROUTER_MODEL";

#[derive(Debug, Serialize)]
struct OpenRouterRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenRouterResponse {
    choices: Option<Vec<Choice>>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<Message>,
}

impl OpenRouterResponse {
    /// Content of the first choice's message.
    fn into_content(self) -> Result<String> {
        self.choices
            .and_then(|choices| choices.into_iter().next())
            .and_then(|choice| choice.message)
            .map(|msg| msg.content)
            .ok_or_else(|| anyhow!("No response content from OpenRouter API"))
    }
}

/// Configuration for the OpenRouter provider.
#[derive(Debug, Clone)]
pub struct OpenRouterConfig {
    /// The model to use (e.g., "deepseek/deepseek-chat", "openai/gpt-4o").
    pub model: String,
    /// Temperature for response generation (0.0 - 2.0).
    pub temperature: f32,
    /// Maximum tokens in the response; the API default applies when unset.
    pub max_tokens: Option<u32>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Base URL for the API (useful for proxies or custom endpoints).
    pub base_url: String,
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl OpenRouterConfig {
    /// Create a new configuration builder.
    pub fn builder() -> OpenRouterConfigBuilder {
        OpenRouterConfigBuilder::default()
    }
}

/// Builder for [`OpenRouterConfig`].
#[derive(Default)]
pub struct OpenRouterConfigBuilder {
    model: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    timeout_secs: Option<u64>,
    base_url: Option<String>,
}

impl OpenRouterConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = Some(timeout_secs);
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn build(self) -> OpenRouterConfig {
        OpenRouterConfig {
            model: self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: self.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            max_tokens: self.max_tokens,
            timeout_secs: self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            base_url: self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }
}

/// OpenRouter provider that narrates audit reports.
///
/// # Example
///
/// ```rust,ignore
/// use lex_audit::ai::{OpenRouterConfig, OpenRouterProvider};
///
/// // From OPENROUTER_API_KEY / OPENROUTER_MODEL, if both are set
/// let provider = OpenRouterProvider::from_env()?;
///
/// // With explicit configuration
/// let config = OpenRouterConfig::builder()
///     .model("openai/gpt-4o")
///     .timeout_secs(30)
///     .build();
/// let provider = OpenRouterProvider::with_config("your-api-key", config)?;
/// ```
pub struct OpenRouterProvider {
    api_key: String,
    config: OpenRouterConfig,
    client: Client,
}

impl OpenRouterProvider {
    /// Create a provider with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(api_key, OpenRouterConfig::default())
    }

    /// Create a provider with custom configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_config(api_key: impl Into<String>, config: OpenRouterConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| anyhow!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            api_key: api_key.into(),
            config,
            client,
        })
    }

    /// Create a provider from `OPENROUTER_API_KEY` and `OPENROUTER_MODEL`.
    ///
    /// Returns `Ok(None)` when either variable is unset or blank.
    pub fn from_env() -> Result<Option<Self>> {
        let api_key = env::var(API_KEY_ENV).ok().filter(|v| !v.trim().is_empty());
        let model = env::var(MODEL_ENV).ok().filter(|v| !v.trim().is_empty());

        match (api_key, model) {
            (Some(api_key), Some(model)) => {
                let config = OpenRouterConfig::builder().model(model).build();
                Self::with_config(api_key, config).map(Some)
            }
            _ => {
                debug!("{} or {} not set; no explanation provider", API_KEY_ENV, MODEL_ENV);
                Ok(None)
            }
        }
    }

    fn build_explanation_prompt(&self, report: &Report) -> Result<String> {
        let report_json = serde_json::to_string_pretty(report)?;

        Ok(format!(
            "You are a senior ML engineer.\n\n\
            Explain the following data audit results to a junior data scientist.\n\
            Be concrete. Avoid buzzwords.\n\n\
            Audit Report:\n{}\n\n\
            Explain what data drift means,\n\
            why the detected features are risky,\n\
            and what actions an ML engineer should take next\n\
            (e.g., retraining, feature review, alerting).\n",
            report_json
        ))
    }

    fn call_api(&self, prompt: &str) -> Result<String> {
        let request = OpenRouterRequest {
            model: self.config.model.clone(),
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let response = self
            .client
            .post(&self.config.base_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "OpenRouter API Error {}: {}",
                response.status(),
                response.text()?
            ));
        }

        let result: OpenRouterResponse = response.json()?;
        result.into_content()
    }
}

impl ExplanationProvider for OpenRouterProvider {
    fn explain(&self, report: &Report) -> Result<String> {
        let prompt = self.build_explanation_prompt(report)?;
        debug!(
            "Requesting explanation from {} ({} prompt chars)",
            self.config.model,
            prompt.len()
        );
        self.call_api(&prompt)
    }

    fn name(&self) -> &str {
        "OpenRouter"
    }

    fn model(&self) -> Option<&str> {
        Some(&self.config.model)
    }
}

// ============================================================================
// Tests
// ============================================================================
