//! Configuration for GeminiBrain.

use assistant_core::BrainError;
use std::env;

/// Configuration for GeminiBrain.
#[derive(Debug, Clone)]
pub struct GeminiBrainConfig {
    /// Gemini API base URL.
    pub api_url: String,

    /// Primary API key.
    pub api_key: String,

    /// Secondary API key, substituted when the primary is throttled.
    pub secondary_api_key: Option<String>,

    /// Model name to use.
    pub model: String,

    /// Maximum tokens for a reply.
    pub max_tokens: Option<u32>,

    /// Temperature for generation (0.0 - 2.0).
    pub temperature: Option<f32>,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// Attempts per request, across keys.
    pub max_attempts: u32,

    /// Base backoff delay in milliseconds, doubled per attempt.
    pub backoff_base_ms: u64,
}

impl Default for GeminiBrainConfig {
    fn default() -> Self {
        Self {
            api_url: "https://generativelanguage.googleapis.com".to_string(),
            api_key: String::new(),
            secondary_api_key: None,
            model: "gemini-2.5-flash".to_string(),
            max_tokens: Some(1024),
            temperature: Some(0.7),
            timeout_secs: 30,
            max_attempts: 3,
            backoff_base_ms: 500,
        }
    }
}

impl GeminiBrainConfig {
    /// Create configuration from environment variables.
    ///
    /// Required environment variables:
    /// - `GEMINI_API_KEY` - Primary API key
    ///
    /// Optional environment variables:
    /// - `GEMINI_API_KEY_SECONDARY` - Fallback key for throttled requests
    /// - `GEMINI_API_URL` - API URL (default: https://generativelanguage.googleapis.com)
    /// - `GEMINI_MODEL` - Model name (default: gemini-2.5-flash)
    /// - `GEMINI_MAX_TOKENS` - Max reply tokens (default: 1024)
    /// - `GEMINI_TEMPERATURE` - Temperature (default: 0.7)
    /// - `GEMINI_TIMEOUT_SECS` - Per-request timeout (default: 30)
    /// - `GEMINI_MAX_ATTEMPTS` - Attempts per request (default: 3)
    /// - `GEMINI_BACKOFF_BASE_MS` - Base backoff delay (default: 500)
    pub fn from_env() -> Result<Self, BrainError> {
        let api_key = env::var("GEMINI_API_KEY")
            .ok()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| BrainError::Configuration("GEMINI_API_KEY not set".to_string()))?;

        let secondary_api_key = env::var("GEMINI_API_KEY_SECONDARY")
            .ok()
            .filter(|v| !v.is_empty());

        let api_url = env::var("GEMINI_API_URL")
            .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string());

        let model = env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-2.5-flash".to_string());

        let max_tokens = env::var("GEMINI_MAX_TOKENS")
            .ok()
            .and_then(|v| v.parse().ok())
            .or(Some(1024));

        let temperature = env::var("GEMINI_TEMPERATURE")
            .ok()
            .and_then(|v| v.parse().ok())
            .or(Some(0.7));

        let timeout_secs = env::var("GEMINI_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);

        let max_attempts = env::var("GEMINI_MAX_ATTEMPTS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3);

        let backoff_base_ms = env::var("GEMINI_BACKOFF_BASE_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(500);

        Ok(Self {
            api_url,
            api_key,
            secondary_api_key,
            model,
            max_tokens,
            temperature,
            timeout_secs,
            max_attempts,
            backoff_base_ms,
        })
    }

    /// Create a new config builder.
    pub fn builder() -> GeminiBrainConfigBuilder {
        GeminiBrainConfigBuilder::default()
    }
}

/// Builder for GeminiBrainConfig.
#[derive(Debug, Default)]
pub struct GeminiBrainConfigBuilder {
    config: GeminiBrainConfig,
}

impl GeminiBrainConfigBuilder {
    /// Set the primary API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = key.into();
        self
    }

    /// Set the secondary API key.
    pub fn secondary_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.secondary_api_key = Some(key.into());
        self
    }

    /// Set the API URL.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    /// Set the model name.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    /// Set the max reply tokens.
    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.config.max_tokens = Some(tokens);
        self
    }

    /// Set the temperature.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.config.temperature = Some(temperature);
        self
    }

    /// Set the per-request timeout.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = secs;
        self
    }

    /// Set the attempt budget.
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.config.max_attempts = attempts;
        self
    }

    /// Set the base backoff delay.
    pub fn backoff_base_ms(mut self, ms: u64) -> Self {
        self.config.backoff_base_ms = ms;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> GeminiBrainConfig {
        self.config
    }
}
