//! Configuration for ClaudeBrain.

use assistant_core::BrainError;
use std::env;

/// Configuration for ClaudeBrain.
///
/// Tokens come from the environment at startup; their lifecycle after
/// that belongs to [`TokenManager`](crate::TokenManager). Expiry of an
/// environment-supplied access token is unknown, so the first call
/// refreshes when a refresh token is available.
#[derive(Debug, Clone)]
pub struct ClaudeBrainConfig {
    /// API base URL.
    pub api_url: String,

    /// OAuth token endpoint.
    pub token_url: String,

    /// Model name to use.
    pub model: String,

    /// Initial access token.
    pub access_token: Option<String>,

    /// Refresh token.
    pub refresh_token: Option<String>,

    /// OAuth client id presented on refresh.
    pub client_id: Option<String>,

    /// Maximum tokens for a reply.
    pub max_tokens: Option<u32>,

    /// Temperature for generation.
    pub temperature: Option<f32>,

    /// Character ceiling per message; longer content is truncated with
    /// a visible marker.
    pub prompt_max_chars: usize,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ClaudeBrainConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.anthropic.com".to_string(),
            token_url: "https://console.anthropic.com/v1/oauth/token".to_string(),
            model: "claude-sonnet-4-5".to_string(),
            access_token: None,
            refresh_token: None,
            client_id: None,
            max_tokens: Some(4096),
            temperature: Some(0.7),
            prompt_max_chars: 40_000,
            timeout_secs: 120,
        }
    }
}

impl ClaudeBrainConfig {
    /// Create configuration from environment variables.
    ///
    /// At least one of these must be set:
    /// - `CLAUDE_ACCESS_TOKEN` - Initial access token
    /// - `CLAUDE_REFRESH_TOKEN` - Refresh token (pair with `CLAUDE_CLIENT_ID`)
    ///
    /// Optional environment variables:
    /// - `CLAUDE_CLIENT_ID` - OAuth client id for refreshes
    /// - `CLAUDE_API_URL` - API URL (default: https://api.anthropic.com)
    /// - `CLAUDE_TOKEN_URL` - Token endpoint (default: https://console.anthropic.com/v1/oauth/token)
    /// - `CLAUDE_MODEL` - Model name (default: claude-sonnet-4-5)
    /// - `CLAUDE_MAX_TOKENS` - Max reply tokens (default: 4096)
    /// - `CLAUDE_TEMPERATURE` - Temperature (default: 0.7)
    /// - `CLAUDE_PROMPT_MAX_CHARS` - Message character ceiling (default: 40000)
    /// - `CLAUDE_TIMEOUT_SECS` - Per-request timeout (default: 120)
    pub fn from_env() -> Result<Self, BrainError> {
        let access_token = env::var("CLAUDE_ACCESS_TOKEN").ok().filter(|v| !v.is_empty());
        let refresh_token = env::var("CLAUDE_REFRESH_TOKEN").ok().filter(|v| !v.is_empty());

        if access_token.is_none() && refresh_token.is_none() {
            return Err(BrainError::Configuration(
                "CLAUDE_ACCESS_TOKEN or CLAUDE_REFRESH_TOKEN must be set".to_string(),
            ));
        }

        let client_id = env::var("CLAUDE_CLIENT_ID").ok().filter(|v| !v.is_empty());

        let api_url =
            env::var("CLAUDE_API_URL").unwrap_or_else(|_| "https://api.anthropic.com".to_string());

        let token_url = env::var("CLAUDE_TOKEN_URL")
            .unwrap_or_else(|_| "https://console.anthropic.com/v1/oauth/token".to_string());

        let model = env::var("CLAUDE_MODEL").unwrap_or_else(|_| "claude-sonnet-4-5".to_string());

        let max_tokens = env::var("CLAUDE_MAX_TOKENS")
            .ok()
            .and_then(|v| v.parse().ok())
            .or(Some(4096));

        let temperature = env::var("CLAUDE_TEMPERATURE")
            .ok()
            .and_then(|v| v.parse().ok())
            .or(Some(0.7));

        let prompt_max_chars = env::var("CLAUDE_PROMPT_MAX_CHARS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(40_000);

        let timeout_secs = env::var("CLAUDE_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(120);

        Ok(Self {
            api_url,
            token_url,
            model,
            access_token,
            refresh_token,
            client_id,
            max_tokens,
            temperature,
            prompt_max_chars,
            timeout_secs,
        })
    }

    /// Create a new config builder.
    pub fn builder() -> ClaudeBrainConfigBuilder {
        ClaudeBrainConfigBuilder::default()
    }
}

/// Builder for ClaudeBrainConfig.
#[derive(Debug, Default)]
pub struct ClaudeBrainConfigBuilder {
    config: ClaudeBrainConfig,
}

impl ClaudeBrainConfigBuilder {
    /// Set the API URL.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    /// Set the token endpoint.
    pub fn token_url(mut self, url: impl Into<String>) -> Self {
        self.config.token_url = url.into();
        self
    }

    /// Set the model name.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    /// Set the initial access token.
    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.config.access_token = Some(token.into());
        self
    }

    /// Set the refresh token.
    pub fn refresh_token(mut self, token: impl Into<String>) -> Self {
        self.config.refresh_token = Some(token.into());
        self
    }

    /// Set the OAuth client id.
    pub fn client_id(mut self, id: impl Into<String>) -> Self {
        self.config.client_id = Some(id.into());
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

    /// Set the message character ceiling.
    pub fn prompt_max_chars(mut self, chars: usize) -> Self {
        self.config.prompt_max_chars = chars;
        self
    }

    /// Set the per-request timeout.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = secs;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> ClaudeBrainConfig {
        self.config
    }
}
