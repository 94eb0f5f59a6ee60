//! ClaudeBrain implementation.

use crate::api_types::{ApiError, ChatCompletionRequest, ChatCompletionResponse, ChatMessage};
use crate::config::ClaudeBrainConfig;
use crate::token::{HttpRefreshTransport, SystemClock, TokenManager, TokenState};
use assistant_core::{async_trait, Brain, BrainError, ChatRequest};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Appended to any message cut at the character ceiling.
const TRUNCATION_MARKER: &str = "... [message truncated]";

/// Transport for chat completion POSTs.
///
/// Split out so tests can script responses without a server.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send a completion request with the given bearer token.
    async fn complete(
        &self,
        request: &ChatCompletionRequest,
        bearer: &str,
    ) -> Result<ChatCompletionResponse, BrainError>;
}

/// ChatTransport backed by reqwest.
pub struct HttpChatTransport {
    client: reqwest::Client,
    api_url: String,
    timeout: Duration,
}

impl HttpChatTransport {
    /// Create a transport posting to `{api_url}/v1/chat/completions`.
    pub fn new(client: reqwest::Client, api_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            api_url: api_url.into(),
            timeout,
        }
    }
}

#[async_trait]
impl ChatTransport for HttpChatTransport {
    async fn complete(
        &self,
        request: &ChatCompletionRequest,
        bearer: &str,
    ) -> Result<ChatCompletionResponse, BrainError> {
        let url = format!("{}/v1/chat/completions", self.api_url);

        let send = async {
            let response = self
                .client
                .post(&url)
                .bearer_auth(bearer)
                .json(request)
                .send()
                .await
                .map_err(|e| BrainError::Network(format!("Request failed: {}", e)))?;

            let status = response.status();

            if status.as_u16() == 401 {
                let body = response.text().await.unwrap_or_default();
                return Err(BrainError::Auth(format!("access token rejected: {}", body)));
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ApiError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(BrainError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            response
                .json::<ChatCompletionResponse>()
                .await
                .map_err(|e| BrainError::Parse(format!("Invalid response: {}", e)))
        };

        match tokio::time::timeout(self.timeout, send).await {
            Ok(result) => result,
            Err(_) => Err(BrainError::Timeout {
                seconds: self.timeout.as_secs(),
            }),
        }
    }
}

/// Brain backed by an OAuth-gated chat completions API.
///
/// Tokens are checked before every request; a 401 that slips through
/// anyway triggers one refresh-and-retry before the error is surfaced.
pub struct ClaudeBrain {
    transport: Arc<dyn ChatTransport>,
    tokens: TokenManager,
    config: ClaudeBrainConfig,
}

impl ClaudeBrain {
    /// Create a new ClaudeBrain with the given configuration.
    pub fn new(config: ClaudeBrainConfig) -> Self {
        let client = reqwest::Client::new();

        let transport: Arc<dyn ChatTransport> = Arc::new(HttpChatTransport::new(
            client.clone(),
            config.api_url.clone(),
            Duration::from_secs(config.timeout_secs),
        ));

        let refresh = Arc::new(HttpRefreshTransport::new(client, config.token_url.clone()));

        let tokens = TokenManager::new(
            TokenState {
                access_token: config.access_token.clone(),
                refresh_token: config.refresh_token.clone(),
                expires_at_ms: 0,
            },
            refresh,
            Arc::new(SystemClock),
            config.client_id.clone(),
        );

        Self {
            transport,
            tokens,
            config,
        }
    }

    /// Create a brain from explicit parts.
    ///
    /// Lets callers substitute the transport and token manager, which is
    /// how the tests drive 401 and refresh paths without a server.
    pub fn with_transport(
        config: ClaudeBrainConfig,
        transport: Arc<dyn ChatTransport>,
        tokens: TokenManager,
    ) -> Self {
        Self {
            transport,
            tokens,
            config,
        }
    }

    /// Create a ClaudeBrain from environment variables.
    pub fn from_env() -> Result<Self, BrainError> {
        let config = ClaudeBrainConfig::from_env()?;
        Ok(Self::new(config))
    }

    /// Get the configuration.
    pub fn config(&self) -> &ClaudeBrainConfig {
        &self.config
    }

    /// Token manager owning this brain's OAuth state.
    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    fn build_request(&self, request: &ChatRequest) -> ChatCompletionRequest {
        let mut messages = Vec::with_capacity(request.turns.len() + 1);

        if let Some(system) = &request.system {
            messages.push(ChatMessage::system(truncate_content(
                system,
                self.config.prompt_max_chars,
            )));
        }

        for turn in &request.turns {
            messages.push(ChatMessage {
                role: turn.role.as_str().to_string(),
                content: truncate_content(&turn.content, self.config.prompt_max_chars),
            });
        }

        ChatCompletionRequest {
            model: self.config.model.clone(),
            messages,
            max_tokens: request.max_tokens.or(self.config.max_tokens),
            temperature: request.temperature.or(self.config.temperature),
        }
    }
}

#[async_trait]
impl Brain for ClaudeBrain {
    async fn chat(&self, request: ChatRequest) -> Result<String, BrainError> {
        let api_request = self.build_request(&request);
        let token = self.tokens.valid_token().await?;

        debug!(
            model = %api_request.model,
            messages = api_request.messages.len(),
            "Sending chat completion request"
        );

        let response = match self.transport.complete(&api_request, &token).await {
            Err(BrainError::Auth(msg)) => {
                warn!(error = %msg, "Access token rejected; refreshing and retrying once");
                let token = self.tokens.force_refresh().await?;
                self.transport.complete(&api_request, &token).await?
            }
            other => other?,
        };

        response.first_text().ok_or(BrainError::EmptyResponse)
    }

    fn name(&self) -> &str {
        "ClaudeBrain"
    }
}

/// Cut text at a character ceiling, appending a visible marker.
///
/// Counts characters rather than bytes so multi-byte text never splits
/// mid-character.
fn truncate_content(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let mut truncated: String = text.chars().take(max_chars).collect();
    truncated.push_str(TRUNCATION_MARKER);
    truncated
}
