//! GeminiBrain implementation using the Gemini generateContent API.

use std::sync::Arc;
use std::time::Duration;

use assistant_core::{async_trait, Brain, BrainError, ChatRequest};
use reqwest::header::HeaderMap;
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::api_types::{
    ApiError, Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
};
use crate::config::GeminiBrainConfig;
use crate::keys::{KeyRouter, StaticKeyRouter};

/// One attempt's failure, with enough detail for the retry loop.
struct AttemptFailure {
    error: BrainError,
    retry_after: Option<Duration>,
    retryable: bool,
}

impl AttemptFailure {
    fn transient(error: BrainError) -> Self {
        Self {
            error,
            retry_after: None,
            retryable: true,
        }
    }

    fn terminal(error: BrainError) -> Self {
        Self {
            error,
            retry_after: None,
            retryable: false,
        }
    }
}

/// A brain implementation that uses the Gemini API.
///
/// GeminiBrain is the fast/cheap side of the dual-brain setup. Requests
/// are retried within the [`KeyRouter`]'s attempt budget; throttled
/// responses back off and switch to the secondary key when one is
/// configured.
pub struct GeminiBrain {
    client: Client,
    config: GeminiBrainConfig,
    keys: Arc<dyn KeyRouter>,
}

impl GeminiBrain {
    /// Create a new GeminiBrain with the given configuration.
    ///
    /// Builds a [`StaticKeyRouter`] from the configured keys.
    pub fn new(config: GeminiBrainConfig) -> Result<Self, BrainError> {
        let keys: Arc<dyn KeyRouter> = Arc::new(StaticKeyRouter::new(
            config.api_key.clone(),
            config.secondary_api_key.clone(),
            config.max_attempts,
            Duration::from_millis(config.backoff_base_ms),
        ));
        Self::with_key_router(config, keys)
    }

    /// Create a GeminiBrain with a custom key router.
    pub fn with_key_router(
        config: GeminiBrainConfig,
        keys: Arc<dyn KeyRouter>,
    ) -> Result<Self, BrainError> {
        let client = Client::builder().build().map_err(|e| {
            BrainError::Configuration(format!("Failed to create HTTP client: {}", e))
        })?;

        info!(
            "GeminiBrain initialized with model: {}, secondary key: {}",
            config.model,
            config.secondary_api_key.is_some()
        );

        Ok(Self {
            client,
            config,
            keys,
        })
    }

    /// Create a GeminiBrain from environment variables.
    ///
    /// See [`GeminiBrainConfig::from_env`] for the variables read.
    pub fn from_env() -> Result<Self, BrainError> {
        let config = GeminiBrainConfig::from_env()?;
        Self::new(config)
    }

    /// Get the configuration.
    pub fn config(&self) -> &GeminiBrainConfig {
        &self.config
    }

    /// Build the wire request for a chat request.
    fn build_request(&self, request: &ChatRequest) -> GenerateContentRequest {
        let contents = request.turns.iter().map(Content::from).collect();
        let system_instruction = request
            .system
            .as_ref()
            .map(|system| Content::system(system.clone()));
        let generation_config = Some(GenerationConfig {
            max_output_tokens: request.max_tokens.or(self.config.max_tokens),
            temperature: request.temperature.or(self.config.temperature),
        });

        GenerateContentRequest {
            contents,
            system_instruction,
            generation_config,
        }
    }

    /// Make one generateContent attempt with the given key.
    async fn generate(
        &self,
        request: &GenerateContentRequest,
        api_key: &str,
    ) -> Result<String, AttemptFailure> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.api_url, self.config.model
        );

        let call = async {
            let response = self
                .client
                .post(&url)
                .header("x-goog-api-key", api_key)
                .json(request)
                .send()
                .await
                .map_err(|e| {
                    AttemptFailure::transient(BrainError::Network(format!(
                        "failed to send request: {}",
                        e
                    )))
                })?;

            let status = response.status();
            if !status.is_success() {
                let retry_after = parse_retry_after(response.headers());
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ApiError>(&body)
                    .map(|parsed| parsed.error.message)
                    .unwrap_or(body);

                if status.as_u16() == 401 || status.as_u16() == 403 {
                    return Err(AttemptFailure::terminal(BrainError::Auth(message)));
                }

                let retryable = status.as_u16() == 429 || status.is_server_error();
                return Err(AttemptFailure {
                    error: BrainError::Api {
                        status: status.as_u16(),
                        message,
                    },
                    retry_after,
                    retryable,
                });
            }

            let completion: GenerateContentResponse = response.json().await.map_err(|e| {
                AttemptFailure::terminal(BrainError::Parse(format!(
                    "failed to parse response: {}",
                    e
                )))
            })?;

            completion
                .first_text()
                .ok_or_else(|| AttemptFailure::terminal(BrainError::EmptyResponse))
        };

        match tokio::time::timeout(Duration::from_secs(self.config.timeout_secs), call).await {
            Ok(result) => result,
            Err(_) => Err(AttemptFailure::transient(BrainError::Timeout {
                seconds: self.config.timeout_secs,
            })),
        }
    }
}

#[async_trait]
impl Brain for GeminiBrain {
    async fn chat(&self, request: ChatRequest) -> Result<String, BrainError> {
        let api_request = self.build_request(&request);
        debug!(
            turns = api_request.contents.len(),
            "sending generateContent request"
        );

        let max_attempts = self.keys.max_attempts();
        let mut attempt = 0;
        loop {
            let key = self.keys.key_for_attempt(attempt);
            match self.generate(&api_request, key).await {
                Ok(text) => return Ok(text),
                Err(failure) => {
                    let out_of_attempts = attempt + 1 >= max_attempts;
                    if !failure.retryable || out_of_attempts {
                        return Err(failure.error);
                    }
                    let delay = self.keys.backoff(attempt, failure.retry_after);
                    warn!(
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %failure.error,
                        "fast backend attempt failed, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    fn name(&self) -> &str {
        "GeminiBrain"
    }
}

/// Read a whole-second Retry-After header, if present.
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assistant_core::ChatTurn;

    fn test_brain() -> GeminiBrain {
        let config = GeminiBrainConfig::builder()
            .api_key("test-key")
            .max_tokens(256)
            .temperature(0.5)
            .build();
        GeminiBrain::new(config).unwrap()
    }

    #[test]
    fn test_build_request_maps_roles() {
        let brain = test_brain();
        let mut request = ChatRequest::from_user("hi");
        request.turns.insert(0, ChatTurn::assistant("earlier reply"));

        let api_request = brain.build_request(&request);
        assert_eq!(api_request.contents.len(), 2);
        assert_eq!(api_request.contents[0].role.as_deref(), Some("model"));
        assert_eq!(api_request.contents[1].role.as_deref(), Some("user"));
    }

    #[test]
    fn test_build_request_uses_config_defaults() {
        let brain = test_brain();
        let api_request = brain.build_request(&ChatRequest::from_user("hi"));

        let generation = api_request.generation_config.unwrap();
        assert_eq!(generation.max_output_tokens, Some(256));
        assert_eq!(generation.temperature, Some(0.5));
        assert!(api_request.system_instruction.is_none());
    }

    #[test]
    fn test_build_request_honors_overrides() {
        let brain = test_brain();
        let request = ChatRequest::from_user("classify")
            .with_system("one word only")
            .with_max_tokens(8)
            .with_temperature(0.0);

        let api_request = brain.build_request(&request);
        let generation = api_request.generation_config.unwrap();
        assert_eq!(generation.max_output_tokens, Some(8));
        assert_eq!(generation.temperature, Some(0.0));
        assert!(api_request.system_instruction.is_some());
    }

    #[test]
    fn test_parse_retry_after() {
        let mut headers = HeaderMap::new();
        assert!(parse_retry_after(&headers).is_none());

        headers.insert(reqwest::header::RETRY_AFTER, "3".parse().unwrap());
        assert_eq!(parse_retry_after(&headers), Some(Duration::from_secs(3)));

        headers.insert(reqwest::header::RETRY_AFTER, "soon".parse().unwrap());
        assert!(parse_retry_after(&headers).is_none());
    }

    #[test]
    fn test_brain_name() {
        assert_eq!(test_brain().name(), "GeminiBrain");
    }
}
