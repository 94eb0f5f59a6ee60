//! Request and response types for the chat completions API.

use serde::{Deserialize, Serialize};

/// A single message in a chat completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message role: "system", "user", or "assistant".
    pub role: String,

    /// Message content.
    pub content: String,
}

impl ChatMessage {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Request body for POST /v1/chat/completions.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    /// Model name.
    pub model: String,

    /// Conversation messages in order.
    pub messages: Vec<ChatMessage>,

    /// Maximum tokens in the reply.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// Response body from POST /v1/chat/completions.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    /// Generated choices; the first one carries the reply.
    #[serde(default)]
    pub choices: Vec<Choice>,

    /// Token accounting, when the server reports it.
    pub usage: Option<Usage>,
}

impl ChatCompletionResponse {
    /// Text of the first choice, if there is one with non-empty content.
    pub fn first_text(&self) -> Option<String> {
        self.choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
    }
}

/// A single completion choice.
#[derive(Debug, Deserialize)]
pub struct Choice {
    /// The generated message.
    pub message: ResponseMessage,

    /// Why generation stopped.
    #[serde(rename = "finish_reason")]
    pub finish_reason: Option<String>,
}

/// Message inside a completion choice.
#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    /// Role, normally "assistant".
    pub role: Option<String>,

    /// Reply text.
    pub content: Option<String>,
}

/// Token usage reported by the API.
#[derive(Debug, Deserialize)]
pub struct Usage {
    /// Tokens in the prompt.
    pub prompt_tokens: Option<u32>,

    /// Tokens in the completion.
    pub completion_tokens: Option<u32>,

    /// Total tokens.
    pub total_tokens: Option<u32>,
}

/// Error envelope returned on non-2xx responses.
#[derive(Debug, Deserialize)]
pub struct ApiError {
    /// Error details.
    pub error: ApiErrorDetails,
}

/// Details of an API error.
#[derive(Debug, Deserialize)]
pub struct ApiErrorDetails {
    /// Human-readable message.
    pub message: String,

    /// Error type identifier.
    #[serde(rename = "type")]
    pub error_type: Option<String>,
}
