//! Gemini API request and response types.

use assistant_core::{ChatTurn, Role};
use serde::{Deserialize, Serialize};

/// A single text part of a content block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    /// The text itself.
    pub text: String,
}

/// A content block: a role and its parts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    /// Role: "user" or "model". Omitted for system instructions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Text parts of this block.
    pub parts: Vec<Part>,
}

impl Content {
    /// A user content block.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Some("user".to_string()),
            parts: vec![Part { text: text.into() }],
        }
    }

    /// A model content block.
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Some("model".to_string()),
            parts: vec![Part { text: text.into() }],
        }
    }

    /// A system-instruction block (no role on the wire).
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: None,
            parts: vec![Part { text: text.into() }],
        }
    }

    /// All part texts joined together.
    pub fn joined_text(&self) -> String {
        self.parts
            .iter()
            .map(|part| part.text.as_str())
            .collect::<Vec<_>>()
            .join("")
    }
}

impl From<&ChatTurn> for Content {
    fn from(turn: &ChatTurn) -> Self {
        match turn.role {
            Role::User => Content::user(turn.content.clone()),
            // Gemini names the assistant side "model"
            Role::Assistant => Content::model(turn.content.clone()),
        }
    }
}

/// Generation parameters.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationConfig {
    /// Maximum tokens in the reply.
    #[serde(rename = "maxOutputTokens", skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// Request body for `models/{model}:generateContent`.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateContentRequest {
    /// Conversation turns, oldest first.
    pub contents: Vec<Content>,
    /// Optional system instruction.
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    /// Generation parameters.
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

/// Response body from `generateContent`.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateContentResponse {
    /// Generated candidates, usually one.
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    /// The first candidate's text, if any was produced.
    pub fn first_text(&self) -> Option<String> {
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .map(|content| content.joined_text())
            .filter(|text| !text.trim().is_empty())
    }
}

/// One generated candidate.
#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    /// Generated content. Absent when generation was blocked.
    pub content: Option<Content>,
    /// Why generation stopped.
    #[serde(rename = "finishReason")]
    pub finish_reason: Option<String>,
}

/// API error response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    /// Error details.
    pub error: ApiErrorDetails,
}

/// API error details.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetails {
    /// Error message.
    pub message: String,
    /// Numeric error code.
    #[serde(default)]
    pub code: Option<u32>,
    /// Status name, e.g. "RESOURCE_EXHAUSTED".
    #[serde(default)]
    pub status: Option<String>,
}
