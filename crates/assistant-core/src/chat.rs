//! Conversation types shared by every backend client.

use serde::{Deserialize, Serialize};

/// Speaker of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The human side of the conversation.
    User,
    /// The assistant side of the conversation.
    Assistant,
}

impl Role {
    /// Wire name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A single turn in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    /// Who spoke.
    pub role: Role,
    /// What was said.
    pub content: String,
}

impl ChatTurn {
    /// Create a user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A request to a [`Brain`](crate::Brain) backend.
///
/// Turns are ordered oldest first; the final turn is the current user
/// message the backend should answer.
#[derive(Debug, Clone, Default)]
pub struct ChatRequest {
    /// Optional system instruction.
    pub system: Option<String>,
    /// Conversation turns, oldest first.
    pub turns: Vec<ChatTurn>,
    /// Token budget for the reply.
    pub max_tokens: Option<u32>,
    /// Sampling temperature.
    pub temperature: Option<f32>,
}

impl ChatRequest {
    /// Build a single-turn request from a user message.
    pub fn from_user(text: impl Into<String>) -> Self {
        Self {
            turns: vec![ChatTurn::user(text)],
            ..Self::default()
        }
    }

    /// Set the system instruction.
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the token budget for the reply.
    pub fn with_max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = Some(tokens);
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// The current user message, if the request holds one.
    pub fn last_user_text(&self) -> Option<&str> {
        self.turns
            .iter()
            .rev()
            .find(|turn| turn.role == Role::User)
            .map(|turn| turn.content.as_str())
    }
}

/// An ordered record of one conversation.
///
/// Append-only from the caller's perspective; [`recent`](Self::recent)
/// bounds how much of it is folded into any one prompt.
#[derive(Debug, Clone, Default)]
pub struct ConversationContext {
    turns: Vec<ChatTurn>,
}

impl ConversationContext {
    /// Create an empty conversation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a user turn.
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.turns.push(ChatTurn::user(content));
    }

    /// Append an assistant turn.
    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.turns.push(ChatTurn::assistant(content));
    }

    /// Append a full user/assistant exchange.
    pub fn record_exchange(&mut self, user: &str, assistant: &str) {
        self.push_user(user);
        self.push_assistant(assistant);
    }

    /// The last `n` turns, oldest first.
    pub fn recent(&self, n: usize) -> &[ChatTurn] {
        let start = self.turns.len().saturating_sub(n);
        &self.turns[start..]
    }

    /// All turns, oldest first.
    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    /// Drop oldest turns until at most `max_len` remain.
    pub fn truncate_oldest(&mut self, max_len: usize) {
        if self.turns.len() > max_len {
            let to_remove = self.turns.len() - max_len;
            self.turns.drain(0..to_remove);
        }
    }

    /// Number of turns recorded.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether no turns have been recorded.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
