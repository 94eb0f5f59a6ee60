//! The core Brain trait.

use async_trait::async_trait;

use crate::chat::ChatRequest;
use crate::error::BrainError;

/// A language-model backend.
///
/// Each implementation wraps one upstream API. Callers describe the
/// conversation with a [`ChatRequest`] and get the reply text back;
/// transport, authentication, and retry concerns stay inside the
/// implementation.
#[async_trait]
pub trait Brain: Send + Sync {
    /// Send a chat request and return the reply text.
    async fn chat(&self, request: ChatRequest) -> Result<String, BrainError>;

    /// Human-readable name for log lines.
    fn name(&self) -> &str;
}
