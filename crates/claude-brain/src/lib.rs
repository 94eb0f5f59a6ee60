//! Claude-based deep brain implementation.
//!
//! This crate provides the powerful/expensive side of the dual-brain
//! setup: an OAuth-gated chat-completions client used for complex
//! reasoning and composition. Access tokens are owned by a
//! [`TokenManager`] that refreshes proactively before expiry and
//! reactively after a 401, capturing rotated refresh tokens as the
//! server hands them out.
//!
//! Both the clock and the HTTP transports sit behind small traits so
//! the token lifecycle and the 401 retry path are testable without a
//! network.
//!
//! # Usage
//!
//! ```rust,no_run
//! use assistant_core::{Brain, ChatRequest};
//! use claude_brain::ClaudeBrain;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let brain = ClaudeBrain::from_env()?;
//!     let reply = brain.chat(ChatRequest::from_user("hello")).await?;
//!     println!("{}", reply);
//!     Ok(())
//! }
//! ```

mod api_types;
mod brain;
mod config;
mod token;

pub use api_types::{
    ChatCompletionRequest, ChatCompletionResponse, ChatMessage, Choice, ResponseMessage, Usage,
};
pub use brain::{ChatTransport, ClaudeBrain, HttpChatTransport};
pub use config::{ClaudeBrainConfig, ClaudeBrainConfigBuilder};
pub use token::{
    Clock, HttpRefreshTransport, RefreshRequest, RefreshResponse, RefreshTransport, SystemClock,
    TokenManager, TokenState,
};

// Re-export core types for convenience
pub use assistant_core::{async_trait, Brain, BrainError, ChatRequest, ChatTurn};
