//! Gemini-based fast brain implementation.
//!
//! This crate provides the low-latency, low-cost side of the dual-brain
//! setup. It talks to the Gemini `generateContent` API and is used for
//! classification, casual chat, structured parsing, and summarizing
//! pre-fetched data.
//!
//! Rate limiting and key management live behind the [`KeyRouter`]
//! contract: the brain asks it which key to present on each attempt and
//! how long to back off after a throttled response. [`StaticKeyRouter`]
//! covers the common primary-plus-optional-secondary deployment.
//!
//! # Usage
//!
//! ```rust,no_run
//! use assistant_core::{Brain, ChatRequest};
//! use gemini_brain::GeminiBrain;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let brain = GeminiBrain::from_env()?;
//!     let reply = brain.chat(ChatRequest::from_user("hello")).await?;
//!     println!("{}", reply);
//!     Ok(())
//! }
//! ```

mod api_types;
mod brain;
mod config;
mod keys;

pub use brain::GeminiBrain;
pub use config::{GeminiBrainConfig, GeminiBrainConfigBuilder};
pub use keys::{KeyRouter, StaticKeyRouter};

// Re-export core types for convenience
pub use assistant_core::{async_trait, Brain, BrainError, ChatRequest, ChatTurn};
