//! Core trait and types for brain implementations.
//!
//! This crate provides the shared interface for the Juniper routing brain.
//! It defines:
//!
//! - [`Brain`] - The trait both backend clients implement
//! - [`ChatRequest`] / [`ChatTurn`] - Conversation types passed to a brain
//! - [`BrainError`] / [`SkillError`] - Error taxonomy shared across crates
//! - [`SkillSet`] - Optional capability slots the orchestrator dispatches to
//! - [`ContextStore`] - Per-sender conversation storage with LRU eviction
//!
//! # Example
//!
//! ```rust
//! use assistant_core::{Brain, BrainError, ChatRequest};
//! use async_trait::async_trait;
//!
//! struct MyBrain;
//!
//! #[async_trait]
//! impl Brain for MyBrain {
//!     async fn chat(&self, _request: ChatRequest) -> Result<String, BrainError> {
//!         Ok("Hello!".to_string())
//!     }
//!
//!     fn name(&self) -> &str {
//!         "MyBrain"
//!     }
//! }
//! ```

mod chat;
mod error;
mod history;
mod json;
mod prompt;
mod skills;
mod trait_def;

pub use chat::{ChatRequest, ChatTurn, ConversationContext, Role};
pub use error::{BrainError, SkillError};
pub use history::ContextStore;
pub use json::{extract_object, parse_object};
pub use prompt::hash_prompt;
pub use skills::{
    AgentSkill, ImageSkill, MediaPayload, SchedulerSkill, SearchSkill, SkillKind, SkillResult,
    SkillSet, VideoOptions, VideoSkill, WeatherSkill, WorkspaceSkill,
};
pub use trait_def::Brain;

// Re-export async_trait for convenience
pub use async_trait::async_trait;
