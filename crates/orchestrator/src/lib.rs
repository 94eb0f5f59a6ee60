//! Routing brain that turns inbound chat messages into replies.
//!
//! This crate provides the [`Orchestrator`] type, which decides per
//! message whether to answer directly, generate media, call a skill, or
//! hand the work to one of two LLM backends: Claude for deliberate
//! multi-step work, Gemini for fast conversational replies.
//!
//! # Architecture
//!
//! ```text
//! Inbound message (any transport)
//!          ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      ORCHESTRATOR                           │
//! │                                                             │
//! │  1. Pattern table (deterministic, ordered):                 │
//! │     overrides → media → weather → email → reminder →        │
//! │     compose → data-read → web-search → multi-step           │
//! │         ↓ (no pattern claimed it)                           │
//! │  2. LLM classifier: CHAT or ACTION (fast backend)           │
//! │         ↓                                                   │
//! │  3. Dispatch:                                               │
//! │     • CHAT   → fast backend, single call                    │
//! │     • ACTION → prefetch workspace/search data, then         │
//! │               deep backend with staged fallback to fast     │
//! │         ↓                                                   │
//! │  4. Record the exchange in per-sender history               │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use orchestrator::{Orchestrator, SkillSet};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads CLAUDE_*, GEMINI_*, and JUNIPER_* from the environment
//!     let orchestrator = Orchestrator::from_env(SkillSet::new())?;
//!
//!     let routed = orchestrator.handle("alice", "what's the weather in Oslo?").await;
//!     println!("[{}] {:?}", routed.tag, routed.reply);
//!     Ok(())
//! }
//! ```

mod classifier;
mod error;
mod handlers;
mod intent;
mod media;
mod orchestrator;
mod prefetch;
mod route;

// Public exports
pub use classifier::{Classifier, CLASSIFIER_SYSTEM_PROMPT};
pub use error::OrchestratorError;
pub use handlers::{ParseHandlers, EMAIL_GUIDANCE, REMINDER_GUIDANCE};
pub use intent::{
    default_patterns, derive_search_query, IntentPattern, IntentRouter, DEFAULT_WEATHER_LOCATION,
};
pub use media::{clean_media_prompt, parse_video_options};
pub use orchestrator::{Orchestrator, OrchestratorConfig, FAILURE_NOTE};
pub use prefetch::{derive_drive_term, DataPrefetcher, PrefetchBundle, PrefetchSection};
pub use route::{
    ChatLabel, ComposeKind, DataSource, OverrideTarget, RouteDecision, RouteReply, RoutedReply,
};

// Re-export commonly used types from dependencies
pub use assistant_core::{
    Brain, BrainError, ChatRequest, ChatTurn, ContextStore, ConversationContext, MediaPayload,
    SkillError, SkillSet, VideoOptions,
};
pub use claude_brain::ClaudeBrain;
pub use gemini_brain::GeminiBrain;
