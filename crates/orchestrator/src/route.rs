//! Route decisions and replies.
//!
//! A [`RouteDecision`] is the output of intent matching (or, when no
//! pattern claims a message, of the LLM classifier). Every decision maps
//! to a stable tag string used in logs, so a deployment's traffic can be
//! broken down by route without parsing free text.

use assistant_core::{MediaPayload, VideoOptions};

/// Backend or skill forced by a slash command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideTarget {
    /// Force the deep backend.
    Claude,
    /// Force the fast backend.
    Gemini,
    /// Force the agent's execution loop.
    Agent,
    /// Ask the agent for a plan without executing it.
    Plan,
}

/// Flavor of a writing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposeKind {
    /// A structured standalone document.
    Document,
    /// A message written on the user's behalf.
    Draft,
    /// A condensed version of existing material.
    Summarize,
}

/// Which workspace source a read request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Calendar,
    Email,
    Drive,
}

/// Verdict of the LLM classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatLabel {
    /// Casual conversation; answer with the fast backend.
    Chat,
    /// A request to get something done; prefetch data and use the deep
    /// backend with fallback.
    Action,
}

/// What the orchestrator decided to do with a message.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteDecision {
    /// A slash command forced a target; `text` is the message with the
    /// command stripped.
    Override { target: OverrideTarget, text: String },
    /// Upscale the most recently generated image.
    MediaUpscale,
    /// Generate an image at the highest quality tier.
    MediaImageUltra { prompt: String },
    /// Generate an image.
    MediaImage { prompt: String },
    /// Generate a video clip.
    MediaVideo {
        prompt: String,
        options: VideoOptions,
    },
    /// Answer a weather question from the weather skill.
    Weather { location: String, forecast: bool },
    /// Parse and send an email.
    SendEmail,
    /// Parse and schedule a reminder.
    Reminder,
    /// Write something with the deep backend.
    Compose(ComposeKind),
    /// Answer a question from the user's own workspace data.
    DataRead(DataSource),
    /// Search the web and answer from the results.
    WebSearch { query: String },
    /// Hand a multi-part request to the agent.
    MultiStep,
    /// No pattern matched; the classifier decided.
    Classified(ChatLabel),
}

impl RouteDecision {
    /// Stable tag for logging and tests.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Override {
                target: OverrideTarget::Claude,
                ..
            } => "override-claude",
            Self::Override {
                target: OverrideTarget::Gemini,
                ..
            } => "override-gemini",
            Self::Override {
                target: OverrideTarget::Agent,
                ..
            } => "override-agent",
            Self::Override {
                target: OverrideTarget::Plan,
                ..
            } => "override-plan",
            Self::MediaUpscale => "media-upscale",
            Self::MediaImageUltra { .. } => "media-image-ultra",
            Self::MediaImage { .. } => "media-image",
            Self::MediaVideo { .. } => "media-video",
            Self::Weather { .. } => "weather",
            Self::SendEmail => "send-email",
            Self::Reminder => "reminder",
            Self::Compose(ComposeKind::Document) => "compose-document",
            Self::Compose(ComposeKind::Draft) => "compose-draft",
            Self::Compose(ComposeKind::Summarize) => "compose-summarize",
            Self::DataRead(DataSource::Calendar) => "read-calendar",
            Self::DataRead(DataSource::Email) => "read-email",
            Self::DataRead(DataSource::Drive) => "read-drive",
            Self::WebSearch { .. } => "web-search",
            Self::MultiStep => "multi-step",
            Self::Classified(ChatLabel::Chat) => "classify-chat",
            Self::Classified(ChatLabel::Action) => "classify-action",
        }
    }
}

/// What goes back to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteReply {
    /// A plain text reply.
    Text(String),
    /// A media generation result, possibly carrying image data.
    Media(MediaPayload),
}

impl RouteReply {
    /// Build a text reply.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// The text content, if this is a text reply.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Media(_) => None,
        }
    }
}

/// A reply together with the route that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedReply {
    /// The decision tag, or "empty" for blank input.
    pub tag: &'static str,
    /// The reply to deliver.
    pub reply: RouteReply,
}
