//! Skill contracts for external capabilities.
//!
//! The routing brain never talks to Google, search, weather, or media
//! services directly. Each capability sits behind a small async trait,
//! and a [`SkillSet`] carries whichever implementations the deployment
//! has wired up. Routing patterns check availability before claiming a
//! message, so a missing skill means the pattern is skipped rather than
//! an error at dispatch time.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SkillError;

/// Result alias for skill calls.
pub type SkillResult<T> = Result<T, SkillError>;

/// Structured result of an image or video generation call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaPayload {
    /// Whether generation succeeded.
    pub success: bool,
    /// Status or error text for the user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Base64-encoded image data, when the service returns one.
    #[serde(rename = "imageBase64", skip_serializing_if = "Option::is_none")]
    pub image_base64: Option<String>,
}

impl MediaPayload {
    /// A successful payload carrying image data.
    pub fn image(data: impl Into<String>) -> Self {
        Self {
            success: true,
            message: None,
            image_base64: Some(data.into()),
        }
    }

    /// A successful payload carrying only a status message.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            image_base64: None,
        }
    }

    /// A failed payload with a user-facing explanation.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            image_base64: None,
        }
    }
}

/// Options extracted from a video request.
///
/// All fields are optional; the service applies its own defaults for
/// anything unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoOptions {
    /// Output resolution, e.g. "720p" or "1080p".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    /// Aspect ratio, e.g. "16:9", "9:16", or "1:1".
    #[serde(rename = "aspectRatio", skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,
    /// Clip length in seconds.
    #[serde(rename = "durationSecs", skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<u32>,
    /// Whether to generate audio.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<bool>,
}

/// Current conditions and forecasts.
#[async_trait]
pub trait WeatherSkill: Send + Sync {
    /// Current conditions for a location.
    async fn current(&self, location: &str) -> SkillResult<String>;

    /// Multi-day forecast for a location.
    async fn forecast(&self, location: &str) -> SkillResult<String>;
}

/// Image generation and enhancement.
#[async_trait]
pub trait ImageSkill: Send + Sync {
    /// Generate an image at standard quality.
    async fn generate(&self, prompt: &str) -> SkillResult<MediaPayload>;

    /// Generate an image at the highest quality tier.
    async fn ultra_generate(&self, prompt: &str) -> SkillResult<MediaPayload>;

    /// Upscale the most recently generated image.
    async fn upscale(&self) -> SkillResult<MediaPayload>;
}

/// Video generation.
#[async_trait]
pub trait VideoSkill: Send + Sync {
    /// Generate a video clip.
    async fn generate_video(&self, prompt: &str, options: &VideoOptions)
        -> SkillResult<MediaPayload>;
}

/// Google Workspace access: mail, calendar, and drive.
#[async_trait]
pub trait WorkspaceSkill: Send + Sync {
    /// Whether the connection is configured and authorized.
    ///
    /// Cheap enough to call on every route decision.
    fn is_ready(&self) -> bool;

    /// The `n` most recent inbox messages, rendered as text.
    async fn recent_emails(&self, n: usize) -> SkillResult<String>;

    /// Today's calendar events, rendered as text.
    async fn today_events(&self) -> SkillResult<String>;

    /// The `n` most recently modified drive files, rendered as text.
    async fn recent_files(&self, n: usize) -> SkillResult<String>;

    /// Drive files matching a search term, rendered as text.
    async fn search_files(&self, term: &str) -> SkillResult<String>;

    /// Send an email. Returns a service-side confirmation.
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> SkillResult<String>;
}

/// Web search.
#[async_trait]
pub trait SearchSkill: Send + Sync {
    /// Search the web and return rendered results.
    async fn search(&self, query: &str) -> SkillResult<String>;
}

/// Reminder scheduling.
#[async_trait]
pub trait SchedulerSkill: Send + Sync {
    /// Schedule a reminder for delivery over the given transport.
    async fn add_reminder(
        &self,
        user_id: &str,
        time: &str,
        message: &str,
        transport: &str,
    ) -> SkillResult<String>;
}

/// Multi-step agent execution.
#[async_trait]
pub trait AgentSkill: Send + Sync {
    /// Try the high-level orchestration path.
    ///
    /// `Ok(None)` means the agent declined the task; callers may then
    /// fall back to [`run`](Self::run).
    async fn orchestrate(&self, message: &str) -> SkillResult<Option<String>>;

    /// Run the agent loop directly.
    async fn run(&self, message: &str) -> SkillResult<String>;

    /// Produce a step-by-step plan without executing it.
    async fn plan(&self, message: &str) -> SkillResult<String>;
}

/// Identifies a slot in a [`SkillSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillKind {
    Weather,
    Image,
    Video,
    Workspace,
    Search,
    Scheduler,
    Agent,
}

/// The capabilities available to the routing brain.
///
/// One optional slot per skill. A deployment fills whichever slots it
/// has services for; the set may be rebuilt or replaced between calls.
#[derive(Clone, Default)]
pub struct SkillSet {
    pub weather: Option<Arc<dyn WeatherSkill>>,
    pub image: Option<Arc<dyn ImageSkill>>,
    pub video: Option<Arc<dyn VideoSkill>>,
    pub workspace: Option<Arc<dyn WorkspaceSkill>>,
    pub search: Option<Arc<dyn SearchSkill>>,
    pub scheduler: Option<Arc<dyn SchedulerSkill>>,
    pub agent: Option<Arc<dyn AgentSkill>>,
}

impl SkillSet {
    /// An empty set with no capabilities.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill the weather slot.
    pub fn with_weather(mut self, skill: Arc<dyn WeatherSkill>) -> Self {
        self.weather = Some(skill);
        self
    }

    /// Fill the image slot.
    pub fn with_image(mut self, skill: Arc<dyn ImageSkill>) -> Self {
        self.image = Some(skill);
        self
    }

    /// Fill the video slot.
    pub fn with_video(mut self, skill: Arc<dyn VideoSkill>) -> Self {
        self.video = Some(skill);
        self
    }

    /// Fill the workspace slot.
    pub fn with_workspace(mut self, skill: Arc<dyn WorkspaceSkill>) -> Self {
        self.workspace = Some(skill);
        self
    }

    /// Fill the search slot.
    pub fn with_search(mut self, skill: Arc<dyn SearchSkill>) -> Self {
        self.search = Some(skill);
        self
    }

    /// Fill the scheduler slot.
    pub fn with_scheduler(mut self, skill: Arc<dyn SchedulerSkill>) -> Self {
        self.scheduler = Some(skill);
        self
    }

    /// Fill the agent slot.
    pub fn with_agent(mut self, skill: Arc<dyn AgentSkill>) -> Self {
        self.agent = Some(skill);
        self
    }

    /// Whether a slot is filled.
    pub fn has(&self, kind: SkillKind) -> bool {
        match kind {
            SkillKind::Weather => self.weather.is_some(),
            SkillKind::Image => self.image.is_some(),
            SkillKind::Video => self.video.is_some(),
            SkillKind::Workspace => self.workspace.is_some(),
            SkillKind::Search => self.search.is_some(),
            SkillKind::Scheduler => self.scheduler.is_some(),
            SkillKind::Agent => self.agent.is_some(),
        }
    }

    /// Whether the workspace slot is filled and reports ready.
    pub fn workspace_ready(&self) -> bool {
        self.workspace
            .as_ref()
            .map(|workspace| workspace.is_ready())
            .unwrap_or(false)
    }
}

impl fmt::Debug for SkillSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SkillSet")
            .field("weather", &self.weather.is_some())
            .field("image", &self.image.is_some())
            .field("video", &self.video.is_some())
            .field("workspace", &self.workspace.is_some())
            .field("search", &self.search.is_some())
            .field("scheduler", &self.scheduler.is_some())
            .field("agent", &self.agent.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedWeather;

    #[async_trait]
    impl WeatherSkill for FixedWeather {
        async fn current(&self, location: &str) -> SkillResult<String> {
            Ok(format!("Sunny in {}", location))
        }

        async fn forecast(&self, location: &str) -> SkillResult<String> {
            Ok(format!("Sunny all week in {}", location))
        }
    }

    struct OfflineWorkspace;

    #[async_trait]
    impl WorkspaceSkill for OfflineWorkspace {
        fn is_ready(&self) -> bool {
            false
        }

        async fn recent_emails(&self, _n: usize) -> SkillResult<String> {
            Err(SkillError::NotConfigured("google workspace".to_string()))
        }

        async fn today_events(&self) -> SkillResult<String> {
            Err(SkillError::NotConfigured("google workspace".to_string()))
        }

        async fn recent_files(&self, _n: usize) -> SkillResult<String> {
            Err(SkillError::NotConfigured("google workspace".to_string()))
        }

        async fn search_files(&self, _term: &str) -> SkillResult<String> {
            Err(SkillError::NotConfigured("google workspace".to_string()))
        }

        async fn send_email(&self, _to: &str, _subject: &str, _body: &str) -> SkillResult<String> {
            Err(SkillError::NotConfigured("google workspace".to_string()))
        }
    }

    #[test]
    fn test_empty_set_has_nothing() {
        let skills = SkillSet::new();
        assert!(!skills.has(SkillKind::Weather));
        assert!(!skills.has(SkillKind::Agent));
        assert!(!skills.workspace_ready());
    }

    #[test]
    fn test_with_weather_fills_slot() {
        let skills = SkillSet::new().with_weather(Arc::new(FixedWeather));
        assert!(skills.has(SkillKind::Weather));
        assert!(!skills.has(SkillKind::Image));
    }

    #[test]
    fn test_workspace_present_but_not_ready() {
        let skills = SkillSet::new().with_workspace(Arc::new(OfflineWorkspace));
        assert!(skills.has(SkillKind::Workspace));
        assert!(!skills.workspace_ready());
    }

    #[test]
    fn test_media_payload_serialization() {
        let payload = MediaPayload::image("aGVsbG8=");
        let json = serde_json::to_string(&payload).unwrap();
        assert!(json.contains(r#""imageBase64":"aGVsbG8=""#));
        assert!(!json.contains("message"));

        let payload = MediaPayload::failed("service down");
        let json = serde_json::to_string(&payload).unwrap();
        assert!(json.contains(r#""success":false"#));
    }
}
