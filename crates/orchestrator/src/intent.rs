//! Deterministic intent matching.
//!
//! Messages run through an ordered list of patterns before any LLM is
//! consulted. Each pattern is a plain predicate over the message text
//! and the available skills; the first match wins. Patterns that need a
//! skill check its slot first, so a deployment without, say, a video
//! service simply never produces a video route.
//!
//! Ordering is part of the contract: overrides beat everything, media
//! beats weather, explicit actions beat reads, and the web-search and
//! multi-step patterns come last before the classifier fallback.

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use assistant_core::SkillSet;

use crate::media::{clean_media_prompt, parse_video_options};
use crate::route::{ChatLabel, ComposeKind, DataSource, OverrideTarget, RouteDecision};

/// Location used when a weather message names no place.
pub const DEFAULT_WEATHER_LOCATION: &str = "London";

/// Capitalized place name after "in", "for", or "at". Consecutive
/// capitalized words are kept so "New York" stays whole.
static LOCATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:in|for|at)\s+([A-Z][A-Za-z]+(?:\s+[A-Z][A-Za-z]+)*)")
        .expect("location regex")
});

/// Leading search phrasing stripped to form a query.
static SEARCH_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:can you |could you |please )*(?:search (?:the web )?for |search |look up |google )")
        .expect("search prefix regex")
});

/// A named predicate in the routing order.
///
/// `matcher` returns a decision when the pattern claims the message.
/// The name shows up in logs; keep it aligned with the decision tag.
#[derive(Clone)]
pub struct IntentPattern {
    pub name: &'static str,
    pub matcher: fn(&str, &SkillSet) -> Option<RouteDecision>,
}

impl std::fmt::Debug for IntentPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntentPattern")
            .field("name", &self.name)
            .finish()
    }
}

/// Ordered first-match router over [`IntentPattern`]s.
pub struct IntentRouter {
    patterns: Vec<IntentPattern>,
}

impl Default for IntentRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl IntentRouter {
    /// Router with the default pattern order.
    pub fn new() -> Self {
        Self {
            patterns: default_patterns(),
        }
    }

    /// Router with a custom pattern list.
    ///
    /// Order is significant; earlier patterns win.
    pub fn with_patterns(patterns: Vec<IntentPattern>) -> Self {
        Self { patterns }
    }

    /// The patterns in match order.
    pub fn patterns(&self) -> &[IntentPattern] {
        &self.patterns
    }

    /// Run the message through the patterns; the first match wins.
    ///
    /// `None` means no pattern claimed it and the classifier should
    /// decide.
    pub fn match_message(&self, message: &str, skills: &SkillSet) -> Option<RouteDecision> {
        for pattern in &self.patterns {
            if let Some(decision) = (pattern.matcher)(message, skills) {
                debug!(
                    pattern = pattern.name,
                    tag = decision.tag(),
                    "Intent pattern matched"
                );
                return Some(decision);
            }
        }
        None
    }
}

/// The default routing order.
pub fn default_patterns() -> Vec<IntentPattern> {
    vec![
        IntentPattern {
            name: "override",
            matcher: match_override,
        },
        IntentPattern {
            name: "media-upscale",
            matcher: match_upscale,
        },
        IntentPattern {
            name: "media-image-ultra",
            matcher: match_ultra_image,
        },
        IntentPattern {
            name: "media-image",
            matcher: match_image,
        },
        IntentPattern {
            name: "media-video",
            matcher: match_video,
        },
        IntentPattern {
            name: "weather",
            matcher: match_weather,
        },
        IntentPattern {
            name: "send-email",
            matcher: match_send_email,
        },
        IntentPattern {
            name: "reminder",
            matcher: match_reminder,
        },
        IntentPattern {
            name: "compose",
            matcher: match_compose,
        },
        IntentPattern {
            name: "data-read",
            matcher: match_data_read,
        },
        IntentPattern {
            name: "web-search",
            matcher: match_web_search,
        },
        IntentPattern {
            name: "multi-step",
            matcher: match_multi_step,
        },
    ]
}

/// Whole-word containment check. "search" does not match "research".
fn contains_word(text: &str, word: &str) -> bool {
    text.match_indices(word).any(|(i, _)| {
        let before_ok = text[..i]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let after_ok = text[i + word.len()..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric());
        before_ok && after_ok
    })
}

fn contains_any_word(text: &str, words: &[&str]) -> bool {
    words.iter().any(|word| contains_word(text, word))
}

fn match_override(message: &str, _skills: &SkillSet) -> Option<RouteDecision> {
    const TARGETS: [(&str, OverrideTarget); 4] = [
        ("/claude", OverrideTarget::Claude),
        ("/gemini", OverrideTarget::Gemini),
        ("/agent", OverrideTarget::Agent),
        ("/plan", OverrideTarget::Plan),
    ];

    for (prefix, target) in TARGETS {
        if let Some(rest) = message.strip_prefix(prefix) {
            if rest.is_empty() || rest.starts_with(char::is_whitespace) {
                return Some(RouteDecision::Override {
                    target,
                    text: rest.trim().to_string(),
                });
            }
        }
    }
    None
}

fn is_image_request(lower: &str) -> bool {
    const NOUNS: [&str; 6] = [
        "image",
        "picture",
        "photo",
        "illustration",
        "drawing",
        "wallpaper",
    ];
    const GENERIC_VERBS: [&str; 4] = ["generate", "create", "make", "render"];
    const STRONG_VERBS: [&str; 2] = ["draw", "paint"];

    contains_any_word(lower, &STRONG_VERBS)
        || (contains_any_word(lower, &NOUNS) && contains_any_word(lower, &GENERIC_VERBS))
}

fn is_video_request(lower: &str) -> bool {
    const NOUNS: [&str; 3] = ["video", "clip", "animation"];
    const VERBS: [&str; 4] = ["generate", "create", "make", "render"];

    contains_word(lower, "animate")
        || (contains_any_word(lower, &NOUNS) && contains_any_word(lower, &VERBS))
}

fn match_upscale(message: &str, skills: &SkillSet) -> Option<RouteDecision> {
    if skills.image.is_none() {
        return None;
    }
    if message.to_lowercase().contains("upscale") {
        return Some(RouteDecision::MediaUpscale);
    }
    None
}

fn match_ultra_image(message: &str, skills: &SkillSet) -> Option<RouteDecision> {
    if skills.image.is_none() {
        return None;
    }
    let lower = message.to_lowercase();
    if is_image_request(&lower) && contains_word(&lower, "ultra") {
        return Some(RouteDecision::MediaImageUltra {
            prompt: clean_media_prompt(message),
        });
    }
    None
}

fn match_image(message: &str, skills: &SkillSet) -> Option<RouteDecision> {
    if skills.image.is_none() {
        return None;
    }
    if is_image_request(&message.to_lowercase()) {
        return Some(RouteDecision::MediaImage {
            prompt: clean_media_prompt(message),
        });
    }
    None
}

fn match_video(message: &str, skills: &SkillSet) -> Option<RouteDecision> {
    if skills.video.is_none() {
        return None;
    }
    if is_video_request(&message.to_lowercase()) {
        return Some(RouteDecision::MediaVideo {
            prompt: clean_media_prompt(message),
            options: parse_video_options(message),
        });
    }
    None
}

fn match_weather(message: &str, skills: &SkillSet) -> Option<RouteDecision> {
    if skills.weather.is_none() {
        return None;
    }
    let lower = message.to_lowercase();
    if !contains_any_word(&lower, &["weather", "forecast"]) {
        return None;
    }

    let location = LOCATION_RE
        .captures(message)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_else(|| DEFAULT_WEATHER_LOCATION.to_string());

    let forecast = contains_word(&lower, "forecast")
        || contains_word(&lower, "tomorrow")
        || lower.contains("this week")
        || lower.contains("next week");

    Some(RouteDecision::Weather { location, forecast })
}

fn match_send_email(message: &str, skills: &SkillSet) -> Option<RouteDecision> {
    if !skills.workspace_ready() {
        return None;
    }
    let lower = message.to_lowercase();
    // Require an explicit send verb (or leading "email X") so that
    // messages merely mentioning email, like "research X and then email
    // me a summary", stay available to later patterns.
    let send_verb = contains_word(&lower, "send")
        && (contains_word(&lower, "email") || contains_word(&lower, "mail"));
    if send_verb || lower.starts_with("email ") {
        return Some(RouteDecision::SendEmail);
    }
    None
}

fn match_reminder(message: &str, skills: &SkillSet) -> Option<RouteDecision> {
    if skills.scheduler.is_none() {
        return None;
    }
    // Substring on purpose: covers remind, reminder, reminders.
    if message.to_lowercase().contains("remind") {
        return Some(RouteDecision::Reminder);
    }
    None
}

fn match_compose(message: &str, _skills: &SkillSet) -> Option<RouteDecision> {
    let lower = message.to_lowercase();

    // The verb, not the noun: "summarize this" composes, "email me a
    // summary" does not.
    if contains_any_word(&lower, &["summarize", "summarise"]) {
        return Some(RouteDecision::Compose(ComposeKind::Summarize));
    }

    if !contains_any_word(&lower, &["write", "draft", "compose"]) {
        return None;
    }

    const DOCUMENT_NOUNS: [&str; 6] = [
        "document", "report", "proposal", "essay", "article", "blog post",
    ];
    if DOCUMENT_NOUNS.iter().any(|noun| lower.contains(noun)) {
        return Some(RouteDecision::Compose(ComposeKind::Document));
    }

    const DRAFT_NOUNS: [&str; 5] = ["email", "reply", "response", "message", "letter"];
    if DRAFT_NOUNS.iter().any(|noun| lower.contains(noun)) {
        return Some(RouteDecision::Compose(ComposeKind::Draft));
    }

    None
}

fn match_data_read(message: &str, skills: &SkillSet) -> Option<RouteDecision> {
    if !skills.workspace_ready() {
        return None;
    }
    let lower = message.to_lowercase();

    const READ_VERBS: [&str; 8] = [
        "check", "read", "show", "open", "look", "list", "search", "find",
    ];
    let has_verb = contains_any_word(&lower, &READ_VERBS)
        || lower.contains("what's on")
        || lower.contains("whats on")
        || lower.contains("anything on");
    if !has_verb {
        return None;
    }

    const CALENDAR_NOUNS: [&str; 8] = [
        "calendar",
        "schedule",
        "agenda",
        "meeting",
        "meetings",
        "event",
        "events",
        "appointments",
    ];
    if contains_any_word(&lower, &CALENDAR_NOUNS) {
        return Some(RouteDecision::DataRead(DataSource::Calendar));
    }

    const EMAIL_NOUNS: [&str; 4] = ["email", "emails", "inbox", "mail"];
    if contains_any_word(&lower, &EMAIL_NOUNS) {
        return Some(RouteDecision::DataRead(DataSource::Email));
    }

    const DRIVE_NOUNS: [&str; 8] = [
        "drive",
        "file",
        "files",
        "folder",
        "folders",
        "document",
        "documents",
        "docs",
    ];
    if contains_any_word(&lower, &DRIVE_NOUNS) {
        return Some(RouteDecision::DataRead(DataSource::Drive));
    }

    None
}

fn match_web_search(message: &str, skills: &SkillSet) -> Option<RouteDecision> {
    if skills.search.is_none() {
        return None;
    }
    let lower = message.to_lowercase();
    let wants_search = contains_word(&lower, "search")
        || lower.contains("look up")
        || contains_word(&lower, "google")
        || contains_word(&lower, "latest")
        || contains_word(&lower, "news");
    if wants_search {
        return Some(RouteDecision::WebSearch {
            query: derive_search_query(message),
        });
    }
    None
}

fn match_multi_step(message: &str, skills: &SkillSet) -> Option<RouteDecision> {
    if skills.agent.is_none() {
        return None;
    }
    let lower = message.to_lowercase();

    const CONJUNCTIONS: [&str; 4] = ["and then", "after that", "followed by", "once that's done"];
    if CONJUNCTIONS.iter().any(|c| lower.contains(c)) {
        return Some(RouteDecision::MultiStep);
    }

    // "research X and email me" style: a gathering verb and a follow-up
    // verb joined by "and".
    const GATHER_VERBS: [&str; 5] = ["research", "find", "gather", "compile", "investigate"];
    const FOLLOWUP_VERBS: [&str; 4] = ["email", "send", "schedule", "share"];
    if lower.contains(" and ")
        && contains_any_word(&lower, &GATHER_VERBS)
        && contains_any_word(&lower, &FOLLOWUP_VERBS)
    {
        return Some(RouteDecision::MultiStep);
    }

    None
}

/// Strip search phrasing from a message to form the query.
pub fn derive_search_query(message: &str) -> String {
    let trimmed = message.trim();
    let stripped = SEARCH_PREFIX_RE.replace(trimmed, "");
    let query = stripped.trim();
    if query.is_empty() {
        trimmed.to_string()
    } else {
        query.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assistant_core::{
        async_trait, AgentSkill, ImageSkill, MediaPayload, SchedulerSkill, SearchSkill,
        SkillResult, VideoOptions, VideoSkill, WeatherSkill, WorkspaceSkill,
    };
    use std::sync::Arc;

    struct StubWeather;

    #[async_trait]
    impl WeatherSkill for StubWeather {
        async fn current(&self, _location: &str) -> SkillResult<String> {
            Ok("sunny".to_string())
        }
        async fn forecast(&self, _location: &str) -> SkillResult<String> {
            Ok("sunny all week".to_string())
        }
    }

    struct StubImage;

    #[async_trait]
    impl ImageSkill for StubImage {
        async fn generate(&self, _prompt: &str) -> SkillResult<MediaPayload> {
            Ok(MediaPayload::image("data"))
        }
        async fn ultra_generate(&self, _prompt: &str) -> SkillResult<MediaPayload> {
            Ok(MediaPayload::image("data"))
        }
        async fn upscale(&self) -> SkillResult<MediaPayload> {
            Ok(MediaPayload::image("data"))
        }
    }

    struct StubVideo;

    #[async_trait]
    impl VideoSkill for StubVideo {
        async fn generate_video(
            &self,
            _prompt: &str,
            _options: &VideoOptions,
        ) -> SkillResult<MediaPayload> {
            Ok(MediaPayload::ok("rendering"))
        }
    }

    struct StubWorkspace;

    #[async_trait]
    impl WorkspaceSkill for StubWorkspace {
        fn is_ready(&self) -> bool {
            true
        }
        async fn recent_emails(&self, _n: usize) -> SkillResult<String> {
            Ok(String::new())
        }
        async fn today_events(&self) -> SkillResult<String> {
            Ok(String::new())
        }
        async fn recent_files(&self, _n: usize) -> SkillResult<String> {
            Ok(String::new())
        }
        async fn search_files(&self, _term: &str) -> SkillResult<String> {
            Ok(String::new())
        }
        async fn send_email(&self, _to: &str, _subject: &str, _body: &str) -> SkillResult<String> {
            Ok("sent".to_string())
        }
    }

    struct StubSearch;

    #[async_trait]
    impl SearchSkill for StubSearch {
        async fn search(&self, _query: &str) -> SkillResult<String> {
            Ok("results".to_string())
        }
    }

    struct StubScheduler;

    #[async_trait]
    impl SchedulerSkill for StubScheduler {
        async fn add_reminder(
            &self,
            _user_id: &str,
            _time: &str,
            _message: &str,
            _transport: &str,
        ) -> SkillResult<String> {
            Ok("scheduled".to_string())
        }
    }

    struct StubAgent;

    #[async_trait]
    impl AgentSkill for StubAgent {
        async fn orchestrate(&self, _message: &str) -> SkillResult<Option<String>> {
            Ok(None)
        }
        async fn run(&self, _message: &str) -> SkillResult<String> {
            Ok("done".to_string())
        }
        async fn plan(&self, _message: &str) -> SkillResult<String> {
            Ok("1. do it".to_string())
        }
    }

    fn full_skills() -> SkillSet {
        SkillSet::new()
            .with_weather(Arc::new(StubWeather))
            .with_image(Arc::new(StubImage))
            .with_video(Arc::new(StubVideo))
            .with_workspace(Arc::new(StubWorkspace))
            .with_search(Arc::new(StubSearch))
            .with_scheduler(Arc::new(StubScheduler))
            .with_agent(Arc::new(StubAgent))
    }

    fn route(message: &str) -> Option<RouteDecision> {
        IntentRouter::new().match_message(message, &full_skills())
    }

    fn tag_of(message: &str) -> &'static str {
        route(message).map(|d| d.tag()).unwrap_or("none")
    }

    #[test]
    fn test_override_strips_prefix() {
        let decision = route("/claude explain lifetimes").unwrap();
        match decision {
            RouteDecision::Override { target, text } => {
                assert_eq!(target, OverrideTarget::Claude);
                assert_eq!(text, "explain lifetimes");
            }
            other => panic!("unexpected decision: {:?}", other),
        }
    }

    #[test]
    fn test_override_requires_word_boundary() {
        // "/plans" is not the /plan command
        assert_ne!(tag_of("/plans for the weekend"), "override-plan");
    }

    #[test]
    fn test_ultra_beats_plain_image() {
        assert_eq!(tag_of("generate an ultra image of a cat"), "media-image-ultra");
        assert_eq!(tag_of("generate an image of a cat"), "media-image");
    }

    #[test]
    fn test_upscale_beats_generation() {
        assert_eq!(tag_of("upscale that image please"), "media-upscale");
    }

    #[test]
    fn test_image_beats_video_on_ties() {
        // Priority resolves messages mentioning both
        assert_eq!(
            tag_of("make an image of a cat watching a video"),
            "media-image"
        );
    }

    #[test]
    fn test_video_request() {
        let decision = route("make a video of a sunset, 8 seconds, no audio").unwrap();
        match decision {
            RouteDecision::MediaVideo { prompt, options } => {
                assert_eq!(prompt, "a sunset, 8 seconds, no audio");
                assert_eq!(options.duration_secs, Some(8));
                assert_eq!(options.audio, Some(false));
            }
            other => panic!("unexpected decision: {:?}", other),
        }
    }

    #[test]
    fn test_media_skipped_without_skill() {
        let skills = SkillSet::new().with_weather(Arc::new(StubWeather));
        let decision = IntentRouter::new().match_message("draw a cat", &skills);
        assert!(decision.is_none());
    }

    #[test]
    fn test_weather_extracts_location() {
        let decision = route("what's the weather in New York right now").unwrap();
        match decision {
            RouteDecision::Weather { location, forecast } => {
                assert_eq!(location, "New York");
                assert!(!forecast);
            }
            other => panic!("unexpected decision: {:?}", other),
        }
    }

    #[test]
    fn test_weather_defaults_location() {
        let decision = route("what's the weather like today").unwrap();
        match decision {
            RouteDecision::Weather { location, .. } => {
                assert_eq!(location, DEFAULT_WEATHER_LOCATION);
            }
            other => panic!("unexpected decision: {:?}", other),
        }
    }

    #[test]
    fn test_weather_forecast_flag() {
        let decision = route("weather forecast for Paris").unwrap();
        match decision {
            RouteDecision::Weather { location, forecast } => {
                assert_eq!(location, "Paris");
                assert!(forecast);
            }
            other => panic!("unexpected decision: {:?}", other),
        }
    }

    #[test]
    fn test_weather_is_not_multi_step() {
        assert_eq!(tag_of("what's the weather today"), "weather");
    }

    #[test]
    fn test_send_email_needs_send_verb() {
        assert_eq!(tag_of("send an email to Sam about the demo"), "send-email");
        assert_eq!(tag_of("email Sam the quarterly numbers"), "send-email");
    }

    #[test]
    fn test_send_email_skipped_when_workspace_not_ready() {
        struct NotReady;

        #[async_trait]
        impl WorkspaceSkill for NotReady {
            fn is_ready(&self) -> bool {
                false
            }
            async fn recent_emails(&self, _n: usize) -> SkillResult<String> {
                Ok(String::new())
            }
            async fn today_events(&self) -> SkillResult<String> {
                Ok(String::new())
            }
            async fn recent_files(&self, _n: usize) -> SkillResult<String> {
                Ok(String::new())
            }
            async fn search_files(&self, _term: &str) -> SkillResult<String> {
                Ok(String::new())
            }
            async fn send_email(
                &self,
                _to: &str,
                _subject: &str,
                _body: &str,
            ) -> SkillResult<String> {
                Ok(String::new())
            }
        }

        let skills = SkillSet::new().with_workspace(Arc::new(NotReady));
        let decision = IntentRouter::new().match_message("send an email to Sam", &skills);
        assert!(decision.is_none());
    }

    #[test]
    fn test_reminder() {
        assert_eq!(tag_of("remind me to call mom at 5"), "reminder");
        assert_eq!(tag_of("set a reminder for standup"), "reminder");
    }

    #[test]
    fn test_compose_kinds() {
        assert_eq!(tag_of("write a report on Q3 results"), "compose-document");
        assert_eq!(tag_of("draft a reply to the last message"), "compose-draft");
        assert_eq!(tag_of("summarize our discussion"), "compose-summarize");
    }

    #[test]
    fn test_compose_noun_summary_does_not_fire() {
        // "summary" without a writing verb is not a compose request
        assert_ne!(tag_of("email me a summary"), "compose-summarize");
    }

    #[test]
    fn test_data_read_sources() {
        assert_eq!(tag_of("check my calendar for today"), "read-calendar");
        assert_eq!(tag_of("show me my recent emails"), "read-email");
        assert_eq!(tag_of("check drive"), "read-drive");
        assert_eq!(tag_of("can you search my drive for invoices"), "read-drive");
    }

    #[test]
    fn test_web_search() {
        let decision = route("search for rust 1.80 release notes").unwrap();
        match decision {
            RouteDecision::WebSearch { query } => {
                assert_eq!(query, "rust 1.80 release notes");
            }
            other => panic!("unexpected decision: {:?}", other),
        }
    }

    #[test]
    fn test_research_is_not_web_search() {
        // "research" must not trip the "search" keyword
        assert_eq!(
            tag_of("research competitor pricing and then email me a summary"),
            "multi-step"
        );
    }

    #[test]
    fn test_multi_step_conjunctions() {
        assert_eq!(
            tag_of("book the meeting room and then let everyone know"),
            "multi-step"
        );
        assert_eq!(
            tag_of("gather the best flight options and email them to me"),
            "multi-step"
        );
    }

    #[test]
    fn test_plain_chat_matches_nothing() {
        assert!(route("how was your day?").is_none());
        assert!(route("tell me a joke").is_none());
    }

    #[test]
    fn test_with_patterns_reorders() {
        let mut patterns = default_patterns();
        let ultra = patterns
            .iter()
            .position(|p| p.name == "media-image-ultra")
            .unwrap();
        let image = patterns
            .iter()
            .position(|p| p.name == "media-image")
            .unwrap();
        patterns.swap(ultra, image);

        let router = IntentRouter::with_patterns(patterns);
        let decision = router
            .match_message("generate an ultra image of a cat", &full_skills())
            .unwrap();
        assert_eq!(decision.tag(), "media-image");
    }

    #[test]
    fn test_contains_word_boundaries() {
        assert!(contains_word("search the web", "search"));
        assert!(!contains_word("research pricing", "search"));
        assert!(!contains_word("withdraw cash", "draw"));
        assert!(contains_word("draw a cat", "draw"));
    }

    #[test]
    fn test_derive_search_query() {
        assert_eq!(
            derive_search_query("can you search the web for rust jobs"),
            "rust jobs"
        );
        assert_eq!(derive_search_query("look up the bitcoin price"), "the bitcoin price");
        assert_eq!(derive_search_query("latest on the election"), "latest on the election");
    }
}
