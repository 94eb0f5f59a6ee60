//! The routing core: one inbound message in, one tagged reply out.
//!
//! [`Orchestrator::route`] consults the pattern table, falls back to
//! the LLM classifier when no pattern claims the message, then
//! dispatches on the decision. [`Orchestrator::handle`] wraps it with
//! per-sender history: text replies are recorded, media replies are
//! not.

use std::sync::Arc;
use std::time::Duration;

use assistant_core::{
    hash_prompt, Brain, BrainError, ChatRequest, ChatTurn, ContextStore, ConversationContext,
    MediaPayload, SkillError, SkillResult, SkillSet,
};
use claude_brain::ClaudeBrain;
use gemini_brain::GeminiBrain;
use tracing::{debug, info, warn};

use crate::classifier::Classifier;
use crate::error::OrchestratorError;
use crate::handlers::ParseHandlers;
use crate::intent::IntentRouter;
use crate::prefetch::{derive_drive_term, DataPrefetcher, PrefetchBundle};
use crate::route::{
    ChatLabel, ComposeKind, DataSource, OverrideTarget, RouteDecision, RouteReply, RoutedReply,
};

/// Reply for a blank or whitespace-only message.
const EMPTY_NUDGE: &str = "I didn't catch anything in that message. What can I do for you?";

/// Reply when every backend stage of a route has failed.
pub const FAILURE_NOTE: &str =
    "I'm having trouble reaching my language models right now. Please try again in a bit.";

const WORKSPACE_OFFLINE_NOTE: &str =
    "I can't reach your workspace right now. Try again once it's reconnected.";

const AGENT_OFFLINE_NOTE: &str =
    "I don't have my agent tools available right now, so I can't take on that task.";

const MEDIA_OFFLINE_NOTE: &str = "Media generation isn't available right now.";

const COMPOSE_DOCUMENT_FRAME: &str = "You are a careful writer. Produce the requested document \
in full, ready to use. Do not narrate what you are about to do.";

const COMPOSE_DRAFT_FRAME: &str = "You are drafting a message on the user's behalf. Match the \
tone they ask for, keep it concise, and output only the draft itself.";

const COMPOSE_SUMMARIZE_FRAME: &str =
    "Summarize the material the user points at. Lead with the key points and keep it short.";

const ANALYZE_FRAME: &str = "Answer the user's question using only the data provided above \
their message. If the data does not contain the answer, say so plainly.";

/// Tunable knobs for the routing core.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Identity handed to the scheduler skill when setting reminders.
    pub user_id: String,
    /// Delivery transport handed to the scheduler skill.
    pub reminder_transport: String,
    /// System prompt folded into chat and action stages.
    pub system_prompt: Option<String>,
    /// Turns of history folded into chat and action replies.
    pub chat_context_turns: usize,
    /// Turns of history folded into compose replies.
    pub compose_context_turns: usize,
    /// Turns of history folded into data-analysis replies.
    pub analyze_context_turns: usize,
    /// Exchanges kept per sender.
    pub history_max_exchanges: usize,
    /// Seconds allowed for the chat/action classifier call.
    pub classifier_timeout_secs: u64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            user_id: "default".to_string(),
            reminder_transport: "telegram".to_string(),
            system_prompt: None,
            chat_context_turns: 10,
            compose_context_turns: 5,
            analyze_context_turns: 3,
            history_max_exchanges: 10,
            classifier_timeout_secs: 8,
        }
    }
}

impl OrchestratorConfig {
    /// Load configuration from `JUNIPER_*` environment variables.
    ///
    /// Anything unset keeps its default. Empty strings count as unset.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(user_id) = read_env("JUNIPER_USER_ID") {
            config.user_id = user_id;
        }
        if let Some(transport) = read_env("JUNIPER_REMINDER_TRANSPORT") {
            config.reminder_transport = transport;
        }
        if let Some(secs) =
            read_env("JUNIPER_CLASSIFIER_TIMEOUT_SECS").and_then(|v| v.parse().ok())
        {
            config.classifier_timeout_secs = secs;
        }
        config.system_prompt = load_system_prompt();
        config
    }
}

fn read_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Resolve the system prompt: inline env var first, then a prompt file,
/// then none at all.
fn load_system_prompt() -> Option<String> {
    if let Some(prompt) = read_env("JUNIPER_SYSTEM_PROMPT") {
        info!("Using system prompt from JUNIPER_SYSTEM_PROMPT");
        return Some(prompt);
    }

    if let Some(path) = read_env("JUNIPER_PROMPT_FILE") {
        match std::fs::read_to_string(&path) {
            Ok(contents) => {
                let trimmed = contents.trim();
                if trimmed.is_empty() {
                    warn!(path = %path, "Prompt file is empty; continuing without a system prompt");
                    return None;
                }
                info!(path = %path, "Loaded system prompt from file");
                return Some(trimmed.to_string());
            }
            Err(e) => {
                warn!(
                    path = %path,
                    error = %e,
                    "Failed to read prompt file; continuing without a system prompt"
                );
            }
        }
    }

    None
}

fn build_request(
    system: Option<&str>,
    text: &str,
    turns: usize,
    context: &ConversationContext,
) -> ChatRequest {
    let mut request = ChatRequest {
        system: system.map(|s| s.to_string()),
        ..ChatRequest::default()
    };
    request.turns = context.recent(turns).to_vec();
    request.turns.push(ChatTurn::user(text));
    request
}

fn media_reply(result: SkillResult<MediaPayload>) -> RouteReply {
    match result {
        Ok(payload) => RouteReply::Media(payload),
        Err(e) => {
            warn!(error = %e, "Media generation failed");
            RouteReply::Media(MediaPayload::failed(e.to_string()))
        }
    }
}

fn empty_source_note(source: DataSource) -> &'static str {
    match source {
        DataSource::Calendar => "Your calendar is clear today.",
        DataSource::Email => "No recent emails found.",
        DataSource::Drive => "I didn't find any matching files in your drive.",
    }
}

/// The routing brain.
///
/// Holds two backends with distinct jobs: `deep` (Claude) thinks through
/// multi-step work, `fast` (Gemini) handles chat, classification, field
/// extraction, and data analysis. Skills are checked at match time, so a
/// dispatched route can assume its skill was present a moment ago.
pub struct Orchestrator {
    router: IntentRouter,
    classifier: Classifier,
    prefetcher: DataPrefetcher,
    handlers: ParseHandlers,
    deep: Arc<dyn Brain>,
    fast: Arc<dyn Brain>,
    skills: SkillSet,
    history: Arc<ContextStore>,
    config: OrchestratorConfig,
}

impl Orchestrator {
    /// Create an orchestrator over the given backends and skills.
    pub fn new(
        deep: Arc<dyn Brain>,
        fast: Arc<dyn Brain>,
        skills: SkillSet,
        config: OrchestratorConfig,
    ) -> Self {
        if let Some(prompt) = &config.system_prompt {
            info!(fingerprint = %hash_prompt(prompt), "System prompt active");
        }
        let classifier = Classifier::new(fast.clone())
            .with_timeout(Duration::from_secs(config.classifier_timeout_secs));
        let handlers = ParseHandlers::new(fast.clone());
        let history = Arc::new(ContextStore::new(config.history_max_exchanges));

        Self {
            router: IntentRouter::new(),
            classifier,
            prefetcher: DataPrefetcher::new(),
            handlers,
            deep,
            fast,
            skills,
            history,
            config,
        }
    }

    /// Replace the routing table, e.g. to reorder or extend patterns.
    pub fn with_router(mut self, router: IntentRouter) -> Self {
        self.router = router;
        self
    }

    /// Build from environment: Claude as the deep backend, Gemini as
    /// the fast one.
    pub fn from_env(skills: SkillSet) -> Result<Self, OrchestratorError> {
        let deep = Arc::new(ClaudeBrain::from_env()?);
        let fast = Arc::new(GeminiBrain::from_env()?);
        info!(
            deep = deep.name(),
            fast = fast.name(),
            "Orchestrator backends ready"
        );
        Ok(Self::new(deep, fast, skills, OrchestratorConfig::from_env()))
    }

    /// The per-sender conversation store.
    pub fn history(&self) -> &ContextStore {
        &self.history
    }

    /// The active configuration.
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Route one message for a sender, reading and recording history.
    ///
    /// Text replies are recorded into the sender's conversation; media
    /// replies and the blank-message nudge are not.
    pub async fn handle(&self, sender: &str, message: &str) -> RoutedReply {
        let trimmed = message.trim();
        if trimmed.is_empty() {
            return RoutedReply {
                tag: "empty",
                reply: RouteReply::text(EMPTY_NUDGE),
            };
        }

        let context = self.history.context(sender).await;
        let routed = self.route(trimmed, &context, &self.skills).await;
        info!(sender, tag = routed.tag, "Routed message");

        if let RouteReply::Text(text) = &routed.reply {
            self.history.record_exchange(sender, trimmed, text).await;
        }

        routed
    }

    /// Route one message against an explicit context and skill set.
    ///
    /// This is the stateless core: it never touches per-sender history,
    /// so callers that manage their own conversations can use it
    /// directly.
    pub async fn route(
        &self,
        message: &str,
        context: &ConversationContext,
        skills: &SkillSet,
    ) -> RoutedReply {
        let trimmed = message.trim();
        if trimmed.is_empty() {
            return RoutedReply {
                tag: "empty",
                reply: RouteReply::text(EMPTY_NUDGE),
            };
        }

        let decision = match self.router.match_message(trimmed, skills) {
            Some(decision) => decision,
            None => RouteDecision::Classified(self.classifier.classify(trimmed).await),
        };
        let tag = decision.tag();
        debug!(tag, "Dispatching route");

        let reply = self.dispatch(decision, trimmed, context, skills).await;
        RoutedReply { tag, reply }
    }

    async fn dispatch(
        &self,
        decision: RouteDecision,
        message: &str,
        context: &ConversationContext,
        skills: &SkillSet,
    ) -> RouteReply {
        match decision {
            RouteDecision::Override { target, text } => {
                self.run_override(target, &text, context, skills).await
            }
            RouteDecision::MediaUpscale => {
                let Some(image) = skills.image.as_ref() else {
                    return RouteReply::text(MEDIA_OFFLINE_NOTE);
                };
                media_reply(image.upscale().await)
            }
            RouteDecision::MediaImageUltra { prompt } => {
                let Some(image) = skills.image.as_ref() else {
                    return RouteReply::text(MEDIA_OFFLINE_NOTE);
                };
                media_reply(image.ultra_generate(&prompt).await)
            }
            RouteDecision::MediaImage { prompt } => {
                let Some(image) = skills.image.as_ref() else {
                    return RouteReply::text(MEDIA_OFFLINE_NOTE);
                };
                media_reply(image.generate(&prompt).await)
            }
            RouteDecision::MediaVideo { prompt, options } => {
                let Some(video) = skills.video.as_ref() else {
                    return RouteReply::text(MEDIA_OFFLINE_NOTE);
                };
                media_reply(video.generate_video(&prompt, &options).await)
            }
            RouteDecision::Weather { location, forecast } => {
                let Some(weather) = skills.weather.as_ref() else {
                    return RouteReply::text("Weather lookups aren't available right now.");
                };
                let result = if forecast {
                    weather.forecast(&location).await
                } else {
                    weather.current(&location).await
                };
                match result {
                    Ok(report) => RouteReply::text(report),
                    Err(e) => {
                        warn!(error = %e, location = %location, "Weather lookup failed");
                        RouteReply::text(format!(
                            "I couldn't get the weather for {} right now.",
                            location
                        ))
                    }
                }
            }
            RouteDecision::SendEmail => {
                RouteReply::text(self.handlers.send_email(message, skills).await)
            }
            RouteDecision::Reminder => RouteReply::text(
                self.handlers
                    .add_reminder(
                        message,
                        skills,
                        &self.config.user_id,
                        &self.config.reminder_transport,
                    )
                    .await,
            ),
            RouteDecision::Compose(kind) => {
                RouteReply::text(self.run_compose(kind, message, context).await)
            }
            RouteDecision::DataRead(source) => RouteReply::text(
                self.answer_from_workspace(source, message, context, skills)
                    .await,
            ),
            RouteDecision::WebSearch { query } => {
                RouteReply::text(self.run_web_search(&query, message, context, skills).await)
            }
            RouteDecision::MultiStep => {
                RouteReply::text(self.run_multi_step(message, context, skills).await)
            }
            RouteDecision::Classified(ChatLabel::Chat) => {
                RouteReply::text(self.single_stage(self.fast.as_ref(), message, context).await)
            }
            RouteDecision::Classified(ChatLabel::Action) => {
                let bundle = self.prefetcher.gather(message, skills).await;
                RouteReply::text(
                    self.deep_with_fallback(
                        self.config.system_prompt.as_deref(),
                        message,
                        &bundle,
                        self.config.chat_context_turns,
                        context,
                    )
                    .await,
                )
            }
        }
    }

    async fn run_override(
        &self,
        target: OverrideTarget,
        text: &str,
        context: &ConversationContext,
        skills: &SkillSet,
    ) -> RouteReply {
        if text.is_empty() {
            let usage = match target {
                OverrideTarget::Claude => "Say /claude followed by your message.",
                OverrideTarget::Gemini => "Say /gemini followed by your message.",
                OverrideTarget::Agent => "Say /agent followed by the task to run.",
                OverrideTarget::Plan => "Say /plan followed by the task to plan.",
            };
            return RouteReply::text(usage);
        }

        match target {
            OverrideTarget::Claude => {
                RouteReply::text(self.single_stage(self.deep.as_ref(), text, context).await)
            }
            OverrideTarget::Gemini => {
                RouteReply::text(self.single_stage(self.fast.as_ref(), text, context).await)
            }
            OverrideTarget::Agent => {
                RouteReply::text(self.agent_override(text, false, skills).await)
            }
            OverrideTarget::Plan => RouteReply::text(self.agent_override(text, true, skills).await),
        }
    }

    async fn agent_override(&self, text: &str, plan_only: bool, skills: &SkillSet) -> String {
        let Some(agent) = skills.agent.as_ref() else {
            return AGENT_OFFLINE_NOTE.to_string();
        };

        let result = if plan_only {
            agent.plan(text).await
        } else {
            agent.run(text).await
        };
        match result {
            Ok(output) if !output.trim().is_empty() => output,
            Ok(_) => {
                warn!(plan_only, "Agent returned an empty result");
                "The agent finished without producing a result. Try rephrasing the task."
                    .to_string()
            }
            Err(e) => {
                warn!(plan_only, error = %e, "Agent override failed");
                format!("The agent couldn't finish that: {}", e)
            }
        }
    }

    async fn run_compose(
        &self,
        kind: ComposeKind,
        message: &str,
        context: &ConversationContext,
    ) -> String {
        let frame = match kind {
            ComposeKind::Document => COMPOSE_DOCUMENT_FRAME,
            ComposeKind::Draft => COMPOSE_DRAFT_FRAME,
            ComposeKind::Summarize => COMPOSE_SUMMARIZE_FRAME,
        };
        self.deep_with_fallback(
            Some(frame),
            message,
            &PrefetchBundle::new(),
            self.config.compose_context_turns,
            context,
        )
        .await
    }

    async fn answer_from_workspace(
        &self,
        source: DataSource,
        message: &str,
        context: &ConversationContext,
        skills: &SkillSet,
    ) -> String {
        let Some(workspace) = skills.workspace.as_ref() else {
            return WORKSPACE_OFFLINE_NOTE.to_string();
        };
        if !workspace.is_ready() {
            return WORKSPACE_OFFLINE_NOTE.to_string();
        }

        let (label, fetched) = match source {
            DataSource::Calendar => ("TODAY'S CALENDAR", workspace.today_events().await),
            DataSource::Email => (
                "RECENT EMAILS",
                workspace.recent_emails(self.prefetcher.email_count()).await,
            ),
            DataSource::Drive => {
                let term = derive_drive_term(message);
                debug!(term = %term, "Searching drive");
                ("DRIVE FILES", workspace.search_files(&term).await)
            }
        };

        let data = match fetched {
            Ok(data) => data,
            Err(SkillError::NotConfigured(what)) => {
                return format!("{} isn't set up yet.", what);
            }
            Err(e) => {
                warn!(error = %e, "Workspace read failed");
                return "I couldn't reach that part of your workspace just now.".to_string();
            }
        };

        // Empty data gets a canned note without spending a model call.
        if data.trim().is_empty() {
            return empty_source_note(source).to_string();
        }

        let folded = format!("=== {} ===\n{}\n\n{}", label, data, message);
        match self
            .try_stage(
                self.fast.as_ref(),
                Some(ANALYZE_FRAME),
                &folded,
                self.config.analyze_context_turns,
                context,
            )
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                warn!(backend = self.fast.name(), error = %e, "Workspace analysis failed");
                FAILURE_NOTE.to_string()
            }
        }
    }

    async fn run_web_search(
        &self,
        query: &str,
        message: &str,
        context: &ConversationContext,
        skills: &SkillSet,
    ) -> String {
        let Some(search) = skills.search.as_ref() else {
            return "Web search isn't available right now.".to_string();
        };

        let results = match search.search(query).await {
            Ok(results) => results,
            Err(e) => {
                warn!(error = %e, query, "Web search failed");
                return "I couldn't run that search just now.".to_string();
            }
        };
        if results.trim().is_empty() {
            return format!("I didn't find anything for \"{}\".", query);
        }

        let folded = format!("=== WEB SEARCH RESULTS ===\n{}\n\n{}", results, message);
        match self
            .try_stage(
                self.fast.as_ref(),
                Some(ANALYZE_FRAME),
                &folded,
                self.config.analyze_context_turns,
                context,
            )
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                warn!(backend = self.fast.name(), error = %e, "Search summarization failed");
                FAILURE_NOTE.to_string()
            }
        }
    }

    async fn run_multi_step(
        &self,
        message: &str,
        context: &ConversationContext,
        skills: &SkillSet,
    ) -> String {
        if let Some(agent) = skills.agent.as_ref() {
            match agent.orchestrate(message).await {
                Ok(Some(result)) if !result.trim().is_empty() => return result,
                Ok(_) => debug!("Agent orchestration declined; trying direct run"),
                Err(e) => warn!(error = %e, "Agent orchestration failed; trying direct run"),
            }
            match agent.run(message).await {
                Ok(result) if !result.trim().is_empty() => return result,
                Ok(_) => warn!("Agent run returned an empty result; falling back to backends"),
                Err(e) => warn!(error = %e, "Agent run failed; falling back to backends"),
            }
        } else {
            debug!("No agent skill wired; handling multi-step with backends");
        }

        let bundle = self.prefetcher.gather(message, skills).await;
        self.deep_with_fallback(
            self.config.system_prompt.as_deref(),
            message,
            &bundle,
            self.config.chat_context_turns,
            context,
        )
        .await
    }

    /// One backend, one attempt; failure or an empty reply becomes the
    /// failure note.
    async fn single_stage(
        &self,
        brain: &dyn Brain,
        text: &str,
        context: &ConversationContext,
    ) -> String {
        match self
            .try_stage(
                brain,
                self.config.system_prompt.as_deref(),
                text,
                self.config.chat_context_turns,
                context,
            )
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                warn!(backend = brain.name(), error = %e, "Chat stage failed");
                FAILURE_NOTE.to_string()
            }
        }
    }

    /// Deep backend first, then fast with the same folded input, then
    /// fast with the plain message if data had been folded in. Each
    /// transition is logged; exhaustion yields [`FAILURE_NOTE`].
    async fn deep_with_fallback(
        &self,
        system: Option<&str>,
        message: &str,
        bundle: &PrefetchBundle,
        turns: usize,
        context: &ConversationContext,
    ) -> String {
        let folded = if bundle.is_empty() {
            message.to_string()
        } else {
            format!("{}\n\n{}", bundle.render(), message)
        };

        match self
            .try_stage(self.deep.as_ref(), system, &folded, turns, context)
            .await
        {
            Ok(reply) => return reply,
            Err(e) => {
                warn!(stage = "deep", backend = self.deep.name(), error = %e, "Stage failed; falling back");
            }
        }

        match self
            .try_stage(self.fast.as_ref(), system, &folded, turns, context)
            .await
        {
            Ok(reply) => return reply,
            Err(e) => {
                warn!(stage = "fast", backend = self.fast.name(), error = %e, "Stage failed; falling back");
            }
        }

        if folded != message {
            match self
                .try_stage(self.fast.as_ref(), system, message, turns, context)
                .await
            {
                Ok(reply) => return reply,
                Err(e) => {
                    warn!(stage = "fast-plain", backend = self.fast.name(), error = %e, "Stage failed");
                }
            }
        }

        FAILURE_NOTE.to_string()
    }

    async fn try_stage(
        &self,
        brain: &dyn Brain,
        system: Option<&str>,
        text: &str,
        turns: usize,
        context: &ConversationContext,
    ) -> Result<String, BrainError> {
        let request = build_request(system, text, turns, context);
        let reply = brain.chat(request).await?;
        let trimmed = reply.trim();
        if trimmed.is_empty() {
            return Err(BrainError::EmptyResponse);
        }
        Ok(trimmed.to_string())
    }
}
