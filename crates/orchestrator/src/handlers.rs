//! Field extraction for email and reminder requests.
//!
//! Both flows use the fast backend once, as a parser rather than a
//! writer: it returns a small JSON object, which goes through the shared
//! lenient extractor. Incomplete fields never guess; the user gets a
//! worked example of what to say instead, and no skill call is made.

use std::sync::Arc;

use assistant_core::{parse_object, Brain, ChatRequest, SkillSet};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

/// Shown when an email request lacks a recipient or cannot be parsed.
pub const EMAIL_GUIDANCE: &str = "To send an email I need at least a recipient. Try something like: \"send an email to sam@example.com about Friday's demo saying we're on track.\"";

/// Shown when a reminder request lacks a time or message.
pub const REMINDER_GUIDANCE: &str = "To set a reminder I need a time and what to say. Try something like: \"remind me tomorrow at 9am to call the dentist.\"";

const EMAIL_PARSE_PROMPT: &str = r#"Extract email fields from the user's message.

Respond with JSON only, in exactly this shape:
{"to": "...", "subject": "...", "body": "..."}

Use null for any field the message does not state. Do not invent a recipient. No explanation."#;

const REMINDER_PARSE_PROMPT: &str = r#"Extract reminder fields from the user's message.

Respond with JSON only, in exactly this shape:
{"time": "...", "message": "..."}

The time may stay in the user's own words ("tomorrow at 9am"). Use null for any field the message does not state. No explanation."#;

#[derive(Debug, Deserialize)]
struct EmailDraft {
    #[serde(default)]
    to: Option<String>,
    #[serde(default)]
    subject: Option<String>,
    #[serde(default)]
    body: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReminderSpec {
    #[serde(default)]
    time: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Parses action requests into fields and executes them via skills.
pub struct ParseHandlers {
    fast: Arc<dyn Brain>,
}

impl ParseHandlers {
    /// Create handlers using the given brain for extraction.
    pub fn new(fast: Arc<dyn Brain>) -> Self {
        Self { fast }
    }

    async fn extract<T: DeserializeOwned>(&self, system: &str, message: &str) -> Option<T> {
        let request = ChatRequest::from_user(message)
            .with_system(system)
            .with_max_tokens(200)
            .with_temperature(0.1);

        match self.fast.chat(request).await {
            Ok(reply) => parse_object(&reply),
            Err(e) => {
                warn!(error = %e, "Field extraction call failed");
                None
            }
        }
    }

    /// Parse an email request and send it through the workspace skill.
    ///
    /// A missing recipient stops the flow before any send attempt.
    pub async fn send_email(&self, message: &str, skills: &SkillSet) -> String {
        let Some(workspace) = skills.workspace.as_ref() else {
            return "Email isn't connected right now.".to_string();
        };

        let draft: Option<EmailDraft> = self.extract(EMAIL_PARSE_PROMPT, message).await;
        let Some(draft) = draft else {
            return EMAIL_GUIDANCE.to_string();
        };

        let Some(to) = non_blank(draft.to) else {
            debug!("Email request had no recipient; asking for one");
            return EMAIL_GUIDANCE.to_string();
        };
        let subject = non_blank(draft.subject).unwrap_or_else(|| "(no subject)".to_string());
        let body = non_blank(draft.body).unwrap_or_default();

        match workspace.send_email(&to, &subject, &body).await {
            Ok(_) => format!("Sent! Your email to {} (\"{}\") is on its way.", to, subject),
            Err(e) => {
                warn!(error = %e, "Send email failed");
                format!("I couldn't send that email: {}", e)
            }
        }
    }

    /// Parse a reminder request and schedule it.
    ///
    /// Both the time and the message are required; either missing stops
    /// the flow before any scheduling attempt.
    pub async fn add_reminder(
        &self,
        message: &str,
        skills: &SkillSet,
        user_id: &str,
        transport: &str,
    ) -> String {
        let Some(scheduler) = skills.scheduler.as_ref() else {
            return "Reminders aren't available right now.".to_string();
        };

        let spec: Option<ReminderSpec> = self.extract(REMINDER_PARSE_PROMPT, message).await;
        let Some(spec) = spec else {
            return REMINDER_GUIDANCE.to_string();
        };

        let (Some(time), Some(text)) = (non_blank(spec.time), non_blank(spec.message)) else {
            debug!("Reminder request missing time or message; asking for both");
            return REMINDER_GUIDANCE.to_string();
        };

        match scheduler.add_reminder(user_id, &time, &text, transport).await {
            Ok(_) => format!("Reminder set for {}: {}", time, text),
            Err(e) => {
                warn!(error = %e, "Add reminder failed");
                format!("I couldn't set that reminder: {}", e)
            }
        }
    }
}
