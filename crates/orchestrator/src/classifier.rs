//! LLM fallback classifier.
//!
//! Messages no pattern claims get one cheap, bounded call to the fast
//! backend asking for a single word: CHAT or ACTION. Anything that goes
//! wrong (timeout, error, unparseable reply) defaults to CHAT, which is
//! the harmless direction to be wrong in.

use std::sync::Arc;
use std::time::Duration;

use assistant_core::{hash_prompt, Brain, ChatRequest};
use tracing::{debug, info, warn};

use crate::route::ChatLabel;

/// Default ceiling on a classification call.
const DEFAULT_CLASSIFY_TIMEOUT_SECS: u64 = 8;

/// System prompt for the CHAT/ACTION verdict.
pub const CLASSIFIER_SYSTEM_PROMPT: &str = r#"You are a message classifier. Decide whether the user's message is casual conversation or a request to get something done.

Reply with exactly one word:
- CHAT: greetings, opinions, questions answerable from general knowledge, banter.
- ACTION: the user wants something done, looked up in their own data, or produced.

Examples:

Message: good morning!
CHAT

Message: what do you think about rust vs go?
CHAT

Message: pull together everything we know about the Acme account
ACTION

Message: I need the Q3 numbers before my 2pm
ACTION

Message: haha that's great
CHAT

One word. No punctuation. No explanation."#;

/// Classifier over the fast backend.
pub struct Classifier {
    brain: Arc<dyn Brain>,
    timeout: Duration,
    prompt_hash: String,
}

impl Classifier {
    /// Create a classifier using the given brain.
    pub fn new(brain: Arc<dyn Brain>) -> Self {
        let prompt_hash = hash_prompt(CLASSIFIER_SYSTEM_PROMPT);
        info!("Classifier prompt fingerprint: {}", prompt_hash);

        Self {
            brain,
            timeout: Duration::from_secs(DEFAULT_CLASSIFY_TIMEOUT_SECS),
            prompt_hash,
        }
    }

    /// Set the per-call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Fingerprint of the classifier prompt.
    pub fn prompt_hash(&self) -> &str {
        &self.prompt_hash
    }

    /// Classify a message. Never errors; failures default to CHAT.
    pub async fn classify(&self, message: &str) -> ChatLabel {
        let request = ChatRequest::from_user(message)
            .with_system(CLASSIFIER_SYSTEM_PROMPT)
            .with_max_tokens(8)
            .with_temperature(0.0);

        match tokio::time::timeout(self.timeout, self.brain.chat(request)).await {
            Ok(Ok(reply)) => {
                let label = parse_label(&reply);
                debug!(raw = %reply.trim(), ?label, "Classifier verdict");
                label
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Classifier call failed; defaulting to chat");
                ChatLabel::Chat
            }
            Err(_) => {
                warn!(
                    timeout_secs = self.timeout.as_secs(),
                    "Classifier timed out; defaulting to chat"
                );
                ChatLabel::Chat
            }
        }
    }
}

/// Read the verdict out of a model reply.
///
/// Takes the first whitespace-separated token, sheds any punctuation
/// the model wrapped it in, and compares case-insensitively. Anything
/// that is not ACTION is CHAT.
fn parse_label(reply: &str) -> ChatLabel {
    let token = reply.split_whitespace().next().unwrap_or("");
    let token = token.trim_matches(|c: char| !c.is_ascii_alphabetic());

    if token.eq_ignore_ascii_case("action") {
        ChatLabel::Action
    } else {
        ChatLabel::Chat
    }
}
