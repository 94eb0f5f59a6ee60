//! Best-effort data prefetch for action requests.
//!
//! Before an action-classified message reaches the deep backend, data
//! it plausibly needs gets fetched and folded into the prompt as labeled
//! sections. Every fetch is best-effort: a failing or empty source is
//! logged and skipped, never fatal, so a flaky calendar API degrades the
//! answer instead of killing it.

use assistant_core::SkillSet;
use tracing::{debug, warn};

/// One labeled block of prefetched data.
#[derive(Debug, Clone, PartialEq)]
pub struct PrefetchSection {
    /// Section heading, e.g. "RECENT EMAILS".
    pub label: String,
    /// The fetched data, rendered as text.
    pub body: String,
}

/// Ordered collection of prefetched sections.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrefetchBundle {
    sections: Vec<PrefetchSection>,
}

impl PrefetchBundle {
    /// An empty bundle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a section. Blank bodies are dropped.
    pub fn push(&mut self, label: impl Into<String>, body: impl Into<String>) {
        let body = body.into();
        let body = body.trim();
        if body.is_empty() {
            return;
        }
        self.sections.push(PrefetchSection {
            label: label.into(),
            body: body.to_string(),
        });
    }

    /// Whether any sections were collected.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Number of sections.
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// The sections in fetch order.
    pub fn sections(&self) -> &[PrefetchSection] {
        &self.sections
    }

    /// Render sections for prompt folding.
    ///
    /// Each section becomes `=== LABEL ===` followed by its body;
    /// sections are separated by a blank line.
    pub fn render(&self) -> String {
        self.sections
            .iter()
            .map(|section| format!("=== {} ===\n{}", section.label, section.body))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

fn wants_email(lower: &str) -> bool {
    ["email", "inbox", "mail"].iter().any(|k| lower.contains(k))
}

fn wants_calendar(lower: &str) -> bool {
    ["calendar", "schedule", "meeting", "agenda", "event", "appointment"]
        .iter()
        .any(|k| lower.contains(k))
}

fn wants_files(lower: &str) -> bool {
    ["drive", "file", "folder", "document", "spreadsheet"]
        .iter()
        .any(|k| lower.contains(k))
}

fn wants_search(lower: &str) -> bool {
    ["search", "latest", "news", "look up", "current", "today's"]
        .iter()
        .any(|k| lower.contains(k))
}

/// Collects workspace and web data relevant to a message.
#[derive(Debug, Clone)]
pub struct DataPrefetcher {
    email_count: usize,
    file_count: usize,
}

impl Default for DataPrefetcher {
    fn default() -> Self {
        Self {
            email_count: 5,
            file_count: 5,
        }
    }
}

impl DataPrefetcher {
    /// Prefetcher with default item counts.
    pub fn new() -> Self {
        Self::default()
    }

    /// How many emails a prefetch pulls.
    pub fn email_count(&self) -> usize {
        self.email_count
    }

    /// How many drive files a prefetch pulls.
    pub fn file_count(&self) -> usize {
        self.file_count
    }

    /// Fetch workspace sections the message seems to need.
    ///
    /// Does nothing when the workspace skill is absent or not ready.
    pub async fn gather_workspace(&self, message: &str, skills: &SkillSet) -> PrefetchBundle {
        let mut bundle = PrefetchBundle::new();

        let Some(workspace) = skills.workspace.as_ref() else {
            return bundle;
        };
        if !workspace.is_ready() {
            debug!("Workspace not ready; skipping prefetch");
            return bundle;
        }

        let lower = message.to_lowercase();

        if wants_email(&lower) {
            match workspace.recent_emails(self.email_count).await {
                Ok(emails) => bundle.push("RECENT EMAILS", emails),
                Err(e) => warn!(error = %e, "Email prefetch failed; continuing without it"),
            }
        }

        if wants_calendar(&lower) {
            match workspace.today_events().await {
                Ok(events) => bundle.push("TODAY'S CALENDAR", events),
                Err(e) => warn!(error = %e, "Calendar prefetch failed; continuing without it"),
            }
        }

        if wants_files(&lower) {
            match workspace.recent_files(self.file_count).await {
                Ok(files) => bundle.push("RECENT FILES", files),
                Err(e) => warn!(error = %e, "Drive prefetch failed; continuing without it"),
            }
        }

        bundle
    }

    /// Fetch workspace sections plus web results when the message asks
    /// for something current.
    pub async fn gather(&self, message: &str, skills: &SkillSet) -> PrefetchBundle {
        let mut bundle = self.gather_workspace(message, skills).await;

        if let Some(search) = skills.search.as_ref() {
            if wants_search(&message.to_lowercase()) {
                match search.search(message).await {
                    Ok(results) => bundle.push("WEB SEARCH RESULTS", results),
                    Err(e) => warn!(error = %e, "Search prefetch failed; continuing without it"),
                }
            }
        }

        debug!(sections = bundle.len(), "Prefetch complete");
        bundle
    }
}

/// Distill a drive search term from a request.
///
/// Drops request phrasing and drive vocabulary, keeping the residue as
/// the term. "can you search my drive for invoices" yields "invoices";
/// a request with nothing left, like "check drive", yields "recent".
pub fn derive_drive_term(message: &str) -> String {
    const STOP_WORDS: [&str; 40] = [
        "a", "an", "any", "are", "can", "check", "could", "do", "doc", "docs", "document",
        "documents", "drive", "file", "files", "find", "folder", "for", "google", "have", "i",
        "in", "is", "latest", "list", "look", "me", "my", "of", "on", "open", "please", "read",
        "recent", "search", "show", "some", "the", "up", "you",
    ];
    const VAGUE_TERMS: [&str; 3] = ["stuff", "things", "items"];

    let lower = message.to_lowercase();
    let tokens: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .filter(|t| !STOP_WORDS.contains(t))
        .collect();

    let term = tokens.join(" ");
    if term.len() < 3 || VAGUE_TERMS.contains(&term.as_str()) {
        "recent".to_string()
    } else {
        term
    }
}
