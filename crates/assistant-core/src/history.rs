//! Per-sender conversation storage.
//!
//! This module provides per-sender conversation tracking with automatic
//! turn-based trimming and LRU eviction to prevent memory exhaustion.

use indexmap::IndexMap;
use tokio::sync::RwLock;

use crate::chat::ConversationContext;

/// Default maximum number of senders to track before LRU eviction.
const DEFAULT_MAX_SENDERS: usize = 10000;

/// Per-sender conversation storage with LRU eviction.
///
/// Maintains a separate [`ConversationContext`] for each sender, trimmed
/// to a configurable number of turns. To prevent memory exhaustion from
/// many unique senders, the total number of tracked senders is also
/// bounded; the least recently used senders are evicted at the limit.
///
/// # Example
///
/// ```rust
/// use assistant_core::ContextStore;
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let store = ContextStore::new(5); // Keep 5 exchanges
///
///     store.record_exchange("alice", "Hello", "Hi there!").await;
///     store.record_exchange("alice", "How are you?", "Doing well!").await;
///
///     let context = store.context("alice").await;
///     assert_eq!(context.len(), 4); // 2 exchanges = 4 turns
/// }
/// ```
#[derive(Debug)]
pub struct ContextStore {
    /// Map from sender ID to conversation. IndexMap keeps insertion
    /// order, which doubles as the LRU order.
    contexts: RwLock<IndexMap<String, ConversationContext>>,
    /// Maximum number of exchanges (user + assistant pairs) per sender.
    max_exchanges: usize,
    /// Maximum number of senders to track before LRU eviction.
    max_senders: usize,
}

impl Default for ContextStore {
    fn default() -> Self {
        Self::new(10)
    }
}

impl ContextStore {
    /// Create a store keeping `max_exchanges` exchanges per sender.
    ///
    /// Uses the default sender limit (10,000).
    pub fn new(max_exchanges: usize) -> Self {
        Self::with_limits(max_exchanges, DEFAULT_MAX_SENDERS)
    }

    /// Create a store with custom limits.
    ///
    /// # Arguments
    ///
    /// * `max_exchanges` - Exchanges (user + assistant pairs) kept per sender
    /// * `max_senders` - Senders tracked before LRU eviction
    pub fn with_limits(max_exchanges: usize, max_senders: usize) -> Self {
        Self {
            contexts: RwLock::new(IndexMap::new()),
            max_exchanges,
            max_senders,
        }
    }

    /// Get a snapshot of the conversation for a sender.
    ///
    /// Marks the sender as recently used.
    pub async fn context(&self, sender: &str) -> ConversationContext {
        let mut contexts = self.contexts.write().await;

        // Move to end to mark as recently used
        if let Some(entry) = contexts.shift_remove(sender) {
            let snapshot = entry.clone();
            contexts.insert(sender.to_string(), entry);
            snapshot
        } else {
            ConversationContext::new()
        }
    }

    /// Record a user message and the assistant's reply.
    ///
    /// Trims the sender's conversation to the exchange limit and evicts
    /// the least recently used sender when the sender limit is exceeded.
    pub async fn record_exchange(&self, sender: &str, user: &str, assistant: &str) {
        let mut contexts = self.contexts.write().await;

        // Remove and re-insert to move to end (mark as recently used)
        let mut context = contexts.shift_remove(sender).unwrap_or_default();
        context.record_exchange(user, assistant);
        context.truncate_oldest(self.max_exchanges * 2);
        contexts.insert(sender.to_string(), context);

        while contexts.len() > self.max_senders {
            // shift_remove_index(0) drops the oldest entry
            contexts.shift_remove_index(0);
        }
    }

    /// Forget a specific sender's conversation.
    pub async fn clear(&self, sender: &str) {
        let mut contexts = self.contexts.write().await;
        contexts.shift_remove(sender);
    }

    /// Forget every conversation.
    pub async fn clear_all(&self) {
        let mut contexts = self.contexts.write().await;
        contexts.clear();
    }

    /// Number of senders currently tracked.
    pub async fn sender_count(&self) -> usize {
        let contexts = self.contexts.read().await;
        contexts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_record_and_fetch() {
        let store = ContextStore::new(5);

        store.record_exchange("alice", "Hello", "Hi there!").await;
        store
            .record_exchange("alice", "How are you?", "Doing well!")
            .await;

        let context = store.context("alice").await;
        assert_eq!(context.len(), 4);
        assert_eq!(context.turns()[0].content, "Hello");
        assert_eq!(context.turns()[1].content, "Hi there!");
    }

    #[tokio::test]
    async fn test_trimming() {
        let store = ContextStore::new(2); // Keep only 2 exchanges

        store.record_exchange("alice", "First", "Reply 1").await;
        store.record_exchange("alice", "Second", "Reply 2").await;
        store.record_exchange("alice", "Third", "Reply 3").await;

        let context = store.context("alice").await;
        assert_eq!(context.len(), 4);
        assert_eq!(context.turns()[0].content, "Second");
    }

    #[tokio::test]
    async fn test_separate_senders() {
        let store = ContextStore::new(5);

        store.record_exchange("alice", "Hello A", "Hi A!").await;
        store.record_exchange("bob", "Hello B", "Hi B!").await;

        let alice = store.context("alice").await;
        let bob = store.context("bob").await;

        assert_eq!(alice.turns()[0].content, "Hello A");
        assert_eq!(bob.turns()[0].content, "Hello B");
    }

    #[tokio::test]
    async fn test_clear_sender() {
        let store = ContextStore::new(5);

        store.record_exchange("alice", "Hello", "Hi!").await;
        store.record_exchange("bob", "Hey", "Hello!").await;

        store.clear("alice").await;

        assert!(store.context("alice").await.is_empty());
        assert_eq!(store.context("bob").await.len(), 2);
    }

    #[tokio::test]
    async fn test_lru_eviction() {
        let store = ContextStore::with_limits(5, 3);

        store.record_exchange("a", "Hello", "Hi!").await;
        store.record_exchange("b", "Hello", "Hi!").await;
        store.record_exchange("c", "Hello", "Hi!").await;
        store.record_exchange("d", "Hello", "Hi!").await;

        assert_eq!(store.sender_count().await, 3);
        assert!(
            store.context("a").await.is_empty(),
            "Oldest sender should have been evicted"
        );
        assert!(!store.context("b").await.is_empty());
        assert!(!store.context("d").await.is_empty());
    }

    #[tokio::test]
    async fn test_lru_access_order() {
        let store = ContextStore::with_limits(5, 3);

        store.record_exchange("a", "Hello", "Hi!").await;
        store.record_exchange("b", "Hello", "Hi!").await;
        store.record_exchange("c", "Hello", "Hi!").await;

        // Touch "a" so it becomes recently used
        let _ = store.context("a").await;

        store.record_exchange("d", "Hello", "Hi!").await;

        assert!(store.context("b").await.is_empty());
        assert!(!store.context("a").await.is_empty());
        assert!(!store.context("c").await.is_empty());
        assert!(!store.context("d").await.is_empty());
    }
}
