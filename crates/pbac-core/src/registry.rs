//! Subscription and message purpose registry.
//!
//! The registry holds every SP (keyed by client and topic) and MP (keyed by
//! topic) declaration. It is an explicitly owned value, shared as
//! `Arc<PurposeRegistry>` between the evaluator and the decision engine.
//!
//! Both collections sit behind one read-write lock. Entries are stored as
//! `Arc`s so lookups copy them out cheaply and callers do their comparison
//! work after the lock is released.
//!
//! # Example
//!
//! ```
//! use pbac_core::registry::PurposeRegistry;
//!
//! let registry = PurposeRegistry::default();
//! registry.store_sp("c1", "T", "music/{jazz,rock}");
//!
//! let entries = registry.find_sp_entries("c1", "T");
//! assert_eq!(entries[0].expanded_purposes.as_slice(), ["music/jazz", "music/rock"]);
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::Serialize;

use crate::config::DuplicatePolicy;
use crate::purpose::{ExpandedPurposes, PurposeExpander};

// =============================================================================
// Entries
// =============================================================================

/// A subscriber's declared purposes for one topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscriptionPurposeEntry {
    /// Subscribing client.
    pub client_id: String,
    /// Subscribed topic.
    pub topic: String,
    /// Filter as declared.
    pub raw_filter: String,
    /// Expansion of `raw_filter`, computed once at insertion.
    pub expanded_purposes: ExpandedPurposes,
}

/// A publisher's declared purposes for one topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessagePurposeEntry {
    /// Topic the declaration applies to.
    pub topic: String,
    /// Filter as declared.
    pub raw_filter: String,
    /// Expansion of `raw_filter`, computed once at insertion.
    pub expanded_purposes: ExpandedPurposes,
}

// =============================================================================
// Registry State
// =============================================================================

/// Entries per key are kept oldest-first; lookups walk them newest-first.
#[derive(Default)]
struct RegistryState {
    /// topic -> client -> SP entries. Clients stay in first-subscription order.
    subscriptions: HashMap<String, IndexMap<String, Vec<Arc<SubscriptionPurposeEntry>>>>,

    /// topic -> MP entries.
    messages: HashMap<String, Vec<Arc<MessagePurposeEntry>>>,
}

/// Entry counts, duplicates included.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RegistryStats {
    /// Number of SP entries.
    pub subscription_entries: usize,
    /// Number of distinct `(client, topic)` SP keys.
    pub subscription_keys: usize,
    /// Number of MP entries.
    pub message_entries: usize,
    /// Number of topics with at least one MP entry.
    pub message_topics: usize,
}

// =============================================================================
// Purpose Registry
// =============================================================================

/// Thread-safe store of SP and MP declarations.
pub struct PurposeRegistry {
    state: RwLock<RegistryState>,
    expander: PurposeExpander,
    duplicates: DuplicatePolicy,
}

impl Default for PurposeRegistry {
    fn default() -> Self {
        Self::new(PurposeExpander::default(), DuplicatePolicy::default())
    }
}

impl PurposeRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new(expander: PurposeExpander, duplicates: DuplicatePolicy) -> Self {
        Self {
            state: RwLock::new(RegistryState::default()),
            expander,
            duplicates,
        }
    }

    // -------------------------------------------------------------------------
    // Subscription purposes
    // -------------------------------------------------------------------------

    /// Register `filter` as the purpose of `client_id`'s subscription to `topic`.
    ///
    /// The filter is expanded before the lock is taken.
    pub fn store_sp(
        &self,
        client_id: &str,
        topic: &str,
        filter: &str,
    ) -> Arc<SubscriptionPurposeEntry> {
        let entry = Arc::new(SubscriptionPurposeEntry {
            client_id: client_id.to_string(),
            topic: topic.to_string(),
            raw_filter: filter.to_string(),
            expanded_purposes: self.expander.expand(filter),
        });

        let mut state = self.state.write();
        let entries = state
            .subscriptions
            .entry(topic.to_string())
            .or_default()
            .entry(client_id.to_string())
            .or_default();
        if self.duplicates == DuplicatePolicy::Upsert {
            entries.clear();
        }
        entries.push(Arc::clone(&entry));

        entry
    }

    /// Remove the most recent SP entry for `(client_id, topic)`.
    ///
    /// Returns the removed entry; a missing key is a no-op.
    pub fn remove_sp(
        &self,
        client_id: &str,
        topic: &str,
    ) -> Option<Arc<SubscriptionPurposeEntry>> {
        let mut state = self.state.write();
        let clients = state.subscriptions.get_mut(topic)?;
        let entries = clients.get_mut(client_id)?;
        let removed = entries.pop();

        if entries.is_empty() {
            clients.shift_remove(client_id);
        }
        if clients.is_empty() {
            state.subscriptions.remove(topic);
        }

        removed
    }

    /// All SP entries for `(client_id, topic)`, most recent first.
    #[must_use]
    pub fn find_sp_entries(
        &self,
        client_id: &str,
        topic: &str,
    ) -> Vec<Arc<SubscriptionPurposeEntry>> {
        let state = self.state.read();
        state
            .subscriptions
            .get(topic)
            .and_then(|clients| clients.get(client_id))
            .map(|entries| entries.iter().rev().cloned().collect())
            .unwrap_or_default()
    }

    /// Returns `true` if `client_id` has at least one SP for `topic`.
    #[must_use]
    pub fn has_sp(&self, client_id: &str, topic: &str) -> bool {
        let state = self.state.read();
        state
            .subscriptions
            .get(topic)
            .and_then(|clients| clients.get(client_id))
            .is_some_and(|entries| !entries.is_empty())
    }

    /// Distinct clients holding an SP for `topic`, in first-subscription order.
    #[must_use]
    pub fn subscribers(&self, topic: &str) -> Vec<String> {
        let state = self.state.read();
        state
            .subscriptions
            .get(topic)
            .map(|clients| clients.keys().cloned().collect())
            .unwrap_or_default()
    }

    // -------------------------------------------------------------------------
    // Message purposes
    // -------------------------------------------------------------------------

    /// Register `filter` as the message purpose of `topic`.
    pub fn store_mp(&self, topic: &str, filter: &str) -> Arc<MessagePurposeEntry> {
        let entry = Arc::new(MessagePurposeEntry {
            topic: topic.to_string(),
            raw_filter: filter.to_string(),
            expanded_purposes: self.expander.expand(filter),
        });

        let mut state = self.state.write();
        let entries = state.messages.entry(topic.to_string()).or_default();
        if self.duplicates == DuplicatePolicy::Upsert {
            entries.clear();
        }
        entries.push(Arc::clone(&entry));

        entry
    }

    /// Remove the most recent MP entry for `topic`.
    pub fn remove_mp(&self, topic: &str) -> Option<Arc<MessagePurposeEntry>> {
        let mut state = self.state.write();
        let entries = state.messages.get_mut(topic)?;
        let removed = entries.pop();

        if entries.is_empty() {
            state.messages.remove(topic);
        }

        removed
    }

    /// The authoritative (most recently registered) MP for `topic`.
    #[must_use]
    pub fn find_mp(&self, topic: &str) -> Option<Arc<MessagePurposeEntry>> {
        let state = self.state.read();
        state
            .messages
            .get(topic)
            .and_then(|entries| entries.last())
            .cloned()
    }

    // -------------------------------------------------------------------------
    // Whole registry
    // -------------------------------------------------------------------------

    /// Release every entry. Used at shutdown.
    pub fn clear_all(&self) {
        let mut state = self.state.write();
        state.subscriptions.clear();
        state.messages.clear();
    }

    /// Entry counts.
    #[must_use]
    pub fn stats(&self) -> RegistryStats {
        let state = self.state.read();
        let mut stats = RegistryStats::default();

        for clients in state.subscriptions.values() {
            stats.subscription_keys += clients.len();
            stats.subscription_entries += clients.values().map(Vec::len).sum::<usize>();
        }
        stats.message_topics = state.messages.len();
        stats.message_entries = state.messages.values().map(Vec::len).sum();

        stats
    }
}

impl std::fmt::Debug for PurposeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PurposeRegistry")
            .field("duplicates", &self.duplicates)
            .field("stats", &self.stats())
            .finish()
    }
}
