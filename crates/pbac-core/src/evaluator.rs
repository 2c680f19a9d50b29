//! SP/MP compatibility evaluation.
//!
//! A flow is compatible when at least one concrete purpose of at least one
//! registered SP for `(client, topic)` covers at least one concrete purpose
//! of the MP filter (see [`purpose_covers`](crate::purpose::purpose_covers)).
//! There is no precedence among SPs: any single match authorizes.
//!
//! Fail-closed rules:
//! - an MP filter that expands to nothing is never compatible;
//! - a client with no SP for the topic is never compatible.

use std::sync::Arc;

use serde::Serialize;

use crate::purpose::{ExpandedPurposes, PurposeExpander, PurposeMatch, find_match};
use crate::registry::PurposeRegistry;

/// Outcome of a compatibility evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Compatibility {
    /// A registered SP covers a declared MP purpose.
    Compatible {
        /// Raw filter of the SP entry that matched.
        subscription_filter: String,
        /// The purpose pair that matched.
        matched: PurposeMatch,
    },
    /// The MP filter produced no purposes.
    NoMessagePurposes,
    /// The client has no SP registered for the topic.
    NoSubscriptionPurposes,
    /// SPs and MPs exist but none overlap.
    Incompatible,
}

impl Compatibility {
    /// Returns `true` if the flow is authorized.
    #[must_use]
    pub fn is_compatible(&self) -> bool {
        matches!(self, Self::Compatible { .. })
    }
}

/// Evaluates MP filters against registered SPs.
#[derive(Debug, Clone)]
pub struct CompatibilityEvaluator {
    registry: Arc<PurposeRegistry>,
    expander: PurposeExpander,
}

impl CompatibilityEvaluator {
    /// Create an evaluator over `registry`.
    #[must_use]
    pub fn new(registry: Arc<PurposeRegistry>, expander: PurposeExpander) -> Self {
        Self { registry, expander }
    }

    /// Returns `true` if `client_id`'s purposes for `topic` admit `mp_filter`.
    #[must_use]
    pub fn is_compatible(&self, topic: &str, client_id: &str, mp_filter: &str) -> bool {
        self.evaluate(topic, client_id, mp_filter).is_compatible()
    }

    /// Evaluate with the reason for the outcome.
    ///
    /// The registry lock is held only while SP entries are copied out.
    #[must_use]
    pub fn evaluate(&self, topic: &str, client_id: &str, mp_filter: &str) -> Compatibility {
        let mp_purposes = self.expander.expand(mp_filter);
        self.evaluate_expanded(topic, client_id, &mp_purposes)
    }

    /// Evaluate MP purposes that were already expanded, e.g. a registered MP entry.
    #[must_use]
    pub fn evaluate_expanded(
        &self,
        topic: &str,
        client_id: &str,
        mp_purposes: &ExpandedPurposes,
    ) -> Compatibility {
        if mp_purposes.is_empty() {
            return Compatibility::NoMessagePurposes;
        }

        let entries = self.registry.find_sp_entries(client_id, topic);
        if entries.is_empty() {
            return Compatibility::NoSubscriptionPurposes;
        }

        for entry in &entries {
            if let Some(matched) = find_match(&entry.expanded_purposes, mp_purposes) {
                return Compatibility::Compatible {
                    subscription_filter: entry.raw_filter.clone(),
                    matched,
                };
            }
        }

        Compatibility::Incompatible
    }
}
