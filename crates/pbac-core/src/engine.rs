//! Access decision engine.
//!
//! Each access check is decided on its own, from the event and the current
//! registry contents. The active [`PurposeBinding`] decides where SP and MP
//! filters are read from; everything else is shared by all bindings.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use pbac_core::config::PbacConfig;
//! use pbac_core::engine::DecisionEngine;
//! use pbac_core::event::AccessCheck;
//! use pbac_notifications::MemoryOutbox;
//!
//! let engine = DecisionEngine::from_config(&PbacConfig::default(), Arc::new(MemoryOutbox::new()))
//!     .unwrap();
//!
//! let subscribe = AccessCheck::subscribe("c1", "T").with_property("SP", "music/{jazz,rock}");
//! assert!(engine.check(&subscribe).is_allowed());
//!
//! let delivery = AccessCheck::read("c1", "T").with_property("MP", "music/jazz");
//! assert!(engine.check(&delivery).is_allowed());
//! ```

use std::sync::Arc;

use pbac_notifications::NotificationSink;
use serde::Serialize;

use crate::binding::{self, Extraction, MpDeclaration, PurposeBinding, SpDeclaration};
use crate::config::{ConfigError, PbacConfig};
use crate::evaluator::{Compatibility, CompatibilityEvaluator};
use crate::event::{AccessCheck, AccessKind};
use crate::notifier::RetroactiveNotifier;
use crate::purpose::PurposeExpander;
use crate::registry::PurposeRegistry;

// =============================================================================
// Access Decision
// =============================================================================

/// Result of an access check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", content = "reason", rename_all = "snake_case")]
pub enum AccessDecision {
    /// The operation may proceed.
    Allow,
    /// The operation is rejected.
    Deny(DenyReason),
}

impl AccessDecision {
    /// Returns `true` if access was granted.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Returns `true` if access was denied.
    #[must_use]
    pub fn is_denied(&self) -> bool {
        matches!(self, Self::Deny(_))
    }

    /// Get the deny reason if access was denied.
    #[must_use]
    pub fn deny_reason(&self) -> Option<&DenyReason> {
        match self {
            Self::Deny(reason) => Some(reason),
            Self::Allow => None,
        }
    }
}

// =============================================================================
// Deny Reason
// =============================================================================

/// Reason for access denial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DenyReason {
    /// Stable code for programmatic handling.
    pub code: String,

    /// Human-readable message.
    pub message: String,
}

impl DenyReason {
    fn new(code: &str, message: String) -> Self {
        Self {
            code: code.to_string(),
            message,
        }
    }

    /// A subscription carried no subscription purpose.
    #[must_use]
    pub fn missing_subscription_purpose(topic: &str) -> Self {
        Self::new(
            "missing-subscription-purpose",
            format!("No subscription purpose declared for topic '{topic}'"),
        )
    }

    /// A publish carried no message purpose.
    #[must_use]
    pub fn missing_message_purpose(topic: &str) -> Self {
        Self::new(
            "missing-message-purpose",
            format!("No message purpose declared for topic '{topic}'"),
        )
    }

    /// A subscription was attempted without a prior SP registration.
    #[must_use]
    pub fn subscription_not_registered(topic: &str) -> Self {
        Self::new(
            "subscription-not-registered",
            format!("No subscription purpose registered for topic '{topic}'"),
        )
    }

    /// A message was delivered on a topic with no MP.
    #[must_use]
    pub fn no_message_purpose(topic: &str) -> Self {
        Self::new(
            "no-message-purpose",
            format!("No message purpose registered for topic '{topic}'"),
        )
    }

    /// SP and MP do not overlap.
    #[must_use]
    pub fn purpose_incompatible(topic: &str, outcome: &Compatibility) -> Self {
        let detail = match outcome {
            Compatibility::NoMessagePurposes => "message purpose filter has no purposes",
            Compatibility::NoSubscriptionPurposes => "no subscription purpose registered",
            Compatibility::Incompatible | Compatibility::Compatible { .. } => {
                "no subscription purpose covers the message purpose"
            }
        };
        Self::new(
            "purpose-incompatible",
            format!("Delivery on '{topic}' denied: {detail}"),
        )
    }
}

// =============================================================================
// Decision Engine
// =============================================================================

/// Decides SUBSCRIBE, WRITE, READ and UNSUBSCRIBE checks.
pub struct DecisionEngine {
    registry: Arc<PurposeRegistry>,
    evaluator: CompatibilityEvaluator,
    binding: Box<dyn PurposeBinding>,
    notifier: Option<RetroactiveNotifier>,
}

impl std::fmt::Debug for DecisionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecisionEngine")
            .field("binding", &self.binding.name())
            .field("registry", &self.registry)
            .field("notifier", &self.notifier)
            .finish()
    }
}

impl DecisionEngine {
    /// Create an engine over an existing registry, without notifications.
    #[must_use]
    pub fn new(
        registry: Arc<PurposeRegistry>,
        expander: PurposeExpander,
        binding: Box<dyn PurposeBinding>,
    ) -> Self {
        let evaluator = CompatibilityEvaluator::new(registry.clone(), expander);
        Self {
            registry,
            evaluator,
            binding,
            notifier: None,
        }
    }

    /// Attach a retroactive notifier.
    #[must_use]
    pub fn with_notifier(mut self, notifier: RetroactiveNotifier) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Build an engine, registry and binding from configuration.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] reported by [`PbacConfig::validate`].
    pub fn from_config(
        config: &PbacConfig,
        sink: Arc<dyn NotificationSink>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let expander = PurposeExpander::new(config.expansion);
        let registry = Arc::new(PurposeRegistry::new(expander, config.registry.duplicates));
        let mut engine = Self::new(registry, expander, binding::from_config(&config.binding));
        engine.notifier = RetroactiveNotifier::from_config(&config.notifications, sink);

        tracing::info!(
            binding = engine.binding.name(),
            duplicates = ?config.registry.duplicates,
            notifications = engine.notifier.is_some(),
            "Purpose decision engine initialized"
        );
        Ok(engine)
    }

    /// Shared registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<PurposeRegistry> {
        &self.registry
    }

    /// Decide an access check. Never fails: every problem is a deny.
    pub fn check(&self, check: &AccessCheck) -> AccessDecision {
        let decision = match check.access {
            AccessKind::Subscribe => self.on_subscribe(check),
            AccessKind::Write => self.on_write(check),
            AccessKind::Read => self.on_read(check),
            AccessKind::Unsubscribe => self.on_unsubscribe(check),
            AccessKind::Other => AccessDecision::Allow,
        };

        match &decision {
            AccessDecision::Allow => tracing::debug!(
                access = %check.access,
                client_id = %check.client_id,
                topic = %check.topic,
                binding = self.binding.name(),
                "Access allowed"
            ),
            AccessDecision::Deny(reason) => tracing::debug!(
                access = %check.access,
                client_id = %check.client_id,
                topic = %check.topic,
                binding = self.binding.name(),
                code = %reason.code,
                "Access denied"
            ),
        }
        decision
    }

    /// Release all registry state.
    pub fn shutdown(&self) {
        let stats = self.registry.stats();
        self.registry.clear_all();
        tracing::info!(
            subscription_entries = stats.subscription_entries,
            message_entries = stats.message_entries,
            "Purpose registry cleared"
        );
    }

    // -------------------------------------------------------------------------
    // Access paths
    // -------------------------------------------------------------------------

    fn on_subscribe(&self, check: &AccessCheck) -> AccessDecision {
        match self.binding.extract_sp(check) {
            Extraction::Declared(declaration) => {
                self.register_sp(&check.client_id, &declaration);
                AccessDecision::Allow
            }
            Extraction::Missing => {
                AccessDecision::Deny(DenyReason::missing_subscription_purpose(&check.topic))
            }
            Extraction::NotApplicable => {
                let topic = self.binding.subscription_topic(check);
                if self.registry.has_sp(&check.client_id, topic) {
                    AccessDecision::Allow
                } else {
                    AccessDecision::Deny(DenyReason::subscription_not_registered(&check.topic))
                }
            }
        }
    }

    fn on_write(&self, check: &AccessCheck) -> AccessDecision {
        match self.binding.extract_sp(check) {
            Extraction::Declared(declaration) => {
                self.register_sp(&check.client_id, &declaration);
                return AccessDecision::Allow;
            }
            Extraction::Missing => {
                return AccessDecision::Deny(DenyReason::missing_subscription_purpose(
                    &check.topic,
                ));
            }
            Extraction::NotApplicable => {}
        }

        match self.binding.extract_mp(check) {
            Extraction::Declared(declaration) => {
                self.register_mp(&check.client_id, &declaration);
                AccessDecision::Allow
            }
            Extraction::Missing => {
                AccessDecision::Deny(DenyReason::missing_message_purpose(&check.topic))
            }
            Extraction::NotApplicable => AccessDecision::Allow,
        }
    }

    fn on_read(&self, check: &AccessCheck) -> AccessDecision {
        let outcome = match self.binding.extract_mp(check) {
            Extraction::Declared(declaration) => {
                self.evaluator
                    .evaluate(&check.topic, &check.client_id, &declaration.filter)
            }
            Extraction::Missing => {
                return AccessDecision::Deny(DenyReason::missing_message_purpose(&check.topic));
            }
            Extraction::NotApplicable => match self.registry.find_mp(&check.topic) {
                Some(entry) => self.evaluator.evaluate_expanded(
                    &check.topic,
                    &check.client_id,
                    &entry.expanded_purposes,
                ),
                None => {
                    return AccessDecision::Deny(DenyReason::no_message_purpose(&check.topic));
                }
            },
        };

        if outcome.is_compatible() {
            AccessDecision::Allow
        } else {
            AccessDecision::Deny(DenyReason::purpose_incompatible(&check.topic, &outcome))
        }
    }

    fn on_unsubscribe(&self, check: &AccessCheck) -> AccessDecision {
        let topic = self.binding.subscription_topic(check);
        if self.registry.remove_sp(&check.client_id, topic).is_some() {
            tracing::info!(
                client_id = %check.client_id,
                topic = %topic,
                "Subscription purpose removed"
            );
        }
        AccessDecision::Allow
    }

    // -------------------------------------------------------------------------
    // Registration
    // -------------------------------------------------------------------------

    fn register_sp(&self, client_id: &str, declaration: &SpDeclaration) {
        let entry = self
            .registry
            .store_sp(client_id, &declaration.topic, &declaration.filter);
        tracing::info!(
            client_id = %client_id,
            topic = %entry.topic,
            filter = %entry.raw_filter,
            purposes = entry.expanded_purposes.len(),
            "Subscription purpose registered"
        );
    }

    fn register_mp(&self, client_id: &str, declaration: &MpDeclaration) {
        for topic in &declaration.topics {
            let entry = self.registry.store_mp(topic, &declaration.filter);
            tracing::info!(
                client_id = %client_id,
                topic = %entry.topic,
                filter = %entry.raw_filter,
                purposes = entry.expanded_purposes.len(),
                retroactive = declaration.retroactive,
                "Message purpose registered"
            );

            if declaration.retroactive
                && let Some(notifier) = &self.notifier
            {
                notifier.notify_subscribers(&self.registry, topic, &declaration.filter);
            }
        }
    }
}
