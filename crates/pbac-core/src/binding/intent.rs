//! SP carried in the subscription topic as `<topic><sep><intent>`.

use crate::binding::{
    Extraction, MpDeclaration, PurposeBinding, SpDeclaration, property_declaration,
};
use crate::config::IntentConfig;
use crate::event::{AccessCheck, AccessKind};

/// Intent subscriptions with per-message MPs.
///
/// The SP is registered under the topic part of the subscription, which is
/// the topic later seen on delivery.
#[derive(Debug, Clone, Default)]
pub struct IntentBinding {
    config: IntentConfig,
}

impl IntentBinding {
    /// Create the binding.
    #[must_use]
    pub fn new(config: IntentConfig) -> Self {
        Self { config }
    }

    /// Split a subscription topic into topic and intent.
    #[must_use]
    pub fn split_subscription<'a>(&self, topic: &'a str) -> Option<(&'a str, &'a str)> {
        topic
            .split_once(self.config.separator)
            .filter(|(topic, intent)| !topic.is_empty() && !intent.is_empty())
    }
}

impl PurposeBinding for IntentBinding {
    fn name(&self) -> &'static str {
        "intent"
    }

    fn extract_sp(&self, check: &AccessCheck) -> Extraction<SpDeclaration> {
        if check.access != AccessKind::Subscribe {
            return Extraction::NotApplicable;
        }
        match self.split_subscription(&check.topic) {
            Some((topic, intent)) => Extraction::Declared(SpDeclaration {
                topic: topic.to_string(),
                filter: intent.to_string(),
            }),
            None => Extraction::Missing,
        }
    }

    fn extract_mp(&self, check: &AccessCheck) -> Extraction<MpDeclaration> {
        let declared = property_declaration(check, &self.config.mp_key)
            .map(|filter| MpDeclaration::single(check.topic.clone(), filter));

        match (check.access, declared) {
            (AccessKind::Write | AccessKind::Read, Some(declaration)) => {
                Extraction::Declared(declaration)
            }
            (AccessKind::Write, None) => Extraction::Missing,
            _ => Extraction::NotApplicable,
        }
    }

    fn subscription_topic<'a>(&self, check: &'a AccessCheck) -> &'a str {
        self.split_subscription(&check.topic)
            .map_or(check.topic.as_str(), |(topic, _)| topic)
    }
}
