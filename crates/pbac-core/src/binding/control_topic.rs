//! MP registration through a dedicated control topic.
//!
//! A publisher sends a message to the control topic with three user
//! properties: a comma-separated list of topics, the MP filter and an
//! optional retroactive flag. Ordinary publishes carry no MP; delivery is
//! checked against the registered MP of the message topic.

use crate::binding::{
    Extraction, MpDeclaration, PurposeBinding, SpDeclaration, property_declaration,
};
use crate::config::ControlTopicConfig;
use crate::event::{AccessCheck, AccessKind};

/// SP on SUBSCRIBE, MP on publishes to the control topic.
#[derive(Debug, Clone, Default)]
pub struct ControlTopicBinding {
    config: ControlTopicConfig,
}

impl ControlTopicBinding {
    /// Create the binding.
    #[must_use]
    pub fn new(config: ControlTopicConfig) -> Self {
        Self { config }
    }

    /// Returns `true` if `topic` is the registration topic.
    #[must_use]
    pub fn is_control_topic(&self, topic: &str) -> bool {
        topic == self.config.topic
    }
}

/// Split a comma-separated topic list, skipping empty items.
fn parse_topics(list: &str) -> Vec<String> {
    list.split(',')
        .filter(|topic| !topic.is_empty())
        .map(str::to_string)
        .collect()
}

impl PurposeBinding for ControlTopicBinding {
    fn name(&self) -> &'static str {
        "control_topic"
    }

    fn extract_sp(&self, check: &AccessCheck) -> Extraction<SpDeclaration> {
        if check.access != AccessKind::Subscribe {
            return Extraction::NotApplicable;
        }
        match property_declaration(check, &self.config.sp_key) {
            Some(filter) => Extraction::Declared(SpDeclaration {
                topic: check.topic.clone(),
                filter,
            }),
            None => Extraction::Missing,
        }
    }

    fn extract_mp(&self, check: &AccessCheck) -> Extraction<MpDeclaration> {
        if check.access != AccessKind::Write || !self.is_control_topic(&check.topic) {
            return Extraction::NotApplicable;
        }

        let topics = check
            .property(&self.config.topics_key)
            .map(parse_topics)
            .unwrap_or_default();
        let Some(filter) = property_declaration(check, &self.config.filter_key) else {
            return Extraction::Missing;
        };
        if topics.is_empty() {
            return Extraction::Missing;
        }

        let retroactive = check.property(&self.config.retroactive_key) == Some("true");

        Extraction::Declared(MpDeclaration {
            topics,
            filter,
            retroactive,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTROL: &str = "$priv/purpose_management";

    fn binding() -> ControlTopicBinding {
        ControlTopicBinding::default()
    }

    #[test]
    fn test_registration_with_topic_list() {
        let check = AccessCheck::write("pub", CONTROL)
            .with_property("MP", "t1,t2")
            .with_property("MP-Filter", "{a,b}")
            .with_property("MP-Retroactive", "true");

        assert_eq!(
            binding().extract_mp(&check),
            Extraction::Declared(MpDeclaration {
                topics: vec!["t1".to_string(), "t2".to_string()],
                filter: "{a,b}".to_string(),
                retroactive: true,
            })
        );
    }

    #[test]
    fn test_retroactive_requires_exact_true() {
        for flag in ["TRUE", "1", "yes", ""] {
            let check = AccessCheck::write("pub", CONTROL)
                .with_property("MP", "t1")
                .with_property("MP-Filter", "a")
                .with_property("MP-Retroactive", flag);
            assert!(!binding().extract_mp(&check).declared().unwrap().retroactive);
        }
    }

    #[test]
    fn test_empty_list_items_skipped() {
        let check = AccessCheck::write("pub", CONTROL)
            .with_property("MP", ",t1,,t2,")
            .with_property("MP-Filter", "a");
        let declared = binding().extract_mp(&check).declared().unwrap();
        assert_eq!(declared.topics, ["t1", "t2"]);
    }

    #[test]
    fn test_incomplete_registration_is_missing() {
        let no_filter = AccessCheck::write("pub", CONTROL).with_property("MP", "t1");
        assert_eq!(binding().extract_mp(&no_filter), Extraction::Missing);

        let no_topics = AccessCheck::write("pub", CONTROL).with_property("MP-Filter", "a");
        assert_eq!(binding().extract_mp(&no_topics), Extraction::Missing);

        let only_commas = AccessCheck::write("pub", CONTROL)
            .with_property("MP", ",,")
            .with_property("MP-Filter", "a");
        assert_eq!(binding().extract_mp(&only_commas), Extraction::Missing);
    }

    #[test]
    fn test_ordinary_publish_and_delivery_not_applicable() {
        let publish = AccessCheck::write("pub", "t1").with_property("MP", "a");
        assert!(binding().extract_mp(&publish).is_not_applicable());

        let delivery = AccessCheck::read("c1", "t1").with_property("MP", "a");
        assert!(binding().extract_mp(&delivery).is_not_applicable());
    }

    #[test]
    fn test_subscribe_sp() {
        let check = AccessCheck::subscribe("c1", "t1").with_property("SP", "a");
        assert_eq!(binding().extract_sp(&check).declared().unwrap().topic, "t1");

        let bare = AccessCheck::subscribe("c1", "t1");
        assert_eq!(binding().extract_sp(&bare), Extraction::Missing);
    }
}
