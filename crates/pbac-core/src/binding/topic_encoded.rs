//! SP and MP registration encoded in the topic name.
//!
//! `<sp_prefix><topic>/<filter>` registers the publishing client's SP for
//! `<topic>`; `<mp_prefix><topic>/<filter>` registers the MP of `<topic>`.
//! The remainder is split at its first `/`, so topics are single-level and
//! filters may contain `/`.

use crate::binding::{Extraction, MpDeclaration, PurposeBinding, SpDeclaration};
use crate::config::TopicEncodedConfig;
use crate::event::{AccessCheck, AccessKind};

/// Registration by publishing to prefixed topics.
#[derive(Debug, Clone, Default)]
pub struct TopicEncodedBinding {
    config: TopicEncodedConfig,
}

impl TopicEncodedBinding {
    /// Create the binding.
    #[must_use]
    pub fn new(config: TopicEncodedConfig) -> Self {
        Self { config }
    }
}

/// Split `topic/filter` at the first `/`. The filter is `None` when absent or empty.
fn split_registration(rest: &str) -> (&str, Option<&str>) {
    match rest.split_once('/') {
        Some((topic, filter)) if !filter.is_empty() => (topic, Some(filter)),
        Some((topic, _)) => (topic, None),
        None => (rest, None),
    }
}

impl PurposeBinding for TopicEncodedBinding {
    fn name(&self) -> &'static str {
        "topic_encoded"
    }

    fn extract_sp(&self, check: &AccessCheck) -> Extraction<SpDeclaration> {
        if check.access != AccessKind::Write {
            return Extraction::NotApplicable;
        }
        let Some(rest) = check.topic.strip_prefix(&self.config.sp_prefix) else {
            return Extraction::NotApplicable;
        };

        match split_registration(rest) {
            (topic, Some(filter)) if !topic.is_empty() => Extraction::Declared(SpDeclaration {
                topic: topic.to_string(),
                filter: filter.to_string(),
            }),
            _ => Extraction::Missing,
        }
    }

    fn extract_mp(&self, check: &AccessCheck) -> Extraction<MpDeclaration> {
        if check.access != AccessKind::Write {
            return Extraction::NotApplicable;
        }
        let Some(rest) = check.topic.strip_prefix(&self.config.mp_prefix) else {
            return Extraction::NotApplicable;
        };

        let (topic, filter) = split_registration(rest);
        if topic.is_empty() {
            return Extraction::Missing;
        }
        let filter = filter.unwrap_or(&self.config.default_mp_filter);

        Extraction::Declared(MpDeclaration::single(topic, filter))
    }
}
