//! Retroactive purpose notifications.
//!
//! When a publisher registers an MP for topics that already have
//! subscribers, each subscriber receives one notification on its private
//! channel (`<topic_prefix><client_id>`). Publish failures are logged and
//! swallowed: they never affect the registration that caused them.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use pbac_notifications::{
    DEFAULT_RETROACTIVE_BODY, Notification, NotificationSink, RETROACTIVE_TEMPLATE_ID,
    TemplateRenderer,
};

use crate::config::NotificationConfig;
use crate::registry::PurposeRegistry;

/// Publishes retroactive-purpose notifications to current subscribers.
pub struct RetroactiveNotifier {
    sink: Arc<dyn NotificationSink>,
    renderer: TemplateRenderer,
    topic_prefix: String,
}

impl fmt::Debug for RetroactiveNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetroactiveNotifier")
            .field("sink", &self.sink.name())
            .field("topic_prefix", &self.topic_prefix)
            .finish()
    }
}

impl RetroactiveNotifier {
    /// Create a notifier publishing through `sink`.
    pub fn new(
        sink: Arc<dyn NotificationSink>,
        topic_prefix: impl Into<String>,
        template: impl Into<String>,
    ) -> Self {
        Self {
            sink,
            renderer: TemplateRenderer::with_retroactive(template),
            topic_prefix: topic_prefix.into(),
        }
    }

    /// Build from configuration; `None` when notifications are disabled.
    #[must_use]
    pub fn from_config(
        config: &NotificationConfig,
        sink: Arc<dyn NotificationSink>,
    ) -> Option<Self> {
        config
            .enabled
            .then(|| Self::new(sink, config.topic_prefix.clone(), config.template.clone()))
    }

    /// Private notification channel of `client_id`.
    #[must_use]
    pub fn notification_topic(&self, client_id: &str) -> String {
        format!("{}{}", self.topic_prefix, client_id)
    }

    /// Notify every current subscriber of `topic` that `filter` now applies.
    ///
    /// Returns the number of notifications the sink accepted.
    pub fn notify_subscribers(
        &self,
        registry: &PurposeRegistry,
        topic: &str,
        filter: &str,
    ) -> usize {
        let subscribers = registry.subscribers(topic);
        let mut published = 0;

        for client_id in &subscribers {
            let payload = self.render(client_id, topic, filter);
            let notification = Notification::retroactive(
                client_id.as_str(),
                self.notification_topic(client_id),
                topic,
                payload,
            );

            match self.sink.publish(&notification) {
                Ok(()) => published += 1,
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        sink = self.sink.name(),
                        client_id = %client_id,
                        topic = %topic,
                        "Failed to publish retroactive purpose notification"
                    );
                }
            }
        }

        tracing::debug!(
            topic = %topic,
            subscribers = subscribers.len(),
            published,
            "Retroactive notifications sent"
        );
        published
    }

    fn render(&self, client_id: &str, topic: &str, filter: &str) -> String {
        let data = HashMap::from([
            ("client_id".to_string(), serde_json::Value::from(client_id)),
            ("topic".to_string(), serde_json::Value::from(topic)),
            ("filter".to_string(), serde_json::Value::from(filter)),
        ]);

        self.renderer
            .render(RETROACTIVE_TEMPLATE_ID, &data)
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Falling back to default notification payload");
                DEFAULT_RETROACTIVE_BODY.to_string()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pbac_notifications::MemoryOutbox;

    fn notifier(outbox: Arc<MemoryOutbox>, template: &str) -> RetroactiveNotifier {
        RetroactiveNotifier::new(outbox, "$priv/notifications/", template)
    }

    #[test]
    fn test_one_notification_per_distinct_subscriber() {
        let registry = PurposeRegistry::default();
        registry.store_sp("c1", "T1", "music");
        registry.store_sp("c1", "T1", "sports");
        registry.store_sp("c2", "T1", "news");
        registry.store_sp("c3", "T2", "music");

        let outbox = Arc::new(MemoryOutbox::new());
        let sent = notifier(outbox.clone(), DEFAULT_RETROACTIVE_BODY)
            .notify_subscribers(&registry, "T1", "music");

        assert_eq!(sent, 2);
        let published = outbox.published();
        let topics: Vec<_> = published.iter().map(|n| n.topic.as_str()).collect();
        assert_eq!(topics, ["$priv/notifications/c1", "$priv/notifications/c2"]);
        assert!(published.iter().all(|n| n.source_topic == "T1"));
        assert_eq!(published[0].payload, DEFAULT_RETROACTIVE_BODY);
    }

    #[test]
    fn test_template_variables() {
        let registry = PurposeRegistry::default();
        registry.store_sp("c1", "T", "a");

        let outbox = Arc::new(MemoryOutbox::new());
        notifier(outbox.clone(), "{{client_id}}: {{topic}} now {{filter}}")
            .notify_subscribers(&registry, "T", "a/b");

        assert_eq!(outbox.published()[0].payload, "c1: T now a/b");
    }

    #[test]
    fn test_closed_sink_is_swallowed() {
        let registry = PurposeRegistry::default();
        registry.store_sp("c1", "T", "a");

        let outbox = Arc::new(MemoryOutbox::new());
        outbox.close();
        let sent = notifier(outbox.clone(), DEFAULT_RETROACTIVE_BODY)
            .notify_subscribers(&registry, "T", "a");

        assert_eq!(sent, 0);
        assert_eq!(outbox.stats().failed, 1);
    }

    #[test]
    fn test_disabled_config_builds_nothing() {
        let config = NotificationConfig {
            enabled: false,
            ..Default::default()
        };
        let sink = Arc::new(MemoryOutbox::new());
        assert!(RetroactiveNotifier::from_config(&config, sink).is_none());
    }
}
