use parking_lot::Mutex;

use crate::error::NotificationError;
use crate::types::{Notification, NotificationStats};

/// Destination for subscriber notifications.
///
/// The host broker supplies an implementation that publishes onto its own
/// transport. Implementations must not block for long: they are invoked on the
/// thread handling the access check.
pub trait NotificationSink: Send + Sync {
    /// Publish a notification
    fn publish(&self, notification: &Notification) -> Result<(), NotificationError>;

    /// Sink name used in logs
    fn name(&self) -> &str;
}

/// Sink that only logs notifications.
#[derive(Debug, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn publish(&self, notification: &Notification) -> Result<(), NotificationError> {
        tracing::info!(
            client_id = %notification.client_id,
            topic = %notification.topic,
            source_topic = %notification.source_topic,
            payload = %notification.payload,
            "Notification published"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "tracing"
    }
}

/// Sink that keeps every published notification in memory.
#[derive(Debug, Default)]
pub struct MemoryOutbox {
    published: Mutex<Vec<Notification>>,
    stats: Mutex<NotificationStats>,
    closed: Mutex<bool>,
}

impl MemoryOutbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything published so far, oldest first.
    pub fn published(&self) -> Vec<Notification> {
        self.published.lock().clone()
    }

    /// Remove and return everything published so far.
    pub fn drain(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.published.lock())
    }

    pub fn len(&self) -> usize {
        self.published.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.published.lock().is_empty()
    }

    pub fn stats(&self) -> NotificationStats {
        self.stats.lock().clone()
    }

    /// Reject all further publishes.
    pub fn close(&self) {
        *self.closed.lock() = true;
    }
}

impl NotificationSink for MemoryOutbox {
    fn publish(&self, notification: &Notification) -> Result<(), NotificationError> {
        if *self.closed.lock() {
            self.stats.lock().failed += 1;
            return Err(NotificationError::SinkClosed(notification.topic.clone()));
        }
        self.published.lock().push(notification.clone());
        self.stats.lock().published += 1;
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(client: &str) -> Notification {
        Notification::retroactive(
            client,
            format!("$priv/notifications/{client}"),
            "T1",
            "payload",
        )
    }

    #[test]
    fn test_tracing_sink_accepts_everything() {
        let sink = TracingSink;
        assert!(sink.publish(&sample("a")).is_ok());
        assert_eq!(sink.name(), "tracing");
    }

    #[test]
    fn test_outbox_records_in_order() {
        let outbox = MemoryOutbox::new();
        outbox.publish(&sample("a")).unwrap();
        outbox.publish(&sample("b")).unwrap();

        let sent = outbox.published();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].client_id, "a");
        assert_eq!(sent[1].topic, "$priv/notifications/b");
        assert_eq!(outbox.stats().published, 2);
    }

    #[test]
    fn test_drain_empties_outbox() {
        let outbox = MemoryOutbox::new();
        outbox.publish(&sample("a")).unwrap();

        assert_eq!(outbox.drain().len(), 1);
        assert!(outbox.is_empty());
    }

    #[test]
    fn test_closed_outbox_rejects() {
        let outbox = MemoryOutbox::new();
        outbox.close();

        let result = outbox.publish(&sample("a"));
        assert!(matches!(result, Err(NotificationError::SinkClosed(_))));
        assert_eq!(outbox.stats().failed, 1);
        assert!(outbox.is_empty());
    }
}
