use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Why a notification was raised
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A message purpose was registered for a topic the client already subscribes to.
    RetroactivePurpose,
}

/// A notification published to a client's private notification channel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub kind: NotificationKind,

    /// Recipient client
    pub client_id: String,

    /// Channel the notification is published on (e.g. `$priv/notifications/<client>`)
    pub topic: String,

    /// Topic whose purpose declaration triggered the notification
    pub source_topic: String,

    /// Rendered, human-readable payload
    pub payload: String,

    /// QoS requested from the broker
    pub qos: u8,

    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Notification {
    /// Build a retroactive-purpose notification for `client_id` on `topic`.
    pub fn retroactive(
        client_id: impl Into<String>,
        topic: impl Into<String>,
        source_topic: impl Into<String>,
        payload: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: NotificationKind::RetroactivePurpose,
            client_id: client_id.into(),
            topic: topic.into(),
            source_topic: source_topic.into(),
            payload: payload.into(),
            qos: 1,
            created_at: OffsetDateTime::now_utc(),
        }
    }
}

/// Counters kept by sinks that track their own delivery
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationStats {
    pub published: u32,
    pub failed: u32,
}
