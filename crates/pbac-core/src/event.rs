//! Access-check events delivered by the broker host.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of operation the host is asking about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessKind {
    /// A client subscribes to a topic.
    Subscribe,
    /// A client publishes to a topic.
    Write,
    /// A message is about to be delivered to a subscriber.
    Read,
    /// A client drops a subscription.
    Unsubscribe,
    /// Any access kind the engine has no policy for.
    #[serde(other)]
    Other,
}

impl AccessKind {
    /// Stable name used in logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Subscribe => "SUBSCRIBE",
            Self::Write => "WRITE",
            Self::Read => "READ",
            Self::Unsubscribe => "UNSUBSCRIBE",
            Self::Other => "OTHER",
        }
    }
}

impl fmt::Display for AccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single user property (key/value string pair), in wire order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    /// Property key.
    pub key: String,
    /// Property value.
    pub value: String,
}

impl Property {
    /// Create a property.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// An access-check request from the host.
///
/// # Example
///
/// ```
/// use pbac_core::event::{AccessCheck, AccessKind};
///
/// let check = AccessCheck::subscribe("c1", "sensors/temp").with_property("SP", "research");
/// assert_eq!(check.access, AccessKind::Subscribe);
/// assert_eq!(check.property("SP"), Some("research"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessCheck {
    /// Operation being checked.
    pub access: AccessKind,
    /// Client performing (or receiving) the operation.
    pub client_id: String,
    /// Topic of the operation.
    pub topic: String,
    /// User properties in wire order.
    #[serde(default)]
    pub properties: Vec<Property>,
}

impl AccessCheck {
    /// Create a check with no properties.
    pub fn new(access: AccessKind, client_id: impl Into<String>, topic: impl Into<String>) -> Self {
        Self {
            access,
            client_id: client_id.into(),
            topic: topic.into(),
            properties: Vec::new(),
        }
    }

    /// SUBSCRIBE check.
    pub fn subscribe(client_id: impl Into<String>, topic: impl Into<String>) -> Self {
        Self::new(AccessKind::Subscribe, client_id, topic)
    }

    /// WRITE (publish) check.
    pub fn write(client_id: impl Into<String>, topic: impl Into<String>) -> Self {
        Self::new(AccessKind::Write, client_id, topic)
    }

    /// READ (delivery) check.
    pub fn read(client_id: impl Into<String>, topic: impl Into<String>) -> Self {
        Self::new(AccessKind::Read, client_id, topic)
    }

    /// UNSUBSCRIBE check.
    pub fn unsubscribe(client_id: impl Into<String>, topic: impl Into<String>) -> Self {
        Self::new(AccessKind::Unsubscribe, client_id, topic)
    }

    /// Append a user property.
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.push(Property::new(key, value));
        self
    }

    /// Value of the first property named `key`.
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|p| p.key == key)
            .map(|p| p.value.as_str())
    }
}
