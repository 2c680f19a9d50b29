//! Bindings between access-check events and purpose declarations.
//!
//! Brokers carry SP and MP declarations in different places: user properties
//! on each SUBSCRIBE/PUBLISH, a registration control topic, the topic name
//! itself, or a combined `topic,intent` subscription. A [`PurposeBinding`]
//! hides that choice behind two extraction capabilities so the decision
//! engine is written once.
//!
//! | Binding | SP declared by | MP declared by |
//! |---------|----------------|----------------|
//! | [`PerMessageBinding`] | SUBSCRIBE property | PUBLISH property (also on delivery) |
//! | [`ControlTopicBinding`] | SUBSCRIBE property | PUBLISH to the control topic |
//! | [`TopicEncodedBinding`] | PUBLISH to `<sp_prefix><topic>/<filter>` | PUBLISH to `<mp_prefix><topic>/<filter>` |
//! | [`IntentBinding`] | SUBSCRIBE to `<topic>,<filter>` | PUBLISH property |

pub mod control_topic;
pub mod intent;
pub mod per_message;
pub mod topic_encoded;

pub use control_topic::ControlTopicBinding;
pub use intent::IntentBinding;
pub use per_message::PerMessageBinding;
pub use topic_encoded::TopicEncodedBinding;

use crate::config::{BindingConfig, BindingKind};
use crate::event::AccessCheck;

// =============================================================================
// Declarations
// =============================================================================

/// A subscription purpose declared by the event's client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpDeclaration {
    /// Topic the purpose applies to (not necessarily the event topic).
    pub topic: String,
    /// Raw purpose filter.
    pub filter: String,
}

/// A message purpose declared for one or more topics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MpDeclaration {
    /// Topics the purpose applies to.
    pub topics: Vec<String>,
    /// Raw purpose filter.
    pub filter: String,
    /// Notify existing subscribers of the topics.
    pub retroactive: bool,
}

impl MpDeclaration {
    /// Declaration for a single topic, without notification.
    pub fn single(topic: impl Into<String>, filter: impl Into<String>) -> Self {
        Self {
            topics: vec![topic.into()],
            filter: filter.into(),
            retroactive: false,
        }
    }
}

/// Result of asking a binding for a declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction<T> {
    /// The event carries a declaration.
    Declared(T),
    /// The event requires a declaration but carries none.
    Missing,
    /// This binding carries no declaration on this kind of event.
    NotApplicable,
}

impl<T> Extraction<T> {
    /// Declared value, if any.
    pub fn declared(self) -> Option<T> {
        match self {
            Self::Declared(value) => Some(value),
            Self::Missing | Self::NotApplicable => None,
        }
    }

    /// Returns `true` for [`Extraction::NotApplicable`].
    pub fn is_not_applicable(&self) -> bool {
        matches!(self, Self::NotApplicable)
    }
}

// =============================================================================
// Purpose Binding
// =============================================================================

/// Extracts raw SP/MP filters from access-check events.
pub trait PurposeBinding: Send + Sync {
    /// Binding name used in logs.
    fn name(&self) -> &'static str;

    /// Subscription purpose carried by `check`, for the check's client.
    fn extract_sp(&self, check: &AccessCheck) -> Extraction<SpDeclaration>;

    /// Message purpose carried by `check`.
    fn extract_mp(&self, check: &AccessCheck) -> Extraction<MpDeclaration>;

    /// Topic a SUBSCRIBE or UNSUBSCRIBE check's SP is registered under.
    fn subscription_topic<'a>(&self, check: &'a AccessCheck) -> &'a str {
        &check.topic
    }
}

/// Build the binding selected by `config.kind`.
#[must_use]
pub fn from_config(config: &BindingConfig) -> Box<dyn PurposeBinding> {
    match config.kind {
        BindingKind::PerMessage => Box::new(PerMessageBinding::new(config.per_message.clone())),
        BindingKind::ControlTopic => {
            Box::new(ControlTopicBinding::new(config.control_topic.clone()))
        }
        BindingKind::TopicEncoded => {
            Box::new(TopicEncodedBinding::new(config.topic_encoded.clone()))
        }
        BindingKind::Intent => Box::new(IntentBinding::new(config.intent.clone())),
    }
}

/// Property lookup shared by bindings: first occurrence of `key`, if any.
pub(crate) fn property_declaration(check: &AccessCheck, key: &str) -> Option<String> {
    check.property(key).map(str::to_string)
}
