//! Engine configuration.
//!
//! Every section has defaults, so an empty TOML document yields a working
//! per-message engine.
//!
//! # Example (TOML)
//!
//! ```toml
//! [expansion]
//! max_groups = 64
//! max_purposes = 4096
//! max_filter_len = 4096
//! max_expanded_bytes = 1048576
//!
//! [registry]
//! duplicates = "append"
//!
//! [binding]
//! kind = "control_topic"
//!
//! [binding.control_topic]
//! topic = "$priv/purpose_management"
//!
//! [notifications]
//! enabled = true
//! topic_prefix = "$priv/notifications/"
//! ```

use serde::{Deserialize, Serialize};

use crate::purpose::ExpansionLimits;

/// Root configuration for the purpose-based access control engine.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PbacConfig {
    /// Purpose filter expansion bounds.
    pub expansion: ExpansionLimits,

    /// Registry behaviour.
    pub registry: RegistryConfig,

    /// How purpose declarations are carried on access-check events.
    pub binding: BindingConfig,

    /// Retroactive purpose notifications.
    pub notifications: NotificationConfig,
}

/// Registry configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// What happens when a key is registered again.
    pub duplicates: DuplicatePolicy,
}

/// Handling of repeated registrations for the same key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Keep every registration; lookups see the most recent first.
    #[default]
    Append,
    /// Replace all existing registrations for the key.
    Upsert,
}

// =============================================================================
// Binding Configuration
// =============================================================================

/// Selects and parameterises the active binding.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct BindingConfig {
    /// Active binding.
    pub kind: BindingKind,

    /// Settings for [`BindingKind::PerMessage`].
    pub per_message: PerMessageConfig,

    /// Settings for [`BindingKind::ControlTopic`].
    pub control_topic: ControlTopicConfig,

    /// Settings for [`BindingKind::TopicEncoded`].
    pub topic_encoded: TopicEncodedConfig,

    /// Settings for [`BindingKind::Intent`].
    pub intent: IntentConfig,
}

/// Available bindings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingKind {
    /// SP on SUBSCRIBE properties, MP on every PUBLISH.
    #[default]
    PerMessage,
    /// MPs registered by publishing to a control topic.
    ControlTopic,
    /// SPs and MPs registered by publishing to prefixed topic names.
    TopicEncoded,
    /// SP carried in the subscription topic as `topic,intent`.
    Intent,
}

impl BindingKind {
    /// Stable name used in logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PerMessage => "per_message",
            Self::ControlTopic => "control_topic",
            Self::TopicEncoded => "topic_encoded",
            Self::Intent => "intent",
        }
    }
}

/// Per-message declaration keys.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PerMessageConfig {
    /// User property carrying the SP filter on SUBSCRIBE.
    pub sp_key: String,
    /// User property carrying the MP filter on PUBLISH (and on delivery).
    pub mp_key: String,
}

impl Default for PerMessageConfig {
    fn default() -> Self {
        Self {
            sp_key: "SP".to_string(),
            mp_key: "MP".to_string(),
        }
    }
}

/// Control-topic registration settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ControlTopicConfig {
    /// Topic that MP registrations are published to.
    pub topic: String,
    /// User property carrying the SP filter on SUBSCRIBE.
    pub sp_key: String,
    /// User property carrying the comma-separated topic list.
    pub topics_key: String,
    /// User property carrying the MP filter.
    pub filter_key: String,
    /// User property that, when `"true"`, requests subscriber notification.
    pub retroactive_key: String,
}

impl Default for ControlTopicConfig {
    fn default() -> Self {
        Self {
            topic: "$priv/purpose_management".to_string(),
            sp_key: "SP".to_string(),
            topics_key: "MP".to_string(),
            filter_key: "MP-Filter".to_string(),
            retroactive_key: "MP-Retroactive".to_string(),
        }
    }
}

/// Topic-encoded registration settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TopicEncodedConfig {
    /// Prefix of SP registration topics (`<prefix><topic>/<filter>`).
    pub sp_prefix: String,
    /// Prefix of MP registration topics (`<prefix><topic>/<filter>`).
    pub mp_prefix: String,
    /// Filter stored when an MP registration names a topic but no filter.
    pub default_mp_filter: String,
}

impl Default for TopicEncodedConfig {
    fn default() -> Self {
        Self {
            sp_prefix: "$priv/SP_registration/".to_string(),
            mp_prefix: "$priv/MP_registration/".to_string(),
            default_mp_filter: "*".to_string(),
        }
    }
}

/// `topic,intent` subscription settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IntentConfig {
    /// Separator between topic and intent in the subscription topic.
    pub separator: char,
    /// User property carrying the MP filter on PUBLISH.
    pub mp_key: String,
}

impl Default for IntentConfig {
    fn default() -> Self {
        Self {
            separator: ',',
            mp_key: "MP".to_string(),
        }
    }
}

// =============================================================================
// Notification Configuration
// =============================================================================

/// Retroactive notification settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Emit notifications when a retroactive MP registration arrives.
    pub enabled: bool,
    /// Prefix of each client's notification topic; the client id is appended.
    pub topic_prefix: String,
    /// Payload template; `{{client_id}}`, `{{topic}}` and `{{filter}}` are substituted.
    pub template: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            topic_prefix: "$priv/notifications/".to_string(),
            template: pbac_notifications::DEFAULT_RETROACTIVE_BODY.to_string(),
        }
    }
}

// =============================================================================
// Validation
// =============================================================================

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An invalid configuration value was provided.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// A required configuration value is missing.
    #[error("Missing required configuration: {0}")]
    Missing(String),
}

impl PbacConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if an expansion limit is zero, and
    /// `ConfigError::Missing` if a key, prefix or topic the active binding
    /// relies on is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.expansion.max_groups == 0 {
            return Err(ConfigError::InvalidValue(
                "expansion.max_groups must be > 0".to_string(),
            ));
        }
        if self.expansion.max_purposes == 0 {
            return Err(ConfigError::InvalidValue(
                "expansion.max_purposes must be > 0".to_string(),
            ));
        }
        if self.expansion.max_filter_len == 0 {
            return Err(ConfigError::InvalidValue(
                "expansion.max_filter_len must be > 0".to_string(),
            ));
        }
        if self.expansion.max_expanded_bytes < self.expansion.max_filter_len {
            return Err(ConfigError::InvalidValue(
                "expansion.max_expanded_bytes must be >= expansion.max_filter_len".to_string(),
            ));
        }

        match self.binding.kind {
            BindingKind::PerMessage => {
                let cfg = &self.binding.per_message;
                require("binding.per_message.sp_key", &cfg.sp_key)?;
                require("binding.per_message.mp_key", &cfg.mp_key)?;
            }
            BindingKind::ControlTopic => {
                let cfg = &self.binding.control_topic;
                require("binding.control_topic.topic", &cfg.topic)?;
                require("binding.control_topic.sp_key", &cfg.sp_key)?;
                require("binding.control_topic.topics_key", &cfg.topics_key)?;
                require("binding.control_topic.filter_key", &cfg.filter_key)?;
                require("binding.control_topic.retroactive_key", &cfg.retroactive_key)?;
            }
            BindingKind::TopicEncoded => {
                let cfg = &self.binding.topic_encoded;
                require("binding.topic_encoded.sp_prefix", &cfg.sp_prefix)?;
                require("binding.topic_encoded.mp_prefix", &cfg.mp_prefix)?;
                if cfg.sp_prefix.starts_with(&cfg.mp_prefix)
                    || cfg.mp_prefix.starts_with(&cfg.sp_prefix)
                {
                    return Err(ConfigError::InvalidValue(
                        "binding.topic_encoded prefixes must not overlap".to_string(),
                    ));
                }
            }
            BindingKind::Intent => {
                require("binding.intent.mp_key", &self.binding.intent.mp_key)?;
            }
        }

        if self.notifications.enabled {
            require("notifications.topic_prefix", &self.notifications.topic_prefix)?;
        }

        Ok(())
    }
}

fn require(name: &str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Missing(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = PbacConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.binding.kind, BindingKind::PerMessage);
        assert_eq!(config.registry.duplicates, DuplicatePolicy::Append);
        assert_eq!(config.binding.control_topic.filter_key, "MP-Filter");
        assert_eq!(config.binding.topic_encoded.default_mp_filter, "*");
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: PbacConfig = toml::from_str(
            r#"
[registry]
duplicates = "upsert"

[binding]
kind = "topic_encoded"

[binding.topic_encoded]
sp_prefix = "reg/sp/"
"#,
        )
        .unwrap();

        assert_eq!(config.registry.duplicates, DuplicatePolicy::Upsert);
        assert_eq!(config.binding.kind, BindingKind::TopicEncoded);
        assert_eq!(config.binding.topic_encoded.sp_prefix, "reg/sp/");
        assert_eq!(
            config.binding.topic_encoded.mp_prefix,
            "$priv/MP_registration/"
        );
        assert_eq!(config.expansion.max_groups, 64);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_limits_rejected() {
        let mut config = PbacConfig::default();
        config.expansion.max_purposes = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_byte_budget_below_filter_length_rejected() {
        let mut config = PbacConfig::default();
        config.expansion.max_filter_len = 8192;
        config.expansion.max_expanded_bytes = 4096;

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_expanded_bytes"));

        config.expansion.max_expanded_bytes = 8192;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_key_for_active_binding_rejected() {
        let mut config = PbacConfig::default();
        config.binding.kind = BindingKind::ControlTopic;
        config.binding.control_topic.filter_key.clear();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("control_topic.filter_key"));

        // Inactive bindings are not checked.
        config.binding.kind = BindingKind::PerMessage;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overlapping_prefixes_rejected() {
        let mut config = PbacConfig::default();
        config.binding.kind = BindingKind::TopicEncoded;
        config.binding.topic_encoded.sp_prefix = "reg/".to_string();
        config.binding.topic_encoded.mp_prefix = "reg/mp/".to_string();

        assert!(config.validate().is_err());
    }
}
