//! # pbac-core
//!
//! Purpose-based access control for publish/subscribe brokers.
//!
//! Subscribers declare the purposes they want data for (SP); publishers
//! declare the purposes their data may be used for (MP). A message is
//! delivered to a subscriber only if one of the subscriber's purposes is
//! equal to, or a hierarchical ancestor of, one of the message's purposes.
//!
//! ## Modules
//!
//! - [`purpose`] - Filter expansion (`a/{b,c}`) and hierarchical matching
//! - [`registry`] - Shared store of SP and MP declarations
//! - [`evaluator`] - SP/MP compatibility evaluation
//! - [`binding`] - Where declarations live on access-check events
//! - [`engine`] - Allow/deny decisions for SUBSCRIBE, WRITE and READ
//! - [`notifier`] - Retroactive purpose notifications to subscribers
//! - [`config`] - Engine configuration
//! - [`event`] - Access-check event model
//! - [`error`] - Error types

pub mod binding;
pub mod config;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod event;
pub mod notifier;
pub mod purpose;
pub mod registry;

pub use binding::{Extraction, MpDeclaration, PurposeBinding, SpDeclaration};
pub use config::{BindingKind, ConfigError, DuplicatePolicy, PbacConfig};
pub use engine::{AccessDecision, DecisionEngine, DenyReason};
pub use error::{ExpansionError, ExpansionResult};
pub use evaluator::{Compatibility, CompatibilityEvaluator};
pub use event::{AccessCheck, AccessKind, Property};
pub use notifier::RetroactiveNotifier;
pub use purpose::{ExpandedPurposes, ExpansionLimits, PurposeExpander, expand, purpose_covers};
pub use registry::{
    MessagePurposeEntry, PurposeRegistry, RegistryStats, SubscriptionPurposeEntry,
};
