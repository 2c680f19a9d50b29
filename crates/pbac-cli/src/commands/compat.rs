use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use pbac_core::config::PbacConfig;
use pbac_core::purpose::PurposeExpander;
use pbac_core::{Compatibility, CompatibilityEvaluator, PurposeRegistry};
use serde_json::json;

use crate::cli::OutputFormat;
use crate::output::print_json;

const CLIENT: &str = "pbac-cli";
const TOPIC: &str = "pbac/compat";

/// Evaluate one SP/MP pair against a scratch registry.
pub fn evaluate_pair(config: &PbacConfig, sp: &str, mp: &str) -> Compatibility {
    let expander = PurposeExpander::new(config.expansion);
    let registry = Arc::new(PurposeRegistry::new(expander, config.registry.duplicates));
    registry.store_sp(CLIENT, TOPIC, sp);

    CompatibilityEvaluator::new(registry, expander).evaluate(TOPIC, CLIENT, mp)
}

pub fn compat(config: &PbacConfig, sp: &str, mp: &str, format: OutputFormat) -> Result<()> {
    let outcome = evaluate_pair(config, sp, mp);

    match format {
        OutputFormat::Json => print_json(&json!({
            "sp": sp,
            "mp": mp,
            "compatible": outcome.is_compatible(),
            "result": outcome,
        }))?,
        OutputFormat::Text => match &outcome {
            Compatibility::Compatible { matched, .. } => println!(
                "{} SP purpose '{}' covers MP purpose '{}'",
                "compatible".green().bold(),
                matched.subscription_purpose,
                matched.message_purpose
            ),
            Compatibility::NoMessagePurposes => println!(
                "{} MP filter '{mp}' expands to no purposes",
                "incompatible".red().bold()
            ),
            Compatibility::NoSubscriptionPurposes | Compatibility::Incompatible => println!(
                "{} no purpose of '{sp}' covers a purpose of '{mp}'",
                "incompatible".red().bold()
            ),
        },
    }
    Ok(())
}
