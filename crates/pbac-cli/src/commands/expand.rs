use anyhow::{Context, Result};
use pbac_core::config::PbacConfig;
use pbac_core::purpose::PurposeExpander;
use serde_json::json;

use crate::cli::OutputFormat;
use crate::output::{print_json, print_success};

pub fn expand(config: &PbacConfig, filter: &str, format: OutputFormat) -> Result<()> {
    let purposes = PurposeExpander::new(config.expansion)
        .try_expand(filter)
        .with_context(|| format!("Failed to expand '{filter}'"))?;

    match format {
        OutputFormat::Json => print_json(&json!({
            "filter": filter,
            "purposes": purposes,
        }))?,
        OutputFormat::Text => {
            for purpose in &purposes {
                println!("{purpose}");
            }
            print_success(&format!("{} purpose(s)", purposes.len()));
        }
    }
    Ok(())
}
