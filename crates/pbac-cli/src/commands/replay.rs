use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use pbac_core::config::PbacConfig;
use pbac_core::{AccessCheck, DecisionEngine};
use pbac_notifications::{MemoryOutbox, NotificationSink, TracingSink};
use serde::Serialize;
use serde_json::json;

use crate::cli::{OutputFormat, SinkKind};
use crate::output::{print_decision, print_error, print_json, print_notification, print_summary};

/// Counts collected over one replay.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReplaySummary {
    pub allowed: usize,
    pub denied: usize,
    pub invalid: usize,
}

pub fn replay(
    config: &PbacConfig,
    events: Option<&Path>,
    sink: SinkKind,
    format: OutputFormat,
) -> Result<()> {
    let outbox = match sink {
        SinkKind::Memory => Some(Arc::new(MemoryOutbox::new())),
        SinkKind::Tracing => None,
    };
    let engine = build_engine(config, outbox.clone())?;
    let outbox = outbox.as_deref();

    let summary = match events {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open events file {}", path.display()))?;
            replay_lines(&engine, outbox, BufReader::new(file), format)?
        }
        None => replay_lines(&engine, outbox, io::stdin().lock(), format)?,
    };

    let stats = engine.registry().stats();
    match format {
        OutputFormat::Json => print_json(&json!({
            "summary": summary,
            "registry": stats,
        }))?,
        OutputFormat::Text => {
            print_summary(&stats, summary.allowed, summary.denied, summary.invalid)
        }
    }

    engine.shutdown();
    Ok(())
}

/// Engine publishing into `outbox`, or logging notifications when there is none.
pub fn build_engine(
    config: &PbacConfig,
    outbox: Option<Arc<MemoryOutbox>>,
) -> Result<DecisionEngine> {
    let sink: Arc<dyn NotificationSink> = match outbox {
        Some(outbox) => outbox,
        None => Arc::new(TracingSink),
    };
    tracing::debug!(sink = sink.name(), "Notification sink selected");
    DecisionEngine::from_config(config, sink).context("Invalid engine configuration")
}

/// Run every JSON line of `reader` through `engine`.
///
/// Blank lines are skipped; lines that do not parse are reported with their
/// line number and counted as invalid. Notifications collected in `outbox`
/// are printed after the event that caused them.
pub fn replay_lines<R: BufRead>(
    engine: &DecisionEngine,
    outbox: Option<&MemoryOutbox>,
    reader: R,
    format: OutputFormat,
) -> Result<ReplaySummary> {
    let mut summary = ReplaySummary::default();

    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let line = line.with_context(|| format!("Failed to read line {line_no}"))?;
        if line.trim().is_empty() {
            continue;
        }

        let check: AccessCheck = match serde_json::from_str(&line) {
            Ok(check) => check,
            Err(e) => {
                summary.invalid += 1;
                print_error(&format!("line {line_no}: invalid access check: {e}"));
                continue;
            }
        };

        let decision = engine.check(&check);
        if decision.is_allowed() {
            summary.allowed += 1;
        } else {
            summary.denied += 1;
        }
        let notifications = outbox.map(MemoryOutbox::drain).unwrap_or_default();

        match format {
            OutputFormat::Json => print_json(&json!({
                "line": line_no,
                "check": check,
                "result": decision,
                "notifications": notifications,
            }))?,
            OutputFormat::Text => {
                print_decision(&check, &decision);
                for notification in &notifications {
                    print_notification(notification);
                }
            }
        }
    }

    Ok(summary)
}
