use colored::Colorize;
use pbac_core::{AccessCheck, AccessDecision, RegistryStats};
use pbac_notifications::Notification;
use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

pub fn print_decision(check: &AccessCheck, decision: &AccessDecision) {
    let target = format!(
        "{:<11} {} {}",
        check.access.as_str(),
        check.client_id.cyan(),
        check.topic
    );
    match decision.deny_reason() {
        None => println!("{} {}", "ALLOW".green().bold(), target),
        Some(reason) => println!(
            "{} {} ({}: {})",
            "DENY ".red().bold(),
            target,
            reason.code.yellow(),
            reason.message
        ),
    }
}

pub fn print_notification(notification: &Notification) {
    println!(
        "  {} {} <- {}: {}",
        "notify".magenta(),
        notification.topic,
        notification.source_topic,
        notification.payload
    );
}

pub fn print_summary(stats: &RegistryStats, allowed: usize, denied: usize, invalid: usize) {
    println!();
    println!(
        "{}: {} allowed, {} denied, {} invalid",
        "Decisions".cyan(),
        allowed,
        denied,
        invalid
    );
    println!(
        "{}: {} subscription purposes ({} keys), {} message purposes ({} topics)",
        "Registry".cyan(),
        stats.subscription_entries,
        stats.subscription_keys,
        stats.message_entries,
        stats.message_topics
    );
}
