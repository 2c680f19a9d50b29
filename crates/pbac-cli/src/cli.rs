use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "pbac")]
#[command(about = "Purpose-based access control for publish/subscribe brokers")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to ./pbac.toml when present)
    #[arg(short, long, global = true, env = "PBAC_CONFIG")]
    pub config: Option<String>,

    /// Output format
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,
}

#[derive(Clone, Copy, Debug, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Expand a purpose filter into concrete purposes
    Expand(ExpandArgs),
    /// Check whether a subscription purpose admits a message purpose
    Compat(CompatArgs),
    /// Replay JSON-lines access checks through the decision engine
    Replay(ReplayArgs),
}

#[derive(clap::Args)]
pub struct ExpandArgs {
    /// Purpose filter, e.g. "music/{jazz,rock}"
    pub filter: String,
}

#[derive(clap::Args)]
pub struct CompatArgs {
    /// Subscription purpose filter
    #[arg(long)]
    pub sp: String,
    /// Message purpose filter
    #[arg(long)]
    pub mp: String,
}

#[derive(clap::Args)]
pub struct ReplayArgs {
    /// File of access checks, one JSON object per line (stdin when omitted)
    #[arg(short, long)]
    pub events: Option<PathBuf>,

    /// Where retroactive notifications go
    #[arg(short, long, value_enum, default_value_t = SinkKind::Memory)]
    pub sink: SinkKind,
}

#[derive(Clone, Copy, Debug, ValueEnum, Default, PartialEq, Eq)]
pub enum SinkKind {
    /// Collect and print notifications after each event
    #[default]
    Memory,
    /// Log notifications through tracing at info level
    Tracing,
}
