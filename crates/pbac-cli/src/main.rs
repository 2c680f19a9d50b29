use anyhow::{Result, anyhow};
use clap::Parser;

use pbac_cli::cli::{Cli, Commands};
use pbac_cli::config::loader::load_config;
use pbac_cli::output::print_error;
use pbac_cli::{commands, observability};

fn main() {
    if let Err(e) = run() {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let format = cli.format.unwrap_or_default();

    observability::init_tracing_with_level("warn");
    let app = load_config(cli.config.as_deref()).map_err(|e| anyhow!(e))?;
    observability::apply_logging_level(&app.logging.level);

    tracing::debug!(
        binding = app.pbac.binding.kind.as_str(),
        "Configuration loaded"
    );

    match &cli.command {
        Commands::Expand(args) => commands::expand::expand(&app.pbac, &args.filter, format)?,
        Commands::Compat(args) => commands::compat::compat(&app.pbac, &args.sp, &args.mp, format)?,
        Commands::Replay(args) => {
            commands::replay::replay(&app.pbac, args.events.as_deref(), args.sink, format)?
        }
    }

    Ok(())
}
