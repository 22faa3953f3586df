use clap::Parser;
use colored::Colorize;

use sbomfetch_cli::cli::{Cli, Commands};
use sbomfetch_cli::commands;
use sbomfetch_cli::error::CliError;
use sbomfetch_cli::logging;
use sbomfetch_cli::output::OutputWriter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = commands::config::load(cli.config.as_deref()).await?;
    if let Some(level) = cli.log_level {
        config.general.log_level = level;
        config.validate()?;
    }

    logging::init_tracing(&config.general).map_err(|e| CliError::Config(e.to_string()))?;
    tracing::debug!(command = ?cli.command, "sbomfetch starting");

    let writer = OutputWriter::new(cli.output);
    match cli.command {
        Commands::Fetch(args) => commands::fetch::execute(&args, &config, &writer).await,
        Commands::Resolve(args) => commands::resolve::execute(&args, &config, &writer).await,
        Commands::Extract(args) => commands::extract::execute(&args, &config, &writer).await,
        Commands::Config(args) => {
            commands::config::execute(&args, cli.config.as_deref(), &config, &writer)
        }
    }
}
