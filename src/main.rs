//! housing-mlp - Main Entry Point
//!
//! Runs the California Housing pipeline stages from the command line.

use clap::Parser;
use housing_mlp::cli::{
    cmd_analyze, cmd_architecture, cmd_compare, cmd_evaluate, cmd_run, cmd_synthesize, cmd_train,
    load_config, Cli, Commands,
};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "housing_mlp=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Analyze => {
            cmd_analyze(&config)?;
        }
        Commands::Train => {
            cmd_train(&config)?;
        }
        Commands::Evaluate => {
            cmd_evaluate(&config)?;
        }
        Commands::Compare => cmd_compare(&config)?,
        Commands::Architecture => cmd_architecture(&config)?,
        Commands::Synthesize { rows, output, seed } => {
            cmd_synthesize(&config, rows, output.as_deref(), seed)?;
        }
        Commands::Run => cmd_run(&config)?,
    }

    Ok(())
}
