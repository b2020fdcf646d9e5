//! Ferret CLI entry point.

use anyhow::Result;
use clap::Parser;
use ferret::cli::{commands, Cli, Commands};
use ferret::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(Settings::default_config_path);
    let settings = Settings::load_from(Some(config_path.as_path()))?;

    // -v raises the level; without it the configured level applies
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    // Logs go to stderr so stdout stays clean for results and MCP traffic
    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("ferret={}", log_level)),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match &cli.command {
        Commands::Ask { question, file } => {
            commands::run_ask(question, file.as_deref(), &settings)?;
        }

        Commands::Sniff { path } => {
            commands::run_sniff(path)?;
        }

        Commands::Exec { path, timeout } => {
            commands::run_exec(path, *timeout, &settings).await?;
        }

        Commands::Transcript { url, phrase } => {
            commands::run_transcript(url, phrase, &settings).await?;
        }

        Commands::Search {
            query,
            keywords,
            chunk_size,
        } => {
            commands::run_search(query, keywords, *chunk_size, &settings).await?;
        }

        Commands::Reduce {
            input,
            keywords,
            chunk_size,
        } => {
            commands::run_reduce(input.as_deref(), keywords, *chunk_size, &settings)?;
        }

        Commands::Transcribe { audio } => {
            commands::run_transcribe(audio, &settings).await?;
        }

        Commands::Doctor => {
            commands::run_doctor(&settings, &config_path)?;
        }

        Commands::Mcp => {
            commands::run_mcp(&settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, &settings, &config_path)?;
        }
    }

    Ok(())
}
