//! repochat CLI entry point.
//!
//! Binary name: `rchat`
//!
//! Parses CLI arguments, wires the session components around the HTTP
//! backend, then dispatches to the appropriate command handler.

mod cli;
mod state;

use clap::Parser;
use clap_complete::generate;
use secrecy::SecretString;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,repochat_core=debug,repochat_infra=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "rchat", &mut std::io::stdout());
        return Ok(());
    }

    let access_token = cli.token.clone().map(SecretString::from);
    let state = AppState::init(access_token).await?;

    match cli.command {
        Commands::Connect => {
            cli::connect::connect(&state).await?;
        }

        Commands::Repos { available } => {
            cli::repos::list(&state, available, cli.json).await?;
        }

        Commands::Clone { urls } => {
            cli::repos::clone_repos(&state, urls, cli.json).await?;
        }

        Commands::Chat { repo } => {
            cli::chat::run_chat(&state, repo).await?;
        }

        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}
