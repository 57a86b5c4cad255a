//! CLI command definitions and dispatch for the `rchat` binary.
//!
//! Uses clap derive macros for argument parsing. Session state lives in
//! process memory only: `rchat chat` holds the whole connect/ingest/chat
//! flow in one invocation, while `repos` and `clone` are one-shot helpers.

pub mod chat;
pub mod connect;
pub mod repos;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Chat with your codebase through a retrieval-augmented answering service.
#[derive(Parser)]
#[command(name = "rchat", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// OAuth access token for the remote service.
    #[arg(long, env = "RCHAT_ACCESS_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Connect a GitHub account: prints the authorization URL and reads
    /// the access token from the pasted callback URL.
    Connect,

    /// List repositories ingested this session, or the remote catalog.
    #[command(alias = "ls")]
    Repos {
        /// List the repositories available to clone instead.
        #[arg(long)]
        available: bool,
    },

    /// Clone (ingest) repositories on the remote service.
    ///
    /// With no URLs, fetches the catalog and opens an interactive picker.
    Clone {
        /// Clone URLs to ingest.
        urls: Vec<String>,
    },

    /// Open a chat session. Ingests the repository first if needed.
    Chat {
        /// Clone URL or repository name to chat with. Omit to pick from
        /// the catalog interactively.
        repo: Option<String>,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}
