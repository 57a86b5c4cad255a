//! Interactive chat session.
//!
//! Holds the full select/ingest/chat flow in one invocation: the target
//! repository is ingested first (a no-op on the remote side when it was
//! already processed), a session log is created on first selection, and the
//! loop then alternates user input with remote answers. Slash commands
//! cover the sidebar actions: listing, background cloning, and switching
//! the active repository.

use std::time::Duration;

use anyhow::Result;
use console::style;
use dialoguer::{Input, Select};
use indicatif::ProgressBar;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::TryRecvError;

use repochat_core::dispatch::SendOutcome;
use repochat_types::chat::Speaker;
use repochat_types::event::IngestEvent;
use repochat_types::repo::RepoRef;

use crate::state::AppState;

use super::repos::{pick_from_catalog, spinner_style};

enum ReplFlow {
    Continue,
    Quit,
}

/// Run the interactive chat command.
pub async fn run_chat(state: &AppState, repo_arg: Option<String>) -> Result<()> {
    let active = match repo_arg {
        Some(url) => ingest_with_spinner(state, &url).await?,
        None => {
            let urls = pick_from_catalog(state).await?;
            if urls.is_empty() {
                println!("  Nothing selected.");
                return Ok(());
            }
            let mut ready = Vec::new();
            for url in &urls {
                match ingest_with_spinner(state, url).await {
                    Ok(repo) => ready.push(repo),
                    Err(err) => println!("  {} {err}", style("✗").red().bold()),
                }
            }
            match ready.len() {
                0 => anyhow::bail!("no repository could be ingested"),
                1 => ready.remove(0),
                _ => {
                    let names: Vec<String> =
                        ready.iter().map(|repo| repo.to_string()).collect();
                    let choice = tokio::task::spawn_blocking(move || {
                        Select::new()
                            .with_prompt("Chat with which repository?")
                            .items(&names)
                            .default(0)
                            .interact()
                    })
                    .await??;
                    ready.remove(choice)
                }
            }
        }
    };

    repl(state, active).await
}

/// Ingest one repository, blocking on a spinner until it resolves.
///
/// Returns the ready ref, or an error when ingestion failed -- a
/// repository never becomes selectable without a confirmed ingestion.
async fn ingest_with_spinner(state: &AppState, url: &str) -> Result<RepoRef> {
    let repo = RepoRef::from_url(url);
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(spinner_style());
    spinner.set_message(format!("{repo}: cloning..."));
    spinner.enable_steady_tick(Duration::from_millis(80));

    let outcome = state.ingest.clone_repo(url).await;
    spinner.finish_and_clear();

    match outcome {
        Ok(_) => Ok(repo),
        Err(err) => Err(anyhow::anyhow!(err)),
    }
}

fn print_banner(repo: &RepoRef) {
    println!();
    println!(
        "  {} Chatting with {}",
        style("💬").bold(),
        style(repo).cyan().bold()
    );
    println!(
        "  {}",
        style("Type /help for commands, /quit to leave.").dim()
    );
    println!();
}

/// Print ingestion transitions that arrived since the last prompt.
fn drain_events(events: &mut broadcast::Receiver<IngestEvent>) {
    loop {
        match events.try_recv() {
            Ok(IngestEvent::Completed { repo }) => {
                println!(
                    "  {} {repo} is ready -- /switch {repo}",
                    style("✓").green().bold()
                );
            }
            Ok(IngestEvent::Failed { repo, reason }) => {
                println!("  {} {repo} failed: {reason}", style("✗").red().bold());
            }
            Ok(IngestEvent::Started { .. }) => {}
            Err(TryRecvError::Lagged(_)) => continue,
            Err(_) => break,
        }
    }
}

async fn repl(state: &AppState, mut active: RepoRef) -> Result<()> {
    state.sessions.ensure(&active);
    let mut events = state.ingest.subscribe();
    print_banner(&active);

    loop {
        drain_events(&mut events);

        let prompt = active.to_string();
        let line: String = tokio::task::spawn_blocking(move || {
            Input::<String>::new()
                .with_prompt(prompt)
                .allow_empty(true)
                .interact_text()
        })
        .await??;

        if let Some(command) = line.trim().strip_prefix('/') {
            match handle_command(state, command, &mut active).await? {
                ReplFlow::Continue => continue,
                ReplFlow::Quit => break,
            }
        }

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(spinner_style());
        spinner.set_message("thinking...");
        spinner.enable_steady_tick(Duration::from_millis(80));

        let outcome = state.dispatcher.send(&active, &line).await;
        spinner.finish_and_clear();

        match outcome {
            Ok(SendOutcome::Answered { answer }) => {
                println!();
                println!("  {} {answer}", style("Bot:").green().bold());
                println!();
            }
            Ok(SendOutcome::Ignored) => {}
            Err(err) => {
                // The question stays in the log with no reply; nothing is
                // retried.
                println!("  {} {err}", style("✗").red().bold());
            }
        }
    }

    Ok(())
}

async fn handle_command(
    state: &AppState,
    command: &str,
    active: &mut RepoRef,
) -> Result<ReplFlow> {
    match command.split_whitespace().collect::<Vec<_>>().as_slice() {
        ["help"] => {
            println!();
            println!("  {}      show this help", style("/help").yellow());
            println!("  {}     list repositories in this session", style("/repos").yellow());
            println!("  {}   show the current conversation", style("/history").yellow());
            println!("  {}     clone more repositories in the background", style("/clone").yellow());
            println!("  {} switch the active repository", style("/switch <repo>").yellow());
            println!("  {}      leave the chat", style("/quit").yellow());
            println!();
        }

        ["repos"] => {
            super::repos::list(state, false, false).await?;
        }

        ["history"] => {
            let turns = state.sessions.history(active)?;
            println!();
            if turns.is_empty() {
                println!("  {}", style("No messages yet.").dim());
            }
            for turn in turns {
                let speaker = match turn.speaker {
                    Speaker::User => style("You:").cyan().bold(),
                    Speaker::Bot => style("Bot:").green().bold(),
                };
                println!("  {speaker} {}", turn.text);
            }
            println!();
        }

        ["clone"] => {
            let urls = pick_from_catalog(state).await?;
            if urls.is_empty() {
                println!("  Nothing selected.");
            } else {
                for url in &urls {
                    let ingest = state.ingest.clone();
                    let url = url.clone();
                    tokio::spawn(async move {
                        // Outcome lands in the ledger and on the event bus;
                        // the prompt loop reports it.
                        let _ = ingest.clone_repo(&url).await;
                    });
                }
                println!(
                    "  Cloning {} repositor{} in the background...",
                    urls.len(),
                    if urls.len() == 1 { "y" } else { "ies" }
                );
            }
        }

        ["switch", target] => {
            let repo = RepoRef::from_url(target);
            let repo = if state.ingest.is_ready(&repo) {
                repo
            } else {
                match ingest_with_spinner(state, target).await {
                    Ok(repo) => repo,
                    Err(err) => {
                        println!("  {} {err}", style("✗").red().bold());
                        return Ok(ReplFlow::Continue);
                    }
                }
            };
            state.sessions.ensure(&repo);
            *active = repo;
            print_banner(active);
        }

        ["quit"] | ["exit"] => return Ok(ReplFlow::Quit),

        _ => {
            println!(
                "  Unknown command. Type {} for the list.",
                style("/help").yellow()
            );
        }
    }

    Ok(ReplFlow::Continue)
}
