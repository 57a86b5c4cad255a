//! Repository listing and cloning commands.
//!
//! `rchat repos` shows the ingestion ledger (or, with `--available`, the
//! remote catalog). `rchat clone` ingests repositories concurrently, with
//! one spinner per repository driven by the ingestion event bus.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::Result;
use comfy_table::{presets, Cell, Color, ContentArrangement, Table};
use console::style;
use dialoguer::MultiSelect;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use tokio::task::JoinSet;

use repochat_core::ingest::CloneOutcome;
use repochat_types::error::IngestError;
use repochat_types::event::IngestEvent;
use repochat_types::repo::{IngestState, RepoRef};

use crate::state::AppState;

pub(crate) fn spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("{spinner:.cyan} {msg}")
        .unwrap()
}

/// List repositories: the session's ingestion ledger, or the remote
/// catalog with `--available`.
pub async fn list(state: &AppState, available: bool, json: bool) -> Result<()> {
    if available {
        let urls = state
            .catalog
            .list_available()
            .await
            .map_err(|e| anyhow::anyhow!("could not fetch the repository catalog: {e}"))?;

        if json {
            println!("{}", serde_json::to_string_pretty(&urls)?);
            return Ok(());
        }

        if urls.is_empty() {
            println!();
            println!(
                "  {} No repositories visible. Connect an account with: {}",
                style("i").blue().bold(),
                style("rchat connect").yellow()
            );
            println!();
            return Ok(());
        }

        let mut table = Table::new();
        table.load_preset(presets::UTF8_FULL_CONDENSED);
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec![
            Cell::new("Name").fg(Color::White),
            Cell::new("Clone URL").fg(Color::White),
        ]);
        for url in &urls {
            table.add_row(vec![
                Cell::new(RepoRef::from_url(url).to_string()).fg(Color::Cyan),
                Cell::new(url).fg(Color::DarkGrey),
            ]);
        }

        println!();
        println!("{table}");
        println!();
        return Ok(());
    }

    let snapshot = state.ingest.snapshot();

    if json {
        let entries: Vec<_> = snapshot
            .iter()
            .map(|(repo, ingest_state)| match ingest_state {
                IngestState::Failed { reason } => serde_json::json!({
                    "repo": repo.as_str(),
                    "state": ingest_state.to_string(),
                    "reason": reason,
                }),
                _ => serde_json::json!({
                    "repo": repo.as_str(),
                    "state": ingest_state.to_string(),
                }),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if snapshot.is_empty() {
        println!();
        println!(
            "  {} Nothing ingested in this session. Start with: {}",
            style("i").blue().bold(),
            style("rchat chat").yellow()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Repository").fg(Color::White),
        Cell::new("State").fg(Color::White),
        Cell::new("Detail").fg(Color::White),
    ]);

    for (repo, ingest_state) in &snapshot {
        let (state_cell, detail) = match ingest_state {
            IngestState::Ready => (Cell::new("● ready").fg(Color::Green), String::new()),
            IngestState::Loading => (Cell::new("◌ loading").fg(Color::Yellow), String::new()),
            IngestState::Available => (Cell::new("○ available").fg(Color::DarkGrey), String::new()),
            IngestState::Failed { reason } => (Cell::new("✗ failed").fg(Color::Red), reason.clone()),
        };
        table.add_row(vec![
            Cell::new(repo.to_string()).fg(Color::Cyan),
            state_cell,
            Cell::new(detail).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();

    Ok(())
}

/// Fetch the catalog and let the user pick repositories to clone.
///
/// Returns the selected clone URLs; empty when the catalog is empty or
/// nothing was picked.
pub(crate) async fn pick_from_catalog(state: &AppState) -> Result<Vec<String>> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(spinner_style());
    spinner.set_message("Fetching repositories...");
    spinner.enable_steady_tick(Duration::from_millis(80));

    let urls = state.catalog.list_available().await;
    spinner.finish_and_clear();

    let urls = urls.map_err(|e| anyhow::anyhow!("could not fetch the repository catalog: {e}"))?;
    if urls.is_empty() {
        println!(
            "  {} No repositories visible. Connect an account with: {}",
            style("i").blue().bold(),
            style("rchat connect").yellow()
        );
        return Ok(Vec::new());
    }

    let names: Vec<String> = urls
        .iter()
        .map(|url| RepoRef::from_url(url).to_string())
        .collect();
    let selection = tokio::task::spawn_blocking(move || {
        MultiSelect::new()
            .with_prompt("Select repositories to clone (space to toggle, enter to confirm)")
            .items(&names)
            .interact()
    })
    .await??;

    Ok(selection.into_iter().map(|i| urls[i].clone()).collect())
}

fn outcome_label(outcome: &CloneOutcome) -> &'static str {
    match outcome {
        CloneOutcome::Cloned(_) => "ready",
        CloneOutcome::AlreadyReady(_) => "already ready",
        CloneOutcome::AlreadyLoading(_) => "already loading",
    }
}

/// Ingest the given repositories concurrently.
///
/// With no URLs, opens the interactive catalog picker first. Each
/// repository gets one ingestion attempt; failures are reported and the
/// rest continue.
pub async fn clone_repos(state: &AppState, urls: Vec<String>, json: bool) -> Result<()> {
    let urls = if urls.is_empty() {
        pick_from_catalog(state).await?
    } else {
        urls
    };
    if urls.is_empty() {
        println!("  Nothing selected.");
        return Ok(());
    }

    let mut events = state.ingest.subscribe();
    let mut tasks = JoinSet::new();
    for url in &urls {
        let ingest = state.ingest.clone();
        let url = url.clone();
        tasks.spawn(async move { ingest.clone_repo(&url).await });
    }

    if json {
        let mut entries = Vec::new();
        while let Some(res) = tasks.join_next().await {
            let entry = match res? {
                Ok(outcome) => serde_json::json!({
                    "repo": outcome.repo().as_str(),
                    "status": outcome_label(&outcome),
                }),
                Err(IngestError::Backend { repo, source }) => serde_json::json!({
                    "repo": repo.as_str(),
                    "status": "failed",
                    "error": source.to_string(),
                }),
            };
            entries.push(entry);
        }
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    let multi = MultiProgress::new();
    let mut bars: HashMap<RepoRef, ProgressBar> = HashMap::new();
    for url in &urls {
        let repo = RepoRef::from_url(url);
        let bar = bars
            .entry(repo.clone())
            .or_insert_with(|| multi.add(ProgressBar::new_spinner()));
        bar.set_style(spinner_style());
        bar.set_message(format!("{repo}: cloning..."));
        bar.enable_steady_tick(Duration::from_millis(80));
    }

    let apply_event = |bars: &HashMap<RepoRef, ProgressBar>, event: IngestEvent| match event {
        IngestEvent::Completed { repo } => {
            if let Some(bar) = bars.get(&repo) {
                bar.finish_with_message(format!("{repo}: ready"));
            }
        }
        IngestEvent::Failed { repo, reason } => {
            if let Some(bar) = bars.get(&repo) {
                bar.finish_with_message(format!("{repo}: failed -- {reason}"));
            }
        }
        IngestEvent::Started { .. } => {}
    };

    let total = urls.len();
    let mut done = 0;
    let mut ready = 0;
    let mut failed = 0;
    while done < total {
        tokio::select! {
            event = events.recv() => {
                if let Ok(event) = event {
                    apply_event(&bars, event);
                }
            }
            Some(res) = tasks.join_next() => {
                done += 1;
                match res? {
                    Ok(outcome) => {
                        ready += 1;
                        // No-op outcomes publish no event; close their bars here.
                        match &outcome {
                            CloneOutcome::AlreadyReady(repo) | CloneOutcome::AlreadyLoading(repo) => {
                                if let Some(bar) = bars.get(repo) {
                                    bar.finish_with_message(format!(
                                        "{repo}: {}",
                                        outcome_label(&outcome)
                                    ));
                                }
                            }
                            CloneOutcome::Cloned(_) => {}
                        }
                    }
                    Err(_) => failed += 1,
                }
            }
        }
    }

    // The last Completed/Failed event can still be queued when the final
    // task joins; drain so every bar lands in a finished state.
    while let Ok(event) = events.try_recv() {
        apply_event(&bars, event);
    }

    println!();
    if failed == 0 {
        println!(
            "  {} {} repositor{} ready.",
            style("✓").green().bold(),
            style(ready).bold(),
            if ready == 1 { "y" } else { "ies" }
        );
    } else {
        println!(
            "  {} {} ready, {} failed. Re-run {} to retry.",
            style("!").yellow().bold(),
            ready,
            failed,
            style("rchat clone").yellow()
        );
    }
    println!();

    Ok(())
}
