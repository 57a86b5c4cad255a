//! GitHub connect flow.
//!
//! The service handles the OAuth dance; the CLI's part is pointing the
//! user at the authorization URL and reading the `access_token` query
//! parameter off the callback URL they land on.

use anyhow::Result;
use console::style;
use dialoguer::Input;
use secrecy::ExposeSecret;

use repochat_core::remote::RagBackend;
use repochat_infra::auth::extract_access_token;
use repochat_infra::http::HttpRagClient;

use crate::state::AppState;

/// Run the interactive connect flow.
pub async fn connect(state: &AppState) -> Result<()> {
    let authorize_url = format!("{}/oauth/github", state.config.service_url.trim_end_matches('/'));

    println!();
    println!(
        "  {} Open this URL in your browser and authorize the app:",
        style("→").bold()
    );
    println!();
    println!("  {}", style(&authorize_url).cyan().underlined());
    println!();

    let callback: String = tokio::task::spawn_blocking(|| {
        Input::<String>::new()
            .with_prompt("Paste the URL you were redirected to")
            .interact_text()
    })
    .await??;

    let Some(token) = extract_access_token(&callback) else {
        anyhow::bail!("no access_token parameter found in that URL");
    };

    // Round-trip the token against the listing endpoint before reporting
    // success.
    let client = HttpRagClient::new(&state.config).with_access_token(token.clone());
    match client.list_repos().await {
        Ok(repos) => {
            println!();
            println!(
                "  {} Connected -- {} repositor{} visible.",
                style("✓").green().bold(),
                style(repos.len()).bold(),
                if repos.len() == 1 { "y" } else { "ies" }
            );
        }
        Err(err) => {
            println!();
            println!(
                "  {} Token extracted, but the listing endpoint rejected it: {err}",
                style("!").yellow().bold()
            );
        }
    }

    println!();
    println!(
        "  {} Token for this session (save it -- it is not stored anywhere):",
        style("🔑").bold()
    );
    println!();
    println!(
        "  export RCHAT_ACCESS_TOKEN={}",
        style(token.expose_secret()).yellow().bold()
    );
    println!();

    Ok(())
}
