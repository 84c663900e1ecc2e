// ABOUTME: CLI commands for the Strava OAuth token
// ABOUTME: Login through the browser or the cache, report cache status, and clear the cached token

use anyhow::{Context, Result};
use chrono::Local;
use colored::*;
use strava_auth::{AuthSettings, OAuthFlow, TokenCache};
use strava_auth_cli::{Commands, ScopeArgs};

/// Descriptor for the context handed to Strava API calls
const CONTEXT_DESCRIPTOR: &str = "strava.ContextOAuth2 (access token)";

pub async fn handle_command(command: Commands, settings: AuthSettings) -> Result<()> {
    let flow = OAuthFlow::new(settings)?;
    match command {
        Commands::Login {
            scopes,
            print_token,
        } => login_command(&flow, &scopes, print_token).await,
        Commands::Status { scopes } => status_command(&flow, &scopes),
        Commands::Clear { scopes } => clear_command(&flow, &scopes),
    }
}

async fn login_command(flow: &OAuthFlow, scopes: &ScopeArgs, print_token: bool) -> Result<()> {
    let context = flow
        .get_oauth_context(CONTEXT_DESCRIPTOR, &scopes.as_strs())
        .await
        .context("Authorization failed")?;
    let token = context.token().await.context("No usable token")?;

    if print_token {
        println!("{}", token.access_token);
        return Ok(());
    }

    println!("{} Authorized", "✓".green().bold());
    println!("  Token type: {}", token.token_type);
    match token.expiry {
        Some(expiry) => println!("  Expires:    {}", expiry.with_timezone(&Local).to_rfc2822()),
        None => println!("  Expires:    never"),
    }
    println!(
        "  Refresh:    {}",
        if token.refresh_token.is_some() { "available" } else { "none" }
    );
    Ok(())
}

fn status_command(flow: &OAuthFlow, scopes: &ScopeArgs) -> Result<()> {
    let config = flow.settings().client_config(&scopes.as_strs())?;
    let cache = flow.cache()?;
    let fingerprint = TokenCache::fingerprint(&config);
    let path = cache.entry_path(fingerprint);

    if !cache.is_enabled() {
        println!("{} Token caching is disabled", "!".yellow().bold());
        return Ok(());
    }

    match cache.load(fingerprint) {
        Some(token) => {
            let state = if token.is_expired() {
                "expired".yellow()
            } else {
                "valid".green()
            };
            println!("{} Cached token ({})", "✓".green().bold(), state);
        }
        None => println!("{} No cached token", "✗".red().bold()),
    }
    println!("  Scopes:      {}", config.joined_scopes());
    println!("  Fingerprint: {}", fingerprint);
    println!("  File:        {}", path.display());
    Ok(())
}

fn clear_command(flow: &OAuthFlow, scopes: &ScopeArgs) -> Result<()> {
    let config = flow.settings().client_config(&scopes.as_strs())?;
    let cache = flow.cache()?;
    let fingerprint = TokenCache::fingerprint(&config);

    if cache.remove(fingerprint)? {
        println!("{} Removed {}", "✓".green().bold(), cache.entry_path(fingerprint).display());
    } else {
        println!("No cached token for scopes {}", config.joined_scopes());
    }
    Ok(())
}
