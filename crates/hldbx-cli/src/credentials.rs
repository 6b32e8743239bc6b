// crates/hldbx-cli/src/credentials.rs
// ============================================================================
// Module: Credential Resolver
// Description: Workspace host/credential acquisition and authentication.
// Purpose: Produce an authenticated workspace session for the rest of setup.
// Dependencies: hldbx-config, hldbx-workspace, tracing
// ============================================================================

//! ## Overview
//! Credentials are resolved in priority order:
//!
//! 1. a cached OAuth token for the host, from a token-cache file whose path
//!    the operator may override;
//! 2. when the configured credential is itself a path to a readable file,
//!    that file is read as a token cache;
//! 3. a masked personal access token prompt.
//!
//! The resulting pair is checked against the workspace. Any failure clears
//! both host and credential and starts over; only the operator (or end of
//! input) ends the loop.
//!
//! ## Invariants
//! - The connector is never called with an empty host or credential.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;

use hldbx_config::AutoscanConfig;
use hldbx_workspace::WorkspaceApi;
use hldbx_workspace::WorkspaceConnector;
use tracing::debug;
use tracing::info;

use crate::error::SetupResult;
use crate::prompt::Console;
use crate::prompt::Prompt;
use crate::t;
use crate::token_cache::lookup_cached_token;
use crate::validate::parse_workspace_host;

// ============================================================================
// SECTION: Resolver
// ============================================================================

/// Resolves workspace credentials and returns an authenticated session.
///
/// `token_cache` is the default token-cache path offered to the operator.
///
/// # Errors
///
/// Returns [`crate::SetupError`] only for console failures or end of input.
pub fn resolve_workspace_credentials(
    console: &mut Console,
    config: &mut AutoscanConfig,
    connector: &dyn WorkspaceConnector,
    token_cache: Option<&Path>,
) -> SetupResult<Box<dyn WorkspaceApi>> {
    loop {
        if !config.has_workspace_credentials() {
            config.workspace_host = ask_workspace_host(console)?;
            config.workspace_token =
                token_from_cache_prompt(console, &config.workspace_host, token_cache)?;
        }
        let token_path = Path::new(&config.workspace_token);
        if !config.workspace_token.is_empty() && token_path.is_file() {
            let path = token_path.to_path_buf();
            config.workspace_token = token_from_file(console, &path, &config.workspace_host)?;
        }
        if !config.has_workspace_credentials() {
            console.say(&t!("credentials.required"))?;
            config.clear_workspace_credentials();
            continue;
        }
        match connector.connect(&config.workspace_host, &config.workspace_token) {
            Ok(session) => {
                info!(host = %config.workspace_host, "workspace authenticated");
                console.say(&t!("auth.ok", host = config.workspace_host))?;
                return Ok(session);
            }
            Err(err) => {
                console.say(&t!("auth.failed", error = err))?;
                config.clear_workspace_credentials();
            }
        }
    }
}

/// Prompts until a well-formed workspace URL is entered.
fn ask_workspace_host(console: &mut Console) -> SetupResult<String> {
    let prompt = Prompt::new(t!("label.workspace_host"));
    loop {
        let raw = console.ask(&prompt)?;
        match parse_workspace_host(&raw) {
            Ok(host) => return Ok(host),
            Err(err) => console.say(&err.operator_message())?,
        }
    }
}

/// Offers the token cache, falling back to a personal access token.
fn token_from_cache_prompt(
    console: &mut Console,
    host: &str,
    default_cache: Option<&Path>,
) -> SetupResult<String> {
    let default_label = default_cache.map_or_else(String::new, |path| path.display().to_string());
    let mut prompt = Prompt::new(t!("label.token_cache_path", default = default_label)).optional();
    if let Some(path) = default_cache {
        prompt = prompt.with_default(path.display().to_string());
    }
    let answer = console.ask(&prompt)?;
    if answer.is_empty() {
        console.say(&t!("token.cache_missing"))?;
        return ask_personal_token(console);
    }
    token_from_file(console, Path::new(&answer), host)
}

/// Reads the token for `host` from a cache file, falling back to a prompt.
fn token_from_file(console: &mut Console, path: &Path, host: &str) -> SetupResult<String> {
    match lookup_cached_token(path, host) {
        Ok(token) => {
            console.say(&t!("token.cache_used", path = path.display()))?;
            Ok(token)
        }
        Err(err) => {
            debug!(error = %err, "token cache lookup failed");
            console.say(&t!("token.cache_missing"))?;
            ask_personal_token(console)
        }
    }
}

/// Prompts for a masked personal access token.
fn ask_personal_token(console: &mut Console) -> SetupResult<String> {
    console.ask(&Prompt::new(t!("label.personal_token")).masked())
}
