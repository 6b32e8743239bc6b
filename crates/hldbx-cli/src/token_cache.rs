// crates/hldbx-cli/src/token_cache.rs
// ============================================================================
// Module: OAuth Token Cache
// Description: Reads workspace OAuth tokens cached by the platform CLI.
// Purpose: Prefer an existing OAuth session over a personal access token.
// Dependencies: dirs, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The platform CLI keeps OAuth tokens in a JSON file shaped like
//! `{"tokens": {"<host>": {"access_token": "..."}}}`. Every lookup failure
//! (absent file, bad JSON, missing keys) means "no cached token" and the
//! caller falls back to another credential source.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Token cache location relative to the home directory.
const TOKEN_CACHE_RELATIVE: [&str; 2] = [".databricks", "token-cache.json"];

/// Largest token cache file read.
const MAX_TOKEN_CACHE_BYTES: u64 = 1024 * 1024;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Why no token was found. Never fatal.
#[derive(Debug, Error)]
pub enum TokenCacheError {
    /// The file could not be read.
    #[error("unable to read token cache {path}: {reason}")]
    Read {
        /// Cache path.
        path: String,
        /// Failure reason.
        reason: String,
    },
    /// The file is not valid token-cache JSON.
    #[error("unable to parse token cache {path}: {reason}")]
    Parse {
        /// Cache path.
        path: String,
        /// Failure reason.
        reason: String,
    },
    /// The file has no token for the host.
    #[error("no cached token for {0}")]
    Missing(String),
}

/// On-disk token cache.
#[derive(Debug, Default, Deserialize)]
struct TokenCacheFile {
    /// Tokens keyed by workspace host.
    #[serde(default)]
    tokens: BTreeMap<String, CachedToken>,
}

/// One cached token entry.
#[derive(Debug, Default, Deserialize)]
struct CachedToken {
    /// OAuth access token.
    #[serde(default)]
    access_token: Option<String>,
}

// ============================================================================
// SECTION: Lookup
// ============================================================================

/// Returns the platform CLI's default token cache path.
#[must_use]
pub fn default_token_cache_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| TOKEN_CACHE_RELATIVE.iter().fold(home, |path, part| path.join(part)))
}

/// Looks up the cached access token for `host` in the cache at `path`.
///
/// # Errors
///
/// Returns [`TokenCacheError`] when no usable token is found.
pub fn lookup_cached_token(path: &Path, host: &str) -> Result<String, TokenCacheError> {
    let display = path.display().to_string();
    let read_error = |reason: String| TokenCacheError::Read {
        path: display.clone(),
        reason,
    };
    let metadata = fs::metadata(path).map_err(|err| read_error(err.to_string()))?;
    if metadata.len() > MAX_TOKEN_CACHE_BYTES {
        return Err(read_error("file exceeds size limit".to_string()));
    }
    let bytes = fs::read(path).map_err(|err| read_error(err.to_string()))?;
    let cache: TokenCacheFile =
        serde_json::from_slice(&bytes).map_err(|err| TokenCacheError::Parse {
            path: display.clone(),
            reason: err.to_string(),
        })?;
    cache
        .tokens
        .get(host)
        .and_then(|entry| entry.access_token.clone())
        .filter(|token| !token.trim().is_empty())
        .ok_or_else(|| TokenCacheError::Missing(host.to_string()))
}
