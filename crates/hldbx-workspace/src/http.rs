// crates/hldbx-workspace/src/http.rs
// ============================================================================
// Module: HTTP Client Plumbing
// Description: Shared blocking client construction and bounded body reads.
// Purpose: Apply one pool/timeout/user-agent policy to every outbound call.
// Dependencies: reqwest
// ============================================================================

//! ## Overview
//! Both remote systems are reached through `reqwest::blocking` clients with
//! a bounded idle pool and a generous overall timeout. No cancellation is
//! threaded through; a call in flight runs until it completes or times out.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Read;
use std::time::Duration;

use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::blocking::Response;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Product token sent in the user agent alongside the tool version.
const PRODUCT_TOKEN: &str = "hiddenlayer-model-scanner";

/// Outbound HTTP policy.
///
/// # Invariants
/// - `allow_http = false` blocks cleartext `http://` base URLs.
/// - `max_response_bytes` is a hard upper bound on buffered bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpClientConfig {
    /// Allow cleartext HTTP (disabled by default; used by local tests).
    pub allow_http: bool,
    /// Overall request timeout.
    pub timeout: Duration,
    /// Maximum idle connections kept per host.
    pub max_idle_per_host: usize,
    /// How long an idle connection is kept.
    pub idle_timeout: Duration,
    /// Maximum response size allowed, in bytes.
    pub max_response_bytes: usize,
    /// User agent string for outbound requests.
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        let version = env!("CARGO_PKG_VERSION");
        Self {
            allow_http: false,
            timeout: Duration::from_secs(15 * 60),
            max_idle_per_host: 10,
            idle_timeout: Duration::from_secs(30),
            max_response_bytes: 8 * 1024 * 1024,
            user_agent: format!("hldbx/{version} {PRODUCT_TOKEN}/{version}"),
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds a blocking client from the shared policy.
pub(crate) fn build_http_client(config: &HttpClientConfig) -> Result<Client, String> {
    Client::builder()
        .timeout(config.timeout)
        .pool_max_idle_per_host(config.max_idle_per_host)
        .pool_idle_timeout(config.idle_timeout)
        .user_agent(config.user_agent.clone())
        .build()
        .map_err(|err| format!("http client build failed: {err}"))
}

/// Parses a base URL and enforces the scheme policy.
pub(crate) fn parse_base_url(raw: &str, allow_http: bool) -> Result<Url, String> {
    let url = Url::parse(raw.trim()).map_err(|err| format!("invalid url {raw}: {err}"))?;
    match url.scheme() {
        "https" => {}
        "http" if allow_http => {}
        scheme => return Err(format!("unsupported url scheme {scheme}")),
    }
    if url.host_str().is_none() {
        return Err(format!("url host required: {raw}"));
    }
    if !url.username().is_empty() || url.password().is_some() {
        return Err("url credentials are not allowed".to_string());
    }
    Ok(url)
}

/// Reads the response body while enforcing a byte limit.
pub(crate) fn read_response_limited(
    response: &mut Response,
    max_bytes: usize,
) -> Result<Vec<u8>, String> {
    let max_bytes_u64 =
        u64::try_from(max_bytes).map_err(|_| "response size limit exceeds u64".to_string())?;
    if let Some(expected) = response.content_length()
        && expected > max_bytes_u64
    {
        return Err("http response exceeds size limit".to_string());
    }
    let mut buf = Vec::new();
    let mut handle = response.take(max_bytes_u64.saturating_add(1));
    handle.read_to_end(&mut buf).map_err(|err| format!("failed to read response: {err}"))?;
    if buf.len() > max_bytes {
        return Err("http response exceeds size limit".to_string());
    }
    Ok(buf)
}
