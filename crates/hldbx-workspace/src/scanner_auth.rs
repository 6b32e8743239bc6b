// crates/hldbx-workspace/src/scanner_auth.rs
// ============================================================================
// Module: Scanner OAuth Client
// Description: Client-credentials token exchange against the scanning service.
// Purpose: Prove that a scanner client ID/secret pair is accepted.
// Dependencies: reqwest, serde, serde_json, thiserror, tracing
// ============================================================================

//! ## Overview
//! The managed scanning service issues bearer tokens from
//! `POST {auth_url}/oauth2/token?grant_type=client_credentials` with the
//! client ID and secret sent as HTTP Basic credentials. Setup only needs to
//! know whether the exchange succeeds; the token itself is discarded.
//!
//! ## Invariants
//! - Only HTTP 200 with a string `access_token` counts as success.
//! - The client secret never appears in errors or logs.

// ============================================================================
// SECTION: Imports
// ============================================================================

use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::http::HttpClientConfig;
use crate::http::build_http_client;
use crate::http::parse_base_url;
use crate::http::read_response_limited;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Scanner token exchange failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScannerAuthError {
    /// The auth URL was rejected before any request was sent.
    #[error("invalid scanner auth url: {0}")]
    InvalidUrl(String),
    /// The request could not be sent.
    #[error("scanner auth request failed: {0}")]
    Transport(String),
    /// The token endpoint answered with a non-200 status.
    #[error("unable to get authentication credentials for the scanner api: http {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },
    /// The token endpoint answered 200 without a usable token.
    #[error("unable to get authentication credentials for the scanner api: {0}")]
    InvalidResponse(String),
}

// ============================================================================
// SECTION: Interface
// ============================================================================

/// Exchanges scanner client credentials for an access token.
pub trait ScannerAuthenticator {
    /// Returns an access token for the given client credentials.
    ///
    /// # Errors
    ///
    /// Returns [`ScannerAuthError`] when the exchange fails for any reason.
    fn authenticate(
        &self,
        auth_url: &str,
        client_id: &str,
        client_secret: &str,
    ) -> Result<String, ScannerAuthError>;
}

// ============================================================================
// SECTION: HTTP Implementation
// ============================================================================

/// Token endpoint path segments under the auth base URL.
const TOKEN_PATH: [&str; 2] = ["oauth2", "token"];

/// Token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    /// Issued bearer token.
    #[serde(default)]
    access_token: Option<String>,
}

/// Blocking HTTP token exchange.
#[derive(Debug, Clone, Default)]
pub struct HttpScannerAuthenticator {
    /// Outbound HTTP policy.
    config: HttpClientConfig,
}

impl HttpScannerAuthenticator {
    /// Creates an authenticator with the given HTTP policy.
    #[must_use]
    pub const fn new(config: HttpClientConfig) -> Self {
        Self {
            config,
        }
    }

    /// Builds the token endpoint URL for an auth base URL.
    fn token_url(&self, auth_url: &str) -> Result<Url, ScannerAuthError> {
        let mut url =
            parse_base_url(auth_url, self.config.allow_http).map_err(ScannerAuthError::InvalidUrl)?;
        url.path_segments_mut()
            .map_err(|()| ScannerAuthError::InvalidUrl(auth_url.to_string()))?
            .pop_if_empty()
            .extend(TOKEN_PATH);
        url.set_query(Some("grant_type=client_credentials"));
        Ok(url)
    }

    /// Builds the underlying client.
    fn client(&self) -> Result<Client, ScannerAuthError> {
        build_http_client(&self.config).map_err(ScannerAuthError::Transport)
    }
}

impl ScannerAuthenticator for HttpScannerAuthenticator {
    fn authenticate(
        &self,
        auth_url: &str,
        client_id: &str,
        client_secret: &str,
    ) -> Result<String, ScannerAuthError> {
        let url = self.token_url(auth_url)?;
        debug!(path = url.path(), "scanner token request");
        let mut response = self
            .client()?
            .post(url)
            .basic_auth(client_id, Some(client_secret))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .send()
            .map_err(|err| ScannerAuthError::Transport(err.without_url().to_string()))?;
        let status = response.status().as_u16();
        if status != 200 {
            return Err(ScannerAuthError::Status {
                status,
            });
        }
        let body = read_response_limited(&mut response, self.config.max_response_bytes)
            .map_err(ScannerAuthError::InvalidResponse)?;
        let parsed: TokenResponse = serde_json::from_slice(&body)
            .map_err(|_| ScannerAuthError::InvalidResponse("invalid response".to_string()))?;
        parsed
            .access_token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ScannerAuthError::InvalidResponse("invalid response".to_string()))
    }
}
