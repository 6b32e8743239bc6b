// crates/hldbx-config/src/endpoints.rs
// ============================================================================
// Module: Scanner Endpoints
// Description: Region table and deployment classification for the scanner.
// Purpose: Resolve scanner URLs and decide whether SaaS credentials apply.
// Dependencies: url
// ============================================================================

//! ## Overview
//! The scanning service is either the vendor-hosted SaaS (selected by region)
//! or a self-hosted enterprise deployment reached through custom URLs. Only
//! the SaaS needs OAuth client credentials.
//!
//! ## Invariants
//! - A host is managed SaaS iff it ends with [`MANAGED_SAAS_SUFFIX`]
//!   (case-sensitive, on the hostname as the operator wrote it).

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Hostname suffix identifying the vendor-hosted scanning service.
pub const MANAGED_SAAS_SUFFIX: &str = ".hiddenlayer.ai";

/// US region endpoints, also the defaults offered for custom URLs.
pub const US_ENDPOINTS: RegionEndpoints = RegionEndpoints {
    api_url: "https://api.us.hiddenlayer.ai",
    auth_url: "https://auth.hiddenlayer.ai",
    console_url: "https://console.us.hiddenlayer.ai",
};

/// EU region endpoints.
pub const EU_ENDPOINTS: RegionEndpoints = RegionEndpoints {
    api_url: "https://api.eu.hiddenlayer.ai",
    auth_url: "https://auth.eu.hiddenlayer.ai",
    console_url: "https://console.eu.hiddenlayer.ai",
};

// ============================================================================
// SECTION: Types
// ============================================================================

/// Fixed URL triple for a managed region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionEndpoints {
    /// Scanner API base URL.
    pub api_url: &'static str,
    /// OAuth base URL.
    pub auth_url: &'static str,
    /// Console base URL.
    pub console_url: &'static str,
}

/// Scanner region selector offered to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScannerRegion {
    /// Managed SaaS, US region.
    Us,
    /// Managed SaaS, EU region.
    Eu,
    /// Operator supplies every URL.
    Custom,
}

impl ScannerRegion {
    /// Accepted region labels in prompt order.
    pub const LABELS: [&'static str; 3] = ["US", "EU", "CUSTOM"];

    /// Parses a region label case-insensitively.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "US" => Some(Self::Us),
            "EU" => Some(Self::Eu),
            "CUSTOM" => Some(Self::Custom),
            _ => None,
        }
    }

    /// Returns the canonical upper-case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Us => "US",
            Self::Eu => "EU",
            Self::Custom => "CUSTOM",
        }
    }

    /// Returns the fixed endpoints for managed regions; `None` for custom.
    #[must_use]
    pub const fn endpoints(self) -> Option<RegionEndpoints> {
        match self {
            Self::Us => Some(US_ENDPOINTS),
            Self::Eu => Some(EU_ENDPOINTS),
            Self::Custom => None,
        }
    }
}

/// Where the scanner API is hosted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScannerDeployment {
    /// Vendor-hosted SaaS; client credentials are required.
    ManagedSaas,
    /// Enterprise/self-hosted; no scanner credentials are collected.
    SelfHosted,
}

/// Scanner URL classification errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EndpointError {
    /// The URL did not parse.
    #[error("invalid scanner api url {url}: {reason}")]
    Parse {
        /// The rejected URL.
        url: String,
        /// Parser failure reason.
        reason: String,
    },
    /// The URL parsed but carries no hostname.
    #[error("scanner api url has no host: {0}")]
    MissingHost(String),
}

// ============================================================================
// SECTION: Classification
// ============================================================================

/// Returns true when `host` belongs to the managed SaaS domain.
#[must_use]
pub fn is_managed_saas_host(host: &str) -> bool {
    host.ends_with(MANAGED_SAAS_SUFFIX)
}

/// Classifies a scanner API URL by its hostname.
///
/// # Errors
///
/// Returns [`EndpointError`] when the URL cannot be parsed or has no host.
pub fn classify_api_url(api_url: &str) -> Result<ScannerDeployment, EndpointError> {
    let parsed = Url::parse(api_url.trim()).map_err(|err| EndpointError::Parse {
        url: api_url.to_string(),
        reason: err.to_string(),
    })?;
    let host = parsed.host_str().ok_or_else(|| EndpointError::MissingHost(api_url.to_string()))?;
    if is_managed_saas_host(typed_host(api_url.trim(), host)) {
        Ok(ScannerDeployment::ManagedSaas)
    } else {
        Ok(ScannerDeployment::SelfHosted)
    }
}

/// Returns the host as written in `url`, before the parser lowercased it.
///
/// Falls back to `parsed_host` when the written form cannot be isolated or
/// differs by more than ASCII case (IPv6 literals, IDNA hosts).
fn typed_host<'a>(url: &'a str, parsed_host: &'a str) -> &'a str {
    let after_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    let authority = after_scheme.split(['/', '?', '#']).next().unwrap_or_default();
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, host)| host);
    let host = host_port.rsplit_once(':').map_or(host_port, |(host, _)| host);
    if host.eq_ignore_ascii_case(parsed_host) { host } else { parsed_host }
}
