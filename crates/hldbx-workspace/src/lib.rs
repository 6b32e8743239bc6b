// crates/hldbx-workspace/src/lib.rs
// ============================================================================
// Module: hldbx Workspace Library
// Description: Workspace REST client, scanner OAuth client, and provisioning.
// Purpose: Isolate every outbound HTTP call behind narrow traits.
// Dependencies: base64, hldbx-config, reqwest, serde, serde_json, tracing
// ============================================================================

//! ## Overview
//! This crate owns the remote side of autoscan: the workspace API (identity
//! check, cluster/schema/service-principal lookups, secrets, workspace files,
//! jobs), the scanning-service token endpoint, and the provisioning sequence
//! that stores credentials, uploads notebooks, and schedules the monitor job.
//!
//! All calls are blocking. Interactive setup code depends only on the
//! [`WorkspaceApi`], [`WorkspaceConnector`], and [`ScannerAuthenticator`]
//! traits so it can be exercised without a network.
//!
//! Security posture: bearer tokens and client secrets are never logged.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod api;
pub mod client;
pub mod http;
pub mod provision;
pub mod scanner_auth;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use api::*;
pub use client::HttpWorkspaceClient;
pub use client::HttpWorkspaceConnector;
pub use http::HttpClientConfig;
pub use provision::ProvisionError;
pub use provision::ProvisionReport;
pub use provision::provision_autoscan;
pub use scanner_auth::HttpScannerAuthenticator;
pub use scanner_auth::ScannerAuthError;
pub use scanner_auth::ScannerAuthenticator;
