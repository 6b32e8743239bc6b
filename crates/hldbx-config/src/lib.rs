// crates/hldbx-config/src/lib.rs
// ============================================================================
// Module: hldbx Config Library
// Description: Configuration record and persisted-file loader for autoscan.
// Purpose: Single source of truth for hldbx.yaml semantics.
// Dependencies: serde, serde_yaml, toml, url
// ============================================================================

//! ## Overview
//! `hldbx-config` defines the configuration record shared by every autoscan
//! stage, the loader for the optional persisted file, and the fixed table of
//! managed scanning-service endpoints.
//!
//! Security posture: the persisted file holds credentials; the record's
//! `Debug` output never prints them.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod endpoints;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use endpoints::*;
