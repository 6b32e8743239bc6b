// crates/hldbx-cli/src/lib.rs
// ============================================================================
// Module: hldbx CLI Library
// Description: Interactive autoscan setup core shared by the binary and tests.
// Purpose: Collect, validate, and provision an autoscan configuration.
// Dependencies: clap, cron, hldbx-config, hldbx-workspace, rpassword, tracing
// ============================================================================

//! ## Overview
//! The setup core walks an operator from a possibly empty configuration
//! record to a scheduled monitoring job:
//!
//! 1. [`credentials`] resolves and verifies workspace credentials.
//! 2. [`resources`] fills the cluster, run-as principal, job limits,
//!    polling schedule, and monitored schemas.
//! 3. [`scanner`] settles the scanner endpoints and credentials.
//! 4. [`setup`] sequences the three and hands the record to provisioning.
//!
//! Every prompt and confirmation is rendered through the [`i18n`] catalog
//! and written to a [`prompt::Console`], so the whole flow runs against
//! scripted input in tests.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod commands;
pub mod credentials;
pub mod error;
/// Message catalog and the `t!` macro.
pub mod i18n;
pub mod prompt;
pub mod resources;
pub mod scanner;
pub mod setup;
pub mod token_cache;
pub mod validate;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use error::SetupError;
pub use error::SetupResult;
pub use prompt::Console;
pub use prompt::LineSource;
pub use prompt::Prompt;
pub use setup::SetupContext;
pub use setup::run_autoscan;
