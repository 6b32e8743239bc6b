// crates/hldbx-cli/src/error.rs
// ============================================================================
// Module: Setup Errors
// Description: Typed fatal outcomes of the interactive autoscan setup.
// Purpose: Carry fatal conditions to the single process exit boundary.
// Dependencies: hldbx-config, hldbx-workspace, thiserror
// ============================================================================

//! ## Overview
//! Recoverable conditions (bad input, missing resources, rejected workspace
//! credentials) are handled inside the configurators by re-prompting and
//! never surface as errors. Everything that reaches [`SetupError`] ends the
//! run; only the binary entry point turns it into an exit code.

// ============================================================================
// SECTION: Imports
// ============================================================================

use hldbx_config::EndpointError;
use hldbx_workspace::ProvisionError;
use hldbx_workspace::ScannerAuthError;
use hldbx_workspace::WorkspaceError;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Fatal setup outcomes.
#[derive(Debug, Error)]
pub enum SetupError {
    /// Standard input reached end of file while a value was required.
    #[error("input closed before setup completed")]
    InputClosed,
    /// The operator declined to provide a cluster.
    #[error("no cluster to run monitoring job, exiting")]
    NoCluster,
    /// No monitored schema survived entry or repair.
    #[error("no schemas to monitor, exiting")]
    NoSchemas,
    /// The workspace failed in a way that is not "resource not found".
    #[error("error fetching {resource}: {source}")]
    Workspace {
        /// What was being looked up.
        resource: &'static str,
        /// Underlying workspace error.
        source: WorkspaceError,
    },
    /// The scanner API URL cannot be classified.
    #[error("error parsing HiddenLayer API URL: {0}")]
    ScannerUrl(#[from] EndpointError),
    /// The scanning service rejected the client credentials.
    #[error("error authenticating to HiddenLayer: {0}")]
    ScannerAuth(#[from] ScannerAuthError),
    /// Provisioning failed.
    #[error("{0}")]
    Provision(#[from] ProvisionError),
    /// Writing to the operator console failed.
    #[error("console write failed: {0}")]
    Output(String),
}

impl SetupError {
    /// Wraps an unexpected workspace error for `resource`.
    pub(crate) const fn workspace(resource: &'static str, source: WorkspaceError) -> Self {
        Self::Workspace {
            resource,
            source,
        }
    }
}

/// Result alias for setup operations.
pub type SetupResult<T> = Result<T, SetupError>;
