// crates/hldbx-cli/src/setup.rs
// ============================================================================
// Module: Autoscan Setup
// Description: Sequences credential, resource, and scanner configuration.
// Purpose: Turn a partial record into provisioned workspace resources.
// Dependencies: hldbx-config, hldbx-workspace, tracing
// ============================================================================

//! ## Overview
//! [`run_autoscan`] runs the three configurators strictly in order and then
//! hands the completed record to the provisioning collaborator. Each stage
//! only starts once the previous one has produced a validated result.
//!
//! ## Invariants
//! - Provisioning is never reached with an unauthenticated session, an
//!   empty cluster, or an empty schema list.
//! - Side effects from provisioning are not rolled back on failure.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;

use hldbx_config::AutoscanConfig;
use hldbx_config::ScannerDeployment;
use hldbx_workspace::ProvisionReport;
use hldbx_workspace::ScannerAuthenticator;
use hldbx_workspace::WorkspaceConnector;
use hldbx_workspace::provision_autoscan;
use tracing::info;

use crate::credentials::resolve_workspace_credentials;
use crate::error::SetupResult;
use crate::prompt::Console;
use crate::resources::configure_resources;
use crate::scanner::configure_scanner;
use crate::t;

// ============================================================================
// SECTION: Collaborators
// ============================================================================

/// External systems the setup talks to.
pub struct SetupContext<'a> {
    /// Opens authenticated workspace sessions.
    pub connector: &'a dyn WorkspaceConnector,
    /// Verifies scanner client credentials.
    pub authenticator: &'a dyn ScannerAuthenticator,
    /// Default token-cache path offered to the operator.
    pub token_cache: Option<&'a Path>,
    /// Release version used for the notebook directory.
    pub version: &'a str,
}

// ============================================================================
// SECTION: Orchestration
// ============================================================================

/// Runs interactive setup against `config` and provisions the workspace.
///
/// # Errors
///
/// Returns [`crate::SetupError`] for every fatal outcome of configuration
/// or provisioning.
pub fn run_autoscan(
    console: &mut Console,
    config: &mut AutoscanConfig,
    context: &SetupContext<'_>,
) -> SetupResult<ProvisionReport> {
    let api =
        resolve_workspace_credentials(console, config, context.connector, context.token_cache)?;
    configure_resources(console, config, api.as_ref())?;
    let deployment = configure_scanner(console, config, context.authenticator)?;
    info!(
        host = api.host(),
        saas = deployment == ScannerDeployment::ManagedSaas,
        "configuration complete"
    );

    if config.run_as.is_empty() {
        console.say(&t!("provision.run_as_default"))?;
    }
    let report = provision_autoscan(api.as_ref(), config, deployment, context.version)?;
    report_outcome(console, &report)?;
    Ok(report)
}

/// Tells the operator what provisioning did.
fn report_outcome(console: &mut Console, report: &ProvisionReport) -> SetupResult<()> {
    for scope in &report.secret_scopes {
        console.say(&t!("provision.scope_ready", scope = scope))?;
    }
    for path in &report.uploaded {
        console.say(&t!("provision.uploaded", path = path))?;
    }
    for path in &report.skipped {
        console.say(&t!("provision.skipped", path = path))?;
    }
    console.say(&t!("provision.job_created", job_id = report.job_id))?;
    console.say(&t!("provision.done"))
}
