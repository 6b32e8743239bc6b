// crates/hldbx-workspace/src/provision.rs
// ============================================================================
// Module: Autoscan Provisioning
// Description: Stores scanner credentials, uploads notebooks, schedules jobs.
// Purpose: Turn a completed autoscan record into workspace resources.
// Dependencies: base64, hldbx-config, serde, serde_json, thiserror, tracing
// ============================================================================

//! ## Overview
//! Provisioning runs once the interactive setup has produced a complete
//! record. The steps are strictly ordered and the first failure aborts:
//!
//! 1. Managed SaaS only: per monitored schema, create the secret scope
//!    `hl_scan.<catalog>.<schema>`, store `<client id>:<client secret>` under
//!    the scanner secret name, and read it back to confirm the value.
//! 2. Create `/Shared/HiddenLayer/<version>` and import the bundled notebooks.
//!    Files that already exist are left untouched.
//! 3. Create the scheduled monitor job.
//!
//! The naming conventions here are shared with the notebooks and must not
//! drift from them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use hldbx_config::AutoscanConfig;
use hldbx_config::ScannerDeployment;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::api::CronSchedule;
use crate::api::ImportRequest;
use crate::api::JobParameter;
use crate::api::JobRunAs;
use crate::api::JobSettings;
use crate::api::JobTask;
use crate::api::NotebookTask;
use crate::api::WorkspaceApi;
use crate::api::WorkspaceError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Bundled notebooks as `(file name, contents)`.
pub const NOTEBOOKS: [(&str, &[u8]); 4] = [
    ("hl_common.py", include_bytes!("../notebooks/hl_common.py")),
    ("hl_monitor_models.py", include_bytes!("../notebooks/hl_monitor_models.py")),
    ("hl_scan_model.py", include_bytes!("../notebooks/hl_scan_model.py")),
    ("hl_test.py", include_bytes!("../notebooks/hl_test.py")),
];

/// Scheduled job name.
pub const MONITOR_JOB_NAME: &str = "hl_find_new_model_versions";

/// Notebook the scheduled job runs, relative to the workspace directory.
pub const MONITOR_NOTEBOOK: &str = "hl_monitor_models";

/// Task key of the single monitor task.
const MONITOR_TASK_KEY: &str = "hl_monitor_models";

/// Monitor task description.
const MONITOR_TASK_DESCRIPTION: &str = "Poll for new model versions and scan them using HiddenLayer";

/// Notebook widget carrying the concurrency limit.
const MAX_ACTIVE_SCAN_JOBS_PARAM: &str = "MAX_ACTIVE_SCAN_JOBS";

/// Timezone for the job schedule.
const SCHEDULE_TIMEZONE: &str = "UTC";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Provisioning failures. Every variant is fatal.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// The record is missing a value provisioning depends on.
    #[error("autoscan record is missing {0}")]
    MissingField(&'static str),
    /// A workspace call failed.
    #[error("{step}: {source}")]
    Workspace {
        /// Human-readable step description.
        step: String,
        /// Underlying workspace error.
        source: WorkspaceError,
    },
    /// The stored secret read back with a different value.
    #[error("secret {key} in scope {scope} has the wrong value")]
    SecretMismatch {
        /// Secret scope.
        scope: String,
        /// Secret key.
        key: String,
    },
    /// The stored secret could not be decoded.
    #[error("failed to decode secret {key} in scope {scope}")]
    SecretDecode {
        /// Secret scope.
        scope: String,
        /// Secret key.
        key: String,
    },
    /// The schema list could not be encoded as a job parameter.
    #[error("failed to encode schema list: {0}")]
    Serialize(String),
}

/// Wraps a workspace error with the step that produced it.
fn step_error(step: String) -> impl FnOnce(WorkspaceError) -> ProvisionError {
    move |source| ProvisionError::Workspace {
        step,
        source,
    }
}

// ============================================================================
// SECTION: Report
// ============================================================================

/// What provisioning did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvisionReport {
    /// Secret scopes written and verified.
    pub secret_scopes: Vec<String>,
    /// Workspace paths imported.
    pub uploaded: Vec<String>,
    /// Workspace paths that already existed.
    pub skipped: Vec<String>,
    /// Created job ID.
    pub job_id: i64,
}

// ============================================================================
// SECTION: Naming
// ============================================================================

/// Returns the secret scope name for a monitored schema.
#[must_use]
pub fn secret_scope_name(catalog: &str, schema: &str) -> String {
    format!("hl_scan.{catalog}.{schema}")
}

/// Returns the versioned workspace directory for uploaded notebooks.
#[must_use]
pub fn workspace_directory(version: &str) -> String {
    format!("/Shared/HiddenLayer/{version}")
}

/// Schema entry as the monitor notebook reads it.
#[derive(Serialize)]
struct SchemaParam<'a> {
    /// Catalog name.
    catalog: &'a str,
    /// Schema name.
    schema: &'a str,
}

/// Builds the monitor job definition.
///
/// # Errors
///
/// Returns [`ProvisionError::Serialize`] when the schema list cannot be
/// encoded.
pub fn build_job_settings(
    config: &AutoscanConfig,
    version: &str,
) -> Result<JobSettings, ProvisionError> {
    let schemas: Vec<SchemaParam<'_>> = config
        .catalog_schemas
        .iter()
        .map(|entry| SchemaParam {
            catalog: &entry.catalog,
            schema: &entry.schema,
        })
        .collect();
    let schemas =
        serde_json::to_string(&schemas).map_err(|err| ProvisionError::Serialize(err.to_string()))?;
    let parameters = [
        ("schemas", schemas),
        ("hl_api_key_name", config.scanner_secret_name.clone()),
        ("hl_api_url", config.scanner_api_url.clone()),
        ("hl_auth_url", config.scanner_auth_url.clone()),
        ("hl_console_url", config.scanner_console_url.clone()),
    ]
    .into_iter()
    .map(|(name, default)| JobParameter {
        name: name.to_string(),
        default,
    })
    .collect();
    let base_parameters = BTreeMap::from([(
        MAX_ACTIVE_SCAN_JOBS_PARAM.to_string(),
        config.max_active_scan_jobs.clone(),
    )]);
    let run_as = (!config.run_as.is_empty()).then(|| JobRunAs {
        service_principal_name: config.run_as.clone(),
    });
    Ok(JobSettings {
        name: MONITOR_JOB_NAME.to_string(),
        tasks: vec![JobTask {
            task_key: MONITOR_TASK_KEY.to_string(),
            description: MONITOR_TASK_DESCRIPTION.to_string(),
            existing_cluster_id: config.cluster_id.clone(),
            timeout_seconds: 0,
            notebook_task: NotebookTask {
                notebook_path: format!("{}/{MONITOR_NOTEBOOK}", workspace_directory(version)),
                base_parameters,
            },
        }],
        parameters,
        schedule: CronSchedule {
            quartz_cron_expression: config.polling_schedule.clone(),
            timezone_id: SCHEDULE_TIMEZONE.to_string(),
        },
        run_as,
    })
}

// ============================================================================
// SECTION: Provisioning
// ============================================================================

/// Provisions autoscan resources in the workspace behind `api`.
///
/// # Errors
///
/// Returns [`ProvisionError`] on the first failed step.
pub fn provision_autoscan(
    api: &dyn WorkspaceApi,
    config: &AutoscanConfig,
    deployment: ScannerDeployment,
    version: &str,
) -> Result<ProvisionReport, ProvisionError> {
    check_record(config, deployment)?;
    let mut report = ProvisionReport::default();
    if deployment == ScannerDeployment::ManagedSaas {
        report.secret_scopes = store_scanner_credentials(api, config)?;
    }
    let (uploaded, skipped) = upload_notebooks(api, version)?;
    report.uploaded = uploaded;
    report.skipped = skipped;
    let settings = build_job_settings(config, version)?;
    report.job_id = api
        .create_job(&settings)
        .map_err(step_error("error scheduling model monitoring job".to_string()))?;
    info!(job_id = report.job_id, "monitor job created");
    Ok(report)
}

/// Rejects records that cannot be provisioned.
fn check_record(
    config: &AutoscanConfig,
    deployment: ScannerDeployment,
) -> Result<(), ProvisionError> {
    if config.catalog_schemas.is_empty() {
        return Err(ProvisionError::MissingField("dbx_schemas"));
    }
    if config.cluster_id.is_empty() {
        return Err(ProvisionError::MissingField("cluster_id"));
    }
    if deployment == ScannerDeployment::ManagedSaas {
        if config.scanner_client_id.is_empty() || config.scanner_client_secret.is_empty() {
            return Err(ProvisionError::MissingField("hl_client_id/hl_client_secret"));
        }
        if config.scanner_secret_name.is_empty() {
            return Err(ProvisionError::MissingField("hl_api_key_name"));
        }
    }
    Ok(())
}

/// Writes and verifies the scanner credential secret for every schema.
fn store_scanner_credentials(
    api: &dyn WorkspaceApi,
    config: &AutoscanConfig,
) -> Result<Vec<String>, ProvisionError> {
    let key = config.scanner_secret_name.as_str();
    let expected = format!("{}:{}", config.scanner_client_id, config.scanner_client_secret);
    let mut scopes = Vec::with_capacity(config.catalog_schemas.len());
    for entry in &config.catalog_schemas {
        let scope = secret_scope_name(&entry.catalog, &entry.schema);
        match api.create_secret_scope(&scope) {
            Err(err) if !err.is_already_exists() => {
                return Err(step_error(format!("error creating secret scope {scope}"))(err));
            }
            _ => {}
        }
        match api.put_secret(&scope, key, &expected) {
            Err(err) if !err.is_already_exists() => {
                return Err(step_error(format!("error creating secret {key} in scope {scope}"))(
                    err,
                ));
            }
            _ => {}
        }
        let stored = api
            .get_secret(&scope, key)
            .map_err(step_error(format!("error fetching secret {key} from scope {scope}")))?;
        let decoded = STANDARD.decode(stored.trim()).map_err(|_| ProvisionError::SecretDecode {
            scope: scope.clone(),
            key: key.to_string(),
        })?;
        if decoded != expected.as_bytes() {
            return Err(ProvisionError::SecretMismatch {
                scope,
                key: key.to_string(),
            });
        }
        info!(scope = %scope, "scanner credentials stored");
        scopes.push(scope);
    }
    Ok(scopes)
}

/// Imports the bundled notebooks, returning `(uploaded, skipped)` paths.
fn upload_notebooks(
    api: &dyn WorkspaceApi,
    version: &str,
) -> Result<(Vec<String>, Vec<String>), ProvisionError> {
    let directory = workspace_directory(version);
    api.mkdirs(&directory)
        .map_err(step_error(format!("error creating workspace directory {directory}")))?;
    let mut uploaded = Vec::new();
    let mut skipped = Vec::new();
    for (name, contents) in NOTEBOOKS {
        let path = format!("{directory}/{name}");
        let request = ImportRequest {
            path: path.clone(),
            content: STANDARD.encode(contents),
            format: "AUTO".to_string(),
            language: "PYTHON".to_string(),
        };
        match api.import_file(&request) {
            Ok(()) => {
                info!(path = %path, "notebook uploaded");
                uploaded.push(path);
            }
            Err(err) if err.is_already_exists() => {
                info!(path = %path, "notebook already present");
                skipped.push(path);
            }
            Err(err) => {
                return Err(step_error(format!("error importing {name} to {path}"))(err));
            }
        }
    }
    Ok((uploaded, skipped))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
