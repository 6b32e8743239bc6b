// crates/hldbx-workspace/src/api.rs
// ============================================================================
// Module: Workspace API Contract
// Description: Backend-agnostic workspace interface and payload types.
// Purpose: Define the calls autoscan makes against a workspace session.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! [`WorkspaceConnector`] authenticates a host/credential pair and yields a
//! [`WorkspaceApi`] session. Existence lookups return `Ok(())` when the
//! resource exists and [`WorkspaceError::NotFound`] when it does not; callers
//! decide how every other error is handled.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Workspace API errors.
///
/// # Invariants
/// - [`WorkspaceError::NotFound`] and [`WorkspaceError::AlreadyExists`] are
///   the only variants callers may treat as expected outcomes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WorkspaceError {
    /// The referenced resource does not exist.
    #[error("workspace resource not found: {0}")]
    NotFound(String),
    /// The resource being created already exists.
    #[error("workspace resource already exists: {0}")]
    AlreadyExists(String),
    /// The credential was rejected.
    #[error("workspace rejected credentials (http {status}): {message}")]
    Unauthorized {
        /// HTTP status code.
        status: u16,
        /// Server-provided message.
        message: String,
    },
    /// Any other non-success API response.
    #[error("workspace api error (http {status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Server-provided error code, when present.
        error_code: Option<String>,
        /// Server-provided message.
        message: String,
    },
    /// The request could not be built or sent.
    #[error("workspace request failed: {0}")]
    Transport(String),
    /// The response body did not match the expected shape.
    #[error("invalid workspace response: {0}")]
    InvalidResponse(String),
}

impl WorkspaceError {
    /// Returns true for "resource does not exist" outcomes.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Returns true for "resource already exists" outcomes.
    #[must_use]
    pub const fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists(_))
    }
}

/// Error body returned by workspace REST endpoints.
#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
    /// Machine-readable error code.
    #[serde(default)]
    error_code: Option<String>,
    /// Human-readable message.
    #[serde(default)]
    message: Option<String>,
    /// SCIM endpoints report their message here instead.
    #[serde(default)]
    detail: Option<String>,
}

/// Classifies a non-success workspace response.
#[must_use]
pub fn classify_api_error(status: u16, body: &str) -> WorkspaceError {
    let parsed: ApiErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = parsed
        .message
        .or(parsed.detail)
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() { format!("http status {status}") } else { trimmed.to_string() }
        });
    let code = parsed.error_code.as_deref().unwrap_or_default();
    let lowered = message.to_ascii_lowercase();
    if status == 404
        || code == "RESOURCE_DOES_NOT_EXIST"
        || code == "NOT_FOUND"
        || lowered.contains("does not exist")
    {
        return WorkspaceError::NotFound(message);
    }
    if code == "RESOURCE_ALREADY_EXISTS" || lowered.contains("already exists") {
        return WorkspaceError::AlreadyExists(message);
    }
    if status == 401 || status == 403 {
        return WorkspaceError::Unauthorized {
            status,
            message,
        };
    }
    WorkspaceError::Api {
        status,
        error_code: parsed.error_code,
        message,
    }
}

// ============================================================================
// SECTION: Payload Types
// ============================================================================

/// Service principal entry from the identity listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ServicePrincipal {
    /// Identity ID.
    #[serde(default)]
    pub id: String,
    /// Display name.
    #[serde(rename = "displayName", default)]
    pub display_name: String,
    /// Application ID used by `run_as`.
    #[serde(rename = "applicationId", default)]
    pub application_id: String,
}

impl ServicePrincipal {
    /// Returns true when `name` matches the display name or application ID,
    /// ignoring case.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        let name = name.trim();
        !name.is_empty()
            && (self.display_name.eq_ignore_ascii_case(name)
                || self.application_id.eq_ignore_ascii_case(name))
    }
}

/// Workspace file import request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportRequest {
    /// Destination workspace path.
    pub path: String,
    /// Base64-encoded file content.
    pub content: String,
    /// Import format; `AUTO` lets the workspace detect notebooks vs. files.
    pub format: String,
    /// Source language.
    pub language: String,
}

/// Jobs API `create` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobSettings {
    /// Job name.
    pub name: String,
    /// Job tasks.
    pub tasks: Vec<JobTask>,
    /// Job-level parameters.
    pub parameters: Vec<JobParameter>,
    /// Recurring schedule.
    pub schedule: CronSchedule,
    /// Identity the job runs as; the creator when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_as: Option<JobRunAs>,
}

/// Single job task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobTask {
    /// Task key, unique within the job.
    pub task_key: String,
    /// Task description.
    pub description: String,
    /// Existing cluster that runs the task.
    pub existing_cluster_id: String,
    /// Task timeout in seconds; zero disables it.
    pub timeout_seconds: u32,
    /// Notebook to run.
    pub notebook_task: NotebookTask,
}

/// Notebook task definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotebookTask {
    /// Workspace path of the notebook.
    pub notebook_path: String,
    /// Widget parameters passed to the notebook.
    pub base_parameters: BTreeMap<String, String>,
}

/// Job parameter definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobParameter {
    /// Parameter name.
    pub name: String,
    /// Default value.
    pub default: String,
}

/// Quartz cron schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CronSchedule {
    /// Quartz cron expression.
    pub quartz_cron_expression: String,
    /// Java timezone ID.
    pub timezone_id: String,
}

/// Run-as identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobRunAs {
    /// Service principal application ID.
    pub service_principal_name: String,
}

// ============================================================================
// SECTION: Interfaces
// ============================================================================

/// Authenticated workspace session.
pub trait WorkspaceApi {
    /// Returns the workspace host this session is bound to.
    fn host(&self) -> &str;

    /// Looks up a cluster by ID.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::NotFound`] when the cluster does not exist.
    fn get_cluster(&self, cluster_id: &str) -> Result<(), WorkspaceError>;

    /// Looks up a schema by its dotted `catalog.schema` name.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::NotFound`] when the schema does not exist.
    fn get_schema(&self, full_name: &str) -> Result<(), WorkspaceError>;

    /// Lists service principals visible to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError`] when the listing fails.
    fn list_service_principals(&self) -> Result<Vec<ServicePrincipal>, WorkspaceError>;

    /// Creates a secret scope.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::AlreadyExists`] when the scope exists.
    fn create_secret_scope(&self, scope: &str) -> Result<(), WorkspaceError>;

    /// Stores a string secret.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError`] when the secret cannot be written.
    fn put_secret(&self, scope: &str, key: &str, value: &str) -> Result<(), WorkspaceError>;

    /// Reads a secret back, returning its base64-encoded value.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError`] when the secret cannot be read.
    fn get_secret(&self, scope: &str, key: &str) -> Result<String, WorkspaceError>;

    /// Creates a workspace directory and any missing parents.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError`] when the directory cannot be created.
    fn mkdirs(&self, path: &str) -> Result<(), WorkspaceError>;

    /// Imports a file into the workspace.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::AlreadyExists`] when the path is taken.
    fn import_file(&self, request: &ImportRequest) -> Result<(), WorkspaceError>;

    /// Creates a job and returns its ID.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError`] when the job cannot be created.
    fn create_job(&self, settings: &JobSettings) -> Result<i64, WorkspaceError>;
}

/// Opens authenticated workspace sessions.
pub trait WorkspaceConnector {
    /// Authenticates `token` against `host` and returns a session.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError`] when the host is malformed or the identity
    /// check fails.
    fn connect(&self, host: &str, token: &str) -> Result<Box<dyn WorkspaceApi>, WorkspaceError>;
}
