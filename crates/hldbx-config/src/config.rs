// crates/hldbx-config/src/config.rs
// ============================================================================
// Module: Autoscan Configuration
// Description: Configuration record and loader for the autoscan workflow.
// Purpose: Provide bounded, fail-closed parsing of the persisted config file.
// Dependencies: dirs, serde, serde_yaml, toml
// ============================================================================

//! ## Overview
//! The configuration record is created empty or pre-populated from a
//! persisted file at process start. Every setup stage mutates only the fields
//! it owns; the record is never written back to disk.
//!
//! A missing file is reported as [`ConfigError::NotFound`] so callers can
//! start from an empty record. Any other load failure is fatal.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::endpoints::EndpointError;
use crate::endpoints::ScannerDeployment;
use crate::endpoints::classify_api_url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Directory under the home directory holding the persisted config file.
const DEFAULT_CONFIG_DIR: &str = ".hl";
/// Persisted config file name when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "hldbx.yaml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "HLDBX_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum length of any single string field in the record.
pub(crate) const MAX_FIELD_LENGTH: usize = 4096;
/// Maximum number of catalog/schema pairs accepted from the file.
pub(crate) const MAX_CATALOG_SCHEMAS: usize = 1024;
/// Prompt default for the concurrent scan job limit.
pub const DEFAULT_MAX_ACTIVE_SCAN_JOBS: &str = "10";
/// Prompt default for the polling schedule (every 12 hours).
pub const DEFAULT_POLLING_SCHEDULE: &str = "0 0 */12 * * ?";

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// A catalog/schema pair locating registered models to monitor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogSchema {
    /// Unity Catalog catalog name.
    #[serde(rename = "dbx_catalog", default)]
    pub catalog: String,
    /// Schema name within the catalog.
    #[serde(rename = "dbx_schema", default)]
    pub schema: String,
}

impl CatalogSchema {
    /// Creates a new catalog/schema pair.
    #[must_use]
    pub fn new(catalog: impl Into<String>, schema: impl Into<String>) -> Self {
        Self {
            catalog: catalog.into(),
            schema: schema.into(),
        }
    }

    /// Returns the dotted `catalog.schema` name used by the catalog service.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.catalog, self.schema)
    }
}

/// Autoscan configuration record.
///
/// # Invariants
/// - `workspace_host` and `workspace_token` are both empty or both set before
///   any authenticated call is attempted.
/// - `catalog_schemas` is non-empty once resource configuration succeeds.
/// - Scanner credentials are only required when `scanner_api_url` points at
///   the managed SaaS domain.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AutoscanConfig {
    /// Workspace URL, for example `https://adb-123.4.azuredatabricks.net`.
    #[serde(rename = "dbx_host", default)]
    pub workspace_host: String,
    /// Workspace bearer credential or a path to a token-cache file.
    #[serde(rename = "dbx_token", default)]
    pub workspace_token: String,
    /// Cluster that runs the monitoring job.
    #[serde(rename = "dbx_cluster_id", default)]
    pub cluster_id: String,
    /// Optional service principal the job runs as.
    #[serde(rename = "dbx_run_as", default)]
    pub run_as: String,
    /// Catalog/schema pairs to monitor.
    #[serde(rename = "dbx_schemas", default)]
    pub catalog_schemas: Vec<CatalogSchema>,
    /// Maximum concurrent scan jobs, string-encoded.
    #[serde(rename = "dbx_max_active_scan_jobs", default)]
    pub max_active_scan_jobs: String,
    /// Quartz cron expression for the polling job.
    #[serde(rename = "dbx_polling_quartz_cron", default)]
    pub polling_schedule: String,
    /// Workspace secret key that stores the scanner credentials.
    #[serde(rename = "hl_api_key_name", default)]
    pub scanner_secret_name: String,
    /// Scanner OAuth client ID.
    #[serde(rename = "hl_client_id", default)]
    pub scanner_client_id: String,
    /// Scanner OAuth client secret.
    #[serde(rename = "hl_client_secret", default)]
    pub scanner_client_secret: String,
    /// Scanner API base URL.
    #[serde(rename = "hl_api_url", default)]
    pub scanner_api_url: String,
    /// Scanner OAuth base URL.
    #[serde(rename = "hl_auth_url", default)]
    pub scanner_auth_url: String,
    /// Scanner console base URL.
    #[serde(rename = "hl_console_url", default)]
    pub scanner_console_url: String,
}

impl AutoscanConfig {
    /// Loads the persisted configuration using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] when no file exists at the resolved
    /// path, and another [`ConfigError`] variant when the file cannot be read,
    /// parsed, or validated.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        Self::load_from(&resolved)
    }

    /// Loads configuration from an explicit path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        validate_path(path)?;
        let bytes = fs::read(path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => ConfigError::NotFound(path.display().to_string()),
            _ => ConfigError::Io(err.to_string()),
        })?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let config = parse_config(path, content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validates field shapes that a persisted file can get wrong.
    ///
    /// Existence of referenced workspace resources is checked later, during
    /// interactive setup, not here.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a field is malformed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("dbx_host", &self.workspace_host),
            ("dbx_token", &self.workspace_token),
            ("dbx_cluster_id", &self.cluster_id),
            ("dbx_run_as", &self.run_as),
            ("dbx_max_active_scan_jobs", &self.max_active_scan_jobs),
            ("dbx_polling_quartz_cron", &self.polling_schedule),
            ("hl_api_key_name", &self.scanner_secret_name),
            ("hl_client_id", &self.scanner_client_id),
            ("hl_client_secret", &self.scanner_client_secret),
            ("hl_api_url", &self.scanner_api_url),
            ("hl_auth_url", &self.scanner_auth_url),
            ("hl_console_url", &self.scanner_console_url),
        ];
        for (name, value) in fields {
            if value.len() > MAX_FIELD_LENGTH {
                return Err(ConfigError::Invalid(format!("{name} exceeds max length")));
            }
        }
        if self.catalog_schemas.len() > MAX_CATALOG_SCHEMAS {
            return Err(ConfigError::Invalid("dbx_schemas has too many entries".to_string()));
        }
        for (index, entry) in self.catalog_schemas.iter().enumerate() {
            if entry.catalog.trim().is_empty() || entry.schema.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "dbx_schemas[{index}] requires dbx_catalog and dbx_schema"
                )));
            }
        }
        Ok(())
    }

    /// Returns true when both the workspace host and credential are set.
    #[must_use]
    pub fn has_workspace_credentials(&self) -> bool {
        !self.workspace_host.is_empty() && !self.workspace_token.is_empty()
    }

    /// Clears the workspace host and credential together.
    pub fn clear_workspace_credentials(&mut self) {
        self.workspace_host.clear();
        self.workspace_token.clear();
    }

    /// Classifies the configured scanner API URL.
    ///
    /// # Errors
    ///
    /// Returns [`EndpointError`] when the URL cannot be parsed or has no host.
    pub fn scanner_deployment(&self) -> Result<ScannerDeployment, EndpointError> {
        classify_api_url(&self.scanner_api_url)
    }
}

impl fmt::Debug for AutoscanConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutoscanConfig")
            .field("workspace_host", &self.workspace_host)
            .field("workspace_token", &redacted(&self.workspace_token))
            .field("cluster_id", &self.cluster_id)
            .field("run_as", &self.run_as)
            .field("catalog_schemas", &self.catalog_schemas)
            .field("max_active_scan_jobs", &self.max_active_scan_jobs)
            .field("polling_schedule", &self.polling_schedule)
            .field("scanner_secret_name", &self.scanner_secret_name)
            .field("scanner_client_id", &self.scanner_client_id)
            .field("scanner_client_secret", &redacted(&self.scanner_client_secret))
            .field("scanner_api_url", &self.scanner_api_url)
            .field("scanner_auth_url", &self.scanner_auth_url)
            .field("scanner_console_url", &self.scanner_console_url)
            .finish()
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading errors.
///
/// # Invariants
/// - Only [`ConfigError::NotFound`] is recoverable; every other variant is fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No configuration file exists at the resolved path.
    #[error("config file not found: {0}")]
    NotFound(String),
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// YAML or TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Returns true when the error only signals an absent file.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the default persisted config path under the home directory.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(DEFAULT_CONFIG_DIR).join(DEFAULT_CONFIG_NAME))
}

/// Resolves the config path from CLI, environment, or home-directory defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    default_config_path()
        .ok_or_else(|| ConfigError::NotFound("home directory is unavailable".to_string()))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Parses config content, picking TOML or YAML from the file extension.
fn parse_config(path: &Path, content: &str) -> Result<AutoscanConfig, ConfigError> {
    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    if is_toml {
        return toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()));
    }
    if content.trim().is_empty() {
        return Ok(AutoscanConfig::default());
    }
    serde_yaml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))
}

/// Masks a secret for diagnostic output.
const fn redacted(value: &str) -> &'static str {
    if value.is_empty() { "<unset>" } else { "<redacted>" }
}
