// crates/hldbx-cli/src/validate.rs
// ============================================================================
// Module: Validators
// Description: Existence checks against the workspace and format checks.
// Purpose: Decide whether a collected value may be kept.
// Dependencies: cron, hldbx-config, hldbx-workspace, thiserror
// ============================================================================

//! ## Overview
//! Existence checks fold "not found" into `Ok(false)` and treat every other
//! workspace failure as fatal. Format checks return a [`ValidationError`]
//! that the caller reports before asking again.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::str::FromStr;

use cron::Schedule;
use hldbx_config::CatalogSchema;
use hldbx_workspace::WorkspaceApi;
use thiserror::Error;

use crate::error::SetupError;
use crate::error::SetupResult;
use crate::t;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum secret key length accepted by the workspace secret store.
pub const MAX_SECRET_NAME_LENGTH: usize = 128;

/// Required workspace URL scheme prefix.
const HOST_SCHEME: &str = "https://";

/// Recognized workspace domain suffixes.
const HOST_SUFFIXES: [&str; 2] = ["azuredatabricks.net", "databricks.com"];

/// Position of the day-of-month field in a quartz expression.
const DAY_OF_MONTH_FIELD: usize = 3;

/// Position of the day-of-week field in a quartz expression.
const DAY_OF_WEEK_FIELD: usize = 5;

/// Quartz weekday names, Sunday first.
const WEEKDAY_NAMES: [&str; 7] = ["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT"];

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Re-promptable format failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Workspace URL does not use HTTPS.
    #[error("workspace url must start with https://")]
    HostScheme,
    /// Workspace URL is not on a recognized domain.
    #[error("workspace url must end with azuredatabricks.net or databricks.com")]
    HostDomain,
    /// Schedule expression failed to parse.
    #[error("invalid quartz cron expression: {0}")]
    Cron(String),
    /// Concurrency limit is not a positive integer.
    #[error("max active scan jobs must be a positive integer: {0}")]
    MaxJobs(String),
    /// Secret name is empty.
    #[error("secret name is empty")]
    SecretNameEmpty,
    /// Secret name is longer than [`MAX_SECRET_NAME_LENGTH`].
    #[error("secret name exceeds {MAX_SECRET_NAME_LENGTH} characters")]
    SecretNameTooLong,
    /// Secret name uses characters outside `[A-Za-z0-9_.-]`.
    #[error("secret name contains invalid characters")]
    SecretNameCharset,
}

impl ValidationError {
    /// Returns the operator-facing message for this failure.
    #[must_use]
    pub fn operator_message(&self) -> String {
        match self {
            Self::HostScheme => t!("host.invalid_scheme"),
            Self::HostDomain => t!("host.invalid_domain"),
            Self::Cron(_) => t!("cron.invalid", error = self),
            Self::MaxJobs(value) => t!("max_jobs.invalid", value = value),
            Self::SecretNameEmpty => t!("secret_name.empty"),
            Self::SecretNameTooLong => t!("secret_name.too_long", max = MAX_SECRET_NAME_LENGTH),
            Self::SecretNameCharset => t!("secret_name.invalid_chars"),
        }
    }
}

// ============================================================================
// SECTION: Workspace Existence Checks
// ============================================================================

/// Returns whether `schema` exists in the catalog service.
///
/// # Errors
///
/// Returns [`SetupError::Workspace`] for failures other than "not found".
pub fn schema_exists(api: &dyn WorkspaceApi, schema: &CatalogSchema) -> SetupResult<bool> {
    match api.get_schema(&schema.full_name()) {
        Ok(()) => Ok(true),
        Err(err) if err.is_not_found() => Ok(false),
        Err(err) => Err(SetupError::workspace("schema", err)),
    }
}

/// Returns whether the cluster `cluster_id` exists.
///
/// # Errors
///
/// Returns [`SetupError::Workspace`] for failures other than "not found".
pub fn cluster_exists(api: &dyn WorkspaceApi, cluster_id: &str) -> SetupResult<bool> {
    match api.get_cluster(cluster_id) {
        Ok(()) => Ok(true),
        Err(err) if err.is_not_found() => Ok(false),
        Err(err) => Err(SetupError::workspace("cluster", err)),
    }
}

/// Returns whether a service principal matches `name` by display name or
/// application ID, ignoring case.
///
/// # Errors
///
/// Returns [`SetupError::Workspace`] when the listing fails.
pub fn service_principal_exists(api: &dyn WorkspaceApi, name: &str) -> SetupResult<bool> {
    let principals =
        api.list_service_principals().map_err(|err| SetupError::workspace("service principals", err))?;
    Ok(principals.iter().any(|principal| principal.matches(name)))
}

// ============================================================================
// SECTION: Format Checks
// ============================================================================

/// Validates a quartz cron expression (seconds field first, optional year).
///
/// # Errors
///
/// Returns [`ValidationError::Cron`] when the expression does not parse.
pub fn validate_cron_expression(expression: &str) -> Result<(), ValidationError> {
    let normalized = normalize_quartz(expression)?;
    Schedule::from_str(&normalized)
        .map(|_| ())
        .map_err(|err| ValidationError::Cron(err.to_string()))
}

/// Rewrites quartz-only day syntax into the grammar [`Schedule`] parses.
///
/// `?` and the calendar specials (`L`, `W`, `#`) constrain nothing the
/// remaining fields are checked for, so each becomes `*` once its own shape
/// is validated.
fn normalize_quartz(expression: &str) -> Result<String, ValidationError> {
    let mut fields = Vec::new();
    for (index, field) in expression.split_whitespace().enumerate() {
        let upper = field.to_ascii_uppercase();
        let rewritten = match index {
            DAY_OF_MONTH_FIELD if upper.contains(['L', 'W']) => {
                check_day_of_month_special(&upper)?;
                "*".to_string()
            }
            DAY_OF_WEEK_FIELD if upper.ends_with('L') || upper.contains('#') => {
                check_day_of_week_special(&upper)?;
                "*".to_string()
            }
            _ => field.replace('?', "*"),
        };
        fields.push(rewritten);
    }
    Ok(fields.join(" "))
}

/// Accepts `L`, `LW`, `L-n`, and `nW` in the day-of-month field.
fn check_day_of_month_special(field: &str) -> Result<(), ValidationError> {
    let valid = match field {
        "L" | "LW" => true,
        _ => field.strip_prefix("L-").map_or_else(
            || field.strip_suffix('W').is_some_and(|day| in_range(day, 1, 31)),
            |offset| in_range(offset, 1, 30),
        ),
    };
    if valid {
        Ok(())
    } else {
        Err(ValidationError::Cron(format!("unsupported day-of-month value {field}")))
    }
}

/// Accepts `L`, `nL`, and `n#k` in the day-of-week field.
fn check_day_of_week_special(field: &str) -> Result<(), ValidationError> {
    let valid = if field == "L" {
        true
    } else if let Some((day, nth)) = field.split_once('#') {
        is_weekday(day) && in_range(nth, 1, 5)
    } else {
        field.strip_suffix('L').is_some_and(is_weekday)
    };
    if valid {
        Ok(())
    } else {
        Err(ValidationError::Cron(format!("unsupported day-of-week value {field}")))
    }
}

/// Returns true for a quartz weekday number (1 is Sunday) or name.
fn is_weekday(value: &str) -> bool {
    in_range(value, 1, 7) || WEEKDAY_NAMES.contains(&value)
}

/// Returns true when `value` is an integer within `min..=max`.
fn in_range(value: &str, min: u8, max: u8) -> bool {
    value.parse::<u8>().is_ok_and(|number| (min..=max).contains(&number))
}

/// Validates the string-encoded concurrency limit.
///
/// # Errors
///
/// Returns [`ValidationError::MaxJobs`] unless `value` is an integer >= 1.
pub fn validate_max_active_scan_jobs(value: &str) -> Result<(), ValidationError> {
    match value.trim().parse::<u32>() {
        Ok(count) if count > 0 => Ok(()),
        _ => Err(ValidationError::MaxJobs(value.to_string())),
    }
}

/// Validates a workspace secret key name.
///
/// # Errors
///
/// Returns the [`ValidationError`] describing the first violated rule.
pub fn validate_secret_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::SecretNameEmpty);
    }
    if name.len() > MAX_SECRET_NAME_LENGTH {
        return Err(ValidationError::SecretNameTooLong);
    }
    if !name.bytes().all(|byte| byte.is_ascii_alphanumeric() || matches!(byte, b'_' | b'.' | b'-')) {
        return Err(ValidationError::SecretNameCharset);
    }
    Ok(())
}

/// Returns true when `name` is a usable secret key name.
#[must_use]
pub fn secret_name_valid(name: &str) -> bool {
    validate_secret_name(name).is_ok()
}

/// Normalizes an operator-supplied workspace URL.
///
/// The trailing slash is dropped before the domain check.
///
/// # Errors
///
/// Returns [`ValidationError::HostScheme`] or [`ValidationError::HostDomain`].
pub fn parse_workspace_host(raw: &str) -> Result<String, ValidationError> {
    let host = raw.trim();
    if !host.starts_with(HOST_SCHEME) {
        return Err(ValidationError::HostScheme);
    }
    let host = host.strip_suffix('/').unwrap_or(host);
    if !HOST_SUFFIXES.iter().any(|suffix| host.ends_with(suffix)) {
        return Err(ValidationError::HostDomain);
    }
    Ok(host.to_string())
}
