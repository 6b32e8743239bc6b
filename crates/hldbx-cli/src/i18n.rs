// crates/hldbx-cli/src/i18n.rs
// ============================================================================
// Module: CLI Message Catalog
// Description: Message catalog and translation utilities for operator output.
// Purpose: Centralize every prompt, confirmation, and failure message.
// Dependencies: Standard library collections.
// ============================================================================

//! ## Overview
//! Every string the operator sees (prompt labels, confirmations, validation
//! failures, fatal errors) is looked up here by key and rendered through the
//! [`t!`](crate::t) macro. Diagnostics for developers go through `tracing`
//! instead and are not catalogued.
//!
//! ## Invariants
//! - The catalog is initialized once and read-only thereafter.
//! - Missing keys fall back to the key itself.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// SECTION: Types
// ============================================================================

/// A formatted message argument captured by the [`macro@crate::t`] macro.
///
/// # Invariants
/// - `key` matches a placeholder name without braces (for example, `host`).
#[derive(Clone)]
pub struct MessageArg {
    /// The placeholder name used in message templates.
    pub key: &'static str,
    /// The formatted value substituted for this placeholder.
    pub value: String,
}

impl MessageArg {
    /// Constructs a new [`MessageArg`] from a key and displayable value.
    pub fn new(key: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// English catalog entries.
const CATALOG_EN: &[(&str, &str)] = &[
    ("main.about", "Set up automated HiddenLayer model scanning in Databricks."),
    ("main.version", "hldbx version: {version}"),
    ("command.autoscan.about", "Sets up automated model scanning in Databricks"),
    ("command.version.about", "Prints the hldbx version"),
    ("command.unknown", "Unknown command: {name}"),
    ("output.stream.stdout", "stdout"),
    ("output.stream.stderr", "stderr"),
    ("output.stream.unknown", "output"),
    ("output.write_failed", "Failed to write to {stream}: {error}"),
    ("logging.invalid_level", "Invalid log level {value}: {error}"),
    ("logging.init_failed", "Failed to initialize logging: {error}"),
    ("config.load_failed", "Error reading the configuration file: {error}"),
    ("config.defaults", "No configuration file found, starting from an empty configuration"),
    ("autoscan.failed", "Autoscan setup failed: {error}"),
    ("prompt.plain", "Enter {label}: "),
    ("prompt.masked", "Enter {label} [will be hidden for security]: "),
    ("prompt.read_failed", "Error reading {label}: {error}. Please try again."),
    ("prompt.optional_skipped", "No input provided for optional parameter. Continuing..."),
    (
        "label.workspace_host",
        "Databricks workspace URL [e.g., https://adb-1234567890123456.7.azuredatabricks.net]",
    ),
    ("label.token_cache_path", "the full path to your Databricks token cache (default: {default})"),
    (
        "label.personal_token",
        "Databricks personal access token, or sign in with the Databricks CLI and try again",
    ),
    ("label.cluster_id", "Databricks cluster ID"),
    ("label.run_as", "service principal application ID to run the job as (optional)"),
    ("label.max_jobs", "the max number of concurrent scan jobs (default: {default})"),
    (
        "label.polling_schedule",
        "desired polling interval for the scan job in quartz cron format (default: {default})",
    ),
    ("label.catalog", "catalog in Databricks Unity Catalog"),
    ("label.schema", "schema with models to scan, within the catalog"),
    ("label.region", "region of the HiddenLayer API {regions} (default: {default})"),
    ("label.api_url", "HiddenLayer API URL (default: {default})"),
    ("label.auth_url", "HiddenLayer Auth URL (default: {default})"),
    ("label.console_url", "HiddenLayer Console URL (default: {default})"),
    ("label.client_id", "HiddenLayer client ID"),
    ("label.client_secret", "HiddenLayer client secret"),
    (
        "label.secret_name",
        "name of the Databricks secret to create (to store HiddenLayer API credentials)",
    ),
    ("host.invalid_scheme", "Databricks workspace URL must start with 'https://'. Please try again."),
    (
        "host.invalid_domain",
        "Databricks workspace URL must end with 'azuredatabricks.net' or 'databricks.com'. Please \
         try again.",
    ),
    ("token.cache_used", "Using OAuth token from {path}"),
    ("token.cache_missing", "No OAuth token found, falling back to a personal access token."),
    ("credentials.required", "Databricks host and token are required. Please try again."),
    ("auth.ok", "Successfully authenticated to Databricks at {host}"),
    ("auth.failed", "Error authenticating to Databricks: {error}. Please try again."),
    ("cluster.confirmed", "Confirming cluster with ID={cluster} found in Databricks"),
    ("cluster.not_found", "Cluster {cluster} not found in Databricks. Please try again."),
    ("cluster.stale", "Cluster not found in Databricks, please provide a valid cluster ID"),
    ("run_as.checking", "Checking service principal {name} in Databricks..."),
    ("run_as.confirmed", "Confirming service principal '{name}' found in Databricks"),
    ("run_as.not_found", "Service principal {name} not found in Databricks. Please try again."),
    (
        "max_jobs.invalid",
        "Max concurrent scan jobs must be a positive integer, got '{value}'. Please try again.",
    ),
    (
        "cron.help",
        "Quartz expression format: \
         https://www.quartz-scheduler.org/documentation/quartz-2.3.0/tutorials/crontrigger.html",
    ),
    ("cron.invalid", "Error validating cron expression, please try again: {error}"),
    ("schema.add", "Add a new schema to monitor, or press Enter to finish"),
    ("schema.confirmed", "Confirming schema '{schema}' in catalog '{catalog}' found in Unity Catalog"),
    (
        "schema.not_found",
        "Schema {schema} in catalog {catalog} not found in Unity Catalog. Please try again.",
    ),
    ("schema.replace", "Enter a replacement for {catalog}.{schema}, or press Enter to drop it"),
    ("schema.dropped", "Dropping {catalog}.{schema} from the monitored schemas"),
    ("region.invalid", "Invalid region. Please try again."),
    ("secret_name.empty", "No secret key name provided. Please try again."),
    ("secret_name.too_long", "Secret key name must be at most {max} characters. Please try again."),
    (
        "secret_name.invalid_chars",
        "Secret key name may only use letters, digits, '_', '-' and '.'. Please try again.",
    ),
    ("scanner.self_hosted", "Using self-hosted scanner at {url}; no HiddenLayer credentials needed"),
    ("scanner.auth_ok", "Successfully authenticated to HiddenLayer"),
    ("scanner.url_invalid", "Invalid HiddenLayer API URL, please try again: {error}"),
    (
        "provision.run_as_default",
        "No run_as principal provided, the job will run as the user who created it",
    ),
    ("provision.scope_ready", "Stored HiddenLayer credentials in secret scope {scope}"),
    ("provision.uploaded", "Uploaded {path}"),
    ("provision.skipped", "File {path} already exists in workspace, skipping upload"),
    ("provision.job_created", "Scheduled monitoring job with ID: {job_id}"),
    ("provision.done", "Finished setting up automated HiddenLayer model scanning"),
];

/// Returns the message catalog.
pub(crate) fn catalog() -> &'static HashMap<&'static str, &'static str> {
    static CATALOG: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    CATALOG.get_or_init(|| CATALOG_EN.iter().copied().collect())
}

/// Returns the raw catalog entries in declaration order.
#[cfg(test)]
pub(crate) const fn catalog_entries() -> &'static [(&'static str, &'static str)] {
    CATALOG_EN
}

// ============================================================================
// SECTION: Translation
// ============================================================================

/// Renders `key` while substituting `args`.
#[must_use]
pub fn translate(key: &str, args: Vec<MessageArg>) -> String {
    let template = catalog().get(key).copied().unwrap_or(key);
    if args.is_empty() {
        return template.to_string();
    }

    let mut result = template.to_string();
    for arg in args {
        let placeholder = format!("{{{}}}", arg.key);
        result = result.replace(&placeholder, &arg.value);
    }
    result
}

// ============================================================================
// SECTION: Macro
// ============================================================================

/// Formats a catalog message from a key and named arguments.
///
/// # Arguments
///
/// - `$key` must match a catalog entry.
/// - Named arguments are substituted into `{placeholder}` positions.
#[macro_export]
macro_rules! t {
    ($key:literal $(, $name:ident = $value:expr )* $(,)?) => {{
        let args = ::std::vec![
            $(
                $crate::i18n::MessageArg::new(stringify!($name), $value.to_string()),
            )*
        ];
        $crate::i18n::translate($key, args)
    }};
}
