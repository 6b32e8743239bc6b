// crates/hldbx-cli/src/resources.rs
// ============================================================================
// Module: Resource Configurator
// Description: Cluster, run-as, concurrency, schedule, and schema selection.
// Purpose: Fill and cross-check the workspace resources autoscan depends on.
// Dependencies: hldbx-config, hldbx-workspace, tracing
// ============================================================================

//! ## Overview
//! [`configure_resources`] runs an outer loop over five stages in a fixed
//! order: cluster, run-as principal, max concurrent jobs, polling schedule,
//! and monitored schemas. Values already present in the record are
//! re-validated instead of prompted for.
//!
//! ## Invariants
//! - A persisted cluster or run-as principal that no longer exists is cleared
//!   and the whole loop restarts, so every later stage sees the new context.
//! - Replacing or dropping a persisted schema also restarts the loop; the
//!   repaired list is re-validated on the next pass.
//! - On success the cluster exists and at least one schema is monitored.
//! - Declining to name a cluster, or ending with no valid schema, is fatal.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::mem;

use hldbx_config::AutoscanConfig;
use hldbx_config::CatalogSchema;
use hldbx_config::DEFAULT_MAX_ACTIVE_SCAN_JOBS;
use hldbx_config::DEFAULT_POLLING_SCHEDULE;
use hldbx_workspace::WorkspaceApi;
use tracing::info;

use crate::error::SetupError;
use crate::error::SetupResult;
use crate::prompt::Console;
use crate::prompt::Prompt;
use crate::t;
use crate::validate::cluster_exists;
use crate::validate::schema_exists;
use crate::validate::service_principal_exists;
use crate::validate::validate_cron_expression;
use crate::validate::validate_max_active_scan_jobs;

// ============================================================================
// SECTION: Configurator
// ============================================================================

/// Fills and validates the workspace resource fields of `config`.
///
/// # Errors
///
/// Returns [`SetupError::NoCluster`] or [`SetupError::NoSchemas`] when the
/// operator leaves a required resource empty, and propagates fatal workspace
/// and console errors.
pub fn configure_resources(
    console: &mut Console,
    config: &mut AutoscanConfig,
    api: &dyn WorkspaceApi,
) -> SetupResult<()> {
    loop {
        if config.cluster_id.is_empty() {
            config.cluster_id = retrieve_cluster(console, api)?.ok_or(SetupError::NoCluster)?;
        } else if !confirm_cluster(console, api, &config.cluster_id)? {
            console.say(&t!("cluster.stale"))?;
            config.cluster_id.clear();
            continue;
        }

        if config.run_as.is_empty() {
            config.run_as = ask_run_as(console, api)?;
        } else if service_principal_exists(api, &config.run_as)? {
            console.say(&t!("run_as.confirmed", name = config.run_as))?;
        } else {
            console.say(&t!("run_as.not_found", name = config.run_as))?;
            config.run_as.clear();
            continue;
        }

        configure_max_active_scan_jobs(console, config)?;
        configure_polling_schedule(console, config)?;

        let repaired = if config.catalog_schemas.is_empty() {
            config.catalog_schemas = collect_schemas(console, api)?;
            false
        } else {
            let persisted = mem::take(&mut config.catalog_schemas);
            let (schemas, repaired) = repair_schemas(console, api, persisted)?;
            config.catalog_schemas = schemas;
            repaired
        };
        if config.catalog_schemas.is_empty() {
            return Err(SetupError::NoSchemas);
        }
        if repaired {
            continue;
        }
        info!(
            cluster = %config.cluster_id,
            schemas = config.catalog_schemas.len(),
            "workspace resources configured"
        );
        return Ok(());
    }
}

// ============================================================================
// SECTION: Cluster
// ============================================================================

/// Checks a cluster and tells the operator the outcome.
fn confirm_cluster(
    console: &mut Console,
    api: &dyn WorkspaceApi,
    cluster_id: &str,
) -> SetupResult<bool> {
    if cluster_exists(api, cluster_id)? {
        console.say(&t!("cluster.confirmed", cluster = cluster_id))?;
        Ok(true)
    } else {
        console.say(&t!("cluster.not_found", cluster = cluster_id))?;
        Ok(false)
    }
}

/// Prompts for a cluster until one exists; `None` when the operator exits.
///
/// # Errors
///
/// Propagates fatal workspace and console errors.
pub fn retrieve_cluster(
    console: &mut Console,
    api: &dyn WorkspaceApi,
) -> SetupResult<Option<String>> {
    let prompt = Prompt::new(t!("label.cluster_id")).finish_on_blank();
    loop {
        let cluster_id = console.ask(&prompt)?;
        if cluster_id.is_empty() {
            return Ok(None);
        }
        if confirm_cluster(console, api, &cluster_id)? {
            return Ok(Some(cluster_id));
        }
    }
}

// ============================================================================
// SECTION: Run-As Principal
// ============================================================================

/// Prompts for an optional run-as principal until it exists or is skipped.
fn ask_run_as(console: &mut Console, api: &dyn WorkspaceApi) -> SetupResult<String> {
    let prompt = Prompt::new(t!("label.run_as")).optional();
    let mut name = console.ask(&prompt)?;
    while !name.is_empty() {
        console.say(&t!("run_as.checking", name = name))?;
        if service_principal_exists(api, &name)? {
            console.say(&t!("run_as.confirmed", name = name))?;
            break;
        }
        console.say(&t!("run_as.not_found", name = name))?;
        name = console.ask(&prompt)?;
    }
    Ok(name)
}

// ============================================================================
// SECTION: Job Settings
// ============================================================================

/// Keeps a valid concurrency limit or prompts for one.
fn configure_max_active_scan_jobs(
    console: &mut Console,
    config: &mut AutoscanConfig,
) -> SetupResult<()> {
    if let Err(err) = validate_max_active_scan_jobs(&config.max_active_scan_jobs)
        && !config.max_active_scan_jobs.is_empty()
    {
        console.say(&err.operator_message())?;
        config.max_active_scan_jobs.clear();
    }
    let prompt = Prompt::new(t!("label.max_jobs", default = DEFAULT_MAX_ACTIVE_SCAN_JOBS))
        .with_default(DEFAULT_MAX_ACTIVE_SCAN_JOBS);
    while config.max_active_scan_jobs.is_empty() {
        let value = console.ask(&prompt)?;
        match validate_max_active_scan_jobs(&value) {
            Ok(()) => config.max_active_scan_jobs = value,
            Err(err) => console.say(&err.operator_message())?,
        }
    }
    Ok(())
}

/// Keeps a valid polling schedule or prompts for one.
fn configure_polling_schedule(
    console: &mut Console,
    config: &mut AutoscanConfig,
) -> SetupResult<()> {
    if let Err(err) = validate_cron_expression(&config.polling_schedule)
        && !config.polling_schedule.is_empty()
    {
        console.say(&err.operator_message())?;
        config.polling_schedule.clear();
    }
    let prompt = Prompt::new(t!("label.polling_schedule", default = DEFAULT_POLLING_SCHEDULE))
        .with_default(DEFAULT_POLLING_SCHEDULE);
    while config.polling_schedule.is_empty() {
        console.say(&t!("cron.help"))?;
        let value = console.ask(&prompt)?;
        match validate_cron_expression(&value) {
            Ok(()) => config.polling_schedule = value,
            Err(err) => console.say(&err.operator_message())?,
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Schemas
// ============================================================================

/// Checks a schema and tells the operator the outcome.
fn confirm_schema(
    console: &mut Console,
    api: &dyn WorkspaceApi,
    schema: &CatalogSchema,
) -> SetupResult<bool> {
    if schema_exists(api, schema)? {
        console.say(&t!("schema.confirmed", schema = schema.schema, catalog = schema.catalog))?;
        Ok(true)
    } else {
        console.say(&t!("schema.not_found", schema = schema.schema, catalog = schema.catalog))?;
        Ok(false)
    }
}

/// Prompts for a catalog/schema pair until one exists; `None` when the
/// operator leaves the catalog blank.
///
/// # Errors
///
/// Propagates fatal workspace and console errors.
pub fn retrieve_schema(
    console: &mut Console,
    api: &dyn WorkspaceApi,
) -> SetupResult<Option<CatalogSchema>> {
    let catalog_prompt = Prompt::new(t!("label.catalog")).finish_on_blank();
    let schema_prompt = Prompt::new(t!("label.schema"));
    loop {
        let catalog = console.ask(&catalog_prompt)?;
        if catalog.is_empty() {
            return Ok(None);
        }
        let schema = console.ask(&schema_prompt)?;
        let pair = CatalogSchema::new(catalog, schema);
        if confirm_schema(console, api, &pair)? {
            return Ok(Some(pair));
        }
    }
}

/// Collects new pairs until the operator finishes.
fn collect_schemas(
    console: &mut Console,
    api: &dyn WorkspaceApi,
) -> SetupResult<Vec<CatalogSchema>> {
    let mut schemas = Vec::new();
    loop {
        console.say(&t!("schema.add"))?;
        match retrieve_schema(console, api)? {
            Some(schema) => schemas.push(schema),
            None => return Ok(schemas),
        }
    }
}

/// Re-validates persisted pairs, replacing or dropping the missing ones.
///
/// The flag is set when any pair was replaced or dropped.
fn repair_schemas(
    console: &mut Console,
    api: &dyn WorkspaceApi,
    persisted: Vec<CatalogSchema>,
) -> SetupResult<(Vec<CatalogSchema>, bool)> {
    let mut valid = Vec::with_capacity(persisted.len());
    let mut repaired = false;
    for schema in persisted {
        if confirm_schema(console, api, &schema)? {
            valid.push(schema);
            continue;
        }
        repaired = true;
        console.say(&t!("schema.replace", catalog = schema.catalog, schema = schema.schema))?;
        match retrieve_schema(console, api)? {
            Some(replacement) => valid.push(replacement),
            None => {
                console.say(&t!("schema.dropped", catalog = schema.catalog, schema = schema.schema))?;
            }
        }
    }
    Ok((valid, repaired))
}
