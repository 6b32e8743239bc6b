// crates/hldbx-cli/src/tests/resources.rs
// ============================================================================
// Module: Resource Configurator Tests
// Description: Unit tests for cluster, run-as, limit, schedule, and schemas.
// Purpose: Cover fresh entry, persisted-record repair, and fatal outcomes.
// Dependencies: hldbx-cli resources module
// ============================================================================

//! ## Overview
//! Runs [`configure_resources`] against the in-memory workspace. Persisted
//! records are built by [`persisted`]; fresh runs start from the default
//! record.

use hldbx_config::AutoscanConfig;
use hldbx_config::CatalogSchema;
use hldbx_workspace::WorkspaceError;

use crate::error::SetupError;
use crate::resources::configure_resources;
use crate::resources::retrieve_cluster;
use crate::resources::retrieve_schema;
use crate::tests::support::FakeWorkspace;
use crate::tests::support::harness;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Workspace holding cluster `c-1`, schema `main.models`, and one principal.
fn workspace() -> FakeWorkspace {
    FakeWorkspace::default()
        .with_cluster("c-1")
        .with_schema("main", "models")
        .with_principal("Model Scanner", "scanner-app")
}

/// A fully valid persisted record for [`workspace`].
fn persisted() -> AutoscanConfig {
    AutoscanConfig {
        cluster_id: "c-1".to_string(),
        run_as: "scanner-app".to_string(),
        catalog_schemas: vec![CatalogSchema::new("main", "models")],
        max_active_scan_jobs: "5".to_string(),
        polling_schedule: "0 0 */6 * * ?".to_string(),
        ..AutoscanConfig::default()
    }
}

// ============================================================================
// SECTION: Fresh Entry
// ============================================================================

#[test]
fn fresh_record_collects_every_resource() {
    let workspace = workspace();
    let mut h = harness(&["c-1", "", "", "", "main", "models", ""]);
    let mut config = AutoscanConfig::default();

    configure_resources(&mut h.console, &mut config, &workspace).unwrap();

    assert_eq!(config.cluster_id, "c-1");
    assert!(config.run_as.is_empty());
    assert_eq!(config.max_active_scan_jobs, "10");
    assert_eq!(config.polling_schedule, "0 0 */12 * * ?");
    assert_eq!(config.catalog_schemas, vec![CatalogSchema::new("main", "models")]);
    let output = h.output.text();
    assert!(output.contains("Confirming cluster with ID=c-1 found in Databricks"));
    assert!(output.contains("Quartz expression format"));
    assert!(output.contains("Confirming schema 'models' in catalog 'main' found in Unity Catalog"));
}

#[test]
fn declining_a_cluster_is_fatal() {
    let workspace = workspace();
    let mut h = harness(&["c-404", ""]);
    let mut config = AutoscanConfig::default();

    let err = configure_resources(&mut h.console, &mut config, &workspace).unwrap_err();

    assert!(matches!(err, SetupError::NoCluster));
    assert!(h.output.text().contains("Cluster c-404 not found in Databricks"));
}

#[test]
fn run_as_prompt_retries_until_principal_exists() {
    let workspace = workspace();
    let mut h = harness(&["ghost", "model scanner"]);
    let mut config = AutoscanConfig {
        run_as: String::new(),
        ..persisted()
    };

    configure_resources(&mut h.console, &mut config, &workspace).unwrap();

    assert_eq!(config.run_as, "model scanner");
    let output = h.output.text();
    assert!(output.contains("Service principal ghost not found in Databricks"));
    assert!(output.contains("Confirming service principal 'model scanner' found in Databricks"));
    assert_eq!(h.prompts(), 2);
}

#[test]
fn invalid_schedule_is_reprompted() {
    let workspace = workspace();
    let mut h = harness(&["not a cron", "0 30 2 * * ?"]);
    let mut config = AutoscanConfig {
        polling_schedule: String::new(),
        ..persisted()
    };

    configure_resources(&mut h.console, &mut config, &workspace).unwrap();

    assert_eq!(config.polling_schedule, "0 30 2 * * ?");
    assert!(h.output.text().contains("Error validating cron expression"));
}

#[test]
fn fresh_schema_entry_retries_missing_pairs() {
    let workspace = workspace().with_schema("main", "vision");
    let mut h = harness(&["main", "absent", "main", "models", "main", "vision", ""]);
    let mut config = AutoscanConfig {
        catalog_schemas: Vec::new(),
        ..persisted()
    };

    configure_resources(&mut h.console, &mut config, &workspace).unwrap();

    assert_eq!(config.catalog_schemas, vec![
        CatalogSchema::new("main", "models"),
        CatalogSchema::new("main", "vision"),
    ]);
    assert!(h.output.text().contains("Schema absent in catalog main not found in Unity Catalog"));
}

#[test]
fn finishing_without_any_schema_is_fatal() {
    let workspace = workspace();
    let mut h = harness(&[""]);
    let mut config = AutoscanConfig {
        catalog_schemas: Vec::new(),
        ..persisted()
    };

    let err = configure_resources(&mut h.console, &mut config, &workspace).unwrap_err();

    assert!(matches!(err, SetupError::NoSchemas));
}

// ============================================================================
// SECTION: Persisted Records
// ============================================================================

#[test]
fn valid_persisted_record_is_revalidated_without_prompts() {
    let workspace = workspace();
    let mut h = harness(&[]);
    let mut config = persisted();

    configure_resources(&mut h.console, &mut config, &workspace).unwrap();

    assert_eq!(config, persisted());
    assert_eq!(h.prompts(), 0);
    assert_eq!(workspace.calls(), ["cluster c-1", "principals", "schema main.models"]);
}

#[test]
fn stale_cluster_is_cleared_and_loop_restarts() {
    let workspace = workspace();
    let mut h = harness(&["c-1"]);
    let mut config = AutoscanConfig {
        cluster_id: "c-old".to_string(),
        ..persisted()
    };

    configure_resources(&mut h.console, &mut config, &workspace).unwrap();

    assert_eq!(config.cluster_id, "c-1");
    assert_eq!(config.max_active_scan_jobs, "5");
    assert_eq!(config.polling_schedule, "0 0 */6 * * ?");
    assert_eq!(h.prompts(), 1);
    assert!(h.output.text().contains("please provide a valid cluster ID"));
    assert_eq!(workspace.calls(), [
        "cluster c-old",
        "cluster c-1",
        "principals",
        "schema main.models"
    ]);
}

#[test]
fn stale_run_as_is_cleared_and_loop_restarts() {
    let workspace = workspace();
    let mut h = harness(&[""]);
    let mut config = AutoscanConfig {
        run_as: "ghost".to_string(),
        ..persisted()
    };

    configure_resources(&mut h.console, &mut config, &workspace).unwrap();

    assert!(config.run_as.is_empty());
    assert_eq!(workspace.calls(), [
        "cluster c-1",
        "principals",
        "cluster c-1",
        "schema main.models"
    ]);
}

#[test]
fn malformed_persisted_job_settings_are_reprompted() {
    let workspace = workspace();
    let mut h = harness(&["", "0 0 6 * * ?"]);
    let mut config = AutoscanConfig {
        max_active_scan_jobs: "zero".to_string(),
        polling_schedule: "every day".to_string(),
        ..persisted()
    };

    configure_resources(&mut h.console, &mut config, &workspace).unwrap();

    assert_eq!(config.max_active_scan_jobs, "10");
    assert_eq!(config.polling_schedule, "0 0 6 * * ?");
    assert!(h.output.text().contains("got 'zero'"));
}

#[test]
fn persisted_quartz_calendar_schedule_is_kept() {
    let workspace = workspace();
    let mut h = harness(&[]);
    let mut config = AutoscanConfig {
        polling_schedule: "0 0 12 ? * 6#3".to_string(),
        ..persisted()
    };

    configure_resources(&mut h.console, &mut config, &workspace).unwrap();

    assert_eq!(config.polling_schedule, "0 0 12 ? * 6#3");
    assert_eq!(h.prompts(), 0);
}

#[test]
fn missing_persisted_schema_is_replaced() {
    let workspace = workspace().with_schema("main", "fresh");
    let mut h = harness(&["main", "fresh"]);
    let mut config = AutoscanConfig {
        catalog_schemas: vec![CatalogSchema::new("main", "models"), CatalogSchema::new("old", "gone")],
        ..persisted()
    };

    configure_resources(&mut h.console, &mut config, &workspace).unwrap();

    assert_eq!(config.catalog_schemas, vec![
        CatalogSchema::new("main", "models"),
        CatalogSchema::new("main", "fresh"),
    ]);
    assert!(h.output.text().contains("Enter a replacement for old.gone"));
    assert_eq!(h.prompts(), 2);
    let calls = workspace.calls();
    assert_eq!(&calls[calls.len() - 4..], [
        "cluster c-1",
        "principals",
        "schema main.models",
        "schema main.fresh"
    ]);
}

#[test]
fn missing_persisted_schema_may_be_dropped() {
    let workspace = workspace();
    let mut h = harness(&[""]);
    let mut config = AutoscanConfig {
        catalog_schemas: vec![CatalogSchema::new("old", "gone"), CatalogSchema::new("main", "models")],
        ..persisted()
    };

    configure_resources(&mut h.console, &mut config, &workspace).unwrap();

    assert_eq!(config.catalog_schemas, vec![CatalogSchema::new("main", "models")]);
    assert!(h.output.text().contains("Dropping old.gone"));
}

#[test]
fn zero_valid_schemas_after_repair_is_fatal() {
    let workspace = workspace();
    let mut h = harness(&["", ""]);
    let mut config = AutoscanConfig {
        catalog_schemas: vec![CatalogSchema::new("old", "gone"), CatalogSchema::new("old", "lost")],
        ..persisted()
    };

    let err = configure_resources(&mut h.console, &mut config, &workspace).unwrap_err();

    assert!(matches!(err, SetupError::NoSchemas));
}

#[test]
fn unexpected_lookup_failure_is_fatal() {
    let workspace = workspace();
    workspace.fail_lookups(WorkspaceError::Unauthorized {
        status: 403,
        message: "token expired".to_string(),
    });
    let mut h = harness(&[]);
    let mut config = persisted();

    let err = configure_resources(&mut h.console, &mut config, &workspace).unwrap_err();

    assert!(matches!(err, SetupError::Workspace { resource: "cluster", .. }));
    assert!(err.to_string().contains("token expired"));
}

// ============================================================================
// SECTION: Entry Helpers
// ============================================================================

#[test]
fn retrieve_helpers_report_operator_exit_as_none() {
    let workspace = workspace();
    let mut h = harness(&["", ""]);

    assert_eq!(retrieve_cluster(&mut h.console, &workspace).unwrap(), None);
    assert_eq!(retrieve_schema(&mut h.console, &workspace).unwrap(), None);
}

#[test]
fn retrieve_schema_requires_a_schema_name() {
    let workspace = workspace();
    let mut h = harness(&["main", "", "models"]);

    let schema = retrieve_schema(&mut h.console, &workspace).unwrap();

    assert_eq!(schema, Some(CatalogSchema::new("main", "models")));
    assert_eq!(h.prompts(), 3);
}
