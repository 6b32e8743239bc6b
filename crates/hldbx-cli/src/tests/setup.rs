// crates/hldbx-cli/src/tests/setup.rs
// ============================================================================
// Module: Autoscan Setup Tests
// Description: End-to-end runs of the setup sequence against fakes.
// Purpose: Cover the full operator journeys from an empty or partial record.
// Dependencies: hldbx-cli setup module
// ============================================================================

//! ## Overview
//! Each test scripts every answer an operator would give and checks both
//! the final record and the workspace calls provisioning made.

use hldbx_config::AutoscanConfig;
use hldbx_config::CatalogSchema;
use hldbx_workspace::provision::MONITOR_JOB_NAME;

use crate::error::SetupError;
use crate::setup::SetupContext;
use crate::setup::run_autoscan;
use crate::tests::support::FakeAuthenticator;
use crate::tests::support::FakeConnector;
use crate::tests::support::FakeWorkspace;
use crate::tests::support::harness;

/// Workspace host used by the fixtures.
const HOST: &str = "https://adb-123.4.azuredatabricks.net";

/// Release version used for the notebook directory.
const VERSION: &str = "0.3.0";

#[test]
fn fresh_saas_run_provisions_monitoring_job() {
    let workspace = FakeWorkspace::default().with_cluster("c-1").with_schema("main", "models");
    let connector = FakeConnector::new(workspace.clone(), "tok123");
    let authenticator = FakeAuthenticator::accepting();
    let context = SetupContext {
        connector: &connector,
        authenticator: &authenticator,
        token_cache: None,
        version: VERSION,
    };
    let mut h = harness(&[
        HOST,
        "",
        "tok123",
        "c-1",
        "",
        "",
        "",
        "main",
        "models",
        "",
        "US",
        "client",
        "secret",
        "hl_models_key",
    ]);
    let mut config = AutoscanConfig::default();

    let report = run_autoscan(&mut h.console, &mut config, &context).unwrap();

    assert_eq!(config.scanner_api_url, "https://api.us.hiddenlayer.ai");
    assert_eq!(config.cluster_id, "c-1");
    assert_eq!(config.catalog_schemas, vec![CatalogSchema::new("main", "models")]);
    assert_eq!(report.job_id, 4242);
    assert_eq!(report.secret_scopes, vec!["hl_scan.main.models".to_string()]);
    assert_eq!(report.uploaded.len(), 4);

    let calls = workspace.calls();
    let provisioning: Vec<&str> = calls
        .iter()
        .map(String::as_str)
        .skip_while(|call| !call.starts_with("scope "))
        .collect();
    assert_eq!(&provisioning[..4], [
        "scope hl_scan.main.models",
        "put hl_scan.main.models/hl_models_key",
        "get hl_scan.main.models/hl_models_key",
        "mkdirs /Shared/HiddenLayer/0.3.0",
    ]);
    assert_eq!(provisioning.last().copied(), Some("job hl_find_new_model_versions"));

    let job = workspace.job().unwrap();
    assert_eq!(job.name, MONITOR_JOB_NAME);
    assert!(job.run_as.is_none());

    let output = h.output.text();
    assert!(output.contains("the job will run as the user who created it"));
    assert!(output.contains("Stored HiddenLayer credentials in secret scope hl_scan.main.models"));
    assert!(output.contains("Uploaded /Shared/HiddenLayer/0.3.0/hl_monitor_models.py"));
    assert!(output.contains("Scheduled monitoring job with ID: 4242"));
    assert!(output.ends_with("Finished setting up automated HiddenLayer model scanning\n"));
    assert!(!output.contains("tok123"));
}

#[test]
fn self_hosted_run_skips_scanner_secrets() {
    let workspace = FakeWorkspace::default()
        .with_cluster("c-1")
        .with_schema("main", "models")
        .with_principal("Model Scanner", "scanner-app");
    let connector = FakeConnector::new(workspace.clone(), "tok123");
    let authenticator = FakeAuthenticator::accepting();
    let context = SetupContext {
        connector: &connector,
        authenticator: &authenticator,
        token_cache: None,
        version: VERSION,
    };
    let mut h = harness(&[]);
    let mut config = AutoscanConfig {
        workspace_host: HOST.to_string(),
        workspace_token: "tok123".to_string(),
        cluster_id: "c-1".to_string(),
        run_as: "scanner-app".to_string(),
        catalog_schemas: vec![CatalogSchema::new("main", "models")],
        max_active_scan_jobs: "4".to_string(),
        polling_schedule: "0 0 */12 * * ?".to_string(),
        scanner_api_url: "https://scanner.corp.example".to_string(),
        ..AutoscanConfig::default()
    };

    let report = run_autoscan(&mut h.console, &mut config, &context).unwrap();

    assert_eq!(h.prompts(), 0);
    assert!(report.secret_scopes.is_empty());
    assert!(authenticator.calls.borrow().is_empty());
    assert!(!workspace.calls().iter().any(|call| call.starts_with("scope ") || call.starts_with("put ")));
    let job = workspace.job().unwrap();
    assert_eq!(job.run_as.unwrap().service_principal_name, "scanner-app");
    assert!(!h.output.text().contains("the job will run as the user who created it"));
}

#[test]
fn zero_valid_schemas_never_reaches_provisioning() {
    let workspace = FakeWorkspace::default().with_cluster("c-1");
    let connector = FakeConnector::new(workspace.clone(), "tok123");
    let authenticator = FakeAuthenticator::accepting();
    let context = SetupContext {
        connector: &connector,
        authenticator: &authenticator,
        token_cache: None,
        version: VERSION,
    };
    let mut h = harness(&["", ""]);
    let mut config = AutoscanConfig {
        workspace_host: HOST.to_string(),
        workspace_token: "tok123".to_string(),
        cluster_id: "c-1".to_string(),
        catalog_schemas: vec![CatalogSchema::new("old", "gone")],
        max_active_scan_jobs: "10".to_string(),
        polling_schedule: "0 0 */12 * * ?".to_string(),
        ..AutoscanConfig::default()
    };

    let err = run_autoscan(&mut h.console, &mut config, &context).unwrap_err();

    assert!(matches!(err, SetupError::NoSchemas));
    assert!(authenticator.calls.borrow().is_empty());
    assert!(workspace.job().is_none());
    assert!(!workspace.calls().iter().any(|call| call.starts_with("mkdirs ")));
}
