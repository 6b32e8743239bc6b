// crates/hldbx-cli/src/scanner.rs
// ============================================================================
// Module: Scanner-Credential Configurator
// Description: Scanner region, endpoint, and client-credential collection.
// Purpose: Decide the scanner deployment and verify SaaS credentials.
// Dependencies: hldbx-config, hldbx-workspace, tracing
// ============================================================================

//! ## Overview
//! The scanner API URL decides everything else. When it is unset the
//! operator picks a region; `US` and `EU` fill all three URLs from the fixed
//! endpoint table while `CUSTOM` asks for each one. A self-hosted API needs
//! no credentials. A managed SaaS API needs a client ID, client secret, and
//! the secret-store key they are saved under, and the pair must
//! authenticate before setup continues.
//!
//! ## Invariants
//! - The authenticator is only called for [`ScannerDeployment::ManagedSaas`].
//! - A rejected client credential is fatal.
//! - A malformed API URL typed at the prompt is asked again; only a malformed
//!   persisted URL is fatal.

// ============================================================================
// SECTION: Imports
// ============================================================================

use hldbx_config::AutoscanConfig;
use hldbx_config::RegionEndpoints;
use hldbx_config::ScannerDeployment;
use hldbx_config::ScannerRegion;
use hldbx_config::US_ENDPOINTS;
use hldbx_config::classify_api_url;
use hldbx_workspace::ScannerAuthenticator;
use tracing::info;

use crate::error::SetupResult;
use crate::prompt::Console;
use crate::prompt::Prompt;
use crate::t;
use crate::validate::validate_secret_name;

// ============================================================================
// SECTION: Configurator
// ============================================================================

/// Fills the scanner fields of `config` and returns the deployment kind.
///
/// # Errors
///
/// Returns [`crate::SetupError::ScannerUrl`] when the API URL cannot be
/// classified, [`crate::SetupError::ScannerAuth`] when the scanning service
/// rejects the client credentials, and console errors.
pub fn configure_scanner(
    console: &mut Console,
    config: &mut AutoscanConfig,
    authenticator: &dyn ScannerAuthenticator,
) -> SetupResult<ScannerDeployment> {
    if config.scanner_api_url.is_empty() {
        let endpoints = match ask_region(console)?.endpoints() {
            Some(endpoints) => OwnedEndpoints::from(endpoints),
            None => ask_custom_endpoints(console)?,
        };
        config.scanner_api_url = endpoints.api_url;
        config.scanner_auth_url = endpoints.auth_url;
        config.scanner_console_url = endpoints.console_url;
    }

    let deployment = config.scanner_deployment()?;
    if deployment == ScannerDeployment::SelfHosted {
        console.say(&t!("scanner.self_hosted", url = config.scanner_api_url))?;
        return Ok(deployment);
    }

    if config.scanner_auth_url.is_empty() {
        config.scanner_auth_url = console.ask(&url_prompt(
            t!("label.auth_url", default = US_ENDPOINTS.auth_url),
            US_ENDPOINTS.auth_url,
        ))?;
    }
    if config.scanner_console_url.is_empty() {
        config.scanner_console_url = console.ask(&url_prompt(
            t!("label.console_url", default = US_ENDPOINTS.console_url),
            US_ENDPOINTS.console_url,
        ))?;
    }

    if config.scanner_client_id.is_empty() || config.scanner_client_secret.is_empty() {
        config.scanner_client_id = console.ask(&Prompt::new(t!("label.client_id")))?;
        config.scanner_client_secret = console.ask(&Prompt::new(t!("label.client_secret")).masked())?;
    }
    if let Err(err) = validate_secret_name(&config.scanner_secret_name)
        && !config.scanner_secret_name.is_empty()
    {
        console.say(&err.operator_message())?;
        config.scanner_secret_name.clear();
    }
    if config.scanner_secret_name.is_empty() {
        config.scanner_secret_name = ask_secret_name(console)?;
    }

    authenticator.authenticate(
        &config.scanner_auth_url,
        &config.scanner_client_id,
        &config.scanner_client_secret,
    )?;
    info!(auth_url = %config.scanner_auth_url, "scanner credentials verified");
    console.say(&t!("scanner.auth_ok"))?;
    Ok(deployment)
}

// ============================================================================
// SECTION: Prompts
// ============================================================================

/// Prompts until a known region label is entered.
fn ask_region(console: &mut Console) -> SetupResult<ScannerRegion> {
    let default = ScannerRegion::Us.as_str();
    let regions = ScannerRegion::LABELS.join("/");
    let prompt =
        Prompt::new(t!("label.region", regions = regions, default = default)).with_default(default);
    loop {
        let answer = console.ask(&prompt)?;
        match ScannerRegion::parse(&answer) {
            Some(region) => return Ok(region),
            None => console.say(&t!("region.invalid"))?,
        }
    }
}

/// Builds a URL prompt that falls back to `default`.
fn url_prompt(label: String, default: &str) -> Prompt {
    Prompt::new(label).with_default(default)
}

/// Asks for every scanner URL, offering the US endpoints as defaults.
///
/// The API URL is asked again until it parses with a host.
fn ask_custom_endpoints(console: &mut Console) -> SetupResult<OwnedEndpoints> {
    let defaults = US_ENDPOINTS;
    let api_prompt = url_prompt(t!("label.api_url", default = defaults.api_url), defaults.api_url);
    let api_url = loop {
        let api_url = console.ask(&api_prompt)?;
        match classify_api_url(&api_url) {
            Ok(_) => break api_url,
            Err(err) => console.say(&t!("scanner.url_invalid", error = err))?,
        }
    };
    let auth_url =
        console.ask(&url_prompt(t!("label.auth_url", default = defaults.auth_url), defaults.auth_url))?;
    let console_url = console.ask(&url_prompt(
        t!("label.console_url", default = defaults.console_url),
        defaults.console_url,
    ))?;
    Ok(OwnedEndpoints {
        api_url,
        auth_url,
        console_url,
    })
}

/// Prompts until a valid secret-store key name is entered.
fn ask_secret_name(console: &mut Console) -> SetupResult<String> {
    let prompt = Prompt::new(t!("label.secret_name")).finish_on_blank();
    loop {
        let name = console.ask(&prompt)?;
        match validate_secret_name(&name) {
            Ok(()) => return Ok(name),
            Err(err) => console.say(&err.operator_message())?,
        }
    }
}

// ============================================================================
// SECTION: Endpoint Values
// ============================================================================

/// Operator-supplied endpoint URLs.
struct OwnedEndpoints {
    /// Scanner API base URL.
    api_url: String,
    /// Scanner OAuth base URL.
    auth_url: String,
    /// Scanner console base URL.
    console_url: String,
}

impl From<RegionEndpoints> for OwnedEndpoints {
    fn from(endpoints: RegionEndpoints) -> Self {
        Self {
            api_url: endpoints.api_url.to_string(),
            auth_url: endpoints.auth_url.to_string(),
            console_url: endpoints.console_url.to_string(),
        }
    }
}
