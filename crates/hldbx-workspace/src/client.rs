// crates/hldbx-workspace/src/client.rs
// ============================================================================
// Module: Workspace REST Client
// Description: Blocking reqwest implementation of the workspace API contract.
// Purpose: Issue bearer-authenticated REST calls and classify failures.
// Dependencies: reqwest, serde, serde_json, tracing
// ============================================================================

//! ## Overview
//! [`HttpWorkspaceConnector`] checks a credential by listing clusters, the
//! same call the workspace SDK uses as an identity probe, and returns an
//! [`HttpWorkspaceClient`] bound to that host and credential.

// ============================================================================
// SECTION: Imports
// ============================================================================

use reqwest::Method;
use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::blocking::RequestBuilder;
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use crate::api::ImportRequest;
use crate::api::JobSettings;
use crate::api::ServicePrincipal;
use crate::api::WorkspaceApi;
use crate::api::WorkspaceConnector;
use crate::api::WorkspaceError;
use crate::api::classify_api_error;
use crate::http::HttpClientConfig;
use crate::http::build_http_client;
use crate::http::parse_base_url;
use crate::http::read_response_limited;

// ============================================================================
// SECTION: Endpoints
// ============================================================================

/// Cluster listing, used as the identity check.
const CLUSTERS_LIST: &str = "api/2.0/clusters/list";
/// Cluster lookup.
const CLUSTERS_GET: &str = "api/2.0/clusters/get";
/// Unity Catalog schema lookup prefix.
const SCHEMAS_PREFIX: &[&str] = &["api", "2.1", "unity-catalog", "schemas"];
/// SCIM service principal listing.
const SERVICE_PRINCIPALS: &str = "api/2.0/preview/scim/v2/ServicePrincipals";
/// Secret scope creation.
const SECRET_SCOPES_CREATE: &str = "api/2.0/secrets/scopes/create";
/// Secret write.
const SECRETS_PUT: &str = "api/2.0/secrets/put";
/// Secret read.
const SECRETS_GET: &str = "api/2.0/secrets/get";
/// Workspace directory creation.
const WORKSPACE_MKDIRS: &str = "api/2.0/workspace/mkdirs";
/// Workspace file import.
const WORKSPACE_IMPORT: &str = "api/2.0/workspace/import";
/// Job creation.
const JOBS_CREATE: &str = "api/2.1/jobs/create";

// ============================================================================
// SECTION: Connector
// ============================================================================

/// Connector that authenticates against a workspace over HTTPS.
#[derive(Debug, Clone, Default)]
pub struct HttpWorkspaceConnector {
    /// Outbound HTTP policy shared by every session.
    config: HttpClientConfig,
}

impl HttpWorkspaceConnector {
    /// Creates a connector with the given HTTP policy.
    #[must_use]
    pub const fn new(config: HttpClientConfig) -> Self {
        Self {
            config,
        }
    }
}

impl WorkspaceConnector for HttpWorkspaceConnector {
    fn connect(&self, host: &str, token: &str) -> Result<Box<dyn WorkspaceApi>, WorkspaceError> {
        let client = HttpWorkspaceClient::new(host, token, self.config.clone())?;
        client.authenticate()?;
        Ok(Box::new(client))
    }
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// Workspace session bound to one host and bearer credential.
pub struct HttpWorkspaceClient {
    /// Host as supplied by the operator.
    host: String,
    /// Parsed base URL with a trailing slash for joins.
    base: Url,
    /// Bearer credential.
    token: String,
    /// Response size limit.
    max_response_bytes: usize,
    /// Underlying blocking client.
    client: Client,
}

impl HttpWorkspaceClient {
    /// Creates a client without contacting the workspace.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::Transport`] when the host is malformed or the
    /// HTTP client cannot be built.
    pub fn new(host: &str, token: &str, config: HttpClientConfig) -> Result<Self, WorkspaceError> {
        let mut base = parse_base_url(host, config.allow_http).map_err(WorkspaceError::Transport)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let client = build_http_client(&config).map_err(WorkspaceError::Transport)?;
        Ok(Self {
            host: host.to_string(),
            base,
            token: token.to_string(),
            max_response_bytes: config.max_response_bytes,
            client,
        })
    }

    /// Verifies the credential by listing clusters.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError`] when the identity check fails.
    pub fn authenticate(&self) -> Result<(), WorkspaceError> {
        let url = self.endpoint(CLUSTERS_LIST)?;
        self.send(self.request(Method::GET, url)).map(|_| ())
    }

    /// Joins a relative endpoint onto the base URL.
    fn endpoint(&self, path: &str) -> Result<Url, WorkspaceError> {
        self.base.join(path).map_err(|err| WorkspaceError::Transport(format!("invalid url: {err}")))
    }

    /// Starts a bearer-authenticated request.
    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!(method = %method, path = url.path(), "workspace request");
        self.client.request(method, url).bearer_auth(&self.token)
    }

    /// Sends a request and returns the body of a successful response.
    fn send(&self, request: RequestBuilder) -> Result<Vec<u8>, WorkspaceError> {
        let mut response =
            request.send().map_err(|err| WorkspaceError::Transport(err.to_string()))?;
        let status = response.status();
        let body = read_response_limited(&mut response, self.max_response_bytes)
            .map_err(WorkspaceError::InvalidResponse)?;
        if status.is_success() {
            return Ok(body);
        }
        let text = String::from_utf8_lossy(&body);
        debug!(status = status.as_u16(), "workspace request failed");
        Err(classify_api_error(status.as_u16(), &text))
    }

    /// Sends a request and decodes a JSON body.
    fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, WorkspaceError> {
        let body = self.send(request)?;
        serde_json::from_slice(&body).map_err(|err| WorkspaceError::InvalidResponse(err.to_string()))
    }

    /// Posts a JSON payload and discards the response body.
    fn post<B: Serialize + ?Sized>(&self, path: &str, payload: &B) -> Result<(), WorkspaceError> {
        let url = self.endpoint(path)?;
        self.send(self.request(Method::POST, url).json(payload)).map(|_| ())
    }
}

/// Service principal listing envelope.
#[derive(Debug, Default, Deserialize)]
struct ServicePrincipalList {
    /// Listed principals; absent when there are none.
    #[serde(rename = "Resources", default)]
    resources: Vec<ServicePrincipal>,
}

/// Secret read response.
#[derive(Debug, Deserialize)]
struct SecretValue {
    /// Base64-encoded secret value.
    value: String,
}

/// Job creation response.
#[derive(Debug, Deserialize)]
struct CreatedJob {
    /// New job ID.
    job_id: i64,
}

impl WorkspaceApi for HttpWorkspaceClient {
    fn host(&self) -> &str {
        &self.host
    }

    fn get_cluster(&self, cluster_id: &str) -> Result<(), WorkspaceError> {
        let mut url = self.endpoint(CLUSTERS_GET)?;
        url.query_pairs_mut().append_pair("cluster_id", cluster_id);
        self.send(self.request(Method::GET, url)).map(|_| ())
    }

    fn get_schema(&self, full_name: &str) -> Result<(), WorkspaceError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| WorkspaceError::Transport("workspace url cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(SCHEMAS_PREFIX)
            .push(full_name);
        self.send(self.request(Method::GET, url)).map(|_| ())
    }

    fn list_service_principals(&self) -> Result<Vec<ServicePrincipal>, WorkspaceError> {
        let url = self.endpoint(SERVICE_PRINCIPALS)?;
        let list: ServicePrincipalList = self.send_json(self.request(Method::GET, url))?;
        Ok(list.resources)
    }

    fn create_secret_scope(&self, scope: &str) -> Result<(), WorkspaceError> {
        self.post(SECRET_SCOPES_CREATE, &json!({ "scope": scope }))
    }

    fn put_secret(&self, scope: &str, key: &str, value: &str) -> Result<(), WorkspaceError> {
        self.post(SECRETS_PUT, &json!({ "scope": scope, "key": key, "string_value": value }))
    }

    fn get_secret(&self, scope: &str, key: &str) -> Result<String, WorkspaceError> {
        let mut url = self.endpoint(SECRETS_GET)?;
        url.query_pairs_mut().append_pair("scope", scope).append_pair("key", key);
        let secret: SecretValue = self.send_json(self.request(Method::GET, url))?;
        Ok(secret.value)
    }

    fn mkdirs(&self, path: &str) -> Result<(), WorkspaceError> {
        self.post(WORKSPACE_MKDIRS, &json!({ "path": path }))
    }

    fn import_file(&self, request: &ImportRequest) -> Result<(), WorkspaceError> {
        self.post(WORKSPACE_IMPORT, request)
    }

    fn create_job(&self, settings: &JobSettings) -> Result<i64, WorkspaceError> {
        let url = self.endpoint(JOBS_CREATE)?;
        let created: CreatedJob = self.send_json(self.request(Method::POST, url).json(settings))?;
        Ok(created.job_id)
    }
}
