// crates/hldbx-cli/src/tests/support.rs
// ============================================================================
// Module: Setup Test Support Helpers
// Description: Scripted consoles and in-memory workspace collaborators.
// Purpose: Drive the interactive setup without a terminal or network.
// Dependencies: base64, hldbx-workspace
// ============================================================================

use std::cell::Cell;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::collections::VecDeque;
use std::io;
use std::io::Write;
use std::rc::Rc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use hldbx_workspace::ImportRequest;
use hldbx_workspace::JobSettings;
use hldbx_workspace::ScannerAuthError;
use hldbx_workspace::ScannerAuthenticator;
use hldbx_workspace::ServicePrincipal;
use hldbx_workspace::WorkspaceApi;
use hldbx_workspace::WorkspaceConnector;
use hldbx_workspace::WorkspaceError;

use crate::prompt::Console;
use crate::prompt::LineSource;

// ============================================================================
// SECTION: Console Fixtures
// ============================================================================

/// Input source replaying a fixed script; `None` entries fail the read.
pub struct ScriptedInput {
    /// Remaining steps; an exhausted script reports end of input.
    steps: VecDeque<Option<String>>,
    /// Values consumed through the masked reader.
    secrets: Rc<RefCell<Vec<String>>>,
    /// Number of reads attempted.
    reads: Rc<Cell<usize>>,
}

impl ScriptedInput {
    /// Pops the next step, rendering injected failures as I/O errors.
    fn next(&mut self) -> io::Result<Option<String>> {
        self.reads.set(self.reads.get() + 1);
        match self.steps.pop_front() {
            Some(Some(line)) => Ok(Some(line)),
            Some(None) => Err(io::Error::other("device not ready")),
            None => Ok(None),
        }
    }
}

impl LineSource for ScriptedInput {
    fn read_line(&mut self) -> io::Result<Option<String>> {
        self.next().map(|line| line.map(|line| format!("{line}\n")))
    }

    fn read_secret(&mut self) -> io::Result<Option<String>> {
        let secret = self.next()?;
        if let Some(value) = &secret {
            self.secrets.borrow_mut().push(value.clone());
        }
        Ok(secret)
    }
}

/// Writer collecting console output in memory.
#[derive(Clone, Default)]
pub struct SharedOutput(Rc<RefCell<Vec<u8>>>);

impl SharedOutput {
    /// Returns everything written so far.
    pub fn text(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).unwrap()
    }
}

impl Write for SharedOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Console wired to a script plus handles for inspecting it.
pub struct Harness {
    /// Console under test.
    pub console: Console,
    /// Captured output.
    pub output: SharedOutput,
    /// Values read without echo.
    pub secrets: Rc<RefCell<Vec<String>>>,
    /// Number of reads attempted, one per rendered prompt.
    reads: Rc<Cell<usize>>,
}

impl Harness {
    /// Returns how many prompts read input so far.
    pub fn prompts(&self) -> usize {
        self.reads.get()
    }
}

/// Builds a console that answers prompts with `lines` in order.
pub fn harness(lines: &[&str]) -> Harness {
    harness_with_steps(lines.iter().map(|line| Some((*line).to_string())).collect())
}

/// Builds a console from raw steps; `None` injects a read failure.
pub fn harness_with_steps(steps: Vec<Option<String>>) -> Harness {
    let secrets = Rc::new(RefCell::new(Vec::new()));
    let reads = Rc::new(Cell::new(0));
    let output = SharedOutput::default();
    let input = ScriptedInput {
        steps: steps.into(),
        secrets: Rc::clone(&secrets),
        reads: Rc::clone(&reads),
    };
    Harness {
        console: Console::new(Box::new(input), Box::new(output.clone())),
        output,
        secrets,
        reads,
    }
}

// ============================================================================
// SECTION: Workspace Fixtures
// ============================================================================

/// Shared state behind [`FakeWorkspace`] handles.
#[derive(Default)]
struct WorkspaceState {
    /// Existing cluster IDs.
    clusters: RefCell<BTreeSet<String>>,
    /// Existing `catalog.schema` names.
    schemas: RefCell<BTreeSet<String>>,
    /// Service principal listing.
    principals: RefCell<Vec<ServicePrincipal>>,
    /// Error returned by every cluster and schema lookup when set.
    lookup_failure: RefCell<Option<WorkspaceError>>,
    /// Ordered call log.
    calls: RefCell<Vec<String>>,
    /// Stored secrets keyed by `(scope, key)`, base64-encoded.
    secrets: RefCell<BTreeMap<(String, String), String>>,
    /// Captured job definition.
    job: RefCell<Option<JobSettings>>,
}

/// In-memory workspace; clones share state.
#[derive(Clone, Default)]
pub struct FakeWorkspace {
    /// Shared state.
    state: Rc<WorkspaceState>,
}

impl FakeWorkspace {
    /// Adds an existing cluster.
    pub fn with_cluster(self, cluster_id: &str) -> Self {
        self.state.clusters.borrow_mut().insert(cluster_id.to_string());
        self
    }

    /// Adds an existing schema.
    pub fn with_schema(self, catalog: &str, schema: &str) -> Self {
        self.state.schemas.borrow_mut().insert(format!("{catalog}.{schema}"));
        self
    }

    /// Adds a service principal.
    pub fn with_principal(self, display_name: &str, application_id: &str) -> Self {
        self.state.principals.borrow_mut().push(ServicePrincipal {
            id: format!("sp-{application_id}"),
            display_name: display_name.to_string(),
            application_id: application_id.to_string(),
        });
        self
    }

    /// Makes every cluster and schema lookup fail with `error`.
    pub fn fail_lookups(&self, error: WorkspaceError) {
        *self.state.lookup_failure.borrow_mut() = Some(error);
    }

    /// Returns a snapshot of the call log.
    pub fn calls(&self) -> Vec<String> {
        self.state.calls.borrow().clone()
    }

    /// Returns the captured job definition.
    pub fn job(&self) -> Option<JobSettings> {
        self.state.job.borrow().clone()
    }

    /// Appends a call to the log.
    fn log(&self, entry: String) {
        self.state.calls.borrow_mut().push(entry);
    }

    /// Resolves a lookup against `known`.
    fn lookup(&self, known: &RefCell<BTreeSet<String>>, name: &str) -> Result<(), WorkspaceError> {
        if let Some(error) = self.state.lookup_failure.borrow().clone() {
            return Err(error);
        }
        if known.borrow().contains(name) {
            Ok(())
        } else {
            Err(WorkspaceError::NotFound(format!("{name} does not exist")))
        }
    }
}

impl WorkspaceApi for FakeWorkspace {
    fn host(&self) -> &str {
        "https://adb-123.4.azuredatabricks.net"
    }

    fn get_cluster(&self, cluster_id: &str) -> Result<(), WorkspaceError> {
        self.log(format!("cluster {cluster_id}"));
        self.lookup(&self.state.clusters, cluster_id)
    }

    fn get_schema(&self, full_name: &str) -> Result<(), WorkspaceError> {
        self.log(format!("schema {full_name}"));
        self.lookup(&self.state.schemas, full_name)
    }

    fn list_service_principals(&self) -> Result<Vec<ServicePrincipal>, WorkspaceError> {
        self.log("principals".to_string());
        Ok(self.state.principals.borrow().clone())
    }

    fn create_secret_scope(&self, scope: &str) -> Result<(), WorkspaceError> {
        self.log(format!("scope {scope}"));
        Ok(())
    }

    fn put_secret(&self, scope: &str, key: &str, value: &str) -> Result<(), WorkspaceError> {
        self.log(format!("put {scope}/{key}"));
        self.state
            .secrets
            .borrow_mut()
            .insert((scope.to_string(), key.to_string()), STANDARD.encode(value));
        Ok(())
    }

    fn get_secret(&self, scope: &str, key: &str) -> Result<String, WorkspaceError> {
        self.log(format!("get {scope}/{key}"));
        self.state
            .secrets
            .borrow()
            .get(&(scope.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| WorkspaceError::NotFound(key.to_string()))
    }

    fn mkdirs(&self, path: &str) -> Result<(), WorkspaceError> {
        self.log(format!("mkdirs {path}"));
        Ok(())
    }

    fn import_file(&self, request: &ImportRequest) -> Result<(), WorkspaceError> {
        self.log(format!("import {}", request.path));
        Ok(())
    }

    fn create_job(&self, settings: &JobSettings) -> Result<i64, WorkspaceError> {
        self.log(format!("job {}", settings.name));
        *self.state.job.borrow_mut() = Some(settings.clone());
        Ok(4242)
    }
}

/// Connector accepting a single token and handing out a [`FakeWorkspace`].
pub struct FakeConnector {
    /// Workspace returned on success.
    pub workspace: FakeWorkspace,
    /// The only credential that authenticates.
    accepted_token: String,
    /// `(host, token)` pairs presented, in order.
    pub attempts: RefCell<Vec<(String, String)>>,
}

impl FakeConnector {
    /// Creates a connector for `workspace` that accepts `token`.
    pub fn new(workspace: FakeWorkspace, token: &str) -> Self {
        Self {
            workspace,
            accepted_token: token.to_string(),
            attempts: RefCell::new(Vec::new()),
        }
    }
}

impl WorkspaceConnector for FakeConnector {
    fn connect(&self, host: &str, token: &str) -> Result<Box<dyn WorkspaceApi>, WorkspaceError> {
        self.attempts.borrow_mut().push((host.to_string(), token.to_string()));
        if token == self.accepted_token {
            Ok(Box::new(self.workspace.clone()))
        } else {
            Err(WorkspaceError::Unauthorized {
                status: 401,
                message: "Invalid access token.".to_string(),
            })
        }
    }
}

/// Scanner authenticator with a canned outcome.
pub struct FakeAuthenticator {
    /// Outcome of every call.
    outcome: Result<String, ScannerAuthError>,
    /// `(auth_url, client_id)` pairs presented, in order.
    pub calls: RefCell<Vec<(String, String)>>,
}

impl FakeAuthenticator {
    /// Creates an authenticator that always accepts.
    pub fn accepting() -> Self {
        Self::with_outcome(Ok("access-token".to_string()))
    }

    /// Creates an authenticator returning `outcome`.
    pub fn with_outcome(outcome: Result<String, ScannerAuthError>) -> Self {
        Self {
            outcome,
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl ScannerAuthenticator for FakeAuthenticator {
    fn authenticate(
        &self,
        auth_url: &str,
        client_id: &str,
        _client_secret: &str,
    ) -> Result<String, ScannerAuthError> {
        self.calls.borrow_mut().push((auth_url.to_string(), client_id.to_string()));
        self.outcome.clone()
    }
}
