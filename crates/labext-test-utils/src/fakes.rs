//! In-memory collaborators that record their calls.
//!
//! Each fake can be told to fail, and [`FakeServer`], [`FakeRegistry`] and
//! [`FakeBuilder`] can hold requests open until the test releases them, which
//! is how tests observe the model while an action, search or build is in
//! flight.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use labext_core::schema::{
    Action, ActionOutcome, BuildState, BuildStatus, InstalledRecord, KernelSpec, PackageMetadata,
    SearchPage,
};
use labext_core::{
    BuildService, CompanionPrompt, CompanionRequest, Error, ErrorReporter, ExtensionServer,
    KernelSpecSource, ListModel, Listings, ModelOptions, RegistrySearch, Result, Services,
};
use tokio::sync::Semaphore;

/// A failure a fake should produce instead of its configured data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// Transport failure with the given status text, e.g. `"500 (Internal Server Error)"`.
    Transport(String),
    /// Response body that does not match its schema.
    Schema(String),
}

impl Failure {
    pub fn server_error() -> Self {
        Self::Transport("500 (Internal Server Error)".to_string())
    }

    fn to_error(&self, what: &str) -> Error {
        match self {
            Self::Transport(message) => Error::Transport(message.clone()),
            Self::Schema(reason) => Error::schema(what, reason.clone()),
        }
    }
}

/// Wait for a permit from `gate` if one is configured.
async fn pass_gate(gate: Option<Arc<Semaphore>>) {
    if let Some(gate) = gate {
        if let Ok(permit) = gate.acquire().await {
            permit.forget();
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().expect("fake lock poisoned")
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Registry serving a fixed page per query.
#[derive(Debug, Default)]
pub struct FakeRegistry {
    pages: Mutex<HashMap<String, SearchPage>>,
    metadata: Mutex<HashMap<String, PackageMetadata>>,
    failure: Mutex<Option<Failure>>,
    metadata_failure: Mutex<Option<Failure>>,
    gates: Mutex<HashMap<String, Arc<Semaphore>>>,
    search_calls: Mutex<Vec<(String, usize, usize)>>,
    metadata_calls: Mutex<Vec<(String, String)>>,
}

impl FakeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `page` for `query`. Unknown queries get an empty page.
    pub fn set_page(&self, query: &str, page: SearchPage) {
        lock(&self.pages).insert(query.to_string(), page);
    }

    /// Serve `metadata` for package `name` at any version.
    pub fn set_metadata(&self, name: &str, metadata: PackageMetadata) {
        lock(&self.metadata).insert(name.to_string(), metadata);
    }

    pub fn fail_with(&self, failure: Option<Failure>) {
        *lock(&self.failure) = failure;
    }

    pub fn fail_metadata_with(&self, failure: Option<Failure>) {
        *lock(&self.metadata_failure) = failure;
    }

    /// Hold searches for `query` until permits are added to the returned gate.
    pub fn hold_search(&self, query: &str) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        lock(&self.gates).insert(query.to_string(), gate.clone());
        gate
    }

    pub fn search_calls(&self) -> Vec<(String, usize, usize)> {
        lock(&self.search_calls).clone()
    }

    pub fn metadata_calls(&self) -> Vec<(String, String)> {
        lock(&self.metadata_calls).clone()
    }
}

#[async_trait]
impl RegistrySearch for FakeRegistry {
    async fn search(&self, query: &str, page: usize, page_size: usize) -> Result<SearchPage> {
        lock(&self.search_calls).push((query.to_string(), page, page_size));
        let gate = lock(&self.gates).get(query).cloned();
        pass_gate(gate).await;

        if let Some(failure) = lock(&self.failure).as_ref() {
            return Err(failure.to_error("search result"));
        }
        Ok(lock(&self.pages).get(query).cloned().unwrap_or_default())
    }

    async fn package_metadata(
        &self,
        name: &str,
        version: &str,
    ) -> Result<Option<PackageMetadata>> {
        lock(&self.metadata_calls).push((name.to_string(), version.to_string()));
        if let Some(failure) = lock(&self.metadata_failure).as_ref() {
            return Err(failure.to_error("package metadata"));
        }
        Ok(lock(&self.metadata).get(name).cloned())
    }
}

// ---------------------------------------------------------------------------
// Extension server
// ---------------------------------------------------------------------------

/// Extension server with a mutable installed listing.
#[derive(Debug, Default)]
pub struct FakeServer {
    installed: Mutex<Vec<InstalledRecord>>,
    listings: Mutex<Listings>,
    failure: Mutex<Option<Failure>>,
    action_failure: Mutex<Option<Failure>>,
    outcomes: Mutex<HashMap<String, ActionOutcome>>,
    action_gate: Mutex<Option<Arc<Semaphore>>>,
    installed_gate: Mutex<Option<Arc<Semaphore>>>,
    installed_calls: Mutex<Vec<bool>>,
    action_calls: Mutex<Vec<(Action, String)>>,
}

impl FakeServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_installed(&self, records: Vec<InstalledRecord>) {
        *lock(&self.installed) = records;
    }

    pub fn set_listings(&self, listings: Listings) {
        *lock(&self.listings) = listings;
    }

    /// Make the installed query fail.
    pub fn fail_with(&self, failure: Option<Failure>) {
        *lock(&self.failure) = failure;
    }

    /// Make every action fail.
    pub fn fail_actions_with(&self, failure: Option<Failure>) {
        *lock(&self.action_failure) = failure;
    }

    /// Respond to actions on `name` with `outcome` instead of `ok`.
    pub fn set_outcome(&self, name: &str, outcome: ActionOutcome) {
        lock(&self.outcomes).insert(name.to_string(), outcome);
    }

    /// Hold actions until permits are added to the returned gate.
    pub fn hold_actions(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *lock(&self.action_gate) = Some(gate.clone());
        gate
    }

    /// Hold installed queries until permits are added to the returned gate.
    pub fn hold_installed(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *lock(&self.installed_gate) = Some(gate.clone());
        gate
    }

    pub fn installed_calls(&self) -> Vec<bool> {
        lock(&self.installed_calls).clone()
    }

    pub fn action_calls(&self) -> Vec<(Action, String)> {
        lock(&self.action_calls).clone()
    }
}

#[async_trait]
impl ExtensionServer for FakeServer {
    async fn installed(&self, refresh: bool) -> Result<Vec<InstalledRecord>> {
        lock(&self.installed_calls).push(refresh);
        let gate = lock(&self.installed_gate).clone();
        pass_gate(gate).await;

        if let Some(failure) = lock(&self.failure).as_ref() {
            return Err(failure.to_error("installed list"));
        }
        Ok(lock(&self.installed).clone())
    }

    async fn perform_action(&self, action: Action, extension_name: &str) -> Result<ActionOutcome> {
        lock(&self.action_calls).push((action, extension_name.to_string()));
        let gate = lock(&self.action_gate).clone();
        pass_gate(gate).await;

        if let Some(failure) = lock(&self.action_failure).as_ref() {
            return Err(failure.to_error("action response"));
        }
        Ok(lock(&self.outcomes)
            .get(extension_name)
            .cloned()
            .unwrap_or_else(ActionOutcome::ok))
    }

    async fn listings(&self) -> Result<Listings> {
        Ok(lock(&self.listings).clone())
    }
}

// ---------------------------------------------------------------------------
// Build, kernels, prompt, reporter
// ---------------------------------------------------------------------------

/// Build service reporting a configurable status.
#[derive(Debug)]
pub struct FakeBuilder {
    available: bool,
    status: Mutex<BuildState>,
    failure: Mutex<Option<Failure>>,
    gate: Mutex<Option<Arc<Semaphore>>>,
    status_calls: Mutex<usize>,
    build_calls: Mutex<usize>,
    cancel_calls: Mutex<usize>,
}

impl FakeBuilder {
    pub fn new(available: bool) -> Self {
        Self {
            available,
            status: Mutex::new(BuildState::Stable),
            failure: Mutex::new(None),
            gate: Mutex::new(None),
            status_calls: Mutex::new(0),
            build_calls: Mutex::new(0),
            cancel_calls: Mutex::new(0),
        }
    }

    pub fn set_status(&self, status: BuildState) {
        *lock(&self.status) = status;
    }

    /// Make status, build and cancel requests fail.
    pub fn fail_with(&self, failure: Option<Failure>) {
        *lock(&self.failure) = failure;
    }

    /// Hold status, build and cancel requests until permits are added to
    /// the returned gate. Each request takes one permit.
    pub fn hold_requests(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *lock(&self.gate) = Some(gate.clone());
        gate
    }

    async fn respond(&self, what: &str) -> Result<()> {
        let gate = lock(&self.gate).clone();
        pass_gate(gate).await;
        match lock(&self.failure).as_ref() {
            Some(failure) => Err(failure.to_error(what)),
            None => Ok(()),
        }
    }

    pub fn status_calls(&self) -> usize {
        *lock(&self.status_calls)
    }

    pub fn build_calls(&self) -> usize {
        *lock(&self.build_calls)
    }

    pub fn cancel_calls(&self) -> usize {
        *lock(&self.cancel_calls)
    }
}

#[async_trait]
impl BuildService for FakeBuilder {
    fn is_available(&self) -> bool {
        self.available
    }

    async fn status(&self) -> Result<BuildStatus> {
        *lock(&self.status_calls) += 1;
        self.respond("build status").await?;
        Ok(BuildStatus {
            status: lock(&self.status).clone(),
            message: None,
        })
    }

    async fn build(&self) -> Result<()> {
        *lock(&self.build_calls) += 1;
        self.respond("build response").await?;
        *lock(&self.status) = BuildState::Stable;
        Ok(())
    }

    async fn cancel(&self) -> Result<()> {
        *lock(&self.cancel_calls) += 1;
        self.respond("build response").await
    }
}

/// Kernel spec source with a fixed answer.
#[derive(Debug, Default)]
pub struct FakeKernelSpecs {
    specs: Mutex<Option<Vec<KernelSpec>>>,
}

impl FakeKernelSpecs {
    pub fn new(specs: Option<Vec<KernelSpec>>) -> Self {
        Self {
            specs: Mutex::new(specs),
        }
    }

    pub fn set_specs(&self, specs: Option<Vec<KernelSpec>>) {
        *lock(&self.specs) = specs;
    }
}

#[async_trait]
impl KernelSpecSource for FakeKernelSpecs {
    async fn kernel_specs(&self) -> Result<Option<Vec<KernelSpec>>> {
        Ok(lock(&self.specs).clone())
    }
}

/// Companion prompt answering with a fixed decision.
#[derive(Debug)]
pub struct ScriptedPrompt {
    answer: Mutex<bool>,
    requests: Mutex<Vec<CompanionRequest>>,
}

impl ScriptedPrompt {
    pub fn new(answer: bool) -> Self {
        Self {
            answer: Mutex::new(answer),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn set_answer(&self, answer: bool) {
        *lock(&self.answer) = answer;
    }

    pub fn requests(&self) -> Vec<CompanionRequest> {
        lock(&self.requests).clone()
    }
}

#[async_trait]
impl CompanionPrompt for ScriptedPrompt {
    async fn confirm(&self, request: &CompanionRequest) -> bool {
        lock(&self.requests).push(request.clone());
        *lock(&self.answer)
    }
}

/// Reporter that keeps `(title, message)` pairs.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    reports: Mutex<Vec<(String, String)>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<(String, String)> {
        lock(&self.reports).clone()
    }
}

impl ErrorReporter for RecordingReporter {
    fn report(&self, title: &str, message: &str) {
        lock(&self.reports).push((title.to_string(), message.to_string()));
    }
}

// ---------------------------------------------------------------------------
// Bundle
// ---------------------------------------------------------------------------

/// One of each fake, wired into [`Services`].
///
/// # Example
///
/// ```rust,no_run
/// use labext_test_utils::TestServices;
/// use labext_test_utils::fixtures::installed_record;
///
/// # async fn demo() {
/// let fakes = TestServices::new();
/// fakes.server.set_installed(vec![installed_record("@jupyterlab/git", "0.50.0")]);
/// let model = fakes.model();
/// model.initialize().await;
/// assert_eq!(model.installed().len(), 1);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TestServices {
    pub registry: Arc<FakeRegistry>,
    pub server: Arc<FakeServer>,
    pub builder: Arc<FakeBuilder>,
    pub kernelspecs: Arc<FakeKernelSpecs>,
    pub prompt: Arc<ScriptedPrompt>,
    pub reporter: Arc<RecordingReporter>,
}

impl Default for TestServices {
    fn default() -> Self {
        Self::new()
    }
}

impl TestServices {
    /// Fakes with build unavailable, no kernels and a prompt that approves.
    pub fn new() -> Self {
        Self {
            registry: Arc::new(FakeRegistry::new()),
            server: Arc::new(FakeServer::new()),
            builder: Arc::new(FakeBuilder::new(false)),
            kernelspecs: Arc::new(FakeKernelSpecs::default()),
            prompt: Arc::new(ScriptedPrompt::new(true)),
            reporter: Arc::new(RecordingReporter::new()),
        }
    }

    /// Replace the build service with one that is available.
    pub fn with_build(mut self) -> Self {
        self.builder = Arc::new(FakeBuilder::new(true));
        self
    }

    pub fn services(&self) -> Services {
        Services {
            registry: self.registry.clone(),
            server: self.server.clone(),
            builder: self.builder.clone(),
            kernelspecs: self.kernelspecs.clone(),
            prompt: self.prompt.clone(),
            reporter: self.reporter.clone(),
        }
    }

    /// A model over these fakes with default options.
    pub fn model(&self) -> ListModel {
        ListModel::new(self.services(), ModelOptions::default())
    }
}
