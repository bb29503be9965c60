//! The extension manager's reconciliation model.
//!
//! [`ListModel`] owns the query state and the two published views. Every
//! reconciliation pass fetches search results and the installed listing
//! concurrently, translates each into entries, merges them and publishes both
//! views together under a single notification.
//!
//! Passes may overlap. Each pass is numbered when it starts, and a pass only
//! publishes if no newer pass has started in the meantime, so a slow early
//! pass can never overwrite the results of a later one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::task::{JoinError, JoinHandle};

use crate::backend::Services;
use crate::companion::companion_request;
use crate::entry::{Entry, EntryMap, translate_installed, translate_search};
use crate::error::{Error, Result};
use crate::listing::{ListMode, Listings};
use crate::merge;
use crate::observer::{Listener, ModelEvent, Observers, SubscriptionId};
use crate::pending::PendingActions;
use crate::schema::{Action, ActionOutcome, BuildState, PackageMetadata};

/// Namespace sorted ahead of everything else by default.
pub const DEFAULT_TRUSTED_NAMESPACE: &str = "@jupyterlab";

/// Default number of search results per page.
pub const DEFAULT_PAGE_SIZE: usize = 30;

/// Tunables for a [`ListModel`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelOptions {
    /// Package-name scope sorted first in both views.
    pub trusted_namespace: String,
    /// Initial search page size.
    pub page_size: usize,
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            trusted_namespace: DEFAULT_TRUSTED_NAMESPACE.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Default)]
struct State {
    query: Option<String>,
    page: usize,
    pagination: usize,
    total_entries: usize,
    installed: Arc<Vec<Entry>>,
    search_result: Arc<Vec<Entry>>,
    installed_error: Option<String>,
    search_error: Option<String>,
    server_connection_error: Option<String>,
    initialized: bool,
    prompt_build: bool,
    listings: Listings,
}

struct Inner {
    services: Services,
    options: ModelOptions,
    state: Mutex<State>,
    observers: Observers,
    pending: PendingActions,
    passes: AtomicU64,
    /// Most recent build check; at most one runs at a time.
    build_check: Mutex<Option<JoinHandle<()>>>,
}

#[derive(Default)]
struct SearchOutcome {
    entries: EntryMap,
    /// `None` keeps the previous total (failed search).
    total: Option<usize>,
    error: Option<String>,
}

#[derive(Default)]
struct InstalledOutcome {
    entries: EntryMap,
    error: Option<String>,
    connection_error: Option<String>,
}

/// Reconciles registry search results with installed extensions.
///
/// Cloning is cheap and yields another handle to the same model.
#[derive(Clone)]
pub struct ListModel {
    inner: Arc<Inner>,
}

impl ListModel {
    pub fn new(services: Services, options: ModelOptions) -> Self {
        let observers = Observers::new();
        let state = State {
            pagination: options.page_size,
            ..State::default()
        };
        Self {
            inner: Arc::new(Inner {
                services,
                options,
                state: Mutex::new(state),
                pending: PendingActions::new(observers.clone()),
                observers,
                passes: AtomicU64::new(0),
                build_check: Mutex::new(None),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.inner.state.lock().expect("model state lock poisoned")
    }

    // --- observation ---

    pub fn subscribe(&self, listener: Listener) -> SubscriptionId {
        self.inner.observers.subscribe(listener)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.observers.unsubscribe(id)
    }

    fn notify(&self, event: ModelEvent) {
        self.inner.observers.notify(event);
    }

    // --- published state ---

    pub fn query(&self) -> Option<String> {
        self.state().query.clone()
    }

    pub fn page(&self) -> usize {
        self.state().page
    }

    pub fn pagination(&self) -> usize {
        self.state().pagination
    }

    /// Total number of matches reported by the last successful search.
    pub fn total_entries(&self) -> usize {
        self.state().total_entries
    }

    /// Installed extensions, trusted namespace first.
    pub fn installed(&self) -> Arc<Vec<Entry>> {
        self.state().installed.clone()
    }

    /// Search results with installed entries substituted, trusted namespace first.
    pub fn search_result(&self) -> Arc<Vec<Entry>> {
        self.state().search_result.clone()
    }

    /// Both views as published by the same pass.
    pub fn views(&self) -> (Arc<Vec<Entry>>, Arc<Vec<Entry>>) {
        let state = self.state();
        (state.installed.clone(), state.search_result.clone())
    }

    /// Find an entry by name, preferring the installed view.
    pub fn find(&self, name: &str) -> Option<Entry> {
        let state = self.state();
        state
            .installed
            .iter()
            .chain(state.search_result.iter())
            .find(|e| e.name == name)
            .cloned()
    }

    pub fn installed_error(&self) -> Option<String> {
        self.state().installed_error.clone()
    }

    pub fn search_error(&self) -> Option<String> {
        self.state().search_error.clone()
    }

    pub fn server_connection_error(&self) -> Option<String> {
        self.state().server_connection_error.clone()
    }

    pub fn is_initialized(&self) -> bool {
        self.state().initialized
    }

    /// Whether the server recommends rebuilding the application.
    pub fn prompt_build(&self) -> bool {
        self.state().prompt_build
    }

    pub fn build_available(&self) -> bool {
        self.inner.services.builder.is_available()
    }

    pub fn list_mode(&self) -> ListMode {
        self.state().listings.mode()
    }

    pub fn has_pending_actions(&self) -> bool {
        self.inner.pending.has_pending()
    }

    /// Whether a newer version than the installed one has been published.
    pub fn entry_has_update(&self, entry: &Entry) -> bool {
        entry.has_update()
    }

    pub fn options(&self) -> &ModelOptions {
        &self.inner.options
    }

    // --- query setters ---

    /// Set the search query (`None` disables search) and schedule a pass.
    pub fn set_query(&self, query: Option<String>) -> JoinHandle<()> {
        self.state().query = query;
        self.schedule_update()
    }

    /// Set the zero-based search page and schedule a pass.
    pub fn set_page(&self, page: usize) -> JoinHandle<()> {
        self.state().page = page;
        self.schedule_update()
    }

    /// Set the search page size and schedule a pass.
    pub fn set_pagination(&self, pagination: usize) -> JoinHandle<()> {
        self.state().pagination = pagination;
        self.schedule_update()
    }

    /// Set query, page and page size together without starting a pass.
    ///
    /// The next pass picks them up, e.g. the one [`ListModel::initialize`] runs.
    pub fn set_search_state(&self, query: Option<String>, page: usize, pagination: usize) {
        let mut state = self.state();
        state.query = query;
        state.page = page;
        state.pagination = pagination;
    }

    fn schedule_update(&self) -> JoinHandle<()> {
        let model = self.clone();
        tokio::spawn(async move { model.update(false).await })
    }

    // --- lifecycle ---

    /// Load listings and run the first pass. Never fails; errors end up in
    /// the per-channel error slots.
    pub async fn initialize(&self) {
        match self.inner.services.server.listings().await {
            Ok(listings) => {
                tracing::debug!(mode = ?listings.mode(), "Loaded extension listings");
                self.state().listings = listings;
            }
            Err(e) => tracing::warn!(error = %e, "Failed to load extension listings"),
        }

        self.update(false).await;

        self.state().initialized = true;
        self.notify(ModelEvent::Initialized);
    }

    /// Re-run a pass, bypassing the server's installed-extension cache.
    pub async fn refresh_installed(&self) {
        self.inner.pending.track(self.update(true)).await;
    }

    // --- actions ---

    /// Install or upgrade an extension.
    ///
    /// A fresh install first asks the companion gate; `Ok(None)` means the
    /// user declined and nothing was done. Upgrades skip the gate.
    pub async fn install(&self, entry: &Entry) -> Result<Option<ActionOutcome>> {
        self.state().listings.check_installable(entry)?;

        if !entry.installed {
            match self.check_companion_packages(entry).await {
                Ok(true) => {}
                Ok(false) => {
                    tracing::info!(name = %entry.name, "Install declined");
                    return Ok(None);
                }
                Err(e) => {
                    self.report(Action::Install, &entry.name, &e.to_string());
                    return Err(e);
                }
            }
        }

        self.run_action(Action::Install, entry).await.map(Some)
    }

    pub async fn uninstall(&self, entry: &Entry) -> Result<ActionOutcome> {
        if !entry.installed {
            return Err(Error::NotInstalled(entry.name.clone()));
        }
        self.run_action(Action::Uninstall, entry).await
    }

    pub async fn enable(&self, entry: &Entry) -> Result<ActionOutcome> {
        if entry.enabled {
            return Err(Error::AlreadyEnabled(entry.name.clone()));
        }
        self.run_action(Action::Enable, entry).await
    }

    pub async fn disable(&self, entry: &Entry) -> Result<ActionOutcome> {
        if !entry.enabled {
            return Err(Error::AlreadyDisabled(entry.name.clone()));
        }
        self.run_action(Action::Disable, entry).await
    }

    /// Upgrade every installed extension that has a newer version.
    pub async fn update_all(&self) -> Vec<(String, Result<Option<ActionOutcome>>)> {
        let outdated: Vec<Entry> = self
            .installed()
            .iter()
            .filter(|e| e.has_update())
            .cloned()
            .collect();

        let mut results = Vec::with_capacity(outdated.len());
        for entry in outdated {
            let result = self.install(&entry).await;
            results.push((entry.name, result));
        }
        results
    }

    /// Decide whether installing `entry` may proceed given its companions.
    pub async fn check_companion_packages(&self, entry: &Entry) -> Result<bool> {
        let metadata = self
            .inner
            .services
            .registry
            .package_metadata(&entry.name, &entry.latest_version)
            .await?;
        let Some(discovery) = metadata.as_ref().and_then(PackageMetadata::discovery) else {
            return Ok(true);
        };

        let specs = match discovery.kernel {
            Some(_) => self.inner.services.kernelspecs.kernel_specs().await?,
            None => None,
        };

        match companion_request(&entry.name, &entry.latest_version, discovery, specs.as_deref())? {
            None => Ok(true),
            Some(request) => Ok(self.inner.services.prompt.confirm(&request).await),
        }
    }

    /// Issue `action`, report failures, then reconcile whatever the outcome.
    async fn run_action(&self, action: Action, entry: &Entry) -> Result<ActionOutcome> {
        let result = {
            let _pending = self.inner.pending.begin();
            tracing::info!(%action, name = %entry.name, "Performing extension action");
            self.inner
                .services
                .server
                .perform_action(action, &entry.name)
                .await
        };

        match &result {
            Ok(outcome) => {
                self.state().server_connection_error = None;
                if !outcome.is_ok() {
                    let message = outcome.message.as_deref().unwrap_or("Unknown error");
                    self.report(action, &entry.name, message);
                }
                self.trigger_build_check();
            }
            Err(e) => {
                if e.is_transport() {
                    self.state().server_connection_error = Some(e.to_string());
                }
                self.report(action, &entry.name, &e.to_string());
            }
        }

        self.update(false).await;
        result
    }

    fn report(&self, action: Action, name: &str, message: &str) {
        let title = format!("Error {} extension {}", action.verb(), name);
        self.inner.services.reporter.report(&title, message);
    }

    // --- build ---

    /// Ask the server whether a rebuild is needed.
    ///
    /// Returns `false` without starting a check when build is unavailable, a
    /// recommendation is already pending or another check is still running.
    /// Use [`ListModel::settle_build_check`] to wait for the check.
    pub fn trigger_build_check(&self) -> bool {
        if !self.inner.services.builder.is_available() || self.state().prompt_build {
            return false;
        }

        let mut slot = self.build_check_slot();
        if slot.as_ref().is_some_and(|check| !check.is_finished()) {
            tracing::debug!("Build check already running");
            return false;
        }

        let guard = self.inner.pending.begin();
        let model = self.clone();
        *slot = Some(tokio::spawn(async move {
            let _guard = guard;
            let builder = &model.inner.services.builder;
            match builder.status().await {
                Ok(status) => match status.status {
                    BuildState::Building => {
                        tracing::debug!("Build in progress; attaching to it");
                        if let Err(e) = builder.build().await {
                            model.inner.services.reporter.report("Build failed", &e.to_string());
                        }
                    }
                    BuildState::Needed => {
                        let raised = !std::mem::replace(&mut model.state().prompt_build, true);
                        if raised {
                            model.notify(ModelEvent::BuildPrompt);
                        }
                    }
                    BuildState::Stable | BuildState::Other => {}
                },
                Err(e) => tracing::warn!(error = %e, "Failed to query build status"),
            }
        }));
        true
    }

    /// Wait for the last build check started by this model, if any.
    pub async fn settle_build_check(&self) -> std::result::Result<(), JoinError> {
        let check = self.build_check_slot().take();
        match check {
            Some(check) => check.await,
            None => Ok(()),
        }
    }

    fn build_check_slot(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.inner
            .build_check
            .lock()
            .expect("build check lock poisoned")
    }

    /// Rebuild the application, clearing any pending recommendation.
    pub fn perform_build(&self) -> JoinHandle<()> {
        self.clear_build_prompt();

        let guard = self.inner.pending.begin();
        let model = self.clone();
        tokio::spawn(async move {
            let _guard = guard;
            tracing::info!("Building application");
            if let Err(e) = model.inner.services.builder.build().await {
                model.inner.services.reporter.report("Build failed", &e.to_string());
            }
        })
    }

    /// Cancel a running build.
    pub fn cancel_build(&self) -> JoinHandle<()> {
        let guard = self.inner.pending.begin();
        let model = self.clone();
        tokio::spawn(async move {
            let _guard = guard;
            tracing::info!("Cancelling application build");
            if let Err(e) = model.inner.services.builder.cancel().await {
                model
                    .inner
                    .services
                    .reporter
                    .report("Build cancellation failed", &e.to_string());
            }
        })
    }

    /// Dismiss the build recommendation without building.
    pub fn ignore_build_recommendation(&self) {
        self.clear_build_prompt();
    }

    fn clear_build_prompt(&self) {
        let was_set = std::mem::replace(&mut self.state().prompt_build, false);
        if was_set {
            self.notify(ModelEvent::BuildPrompt);
        }
    }

    // --- reconciliation ---

    async fn update(&self, refresh_installed: bool) {
        let pass = self.inner.passes.fetch_add(1, Ordering::SeqCst) + 1;
        let (query, page, pagination, listings) = {
            let state = self.state();
            (
                state.query.clone(),
                state.page,
                state.pagination,
                state.listings.clone(),
            )
        };
        tracing::debug!(
            pass,
            ?query,
            page,
            pagination,
            refresh_installed,
            "Starting reconciliation pass"
        );

        let (mut search, mut installed) = tokio::join!(
            self.fetch_search(query.as_deref(), page, pagination),
            self.fetch_installed(refresh_installed),
        );

        for entry in search
            .entries
            .values_mut()
            .chain(installed.entries.values_mut())
        {
            listings.annotate(entry);
        }

        let namespace = &self.inner.options.trusted_namespace;
        let installed_view = merge::installed_view(&installed.entries, namespace);
        let search_view = merge::search_view(&search.entries, &installed.entries, namespace);

        {
            let mut state = self.state();
            let latest = self.inner.passes.load(Ordering::SeqCst);
            if latest != pass {
                tracing::debug!(pass, latest, "Discarding superseded reconciliation pass");
                return;
            }
            state.installed = Arc::new(installed_view);
            state.search_result = Arc::new(search_view);
            if let Some(total) = search.total {
                state.total_entries = total;
            }
            state.search_error = search.error;
            state.installed_error = installed.error;
            state.server_connection_error = installed.connection_error;
        }

        tracing::debug!(pass, "Reconciliation pass published");
        self.notify(ModelEvent::Reconciled);
    }

    async fn fetch_search(
        &self,
        query: Option<&str>,
        page: usize,
        pagination: usize,
    ) -> SearchOutcome {
        let Some(query) = query else {
            return SearchOutcome {
                total: Some(0),
                ..SearchOutcome::default()
            };
        };

        let result = self
            .inner
            .services
            .registry
            .search(query, page, pagination)
            .await
            .and_then(|results| Ok((translate_search(&results)?, results.total)));

        match result {
            Ok((entries, total)) => SearchOutcome {
                entries,
                total: Some(total),
                error: None,
            },
            Err(e) => {
                tracing::warn!(error = %e, %query, "Extension search failed");
                SearchOutcome {
                    error: Some(e.to_string()),
                    ..SearchOutcome::default()
                }
            }
        }
    }

    async fn fetch_installed(&self, refresh: bool) -> InstalledOutcome {
        match self.inner.services.server.installed(refresh).await {
            Ok(records) => match translate_installed(records) {
                Ok(entries) => InstalledOutcome {
                    entries,
                    ..InstalledOutcome::default()
                },
                Err(e) => {
                    tracing::warn!(error = %e, "Invalid installed extension listing");
                    InstalledOutcome {
                        error: Some(e.to_string()),
                        ..InstalledOutcome::default()
                    }
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "Failed to query installed extensions");
                let message = e.to_string();
                InstalledOutcome {
                    connection_error: e.is_transport().then(|| message.clone()),
                    error: Some(message),
                    ..InstalledOutcome::default()
                }
            }
        }
    }
}
