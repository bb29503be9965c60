//! End-to-end tests: `ListModel` driving the HTTP clients against a mock
//! JupyterLab server and registry.
//!
//! The companion prompt and the error reporter are the in-memory fakes from
//! `labext-test-utils`; everything else goes over HTTP.

use std::sync::Arc;

use labext_client::{BuildClient, NpmRegistry, ServerClient, ServerConnectionSettings};
use labext_core::{Error, ListModel, ModelOptions, Services};
use labext_test_utils::{RecordingReporter, ScriptedPrompt};
use mockito::{Matcher, Mock, ServerGuard};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

const EXTENSIONS: &str = "/lab/api/extensions";

struct Harness {
    server: ServerGuard,
    prompt: Arc<ScriptedPrompt>,
    reporter: Arc<RecordingReporter>,
}

impl Harness {
    async fn new() -> Self {
        Self {
            server: mockito::Server::new_async().await,
            prompt: Arc::new(ScriptedPrompt::new(true)),
            reporter: Arc::new(RecordingReporter::new()),
        }
    }

    fn model(&self, build_available: bool) -> ListModel {
        let settings = ServerConnectionSettings::new(&self.server.url())
            .unwrap()
            .with_registry_url(&format!("{}/registry", self.server.url()))
            .unwrap();
        let server = Arc::new(ServerClient::new(settings.clone()));
        let services = Services {
            registry: Arc::new(NpmRegistry::new(settings.clone())),
            server: server.clone(),
            builder: Arc::new(BuildClient::new(settings, build_available)),
            kernelspecs: server,
            prompt: self.prompt.clone(),
            reporter: self.reporter.clone(),
        };
        ListModel::new(services, ModelOptions::default())
    }

    async fn mock_installed(&mut self, records: Value, hits: usize) -> Mock {
        self.server
            .mock("GET", EXTENSIONS)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(records.to_string())
            .expect(hits)
            .create_async()
            .await
    }

    async fn mock_search(&mut self, packages: Vec<Value>) -> Mock {
        let total = packages.len();
        let objects: Vec<Value> = packages
            .into_iter()
            .map(|package| json!({ "package": package }))
            .collect();
        self.server
            .mock("GET", "/registry/-/v1/search")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(json!({ "objects": objects, "total": total }).to_string())
            .create_async()
            .await
    }
}

fn record(name: &str, installed: &str, latest: &str) -> Value {
    json!({
        "name": name,
        "description": "",
        "url": "",
        "installed": true,
        "enabled": true,
        "latest_version": latest,
        "installed_version": installed,
        "status": "ok",
        "pkg_type": "prebuilt"
    })
}

fn package(name: &str, version: &str) -> Value {
    json!({
        "name": name,
        "version": version,
        "description": "",
        "keywords": ["jupyterlab-extension"],
        "links": { "npm": format!("https://www.npmjs.com/package/{name}") }
    })
}

// ============================================================================
// Reconciliation
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn test_search_and_installed_reconcile_over_http() {
    let mut h = Harness::new().await;
    let _installed = h
        .mock_installed(json!([record("jupyterlab-drawio", "1.0.0", "2.0.0")]), 2)
        .await;
    let _search = h
        .mock_search(vec![
            package("drawio-extra", "0.1.0"),
            package("jupyterlab-drawio", "2.0.0"),
            package("@jupyterlab/drawio-theme", "1.0.0"),
        ])
        .await;

    let model = h.model(false);
    model.initialize().await;
    model.set_query(Some("drawio".to_string())).await.unwrap();

    let names: Vec<String> = model.search_result().iter().map(|e| e.name.clone()).collect();
    assert_eq!(
        names,
        vec!["@jupyterlab/drawio-theme", "drawio-extra", "jupyterlab-drawio"]
    );
    let drawio = &model.search_result()[2];
    assert!(drawio.installed);
    assert_eq!(drawio.installed_version, "1.0.0");
    assert!(model.entry_has_update(drawio));
    assert_eq!(model.total_entries(), 3);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_installed_failure_isolated_from_search() {
    let mut h = Harness::new().await;
    let _installed = h
        .server
        .mock("GET", EXTENSIONS)
        .match_query(Matcher::Any)
        .with_status(503)
        .create_async()
        .await;
    let _search = h.mock_search(vec![package("jupyterlab-drawio", "2.0.0")]).await;

    let model = h.model(false);
    model.set_query(Some("drawio".to_string())).await.unwrap();

    assert_eq!(
        model.installed_error().as_deref(),
        Some("503 (Service Unavailable)")
    );
    assert_eq!(
        model.server_connection_error().as_deref(),
        Some("503 (Service Unavailable)")
    );
    assert_eq!(model.search_error(), None);
    assert_eq!(model.search_result().len(), 1);
}

// ============================================================================
// Actions
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn test_failed_action_still_reconciles() {
    let mut h = Harness::new().await;
    let installed = h
        .mock_installed(json!([record("@jupyterlab/git", "0.50.0", "0.50.0")]), 2)
        .await;
    let _action = h
        .server
        .mock("POST", EXTENSIONS)
        .with_status(500)
        .create_async()
        .await;

    let model = h.model(false);
    model.initialize().await;
    let entry = model.find("@jupyterlab/git").unwrap();

    let err = model.uninstall(&entry).await.unwrap_err();

    assert!(matches!(err, Error::Transport(ref m) if m == "500 (Internal Server Error)"));
    assert_eq!(
        h.reporter.reports(),
        vec![(
            "Error uninstalling extension @jupyterlab/git".to_string(),
            "500 (Internal Server Error)".to_string()
        )]
    );
    assert!(!model.has_pending_actions());
    installed.assert_async().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_declined_kernel_companion_blocks_install() {
    let mut h = Harness::new().await;
    let _installed = h.mock_installed(json!([]), 1).await;
    let _metadata = h
        .server
        .mock("GET", "/registry/ipywidgets-ext/8.0.0")
        .with_status(200)
        .with_body(
            json!({
                "name": "ipywidgets-ext",
                "version": "8.0.0",
                "jupyterlab": {
                    "discovery": {
                        "kernel": [{
                            "kernel_spec": { "language": "^python" },
                            "base": { "name": "ipywidgets" },
                            "managers": ["pip"]
                        }]
                    }
                }
            })
            .to_string(),
        )
        .create_async()
        .await;
    let _kernels = h
        .server
        .mock("GET", "/api/kernelspecs")
        .with_status(200)
        .with_body(
            json!({
                "default": "python3",
                "kernelspecs": {
                    "python3": {
                        "name": "python3",
                        "spec": { "language": "python", "display_name": "Python 3" }
                    }
                }
            })
            .to_string(),
        )
        .create_async()
        .await;
    let action = h
        .server
        .mock("POST", EXTENSIONS)
        .expect(0)
        .create_async()
        .await;
    h.prompt.set_answer(false);

    let model = h.model(false);
    model.initialize().await;
    let entry = labext_core::Entry::from_registry(
        &serde_json::from_value(package("ipywidgets-ext", "8.0.0")).unwrap(),
    )
    .unwrap();

    let outcome = model.install(&entry).await.unwrap();

    assert_eq!(outcome, None);
    let requests = h.prompt.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].kernel_companions[0].kernels[0].name, "python3");
    action.assert_async().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_blocked_extension_is_never_posted() {
    let mut h = Harness::new().await;
    let _installed = h.mock_installed(json!([]), 2).await;
    let _listings = h
        .server
        .mock(
            "GET",
            "/lab/api/listings/@jupyterlab/extensionmanager-extension/listings.json",
        )
        .with_status(200)
        .with_body(
            json!({
                "blocked_extensions": [{ "name": "bad-ext", "reason": "known issue" }]
            })
            .to_string(),
        )
        .create_async()
        .await;
    let _search = h.mock_search(vec![package("bad-ext", "1.0.0")]).await;
    let action = h
        .server
        .mock("POST", EXTENSIONS)
        .expect(0)
        .create_async()
        .await;

    let model = h.model(false);
    model.initialize().await;
    model.set_query(Some("bad".to_string())).await.unwrap();
    let entry = model.find("bad-ext").unwrap();
    assert!(entry.blocked_entry.is_some());

    let err = model.install(&entry).await.unwrap_err();

    assert!(matches!(err, Error::Blocked { .. }));
    action.assert_async().await;
}

// ============================================================================
// Build
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn test_successful_action_raises_build_prompt() {
    let mut h = Harness::new().await;
    let _installed = h
        .mock_installed(json!([record("@jupyterlab/git", "0.50.0", "0.50.0")]), 2)
        .await;
    let _action = h
        .server
        .mock("POST", EXTENSIONS)
        .with_status(200)
        .with_body(json!({ "status": "ok" }).to_string())
        .create_async()
        .await;
    let _build = h
        .server
        .mock("GET", "/lab/api/build")
        .with_status(200)
        .with_body(json!({ "status": "needed", "message": "" }).to_string())
        .create_async()
        .await;

    let model = h.model(true);
    model.initialize().await;
    let entry = model.find("@jupyterlab/git").unwrap();
    model.disable(&entry).await.unwrap();

    while model.has_pending_actions() {
        tokio::task::yield_now().await;
    }
    assert!(model.prompt_build());
}
