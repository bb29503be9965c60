//! Behavioural tests for `ListModel` over in-memory collaborators.

use std::sync::{Arc, Mutex};

use labext_core::schema::{ActionOutcome, ActionStatus, BuildState};
use labext_core::{Action, Error, ListMode, ListModel, Listings, ListingEntry, ModelEvent};
use labext_test_utils::fixtures::{
    deprecated_package, installed_entry, installed_record, kernel_companion_metadata, kernel_spec,
    plain_metadata, registry_package, search_entry, search_page, server_companion_metadata,
};
use labext_test_utils::{Failure, TestServices};
use pretty_assertions::assert_eq;
use rstest::rstest;
use tokio::task::JoinHandle;

fn names(entries: &[labext_core::Entry]) -> Vec<&str> {
    entries.iter().map(|e| e.name.as_str()).collect()
}

fn record_events(model: &ListModel) -> Arc<Mutex<Vec<ModelEvent>>> {
    let events = Arc::new(Mutex::new(Vec::<ModelEvent>::new()));
    let sink = events.clone();
    model.subscribe(Arc::new(move |event: ModelEvent| {
        sink.lock().unwrap().push(event)
    }));
    events
}

async fn wait_until(mut condition: impl FnMut() -> bool) {
    while !condition() {
        tokio::task::yield_now().await;
    }
}

// ============================================================================
// Reconciliation
// ============================================================================

#[tokio::test]
async fn test_installed_entry_replaces_registry_entry_in_search() {
    let fakes = TestServices::new();
    fakes
        .registry
        .set_page("git", search_page(vec![registry_package("A", "2.0.0")]));
    let mut record = installed_record("A", "1.0.0");
    record.latest_version = "2.0.0".to_string();
    fakes.server.set_installed(vec![record]);

    let model = fakes.model();
    model.set_query(Some("git".to_string())).await.unwrap();

    let (installed, search) = model.views();
    assert_eq!(names(&installed), vec!["A"]);
    assert_eq!(names(&search), vec!["A"]);
    assert_eq!(search[0], installed[0]);
    assert_eq!(search[0].installed_version, "1.0.0");
    assert!(search[0].installed);
    assert!(model.entry_has_update(&search[0]));
}

#[tokio::test]
async fn test_trusted_namespace_sorted_first_in_both_views() {
    let fakes = TestServices::new();
    fakes.registry.set_page(
        "toc",
        search_page(vec![
            registry_package("zeta-toc", "1.0.0"),
            registry_package("alpha-toc", "1.0.0"),
            registry_package("@jupyterlab/toc", "1.0.0"),
        ]),
    );
    fakes.server.set_installed(vec![
        installed_record("local-ext", "0.1.0"),
        installed_record("@jupyterlab/git", "0.50.0"),
    ]);

    let model = fakes.model();
    model.set_query(Some("toc".to_string())).await.unwrap();

    assert_eq!(
        names(&model.search_result()),
        vec!["@jupyterlab/toc", "zeta-toc", "alpha-toc"]
    );
    assert_eq!(
        names(&model.installed()),
        vec!["@jupyterlab/git", "local-ext"]
    );
}

#[tokio::test]
async fn test_deprecated_packages_never_listed() {
    let fakes = TestServices::new();
    fakes.registry.set_page(
        "widgets",
        search_page(vec![
            registry_package("widgets-new", "2.0.0"),
            deprecated_package("widgets-old", "1.0.0"),
        ]),
    );

    let model = fakes.model();
    model.set_query(Some("widgets".to_string())).await.unwrap();

    assert_eq!(names(&model.search_result()), vec!["widgets-new"]);
    assert_eq!(model.total_entries(), 2);
}

#[tokio::test]
async fn test_null_query_skips_registry() {
    let fakes = TestServices::new();
    fakes
        .registry
        .set_page("git", search_page(vec![registry_package("git-ext", "1.0.0")]));

    let model = fakes.model();
    model.set_query(Some("git".to_string())).await.unwrap();
    assert_eq!(model.total_entries(), 1);

    fakes.registry.fail_with(Some(Failure::server_error()));
    model.set_query(Some("git".to_string())).await.unwrap();
    assert!(model.search_error().is_some());

    model.set_query(None).await.unwrap();
    assert!(model.search_result().is_empty());
    assert_eq!(model.total_entries(), 0);
    assert_eq!(model.search_error(), None);
    assert_eq!(fakes.registry.search_calls().len(), 2);
}

#[tokio::test]
async fn test_setters_pass_query_state_to_registry() {
    let fakes = TestServices::new();
    let model = fakes.model();
    assert_eq!(model.pagination(), 30);

    model.set_query(Some("lsp".to_string())).await.unwrap();
    model.set_page(2).await.unwrap();
    model.set_pagination(10).await.unwrap();
    // Same value again still triggers a pass.
    model.set_pagination(10).await.unwrap();

    assert_eq!(
        fakes.registry.search_calls(),
        vec![
            ("lsp".to_string(), 0, 30),
            ("lsp".to_string(), 2, 30),
            ("lsp".to_string(), 2, 10),
            ("lsp".to_string(), 2, 10),
        ]
    );
    assert_eq!(fakes.server.installed_calls().len(), 4);
}

#[tokio::test]
async fn test_search_state_applies_to_the_next_pass_only() {
    let fakes = TestServices::new();
    let model = fakes.model();

    model.set_search_state(Some("lsp".to_string()), 3, 5);
    assert!(fakes.registry.search_calls().is_empty());
    model.initialize().await;

    assert_eq!(
        fakes.registry.search_calls(),
        vec![("lsp".to_string(), 3, 5)]
    );
    assert_eq!(fakes.server.installed_calls().len(), 1);
    assert_eq!(model.query().as_deref(), Some("lsp"));
    assert_eq!(model.page(), 3);
    assert_eq!(model.pagination(), 5);
}

#[tokio::test]
async fn test_one_notification_per_pass() {
    let fakes = TestServices::new();
    fakes
        .registry
        .set_page("git", search_page(vec![registry_package("git-ext", "1.0.0")]));
    fakes
        .server
        .set_installed(vec![installed_record("other", "1.0.0")]);

    let model = fakes.model();
    let events = record_events(&model);
    model.set_query(Some("git".to_string())).await.unwrap();

    assert_eq!(*events.lock().unwrap(), vec![ModelEvent::Reconciled]);
}

#[tokio::test]
async fn test_snapshots_are_replaced_not_mutated() {
    let fakes = TestServices::new();
    fakes
        .server
        .set_installed(vec![installed_record("first", "1.0.0")]);
    let model = fakes.model();
    model.initialize().await;
    let before = model.installed();

    fakes
        .server
        .set_installed(vec![installed_record("second", "1.0.0")]);
    model.refresh_installed().await;

    assert_eq!(names(&before), vec!["first"]);
    assert_eq!(names(&model.installed()), vec!["second"]);
    assert_eq!(fakes.server.installed_calls(), vec![false, true]);
}

// ============================================================================
// Error isolation
// ============================================================================

#[tokio::test]
async fn test_installed_failure_leaves_search_error_untouched() {
    let fakes = TestServices::new();
    fakes
        .registry
        .set_page("git", search_page(vec![registry_package("git-ext", "1.0.0")]));
    fakes.registry.fail_with(Some(Failure::Transport(
        "503 (Service Unavailable)".to_string(),
    )));

    let model = fakes.model();
    model.set_query(Some("git".to_string())).await.unwrap();
    assert_eq!(model.search_error().as_deref(), Some("503 (Service Unavailable)"));
    assert_eq!(model.installed_error(), None);

    fakes.server.fail_with(Some(Failure::server_error()));
    model.set_query(Some("git".to_string())).await.unwrap();

    assert_eq!(
        model.installed_error().as_deref(),
        Some("500 (Internal Server Error)")
    );
    assert_eq!(model.search_error().as_deref(), Some("503 (Service Unavailable)"));
    assert_eq!(
        model.server_connection_error().as_deref(),
        Some("500 (Internal Server Error)")
    );
    assert!(model.installed().is_empty());
}

#[tokio::test]
async fn test_search_failure_keeps_installed_view() {
    let fakes = TestServices::new();
    fakes.registry.fail_with(Some(Failure::server_error()));
    fakes
        .server
        .set_installed(vec![installed_record("@jupyterlab/git", "0.50.0")]);

    let model = fakes.model();
    model.set_query(Some("git".to_string())).await.unwrap();

    assert!(model.search_result().is_empty());
    assert!(model.search_error().is_some());
    assert_eq!(model.installed_error(), None);
    assert_eq!(names(&model.installed()), vec!["@jupyterlab/git"]);
}

#[tokio::test]
async fn test_schema_failure_is_not_a_connection_error() {
    let fakes = TestServices::new();
    fakes
        .server
        .fail_with(Some(Failure::Schema("missing field `enabled`".to_string())));

    let model = fakes.model();
    model.initialize().await;

    assert!(model.installed_error().unwrap().contains("missing field"));
    assert_eq!(model.server_connection_error(), None);
}

#[tokio::test]
async fn test_channel_error_cleared_on_next_success() {
    let fakes = TestServices::new();
    fakes.server.fail_with(Some(Failure::server_error()));
    let model = fakes.model();
    model.initialize().await;
    assert!(model.installed_error().is_some());

    fakes.server.fail_with(None);
    model.refresh_installed().await;
    assert_eq!(model.installed_error(), None);
    assert_eq!(model.server_connection_error(), None);
}

// ============================================================================
// Overlapping passes
// ============================================================================

#[tokio::test]
async fn test_superseded_pass_does_not_overwrite_newer_results() {
    let fakes = TestServices::new();
    fakes
        .registry
        .set_page("slow", search_page(vec![registry_package("slow-ext", "1.0.0")]));
    fakes
        .registry
        .set_page("fast", search_page(vec![registry_package("fast-ext", "1.0.0")]));
    let gate = fakes.registry.hold_search("slow");

    let model = fakes.model();
    let slow = model.set_query(Some("slow".to_string()));
    wait_until(|| fakes.registry.search_calls().len() == 1).await;

    model.set_query(Some("fast".to_string())).await.unwrap();
    assert_eq!(names(&model.search_result()), vec!["fast-ext"]);

    gate.add_permits(1);
    slow.await.unwrap();
    assert_eq!(names(&model.search_result()), vec!["fast-ext"]);
    assert_eq!(model.query().as_deref(), Some("fast"));
}

// ============================================================================
// Initialization
// ============================================================================

#[tokio::test]
async fn test_initialize_marks_initialized_even_on_failure() {
    let fakes = TestServices::new();
    fakes.server.fail_with(Some(Failure::server_error()));
    let model = fakes.model();
    let events = record_events(&model);
    assert!(!model.is_initialized());

    model.initialize().await;

    assert!(model.is_initialized());
    assert!(events.lock().unwrap().contains(&ModelEvent::Initialized));
    assert!(model.installed_error().is_some());
}

#[tokio::test]
async fn test_initialize_loads_listings() {
    let fakes = TestServices::new();
    fakes.server.set_listings(Listings {
        blocked_extensions: vec![ListingEntry {
            name: "bad-ext".to_string(),
            reason: "known malware".to_string(),
            creation_date: None,
            last_update_date: None,
        }],
        ..Listings::default()
    });
    fakes
        .registry
        .set_page("ext", search_page(vec![registry_package("bad-ext", "1.0.0")]));

    let model = fakes.model();
    model.initialize().await;
    assert_eq!(model.list_mode(), ListMode::Block);

    model.set_query(Some("ext".to_string())).await.unwrap();
    let bad = model.find("bad-ext").unwrap();
    assert_eq!(bad.blocked_entry.unwrap().reason, "known malware");

    let err = model.install(&search_entry("bad-ext", "1.0.0")).await.unwrap_err();
    assert!(matches!(err, Error::Blocked { .. }));
    assert!(fakes.server.action_calls().is_empty());
    assert!(fakes.registry.metadata_calls().is_empty());
}

// ============================================================================
// Preconditions
// ============================================================================

#[tokio::test]
async fn test_uninstall_not_installed_fails_before_request() {
    let fakes = TestServices::new();
    let model = fakes.model();

    let err = model
        .uninstall(&search_entry("ghost", "1.0.0"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::NotInstalled(ref name) if name == "ghost"));
    assert!(fakes.server.action_calls().is_empty());
    assert!(fakes.server.installed_calls().is_empty());
}

#[tokio::test]
async fn test_enable_disable_in_target_state_fail_before_request() {
    let fakes = TestServices::new();
    let model = fakes.model();
    let enabled = installed_entry("on", "1.0.0", "1.0.0");
    let mut disabled = installed_entry("off", "1.0.0", "1.0.0");
    disabled.enabled = false;

    assert!(matches!(
        model.enable(&enabled).await,
        Err(Error::AlreadyEnabled(_))
    ));
    assert!(matches!(
        model.disable(&disabled).await,
        Err(Error::AlreadyDisabled(_))
    ));
    assert!(fakes.server.action_calls().is_empty());
}

// ============================================================================
// Actions
// ============================================================================

#[tokio::test]
async fn test_actions_issue_command_and_reconcile() {
    let fakes = TestServices::new();
    let model = fakes.model();
    let entry = installed_entry("ext", "1.0.0", "1.0.0");
    let mut disabled = entry.clone();
    disabled.enabled = false;

    assert!(model.uninstall(&entry).await.unwrap().is_ok());
    assert!(model.disable(&entry).await.unwrap().is_ok());
    assert!(model.enable(&disabled).await.unwrap().is_ok());

    assert_eq!(
        fakes.server.action_calls(),
        vec![
            (Action::Uninstall, "ext".to_string()),
            (Action::Disable, "ext".to_string()),
            (Action::Enable, "ext".to_string()),
        ]
    );
    assert_eq!(fakes.server.installed_calls().len(), 3);
}

#[tokio::test]
async fn test_fresh_install_without_discovery_is_approved() {
    let fakes = TestServices::new();
    fakes.registry.set_metadata("plain-ext", plain_metadata());
    let model = fakes.model();

    let outcome = model.install(&search_entry("plain-ext", "3.1.0")).await.unwrap();

    assert!(outcome.unwrap().is_ok());
    assert_eq!(
        fakes.registry.metadata_calls(),
        vec![("plain-ext".to_string(), "3.1.0".to_string())]
    );
    assert!(fakes.prompt.requests().is_empty());
    assert_eq!(
        fakes.server.action_calls(),
        vec![(Action::Install, "plain-ext".to_string())]
    );
}

#[tokio::test]
async fn test_install_without_published_metadata_is_approved() {
    let fakes = TestServices::new();
    let model = fakes.model();

    model.install(&search_entry("unpublished", "0.0.1")).await.unwrap();

    assert_eq!(fakes.server.action_calls().len(), 1);
}

#[tokio::test]
async fn test_upgrade_skips_companion_gate() {
    let fakes = TestServices::new();
    fakes
        .registry
        .set_metadata("ext", server_companion_metadata("ext-server"));
    fakes.prompt.set_answer(false);
    let model = fakes.model();

    let outcome = model
        .install(&installed_entry("ext", "1.0.0", "2.0.0"))
        .await
        .unwrap();

    assert!(outcome.is_some());
    assert!(fakes.registry.metadata_calls().is_empty());
    assert!(fakes.prompt.requests().is_empty());
    assert_eq!(
        fakes.server.action_calls(),
        vec![(Action::Install, "ext".to_string())]
    );
}

#[tokio::test]
async fn test_declined_companion_prompt_prevents_install() {
    let fakes = TestServices::new();
    fakes
        .registry
        .set_metadata("ext", server_companion_metadata("ext-server"));
    fakes.prompt.set_answer(false);
    let model = fakes.model();

    let outcome = model.install(&search_entry("ext", "1.0.0")).await.unwrap();

    assert_eq!(outcome, None);
    assert_eq!(fakes.prompt.requests().len(), 1);
    assert!(fakes.server.action_calls().is_empty());
}

#[tokio::test]
async fn test_kernel_companions_presented_with_matches() {
    let fakes = TestServices::new();
    fakes
        .registry
        .set_metadata("widgets", kernel_companion_metadata("^python", "ipywidgets"));
    fakes.kernelspecs.set_specs(Some(vec![
        kernel_spec("python3", "python", "Python 3"),
        kernel_spec("ir", "R", "R"),
    ]));
    let model = fakes.model();

    model.install(&search_entry("widgets", "8.0.0")).await.unwrap();

    let requests = fakes.prompt.requests();
    assert_eq!(requests.len(), 1);
    let companions = &requests[0].kernel_companions;
    assert_eq!(companions.len(), 1);
    assert_eq!(companions[0].kernels.len(), 1);
    assert_eq!(companions[0].kernels[0].name, "python3");
    assert_eq!(fakes.server.action_calls().len(), 1);
}

#[tokio::test]
async fn test_kernel_rule_without_specs_reports_and_aborts() {
    let fakes = TestServices::new();
    fakes
        .registry
        .set_metadata("widgets", kernel_companion_metadata("^python", "ipywidgets"));
    let model = fakes.model();

    let err = model
        .install(&search_entry("widgets", "8.0.0"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::NoKernelSpecs));
    assert!(fakes.server.action_calls().is_empty());
    assert_eq!(fakes.reporter.reports().len(), 1);
}

#[tokio::test]
async fn test_non_ok_status_is_reported_not_raised() {
    let fakes = TestServices::new();
    fakes.server.set_outcome(
        "broken",
        ActionOutcome {
            status: Some(ActionStatus::Error),
            message: Some("npm ERR! 404".to_string()),
        },
    );
    let model = fakes.model();

    let outcome = model
        .uninstall(&installed_entry("broken", "1.0.0", "1.0.0"))
        .await
        .unwrap();

    assert!(!outcome.is_ok());
    assert_eq!(
        fakes.reporter.reports(),
        vec![(
            "Error uninstalling extension broken".to_string(),
            "npm ERR! 404".to_string()
        )]
    );
    assert_eq!(fakes.server.installed_calls().len(), 1);
}

#[tokio::test]
async fn test_http_500_on_action_raises_status_and_still_reconciles() {
    let fakes = TestServices::new();
    fakes.server.fail_actions_with(Some(Failure::server_error()));
    let model = fakes.model();

    let err = model
        .uninstall(&installed_entry("ext", "1.0.0", "1.0.0"))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "500 (Internal Server Error)");
    assert_eq!(fakes.server.installed_calls().len(), 1);
    assert_eq!(fakes.reporter.reports().len(), 1);
    assert!(!model.has_pending_actions());
}

#[tokio::test]
async fn test_update_all_upgrades_outdated_entries() {
    let fakes = TestServices::new();
    let mut outdated = installed_record("old", "1.0.0");
    outdated.latest_version = "1.1.0".to_string();
    fakes
        .server
        .set_installed(vec![outdated, installed_record("current", "2.0.0")]);
    let model = fakes.model();
    model.initialize().await;

    let results = model.update_all().await;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].0, "old");
    assert_eq!(
        fakes.server.action_calls(),
        vec![(Action::Install, "old".to_string())]
    );
}

// ============================================================================
// Pending actions
// ============================================================================

#[tokio::test]
async fn test_action_raises_pending_event_on_start_and_finish() {
    for fail in [false, true] {
        let fakes = TestServices::new();
        if fail {
            fakes.server.fail_actions_with(Some(Failure::server_error()));
        }
        let gate = fakes.server.hold_actions();
        let model = fakes.model();
        let events = record_events(&model);
        assert!(!model.has_pending_actions());

        let task = {
            let model = model.clone();
            let entry = installed_entry("ext", "1.0.0", "1.0.0");
            tokio::spawn(async move { model.disable(&entry).await })
        };
        wait_until(|| !fakes.server.action_calls().is_empty()).await;
        assert!(model.has_pending_actions());

        gate.add_permits(1);
        let result = task.await.unwrap();
        assert_eq!(result.is_err(), fail);
        assert!(!model.has_pending_actions());

        let pending_events = events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| **e == ModelEvent::PendingActions)
            .count();
        assert_eq!(pending_events, 2);
    }
}

#[derive(Debug, Clone, Copy)]
enum Operation {
    Install,
    Uninstall,
    Enable,
    Disable,
    RefreshInstalled,
    BuildCheck,
    PerformBuild,
    CancelBuild,
}

impl Operation {
    fn start(self, model: &ListModel) -> JoinHandle<()> {
        let model = model.clone();
        match self {
            Self::Install => tokio::spawn(async move {
                let _ = model.install(&search_entry("ext", "1.0.0")).await;
            }),
            Self::Uninstall => tokio::spawn(async move {
                let _ = model.uninstall(&installed_entry("ext", "1.0.0", "1.0.0")).await;
            }),
            Self::Enable => tokio::spawn(async move {
                let mut entry = installed_entry("ext", "1.0.0", "1.0.0");
                entry.enabled = false;
                let _ = model.enable(&entry).await;
            }),
            Self::Disable => tokio::spawn(async move {
                let _ = model.disable(&installed_entry("ext", "1.0.0", "1.0.0")).await;
            }),
            Self::RefreshInstalled => tokio::spawn(async move { model.refresh_installed().await }),
            Self::BuildCheck => {
                assert!(model.trigger_build_check());
                tokio::spawn(async move { model.settle_build_check().await.unwrap() })
            }
            Self::PerformBuild => model.perform_build(),
            Self::CancelBuild => model.cancel_build(),
        }
    }

    fn reached_backend(self, fakes: &TestServices) -> bool {
        match self {
            Self::Install | Self::Uninstall | Self::Enable | Self::Disable => {
                !fakes.server.action_calls().is_empty()
            }
            Self::RefreshInstalled => !fakes.server.installed_calls().is_empty(),
            Self::BuildCheck => fakes.builder.status_calls() > 0,
            Self::PerformBuild => fakes.builder.build_calls() > 0,
            Self::CancelBuild => fakes.builder.cancel_calls() > 0,
        }
    }
}

#[rstest]
#[tokio::test]
async fn test_pending_while_operation_in_flight(
    #[values(
        Operation::Install,
        Operation::Uninstall,
        Operation::Enable,
        Operation::Disable,
        Operation::RefreshInstalled,
        Operation::BuildCheck,
        Operation::PerformBuild,
        Operation::CancelBuild
    )]
    operation: Operation,
    #[values(false, true)] fail: bool,
) {
    let fakes = TestServices::new().with_build();
    if fail {
        fakes.server.fail_actions_with(Some(Failure::server_error()));
        fakes.server.fail_with(Some(Failure::server_error()));
        fakes.builder.fail_with(Some(Failure::server_error()));
    }
    let gates = [
        fakes.server.hold_actions(),
        fakes.server.hold_installed(),
        fakes.builder.hold_requests(),
    ];
    let model = fakes.model();
    assert!(!model.has_pending_actions());

    let task = operation.start(&model);
    wait_until(|| operation.reached_backend(&fakes)).await;
    assert!(model.has_pending_actions(), "{operation:?} not pending");

    for gate in &gates {
        gate.add_permits(16);
    }
    task.await.unwrap();
    model.settle_build_check().await.unwrap();

    assert!(!model.has_pending_actions(), "{operation:?} still pending");
}

// ============================================================================
// Build
// ============================================================================

#[tokio::test]
async fn test_build_check_is_noop_when_unavailable() {
    let fakes = TestServices::new();
    let model = fakes.model();
    assert!(!model.build_available());
    assert!(!model.trigger_build_check());
}

#[tokio::test]
async fn test_build_needed_raises_prompt() {
    let fakes = TestServices::new().with_build();
    fakes.builder.set_status(BuildState::Needed);
    let model = fakes.model();
    let events = record_events(&model);

    assert!(model.trigger_build_check());
    model.settle_build_check().await.unwrap();

    assert!(model.prompt_build());
    assert!(events.lock().unwrap().contains(&ModelEvent::BuildPrompt));
    // A second check while the prompt is up does nothing.
    assert!(!model.trigger_build_check());

    model.ignore_build_recommendation();
    assert!(!model.prompt_build());
    assert_eq!(fakes.builder.build_calls(), 0);
}

#[tokio::test]
async fn test_only_one_build_check_runs_at_a_time() {
    let fakes = TestServices::new().with_build();
    fakes.builder.set_status(BuildState::Building);
    let gate = fakes.builder.hold_requests();
    let model = fakes.model();

    assert!(model.trigger_build_check());
    wait_until(|| fakes.builder.status_calls() == 1).await;
    assert!(!model.trigger_build_check());

    gate.add_permits(2);
    model.settle_build_check().await.unwrap();

    assert_eq!(fakes.builder.status_calls(), 1);
    assert_eq!(fakes.builder.build_calls(), 1);
    assert!(!model.has_pending_actions());
}

#[tokio::test]
async fn test_settle_without_build_check_returns_immediately() {
    let fakes = TestServices::new().with_build();
    let model = fakes.model();
    model.settle_build_check().await.unwrap();
    assert_eq!(fakes.builder.status_calls(), 0);
}

#[tokio::test]
async fn test_build_in_progress_is_joined() {
    let fakes = TestServices::new().with_build();
    fakes.builder.set_status(BuildState::Building);
    let model = fakes.model();

    assert!(model.trigger_build_check());
    model.settle_build_check().await.unwrap();

    assert_eq!(fakes.builder.build_calls(), 1);
    assert!(!model.prompt_build());
}

#[tokio::test]
async fn test_stable_build_does_nothing() {
    let fakes = TestServices::new().with_build();
    let model = fakes.model();

    assert!(model.trigger_build_check());
    model.settle_build_check().await.unwrap();

    assert_eq!(fakes.builder.build_calls(), 0);
    assert!(!model.prompt_build());
    assert!(!model.has_pending_actions());
}

#[tokio::test]
async fn test_perform_build_clears_prompt() {
    let fakes = TestServices::new().with_build();
    fakes.builder.set_status(BuildState::Needed);
    let model = fakes.model();
    assert!(model.trigger_build_check());
    model.settle_build_check().await.unwrap();
    assert!(model.prompt_build());

    model.perform_build().await.unwrap();

    assert!(!model.prompt_build());
    assert_eq!(fakes.builder.build_calls(), 1);
    assert!(!model.has_pending_actions());
}

#[tokio::test]
async fn test_cancel_build() {
    let fakes = TestServices::new().with_build();
    let model = fakes.model();
    model.cancel_build().await.unwrap();
    assert_eq!(fakes.builder.cancel_calls(), 1);
}

#[tokio::test]
async fn test_successful_action_triggers_build_check() {
    let fakes = TestServices::new().with_build();
    fakes.builder.set_status(BuildState::Needed);
    let model = fakes.model();

    model
        .uninstall(&installed_entry("ext", "1.0.0", "1.0.0"))
        .await
        .unwrap();
    wait_until(|| model.prompt_build()).await;

    assert!(model.prompt_build());
}
