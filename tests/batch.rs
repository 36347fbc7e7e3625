#![allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
#![cfg(unix)]
//! Batch orchestration across several applications.
mod common;

use common::{Workspace, app, config_with};
use dotstash::batch::{Orchestrator, Selection, apply_deletions, plan_deletions};
use dotstash::exec::SystemExecutor;
use dotstash::platform::{Os, Platform};

#[test]
fn failing_item_does_not_stop_the_batch() {
    let ws = Workspace::new();
    std::fs::create_dir_all(ws.backup_root.join("one")).unwrap();
    std::fs::create_dir_all(ws.backup_root.join("three")).unwrap();

    let config = config_with(vec![
        app("alpha", vec![ws.folder_entry("one", "one", "links/one")]),
        // neither backup nor target exists: a hard failure
        app("beta", vec![ws.folder_entry("two", "two", "links/two")]),
        app("gamma", vec![ws.folder_entry("three", "three", "links/three")]),
    ]);

    let platform = Platform::with_os(Os::Linux);
    let executor = SystemExecutor;
    let orchestrator = Orchestrator::new(&config, &platform, &ws.backup_root, &executor, false);

    let report = orchestrator.run_restore(&Selection::all(&config));

    assert_eq!(report.results.len(), 3);
    assert_eq!(report.success_count(), 2);
    assert_eq!(report.failure_count(), 1);
    assert_eq!(report.results[1].name, "beta/two");
    assert!(!report.results[1].success);
    assert!(
        ws.home.join("links/three").symlink_metadata().unwrap().is_symlink(),
        "items after a failure must still run"
    );
}

#[test]
fn entry_selection_under_selected_app_runs_once() {
    let ws = Workspace::new();
    std::fs::create_dir_all(ws.backup_root.join("one")).unwrap();

    let config = config_with(vec![app(
        "alpha",
        vec![ws.folder_entry("one", "one", "links/one")],
    )]);
    let selection = Selection::resolve(
        &config,
        &["alpha".to_string()],
        &["alpha/one".to_string()],
    )
    .unwrap();

    let platform = Platform::with_os(Os::Linux);
    let executor = SystemExecutor;
    let orchestrator = Orchestrator::new(&config, &platform, &ws.backup_root, &executor, false);

    let report = orchestrator.run_restore(&selection);
    assert_eq!(report.results.len(), 1, "duplicate selection must run once");
}

#[test]
fn removal_plan_survives_index_shifts() {
    let ws = Workspace::new();
    let mut config = config_with(vec![
        app(
            "alpha",
            vec![
                ws.folder_entry("a0", "a0", "links/a0"),
                ws.folder_entry("a1", "a1", "links/a1"),
            ],
        ),
        app("beta", vec![ws.folder_entry("b0", "b0", "links/b0")]),
        app(
            "gamma",
            vec![
                ws.folder_entry("g0", "g0", "links/g0"),
                ws.folder_entry("g1", "g1", "links/g1"),
            ],
        ),
    ]);

    // remove app alpha wholesale plus individual entries from beta and gamma
    let selection = Selection::resolve(
        &config,
        &["alpha".to_string()],
        &["beta/b0".to_string(), "gamma/g0".to_string()],
    )
    .unwrap();

    let plan = plan_deletions(&selection, &config);
    let removed = apply_deletions(&mut config, &plan);

    assert_eq!(
        removed,
        vec![
            "gamma/g0".to_string(),
            "beta/b0".to_string(),
            "alpha".to_string(),
        ],
        "higher indices must be removed first"
    );
    assert_eq!(config.apps.len(), 2);
    assert_eq!(config.apps[0].name, "beta");
    assert!(config.apps[0].entries.is_empty());
    assert_eq!(config.apps[1].name, "gamma");
    assert_eq!(config.apps[1].entries.len(), 1);
    assert_eq!(config.apps[1].entries[0].name, "g1");
}

#[test]
fn unknown_selection_rejects_whole_batch() {
    let config = config_with(vec![]);
    assert!(Selection::resolve(&config, &["ghost".to_string()], &[]).is_err());
}

#[test]
fn dry_run_batch_reports_without_touching_disk() {
    let ws = Workspace::new();
    std::fs::create_dir_all(ws.backup_root.join("one")).unwrap();

    let config = config_with(vec![app(
        "alpha",
        vec![ws.folder_entry("one", "one", "links/one")],
    )]);

    let platform = Platform::with_os(Os::Linux);
    let executor = SystemExecutor;
    let orchestrator = Orchestrator::new(&config, &platform, &ws.backup_root, &executor, true);

    let before = common::snapshot(&ws.home);
    let report = orchestrator.run_restore(&Selection::all(&config));

    assert_eq!(report.failure_count(), 0);
    assert!(report.results[0].message.starts_with("Would"));
    assert_eq!(common::snapshot(&ws.home), before);
}
