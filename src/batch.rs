//! Batch orchestration over a selection of applications and entries.
//!
//! A [`Selection`] is resolved against the config once, up front; every
//! name must exist or the whole batch is rejected before anything runs.
//! Operations then execute strictly in sequence, and a failure never stops
//! the remaining items: each item reports its own [`OpResult`].
use anyhow::Result;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, warn};

use crate::config::Config;
use crate::engine::{InstallMethod, PackageDispatcher, RestoreEngine};
use crate::error::ConfigError;
use crate::exec::Executor;
use crate::platform::Platform;

/// A validated set of application and entry indices.
///
/// Built once from user-supplied names and never mutated afterwards; the
/// orchestrator and the deletion planner both read the same value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    apps: BTreeSet<usize>,
    entries: BTreeSet<(usize, usize)>,
}

impl Selection {
    /// Select every application in the config.
    #[must_use]
    pub fn all(config: &Config) -> Self {
        Self {
            apps: (0..config.apps.len()).collect(),
            entries: BTreeSet::new(),
        }
    }

    /// Resolve names into a selection.
    ///
    /// `apps` are application names; `entries` are `app/entry` pairs. Every
    /// name must resolve, otherwise the selection is rejected whole.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownApp`] or [`ConfigError::UnknownEntry`]
    /// for the first name that does not resolve.
    pub fn resolve(config: &Config, apps: &[String], entries: &[String]) -> Result<Self> {
        let mut selection = Self::default();
        for name in apps {
            let idx = config
                .find_app(name)
                .ok_or_else(|| ConfigError::UnknownApp(name.clone()))?;
            selection.apps.insert(idx);
        }
        for spec in entries {
            let (app_name, entry_name) = spec
                .split_once('/')
                .ok_or_else(|| ConfigError::UnknownApp(spec.clone()))?;
            let app_idx = config
                .find_app(app_name)
                .ok_or_else(|| ConfigError::UnknownApp(app_name.to_string()))?;
            let entry_idx =
                config
                    .find_entry(app_idx, entry_name)
                    .ok_or_else(|| ConfigError::UnknownEntry {
                        app: app_name.to_string(),
                        entry: entry_name.to_string(),
                    })?;
            selection.entries.insert((app_idx, entry_idx));
        }
        Ok(selection)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.apps.is_empty() && self.entries.is_empty()
    }

    #[must_use]
    pub fn contains_app(&self, app_idx: usize) -> bool {
        self.apps.contains(&app_idx)
    }

    /// Expand into concrete `(app, entry)` index pairs in config order.
    ///
    /// A selected application contributes all of its entries; an entry
    /// selected individually under an already-selected application is
    /// subsumed by the application, so nothing runs twice.
    #[must_use]
    pub fn expand(&self, config: &Config) -> Vec<(usize, usize)> {
        let mut items = Vec::new();
        for (app_idx, app) in config.apps.iter().enumerate() {
            if self.apps.contains(&app_idx) {
                items.extend((0..app.entries.len()).map(|e| (app_idx, e)));
            } else {
                items.extend(
                    self.entries
                        .range((app_idx, 0)..(app_idx + 1, 0))
                        .copied(),
                );
            }
        }
        items
    }
}

/// Outcome of one batch item.
#[derive(Debug, Clone)]
pub struct OpResult {
    /// `app/entry` label.
    pub name: String,
    pub success: bool,
    pub message: String,
}

/// Outcomes of a whole batch, in execution order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub results: Vec<OpResult>,
}

impl BatchReport {
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.results.iter().filter(|r| r.success).count()
    }

    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.results.len() - self.success_count()
    }
}

/// Runs restore and install batches over a selection.
pub struct Orchestrator<'a> {
    config: &'a Config,
    platform: &'a Platform,
    backup_root: &'a Path,
    executor: &'a dyn Executor,
    dry_run: bool,
}

impl<'a> Orchestrator<'a> {
    #[must_use]
    pub const fn new(
        config: &'a Config,
        platform: &'a Platform,
        backup_root: &'a Path,
        executor: &'a dyn Executor,
        dry_run: bool,
    ) -> Self {
        Self {
            config,
            platform,
            backup_root,
            executor,
            dry_run,
        }
    }

    fn label(&self, app_idx: usize, entry_idx: usize) -> String {
        let app = self
            .config
            .apps
            .get(app_idx)
            .map_or("?", |a| a.name.as_str());
        let entry = self
            .config
            .apps
            .get(app_idx)
            .and_then(|a| a.entries.get(entry_idx))
            .map_or("?", |e| e.name.as_str());
        format!("{app}/{entry}")
    }

    /// Run each item through `op`, collecting per-item outcomes. Items whose
    /// filters exclude this platform are reported as skipped successes.
    fn run_each<F>(&self, selection: &Selection, op: F) -> BatchReport
    where
        F: Fn(&crate::config::Entry) -> Option<Result<String>>,
    {
        let mut report = BatchReport::default();
        for (app_idx, entry_idx) in selection.expand(self.config) {
            let name = self.label(app_idx, entry_idx);
            let Some(entry) = self
                .config
                .apps
                .get(app_idx)
                .and_then(|a| a.entries.get(entry_idx))
            else {
                continue;
            };
            if !entry.is_active(self.platform) {
                debug!(item = %name, "filtered out on this platform");
                report.results.push(OpResult {
                    name,
                    success: true,
                    message: "filtered out on this platform; skipped".to_string(),
                });
                continue;
            }
            let result = match op(entry) {
                Some(Ok(message)) => OpResult {
                    name,
                    success: true,
                    message,
                },
                Some(Err(e)) => {
                    warn!(item = %self.label(app_idx, entry_idx), error = %e, "operation failed");
                    OpResult {
                        name,
                        success: false,
                        message: format!("{e:#}"),
                    }
                }
                None => continue,
            };
            report.results.push(result);
        }
        report
    }

    /// Restore every selected entry, continuing past failures.
    #[must_use]
    pub fn run_restore(&self, selection: &Selection) -> BatchReport {
        let engine = RestoreEngine::new(self.backup_root, self.platform, self.executor, self.dry_run);
        self.run_each(selection, |entry| Some(engine.restore(entry)))
    }

    /// Install packages for every selected entry, continuing past failures.
    /// Entries with no package specification are silently skipped so that
    /// whole-application selections work.
    #[must_use]
    pub fn run_install(&self, selection: &Selection, method: Option<InstallMethod>) -> BatchReport {
        let dispatcher = PackageDispatcher::new(self.platform, self.executor, self.dry_run);
        self.run_each(selection, |entry| {
            entry
                .package
                .as_ref()
                .map(|_| dispatcher.install(entry, method))
        })
    }
}

/// A planned removal from the config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deletion {
    /// Remove a whole application at this index.
    App(usize),
    /// Remove one entry: `(app index, entry index)`.
    Entry(usize, usize),
}

impl Deletion {
    /// Sort key ordering deletions so earlier removals never invalidate
    /// later indices: apps in descending index order, entries within an app
    /// in descending index order, and a whole-app removal after all of its
    /// own entries.
    const fn key(self) -> (usize, isize) {
        match self {
            Self::App(app) => (app, -1),
            #[allow(clippy::cast_possible_wrap)]
            Self::Entry(app, entry) => (app, entry as isize),
        }
    }
}

/// Order the selection's removals so they can be applied by index safely.
#[must_use]
pub fn plan_deletions(selection: &Selection, config: &Config) -> Vec<Deletion> {
    let mut plan: Vec<Deletion> = selection
        .entries
        .iter()
        .filter(|(app_idx, _)| !selection.apps.contains(app_idx))
        .map(|&(app_idx, entry_idx)| Deletion::Entry(app_idx, entry_idx))
        .chain(
            selection
                .apps
                .iter()
                .filter(|app_idx| **app_idx < config.apps.len())
                .map(|&app_idx| Deletion::App(app_idx)),
        )
        .collect();
    plan.sort_by(|a, b| b.key().cmp(&a.key()));
    plan
}

/// Apply a deletion plan produced by [`plan_deletions`].
///
/// Entries queued under an application that has already been removed are
/// skipped rather than applied against shifted indices.
pub fn apply_deletions(config: &mut Config, plan: &[Deletion]) -> Vec<String> {
    let mut removed = Vec::new();
    let mut deleted_apps: BTreeSet<usize> = BTreeSet::new();
    for deletion in plan {
        match *deletion {
            Deletion::App(app_idx) => {
                if app_idx < config.apps.len() {
                    let app = config.apps.remove(app_idx);
                    removed.push(app.name);
                    deleted_apps.insert(app_idx);
                }
            }
            Deletion::Entry(app_idx, entry_idx) => {
                if deleted_apps.contains(&app_idx) {
                    continue;
                }
                if let Some(app) = config.apps.get_mut(app_idx)
                    && entry_idx < app.entries.len()
                {
                    let entry = app.entries.remove(entry_idx);
                    removed.push(format!("{}/{}", app.name, entry.name));
                }
            }
        }
    }
    removed
}
