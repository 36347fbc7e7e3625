//! Command implementations behind the CLI.
pub mod install;
pub mod remove;
pub mod restore;
pub mod status;

use anyhow::{Result, bail};
use std::path::PathBuf;

use crate::batch::{BatchReport, Selection};
use crate::cli::{Cli, Command, GlobalOpts, SelectionOpts};
use crate::config::{Config, resolve_config_path};
use crate::platform::Platform;

/// Dispatch a parsed invocation to its command.
///
/// # Errors
///
/// Propagates the command's error; batch commands fail when any item failed.
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Status { global, selection } => status::run(&global, &selection),
        Command::Restore { global, selection } => restore::run(&global, &selection),
        Command::Install {
            global,
            selection,
            method,
        } => install::run(&global, &selection, method.as_deref()),
        Command::Remove { global, selection } => remove::run(&global, &selection),
        Command::Version => {
            println!("dotstash {}", version());
            Ok(())
        }
    }
}

/// Version string embedded at build time, falling back to the crate version.
#[must_use]
pub fn version() -> &'static str {
    option_env!("DOTSTASH_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
}

/// Everything a command needs that comes from the environment.
pub(crate) struct Context {
    pub config: Config,
    pub config_path: PathBuf,
    pub backup_root: PathBuf,
    pub platform: Platform,
}

impl Context {
    pub(crate) fn load(global: &GlobalOpts) -> Result<Self> {
        let config_path = resolve_config_path(global.config.as_deref());
        let config = Config::load(&config_path)?;
        let backup_root = config.backup_root_path(&config_path);
        Ok(Self {
            config,
            config_path,
            backup_root,
            platform: Platform::detect(),
        })
    }

    /// Resolve the user's selection against the loaded config.
    pub(crate) fn selection(&self, opts: &SelectionOpts) -> Result<Selection> {
        if opts.all {
            return Ok(Selection::all(&self.config));
        }
        let selection = Selection::resolve(&self.config, &opts.apps, &opts.entries)?;
        if selection.is_empty() {
            bail!("nothing selected; use --apps, --entries, or --all");
        }
        Ok(selection)
    }
}

/// Print per-item outcomes and fail if any item failed.
pub(crate) fn report(report: &BatchReport) -> Result<()> {
    for result in &report.results {
        let marker = if result.success { "ok" } else { "FAILED" };
        println!("[{marker}] {}: {}", result.name, result.message);
    }
    let failures = report.failure_count();
    if failures > 0 {
        bail!("{failures} operation(s) failed");
    }
    Ok(())
}
