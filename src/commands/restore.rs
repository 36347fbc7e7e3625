//! The `restore` command: create symlinks, adopting files where needed.
use anyhow::Result;
use tracing::info;

use super::{Context, report};
use crate::batch::Orchestrator;
use crate::cli::{GlobalOpts, SelectionOpts};
use crate::exec::SystemExecutor;

/// Restore every selected entry.
///
/// # Errors
///
/// Fails when the config cannot be loaded, a selected name does not
/// resolve, or any item in the batch fails.
pub fn run(global: &GlobalOpts, opts: &SelectionOpts) -> Result<()> {
    let ctx = Context::load(global)?;
    let selection = ctx.selection(opts)?;

    if global.dry_run {
        info!("dry run; no changes will be made");
    }
    let executor = SystemExecutor;
    let orchestrator = Orchestrator::new(
        &ctx.config,
        &ctx.platform,
        &ctx.backup_root,
        &executor,
        global.dry_run,
    );
    report(&orchestrator.run_restore(&selection))
}
