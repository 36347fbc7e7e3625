//! The `install` command: package installation for selected entries.
use anyhow::Result;

use super::{Context, report};
use crate::batch::Orchestrator;
use crate::cli::{GlobalOpts, SelectionOpts};
use crate::engine::InstallMethod;
use crate::exec::SystemExecutor;

/// Install packages for every selected entry.
///
/// # Errors
///
/// Fails for an unknown method name, config or selection problems, or any
/// failed item in the batch.
pub fn run(global: &GlobalOpts, opts: &SelectionOpts, method: Option<&str>) -> Result<()> {
    let method = method.map(str::parse::<InstallMethod>).transpose()?;

    let ctx = Context::load(global)?;
    let selection = ctx.selection(opts)?;

    let executor = SystemExecutor;
    let orchestrator = Orchestrator::new(
        &ctx.config,
        &ctx.platform,
        &ctx.backup_root,
        &executor,
        global.dry_run,
    );
    report(&orchestrator.run_install(&selection, method))
}
