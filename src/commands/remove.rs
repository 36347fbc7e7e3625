//! The `remove` command: drop applications or entries from the config.
//!
//! Removal only edits the config file; backups and symlinks on disk are
//! left untouched for the user to clean up deliberately.
use anyhow::Result;

use super::Context;
use crate::batch::{apply_deletions, plan_deletions};
use crate::cli::{GlobalOpts, SelectionOpts};

/// Remove the selected applications and entries, persisting the config.
///
/// # Errors
///
/// Fails when the config cannot be loaded or saved, or a selected name
/// does not resolve.
pub fn run(global: &GlobalOpts, opts: &SelectionOpts) -> Result<()> {
    let mut ctx = Context::load(global)?;
    let selection = ctx.selection(opts)?;

    let plan = plan_deletions(&selection, &ctx.config);
    if plan.is_empty() {
        println!("Nothing to remove");
        return Ok(());
    }

    if global.dry_run {
        let mut preview = ctx.config.clone();
        for name in apply_deletions(&mut preview, &plan) {
            println!("Would remove {name}");
        }
        return Ok(());
    }

    let removed = apply_deletions(&mut ctx.config, &plan);
    ctx.config.save(&ctx.config_path)?;
    for name in &removed {
        println!("Removed {name}");
    }
    Ok(())
}
