//! The `status` command: read-only state detection.
use anyhow::Result;
use tracing::debug;

use super::Context;
use crate::cli::{GlobalOpts, SelectionOpts};
use crate::state::{Detector, JsonStateStore};

/// Detect and print the state of every selected entry. Never mutates the
/// filesystem, so `--dry-run` has no effect here.
///
/// # Errors
///
/// Fails when the config or state store cannot be loaded, or a selected
/// name does not resolve.
pub fn run(global: &GlobalOpts, opts: &SelectionOpts) -> Result<()> {
    let ctx = Context::load(global)?;
    let selection = ctx.selection(opts)?;

    let store_path = ctx.config_path.with_file_name("state.json");
    let store = JsonStateStore::load(&store_path)?;
    let detector = Detector::new(&ctx.backup_root, ctx.platform.os).with_store(&store);

    for (app_idx, entry_idx) in selection.expand(&ctx.config) {
        let Some(app) = ctx.config.apps.get(app_idx) else {
            continue;
        };
        let Some(entry) = app.entries.get(entry_idx) else {
            continue;
        };
        let name = format!("{}/{}", app.name, entry.name);

        if !entry.is_active(&ctx.platform) {
            println!("{:>9}  {name}", "filtered");
            continue;
        }
        match detector.detect(entry) {
            Some(state) => {
                let target = entry.raw_target(ctx.platform.os).unwrap_or("-");
                println!("{state:>9}  {name}  {target}");
            }
            None => debug!(item = %name, "no filesystem state on this OS"),
        }
    }
    Ok(())
}
