//! Dotfiles backup and symlink management engine.
//!
//! Keeps a canonical backup copy of each configured file or folder and
//! presents it at per-OS target locations via symlinks. Pre-existing
//! unmanaged files are adopted into the backup store without data loss,
//! and optional packages are installed through external package managers.
//!
//! The public API is organised into five layers:
//!
//! - **[`config`]**: the entry model (apps, entries, targets, package specs)
//! - **[`state`]**: read-only detection of the backup/target relationship
//! - **[`engine`]**: restore/adopt mutations and package dispatch
//! - **[`batch`]**: selection expansion and sequential batch execution
//! - **[`commands`]**: top-level subcommand orchestration
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod batch;
pub mod cli;
pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod exec;
pub mod logging;
pub mod platform;
pub mod state;
