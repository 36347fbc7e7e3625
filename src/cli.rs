//! Command-line interface definitions.
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Dotfiles backup and symlink manager.
#[derive(Debug, Parser)]
#[command(name = "dotstash", about = "Manage dotfile backups, symlinks, and packages")]
pub struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every operating subcommand.
#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Path to the config file (defaults to DOTSTASH_CONFIG or ./dotstash.toml).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Show what would happen without touching the filesystem.
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

/// Which applications and entries an operation covers.
#[derive(Debug, Args)]
pub struct SelectionOpts {
    /// Application names, comma separated.
    #[arg(short, long, value_delimiter = ',')]
    pub apps: Vec<String>,

    /// Individual entries as app/entry pairs, comma separated.
    #[arg(short, long, value_delimiter = ',')]
    pub entries: Vec<String>,

    /// Operate on every configured application.
    #[arg(long, conflicts_with_all = ["apps", "entries"])]
    pub all: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the state of configured entries.
    Status {
        #[command(flatten)]
        global: GlobalOpts,
        #[command(flatten)]
        selection: SelectionOpts,
    },
    /// Create symlinks, adopting existing files into the backup store.
    Restore {
        #[command(flatten)]
        global: GlobalOpts,
        #[command(flatten)]
        selection: SelectionOpts,
    },
    /// Install packages for the selected entries.
    Install {
        #[command(flatten)]
        global: GlobalOpts,
        #[command(flatten)]
        selection: SelectionOpts,
        /// Install method to use (defaults to the first configured one).
        #[arg(short, long)]
        method: Option<String>,
    },
    /// Remove applications or entries from the config.
    Remove {
        #[command(flatten)]
        global: GlobalOpts,
        #[command(flatten)]
        selection: SelectionOpts,
    },
    /// Print version information.
    Version,
}
