//! Domain-specific error types for the dotstash engine.
//!
//! Structured errors via [`thiserror`]. Internal modules return typed errors
//! where the failure is a configuration problem the user must fix
//! ([`ConfigError`], [`PackageError`]); filesystem and external-command
//! failures are propagated as [`anyhow::Error`] with context at the point
//! of failure.

use thiserror::Error;

/// Errors that arise from configuration loading and selection resolution.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An I/O error occurred while reading or writing the config file.
    #[error("IO error on config file {path}: {source}")]
    Io {
        /// Path to the file that could not be read or written.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The config file contains a syntax error that prevents parsing.
    #[error("Invalid TOML in {path}: {message}")]
    Parse { path: String, message: String },

    /// A selected application name does not exist in the config.
    #[error("Unknown application '{0}'")]
    UnknownApp(String),

    /// A selected entry name does not exist under its application.
    #[error("Unknown entry '{entry}' in application '{app}'")]
    UnknownEntry { app: String, entry: String },
}

/// Errors that arise from package installation dispatch.
#[derive(Error, Debug)]
pub enum PackageError {
    /// The requested install method name is not recognised.
    #[error("unknown package manager '{0}'")]
    UnknownManager(String),

    /// The entry has no package specification at all.
    #[error("entry '{0}' has no package specification")]
    NoPackageSpec(String),

    /// The entry's package spec does not configure the requested method.
    #[error("entry '{entry}' has no '{method}' install method configured")]
    MissingMethod { entry: String, method: String },

    /// The chosen method needs a per-OS value that is absent for this OS.
    #[error("method '{method}' on entry '{entry}' has no value for OS '{os}'")]
    MissingOsValue {
        entry: String,
        method: String,
        os: String,
    },
}
