//! Package specifications: named installation methods for an entry.
use serde::{Deserialize, Serialize};

use super::entry::PerOs;

/// Clone a repository to a per-OS target directory.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct GitPackage {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "PerOs::is_empty")]
    pub target: PerOs,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub sudo: bool,
}

/// Run a per-OS install command, optionally skipped when a binary is
/// already present on PATH.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct InstallerPackage {
    #[serde(default, skip_serializing_if = "PerOs::is_empty")]
    pub command: PerOs,
    /// Binary name used for the presence check, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binary: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub sudo: bool,
}

/// Run an arbitrary per-OS shell command.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct CustomCommand {
    #[serde(default, skip_serializing_if = "PerOs::is_empty")]
    pub command: PerOs,
}

/// Download a file and run an install command over it.
///
/// `command` must contain a `{file}` placeholder which is replaced with the
/// downloaded file's path before execution.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct UrlInstall {
    pub url: String,
    pub command: String,
}

/// A set of named installation methods; at most one is used per install
/// attempt, but the map may hold several for portability across machines.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct PackageSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pacman: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yay: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paru: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dnf: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brew: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winget: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scoop: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choco: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git: Option<GitPackage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installer: Option<InstallerPackage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<CustomCommand>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<UrlInstall>,
}
