//! Package installation dispatch.
//!
//! Every install method is a closed enum variant; the caller chooses one
//! explicitly (or takes the first configured method in priority order).
//! Commands run with the controlling terminal inherited so interactive
//! elevation prompts work; nothing else runs while a command holds the
//! terminal. Failures are reported verbatim with no retry.
use anyhow::{Context as _, Result, bail};
use std::fmt;
use std::io::Write as _;
use std::str::FromStr;
use tracing::debug;

use crate::config::{Entry, PackageSpec, expand_tilde};
use crate::error::PackageError;
use crate::exec::Executor;
use crate::platform::{Os, Platform};

/// A named installation method.
///
/// Listed in default priority order: when the user does not pick a method,
/// the first one configured in the entry's [`PackageSpec`] wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallMethod {
    Pacman,
    Yay,
    Paru,
    Apt,
    Dnf,
    Brew,
    Winget,
    Scoop,
    Choco,
    Git,
    Installer,
    Custom,
    Url,
}

impl InstallMethod {
    /// All methods in default priority order.
    pub const ALL: [Self; 13] = [
        Self::Pacman,
        Self::Yay,
        Self::Paru,
        Self::Apt,
        Self::Dnf,
        Self::Brew,
        Self::Winget,
        Self::Scoop,
        Self::Choco,
        Self::Git,
        Self::Installer,
        Self::Custom,
        Self::Url,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Pacman => "pacman",
            Self::Yay => "yay",
            Self::Paru => "paru",
            Self::Apt => "apt",
            Self::Dnf => "dnf",
            Self::Brew => "brew",
            Self::Winget => "winget",
            Self::Scoop => "scoop",
            Self::Choco => "choco",
            Self::Git => "git",
            Self::Installer => "installer",
            Self::Custom => "custom",
            Self::Url => "url",
        }
    }

    /// Whether this method is configured in the given spec.
    #[must_use]
    pub const fn configured_in(self, spec: &PackageSpec) -> bool {
        match self {
            Self::Pacman => spec.pacman.is_some(),
            Self::Yay => spec.yay.is_some(),
            Self::Paru => spec.paru.is_some(),
            Self::Apt => spec.apt.is_some(),
            Self::Dnf => spec.dnf.is_some(),
            Self::Brew => spec.brew.is_some(),
            Self::Winget => spec.winget.is_some(),
            Self::Scoop => spec.scoop.is_some(),
            Self::Choco => spec.choco.is_some(),
            Self::Git => spec.git.is_some(),
            Self::Installer => spec.installer.is_some(),
            Self::Custom => spec.custom.is_some(),
            Self::Url => spec.url.is_some(),
        }
    }
}

impl fmt::Display for InstallMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for InstallMethod {
    type Err = PackageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| PackageError::UnknownManager(s.to_string()))
    }
}

/// Methods configured in `spec`, in default priority order.
#[must_use]
pub fn available_methods(spec: &PackageSpec) -> Vec<InstallMethod> {
    InstallMethod::ALL
        .into_iter()
        .filter(|m| m.configured_in(spec))
        .collect()
}

/// An external command ready to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    fn arg_refs(&self) -> Vec<&str> {
        self.args.iter().map(String::as_str).collect()
    }

    /// Prefix with `sudo` on Unix-likes; Windows elevation is out of band.
    fn elevated(self, os: Os) -> Self {
        if os == Os::Windows {
            return self;
        }
        let mut args = vec![self.program];
        args.extend(self.args);
        Self {
            program: "sudo".to_string(),
            args,
        }
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Builds and executes (or previews) package installation commands.
pub struct PackageDispatcher<'a> {
    platform: &'a Platform,
    executor: &'a dyn Executor,
    dry_run: bool,
}

impl<'a> PackageDispatcher<'a> {
    #[must_use]
    pub const fn new(platform: &'a Platform, executor: &'a dyn Executor, dry_run: bool) -> Self {
        Self {
            platform,
            executor,
            dry_run,
        }
    }

    /// Build the external command for one entry and method.
    ///
    /// # Errors
    ///
    /// Returns [`PackageError`] when the entry has no package spec, the
    /// method is not configured, or a required per-OS value is absent.
    pub fn build_command(&self, entry: &Entry, method: InstallMethod) -> Result<CommandSpec> {
        let spec = entry
            .package
            .as_ref()
            .ok_or_else(|| PackageError::NoPackageSpec(entry.name.clone()))?;
        let os = self.platform.os;

        let missing = || PackageError::MissingMethod {
            entry: entry.name.clone(),
            method: method.name().to_string(),
        };
        let missing_os = || PackageError::MissingOsValue {
            entry: entry.name.clone(),
            method: method.name().to_string(),
            os: os.identifier().to_string(),
        };

        let cmd = match method {
            InstallMethod::Pacman => {
                let name = spec.pacman.as_deref().ok_or_else(missing)?;
                CommandSpec::new("pacman", &["-S", "--noconfirm", name]).elevated(os)
            }
            InstallMethod::Yay => {
                let name = spec.yay.as_deref().ok_or_else(missing)?;
                CommandSpec::new("yay", &["-S", "--noconfirm", name])
            }
            InstallMethod::Paru => {
                let name = spec.paru.as_deref().ok_or_else(missing)?;
                CommandSpec::new("paru", &["-S", "--noconfirm", name])
            }
            InstallMethod::Apt => {
                let name = spec.apt.as_deref().ok_or_else(missing)?;
                CommandSpec::new("apt-get", &["install", "-y", name]).elevated(os)
            }
            InstallMethod::Dnf => {
                let name = spec.dnf.as_deref().ok_or_else(missing)?;
                CommandSpec::new("dnf", &["install", "-y", name]).elevated(os)
            }
            // brew refuses to run as root; never elevate it
            InstallMethod::Brew => {
                let name = spec.brew.as_deref().ok_or_else(missing)?;
                CommandSpec::new("brew", &["install", name])
            }
            InstallMethod::Winget => {
                let name = spec.winget.as_deref().ok_or_else(missing)?;
                CommandSpec::new(
                    "winget",
                    &[
                        "install",
                        "--id",
                        name,
                        "--exact",
                        "--accept-source-agreements",
                        "--accept-package-agreements",
                    ],
                )
            }
            // scoop is per-user by design; never elevate it
            InstallMethod::Scoop => {
                let name = spec.scoop.as_deref().ok_or_else(missing)?;
                CommandSpec::new("scoop", &["install", name])
            }
            InstallMethod::Choco => {
                let name = spec.choco.as_deref().ok_or_else(missing)?;
                CommandSpec::new("choco", &["install", "-y", name])
            }
            InstallMethod::Git => {
                let git = spec.git.as_ref().ok_or_else(missing)?;
                let target = git.target.get(os).ok_or_else(missing_os)?;
                let target = expand_tilde(target).to_string_lossy().into_owned();
                let mut args = vec!["clone".to_string()];
                if let Some(branch) = git.branch.as_deref() {
                    args.push("-b".to_string());
                    args.push(branch.to_string());
                }
                args.push(git.url.clone());
                args.push(target);
                let cmd = CommandSpec {
                    program: "git".to_string(),
                    args,
                };
                if git.sudo { cmd.elevated(os) } else { cmd }
            }
            InstallMethod::Installer => {
                let installer = spec.installer.as_ref().ok_or_else(missing)?;
                let command = installer.command.get(os).ok_or_else(missing_os)?;
                let cmd = shell_command(os, command);
                if installer.sudo { cmd.elevated(os) } else { cmd }
            }
            InstallMethod::Custom => {
                let custom = spec.custom.as_ref().ok_or_else(missing)?;
                let command = custom.command.get(os).ok_or_else(missing_os)?;
                shell_command(os, command)
            }
            // For display only; install() substitutes the downloaded file
            // into the placeholder before running.
            InstallMethod::Url => {
                let url = spec.url.as_ref().ok_or_else(missing)?;
                shell_command(os, &url.command)
            }
        };

        // Advisory per-entry elevation, applied unless already elevated.
        if entry.requires_elevation && cmd.program != "sudo" && !matches!(method, InstallMethod::Brew | InstallMethod::Scoop) {
            return Ok(cmd.elevated(self.platform.os));
        }
        Ok(cmd)
    }

    /// Install the entry's package via `method`, or via the first
    /// configured method when `method` is `None`.
    ///
    /// # Errors
    ///
    /// Returns an error for configuration problems, a failed download, an
    /// unstartable process, or a non-zero exit.
    pub fn install(&self, entry: &Entry, method: Option<InstallMethod>) -> Result<String> {
        let spec = entry
            .package
            .as_ref()
            .ok_or_else(|| PackageError::NoPackageSpec(entry.name.clone()))?;

        let method = match method {
            Some(m) => m,
            None => match available_methods(spec).first() {
                Some(&m) => m,
                None => bail!("entry '{}' has no install methods configured", entry.name),
            },
        };
        debug!(entry = %entry.name, method = %method, "installing");

        // Presence check: the installer method can name a binary that marks
        // the package as already present.
        if method == InstallMethod::Installer
            && let Some(installer) = spec.installer.as_ref()
            && let Some(binary) = installer.binary.as_deref()
            && self.executor.which(binary)
        {
            return Ok(format!("'{binary}' already on PATH; nothing to install"));
        }

        if method == InstallMethod::Url {
            return self.install_from_url(entry, spec);
        }

        let cmd = self.build_command(entry, method)?;
        if self.dry_run {
            return Ok(format!("Would install '{}' via {}: {}", entry.name, method, cmd));
        }

        let result = self.executor.run_interactive(&cmd.program, &cmd.arg_refs())?;
        if !result.success {
            bail!(
                "{} install for '{}' failed (exit {})",
                method,
                entry.name,
                result.code.unwrap_or(-1)
            );
        }
        Ok(format!("Installed '{}' via {}", entry.name, method))
    }

    /// Download the configured URL to a temporary file, substitute it into
    /// the `{file}` placeholder, and run the install command. The temporary
    /// file is removed when it goes out of scope, success or failure.
    fn install_from_url(&self, entry: &Entry, spec: &PackageSpec) -> Result<String> {
        let url = spec.url.as_ref().ok_or_else(|| PackageError::MissingMethod {
            entry: entry.name.clone(),
            method: InstallMethod::Url.name().to_string(),
        })?;

        if self.dry_run {
            return Ok(format!(
                "Would download {} and run: {}",
                url.url, url.command
            ));
        }

        let mut file = tempfile::NamedTempFile::new().context("create temporary download file")?;
        let mut response = ureq::get(&url.url)
            .call()
            .with_context(|| format!("download {}", url.url))?;
        let data = response
            .body_mut()
            .read_to_vec()
            .with_context(|| format!("read download body from {}", url.url))?;
        file.write_all(&data).context("write downloaded file")?;
        file.flush().context("flush downloaded file")?;

        let command = url
            .command
            .replace("{file}", &file.path().to_string_lossy());
        let cmd = shell_command(self.platform.os, &command);

        let result = self.executor.run_interactive(&cmd.program, &cmd.arg_refs())?;
        if !result.success {
            bail!(
                "url install for '{}' failed (exit {})",
                entry.name,
                result.code.unwrap_or(-1)
            );
        }
        Ok(format!("Installed '{}' via url", entry.name))
    }
}

/// Wrap a shell command line for the platform's shell.
fn shell_command(os: Os, command: &str) -> CommandSpec {
    if os == Os::Windows {
        CommandSpec::new("cmd", &["/C", command])
    } else {
        CommandSpec::new("sh", &["-c", command])
    }
}
