use std::fmt;

/// Detected operating system platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    Linux,
    Windows,
    Macos,
}

impl Os {
    /// Normalized identifier used in config target maps.
    #[must_use]
    pub const fn identifier(self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::Windows => "windows",
            Self::Macos => "darwin",
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier())
    }
}

/// Platform information for the current system.
///
/// Entry filters match against these attributes; the engine consults only
/// [`Platform::os`] when selecting the per-OS target for an operation.
#[derive(Debug, Clone)]
pub struct Platform {
    pub os: Os,
    /// Linux distribution id from `/etc/os-release`, if detectable.
    pub distro: Option<String>,
    pub hostname: Option<String>,
    pub user: Option<String>,
}

impl Platform {
    /// Detect the current platform.
    #[must_use]
    pub fn detect() -> Self {
        Self {
            os: Self::detect_os(),
            distro: Self::detect_distro(),
            hostname: Self::detect_hostname(),
            user: std::env::var("USER")
                .or_else(|_| std::env::var("USERNAME"))
                .ok(),
        }
    }

    /// Create a platform with explicit values (for testing).
    #[must_use]
    pub const fn with_os(os: Os) -> Self {
        Self {
            os,
            distro: None,
            hostname: None,
            user: None,
        }
    }

    #[must_use]
    pub fn is_linux(&self) -> bool {
        self.os == Os::Linux
    }

    #[must_use]
    pub fn is_windows(&self) -> bool {
        self.os == Os::Windows
    }

    fn detect_os() -> Os {
        if cfg!(target_os = "windows") {
            Os::Windows
        } else if cfg!(target_os = "macos") {
            Os::Macos
        } else {
            // Default to Linux for other Unix-like systems
            Os::Linux
        }
    }

    fn detect_distro() -> Option<String> {
        if !cfg!(target_os = "linux") {
            return None;
        }
        let contents = std::fs::read_to_string("/etc/os-release").ok()?;
        contents.lines().find_map(|line| {
            line.strip_prefix("ID=")
                .map(|id| id.trim_matches('"').to_string())
        })
    }

    fn detect_hostname() -> Option<String> {
        if let Ok(name) = std::env::var("HOSTNAME") {
            return Some(name);
        }
        std::fs::read_to_string("/etc/hostname")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }
}
