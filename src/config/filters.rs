//! Machine applicability filters.
//!
//! Entries can be limited to particular machines by matching platform
//! attributes. Filtered-out entries are excluded from every engine
//! operation but are kept in the persisted config.
use serde::{Deserialize, Serialize};

use crate::platform::Platform;

/// One set of attribute match lists. An empty list matches everything.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct FilterSet {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub os: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub distro: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hostname: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub user: Vec<String>,
}

impl FilterSet {
    const fn is_empty(&self) -> bool {
        self.os.is_empty()
            && self.distro.is_empty()
            && self.hostname.is_empty()
            && self.user.is_empty()
    }

    /// True when any non-empty list matches the corresponding attribute.
    fn matches_any(&self, platform: &Platform) -> bool {
        contains(&self.os, Some(platform.os.identifier()))
            || contains(&self.distro, platform.distro.as_deref())
            || contains(&self.hostname, platform.hostname.as_deref())
            || contains(&self.user, platform.user.as_deref())
    }

    /// True when every non-empty list matches the corresponding attribute.
    fn matches_all(&self, platform: &Platform) -> bool {
        (self.os.is_empty() || contains(&self.os, Some(platform.os.identifier())))
            && (self.distro.is_empty() || contains(&self.distro, platform.distro.as_deref()))
            && (self.hostname.is_empty() || contains(&self.hostname, platform.hostname.as_deref()))
            && (self.user.is_empty() || contains(&self.user, platform.user.as_deref()))
    }
}

fn contains(list: &[String], value: Option<&str>) -> bool {
    value.is_some_and(|v| list.iter().any(|item| item == v))
}

/// Inclusion/exclusion predicates over {os, distro, hostname, user}.
///
/// An entry applies when all non-empty include lists match and no exclude
/// list matches. Exclusion wins over inclusion.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Filters {
    #[serde(default, skip_serializing_if = "FilterSet::is_empty")]
    pub include: FilterSet,
    #[serde(default, skip_serializing_if = "FilterSet::is_empty")]
    pub exclude: FilterSet,
}

impl Filters {
    /// Evaluate the filters against the current platform.
    #[must_use]
    pub fn applies(&self, platform: &Platform) -> bool {
        if self.exclude.matches_any(platform) {
            return false;
        }
        self.include.matches_all(platform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{Os, Platform};

    fn arch_host() -> Platform {
        Platform {
            os: Os::Linux,
            distro: Some("arch".to_string()),
            hostname: Some("workstation".to_string()),
            user: Some("alice".to_string()),
        }
    }

    #[test]
    fn empty_filters_apply_everywhere() {
        assert!(Filters::default().applies(&arch_host()));
        assert!(Filters::default().applies(&Platform::with_os(Os::Windows)));
    }

    #[test]
    fn include_os_matches() {
        let f = Filters {
            include: FilterSet {
                os: vec!["linux".to_string()],
                ..FilterSet::default()
            },
            exclude: FilterSet::default(),
        };
        assert!(f.applies(&arch_host()));
        assert!(!f.applies(&Platform::with_os(Os::Windows)));
    }

    #[test]
    fn include_requires_all_attributes() {
        let f = Filters {
            include: FilterSet {
                os: vec!["linux".to_string()],
                hostname: vec!["laptop".to_string()],
                ..FilterSet::default()
            },
            exclude: FilterSet::default(),
        };
        // os matches but hostname does not
        assert!(!f.applies(&arch_host()));
    }

    #[test]
    fn exclude_wins_over_include() {
        let f = Filters {
            include: FilterSet {
                os: vec!["linux".to_string()],
                ..FilterSet::default()
            },
            exclude: FilterSet {
                distro: vec!["arch".to_string()],
                ..FilterSet::default()
            },
        };
        assert!(!f.applies(&arch_host()));
    }

    #[test]
    fn include_on_missing_attribute_fails() {
        let f = Filters {
            include: FilterSet {
                distro: vec!["arch".to_string()],
                ..FilterSet::default()
            },
            exclude: FilterSet::default(),
        };
        // Platform with no detected distro cannot satisfy a distro include.
        assert!(!f.applies(&Platform::with_os(Os::Linux)));
    }
}
