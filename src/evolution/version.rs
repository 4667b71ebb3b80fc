//! Template version parsing and minor bumps

use std::fmt;
use std::str::FromStr;

use crate::error::EvolverError;

/// Version assumed for every template until real template metadata is wired in
pub const PLACEHOLDER_VERSION: &str = "1.0.0";

/// A `major.minor.patch` template version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TemplateVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl TemplateVersion {
    pub fn parse(version: &str) -> Result<Self, EvolverError> {
        let invalid = |reason: &str| EvolverError::InvalidVersion {
            version: version.to_string(),
            reason: reason.to_string(),
        };

        let parts: Vec<&str> = version.trim().split('.').collect();
        if parts.len() != 3 {
            return Err(invalid("expected major.minor.patch"));
        }

        let component = |s: &str| s.parse::<u64>().map_err(|_| invalid("components must be non-negative integers"));

        Ok(Self {
            major: component(parts[0])?,
            minor: component(parts[1])?,
            patch: component(parts[2])?,
        })
    }

    /// Next minor release: minor + 1, patch reset, major unchanged
    pub fn bump_minor(&self) -> Self {
        Self {
            major: self.major,
            minor: self.minor + 1,
            patch: 0,
        }
    }
}

impl FromStr for TemplateVersion {
    type Err = EvolverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TemplateVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
