//! Upgrade options and result types

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::version::error::VersionError;
use crate::version::semver::Version;

/// Which upgrade candidates are acceptable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpgradeStrategy {
    /// Any newer version
    All,
    /// Newer version within the same major
    #[default]
    Compatible,
    /// Newer minor within the same major
    Minor,
    /// Newer patch within the same major.minor
    Patch,
}

impl UpgradeStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpgradeStrategy::All => "all",
            UpgradeStrategy::Compatible => "compatible",
            UpgradeStrategy::Minor => "minor",
            UpgradeStrategy::Patch => "patch",
        }
    }
}

impl fmt::Display for UpgradeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UpgradeStrategy {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(UpgradeStrategy::All),
            "compatible" => Ok(UpgradeStrategy::Compatible),
            "minor" => Ok(UpgradeStrategy::Minor),
            "patch" => Ok(UpgradeStrategy::Patch),
            _ => Err(VersionError::UnknownStrategy(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpgradeOptions {
    pub include_prereleases: bool,
    pub ignore_breaking: bool,
    /// Transitive depth; `None` is unlimited, `Some(0)` upgrades only the requested modules
    pub depth: Option<usize>,
    pub strategy: UpgradeStrategy,
}

impl UpgradeOptions {
    /// Options for one level further down the dependency tree, if any remain
    pub fn descend(&self) -> Option<Self> {
        let depth = match self.depth {
            None => None,
            Some(0) => return None,
            Some(depth) => Some(depth - 1),
        };
        Some(Self {
            depth,
            ..self.clone()
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpgradeStatus {
    Success,
    Failed,
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeResult {
    pub module_id: String,
    pub from_version: String,
    /// Target version; equals `from_version` when nothing was selected
    pub to_version: String,
    pub status: UpgradeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub breaking: bool,
}

/// What an upgrade would do, computed without touching the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradePreview {
    pub current: Version,
    /// Parsed available versions, newest first
    pub available: Vec<Version>,
    pub recommended: Option<Version>,
    pub breaking: bool,
}
