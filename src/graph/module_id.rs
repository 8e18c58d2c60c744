use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::version::error::VersionError;
use crate::version::range::Range;
use crate::version::semver::Version;

/// Split `name@rest` on the last `@`, so scoped names like `@scope/pkg@1.0.0` work
fn split_at_version(text: &str) -> Option<(&str, &str)> {
    let (name, rest) = text.rsplit_once('@')?;
    if name.is_empty() || rest.is_empty() {
        return None;
    }
    Some((name, rest))
}

/// A module at a concrete version, serialized as `name@major.minor.patch[-prerelease]`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleId {
    pub name: String,
    pub version: Version,
}

impl ModuleId {
    pub fn new(name: impl Into<String>, version: Version) -> Self {
        Self {
            name: name.into(),
            version,
        }
    }

    pub fn parse(text: &str) -> Result<Self, VersionError> {
        let (name, version) = split_at_version(text)
            .ok_or_else(|| VersionError::MalformedModuleId(text.to_string()))?;
        Ok(Self::new(name, Version::parse(version)?))
    }

    /// Same module name at another version
    pub fn with_version(&self, version: Version) -> Self {
        Self::new(self.name.clone(), version)
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

impl FromStr for ModuleId {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for ModuleId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ModuleId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}

/// A dependency declaration `name@versionOrRange`
///
/// The requirement is kept verbatim: conflict detection groups on the exact text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DependencySpec {
    pub name: String,
    pub requirement: String,
}

impl DependencySpec {
    pub fn parse(text: &str) -> Result<Self, VersionError> {
        let (name, requirement) = split_at_version(text)
            .ok_or_else(|| VersionError::MalformedModuleId(text.to_string()))?;
        Ok(Self {
            name: name.to_string(),
            requirement: requirement.to_string(),
        })
    }

    pub fn range(&self) -> Result<Range, VersionError> {
        Range::parse(&self.requirement)
    }
}

impl fmt::Display for DependencySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.requirement)
    }
}
