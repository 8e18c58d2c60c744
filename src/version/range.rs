//! Version range expressions
//!
//! A range is a single optional operator followed by a bare version:
//! - `1.2.3`, `=1.2.3` - exact match
//! - `^1.2.3` - same major, minor at least 2 (for `0.x` the minor must match exactly)
//! - `~1.2.3` - same major and minor, patch at least 3
//! - `>=1.2.3`, `>1.2.3`, `<=1.2.3`, `<1.2.3` - comparison operators
//!
//! Compound ranges (`||`, space-separated AND, hyphen ranges, wildcards) are not supported.

use std::fmt;
use std::str::FromStr;

use crate::version::error::VersionError;
use crate::version::semver::Version;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Caret,
    Tilde,
    Gte,
    Gt,
    Lte,
    Lt,
    Eq,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Caret => "^",
            Operator::Tilde => "~",
            Operator::Gte => ">=",
            Operator::Gt => ">",
            Operator::Lte => "<=",
            Operator::Lt => "<",
            Operator::Eq => "=",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        match token {
            "^" => Some(Operator::Caret),
            "~" => Some(Operator::Tilde),
            ">=" => Some(Operator::Gte),
            ">" => Some(Operator::Gt),
            "<=" => Some(Operator::Lte),
            "<" => Some(Operator::Lt),
            "=" | "" => Some(Operator::Eq),
            _ => None,
        }
    }
}

/// A parsed range: operator plus target version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Range {
    pub operator: Operator,
    pub target: Version,
}

impl Range {
    pub fn new(operator: Operator, target: Version) -> Self {
        Self { operator, target }
    }

    /// Parse a range expression.
    ///
    /// The operator is the run of characters before the first digit. An
    /// unrecognized operator yields [`VersionError::UnknownOperator`]; a bad
    /// target yields [`VersionError::MalformedVersion`].
    pub fn parse(text: &str) -> Result<Self, VersionError> {
        let text = text.trim();
        let split = text
            .find(|c: char| c.is_ascii_digit())
            .unwrap_or(text.len());
        let (token, target) = text.split_at(split);
        let token = token.trim();

        if token.is_empty() && target.is_empty() {
            return Err(VersionError::MalformedVersion(text.to_string()));
        }

        let operator = Operator::from_token(token)
            .ok_or_else(|| VersionError::UnknownOperator(token.to_string()))?;
        let target = Version::parse(target)?;

        Ok(Self { operator, target })
    }

    pub fn satisfies(&self, version: &Version) -> bool {
        let target = &self.target;
        match self.operator {
            // Patch is deliberately not compared under caret
            Operator::Caret => {
                version.major == target.major
                    && if target.major > 0 {
                        version.minor >= target.minor
                    } else {
                        version.minor == target.minor
                    }
            }
            Operator::Tilde => {
                version.major == target.major
                    && version.minor == target.minor
                    && version.patch >= target.patch
            }
            Operator::Gte => version >= target,
            Operator::Gt => version > target,
            Operator::Lte => version <= target,
            Operator::Lt => version < target,
            Operator::Eq => version == target,
        }
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.operator.as_str(), self.target)
    }
}

impl FromStr for Range {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Check whether `version` falls inside the range expression `range`
pub fn satisfies(version: &Version, range: &str) -> Result<bool, VersionError> {
    Ok(Range::parse(range)?.satisfies(version))
}
