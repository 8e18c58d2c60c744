//! Conflict detection and resolution across the dependency graph
//!
//! A dependency name is in conflict when the graph as a whole requests it at
//! more than one distinct version string. Resolution picks a single version
//! per [`ConflictStrategy`]; when the `specific` strategy finds incompatible
//! majors it keeps the first requested version and reports the conflict as
//! [`ResolutionKind::Maintained`] instead of failing.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::graph::module_id::{DependencySpec, ModuleId};
use crate::graph::registry::{DependencyGraph, ModuleRegistry};
use crate::version::error::{EngineError, VersionError};
use crate::version::range::Range;
use crate::version::semver::Version;

/// How conflicting requested versions are merged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictStrategy {
    #[default]
    Highest,
    Lowest,
    Specific,
}

impl ConflictStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictStrategy::Highest => "highest",
            ConflictStrategy::Lowest => "lowest",
            ConflictStrategy::Specific => "specific",
        }
    }
}

impl fmt::Display for ConflictStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConflictStrategy {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "highest" => Ok(ConflictStrategy::Highest),
            "lowest" => Ok(ConflictStrategy::Lowest),
            "specific" => Ok(ConflictStrategy::Specific),
            _ => Err(VersionError::UnknownStrategy(s.to_string())),
        }
    }
}

/// Outcome tag of a resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionKind {
    Highest,
    Lowest,
    Specific,
    /// Incompatible majors were left side by side
    Maintained,
}

/// A dependency requested at more than one version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub name: String,
    /// Distinct requested version strings, in discovery order
    pub versions: IndexSet<String>,
    /// Dependent module -> version string it requires
    pub dependents: IndexMap<ModuleId, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictResolution {
    /// Name of the conflicting dependency
    pub module_id: String,
    pub resolved_version: Version,
    pub conflicting_versions: Vec<String>,
    pub resolution: ResolutionKind,
    pub reason: String,
}

/// Group every `name@version` specifier in the graph by name and keep the
/// names requested at more than one distinct version.
pub fn find_conflicts(graph: &DependencyGraph) -> Vec<Conflict> {
    let mut requested: IndexMap<String, Conflict> = IndexMap::new();

    for (dependent, specifiers) in graph {
        for specifier in specifiers {
            let Ok(spec) = DependencySpec::parse(specifier)
                .inspect_err(|e| warn!("Skipping specifier {} of {}: {}", specifier, dependent, e))
            else {
                continue;
            };

            let entry = requested
                .entry(spec.name.clone())
                .or_insert_with(|| Conflict {
                    name: spec.name.clone(),
                    versions: IndexSet::new(),
                    dependents: IndexMap::new(),
                });
            entry.versions.insert(spec.requirement.clone());
            entry.dependents.insert(dependent.clone(), spec.requirement);
        }
    }

    requested
        .into_values()
        .filter(|conflict| conflict.versions.len() > 1)
        .collect()
}

/// Pick one version for a conflict under `strategy`.
///
/// Requested strings may carry a range operator; the operator's target version
/// is what gets ranked.
pub fn resolve_conflict(
    conflict: &Conflict,
    strategy: ConflictStrategy,
) -> Result<ConflictResolution, VersionError> {
    let parsed = conflict
        .versions
        .iter()
        .map(|text| Range::parse(text).map(|range| range.target))
        .collect::<Result<Vec<_>, _>>()?;

    let (first, _) = parsed
        .split_first()
        .ok_or_else(|| VersionError::MalformedVersion(format!("{}@", conflict.name)))?;
    let highest = parsed.iter().max().unwrap_or(first);
    let lowest = parsed.iter().min().unwrap_or(first);

    let (resolved, resolution, reason) = match strategy {
        ConflictStrategy::Highest => (
            highest,
            ResolutionKind::Highest,
            format!("Selected highest of {} requested versions", parsed.len()),
        ),
        ConflictStrategy::Lowest => (
            lowest,
            ResolutionKind::Lowest,
            format!("Selected lowest of {} requested versions", parsed.len()),
        ),
        ConflictStrategy::Specific if parsed.iter().all(|v| v.major == first.major) => (
            highest,
            ResolutionKind::Specific,
            format!(
                "All requested versions share major {}; selected highest",
                first.major
            ),
        ),
        ConflictStrategy::Specific => (
            first,
            ResolutionKind::Maintained,
            format!(
                "Requested versions span incompatible majors; keeping {} alongside the others",
                first
            ),
        ),
    };

    Ok(ConflictResolution {
        module_id: conflict.name.clone(),
        resolved_version: resolved.clone(),
        conflicting_versions: conflict.versions.iter().cloned().collect(),
        resolution,
        reason,
    })
}

#[derive(Debug, Default)]
struct ResolverState {
    strategy: ConflictStrategy,
    resolutions: HashMap<String, ConflictResolution>,
}

/// Detects and resolves version conflicts, caching the latest resolution per dependency name
pub struct ConflictResolver {
    registry: Arc<dyn ModuleRegistry>,
    state: Mutex<ResolverState>,
}

impl ConflictResolver {
    pub fn new(registry: Arc<dyn ModuleRegistry>, strategy: ConflictStrategy) -> Self {
        Self {
            registry,
            state: Mutex::new(ResolverState {
                strategy,
                resolutions: HashMap::new(),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, ResolverState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn strategy(&self) -> ConflictStrategy {
        self.state().strategy
    }

    pub fn set_strategy(&self, strategy: ConflictStrategy) {
        self.state().strategy = strategy;
    }

    /// Most recent resolution recorded for a dependency name
    pub fn cached_resolution(&self, name: &str) -> Option<ConflictResolution> {
        self.state().resolutions.get(name).cloned()
    }

    pub fn cached_resolutions(&self) -> Vec<ConflictResolution> {
        let mut resolutions: Vec<_> = self.state().resolutions.values().cloned().collect();
        resolutions.sort_by(|a, b| a.module_id.cmp(&b.module_id));
        resolutions
    }

    /// Detect conflicts across the whole graph.
    ///
    /// `module_id` only names the module that triggered the pass; detection is
    /// not limited to its descendants.
    pub async fn detect_conflicts(&self, module_id: &ModuleId) -> Result<Vec<Conflict>, EngineError> {
        let graph = self.registry.dependency_graph().await?;
        let conflicts = find_conflicts(&graph);
        debug!(
            "Detected {} conflicts while checking {}",
            conflicts.len(),
            module_id
        );
        Ok(conflicts)
    }

    pub async fn resolve_conflicts(
        &self,
        module_id: &ModuleId,
    ) -> Result<Vec<ConflictResolution>, EngineError> {
        let conflicts = self.detect_conflicts(module_id).await?;
        let strategy = self.strategy();

        let resolutions = conflicts
            .iter()
            .map(|conflict| resolve_conflict(conflict, strategy))
            .collect::<Result<Vec<_>, _>>()?;

        let mut state = self.state();
        for resolution in &resolutions {
            info!(
                "Resolved {} to {} ({:?}): {}",
                resolution.module_id,
                resolution.resolved_version,
                resolution.resolution,
                resolution.reason
            );
            state
                .resolutions
                .insert(resolution.module_id.clone(), resolution.clone());
        }

        Ok(resolutions)
    }
}
