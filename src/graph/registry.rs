//! Module registry: the dependency graph the engine resolves against

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use indexmap::{IndexMap, IndexSet};
#[cfg(test)]
use mockall::automock;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::graph::module_id::{DependencySpec, ModuleId};
use crate::version::error::{RegistryError, VersionError};
use crate::version::semver::Version;
use crate::version::source::StaticVersionSource;

/// Module id -> dependency specifiers (`name@versionOrRange`) it declares
pub type DependencyGraph = IndexMap<ModuleId, IndexSet<String>>;

/// Stored configuration for a registered module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleConfig {
    pub version: Version,
}

/// A module as the registry resolves it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedModule {
    pub config: ModuleConfig,
    /// Concrete modules this module's specifiers resolve to
    pub dependencies: Vec<ModuleId>,
}

/// Trait for the registry that owns the dependency graph
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait ModuleRegistry: Send + Sync {
    /// Snapshot of the whole dependency graph
    async fn dependency_graph(&self) -> Result<DependencyGraph, RegistryError>;

    /// Resolve a module's stored config and its concrete dependencies
    async fn resolve_module(&self, module_id: &ModuleId) -> Result<ResolvedModule, RegistryError>;

    /// Record a new version for a module, returning its new identifier
    ///
    /// This is the only write the engine performs against external state.
    async fn set_module_version(
        &self,
        module_id: &ModuleId,
        version: &Version,
    ) -> Result<ModuleId, RegistryError>;
}

/// Registry holding the graph in memory
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    graph: Mutex<DependencyGraph>,
}

impl InMemoryRegistry {
    pub fn new(graph: DependencyGraph) -> Self {
        Self {
            graph: Mutex::new(graph),
        }
    }

    /// Register a module with its dependency specifiers
    pub fn with_module(
        mut self,
        module_id: &str,
        dependencies: &[&str],
    ) -> Result<Self, VersionError> {
        let id = ModuleId::parse(module_id)?;
        self.graph
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(id)
            .or_default()
            .extend(dependencies.iter().map(|d| d.to_string()));
        Ok(self)
    }

    /// Acquire graph lock with proper error handling
    fn lock_graph(&self) -> Result<MutexGuard<'_, DependencyGraph>, RegistryError> {
        self.graph.lock().map_err(|_| RegistryError::LockPoisoned)
    }

    /// Pick the highest registered module matching a specifier
    fn resolve_specifier(graph: &DependencyGraph, specifier: &str) -> Option<ModuleId> {
        let range = DependencySpec::parse(specifier)
            .and_then(|spec| spec.range().map(|range| (spec.name, range)))
            .inspect_err(|e| warn!("Ignoring dependency specifier {}: {}", specifier, e))
            .ok();
        let (name, range) = range?;

        let resolved = graph
            .keys()
            .filter(|id| id.name == name && range.satisfies(&id.version))
            .max_by(|a, b| a.version.cmp(&b.version))
            .cloned();

        if resolved.is_none() {
            debug!("No registered module satisfies {}", specifier);
        }
        resolved
    }
}

#[async_trait::async_trait]
impl ModuleRegistry for InMemoryRegistry {
    async fn dependency_graph(&self) -> Result<DependencyGraph, RegistryError> {
        Ok(self.lock_graph()?.clone())
    }

    async fn resolve_module(&self, module_id: &ModuleId) -> Result<ResolvedModule, RegistryError> {
        let graph = self.lock_graph()?;
        let specifiers = graph
            .get(module_id)
            .ok_or_else(|| RegistryError::UnknownModule(module_id.to_string()))?;

        let dependencies = specifiers
            .iter()
            .filter_map(|specifier| Self::resolve_specifier(&graph, specifier))
            .collect();

        Ok(ResolvedModule {
            config: ModuleConfig {
                version: module_id.version.clone(),
            },
            dependencies,
        })
    }

    async fn set_module_version(
        &self,
        module_id: &ModuleId,
        version: &Version,
    ) -> Result<ModuleId, RegistryError> {
        let mut graph = self.lock_graph()?;
        if !graph.contains_key(module_id) {
            return Err(RegistryError::UnknownModule(module_id.to_string()));
        }

        let updated = module_id.with_version(version.clone());

        // Rebuild so the module keeps its position; an entry already at the
        // new version absorbs the old specifiers
        let mut rebuilt = DependencyGraph::with_capacity(graph.len());
        for (id, specifiers) in graph.drain(..) {
            let id = if &id == module_id { updated.clone() } else { id };
            rebuilt.entry(id).or_default().extend(specifiers);
        }
        *graph = rebuilt;

        info!("Registry: {} -> {}", module_id, updated);
        Ok(updated)
    }
}

/// JSON snapshot of a registry plus the versions published for each package
///
/// ```json
/// {
///   "modules": { "app@1.0.0": ["lib@^1.0.0"], "lib@1.0.0": [] },
///   "versions": { "lib": ["1.0.0", "1.1.0"] }
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegistrySnapshot {
    pub modules: IndexMap<ModuleId, IndexSet<String>>,
    pub versions: HashMap<String, Vec<String>>,
}

impl RegistrySnapshot {
    pub fn into_parts(self) -> (InMemoryRegistry, StaticVersionSource) {
        (
            InMemoryRegistry::new(self.modules),
            StaticVersionSource::new(self.versions),
        )
    }
}
