//! Registry and version source test utilities

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use version_engine::graph::{InMemoryRegistry, ModuleId};
use version_engine::version::error::RegistryError;
use version_engine::version::source::{StaticVersionSource, VersionSource};

/// Version source that records every fetch and fails for selected packages
pub struct RecordingSource {
    inner: StaticVersionSource,
    failing: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl RecordingSource {
    pub fn new() -> Self {
        Self {
            inner: StaticVersionSource::default(),
            failing: HashSet::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_versions(mut self, package: &str, versions: &[&str]) -> Self {
        self.inner = self.inner.with_versions(package, versions);
        self
    }

    pub fn failing_for(mut self, package: &str) -> Self {
        self.failing.insert(package.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl VersionSource for RecordingSource {
    async fn fetch_latest_versions(&self, package_name: &str) -> Result<Vec<String>, RegistryError> {
        self.calls.lock().unwrap().push(package_name.to_string());
        if self.failing.contains(package_name) {
            return Err(RegistryError::InvalidResponse(format!(
                "connection reset while fetching {}",
                package_name
            )));
        }
        self.inner.fetch_latest_versions(package_name).await
    }
}

/// Build an in-memory registry from `(module id, dependency specifiers)` pairs
pub fn create_test_registry(modules: &[(&str, &[&str])]) -> InMemoryRegistry {
    modules
        .iter()
        .fold(InMemoryRegistry::default(), |registry, (module, deps)| {
            registry.with_module(module, deps).unwrap()
        })
}

pub fn id(text: &str) -> ModuleId {
    ModuleId::parse(text).unwrap()
}
