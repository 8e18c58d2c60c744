//! Version source trait for fetching the published versions of a package

use std::collections::HashMap;

#[cfg(test)]
use mockall::automock;

use crate::version::error::RegistryError;

/// Trait for fetching the versions available for a package name
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait VersionSource: Send + Sync {
    /// Fetches every published version string for a package
    ///
    /// # Arguments
    /// * `package_name` - The name of the package (e.g., "lodash" or "@types/node")
    ///
    /// # Returns
    /// * `Ok(Vec<String>)` - Version strings; order is not significant
    /// * `Err(RegistryError)` - If the fetch fails
    async fn fetch_latest_versions(&self, package_name: &str) -> Result<Vec<String>, RegistryError>;
}

/// Version source backed by a fixed name -> versions table
#[derive(Debug, Clone, Default)]
pub struct StaticVersionSource {
    versions: HashMap<String, Vec<String>>,
}

impl StaticVersionSource {
    pub fn new(versions: HashMap<String, Vec<String>>) -> Self {
        Self { versions }
    }

    pub fn with_versions(mut self, package: &str, versions: &[&str]) -> Self {
        self.versions.insert(
            package.to_string(),
            versions.iter().map(|v| v.to_string()).collect(),
        );
        self
    }
}

#[async_trait::async_trait]
impl VersionSource for StaticVersionSource {
    async fn fetch_latest_versions(&self, package_name: &str) -> Result<Vec<String>, RegistryError> {
        self.versions
            .get(package_name)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(package_name.to_string()))
    }
}
