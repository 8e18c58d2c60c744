//! Upgrade planning and execution
//!
//! The planner fetches the published versions of a module, selects the highest
//! candidate allowed by the [`UpgradeStrategy`], applies it through the
//! [`ModuleRegistry`] and re-runs conflict resolution for the new module id.
//!
//! Per-module failures never escape [`UpgradePlanner::upgrade_module`]: they are
//! reported as [`UpgradeStatus::Failed`] so a batch keeps going.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::graph::module_id::ModuleId;
use crate::graph::registry::ModuleRegistry;
use crate::resolver::conflict::{ConflictResolver, ConflictStrategy};
use crate::upgrade::types::{
    UpgradeOptions, UpgradePreview, UpgradeResult, UpgradeStatus, UpgradeStrategy,
};
use crate::version::error::EngineError;
use crate::version::semver::Version;
use crate::version::source::VersionSource;

const NO_UPGRADE_REASON: &str = "No compatible upgrade found";
const BREAKING_REASON: &str = "Breaking change requires ignoreBreaking";
const IN_PROGRESS_REASON: &str = "Upgrade already in progress";

/// Whether `target` is an acceptable upgrade from `current` under `strategy`
pub fn is_valid_upgrade(current: &Version, target: &Version, strategy: UpgradeStrategy) -> bool {
    match strategy {
        UpgradeStrategy::All => target > current,
        UpgradeStrategy::Compatible => target.major == current.major && target > current,
        UpgradeStrategy::Minor => target.major == current.major && target.minor > current.minor,
        UpgradeStrategy::Patch => {
            target.major == current.major
                && target.minor == current.minor
                && target.patch > current.patch
        }
    }
}

/// A major bump is the only breaking change
pub fn is_breaking_change(current: &Version, target: &Version) -> bool {
    target.major > current.major
}

/// Parse available version strings, skipping (and logging) anything unparsable
fn parse_available(available: &[String]) -> Vec<Version> {
    available
        .iter()
        .filter_map(|text| {
            Version::parse(text)
                .inspect_err(|e| warn!("Ignoring published version: {}", e))
                .ok()
        })
        .collect()
}

/// Highest available version that is a valid upgrade from `current`
pub fn find_compatible_upgrade(
    current: &Version,
    available: &[String],
    options: &UpgradeOptions,
) -> Option<Version> {
    let candidates: Vec<Version> = parse_available(available)
        .into_iter()
        .filter(|v| options.include_prereleases || !v.is_prerelease())
        .filter(|v| is_valid_upgrade(current, v, options.strategy))
        .collect();

    debug!(
        "{} of {} versions qualify as {} upgrades from {}",
        candidates.len(),
        available.len(),
        options.strategy,
        current
    );

    candidates.into_iter().max()
}

/// Plans and applies module upgrades, remembering the outcome per module id
pub struct UpgradePlanner {
    registry: Arc<dyn ModuleRegistry>,
    source: Arc<dyn VersionSource>,
    resolver: ConflictResolver,
    in_flight: Mutex<HashSet<ModuleId>>,
    completed: Mutex<IndexMap<ModuleId, UpgradeResult>>,
}

impl UpgradePlanner {
    pub fn new(
        registry: Arc<dyn ModuleRegistry>,
        source: Arc<dyn VersionSource>,
        conflict_strategy: ConflictStrategy,
    ) -> Self {
        Self {
            resolver: ConflictResolver::new(registry.clone(), conflict_strategy),
            registry,
            source,
            in_flight: Mutex::new(HashSet::new()),
            completed: Mutex::new(IndexMap::new()),
        }
    }

    pub fn conflict_resolver(&self) -> &ConflictResolver {
        &self.resolver
    }

    fn completed(&self) -> MutexGuard<'_, IndexMap<ModuleId, UpgradeResult>> {
        self.completed.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Last result recorded for a module id
    pub fn completed_result(&self, module_id: &ModuleId) -> Option<UpgradeResult> {
        self.completed().get(module_id).cloned()
    }

    pub fn completed_results(&self) -> Vec<UpgradeResult> {
        self.completed().values().cloned().collect()
    }

    /// Mark a module as being upgraded; `None` if another call already holds it.
    ///
    /// The mark is released when the returned guard drops, including when the
    /// upgrade future is cancelled mid-flight.
    fn try_start_upgrade(&self, module_id: &ModuleId) -> Option<InFlightGuard<'_>> {
        let started = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(module_id.clone());

        started.then(|| InFlightGuard {
            in_flight: &self.in_flight,
            module_id: module_id.clone(),
        })
    }

    /// Upgrade a single module.
    ///
    /// Always returns a result; fetch and registry errors become
    /// [`UpgradeStatus::Failed`].
    pub async fn upgrade_module(
        &self,
        module_id: &ModuleId,
        options: &UpgradeOptions,
    ) -> UpgradeResult {
        let Some(guard) = self.try_start_upgrade(module_id) else {
            info!("Skipping {}: upgrade already in progress", module_id);
            return unchanged(module_id, UpgradeStatus::Skipped, IN_PROGRESS_REASON);
        };

        let result = match self.plan_and_apply(module_id, options).await {
            Ok(result) => result,
            Err(e) => {
                warn!("Upgrade of {} failed: {}", module_id, e);
                unchanged(module_id, UpgradeStatus::Failed, &e.to_string())
            }
        };

        drop(guard);
        self.completed().insert(module_id.clone(), result.clone());

        result
    }

    async fn plan_and_apply(
        &self,
        module_id: &ModuleId,
        options: &UpgradeOptions,
    ) -> Result<UpgradeResult, EngineError> {
        let available = self.source.fetch_latest_versions(&module_id.name).await?;
        let current = &module_id.version;

        let Some(target) = find_compatible_upgrade(current, &available, options) else {
            debug!("No {} upgrade for {}", options.strategy, module_id);
            return Ok(unchanged(module_id, UpgradeStatus::Skipped, NO_UPGRADE_REASON));
        };

        let breaking = is_breaking_change(current, &target);
        if breaking && !options.ignore_breaking {
            info!(
                "Skipping {} -> {}: breaking change not allowed",
                module_id, target
            );
            return Ok(UpgradeResult {
                module_id: module_id.to_string(),
                from_version: current.to_string(),
                to_version: target.to_string(),
                status: UpgradeStatus::Skipped,
                reason: Some(BREAKING_REASON.to_string()),
                breaking: true,
            });
        }

        let upgraded = self.registry.set_module_version(module_id, &target).await?;
        info!("Upgraded {} -> {}", module_id, upgraded);

        // The registry already holds the new version, so the result must say so
        let (status, reason) = match self.resolver.resolve_conflicts(&upgraded).await {
            Ok(_) => (UpgradeStatus::Success, None),
            Err(e) => {
                warn!("Conflict re-resolution after {} failed: {}", upgraded, e);
                let reason = format!(
                    "Applied {} but conflict re-resolution failed: {}",
                    target, e
                );
                (UpgradeStatus::Failed, Some(reason))
            }
        };

        Ok(UpgradeResult {
            module_id: module_id.to_string(),
            from_version: current.to_string(),
            to_version: target.to_string(),
            status,
            reason,
            breaking,
        })
    }

    /// Upgrade several modules and, depth permitting, their dependencies.
    ///
    /// Modules are processed one at a time in depth-first discovery order. Each
    /// module id is processed at most once per call, which also stops the walk
    /// on cyclic graphs.
    pub async fn upgrade_batch(
        &self,
        module_ids: &[ModuleId],
        options: &UpgradeOptions,
    ) -> Vec<UpgradeResult> {
        let mut visited: HashSet<ModuleId> = HashSet::new();
        let mut results = Vec::new();

        for root in module_ids {
            let mut stack = vec![(root.clone(), options.clone())];

            while let Some((module_id, module_options)) = stack.pop() {
                if !visited.insert(module_id.clone()) {
                    continue;
                }

                // Dependencies are read before the module is re-keyed by its upgrade
                let dependencies: Vec<(ModuleId, UpgradeOptions)> = match module_options.descend() {
                    Some(next) => self
                        .dependencies_of(&module_id)
                        .await
                        .into_iter()
                        .map(|dep| (dep, next.clone()))
                        .collect(),
                    None => Vec::new(),
                };

                results.push(self.upgrade_module(&module_id, &module_options).await);

                stack.extend(
                    dependencies
                        .into_iter()
                        .rev()
                        .filter(|(dep, _)| !visited.contains(dep)),
                );
            }
        }

        results
    }

    async fn dependencies_of(&self, module_id: &ModuleId) -> Vec<ModuleId> {
        match self.registry.resolve_module(module_id).await {
            Ok(module) => module.dependencies,
            Err(e) => {
                warn!("Cannot read dependencies of {}: {}", module_id, e);
                Vec::new()
            }
        }
    }

    /// Compute what [`upgrade_module`](Self::upgrade_module) would select, without applying it
    pub async fn get_upgrade_preview(
        &self,
        module_id: &ModuleId,
        options: &UpgradeOptions,
    ) -> Result<UpgradePreview, EngineError> {
        let available_text = self.source.fetch_latest_versions(&module_id.name).await?;
        let current = module_id.version.clone();

        let recommended = find_compatible_upgrade(&current, &available_text, options);
        let breaking = recommended
            .as_ref()
            .is_some_and(|target| is_breaking_change(&current, target));

        let mut available = parse_available(&available_text);
        available.sort_by(|a, b| b.cmp(a));
        available.dedup();

        Ok(UpgradePreview {
            current,
            available,
            recommended,
            breaking,
        })
    }
}

/// Holds a module's in-flight mark until dropped
struct InFlightGuard<'a> {
    in_flight: &'a Mutex<HashSet<ModuleId>>,
    module_id: ModuleId,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.module_id);
    }
}

fn unchanged(module_id: &ModuleId, status: UpgradeStatus, reason: &str) -> UpgradeResult {
    let version = module_id.version.to_string();
    UpgradeResult {
        module_id: module_id.to_string(),
        from_version: version.clone(),
        to_version: version,
        status,
        reason: Some(reason.to_string()),
        breaking: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::registry::{InMemoryRegistry, MockModuleRegistry, ResolvedModule};
    use crate::version::error::RegistryError;
    use crate::version::source::{MockVersionSource, StaticVersionSource};
    use rstest::rstest;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    fn v(text: &str) -> Version {
        Version::parse(text).unwrap()
    }

    fn id(text: &str) -> ModuleId {
        ModuleId::parse(text).unwrap()
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn options(strategy: UpgradeStrategy) -> UpgradeOptions {
        UpgradeOptions {
            strategy,
            ..Default::default()
        }
    }

    #[rstest]
    #[case(UpgradeStrategy::All, "2.0.0", true)]
    #[case(UpgradeStrategy::All, "1.2.3", false)]
    #[case(UpgradeStrategy::Compatible, "1.2.4", true)]
    #[case(UpgradeStrategy::Compatible, "2.0.0", false)]
    #[case(UpgradeStrategy::Minor, "1.3.0", true)]
    #[case(UpgradeStrategy::Minor, "1.2.9", false)]
    #[case(UpgradeStrategy::Patch, "1.2.4", true)]
    #[case(UpgradeStrategy::Patch, "1.3.0", false)]
    #[case(UpgradeStrategy::Patch, "1.2.3", false)]
    fn is_valid_upgrade_follows_strategy(
        #[case] strategy: UpgradeStrategy,
        #[case] target: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(is_valid_upgrade(&v("1.2.3"), &v(target), strategy), expected);
    }

    #[rstest]
    #[case("1.2.3", "2.0.0", true)]
    #[case("1.2.3", "1.9.0", false)]
    #[case("0.1.0", "0.2.0", false)]
    fn is_breaking_change_compares_major(
        #[case] current: &str,
        #[case] target: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(is_breaking_change(&v(current), &v(target)), expected);
    }

    #[rstest]
    #[case(UpgradeStrategy::Patch, false, Some("1.2.4"))]
    #[case(UpgradeStrategy::Minor, false, Some("1.3.0"))]
    #[case(UpgradeStrategy::Compatible, false, Some("1.3.0"))]
    #[case(UpgradeStrategy::Compatible, true, Some("1.4.0-beta"))]
    #[case(UpgradeStrategy::All, false, Some("2.0.0"))]
    fn find_compatible_upgrade_selects_highest_valid(
        #[case] strategy: UpgradeStrategy,
        #[case] include_prereleases: bool,
        #[case] expected: Option<&str>,
    ) {
        let available = strings(&["1.2.4", "1.3.0", "garbage", "1.4.0-beta", "2.0.0", "1.0.0"]);
        let options = UpgradeOptions {
            include_prereleases,
            ..options(strategy)
        };

        assert_eq!(
            find_compatible_upgrade(&v("1.2.3"), &available, &options),
            expected.map(v)
        );
    }

    #[test]
    fn find_compatible_upgrade_returns_none_when_current_is_newest() {
        let available = strings(&["1.0.0", "1.2.3"]);

        assert_eq!(
            find_compatible_upgrade(&v("1.2.3"), &available, &options(UpgradeStrategy::All)),
            None
        );
    }

    fn planner_with(registry: InMemoryRegistry, source: StaticVersionSource) -> UpgradePlanner {
        UpgradePlanner::new(
            Arc::new(registry),
            Arc::new(source),
            ConflictStrategy::Highest,
        )
    }

    #[tokio::test]
    async fn upgrade_module_applies_patch_upgrade() {
        let registry = InMemoryRegistry::default()
            .with_module("lib@1.2.3", &[])
            .unwrap();
        let source =
            StaticVersionSource::default().with_versions("lib", &["1.2.4", "1.3.0", "2.0.0"]);
        let planner = planner_with(registry, source);

        let result = planner
            .upgrade_module(&id("lib@1.2.3"), &options(UpgradeStrategy::Patch))
            .await;

        assert_eq!(
            result,
            UpgradeResult {
                module_id: "lib@1.2.3".to_string(),
                from_version: "1.2.3".to_string(),
                to_version: "1.2.4".to_string(),
                status: UpgradeStatus::Success,
                reason: None,
                breaking: false,
            }
        );
        assert_eq!(planner.completed_result(&id("lib@1.2.3")), Some(result));
    }

    #[tokio::test]
    async fn upgrade_module_skips_breaking_change_without_touching_registry() {
        let mut registry = MockModuleRegistry::new();
        registry.expect_set_module_version().never();
        registry.expect_dependency_graph().never();
        let mut source = MockVersionSource::new();
        source
            .expect_fetch_latest_versions()
            .returning(|_| Ok(vec!["2.0.0".to_string()]));
        let planner = UpgradePlanner::new(
            Arc::new(registry),
            Arc::new(source),
            ConflictStrategy::Highest,
        );

        let result = planner
            .upgrade_module(&id("lib@1.4.0"), &options(UpgradeStrategy::All))
            .await;

        assert_eq!(result.status, UpgradeStatus::Skipped);
        assert!(result.breaking);
        assert_eq!(result.to_version, "2.0.0");
    }

    #[tokio::test]
    async fn upgrade_module_applies_breaking_change_when_ignored() {
        let registry = InMemoryRegistry::default()
            .with_module("lib@1.4.0", &[])
            .unwrap();
        let source = StaticVersionSource::default().with_versions("lib", &["2.0.0"]);
        let planner = planner_with(registry, source);
        let options = UpgradeOptions {
            ignore_breaking: true,
            ..options(UpgradeStrategy::All)
        };

        let result = planner.upgrade_module(&id("lib@1.4.0"), &options).await;

        assert_eq!(result.status, UpgradeStatus::Success);
        assert!(result.breaking);
    }

    #[tokio::test]
    async fn upgrade_module_skips_when_nothing_qualifies() {
        let registry = InMemoryRegistry::default()
            .with_module("lib@1.2.3", &[])
            .unwrap();
        let source = StaticVersionSource::default().with_versions("lib", &["1.2.3", "1.0.0"]);
        let planner = planner_with(registry, source);

        let result = planner
            .upgrade_module(&id("lib@1.2.3"), &options(UpgradeStrategy::All))
            .await;

        assert_eq!(result.status, UpgradeStatus::Skipped);
        assert_eq!(result.reason.as_deref(), Some(NO_UPGRADE_REASON));
        assert_eq!(result.to_version, "1.2.3");
    }

    #[tokio::test]
    async fn upgrade_module_reports_fetch_failure() {
        let registry = InMemoryRegistry::default();
        let planner = planner_with(registry, StaticVersionSource::default());

        let result = planner
            .upgrade_module(&id("lib@1.0.0"), &options(UpgradeStrategy::All))
            .await;

        assert_eq!(result.status, UpgradeStatus::Failed);
        assert_eq!(result.reason.as_deref(), Some("Package not found: lib"));
    }

    #[tokio::test]
    async fn upgrade_module_reports_registry_write_failure() {
        let mut registry = MockModuleRegistry::new();
        registry
            .expect_set_module_version()
            .returning(|id, _| Err(RegistryError::UnknownModule(id.to_string())));
        let source = StaticVersionSource::default().with_versions("lib", &["1.0.1"]);
        let planner = UpgradePlanner::new(
            Arc::new(registry),
            Arc::new(source),
            ConflictStrategy::Highest,
        );

        let result = planner
            .upgrade_module(&id("lib@1.0.0"), &options(UpgradeStrategy::Patch))
            .await;

        assert_eq!(result.status, UpgradeStatus::Failed);
        assert_eq!(
            result.reason.as_deref(),
            Some("Module not registered: lib@1.0.0")
        );
    }

    #[tokio::test]
    async fn upgrade_module_skips_module_already_in_flight() {
        let planner = planner_with(InMemoryRegistry::default(), StaticVersionSource::default());
        let guard = planner.try_start_upgrade(&id("lib@1.0.0"));
        assert!(guard.is_some());

        let result = planner
            .upgrade_module(&id("lib@1.0.0"), &options(UpgradeStrategy::All))
            .await;

        assert_eq!(result.status, UpgradeStatus::Skipped);
        assert_eq!(result.reason.as_deref(), Some(IN_PROGRESS_REASON));

        drop(guard);
        assert!(planner.try_start_upgrade(&id("lib@1.0.0")).is_some());
    }

    /// Source whose first fetch stalls long enough to be cut off by a timeout
    struct StallingSource {
        stalled: AtomicBool,
    }

    #[async_trait::async_trait]
    impl VersionSource for StallingSource {
        async fn fetch_latest_versions(&self, _name: &str) -> Result<Vec<String>, RegistryError> {
            if !self.stalled.swap(true, Ordering::SeqCst) {
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
            Ok(vec!["1.0.1".to_string()])
        }
    }

    #[tokio::test]
    async fn upgrade_module_releases_in_flight_mark_when_cancelled() {
        let registry = InMemoryRegistry::default()
            .with_module("lib@1.0.0", &[])
            .unwrap();
        let planner = UpgradePlanner::new(
            Arc::new(registry),
            Arc::new(StallingSource {
                stalled: AtomicBool::new(false),
            }),
            ConflictStrategy::Highest,
        );
        let options = options(UpgradeStrategy::Patch);

        let first = tokio::time::timeout(
            Duration::from_millis(50),
            planner.upgrade_module(&id("lib@1.0.0"), &options),
        )
        .await;
        assert!(first.is_err());
        assert_eq!(planner.completed_result(&id("lib@1.0.0")), None);

        let retried = planner.upgrade_module(&id("lib@1.0.0"), &options).await;

        assert_eq!(retried.status, UpgradeStatus::Success);
        assert_eq!(retried.to_version, "1.0.1");
    }

    #[tokio::test]
    async fn upgrade_module_reports_applied_version_when_re_resolution_fails() {
        let registry = Arc::new(
            InMemoryRegistry::default()
                .with_module("a@1.0.0", &["lib@1.0.0"])
                .unwrap()
                .with_module("b@1.0.0", &["lib@1.x"])
                .unwrap(),
        );
        let source = StaticVersionSource::default().with_versions("a", &["1.0.1"]);
        let planner = UpgradePlanner::new(
            registry.clone(),
            Arc::new(source),
            ConflictStrategy::Highest,
        );

        let result = planner
            .upgrade_module(&id("a@1.0.0"), &options(UpgradeStrategy::Patch))
            .await;

        assert_eq!(result.status, UpgradeStatus::Failed);
        assert_eq!(result.from_version, "1.0.0");
        assert_eq!(result.to_version, "1.0.1");
        assert_eq!(
            result.reason.as_deref(),
            Some("Applied 1.0.1 but conflict re-resolution failed: Malformed version: \"1.x\"")
        );
        assert!(
            registry
                .dependency_graph()
                .await
                .unwrap()
                .contains_key(&id("a@1.0.1"))
        );
        assert_eq!(planner.completed_result(&id("a@1.0.0")), Some(result));
    }

    #[tokio::test]
    async fn upgrade_module_re_resolves_conflicts_after_apply() {
        let registry = InMemoryRegistry::default()
            .with_module("a@1.0.0", &["lib@1.0.0"])
            .unwrap()
            .with_module("b@1.0.0", &["lib@1.5.0"])
            .unwrap()
            .with_module("lib@1.0.0", &[])
            .unwrap();
        let source = StaticVersionSource::default().with_versions("a", &["1.0.1"]);
        let planner = planner_with(registry, source);

        planner
            .upgrade_module(&id("a@1.0.0"), &options(UpgradeStrategy::Patch))
            .await;

        let cached = planner.conflict_resolver().cached_resolution("lib").unwrap();
        assert_eq!(cached.resolved_version, v("1.5.0"));
    }

    #[tokio::test]
    async fn upgrade_batch_with_zero_depth_never_reads_dependencies() {
        let mut registry = MockModuleRegistry::new();
        registry.expect_resolve_module().never();
        registry
            .expect_set_module_version()
            .returning(|id, version| Ok(id.with_version(version.clone())));
        registry
            .expect_dependency_graph()
            .returning(|| Ok(Default::default()));
        let source = StaticVersionSource::default().with_versions("app", &["1.0.1"]);
        let planner = UpgradePlanner::new(
            Arc::new(registry),
            Arc::new(source),
            ConflictStrategy::Highest,
        );
        let options = UpgradeOptions {
            depth: Some(0),
            ..options(UpgradeStrategy::Patch)
        };

        let results = planner.upgrade_batch(&[id("app@1.0.0")], &options).await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].status, UpgradeStatus::Success);
    }

    #[tokio::test]
    async fn upgrade_batch_stops_on_cycles() {
        let mut registry = MockModuleRegistry::new();
        registry.expect_resolve_module().returning(|id| {
            let other = if id.name == "a" { "b@1.0.0" } else { "a@1.0.0" };
            Ok(ResolvedModule {
                config: crate::graph::registry::ModuleConfig {
                    version: id.version.clone(),
                },
                dependencies: vec![ModuleId::parse(other).unwrap()],
            })
        });
        let mut source = MockVersionSource::new();
        source
            .expect_fetch_latest_versions()
            .times(2)
            .returning(|_| Ok(vec!["1.0.0".to_string()]));
        let planner = UpgradePlanner::new(
            Arc::new(registry),
            Arc::new(source),
            ConflictStrategy::Highest,
        );

        let results = planner
            .upgrade_batch(&[id("a@1.0.0")], &options(UpgradeStrategy::All))
            .await;

        let ids: Vec<_> = results.iter().map(|r| r.module_id.as_str()).collect();
        assert_eq!(ids, vec!["a@1.0.0", "b@1.0.0"]);
    }

    #[tokio::test]
    async fn get_upgrade_preview_does_not_mutate() {
        let mut registry = MockModuleRegistry::new();
        registry.expect_set_module_version().never();
        registry.expect_dependency_graph().never();
        let source = StaticVersionSource::default().with_versions(
            "lib",
            &["1.0.0", "2.0.0", "1.1.0", "1.1.0", "nope"],
        );
        let planner = UpgradePlanner::new(
            Arc::new(registry),
            Arc::new(source),
            ConflictStrategy::Highest,
        );

        let preview = planner
            .get_upgrade_preview(&id("lib@1.0.0"), &options(UpgradeStrategy::All))
            .await
            .unwrap();

        assert_eq!(
            preview,
            UpgradePreview {
                current: v("1.0.0"),
                available: vec![v("2.0.0"), v("1.1.0"), v("1.0.0")],
                recommended: Some(v("2.0.0")),
                breaking: true,
            }
        );
        assert!(planner.completed_results().is_empty());
    }

    #[tokio::test]
    async fn get_upgrade_preview_propagates_fetch_error() {
        let planner = planner_with(InMemoryRegistry::default(), StaticVersionSource::default());

        let result = planner
            .get_upgrade_preview(&id("lib@1.0.0"), &options(UpgradeStrategy::All))
            .await;

        assert!(matches!(
            result,
            Err(EngineError::Registry(RegistryError::NotFound(_)))
        ));
    }
}
