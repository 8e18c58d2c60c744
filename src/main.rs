use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use futures::future::join_all;
use serde_json::json;
use tracing::info;

use version_engine::config::{EngineConfig, log_path};
use version_engine::graph::{ModuleId, ModuleRegistry, RegistrySnapshot};
use version_engine::logging;
use version_engine::resolver::{ConflictResolver, ConflictStrategy};
use version_engine::upgrade::{UpgradeOptions, UpgradePlanner, UpgradeStrategy};
use version_engine::version::source::VersionSource;
use version_engine::version::sources::NpmVersionSource;

#[derive(Parser)]
#[command(name = "version-engine")]
#[command(version, about = "Resolve version conflicts and plan module upgrades")]
struct Cli {
    /// JSON engine configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    /// Write logs to a file (defaults to the data directory when no path is given)
    #[arg(long, global = true, num_args = 0..=1)]
    log_file: Option<Option<PathBuf>>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Detect and resolve conflicting dependency versions
    Conflicts {
        /// Registry snapshot (JSON)
        #[arg(long)]
        snapshot: PathBuf,

        #[arg(long)]
        strategy: Option<ConflictStrategy>,
    },
    /// Show what an upgrade would select without applying it
    Preview(UpgradeArgs),
    /// Upgrade modules and, depth permitting, their dependencies
    Upgrade(UpgradeArgs),
}

#[derive(Args)]
struct UpgradeArgs {
    /// Module ids (name@version)
    #[arg(required = true)]
    modules: Vec<ModuleId>,

    /// Registry snapshot (JSON)
    #[arg(long)]
    snapshot: PathBuf,

    /// Fetch versions from the configured npm registry instead of the snapshot
    #[arg(long)]
    live: bool,

    /// Override the registry URL used with --live
    #[arg(long)]
    registry_url: Option<String>,

    #[arg(long)]
    strategy: Option<UpgradeStrategy>,

    /// Transitive depth (omit for unlimited)
    #[arg(long)]
    depth: Option<usize>,

    #[arg(long, overrides_with = "no_include_prereleases")]
    include_prereleases: bool,

    /// Exclude prereleases even if the config includes them
    #[arg(long, overrides_with = "include_prereleases")]
    no_include_prereleases: bool,

    #[arg(long, overrides_with = "no_ignore_breaking")]
    ignore_breaking: bool,

    /// Skip breaking upgrades even if the config allows them
    #[arg(long, overrides_with = "ignore_breaking")]
    no_ignore_breaking: bool,
}

/// An explicit `--flag`/`--no-flag` wins over the config value
fn flag(on: bool, off: bool, default: bool) -> bool {
    match (on, off) {
        (true, _) => true,
        (_, true) => false,
        _ => default,
    }
}

impl UpgradeArgs {
    fn options(&self, defaults: &UpgradeOptions) -> UpgradeOptions {
        UpgradeOptions {
            include_prereleases: flag(
                self.include_prereleases,
                self.no_include_prereleases,
                defaults.include_prereleases,
            ),
            ignore_breaking: flag(
                self.ignore_breaking,
                self.no_ignore_breaking,
                defaults.ignore_breaking,
            ),
            depth: self.depth.or(defaults.depth),
            strategy: self.strategy.unwrap_or(defaults.strategy),
        }
    }
}

fn load_snapshot(path: &Path) -> anyhow::Result<RegistrySnapshot> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid snapshot {}", path.display()))
}

fn build_planner(args: &UpgradeArgs, config: &EngineConfig) -> anyhow::Result<UpgradePlanner> {
    let (registry, snapshot_source) = load_snapshot(&args.snapshot)?.into_parts();

    let source: Arc<dyn VersionSource> = if args.live {
        let url = args.registry_url.as_deref().unwrap_or(&config.registry.url);
        info!("Fetching versions from {}", url);
        Arc::new(NpmVersionSource::new(url, config.registry.timeout_ms)?)
    } else {
        Arc::new(snapshot_source)
    };

    Ok(UpgradePlanner::new(
        Arc::new(registry),
        source,
        config.conflict_strategy,
    ))
}

async fn run(command: Command, config: EngineConfig) -> anyhow::Result<serde_json::Value> {
    match command {
        Command::Conflicts { snapshot, strategy } => {
            let (registry, _) = load_snapshot(&snapshot)?.into_parts();
            let registry: Arc<dyn ModuleRegistry> = Arc::new(registry);
            let graph = registry.dependency_graph().await?;
            let resolver =
                ConflictResolver::new(registry, strategy.unwrap_or(config.conflict_strategy));

            let mut resolutions = Vec::new();
            if let Some(first) = graph.keys().next() {
                resolutions = resolver.resolve_conflicts(first).await?;
            }
            Ok(json!({ "resolutions": resolutions }))
        }
        Command::Preview(args) => {
            let planner = build_planner(&args, &config)?;
            let options = args.options(&config.upgrade);

            let previews = join_all(args.modules.iter().map(|module_id| {
                let planner = &planner;
                let options = &options;
                async move {
                    match planner.get_upgrade_preview(module_id, options).await {
                        Ok(preview) => json!({ "moduleId": module_id, "preview": preview }),
                        Err(e) => json!({ "moduleId": module_id, "error": e.to_string() }),
                    }
                }
            }))
            .await;
            Ok(json!({ "previews": previews }))
        }
        Command::Upgrade(args) => {
            let planner = build_planner(&args, &config)?;
            let options = args.options(&config.upgrade);

            let results = planner.upgrade_batch(&args.modules, &options).await;
            Ok(json!({
                "results": results,
                "resolutions": planner.conflict_resolver().cached_resolutions(),
            }))
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_file = cli.log_file.map(|path| path.unwrap_or_else(log_path));
    let _guard = logging::init(cli.verbose, cli.log_json, log_file.as_deref())
        .map_err(|e| anyhow::anyhow!(e))?;

    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => EngineConfig::default(),
    };

    let output = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(cli.command, config))?;

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
