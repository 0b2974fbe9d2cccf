//! CLI command implementations.

pub(crate) mod index;
pub(crate) mod resolve;
pub(crate) mod serve;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Args;
use edumark_cache::{Cache, FileCache, NullCache};
use edumark_config::{CliSettings, Config};
use edumark_remote_github::GitHubRemote;
use edumark_site::Resolver;

use crate::error::CliError;

pub(crate) use index::IndexArgs;
pub(crate) use resolve::ResolveArgs;
pub(crate) use serve::ServeArgs;

/// Configuration and cache flags shared by every command.
#[derive(Args)]
pub(crate) struct CommonArgs {
    /// Path to configuration file (default: auto-discover edumark.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable the branch index cache (default: enabled).
    #[arg(long)]
    cache: Option<bool>,

    /// Disable the branch index cache.
    #[arg(long, conflicts_with = "cache")]
    no_cache: bool,

    /// Enable verbose output (info-level logs and render warnings).
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl CommonArgs {
    /// Resolve `cache_enabled` from --cache/--no-cache flags.
    fn resolve_cache_enabled(&self) -> Option<bool> {
        self.no_cache.then_some(false).or(self.cache)
    }

    /// Load configuration with command line overrides applied.
    pub(crate) fn load_config(&self, mut settings: CliSettings) -> Result<Config, CliError> {
        settings.cache_enabled = self.resolve_cache_enabled();
        Ok(Config::load(self.config.as_deref(), Some(&settings))?)
    }
}

/// Branch used when none is given: the configured default, else `main`.
pub(crate) fn default_branch(config: &Config) -> String {
    config
        .github
        .as_ref()
        .map_or_else(|| "main".to_owned(), |github| github.default_branch.clone())
}

/// Build the resolver for the configured remote repository.
pub(crate) fn build_resolver(config: &Config, version: &str) -> Result<Resolver, CliError> {
    let github = config.require_github()?;
    let remote = Arc::new(GitHubRemote::from_config(github));
    let cache = open_cache(config, version)?;
    Ok(Resolver::new(remote.clone(), remote, cache.as_ref()))
}

/// Resolver for `serve`: `None` when no `[github]` section is configured.
///
/// Any other failure is returned, so a broken remote setup is not mistaken
/// for a local-only one.
pub(crate) fn remote_resolver(
    config: &Config,
    version: &str,
) -> Result<Option<Resolver>, CliError> {
    if config.github.is_none() {
        return Ok(None);
    }
    build_resolver(config, version).map(Some)
}

/// Open the persisted cache, or a no-op cache when caching is disabled.
fn open_cache(config: &Config, version: &str) -> Result<Box<dyn Cache>, CliError> {
    if !config.docs_resolved.cache_enabled {
        return Ok(Box::new(NullCache));
    }
    ensure_project_dir(&config.docs_resolved.project_dir)?;
    Ok(Box::new(FileCache::new(
        config.docs_resolved.cache_dir(),
        version,
    )))
}

/// Ensure the `.edumark/` project directory exists with a `.gitignore`.
fn ensure_project_dir(project_dir: &Path) -> Result<(), CliError> {
    std::fs::create_dir_all(project_dir).map_err(|e| {
        CliError::Server(format!("Failed to create project directory: {e}"))
    })?;

    let gitignore_path = project_dir.join(".gitignore");
    if !gitignore_path.exists() {
        let _ = std::fs::write(&gitignore_path, "# Automatically created by edumark\n*\n");
    }

    Ok(())
}
