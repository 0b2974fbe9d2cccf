//! `edumark serve` command implementation.

use std::path::PathBuf;

use clap::Args;
use edumark_config::CliSettings;
use edumark_server::{run_server, server_config_from_config};
use edumark_site::{Site, SiteConfig};

use crate::commands::{CommonArgs, default_branch, remote_resolver};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    #[command(flatten)]
    pub(crate) common: CommonArgs,

    /// Local preview directory (overrides config).
    #[arg(short, long)]
    source_dir: Option<PathBuf>,

    /// Host to bind to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Default branch for remote documents (overrides config).
    #[arg(short, long)]
    branch: Option<String>,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the server fails to start.
    pub(crate) async fn execute(self, version: &str) -> Result<(), CliError> {
        let output = Output::new();

        let config = self.common.load_config(CliSettings {
            host: self.host,
            port: self.port,
            source_dir: self.source_dir,
            cache_enabled: None,
            default_branch: self.branch,
        })?;

        output.info(&format!(
            "Starting server on {}:{}",
            config.server.host, config.server.port
        ));
        output.info(&format!(
            "Local preview directory: {}",
            config.docs_resolved.source_dir.display()
        ));

        // Without [github] only /view is disabled; local preview keeps working
        let resolver = remote_resolver(&config, version)?;
        match &config.github {
            Some(github) => output.info(&format!(
                "Remote repository: {}/{} (default branch {})",
                github.owner, github.repo, github.default_branch
            )),
            None => output.warning("No [github] section configured; remote documents disabled"),
        }

        if config.docs_resolved.cache_enabled {
            output.info(&format!(
                "Cache directory: {}",
                config.docs_resolved.cache_dir().display()
            ));
        } else {
            output.info("Cache: disabled");
        }

        let site_config = SiteConfig {
            source_dir: config.docs_resolved.source_dir.clone(),
            default_branch: default_branch(&config),
        };
        let site = Site::new(site_config, resolver);

        let server_config =
            server_config_from_config(&config, version.to_owned(), self.common.verbose);
        run_server(server_config, site)
            .await
            .map_err(|e| CliError::Server(e.to_string()))?;

        Ok(())
    }
}
