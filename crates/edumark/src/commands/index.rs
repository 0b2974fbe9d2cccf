//! `edumark index` command implementation.

use clap::Args;
use edumark_config::CliSettings;
use edumark_site::validate_branch;

use crate::commands::{CommonArgs, build_resolver, default_branch};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the index command.
#[derive(Args)]
pub(crate) struct IndexArgs {
    #[command(flatten)]
    pub(crate) common: CommonArgs,

    /// Branch to index (default: configured default branch).
    #[arg(short, long)]
    branch: Option<String>,

    /// List every ambiguous filename with its paths.
    #[arg(long)]
    ambiguous: bool,
}

impl IndexArgs {
    /// Execute the index command: rebuild the branch index and report it.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the tree scan fails.
    pub(crate) fn execute(self, version: &str) -> Result<(), CliError> {
        let output = Output::new();

        let config = self.common.load_config(CliSettings {
            default_branch: self.branch,
            ..CliSettings::default()
        })?;
        let branch = default_branch(&config);
        validate_branch(&branch)?;
        let resolver = build_resolver(&config, version)?;

        let index = resolver.refresh(&branch)?;
        let ambiguous: Vec<_> = index.ambiguous().collect();

        output.success(&format!("Indexed branch {branch}"));
        output.info(&format!("  Filenames: {}", index.len()));
        output.info(&format!("  Paths:     {}", index.path_count()));
        output.info(&format!("  Ambiguous: {}", ambiguous.len()));

        if self.ambiguous {
            for (filename, paths) in ambiguous {
                output.highlight(filename);
                for path in paths {
                    output.detail(&format!("  {path}"));
                }
            }
        }

        Ok(())
    }
}
