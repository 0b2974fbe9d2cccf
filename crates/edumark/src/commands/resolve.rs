//! `edumark resolve` command implementation.

use clap::Args;
use edumark_config::CliSettings;
use edumark_site::{validate_branch, validate_filename};

use crate::commands::{CommonArgs, build_resolver, default_branch};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the resolve command.
#[derive(Args)]
pub(crate) struct ResolveArgs {
    #[command(flatten)]
    pub(crate) common: CommonArgs,

    /// Bare filename to look up, e.g. `intro.md`.
    filename: String,

    /// Branch to resolve on (default: configured default branch).
    #[arg(short, long)]
    branch: Option<String>,
}

impl ResolveArgs {
    /// Execute the resolve command.
    ///
    /// Prints the chosen path to stdout and every other candidate to stderr.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the filename cannot be
    /// resolved.
    pub(crate) fn execute(self, version: &str) -> Result<(), CliError> {
        let output = Output::new();
        validate_filename(&self.filename)?;

        let config = self.common.load_config(CliSettings {
            default_branch: self.branch,
            ..CliSettings::default()
        })?;
        let branch = default_branch(&config);
        validate_branch(&branch)?;
        let resolver = build_resolver(&config, version)?;

        let resolution = resolver.resolve(&self.filename, &branch)?;
        output.result(&resolution.path);

        if resolution.candidates.len() > 1 {
            output.warning(&format!(
                "{} paths share the name {} on {branch}:",
                resolution.candidates.len(),
                self.filename
            ));
            for candidate in &resolution.candidates {
                let marker = if *candidate == resolution.path { "*" } else { " " };
                output.detail(&format!("  {marker} {candidate}"));
            }
        }

        Ok(())
    }
}
