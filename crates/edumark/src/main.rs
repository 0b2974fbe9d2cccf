//! EduMark CLI - educational Markdown viewer.
//!
//! Provides commands for:
//! - `serve`: Start the viewer server
//! - `resolve`: Print the repository path a bare filename resolves to
//! - `index`: Rebuild the index of a branch and print its statistics

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{IndexArgs, ResolveArgs, ServeArgs};
use output::Output;

/// Application version from Cargo.toml.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// EduMark - educational Markdown viewer.
#[derive(Parser)]
#[command(name = "edumark", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the viewer server.
    Serve(ServeArgs),
    /// Resolve a bare filename to its path in the remote repository.
    Resolve(ResolveArgs),
    /// Rebuild the index of a branch.
    Index(IndexArgs),
}

impl Commands {
    fn verbose(&self) -> bool {
        match self {
            Self::Serve(args) => args.common.verbose,
            Self::Resolve(args) => args.common.verbose,
            Self::Index(args) => args.common.verbose,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.command.verbose() {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Serve(args) => match tokio::runtime::Runtime::new() {
            Ok(rt) => rt.block_on(args.execute(VERSION)),
            Err(e) => Err(e.into()),
        },
        Commands::Resolve(args) => args.execute(VERSION),
        Commands::Index(args) => args.execute(VERSION),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_serve_flags() {
        let cli = Cli::try_parse_from([
            "edumark", "serve", "--port", "8080", "--no-cache", "--verbose",
        ])
        .unwrap();

        assert!(cli.command.verbose());
    }

    #[test]
    fn test_cache_flags_conflict() {
        assert!(Cli::try_parse_from(["edumark", "index", "--cache", "true", "--no-cache"]).is_err());
    }

    #[test]
    fn test_resolve_requires_filename() {
        assert!(Cli::try_parse_from(["edumark", "resolve"]).is_err());
        assert!(Cli::try_parse_from(["edumark", "resolve", "intro.md", "-b", "draft"]).is_ok());
    }
}
