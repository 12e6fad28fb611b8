//! Command-line interface definitions.
//!
//! Every option is optional: with no flags the tool runs its interactive
//! research workflow using built-in defaults.

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the research compiler.
///
/// # Examples
///
/// ```sh
/// # Interactive run with defaults
/// research_compiler
///
/// # Save documents somewhere else and show progress logs
/// research_compiler --output-dir ./research --verbose
///
/// # Load settings from a YAML file
/// research_compiler --config ./research.yaml
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory where compiled documents are saved
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Log pipeline progress at info level (RUST_LOG overrides)
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing_without_flags() {
        let cli = Cli::parse_from(["research_compiler"]);

        assert!(cli.config.is_none());
        assert!(cli.output_dir.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_cli_long_flags() {
        let cli = Cli::parse_from([
            "research_compiler",
            "--config",
            "./research.yaml",
            "--output-dir",
            "./out",
            "--verbose",
        ]);

        assert_eq!(cli.config, Some(PathBuf::from("./research.yaml")));
        assert_eq!(cli.output_dir, Some(PathBuf::from("./out")));
        assert!(cli.verbose);
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from(["research_compiler", "-c", "/tmp/c.yaml", "-o", "/tmp/out", "-v"]);

        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.yaml")));
        assert_eq!(cli.output_dir, Some(PathBuf::from("/tmp/out")));
        assert!(cli.verbose);
    }
}
