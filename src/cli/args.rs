//! Command line argument parsing for the Loupe CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

/// Loupe - full-text title search with CJK bigram analysis
#[derive(Parser, Debug, Clone)]
#[command(name = "loupe")]
#[command(about = "Full-text title search with CJK bigram analysis")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct LoupeArgs {
    /// Verbosity level (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Configuration file (JSON)
    #[arg(short, long, value_name = "FILE", env = "LOUPE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl LoupeArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose.saturating_add(1)
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Rebuild an index from a JSON Lines source and publish it
    Build(BuildArgs),

    /// Search an index
    Search(SearchArgs),

    /// Show statistics of the current generation
    Info(InfoArgs),

    /// Print the token stream of a text
    Analyze(AnalyzeArgs),
}

impl Command {
    /// Subcommand name as typed on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Build(_) => "build",
            Command::Search(_) => "search",
            Command::Info(_) => "info",
            Command::Analyze(_) => "analyze",
        }
    }
}

/// Arguments for building an index
#[derive(Parser, Debug, Clone)]
pub struct BuildArgs {
    /// Path to the index directory
    #[arg(value_name = "INDEX_DIR")]
    pub index_dir: PathBuf,

    /// Source file, one `{"url", "title", "time"}` object per line
    #[arg(value_name = "SOURCE")]
    pub source: PathBuf,
}

/// Arguments for searching
#[derive(Parser, Debug, Clone)]
pub struct SearchArgs {
    /// Path to the index directory
    #[arg(value_name = "INDEX_DIR")]
    pub index_dir: PathBuf,

    /// Query string
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// Page number, starting at 1
    #[arg(short, long, default_value = "1")]
    pub page: usize,
}

/// Arguments for index statistics
#[derive(Parser, Debug, Clone)]
pub struct InfoArgs {
    /// Path to the index directory
    #[arg(value_name = "INDEX_DIR")]
    pub index_dir: PathBuf,
}

/// Arguments for analyzing text
#[derive(Parser, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Text to analyze
    #[arg(value_name = "TEXT")]
    pub text: String,

    /// Use the keyword analyzer (url/time fields) instead of the title analyzer
    #[arg(long)]
    pub keyword: bool,
}

/// Output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search() {
        let args =
            LoupeArgs::try_parse_from(["loupe", "search", "/tmp/idx", "hello world", "--page", "2"])
                .unwrap();

        assert_eq!(args.verbosity(), 1);
        assert_eq!(args.output_format, OutputFormat::Human);
        assert_eq!(args.command.name(), "search");
        match args.command {
            Command::Search(search) => {
                assert_eq!(search.index_dir, PathBuf::from("/tmp/idx"));
                assert_eq!(search.query, "hello world");
                assert_eq!(search.page, 2);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_default_page() {
        let args = LoupeArgs::try_parse_from(["loupe", "search", "idx", "q"]).unwrap();
        if let Command::Search(search) = args.command {
            assert_eq!(search.page, 1);
        }
    }

    #[test]
    fn test_global_flags() {
        let args = LoupeArgs::try_parse_from([
            "loupe", "-vv", "--format", "json", "--pretty", "info", "idx",
        ])
        .unwrap();
        assert_eq!(args.verbosity(), 3);
        assert_eq!(args.output_format, OutputFormat::Json);
        assert!(args.pretty);

        let args = LoupeArgs::try_parse_from(["loupe", "-q", "-v", "info", "idx"]).unwrap();
        assert_eq!(args.verbosity(), 0);
    }

    #[test]
    fn test_missing_arguments() {
        assert!(LoupeArgs::try_parse_from(["loupe", "build", "idx"]).is_err());
        assert!(LoupeArgs::try_parse_from(["loupe", "search", "idx"]).is_err());
    }
}
