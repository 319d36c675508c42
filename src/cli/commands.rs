//! Command implementations for the Loupe CLI.

use std::path::Path;
use std::time::Instant;

use log::info;

use crate::analysis::{Analyzer, KeywordAnalyzer, StandardAnalyzer};
use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::LoupeConfig;
use crate::document::JsonlSource;
use crate::error::{LoupeError, Result};
use crate::search::SearchEngine;

/// Execute a CLI command.
pub fn execute_command(args: LoupeArgs) -> Result<()> {
    match &args.command {
        Command::Build(build_args) => build_index(build_args, &args),
        Command::Search(search_args) => search_index(search_args, &args),
        Command::Info(info_args) => show_info(info_args, &args),
        Command::Analyze(analyze_args) => analyze_text(analyze_args, &args),
    }
}

/// Load the configuration named on the command line, or the defaults.
fn load_config(args: &LoupeArgs) -> Result<LoupeConfig> {
    match &args.config {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            LoupeConfig::from_file(path)
        }
        None => Ok(LoupeConfig::default()),
    }
}

/// Open an index directory that must already exist.
fn open_existing(index_dir: &Path, args: &LoupeArgs) -> Result<SearchEngine> {
    if !index_dir.is_dir() {
        return Err(LoupeError::invalid_argument(format!(
            "index directory {} does not exist",
            index_dir.display()
        )));
    }
    SearchEngine::open(index_dir, load_config(args)?)
}

/// Rebuild an index from a JSON Lines source.
fn build_index(args: &BuildArgs, cli_args: &LoupeArgs) -> Result<()> {
    let start = Instant::now();
    let engine = SearchEngine::open(&args.index_dir, load_config(cli_args)?)?;
    let source = JsonlSource::new(&args.source);

    let stats = engine.rebuild(&source)?;
    let elapsed = start.elapsed();

    let docs_per_second = if elapsed.as_secs_f64() > 0.0 {
        stats.doc_count as f64 / elapsed.as_secs_f64()
    } else {
        0.0
    };

    output_result(
        &BuildResult {
            index_dir: args.index_dir.display().to_string(),
            generation_id: stats.generation_id,
            documents_indexed: stats.doc_count,
            documents_skipped: stats.skipped,
            terms: stats.term_count,
            duration_ms: elapsed.as_millis() as u64,
            docs_per_second,
        },
        cli_args,
    )
}

/// Run the query boundary against an index.
fn search_index(args: &SearchArgs, cli_args: &LoupeArgs) -> Result<()> {
    let engine = open_existing(&args.index_dir, cli_args)?;
    let response = engine.query(&args.query, args.page)?;

    output_result(
        &SearchOutput {
            query: args.query.clone(),
            response,
        },
        cli_args,
    )
}

/// Show statistics of the current generation.
fn show_info(args: &InfoArgs, cli_args: &LoupeArgs) -> Result<()> {
    let engine = open_existing(&args.index_dir, cli_args)?;
    output_result(&engine.info(), cli_args)
}

/// Print the token stream of a text.
fn analyze_text(args: &AnalyzeArgs, cli_args: &LoupeArgs) -> Result<()> {
    let analyzer: Box<dyn Analyzer> = if args.keyword {
        Box::new(KeywordAnalyzer::new())
    } else {
        Box::new(StandardAnalyzer::new())
    };

    output_result(
        &AnalyzeResult {
            analyzer: analyzer.name().to_string(),
            tokens: analyzer.tokens(&args.text)?,
        },
        cli_args,
    )
}
