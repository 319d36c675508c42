//! Output formatting for CLI commands.

use std::io::{self, Write};

use serde::Serialize;

use crate::analysis::Token;
use crate::cli::args::{LoupeArgs, OutputFormat};
use crate::error::Result;
use crate::search::{IndexInfo, QueryResponse};

/// Result structure for an index build.
#[derive(Debug, Serialize)]
pub struct BuildResult {
    pub index_dir: String,
    pub generation_id: u64,
    pub documents_indexed: usize,
    pub documents_skipped: usize,
    pub terms: usize,
    pub duration_ms: u64,
    pub docs_per_second: f64,
}

/// Result structure for a search.
#[derive(Debug, Serialize)]
pub struct SearchOutput {
    pub query: String,
    #[serde(flatten)]
    pub response: QueryResponse,
}

/// Result structure for text analysis.
#[derive(Debug, Serialize)]
pub struct AnalyzeResult {
    pub analyzer: String,
    pub tokens: Vec<Token>,
}

/// Human-readable rendering of a command result.
pub trait HumanOutput {
    /// Write the result for a terminal reader.
    fn write_human(&self, out: &mut dyn Write) -> io::Result<()>;
}

impl HumanOutput for BuildResult {
    fn write_human(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "Index Build:")?;
        writeln!(out, "════════════")?;
        writeln!(out, "Index directory: {}", self.index_dir)?;
        writeln!(out, "Generation: {}", self.generation_id)?;
        writeln!(out, "Documents indexed: {}", self.documents_indexed)?;
        writeln!(out, "Documents skipped: {}", self.documents_skipped)?;
        writeln!(out, "Terms: {}", self.terms)?;
        writeln!(out, "Build time: {}ms", self.duration_ms)?;
        writeln!(out, "Throughput: {:.1} docs/s", self.docs_per_second)
    }
}

impl HumanOutput for SearchOutput {
    fn write_human(&self, out: &mut dyn Write) -> io::Result<()> {
        let page = &self.response.page;

        writeln!(out, "Search Results:")?;
        writeln!(out, "═══════════════")?;
        let first = (page.page - 1).saturating_mul(page.page_size);
        for (i, item) in page.items.iter().enumerate() {
            writeln!(out)?;
            writeln!(out, "Result {}:", first + i + 1)?;
            writeln!(out, "─────────────")?;
            writeln!(out, "title: {}", item.title)?;
            writeln!(out, "url: {}", item.url)?;
            writeln!(out, "time: {}", item.time)?;
        }

        writeln!(out)?;
        writeln!(out, "Total hits: {}", page.total_items)?;
        writeln!(out, "Page: {} of {}", page.page, page.total_pages)?;
        writeln!(out, "Search time: {:.3}ms", self.response.cost_time_ms)
    }
}

impl HumanOutput for IndexInfo {
    fn write_human(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "Index Statistics:")?;
        writeln!(out, "════════════════")?;
        if let Some(dir) = &self.index_dir {
            writeln!(out, "Index directory: {dir}")?;
        }
        writeln!(out, "Generation: {}", self.generation_id)?;
        writeln!(out, "Total documents: {}", self.doc_count)?;
        writeln!(out, "Total terms: {}", self.term_count)?;
        writeln!(out, "Built at: {}", self.built_at)?;
        if self.rebuilding {
            writeln!(out, "A rebuild is in progress")?;
        }
        Ok(())
    }
}

impl HumanOutput for AnalyzeResult {
    fn write_human(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "Tokens ({}):", self.analyzer)?;
        for token in &self.tokens {
            writeln!(
                out,
                "  {:>3}  {:<16} [{}..{}] {:?}",
                token.position, token.text, token.start_offset, token.end_offset, token.token_type
            )?;
        }
        Ok(())
    }
}

/// Output a result in the requested format.
pub fn output_result<T>(result: &T, args: &LoupeArgs) -> Result<()>
where
    T: Serialize + HumanOutput,
{
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_result(&mut out, result, args.output_format, args.pretty)?;
    out.flush()?;
    Ok(())
}

/// Write a result to `out` in `format`.
pub fn write_result<T>(out: &mut dyn Write, result: &T, format: OutputFormat, pretty: bool) -> Result<()>
where
    T: Serialize + HumanOutput,
{
    match format {
        OutputFormat::Human => result.write_human(out)?,
        OutputFormat::Json => {
            let json = if pretty {
                serde_json::to_string_pretty(result)?
            } else {
                serde_json::to_string(result)?
            };
            writeln!(out, "{json}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_result() -> BuildResult {
        BuildResult {
            index_dir: "idx".to_string(),
            generation_id: 3,
            documents_indexed: 2,
            documents_skipped: 1,
            terms: 7,
            duration_ms: 5,
            docs_per_second: 400.0,
        }
    }

    #[test]
    fn test_json_output() {
        let mut out = Vec::new();
        write_result(&mut out, &build_result(), OutputFormat::Json, false).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["generation_id"], 3);
        assert_eq!(value["documents_skipped"], 1);
    }

    #[test]
    fn test_human_output() {
        let mut out = Vec::new();
        write_result(&mut out, &build_result(), OutputFormat::Human, false).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Documents indexed: 2"));
        assert!(text.contains("Generation: 3"));
    }

    #[test]
    fn test_analyze_output() {
        let result = AnalyzeResult {
            analyzer: "standard".to_string(),
            tokens: vec![Token::with_offsets("hello", 0, 0, 5)],
        };
        let mut out = Vec::new();
        write_result(&mut out, &result, OutputFormat::Human, false).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("hello"));
        assert!(text.contains("[0..5]"));
    }
}
