//! Searcher implementation for executing queries against a generation.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::error::Result;
use crate::index::IndexGeneration;
use crate::query::{Hit, Query, TopDocsCollector};

/// Ranked hits of one search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResults {
    /// Best hits, highest score first, lower doc id on ties.
    pub hits: Vec<Hit>,
    /// Matching documents before truncation.
    pub total_hits: usize,
    /// Time spent evaluating and ranking.
    #[serde(skip)]
    pub elapsed: Duration,
}

/// Executes queries against one generation.
///
/// The searcher holds its generation for as long as it lives, so a publish
/// that happens mid-search does not affect it.
#[derive(Debug, Clone)]
pub struct Searcher {
    generation: Arc<IndexGeneration>,
}

impl Searcher {
    /// Create a searcher over a generation.
    pub fn new(generation: Arc<IndexGeneration>) -> Self {
        Searcher { generation }
    }

    /// The generation searched.
    pub fn generation(&self) -> &Arc<IndexGeneration> {
        &self.generation
    }

    /// Evaluate `query` and keep the best `max_hits` hits.
    pub fn search(&self, query: &Query, max_hits: usize) -> Result<SearchResults> {
        let start = Instant::now();
        let matches = query.execute(&self.generation)?;

        let mut collector = TopDocsCollector::new(max_hits);
        for hit in matches {
            collector.collect(hit);
        }

        Ok(SearchResults {
            total_hits: collector.total_hits(),
            hits: collector.into_hits(),
            elapsed: start.elapsed(),
        })
    }

    /// Number of documents matching `query`.
    pub fn count(&self, query: &Query) -> Result<usize> {
        Ok(query.execute(&self.generation)?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::analysis::StandardAnalyzer;
    use crate::document::{SourceRecord, VecSource};
    use crate::index::IndexWriter;
    use crate::query::QueryParser;

    fn searcher(titles: &[&str]) -> Searcher {
        let source: VecSource = titles
            .iter()
            .enumerate()
            .map(|(i, title)| SourceRecord::new(format!("u{i}"), *title, i as i64))
            .collect();
        let (generation, _) = IndexWriter::new(Arc::new(StandardAnalyzer::new()))
            .build_from(&source, 1)
            .unwrap();
        Searcher::new(Arc::new(generation))
    }

    fn parse(query: &str) -> Query {
        QueryParser::new(Arc::new(StandardAnalyzer::new()))
            .parse(query)
            .unwrap()
    }

    #[test]
    fn test_ranking_and_ties() {
        let searcher = searcher(&["rust", "rust rust", "go", "rust"]);
        let results = searcher.search(&parse("rust"), 10).unwrap();

        let ids: Vec<_> = results.hits.iter().map(|h| h.doc_id).collect();
        assert_eq!(ids, vec![1, 0, 3]);
        assert_eq!(results.total_hits, 3);
        assert!(
            results
                .hits
                .windows(2)
                .all(|w| w[0].score >= w[1].score)
        );
    }

    #[test]
    fn test_truncation_reports_total() {
        let searcher = searcher(&["a", "a", "a", "a"]);
        let results = searcher.search(&parse("a"), 2).unwrap();
        assert_eq!(results.hits.len(), 2);
        assert_eq!(results.total_hits, 4);
        assert_eq!(results.hits[0].doc_id, 0);
        assert_eq!(results.hits[1].doc_id, 1);
    }

    #[test]
    fn test_no_match_is_empty() {
        let searcher = searcher(&["hello"]);
        let results = searcher.search(&parse("absent"), 10).unwrap();
        assert!(results.hits.is_empty());
        assert_eq!(results.total_hits, 0);

        let nothing = searcher.search(&Query::empty(), 10).unwrap();
        assert!(nothing.hits.is_empty());
    }

    #[test]
    fn test_rare_term_outranks_common() {
        let searcher = searcher(&["common rare", "common", "common", "common"]);
        let results = searcher.search(&parse("common rare"), 10).unwrap();
        assert_eq!(results.hits[0].doc_id, 0);
        assert_eq!(searcher.count(&parse("common")).unwrap(), 4);
    }
}
