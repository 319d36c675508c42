//! Term query implementation for exact term matching.

use std::fmt;

use crate::error::Result;
use crate::index::IndexGeneration;
use crate::query::collector::Hit;
use crate::query::matcher::MatchList;
use crate::query::scorer::{Scorer, TfIdfScorer};

/// A query that matches documents containing a specific term.
///
/// The term is matched verbatim; it must already be in the analyzed form.
/// The query parser takes care of that for user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermQuery {
    field: String,
    term: String,
}

impl TermQuery {
    /// Create a new term query.
    pub fn new<F, T>(field: F, term: T) -> Self
    where
        F: Into<String>,
        T: Into<String>,
    {
        TermQuery {
            field: field.into(),
            term: term.into(),
        }
    }

    /// Get the field name.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Get the term.
    pub fn term(&self) -> &str {
        &self.term
    }

    /// Score every document containing the term.
    pub fn execute(&self, generation: &IndexGeneration) -> Result<MatchList> {
        let Some(postings) = generation.postings(&self.field, &self.term) else {
            return Ok(Vec::new());
        };

        let scorer = TfIdfScorer::for_term(generation, &self.field, &self.term);
        Ok(postings
            .iter()
            .map(|posting| Hit::new(posting.doc_id, scorer.score(posting.term_frequency as f32)))
            .collect())
    }
}

impl fmt::Display for TermQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.field, self.term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::analysis::StandardAnalyzer;
    use crate::document::{SourceRecord, VecSource};
    use crate::index::IndexWriter;

    fn generation() -> IndexGeneration {
        let source = VecSource::new(vec![
            SourceRecord::new("a", "hello world", 1000),
            SourceRecord::new("b", "hello hello there", 2000),
            SourceRecord::new("c", "nothing here", 3000),
        ]);
        IndexWriter::new(Arc::new(StandardAnalyzer::new()))
            .build_from(&source, 1)
            .unwrap()
            .0
    }

    #[test]
    fn test_term_query() {
        let generation = generation();
        let hits = TermQuery::new("title", "hello").execute(&generation).unwrap();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].doc_id, 0);
        assert_eq!(hits[1].doc_id, 1);
        // tf 2 scores twice tf 1
        assert!((hits[1].score - 2.0 * hits[0].score).abs() < 1e-5);
    }

    #[test]
    fn test_missing_term() {
        let generation = generation();
        assert!(TermQuery::new("title", "absent")
            .execute(&generation)
            .unwrap()
            .is_empty());
        assert!(TermQuery::new("url", "hello")
            .execute(&generation)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_keyword_field() {
        let generation = generation();
        let hits = TermQuery::new("time", "2000").execute(&generation).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].doc_id, 1);
    }

    #[test]
    fn test_display() {
        assert_eq!(TermQuery::new("title", "hello").to_string(), "title:hello");
    }
}
