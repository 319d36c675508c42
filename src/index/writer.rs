//! Index writer: turns a document feed into an [`IndexGeneration`].
//!
//! Building happens in three steps:
//!
//! 1. Pull every record from the feed, validating it and assigning doc ids
//!    in feed order. Malformed records are skipped; a feed failure aborts.
//! 2. Analyze the documents in parallel on the rayon pool. Each document
//!    yields its own term → positions table.
//! 3. Merge the per-document tables in doc id order, which leaves every
//!    posting list sorted without a final sort.

use std::sync::Arc;
use std::time::{Duration, Instant};

use ahash::{AHashMap, AHashSet};
use log::{debug, error, info, warn};
use rayon::prelude::*;
use serde::Serialize;

use crate::analysis::{Analyzer, KeywordAnalyzer};
use crate::config::{TIME_FIELD, TITLE_FIELD, URL_FIELD};
use crate::document::{Document, DocumentSource, SourceRecord};
use crate::error::{LoupeError, Result};
use crate::index::generation::{DocId, FieldPostings, IndexGeneration, Posting};

/// Statistics about one build.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BuildStats {
    /// Documents that made it into the generation.
    pub indexed: usize,
    /// Records skipped as malformed or duplicate.
    pub skipped: usize,
    /// Distinct `(field, term)` pairs.
    pub terms: usize,
    /// Wall-clock build time.
    pub elapsed: Duration,
}

/// Terms of one analyzed document: field, term text, positions.
type InvertedDocument = Vec<(&'static str, String, Vec<u32>)>;

/// Builds index generations.
pub struct IndexWriter {
    analyzer: Arc<dyn Analyzer>,
    keyword_analyzer: KeywordAnalyzer,
}

impl IndexWriter {
    /// Create a writer analyzing titles with `analyzer`.
    pub fn new(analyzer: Arc<dyn Analyzer>) -> Self {
        IndexWriter {
            analyzer,
            keyword_analyzer: KeywordAnalyzer::new(),
        }
    }

    /// Build a generation from a document source.
    pub fn build_from(
        &self,
        source: &dyn DocumentSource,
        generation_id: u64,
    ) -> Result<(IndexGeneration, BuildStats)> {
        let records = source.records().map_err(|e| match e {
            LoupeError::SourceFeed(_) => e,
            other => LoupeError::source_feed(other.to_string()),
        })?;
        self.build(records, generation_id)
    }

    /// Build a generation from a record iterator.
    ///
    /// Items follow the [`DocumentSource`] convention: a
    /// `MalformedDocument` error skips one record, any other error aborts
    /// the build.
    pub fn build<I>(&self, records: I, generation_id: u64) -> Result<(IndexGeneration, BuildStats)>
    where
        I: IntoIterator<Item = Result<SourceRecord>>,
    {
        let start = Instant::now();
        let (documents, skipped) = collect_documents(records)?;

        let inverted = documents
            .par_iter()
            .map(|doc| self.invert(doc))
            .collect::<Result<Vec<_>>>()?;

        let mut postings = FieldPostings::new();
        for (doc_id, terms) in inverted.into_iter().enumerate() {
            let doc_id = DocId::try_from(doc_id)
                .map_err(|_| LoupeError::internal("document count exceeds u32 range"))?;
            for (field, text, positions) in terms {
                postings
                    .entry(field.to_string())
                    .or_default()
                    .entry(text)
                    .or_default()
                    .push(Posting::new(doc_id, positions));
            }
        }

        let built_at = chrono::Utc::now().timestamp();
        let generation = IndexGeneration::new(generation_id, built_at, postings, documents);
        generation.validate()?;

        let stats = BuildStats {
            indexed: generation.doc_count(),
            skipped,
            terms: generation.term_count(),
            elapsed: start.elapsed(),
        };
        debug!(
            "Built generation {}: {} docs, {} terms in {:?}",
            generation_id, stats.indexed, stats.terms, stats.elapsed
        );

        Ok((generation, stats))
    }

    /// Analyze one document into its per-term positions.
    fn invert(&self, doc: &Document) -> Result<InvertedDocument> {
        let mut title_terms: AHashMap<String, Vec<u32>> = AHashMap::new();
        for token in self.analyzer.analyze(&doc.title)? {
            let position = u32::try_from(token.position)
                .map_err(|_| LoupeError::internal("token position exceeds u32 range"))?;
            let positions = title_terms.entry(token.text).or_default();
            if positions.last() != Some(&position) {
                positions.push(position);
            }
        }

        let mut terms: InvertedDocument = title_terms
            .into_iter()
            .map(|(text, positions)| (TITLE_FIELD, text, positions))
            .collect();

        for (field, value) in [(URL_FIELD, doc.url.clone()), (TIME_FIELD, doc.time.to_string())] {
            for token in self.keyword_analyzer.analyze(&value)? {
                terms.push((field, token.text, vec![token.position as u32]));
            }
        }

        Ok(terms)
    }
}

/// Drain the feed into validated documents, returning them with the number
/// of skipped records.
fn collect_documents<I>(records: I) -> Result<(Vec<Document>, usize)>
where
    I: IntoIterator<Item = Result<SourceRecord>>,
{
    let mut documents = Vec::new();
    let mut seen_urls = AHashSet::new();
    let mut skipped = 0;

    for (index, item) in records.into_iter().enumerate() {
        let record = match item {
            Ok(record) => record,
            Err(LoupeError::MalformedDocument(msg)) => {
                warn!("Skipping record {index}: {msg}");
                skipped += 1;
                continue;
            }
            Err(e) => {
                error!("Source feed failed at record {index}: {e}");
                return Err(match e {
                    LoupeError::SourceFeed(_) => e,
                    other => LoupeError::source_feed(other.to_string()),
                });
            }
        };

        match record.into_document() {
            Ok(doc) => {
                if seen_urls.insert(doc.url.clone()) {
                    documents.push(doc);
                } else {
                    warn!("Skipping record {index}: duplicate url {}", doc.url);
                    skipped += 1;
                }
            }
            Err(e) => {
                warn!("Skipping record {index}: {e}");
                skipped += 1;
            }
        }
    }

    info!(
        "Collected {} documents ({} skipped)",
        documents.len(),
        skipped
    );
    Ok((documents, skipped))
}
