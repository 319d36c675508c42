//! Immutable index generations.
//!
//! An [`IndexGeneration`] is a complete snapshot: postings for every
//! `(field, term)` pair and the stored documents addressed by doc id. It is
//! never mutated after construction; a rebuild produces a new one and the
//! engine swaps its pointer.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::document::Document;
use crate::error::{LoupeError, Result};

/// Dense document identifier, assigned in feed order.
pub type DocId = u32;

/// A term scoped to a field.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Term {
    /// Field name.
    pub field: String,
    /// Normalized term text.
    pub text: String,
}

impl Term {
    /// Create a new term.
    pub fn new<F: Into<String>, T: Into<String>>(field: F, text: T) -> Self {
        Term {
            field: field.into(),
            text: text.into(),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.field, self.text)
    }
}

/// Occurrences of one term in one document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Posting {
    /// Document containing the term.
    pub doc_id: DocId,
    /// Number of occurrences, always `positions.len()`.
    pub term_frequency: u32,
    /// Token positions, strictly increasing.
    pub positions: Vec<u32>,
}

impl Posting {
    /// Create a posting from its positions.
    pub fn new(doc_id: DocId, positions: Vec<u32>) -> Self {
        Posting {
            doc_id,
            term_frequency: positions.len() as u32,
            positions,
        }
    }
}

/// Postings of one term, sorted by doc id.
pub type PostingList = Vec<Posting>;

/// Field name → term text → postings.
pub type FieldPostings = BTreeMap<String, BTreeMap<String, PostingList>>;

/// An immutable index snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct IndexGeneration {
    id: u64,
    built_at: i64,
    postings: FieldPostings,
    documents: Vec<Document>,
}

impl IndexGeneration {
    /// Create a generation from already merged postings and stored documents.
    pub fn new(id: u64, built_at: i64, postings: FieldPostings, documents: Vec<Document>) -> Self {
        IndexGeneration {
            id,
            built_at,
            postings,
            documents,
        }
    }

    /// A generation with no documents.
    pub fn empty(id: u64) -> Self {
        IndexGeneration::new(id, 0, FieldPostings::new(), Vec::new())
    }

    /// Generation id; ids grow with every build.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Unix timestamp of the build.
    pub fn built_at(&self) -> i64 {
        self.built_at
    }

    /// Number of stored documents.
    pub fn doc_count(&self) -> usize {
        self.documents.len()
    }

    /// Number of distinct `(field, term)` pairs.
    pub fn term_count(&self) -> usize {
        self.postings.values().map(BTreeMap::len).sum()
    }

    /// Whether the generation holds no documents.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Postings of a term, if it occurs anywhere.
    pub fn postings(&self, field: &str, text: &str) -> Option<&PostingList> {
        self.postings.get(field)?.get(text)
    }

    /// Document frequency of a term.
    pub fn doc_freq(&self, field: &str, text: &str) -> usize {
        self.postings(field, text).map_or(0, Vec::len)
    }

    /// Inverse document frequency: `ln(1 + N / (1 + df))`.
    pub fn idf(&self, field: &str, text: &str) -> f32 {
        let n = self.doc_count() as f64;
        let df = self.doc_freq(field, text) as f64;
        (1.0 + n / (1.0 + df)).ln() as f32
    }

    /// Stored document by id.
    pub fn document(&self, doc_id: DocId) -> Option<&Document> {
        self.documents.get(doc_id as usize)
    }

    /// All stored documents in doc id order.
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// The full postings table.
    pub fn field_postings(&self) -> &FieldPostings {
        &self.postings
    }

    /// Iterate all terms in `(field, text)` order.
    pub fn terms(&self) -> impl Iterator<Item = (&str, &str, &PostingList)> + '_ {
        self.postings.iter().flat_map(|(field, terms)| {
            terms
                .iter()
                .map(move |(text, list)| (field.as_str(), text.as_str(), list))
        })
    }

    /// Check the structural invariants of the snapshot.
    ///
    /// Every posting list must be non-empty and strictly sorted by doc id,
    /// reference stored documents only, and carry strictly increasing
    /// positions matching its term frequency.
    pub fn validate(&self) -> Result<()> {
        let doc_count = self.doc_count();

        for (field, text, list) in self.terms() {
            if list.is_empty() {
                return Err(LoupeError::internal(format!(
                    "empty posting list for {field}:{text}"
                )));
            }

            let mut previous: Option<DocId> = None;
            for posting in list {
                if previous.is_some_and(|p| p >= posting.doc_id) {
                    return Err(LoupeError::internal(format!(
                        "postings for {field}:{text} not sorted at doc {}",
                        posting.doc_id
                    )));
                }
                if posting.doc_id as usize >= doc_count {
                    return Err(LoupeError::internal(format!(
                        "postings for {field}:{text} reference doc {} of {doc_count}",
                        posting.doc_id
                    )));
                }
                if posting.term_frequency as usize != posting.positions.len()
                    || posting.positions.is_empty()
                {
                    return Err(LoupeError::internal(format!(
                        "bad term frequency for {field}:{text} in doc {}",
                        posting.doc_id
                    )));
                }
                if posting.positions.windows(2).any(|w| w[0] >= w[1]) {
                    return Err(LoupeError::internal(format!(
                        "positions for {field}:{text} in doc {} not increasing",
                        posting.doc_id
                    )));
                }
                previous = Some(posting.doc_id);
            }
        }

        Ok(())
    }
}
