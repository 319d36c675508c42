//! Phrase query implementation for matching terms at relative positions.

use std::fmt;

use crate::error::{LoupeError, Result};
use crate::index::{IndexGeneration, Posting, PostingList};
use crate::query::collector::Hit;
use crate::query::matcher::{MatchList, phrase_matches};
use crate::query::scorer::{Scorer, TfIdfScorer};

/// A query that matches documents containing terms in sequence.
///
/// Each term carries its position within the query, so gaps left by
/// dropped separators are honoured. `slop` is the maximum distance, in
/// positions, a term may sit from where the phrase expects it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseQuery {
    field: String,
    terms: Vec<String>,
    positions: Vec<u32>,
    slop: u32,
}

impl PhraseQuery {
    /// Create a phrase of consecutive terms.
    pub fn new<F: Into<String>>(field: F, terms: Vec<String>) -> Self {
        let positions = (0..terms.len() as u32).collect();
        PhraseQuery {
            field: field.into(),
            terms,
            positions,
            slop: 0,
        }
    }

    /// Create a phrase from `(term, query position)` pairs.
    ///
    /// Positions must be non-decreasing.
    pub fn with_positions<F: Into<String>>(field: F, terms: Vec<(String, u32)>) -> Result<Self> {
        if terms.windows(2).any(|w| w[0].1 > w[1].1) {
            return Err(LoupeError::invalid_argument(
                "phrase positions must be non-decreasing",
            ));
        }
        let (terms, positions) = terms.into_iter().unzip();
        Ok(PhraseQuery {
            field: field.into(),
            terms,
            positions,
            slop: 0,
        })
    }

    /// Set the slop.
    pub fn with_slop(mut self, slop: u32) -> Self {
        self.slop = slop;
        self
    }

    /// Get the field name.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Get the terms.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Query-side positions of the terms.
    pub fn positions(&self) -> &[u32] {
        &self.positions
    }

    /// Get the slop.
    pub fn slop(&self) -> u32 {
        self.slop
    }

    /// Score every document containing the phrase.
    ///
    /// The score is the sum of `tf × idf` over the phrase terms.
    pub fn execute(&self, generation: &IndexGeneration) -> Result<MatchList> {
        if self.terms.is_empty() {
            return Ok(Vec::new());
        }

        let mut lists: Vec<&PostingList> = Vec::with_capacity(self.terms.len());
        for term in &self.terms {
            match generation.postings(&self.field, term) {
                Some(list) => lists.push(list),
                None => return Ok(Vec::new()),
            }
        }
        let scorers: Vec<TfIdfScorer> = self
            .terms
            .iter()
            .map(|term| TfIdfScorer::for_term(generation, &self.field, term))
            .collect();

        let mut matches = Vec::new();
        let mut cursors = vec![0usize; lists.len()];
        let mut current: Vec<&Posting> = Vec::with_capacity(lists.len());

        'docs: for candidate in lists[0] {
            current.clear();
            current.push(candidate);
            for (list, cursor) in lists.iter().zip(cursors.iter_mut()).skip(1) {
                *cursor += list[*cursor..].partition_point(|p| p.doc_id < candidate.doc_id);
                match list.get(*cursor) {
                    Some(posting) if posting.doc_id == candidate.doc_id => current.push(posting),
                    Some(_) => continue 'docs,
                    None => break 'docs,
                }
            }

            let positions: Vec<&[u32]> = current.iter().map(|p| p.positions.as_slice()).collect();
            if phrase_matches(&positions, &self.positions, self.slop) {
                let score = current
                    .iter()
                    .zip(&scorers)
                    .map(|(posting, scorer)| scorer.score(posting.term_frequency as f32))
                    .sum();
                matches.push(Hit::new(candidate.doc_id, score));
            }
        }

        Ok(matches)
    }
}

impl fmt::Display for PhraseQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:\"{}\"", self.field, self.terms.join(" "))?;
        if self.slop > 0 {
            write!(f, "~{}", self.slop)?;
        }
        Ok(())
    }
}
