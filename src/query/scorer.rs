//! Scoring implementations for ranking search results.

use std::fmt::Debug;

use crate::index::IndexGeneration;

/// Trait for per-term scorers.
pub trait Scorer: Send + Debug {
    /// Score one term occurring `term_freq` times in a document.
    fn score(&self, term_freq: f32) -> f32;

    /// Get the name of this scorer.
    fn name(&self) -> &'static str;
}

/// Classic TF-IDF: `tf × ln(1 + N / (1 + df))`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TfIdfScorer {
    idf: f32,
}

impl TfIdfScorer {
    /// Create a scorer from collection statistics.
    pub fn new(doc_count: usize, doc_freq: usize) -> Self {
        let n = doc_count as f64;
        let df = doc_freq as f64;
        TfIdfScorer {
            idf: (1.0 + n / (1.0 + df)).ln() as f32,
        }
    }

    /// Create a scorer for a term of the given generation.
    pub fn for_term(generation: &IndexGeneration, field: &str, text: &str) -> Self {
        TfIdfScorer {
            idf: generation.idf(field, text),
        }
    }

    /// The inverse document frequency weight.
    pub fn idf(&self) -> f32 {
        self.idf
    }
}

impl Scorer for TfIdfScorer {
    fn score(&self, term_freq: f32) -> f32 {
        term_freq * self.idf
    }

    fn name(&self) -> &'static str {
        "tf_idf"
    }
}
