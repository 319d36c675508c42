//! Text highlighting for search results.
//!
//! The highlighter re-analyzes a stored title with the index analyzer and
//! marks every token matched by a term leaf of the query. For a phrase leaf
//! only the tokens of an actual phrase occurrence are marked. The
//! `fragment_size`-character window holding the most complete matches wins.

use std::fmt;
use std::sync::Arc;

use ahash::AHashSet;
use serde::Serialize;

use crate::analysis::{Analyzer, Token};
use crate::config::{LoupeConfig, TITLE_FIELD};
use crate::document::Document;
use crate::error::{LoupeError, Result};
use crate::query::matcher::phrase_occurrences;
use crate::query::{PhraseQuery, Query};

/// Configuration for text highlighting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightConfig {
    /// Field whose query terms are highlighted.
    pub field: String,
    /// Length of the fragment in characters.
    pub fragment_size: usize,
    /// Marker inserted before a match.
    pub pre_tag: String,
    /// Marker inserted after a match.
    pub post_tag: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        HighlightConfig::from(&LoupeConfig::default())
    }
}

impl From<&LoupeConfig> for HighlightConfig {
    fn from(config: &LoupeConfig) -> Self {
        HighlightConfig {
            field: TITLE_FIELD.to_string(),
            fragment_size: config.fragment_size,
            pre_tag: config.pre_tag.clone(),
            post_tag: config.post_tag.clone(),
        }
    }
}

impl HighlightConfig {
    /// Set the fragment size.
    pub fn fragment_size(mut self, fragment_size: usize) -> Self {
        self.fragment_size = fragment_size;
        self
    }

    /// Set the match markers.
    pub fn markers<S: Into<String>>(mut self, pre_tag: S, post_tag: S) -> Self {
        self.pre_tag = pre_tag.into();
        self.post_tag = post_tag.into();
        self
    }
}

/// A window of text with the byte spans of its matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fragment {
    /// The fragment text.
    pub text: String,
    /// Byte offset of the fragment in the source text.
    pub offset: usize,
    /// Matched `(start, end)` byte ranges within `text`, ordered by start.
    pub matched_spans: Vec<(usize, usize)>,
}

impl Fragment {
    /// Whether any match fell inside the fragment.
    pub fn has_matches(&self) -> bool {
        !self.matched_spans.is_empty()
    }

    /// Wrap every match in `open`/`close`.
    ///
    /// Overlapping spans (adjacent CJK bigrams share a character) are
    /// merged first, so markers never nest.
    pub fn render(&self, open: &str, close: &str) -> String {
        let merged = merge_overlapping_spans(&self.matched_spans);
        let mut result =
            String::with_capacity(self.text.len() + merged.len() * (open.len() + close.len()));
        let mut last = 0;

        for (start, end) in merged {
            result.push_str(&self.text[last..start]);
            result.push_str(open);
            result.push_str(&self.text[start..end]);
            result.push_str(close);
            last = end;
        }
        result.push_str(&self.text[last..]);

        result
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// Merge spans that overlap. Input must be sorted by start.
fn merge_overlapping_spans(spans: &[(usize, usize)]) -> Vec<(usize, usize)> {
    let mut merged: Vec<(usize, usize)> = Vec::with_capacity(spans.len());
    for &(start, end) in spans {
        match merged.last_mut() {
            Some(current) if start < current.1 => current.1 = current.1.max(end),
            _ => merged.push((start, end)),
        }
    }
    merged
}

/// Selects and marks the best fragment of a document title.
pub struct Highlighter {
    config: HighlightConfig,
    analyzer: Arc<dyn Analyzer>,
}

impl fmt::Debug for Highlighter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Highlighter")
            .field("config", &self.config)
            .field("analyzer", &self.analyzer.name())
            .finish()
    }
}

impl Highlighter {
    /// Create a highlighter.
    pub fn new(config: HighlightConfig, analyzer: Arc<dyn Analyzer>) -> Result<Self> {
        if config.fragment_size == 0 {
            return Err(LoupeError::invalid_argument("fragment_size must be > 0"));
        }
        Ok(Highlighter { config, analyzer })
    }

    /// Get the configuration.
    pub fn config(&self) -> &HighlightConfig {
        &self.config
    }

    /// Best fragment of the document's title for `query`.
    pub fn highlight(&self, doc: &Document, query: &Query) -> Result<Fragment> {
        self.highlight_text(&doc.title, query)
    }

    /// Best fragment of `text` for `query`.
    pub fn highlight_text(&self, text: &str, query: &Query) -> Result<Fragment> {
        let mut spans = self.matched_spans(text, query)?;
        spans.sort_unstable();
        spans.dedup();

        // Byte offset of every char boundary, including the end of text.
        let boundaries: Vec<usize> = text
            .char_indices()
            .map(|(offset, _)| offset)
            .chain(std::iter::once(text.len()))
            .collect();
        let char_count = boundaries.len() - 1;
        let window = self.config.fragment_size;

        if spans.is_empty() {
            let end = boundaries[window.min(char_count)];
            return Ok(Fragment {
                text: text[..end].to_string(),
                offset: 0,
                matched_spans: Vec::new(),
            });
        }

        let (start, end) = if char_count <= window {
            (0, text.len())
        } else {
            best_window(&spans, &boundaries, window)
        };

        let matched_spans = spans
            .iter()
            .filter(|&&(s, e)| s >= start && e <= end)
            .map(|&(s, e)| (s - start, e - start))
            .collect();

        Ok(Fragment {
            text: text[start..end].to_string(),
            offset: start,
            matched_spans,
        })
    }

    /// Byte spans of the tokens of `text` matched by the query's leaves.
    fn matched_spans(&self, text: &str, query: &Query) -> Result<Vec<(usize, usize)>> {
        let leaves = query.field_leaves(&self.config.field);
        if leaves.is_empty() {
            return Ok(Vec::new());
        }

        let tokens: Vec<Token> = self.analyzer.analyze(text)?.collect();
        let mut terms: AHashSet<&str> = AHashSet::new();
        let mut spans = Vec::new();

        for leaf in leaves {
            match leaf {
                Query::Term(term) => {
                    terms.insert(term.term());
                }
                Query::Phrase(phrase) => phrase_spans(&tokens, phrase, &mut spans),
                Query::Boolean(_) => {}
            }
        }

        spans.extend(
            tokens
                .iter()
                .filter(|token| terms.contains(token.text.as_str()))
                .map(|token| (token.start_offset, token.end_offset)),
        );
        Ok(spans)
    }

    /// Highlight and render with the configured markers.
    pub fn highlight_marked(&self, doc: &Document, query: &Query) -> Result<String> {
        let fragment = self.highlight(doc, query)?;
        Ok(fragment.render(&self.config.pre_tag, &self.config.post_tag))
    }
}

/// Push the spans of every occurrence of `phrase` among `tokens`.
fn phrase_spans(tokens: &[Token], phrase: &PhraseQuery, spans: &mut Vec<(usize, usize)>) {
    let positions: Vec<Vec<u32>> = phrase
        .terms()
        .iter()
        .map(|term| {
            tokens
                .iter()
                .filter(|token| token.text == *term)
                .map(|token| token.position as u32)
                .collect()
        })
        .collect();
    let positions: Vec<&[u32]> = positions.iter().map(Vec::as_slice).collect();

    for occurrence in phrase_occurrences(&positions, phrase.positions(), phrase.slop()) {
        for (term, position) in phrase.terms().iter().zip(occurrence) {
            if let Some(token) = tokens
                .iter()
                .find(|token| token.position as u32 == position && token.text == *term)
            {
                spans.push((token.start_offset, token.end_offset));
            }
        }
    }
}

/// Byte range of the window of `window` chars containing the most spans;
/// the earliest window wins ties.
fn best_window(spans: &[(usize, usize)], boundaries: &[usize], window: usize) -> (usize, usize) {
    let char_count = boundaries.len() - 1;
    let mut best = (0, boundaries[window]);
    let mut best_score = 0;

    for first_char in 0..=char_count - window {
        let start = boundaries[first_char];
        let end = boundaries[first_char + window];
        let score = spans
            .iter()
            .filter(|&&(s, e)| s >= start && e <= end)
            .count();
        if score > best_score {
            best_score = score;
            best = (start, end);
        }
    }

    best
}
