//! The query expression tree.

use std::fmt;

use crate::error::Result;
use crate::index::IndexGeneration;
use crate::query::boolean::BooleanQuery;
use crate::query::matcher::{MatchList, check_sorted};
use crate::query::phrase::PhraseQuery;
use crate::query::term::TermQuery;

/// A query expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// A single term in a field.
    Term(TermQuery),
    /// Terms at relative positions in a field.
    Phrase(PhraseQuery),
    /// Children combined with AND or OR.
    Boolean(BooleanQuery),
}

impl Query {
    /// A query matching nothing.
    pub fn empty() -> Self {
        Query::Boolean(BooleanQuery::empty())
    }

    /// Whether the query can never match.
    pub fn is_empty(&self) -> bool {
        match self {
            Query::Term(_) => false,
            Query::Phrase(phrase) => phrase.terms().is_empty(),
            Query::Boolean(boolean) => boolean.children().iter().all(Query::is_empty),
        }
    }

    /// Evaluate against a generation.
    ///
    /// Returns the matching documents sorted by doc id.
    pub fn execute(&self, generation: &IndexGeneration) -> Result<MatchList> {
        let matches = match self {
            Query::Term(term) => term.execute(generation)?,
            Query::Phrase(phrase) => phrase.execute(generation)?,
            Query::Boolean(boolean) => boolean.execute(generation)?,
        };
        check_sorted(&matches, self)?;
        Ok(matches)
    }

    /// Term and phrase leaves of `field`, in tree order.
    pub fn field_leaves(&self, field: &str) -> Vec<&Query> {
        let mut leaves = Vec::new();
        self.collect_field_leaves(field, &mut leaves);
        leaves
    }

    fn collect_field_leaves<'a>(&'a self, field: &str, leaves: &mut Vec<&'a Query>) {
        match self {
            Query::Term(term) if term.field() == field => leaves.push(self),
            Query::Phrase(phrase) if phrase.field() == field => leaves.push(self),
            Query::Boolean(boolean) => {
                for child in boolean.children() {
                    child.collect_field_leaves(field, leaves);
                }
            }
            _ => {}
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Query::Term(term) => fmt::Display::fmt(term, f),
            Query::Phrase(phrase) => fmt::Display::fmt(phrase, f),
            Query::Boolean(boolean) => fmt::Display::fmt(boolean, f),
        }
    }
}

impl From<TermQuery> for Query {
    fn from(query: TermQuery) -> Self {
        Query::Term(query)
    }
}

impl From<PhraseQuery> for Query {
    fn from(query: PhraseQuery) -> Self {
        Query::Phrase(query)
    }
}

impl From<BooleanQuery> for Query {
    fn from(query: BooleanQuery) -> Self {
        Query::Boolean(query)
    }
}
