//! Query system for searching documents.
//!
//! - [`Query`] - the expression tree: term, phrase and boolean nodes
//! - [`QueryParser`] - turns query strings into expressions
//! - [`matcher`] - doc-id ordered set operations used by evaluation
//! - [`TfIdfScorer`] and [`TopDocsCollector`] - scoring and ranking

pub mod boolean;
pub mod collector;
pub mod matcher;
pub mod parser;
pub mod phrase;
#[allow(clippy::module_inception)]
pub mod query;
pub mod scorer;
pub mod term;

pub use self::boolean::{BooleanQuery, Operator};
pub use self::collector::{Hit, TopDocsCollector};
pub use self::parser::{FieldKind, QueryParser};
pub use self::phrase::PhraseQuery;
pub use self::query::Query;
pub use self::scorer::{Scorer, TfIdfScorer};
pub use self::term::TermQuery;
