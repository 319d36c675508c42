//! # Loupe
//!
//! Full-text search over document titles, for Rust.
//!
//! ## Features
//!
//! - CJK-aware analysis: overlapping bigrams for Han, Hiragana, Katakana and
//!   Hangul runs, lowercased words for everything else
//! - Immutable index generations, rebuilt off to the side and published with
//!   an atomic swap
//! - Query strings with phrases, slop, field prefixes, `AND`/`OR` and
//!   parentheses
//! - TF-IDF ranking, best-fragment highlighting and fixed-size pages
//! - Crash-safe on-disk generations with checksums
//!
//! ```
//! use loupe::prelude::*;
//!
//! let engine = SearchEngine::in_memory(LoupeConfig::default()).unwrap();
//! let source = VecSource::new(vec![
//!     SourceRecord::new("https://example.com/a", "Hello world", 1_700_000_000),
//!     SourceRecord::new("https://example.com/b", "中国经济发展", 1_700_000_100),
//! ]);
//! engine.rebuild(&source).unwrap();
//!
//! let response = engine.query("经济", 1).unwrap();
//! assert_eq!(response.page.items[0].url, "https://example.com/b");
//! assert_eq!(response.page.items[0].title, "中国<b>经济</b>发展");
//! ```

pub mod analysis;
pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod index;
pub mod query;
pub mod search;
pub mod storage;
pub mod util;

pub mod prelude {
    pub use crate::analysis::{Analyzer, KeywordAnalyzer, StandardAnalyzer, Token, TokenType};
    pub use crate::config::LoupeConfig;
    pub use crate::document::{Document, DocumentSource, JsonlSource, SourceRecord, VecSource};
    pub use crate::error::{LoupeError, Result};
    pub use crate::index::{IndexGeneration, IndexWriter};
    pub use crate::query::{Query, QueryParser};
    pub use crate::search::{Page, QueryResponse, ResultItem, SearchEngine};
    pub use crate::storage::IndexStore;
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
