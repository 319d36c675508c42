//! Text analysis for Loupe.
//!
//! Tokenization and normalization shared by the index writer, the query
//! parser and the highlighter.

pub mod analyzer;
pub mod token;
pub mod token_filter;
pub mod tokenizer;

pub use analyzer::{Analyzer, KeywordAnalyzer, PipelineAnalyzer, StandardAnalyzer};
pub use token::{Token, TokenStream, TokenType};
