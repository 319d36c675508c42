//! Token types for text analysis.
//!
//! A [`Token`] is the unit that flows from the tokenizer through the filters
//! into the index writer, the query parser and the highlighter.
//!
//! # Positions
//!
//! Positions are 0-based and never decrease along a stream. CJK runs produce
//! stacked tokens: the bigram starting at a character and that character's
//! unigram share one position.
//!
//! ```text
//! Input: "中国 GDP"
//!
//!   Position 0: "中国"  (Cjk)
//!   Position 0: "中"    (CjkUnigram)
//!   Position 1: "国"    (CjkUnigram)
//!   Position 2: <separator, dropped>
//!   Position 3: "gdp"   (Alphanum)
//! ```
//!
//! # Examples
//!
//! ```
//! use loupe::analysis::token::{Token, TokenType};
//!
//! let token = Token::with_offsets("world", 2, 6, 11).with_token_type(TokenType::Alphanum);
//! assert_eq!(token.text, "world");
//! assert_eq!(token.start_offset, 6);
//! assert!(token.is_primary());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// A token represents a single unit of text after tokenization.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// The text content of the token
    pub text: String,

    /// The position of the token in the token stream (0-based)
    pub position: usize,

    /// The byte offset where this token starts in the original text
    pub start_offset: usize,

    /// The byte offset where this token ends in the original text
    pub end_offset: usize,

    /// Script class of the run this token came from
    pub token_type: TokenType,
}

/// Token type classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenType {
    /// Latin-script (or other non-CJK) letters and digits.
    Alphanum,
    /// CJK bigram, or the unigram of a single-character CJK run.
    Cjk,
    /// Unigram stacked under a bigram of a longer CJK run.
    CjkUnigram,
    /// Whole-input token produced for exact-match fields.
    Keyword,
}

impl Token {
    /// Create a new token with the given text and position.
    pub fn new<S: Into<String>>(text: S, position: usize) -> Self {
        Token {
            text: text.into(),
            position,
            start_offset: 0,
            end_offset: 0,
            token_type: TokenType::Alphanum,
        }
    }

    /// Create a new token with text, position, and byte offsets.
    pub fn with_offsets<S: Into<String>>(
        text: S,
        position: usize,
        start_offset: usize,
        end_offset: usize,
    ) -> Self {
        Token {
            text: text.into(),
            position,
            start_offset,
            end_offset,
            token_type: TokenType::Alphanum,
        }
    }

    /// Set the token type.
    pub fn with_token_type(mut self, token_type: TokenType) -> Self {
        self.token_type = token_type;
        self
    }

    /// Clone this token with updated text.
    pub fn with_text<S: Into<String>>(&self, text: S) -> Self {
        let mut token = self.clone();
        token.text = text.into();
        token
    }

    /// Get the length of the token text in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Check if the token is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Whether the token is used as a query leaf.
    ///
    /// Stacked CJK unigrams are indexed so single-character queries can find
    /// them, but a multi-character query is expressed with bigrams only.
    pub fn is_primary(&self) -> bool {
        self.token_type != TokenType::CjkUnigram
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// A token stream represents a sequence of tokens from the analysis pipeline.
pub type TokenStream = Box<dyn Iterator<Item = Token> + Send>;
