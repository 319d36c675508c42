//! Tokenizer implementations for text analysis.
//!
//! - [`CjkBigramTokenizer`] - Mixed-script tokenizer: Latin words plus CJK bigrams
//! - [`WholeTokenizer`] - Treats entire text as single token

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for tokenizers that convert text into tokens.
pub trait Tokenizer: Send + Sync {
    /// Tokenize the given text into a stream of tokens.
    fn tokenize(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this tokenizer (for debugging and configuration).
    fn name(&self) -> &'static str;
}

pub mod cjk_bigram;
pub mod whole;

pub use cjk_bigram::CjkBigramTokenizer;
pub use whole::WholeTokenizer;

/// Script class of a single character.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharClass {
    /// Letters and digits outside the CJK blocks.
    Alphanum,
    /// Han ideographs, kana and Hangul.
    Cjk,
    /// Everything else: whitespace, punctuation, symbols.
    Separator,
}

impl CharClass {
    /// Classify a character.
    pub fn of(c: char) -> Self {
        if is_cjk(c) {
            CharClass::Cjk
        } else if c.is_alphanumeric() {
            CharClass::Alphanum
        } else {
            CharClass::Separator
        }
    }
}

/// Whether `c` belongs to a script written without word separators.
pub fn is_cjk(c: char) -> bool {
    // Katakana middle dot is punctuation.
    c != '\u{30FB}'
        && matches!(c as u32,
        0x3040..=0x309F        // Hiragana
        | 0x30A0..=0x30FF      // Katakana
        | 0x31F0..=0x31FF      // Katakana phonetic extensions
        | 0x3400..=0x4DBF      // CJK unified ideographs extension A
        | 0x4E00..=0x9FFF      // CJK unified ideographs
        | 0xF900..=0xFAFF      // CJK compatibility ideographs
        | 0xFF66..=0xFF9F      // Half-width katakana
        | 0x1100..=0x11FF      // Hangul jamo
        | 0x3130..=0x318F      // Hangul compatibility jamo
        | 0xAC00..=0xD7AF      // Hangul syllables
        | 0x20000..=0x2FA1F    // Supplementary ideographic planes
        )
}
