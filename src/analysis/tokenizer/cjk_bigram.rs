//! Mixed-script tokenizer with CJK bigram segmentation.

use crate::analysis::token::{Token, TokenStream, TokenType};
use crate::analysis::tokenizer::{CharClass, Tokenizer};
use crate::error::Result;

/// A tokenizer for text that mixes space-delimited scripts with CJK.
///
/// The input is split into runs of one [`CharClass`]:
///
/// - Alphanumeric runs become one token each.
/// - CJK runs become overlapping bigrams. Every character of the run also
///   emits a unigram stacked at the position of the bigram that starts on
///   it, so both one-character and multi-character queries are answerable
///   without a dictionary. A one-character run emits only its unigram.
/// - Separator runs emit nothing but advance the position by one once the
///   stream has started.
///
/// Offsets are byte offsets into the input.
///
/// # Examples
///
/// ```
/// use loupe::analysis::tokenizer::{CjkBigramTokenizer, Tokenizer};
///
/// let tokenizer = CjkBigramTokenizer::new();
/// let tokens: Vec<_> = tokenizer
///     .tokenize("中国经济")
///     .unwrap()
///     .filter(|t| t.is_primary())
///     .map(|t| t.text)
///     .collect();
/// assert_eq!(tokens, vec!["中国", "国经", "经济"]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct CjkBigramTokenizer;

impl CjkBigramTokenizer {
    /// Create a new tokenizer.
    pub fn new() -> Self {
        CjkBigramTokenizer
    }

    fn emit_run(
        text: &str,
        class: CharClass,
        run: &[(usize, char)],
        position: &mut usize,
        tokens: &mut Vec<Token>,
    ) {
        let Some(&(start, _)) = run.first() else {
            return;
        };
        let end = run
            .last()
            .map(|&(offset, c)| offset + c.len_utf8())
            .unwrap_or(start);

        match class {
            CharClass::Alphanum => {
                tokens.push(
                    Token::with_offsets(&text[start..end], *position, start, end)
                        .with_token_type(TokenType::Alphanum),
                );
                *position += 1;
            }
            CharClass::Cjk => {
                if run.len() == 1 {
                    tokens.push(
                        Token::with_offsets(&text[start..end], *position, start, end)
                            .with_token_type(TokenType::Cjk),
                    );
                } else {
                    for (i, &(offset, c)) in run.iter().enumerate() {
                        let char_end = offset + c.len_utf8();
                        if let Some(&(next_offset, next)) = run.get(i + 1) {
                            let bigram_end = next_offset + next.len_utf8();
                            tokens.push(
                                Token::with_offsets(
                                    &text[offset..bigram_end],
                                    *position + i,
                                    offset,
                                    bigram_end,
                                )
                                .with_token_type(TokenType::Cjk),
                            );
                        }
                        tokens.push(
                            Token::with_offsets(&text[offset..char_end], *position + i, offset, char_end)
                                .with_token_type(TokenType::CjkUnigram),
                        );
                    }
                }
                *position += run.len();
            }
            CharClass::Separator => {
                if !tokens.is_empty() {
                    *position += 1;
                }
            }
        }
    }
}

impl Tokenizer for CjkBigramTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        let mut tokens = Vec::new();
        let mut position = 0;
        let mut run: Vec<(usize, char)> = Vec::new();
        let mut run_class = CharClass::Separator;

        for (offset, c) in text.char_indices() {
            let class = CharClass::of(c);
            if class != run_class && !run.is_empty() {
                Self::emit_run(text, run_class, &run, &mut position, &mut tokens);
                run.clear();
            }
            run_class = class;
            run.push((offset, c));
        }
        Self::emit_run(text, run_class, &run, &mut position, &mut tokens);

        Ok(Box::new(tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "cjk_bigram"
    }
}
