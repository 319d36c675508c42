//! Query parser for converting query strings to query expressions.
//!
//! Supported syntax:
//!
//! - Terms: `hello` (several terms default to OR)
//! - Operators: `hello AND world`, `hello OR world`; AND binds tighter
//! - Grouping: `(rust OR go) AND compiler`
//! - Phrases: `"hello world"`, with slop `"hello world"~2`
//! - Fields: `title:hello`, `url:https://example.com/a`, `time:1700000000`,
//!   `title:"hello world"`, `title:(a OR b)`. A prefix that is not a field
//!   name is part of the word, so `10:30` searches the default field.
//!
//! Terms of the analyzed `title` field pass through the same analyzer as
//! the index. A bare word that analyzes to several tokens (a run of CJK
//! text, `e-mail`) becomes a phrase over those tokens. Words that analyze
//! to nothing are dropped.

use std::iter::Peekable;
use std::str::Chars;
use std::sync::Arc;

use crate::analysis::{Analyzer, Token};
use crate::config::{TIME_FIELD, TITLE_FIELD, URL_FIELD};
use crate::error::{LoupeError, Result};
use crate::query::boolean::{BooleanQuery, Operator};
use crate::query::phrase::PhraseQuery;
use crate::query::query::Query;
use crate::query::term::TermQuery;

/// How a field's values are turned into terms.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    /// Run through the analyzer.
    Analyzed,
    /// Matched verbatim.
    Keyword,
}

impl FieldKind {
    /// Kind of a known field, `None` for unknown names.
    pub fn of(field: &str) -> Option<Self> {
        match field {
            TITLE_FIELD => Some(FieldKind::Analyzed),
            URL_FIELD | TIME_FIELD => Some(FieldKind::Keyword),
            _ => None,
        }
    }
}

/// Parses query strings against the document fields.
pub struct QueryParser {
    analyzer: Arc<dyn Analyzer>,
    default_field: String,
}

impl QueryParser {
    /// Create a parser analyzing `title` terms with `analyzer`.
    pub fn new(analyzer: Arc<dyn Analyzer>) -> Self {
        QueryParser {
            analyzer,
            default_field: TITLE_FIELD.to_string(),
        }
    }

    /// Set the field searched by unprefixed terms.
    pub fn with_default_field<S: Into<String>>(mut self, field: S) -> Result<Self> {
        let field = field.into();
        if FieldKind::of(&field).is_none() {
            return Err(LoupeError::invalid_argument(format!(
                "unknown default field: {field}"
            )));
        }
        self.default_field = field;
        Ok(self)
    }

    /// Get the default field.
    pub fn default_field(&self) -> &str {
        &self.default_field
    }

    /// Parse a query string using the default field.
    pub fn parse(&self, query_str: &str) -> Result<Query> {
        self.parse_field(&self.default_field, query_str)
    }

    /// Parse a query string, scoping unprefixed terms to `field`.
    pub fn parse_field(&self, field: &str, query_str: &str) -> Result<Query> {
        let trimmed = query_str.trim();
        if trimmed.is_empty() {
            return Err(LoupeError::EmptyQuery);
        }
        if FieldKind::of(field).is_none() {
            return Err(LoupeError::malformed_query(format!("unknown field: {field}")));
        }

        let lexemes = Lexer::new(trimmed).tokenize()?;
        let mut parser = QueryStringParser {
            owner: self,
            lexemes,
            pos: 0,
        };
        parser.parse(field)
    }

    /// Query for a bare word.
    fn word_query(&self, field: &str, word: &str) -> Result<Option<Query>> {
        match field_kind(field)? {
            FieldKind::Keyword => Ok(Some(TermQuery::new(field, word).into())),
            FieldKind::Analyzed => self.analyzed_query(field, word, 0),
        }
    }

    /// Query for quoted text.
    fn phrase_query(&self, field: &str, text: &str, slop: u32) -> Result<Option<Query>> {
        match field_kind(field)? {
            FieldKind::Keyword => Ok(Some(TermQuery::new(field, text).into())),
            FieldKind::Analyzed => self.analyzed_query(field, text, slop),
        }
    }

    fn analyzed_query(&self, field: &str, text: &str, slop: u32) -> Result<Option<Query>> {
        let tokens: Vec<Token> = self
            .analyzer
            .analyze(text)?
            .filter(Token::is_primary)
            .collect();

        match tokens.as_slice() {
            [] => Ok(None),
            [token] => Ok(Some(TermQuery::new(field, token.text.as_str()).into())),
            [first, ..] => {
                let base = first.position;
                let terms = tokens
                    .iter()
                    .map(|t| (t.text.clone(), (t.position - base) as u32))
                    .collect();
                let phrase = PhraseQuery::with_positions(field, terms)?.with_slop(slop);
                Ok(Some(phrase.into()))
            }
        }
    }
}

fn field_kind(field: &str) -> Result<FieldKind> {
    FieldKind::of(field).ok_or_else(|| LoupeError::malformed_query(format!("unknown field: {field}")))
}

/// Lexical units of a query string.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Lexeme {
    Word(String),
    Quoted { text: String, slop: Option<u32> },
    /// `name:` prefix; the value follows as the next lexeme.
    Field(String),
    And,
    Or,
    LParen,
    RParen,
}

impl Lexeme {
    fn starts_clause(&self) -> bool {
        matches!(
            self,
            Lexeme::Word(_) | Lexeme::Quoted { .. } | Lexeme::Field(_) | Lexeme::LParen
        )
    }
}

struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Lexer {
            chars: input.chars().peekable(),
        }
    }

    fn tokenize(mut self) -> Result<Vec<Lexeme>> {
        let mut lexemes = Vec::new();

        while let Some(&c) = self.chars.peek() {
            match c {
                c if c.is_whitespace() => {
                    self.chars.next();
                }
                '(' => {
                    self.chars.next();
                    lexemes.push(Lexeme::LParen);
                }
                ')' => {
                    self.chars.next();
                    lexemes.push(Lexeme::RParen);
                }
                '"' => {
                    self.chars.next();
                    lexemes.push(self.quoted()?);
                }
                _ => self.word(&mut lexemes),
            }
        }

        Ok(lexemes)
    }

    fn quoted(&mut self) -> Result<Lexeme> {
        let mut text = String::new();
        loop {
            match self.chars.next() {
                Some('"') => break,
                Some(c) => text.push(c),
                None => return Err(LoupeError::malformed_query("unbalanced quote")),
            }
        }

        let slop = if self.chars.peek() == Some(&'~') {
            self.chars.next();
            let mut digits = String::new();
            while let Some(&c) = self.chars.peek() {
                if !c.is_ascii_digit() {
                    break;
                }
                digits.push(c);
                self.chars.next();
            }
            let slop = digits
                .parse::<u32>()
                .map_err(|_| LoupeError::malformed_query(format!("invalid slop: ~{digits}")))?;
            Some(slop)
        } else {
            None
        };

        Ok(Lexeme::Quoted { text, slop })
    }

    fn word(&mut self, lexemes: &mut Vec<Lexeme>) {
        let mut word = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_whitespace() || matches!(c, '(' | ')' | '"') {
                break;
            }
            word.push(c);
            self.chars.next();
        }

        match word.as_str() {
            "AND" | "&&" => lexemes.push(Lexeme::And),
            "OR" | "||" => lexemes.push(Lexeme::Or),
            _ => match split_field(&word) {
                Some((name, value)) => {
                    lexemes.push(Lexeme::Field(name.to_string()));
                    if !value.is_empty() {
                        lexemes.push(Lexeme::Word(value.to_string()));
                    }
                }
                None => lexemes.push(Lexeme::Word(word)),
            },
        }
    }
}

/// Split `name:value` when `name` is a known field.
fn split_field(word: &str) -> Option<(&str, &str)> {
    let (name, value) = word.split_once(':')?;
    FieldKind::of(name).is_some().then_some((name, value))
}

/// Recursive-descent parser over lexemes.
///
/// ```text
/// query   := or_expr
/// or_expr := and_expr ( OR? and_expr )*
/// and_expr := unary ( AND unary )*
/// unary   := FIELD? primary
/// primary := WORD | QUOTED | '(' or_expr ')'
/// ```
struct QueryStringParser<'a> {
    owner: &'a QueryParser,
    lexemes: Vec<Lexeme>,
    pos: usize,
}

impl QueryStringParser<'_> {
    fn parse(&mut self, field: &str) -> Result<Query> {
        let query = self.parse_or_expression(field)?;
        match self.peek() {
            None => Ok(query.unwrap_or_else(Query::empty)),
            Some(Lexeme::RParen) => Err(LoupeError::malformed_query("unbalanced ')'")),
            Some(other) => Err(LoupeError::malformed_query(format!(
                "unexpected {other:?}"
            ))),
        }
    }

    fn parse_or_expression(&mut self, field: &str) -> Result<Option<Query>> {
        let mut clauses = vec![self.parse_and_expression(field)?];

        loop {
            match self.peek() {
                None | Some(Lexeme::RParen) => break,
                Some(Lexeme::Or) => {
                    self.advance();
                    self.expect_operand("OR")?;
                    clauses.push(self.parse_and_expression(field)?);
                }
                Some(lexeme) if lexeme.starts_clause() => {
                    clauses.push(self.parse_and_expression(field)?);
                }
                Some(other) => {
                    return Err(LoupeError::malformed_query(format!(
                        "unexpected {other:?}"
                    )));
                }
            }
        }

        Ok(combine(Operator::Or, clauses))
    }

    fn parse_and_expression(&mut self, field: &str) -> Result<Option<Query>> {
        let mut clauses = vec![self.parse_unary(field)?];

        while self.peek() == Some(&Lexeme::And) {
            self.advance();
            self.expect_operand("AND")?;
            clauses.push(self.parse_unary(field)?);
        }

        Ok(combine(Operator::And, clauses))
    }

    fn parse_unary(&mut self, field: &str) -> Result<Option<Query>> {
        match self.advance() {
            Some(Lexeme::Field(name)) => {
                field_kind(&name)?;
                match self.advance() {
                    Some(Lexeme::Word(word)) => self.owner.word_query(&name, &word),
                    Some(Lexeme::Quoted { text, slop }) => {
                        if text.trim().is_empty() {
                            return Err(LoupeError::malformed_query(format!(
                                "empty value for field {name}"
                            )));
                        }
                        self.owner.phrase_query(&name, &text, slop.unwrap_or(0))
                    }
                    Some(Lexeme::LParen) => self.parse_group(&name),
                    _ => Err(LoupeError::malformed_query(format!(
                        "empty value for field {name}"
                    ))),
                }
            }
            Some(Lexeme::Word(word)) => self.owner.word_query(field, &word),
            Some(Lexeme::Quoted { text, slop }) => {
                self.owner.phrase_query(field, &text, slop.unwrap_or(0))
            }
            Some(Lexeme::LParen) => self.parse_group(field),
            Some(Lexeme::RParen) => Err(LoupeError::malformed_query("unbalanced ')'")),
            Some(Lexeme::And) | Some(Lexeme::Or) => Err(LoupeError::malformed_query(
                "operator without left operand",
            )),
            None => Err(LoupeError::malformed_query("unexpected end of query")),
        }
    }

    /// Parse the inside of a group; the opening paren is consumed.
    fn parse_group(&mut self, field: &str) -> Result<Option<Query>> {
        if self.peek() == Some(&Lexeme::RParen) {
            return Err(LoupeError::malformed_query("empty group"));
        }
        let query = self.parse_or_expression(field)?;
        match self.advance() {
            Some(Lexeme::RParen) => Ok(query),
            _ => Err(LoupeError::malformed_query("unbalanced '('")),
        }
    }

    fn expect_operand(&self, operator: &str) -> Result<()> {
        match self.peek() {
            Some(lexeme) if lexeme.starts_clause() => Ok(()),
            _ => Err(LoupeError::malformed_query(format!(
                "dangling {operator}"
            ))),
        }
    }

    fn peek(&self) -> Option<&Lexeme> {
        self.lexemes.get(self.pos)
    }

    fn advance(&mut self) -> Option<Lexeme> {
        let lexeme = self.lexemes.get(self.pos).cloned();
        if lexeme.is_some() {
            self.pos += 1;
        }
        lexeme
    }
}

/// Combine clauses under one operator, dropping empty ones and flattening
/// nested queries with the same operator.
fn combine(operator: Operator, clauses: Vec<Option<Query>>) -> Option<Query> {
    let mut children = Vec::with_capacity(clauses.len());
    for clause in clauses.into_iter().flatten() {
        match clause {
            Query::Boolean(inner) if inner.operator() == operator && !inner.is_empty() => {
                children.extend(inner.children().iter().cloned());
            }
            other => children.push(other),
        }
    }

    match children.len() {
        0 => None,
        1 => children.pop(),
        _ => Some(BooleanQuery::new(operator, children).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::StandardAnalyzer;

    fn parser() -> QueryParser {
        QueryParser::new(Arc::new(StandardAnalyzer::new()))
    }

    fn parse(query: &str) -> Query {
        parser().parse(query).unwrap()
    }

    fn term(field: &str, text: &str) -> Query {
        TermQuery::new(field, text).into()
    }

    fn malformed(query: &str) -> bool {
        matches!(parser().parse(query), Err(LoupeError::MalformedQuery(_)))
    }

    #[test]
    fn test_parse_simple_term() {
        assert_eq!(parse("Hello"), term("title", "hello"));
    }

    #[test]
    fn test_whitespace_defaults_to_or() {
        assert_eq!(
            parse("hello world"),
            BooleanQuery::or(vec![term("title", "hello"), term("title", "world")]).into()
        );
    }

    #[test]
    fn test_and_binds_tighter() {
        assert_eq!(
            parse("a AND b OR c"),
            BooleanQuery::or(vec![
                BooleanQuery::and(vec![term("title", "a"), term("title", "b")]).into(),
                term("title", "c"),
            ])
            .into()
        );
    }

    #[test]
    fn test_grouping() {
        assert_eq!(
            parse("(a OR b) AND c"),
            BooleanQuery::and(vec![
                BooleanQuery::or(vec![term("title", "a"), term("title", "b")]).into(),
                term("title", "c"),
            ])
            .into()
        );
    }

    #[test]
    fn test_phrase_with_slop() {
        let expected: Query =
            PhraseQuery::with_positions("title", vec![("hello".into(), 0), ("world".into(), 2)])
                .unwrap()
                .with_slop(3)
                .into();
        assert_eq!(parse("\"Hello, world\"~3"), expected);
    }

    #[test]
    fn test_cjk_word_becomes_phrase() {
        let expected: Query =
            PhraseQuery::new("title", vec!["中国".into(), "国经".into(), "经济".into()]).into();
        assert_eq!(parse("中国经济"), expected);

        // two characters analyze to a single bigram
        assert_eq!(parse("经济"), term("title", "经济"));
        assert_eq!(parse("中"), term("title", "中"));
    }

    #[test]
    fn test_field_prefixes() {
        assert_eq!(
            parse("url:https://example.com/a?b=c"),
            term("url", "https://example.com/a?b=c")
        );
        assert_eq!(parse("time:1000"), term("time", "1000"));
        assert_eq!(parse("title:Rust"), term("title", "rust"));
        assert_eq!(
            parse("title:(a b)"),
            BooleanQuery::or(vec![term("title", "a"), term("title", "b")]).into()
        );
        assert_eq!(parse("url:\"a b\""), term("url", "a b"));
    }

    #[test]
    fn test_punctuation_is_dropped() {
        assert_eq!(parse("hello !!!"), term("title", "hello"));
        assert_eq!(parse("hello AND ..."), term("title", "hello"));

        let nothing = parse("!!! ???");
        assert!(nothing.is_empty());
        assert_eq!(nothing, Query::empty());
    }

    #[test]
    fn test_empty_query() {
        assert!(matches!(parser().parse(""), Err(LoupeError::EmptyQuery)));
        assert!(matches!(parser().parse("  \t "), Err(LoupeError::EmptyQuery)));
    }

    #[test]
    fn test_malformed_queries() {
        assert!(malformed("\"unterminated"));
        assert!(malformed("(hello"));
        assert!(malformed("hello)"));
        assert!(malformed("()"));
        assert!(malformed("hello AND"));
        assert!(malformed("hello OR"));
        assert!(malformed("AND hello"));
        assert!(malformed("a AND OR b"));
        assert!(malformed("title:"));
        assert!(malformed("title:\"\""));
        assert!(malformed("\"a b\"~"));
        assert!(malformed("\"a b\"~x"));
    }

    #[test]
    fn test_unknown_prefix_is_text() {
        assert_eq!(
            parse("10:30"),
            PhraseQuery::new("title", vec!["10".into(), "30".into()]).into()
        );
        assert_eq!(
            parse("note:draft"),
            PhraseQuery::new("title", vec!["note".into(), "draft".into()]).into()
        );
        assert_eq!(parse("note:"), term("title", "note"));
        assert_eq!(parse("TITLE:x"), parse("\"title x\""));
    }

    #[test]
    fn test_default_field() {
        let parser = parser().with_default_field("url").unwrap();
        assert_eq!(parser.parse("Exact").unwrap(), term("url", "Exact"));
        assert!(QueryParser::new(Arc::new(StandardAnalyzer::new()))
            .with_default_field("body")
            .is_err());
    }

    #[test]
    fn test_parse_field_override() {
        let query = parser().parse_field("time", "1000").unwrap();
        assert_eq!(query, term("time", "1000"));
    }
}
