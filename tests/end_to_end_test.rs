//! End-to-end tests of the query boundary over in-memory engines.

use loupe::analysis::{Analyzer, StandardAnalyzer};
use loupe::prelude::*;

fn engine_with(records: Vec<SourceRecord>) -> Result<SearchEngine> {
    let engine = SearchEngine::in_memory(LoupeConfig::default())?;
    engine.rebuild(&VecSource::new(records))?;
    Ok(engine)
}

fn hello_engine() -> Result<SearchEngine> {
    engine_with(vec![
        SourceRecord::new("a", "hello world", 1000),
        SourceRecord::new("b", "hello there", 2000),
    ])
}

/// Strip `<b>`/`</b>` markers and return the marked substrings.
fn marked_spans(title: &str) -> Vec<String> {
    title
        .split("<b>")
        .skip(1)
        .filter_map(|part| part.split_once("</b>").map(|(marked, _)| marked.to_string()))
        .collect()
}

#[test]
fn test_shared_term_ranks_by_doc_order() -> Result<()> {
    let engine = hello_engine()?;
    let response = engine.query("hello", 1)?;

    let urls: Vec<_> = response.page.items.iter().map(|i| i.url.as_str()).collect();
    assert_eq!(urls, vec!["a", "b"]);
    assert_eq!(response.page.items[0].title, "<b>hello</b> world");
    assert_eq!(response.page.items[1].title, "<b>hello</b> there");
    assert!(response.cost_time_ms >= 0.0);
    Ok(())
}

#[test]
fn test_unique_term_matches_one() -> Result<()> {
    let engine = hello_engine()?;
    let response = engine.query("world", 1)?;

    assert_eq!(response.page.total_items, 1);
    assert_eq!(response.page.items[0].url, "a");
    assert_eq!(response.page.items[0].title, "hello <b>world</b>");
    Ok(())
}

#[test]
fn test_case_insensitive() -> Result<()> {
    let engine = hello_engine()?;
    assert_eq!(engine.query("HELLO", 1)?.page.total_items, 2);
    Ok(())
}

#[test]
fn test_cjk_substrings() -> Result<()> {
    let engine = engine_with(vec![
        SourceRecord::new("cn", "中国经济发展", 1),
        SourceRecord::new("en", "economy", 2),
    ])?;

    for query in ["中国", "经济", "经济发展", "中国经济发展"] {
        let response = engine.query(query, 1)?;
        assert_eq!(response.page.total_items, 1, "query {query}");
        assert_eq!(response.page.items[0].url, "cn");
    }

    let response = engine.query("经济", 1)?;
    assert_eq!(response.page.items[0].title, "中国<b>经济</b>发展");
    assert_eq!(engine.query("国经发", 1)?.page.total_items, 0);
    Ok(())
}

#[test]
fn test_single_cjk_character() -> Result<()> {
    let engine = engine_with(vec![
        SourceRecord::new("cn", "中国经济发展", 1),
        SourceRecord::new("one", "经", 2),
    ])?;

    let response = engine.query("经", 1)?;
    assert_eq!(response.page.total_items, 2);
    let titles: Vec<_> = response.page.items.iter().map(|i| i.title.as_str()).collect();
    assert!(titles.contains(&"中国<b>经</b>济发展"));
    assert!(titles.contains(&"<b>经</b>"));
    Ok(())
}

#[test]
fn test_mixed_script_title() -> Result<()> {
    let engine = engine_with(vec![SourceRecord::new("m", "Rust 编程语言 入门", 1)])?;

    assert_eq!(engine.query("rust", 1)?.page.total_items, 1);
    assert_eq!(engine.query("编程", 1)?.page.total_items, 1);
    assert_eq!(engine.query("rust AND 入门", 1)?.page.total_items, 1);
    assert_eq!(engine.query("rust AND python", 1)?.page.total_items, 0);
    Ok(())
}

#[test]
fn test_phrase_and_boolean() -> Result<()> {
    let engine = engine_with(vec![
        SourceRecord::new("1", "quick brown fox", 1),
        SourceRecord::new("2", "brown quick fox", 2),
        SourceRecord::new("3", "slow turtle", 3),
    ])?;

    let phrase = engine.query("\"quick brown\"", 1)?;
    assert_eq!(phrase.page.total_items, 1);
    assert_eq!(phrase.page.items[0].url, "1");

    assert_eq!(engine.query("quick turtle", 1)?.page.total_items, 3);
    assert_eq!(engine.query("quick AND fox", 1)?.page.total_items, 2);
    assert_eq!(
        engine.query("(quick OR turtle) AND slow", 1)?.page.total_items,
        1
    );
    Ok(())
}

#[test]
fn test_field_queries() -> Result<()> {
    let engine = engine_with(vec![
        SourceRecord::new("https://example.com/a", "first", 10),
        SourceRecord::new("https://example.com/b", "second", 20),
    ])?;

    let response = engine.query("url:https://example.com/b", 1)?;
    assert_eq!(response.page.total_items, 1);
    assert_eq!(response.page.items[0].title, "second");

    assert_eq!(engine.query("time:10", 1)?.page.total_items, 1);
    assert!(matches!(
        engine.query("url:", 1),
        Err(LoupeError::MalformedQuery(_))
    ));
    Ok(())
}

#[test]
fn test_colon_in_query_text() -> Result<()> {
    let engine = engine_with(vec![
        SourceRecord::new("https://example.com/a", "standup at 10:30", 10),
        SourceRecord::new("https://example.com/b", "note: draft agenda", 20),
        SourceRecord::new("https://example.com/c", "30 minutes past 10", 30),
    ])?;

    let response = engine.query("10:30", 1)?;
    assert_eq!(response.page.total_items, 1);
    assert_eq!(response.page.items[0].url, "https://example.com/a");

    let response = engine.query("note:draft", 1)?;
    assert_eq!(response.page.total_items, 1);
    assert_eq!(response.page.items[0].url, "https://example.com/b");
    Ok(())
}

#[test]
fn test_pagination_partitions_hits() -> Result<()> {
    let config = LoupeConfig::default().page_size(3);
    let engine = SearchEngine::in_memory(config)?;
    let source: VecSource = (0..8)
        .map(|i| SourceRecord::new(format!("u{i}"), format!("common title {i}"), i))
        .collect();
    engine.rebuild(&source)?;

    let mut urls = Vec::new();
    for page in 1..=3 {
        let response = engine.query("common", page)?;
        assert_eq!(response.page.total_items, 8);
        assert_eq!(response.page.total_pages, 3);
        urls.extend(response.page.items.into_iter().map(|item| item.url));
    }
    let expected: Vec<_> = (0..8).map(|i| format!("u{i}")).collect();
    assert_eq!(urls, expected);

    assert!(engine.query("common", 4)?.page.items.is_empty());
    Ok(())
}

#[test]
fn test_result_cap() -> Result<()> {
    let config = LoupeConfig::default().result_max_num(5).page_size(10);
    let engine = SearchEngine::in_memory(config)?;
    let source: VecSource = (0..20)
        .map(|i| SourceRecord::new(format!("u{i}"), "same", i))
        .collect();
    engine.rebuild(&source)?;

    let response = engine.query("same", 1)?;
    assert_eq!(response.page.items.len(), 5);
    assert_eq!(response.page.total_items, 5);
    Ok(())
}

#[test]
fn test_highlights_are_query_terms() -> Result<()> {
    let engine = engine_with(vec![
        SourceRecord::new("1", "Searching with Rust: a Rust search engine", 1),
        SourceRecord::new("2", "日本語の全文検索エンジン", 2),
    ])?;
    let analyzer = StandardAnalyzer::new();

    for query in ["rust", "engine", "全文検索", "検索"] {
        let response = engine.query(query, 1)?;
        assert!(!response.page.items.is_empty(), "query {query}");
        let query_terms: Vec<String> = analyzer
            .tokens(query)?
            .into_iter()
            .filter(|t| t.is_primary())
            .map(|t| t.text)
            .collect();

        for item in &response.page.items {
            let spans = marked_spans(&item.title);
            assert!(!spans.is_empty(), "no highlight in {}", item.title);
            for span in spans {
                assert!(!span.is_empty());
                let tokens = analyzer.tokens(&span)?;
                assert!(
                    tokens.iter().any(|t| query_terms.contains(&t.text)),
                    "span {span} does not contain a query term"
                );
            }
        }
    }
    Ok(())
}

#[test]
fn test_long_title_is_fragmented() -> Result<()> {
    let config = LoupeConfig::default().fragment_size(20);
    let engine = SearchEngine::in_memory(config)?;
    let title = format!("{} needle {}", "filler ".repeat(30), "tail ".repeat(30));
    engine.rebuild(&VecSource::new(vec![SourceRecord::new("x", title, 1)]))?;

    let response = engine.query("needle", 1)?;
    let fragment = &response.page.items[0].title;
    assert!(fragment.contains("<b>needle</b>"));
    assert_eq!(fragment.replace("<b>", "").replace("</b>", "").chars().count(), 20);
    Ok(())
}

#[test]
fn test_boundary_errors() -> Result<()> {
    let engine = hello_engine()?;

    let empty = engine.query("", 1).unwrap_err();
    assert!(matches!(empty, LoupeError::EmptyQuery));
    assert!(empty.is_client_error());

    assert!(matches!(
        engine.query("\"unterminated", 1),
        Err(LoupeError::MalformedQuery(_))
    ));
    assert!(matches!(
        engine.query("(hello", 1),
        Err(LoupeError::MalformedQuery(_))
    ));
    assert!(matches!(
        engine.query("hello", 0),
        Err(LoupeError::InvalidArgument(_))
    ));
    Ok(())
}

#[test]
fn test_punctuation_only_query_matches_nothing() -> Result<()> {
    let engine = hello_engine()?;
    let response = engine.query("!!!", 1)?;
    assert!(response.page.items.is_empty());
    Ok(())
}
