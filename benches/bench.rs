//! Criterion benchmarks for Loupe.
//!
//! - Text analysis of Latin and CJK titles
//! - Index builds
//! - Query evaluation through the full boundary

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use loupe::prelude::*;

const WORDS: &[&str] = &[
    "search", "engine", "full", "text", "index", "query", "document", "title", "rust",
    "phrase", "boolean", "ranking", "highlight", "page", "storage", "generation",
];

const CJK: &[&str] = &[
    "中国经济发展", "全文検索エンジン", "東京の天気予報", "한국어 형태소", "人工知能の研究",
    "数据库系统",
];

/// Generate deterministic source records.
fn generate_records(count: usize) -> Vec<SourceRecord> {
    (0..count)
        .map(|i| {
            let mut title = String::new();
            for j in 0..6 {
                title.push_str(WORDS[(i * 7 + j * 3) % WORDS.len()]);
                title.push(' ');
            }
            title.push_str(CJK[i % CJK.len()]);
            SourceRecord::new(format!("https://example.com/{i}"), title, i as i64)
        })
        .collect()
}

fn bench_analysis(c: &mut Criterion) {
    let analyzer = StandardAnalyzer::new();
    let mut group = c.benchmark_group("analysis");

    let latin = "The quick brown fox jumps over the lazy dog while searching titles";
    let cjk = "全文検索エンジンの設計と実装について中国经济发展";
    group.throughput(Throughput::Bytes(latin.len() as u64));
    group.bench_function("latin", |b| {
        b.iter(|| analyzer.tokens(black_box(latin)).unwrap())
    });
    group.throughput(Throughput::Bytes(cjk.len() as u64));
    group.bench_function("cjk", |b| b.iter(|| analyzer.tokens(black_box(cjk)).unwrap()));

    group.finish();
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    group.sample_size(20);

    for count in [1_000, 10_000] {
        let source = VecSource::new(generate_records(count));
        let engine = SearchEngine::in_memory(LoupeConfig::default()).unwrap();

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &source, |b, source| {
            b.iter(|| engine.rebuild(source).unwrap())
        });
    }

    group.finish();
}

fn bench_query(c: &mut Criterion) {
    let engine = SearchEngine::in_memory(LoupeConfig::default()).unwrap();
    engine
        .rebuild(&VecSource::new(generate_records(10_000)))
        .unwrap();

    let mut group = c.benchmark_group("query");
    for query in ["rust", "search AND engine", "\"full text\"", "经济", "全文検索", "title OR page"] {
        group.bench_with_input(BenchmarkId::from_parameter(query), query, |b, query| {
            b.iter(|| engine.query(black_box(query), 1).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_analysis, bench_build, bench_query);
criterion_main!(benches);
