//! High-level search engine: the current generation, rebuilds, and the
//! query boundary.
//!
//! The engine owns exactly one current [`IndexGeneration`] behind an
//! `RwLock<Arc<_>>`. Queries clone the `Arc` and release the lock at once;
//! a rebuild builds a new generation off to the side, persists it when the
//! engine has a store, and publishes it with a single pointer swap.

use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;
use std::time::Instant;

use chrono::{DateTime, Local};
use log::{debug, error, info, warn};
use parking_lot::RwLock;
use serde::Serialize;

use crate::analysis::{Analyzer, StandardAnalyzer};
use crate::config::LoupeConfig;
use crate::document::DocumentSource;
use crate::error::{LoupeError, Result};
use crate::index::{IndexGeneration, IndexWriter};
use crate::query::{Query, QueryParser};
use crate::search::highlight::{HighlightConfig, Highlighter};
use crate::search::paginate::{Page, paginate};
use crate::search::rebuild::{RebuildHandle, RebuildPermit, RebuildStats};
use crate::search::searcher::{SearchResults, Searcher};
use crate::storage::IndexStore;

/// One result row of the query boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultItem {
    /// Best title fragment with matches marked.
    pub title: String,
    /// Document url.
    pub url: String,
    /// Document time rendered in local time.
    pub time: String,
}

/// Response of the query boundary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResponse {
    /// Milliseconds spent evaluating and ranking.
    pub cost_time_ms: f64,
    /// The requested page.
    pub page: Page<ResultItem>,
}

/// Statistics of the current generation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexInfo {
    /// Current generation id.
    pub generation_id: u64,
    /// Indexed source documents.
    pub doc_count: usize,
    /// Distinct `(field, term)` pairs.
    pub term_count: usize,
    /// Build time of the generation, local time.
    pub built_at: String,
    /// Index directory, for persistent engines.
    pub index_dir: Option<String>,
    /// Whether a rebuild is running.
    pub rebuilding: bool,
}

/// A search engine serving one index.
pub struct SearchEngine {
    config: LoupeConfig,
    analyzer: Arc<dyn Analyzer>,
    parser: QueryParser,
    highlighter: Highlighter,
    current: RwLock<Arc<IndexGeneration>>,
    store: Option<IndexStore>,
    rebuilding: Arc<AtomicBool>,
    next_generation: AtomicU64,
}

impl std::fmt::Debug for SearchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchEngine")
            .field("config", &self.config)
            .field("analyzer", &self.analyzer.name())
            .field("generation", &self.current.read().id())
            .field("store", &self.store)
            .finish()
    }
}

impl SearchEngine {
    /// Create an engine with an explicit analyzer and optional store.
    ///
    /// With a store, the current generation on disk (if any) is loaded. A
    /// corrupted or missing generation file is logged and the engine starts
    /// empty, so a rebuild can still replace it.
    pub fn new(
        config: LoupeConfig,
        analyzer: Arc<dyn Analyzer>,
        store: Option<IndexStore>,
    ) -> Result<Self> {
        config.validate()?;

        let parser = QueryParser::new(Arc::clone(&analyzer))
            .with_default_field(config.default_field.clone())?;
        let highlighter =
            Highlighter::new(HighlightConfig::from(&config), Arc::clone(&analyzer))?;

        let (generation, next_generation) = match &store {
            Some(store) => {
                let next = store.next_generation_id()?;
                let generation = match store.load_current() {
                    Ok(generation) => generation.unwrap_or_else(|| IndexGeneration::empty(0)),
                    // Served empty until the next rebuild replaces it.
                    Err(e @ (LoupeError::Corrupted(_) | LoupeError::Storage(_))) => {
                        error!(
                            "Current generation in {} is unreadable, starting empty: {e}",
                            store.directory().display()
                        );
                        IndexGeneration::empty(0)
                    }
                    Err(e) => return Err(e),
                };
                (generation, next)
            }
            None => (IndexGeneration::empty(0), 1),
        };
        info!(
            "Opened index generation {} with {} documents",
            generation.id(),
            generation.doc_count()
        );

        Ok(SearchEngine {
            config,
            analyzer,
            parser,
            highlighter,
            current: RwLock::new(Arc::new(generation)),
            store,
            rebuilding: Arc::new(AtomicBool::new(false)),
            next_generation: AtomicU64::new(next_generation),
        })
    }

    /// Create an engine that keeps generations in memory only.
    pub fn in_memory(config: LoupeConfig) -> Result<Self> {
        SearchEngine::new(config, Arc::new(StandardAnalyzer::new()), None)
    }

    /// Open (creating if needed) a persistent engine in `dir`.
    pub fn open<P: AsRef<Path>>(dir: P, config: LoupeConfig) -> Result<Self> {
        let store = IndexStore::open(dir)?;
        SearchEngine::new(config, Arc::new(StandardAnalyzer::new()), Some(store))
    }

    /// Get the configuration.
    pub fn config(&self) -> &LoupeConfig {
        &self.config
    }

    /// Get the analyzer shared by indexing and querying.
    pub fn analyzer(&self) -> &Arc<dyn Analyzer> {
        &self.analyzer
    }

    /// The current generation.
    pub fn current(&self) -> Arc<IndexGeneration> {
        Arc::clone(&self.current.read())
    }

    /// Make `generation` current. Searches already running keep theirs.
    pub fn publish(&self, generation: IndexGeneration) {
        let generation = Arc::new(generation);
        let previous = std::mem::replace(&mut *self.current.write(), Arc::clone(&generation));
        info!(
            "Published generation {} ({} documents), replacing {}",
            generation.id(),
            generation.doc_count(),
            previous.id()
        );
    }

    /// Whether a rebuild is running.
    pub fn is_rebuilding(&self) -> bool {
        self.rebuilding.load(Ordering::Acquire)
    }

    /// Rebuild the index from `source` and publish it, blocking the caller.
    ///
    /// Fails with [`LoupeError::RebuildInProgress`] when another rebuild is
    /// running. On any failure the previous generation stays current.
    pub fn rebuild(&self, source: &dyn DocumentSource) -> Result<RebuildStats> {
        let _permit = RebuildPermit::acquire(&self.rebuilding)?;
        self.run_rebuild(source)
    }

    /// Rebuild on a worker thread.
    ///
    /// The permit is taken before the worker starts, so a concurrent request
    /// is rejected immediately.
    pub fn spawn_rebuild(self: &Arc<Self>, source: Arc<dyn DocumentSource>) -> Result<RebuildHandle> {
        let permit = RebuildPermit::acquire(&self.rebuilding)?;
        let (sender, receiver) = crossbeam_channel::bounded(1);
        let engine = Arc::clone(self);

        let worker = thread::Builder::new()
            .name("loupe-rebuild".to_string())
            .spawn(move || {
                let _permit = permit;
                let result = engine.run_rebuild(source.as_ref());
                // The handle may have been dropped; the result is logged either way.
                let _ = sender.send(result);
            })?;

        Ok(RebuildHandle::new(receiver, worker))
    }

    fn run_rebuild(&self, source: &dyn DocumentSource) -> Result<RebuildStats> {
        let start = Instant::now();
        let generation_id = self.next_generation.fetch_add(1, Ordering::SeqCst);
        info!(
            "Rebuilding generation {generation_id} from {}",
            source.describe()
        );

        let writer = IndexWriter::new(Arc::clone(&self.analyzer));
        let (generation, build) = writer.build_from(source, generation_id).inspect_err(|e| {
            error!("Rebuild of generation {generation_id} aborted: {e}");
        })?;

        if let Some(store) = &self.store {
            store.save(&generation).inspect_err(|e| {
                error!("Failed to persist generation {generation_id}: {e}");
            })?;
        }

        let stats = RebuildStats {
            generation_id,
            doc_count: build.indexed,
            skipped: build.skipped,
            term_count: build.terms,
            elapsed: start.elapsed(),
        };
        self.publish(generation);

        if let Some(store) = &self.store {
            if let Err(e) = store.prune(self.config.keep_generations) {
                warn!("Failed to prune old generations: {e}");
            }
        }

        info!(
            "Rebuild finished: {} indexed, {} skipped, {} terms in {:?}",
            stats.doc_count, stats.skipped, stats.term_count, stats.elapsed
        );
        Ok(stats)
    }

    /// Parse a query string with the engine's analyzer and default field.
    pub fn parse(&self, query_str: &str) -> Result<Query> {
        self.parser.parse(query_str)
    }

    /// Ranked hits for `query` on the current generation.
    pub fn search(&self, query: &Query, max_hits: usize) -> Result<SearchResults> {
        Searcher::new(self.current()).search(query, max_hits)
    }

    /// The query boundary: parse, rank, paginate, highlight.
    ///
    /// Only the items of the requested page are highlighted; ranking does
    /// not depend on highlighting, so the page content is the same as
    /// highlighting every hit first.
    pub fn query(&self, query_str: &str, page: usize) -> Result<QueryResponse> {
        if query_str.trim().is_empty() {
            return Err(LoupeError::EmptyQuery);
        }
        if page == 0 {
            return Err(LoupeError::invalid_argument("page numbers start at 1"));
        }

        let query = self.parse(query_str)?;
        let searcher = Searcher::new(self.current());

        let start = Instant::now();
        let results = searcher.search(&query, self.config.result_max_num)?;
        let cost_time_ms = start.elapsed().as_secs_f64() * 1000.0;
        debug!(
            "Query {query} matched {} documents in {cost_time_ms:.3} ms",
            results.total_hits
        );

        let generation = searcher.generation();
        let page = paginate(results.hits, page, self.config.page_size)?.try_map(|hit| {
            let doc = generation.document(hit.doc_id).ok_or_else(|| {
                LoupeError::internal(format!(
                    "hit {} outside generation {} of {} documents",
                    hit.doc_id,
                    generation.id(),
                    generation.doc_count()
                ))
            })?;
            Ok(ResultItem {
                title: self.highlighter.highlight_marked(doc, &query)?,
                url: doc.url.clone(),
                time: self.format_time(doc.time),
            })
        })?;

        Ok(QueryResponse { cost_time_ms, page })
    }

    /// Statistics of the current generation.
    pub fn info(&self) -> IndexInfo {
        let generation = self.current();
        IndexInfo {
            generation_id: generation.id(),
            doc_count: generation.doc_count(),
            term_count: generation.term_count(),
            built_at: self.format_time(generation.built_at()),
            index_dir: self
                .store
                .as_ref()
                .map(|store| store.directory().display().to_string()),
            rebuilding: self.is_rebuilding(),
        }
    }

    /// Render a unix timestamp with the configured format in local time.
    ///
    /// Timestamps chrono cannot represent are rendered as the raw number.
    pub fn format_time(&self, timestamp: i64) -> String {
        let Some(utc) = DateTime::from_timestamp(timestamp, 0) else {
            return timestamp.to_string();
        };

        let mut out = String::new();
        match write!(out, "{}", utc.with_timezone(&Local).format(&self.config.time_format)) {
            Ok(()) => out,
            Err(_) => timestamp.to_string(),
        }
    }
}
