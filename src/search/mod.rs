//! Search engine for executing queries and collecting results.

pub mod engine;
pub mod highlight;
pub mod paginate;
pub mod rebuild;
pub mod searcher;

pub use self::engine::{IndexInfo, QueryResponse, ResultItem, SearchEngine};
pub use self::highlight::{Fragment, HighlightConfig, Highlighter};
pub use self::paginate::{Page, paginate};
pub use self::rebuild::{RebuildHandle, RebuildPermit, RebuildStats};
pub use self::searcher::{SearchResults, Searcher};
