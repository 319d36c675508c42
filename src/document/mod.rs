//! Documents and the sources that feed them to the index writer.

#[allow(clippy::module_inception)]
pub mod document;
pub mod source;

// Re-export commonly used types
pub use document::{Document, SourceRecord};
pub use source::{DocumentSource, JsonlSource, RecordIter, VecSource};
