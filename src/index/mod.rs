//! Inverted index: generations, the writer that builds them and their
//! binary encoding.

pub mod codec;
pub mod generation;
pub mod writer;

pub use generation::{DocId, FieldPostings, IndexGeneration, Posting, PostingList, Term};
pub use writer::{BuildStats, IndexWriter};
