//! Persistence for index generations.
//!
//! - [`structured`] - checksummed binary reader/writer
//! - [`file`] - generation directory with an atomically swapped `CURRENT`
//!   pointer

pub mod file;
pub mod structured;

pub use file::IndexStore;
pub use structured::{StructReader, StructWriter};
