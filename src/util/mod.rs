//! Utility modules for Loupe.

pub mod varint;

// Re-export commonly used types
pub use varint::*;
