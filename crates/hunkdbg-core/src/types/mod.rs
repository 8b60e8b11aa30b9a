//! # Types
//!
//! Data model shared by the decoder and the resolver.
//!
//! Everything here is plain data: the decoder builds it once per binary and
//! the resolver only reads it.

pub mod address;
pub mod hunk;
pub mod lines;
pub mod symbols;

// Re-export all public types
pub use address::SegmentOffset;
pub use hunk::{Hunk, HunkType, MemoryKind};
pub use lines::{SourceFileLines, SourceLine};
pub use symbols::{SegmentSymbol, SourceLocation, Symbol};
