//! Common module for library exports

pub use crate::debug_info::DebugInfo;
pub use crate::error::{HunkdbgError, Result};
pub use crate::hunk::{parse_file, parse_hunks};
pub use crate::source::{FileSystem, PathConfig, PathReplacement, StdFileSystem};
pub use crate::types::{
    Hunk, HunkType, MemoryKind, SegmentOffset, SegmentSymbol, SourceFileLines, SourceLine, SourceLocation, Symbol,
};
