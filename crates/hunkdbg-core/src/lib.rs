//! # hunkdbg-core
//!
//! Debug information for hunk executables (the AmigaOS load file format).
//!
//! This crate provides what a source-level debugger needs from a binary built
//! by an assembler/linker such as vasm/vlink, Devpac or vbcc:
//! - Decoding of code, data and BSS hunks with their symbol tables
//! - Line tables from `HUNK_DEBUG` blocks (`LINE` and compressed `HCLN`)
//! - Address to source line and source line to address queries
//! - Mapping of recorded source paths onto the local project tree
//!
//! ## Addresses
//!
//! Hunks are relocated at load time, so addresses are expressed as a segment
//! id (the index of the hunk in the file) plus an offset within that hunk.
//!
//! ## What this crate does not do
//!
//! Code bytes are opaque: nothing here disassembles or interprets
//! instructions. Relocations are skipped, not applied.

pub mod debug_info;
pub mod error;
pub mod hunk;
pub mod prelude;
pub mod source;
pub mod types;

pub use debug_info::DebugInfo;
// Re-export commonly used types
pub use error::{HunkdbgError, Result};
pub use types::{Hunk, HunkType, SegmentOffset, SourceLocation, Symbol};
