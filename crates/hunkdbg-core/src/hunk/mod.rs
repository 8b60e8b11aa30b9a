//! # Hunk Format
//!
//! Decoding of hunk executables and object files.
//!
//! Only what a source-level debugger needs is kept: code bytes, symbol tables
//! and line tables. Relocations, external references and overlay tables are
//! decoded structurally so the cursor stays in sync, then dropped.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use hunkdbg_core::hunk::parse_file;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>>
//! {
//!     let hunks = parse_file("dh0/gencop".as_ref())?;
//!     for hunk in &hunks {
//!         println!("{hunk}: {} symbols", hunk.symbols().len());
//!     }
//!     Ok(())
//! }
//! ```

pub mod constants;
pub mod line_debug;
pub mod parser;
pub mod reader;

use std::fs;
use std::path::Path;

pub use parser::{parse_hunks, HunkParser};
pub use reader::BinaryReader;

use crate::error::Result;
use crate::types::Hunk;

/// Read and decode a hunk file from disk.
///
/// ## Errors
///
/// Returns [`HunkdbgError::Io`](crate::error::HunkdbgError::Io) if the file
/// cannot be read, or a decode error as described for [`parse_hunks`].
pub fn parse_file(path: &Path) -> Result<Vec<Hunk>>
{
    let bytes = fs::read(path)?;
    parse_hunks(&bytes)
}
