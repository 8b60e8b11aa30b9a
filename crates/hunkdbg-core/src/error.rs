//! # Error Types
//!
//! General error handling for hunk decoding and debug info queries.
//!
//! We use `thiserror` to automatically generate `Error` trait implementations
//! and nice error messages.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for hunkdbg operations
///
/// Only loading a binary and reading source text can fail. Every query against
/// a loaded [`DebugInfo`](crate::DebugInfo) is total and reports a miss with
/// `None` instead of an error.
///
/// ## Error Categories
///
/// 1. **Decode errors**: MalformedBinary, UnknownBlock
/// 2. **Source errors**: SourceUnreadable
/// 3. **I/O errors**: Io (reading the binary itself)
#[derive(Error, Debug)]
pub enum HunkdbgError
{
    /// The binary is structurally broken
    ///
    /// This happens when:
    /// - A block declares a length that runs past the end of the buffer
    /// - A string length prefix is inconsistent with the remaining data
    /// - A header hunk table is inconsistent (last hunk before first hunk)
    /// - The buffer ends in the middle of a longword
    #[error("Malformed hunk binary at offset 0x{offset:x}: {reason}")]
    MalformedBinary
    {
        /// Byte offset where the problem was detected
        offset: usize,
        /// What was wrong
        reason: String,
    },

    /// A block type tag that cannot be interpreted where a type is mandatory
    ///
    /// The first block of a file must be `HUNK_HEADER` (load file) or
    /// `HUNK_UNIT` (object file). Anything else means this is not a hunk file.
    #[error("Unknown hunk block 0x{tag:08x} at offset 0x{offset:x}")]
    UnknownBlock
    {
        /// Byte offset of the tag
        offset: usize,
        /// The raw tag value
        tag: u32,
    },

    /// A source file resolved for display could not be read
    ///
    /// Path resolution only rewrites names; it never checks that the final
    /// candidate is readable. Callers that want source text should treat this
    /// as "no source text available".
    #[error("Unable to read source file {}: {source}", path.display())]
    SourceUnreadable
    {
        /// The resolved path that was read
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// I/O error while reading the binary
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl HunkdbgError
{
    /// Build a [`HunkdbgError::MalformedBinary`] error.
    pub fn malformed(offset: usize, reason: impl Into<String>) -> Self
    {
        Self::MalformedBinary {
            offset,
            reason: reason.into(),
        }
    }

    /// Whether this error means the binary could not be decoded.
    #[must_use]
    pub fn is_malformed(&self) -> bool
    {
        matches!(self, Self::MalformedBinary { .. } | Self::UnknownBlock { .. })
    }
}

/// Convenience type alias for `Result<T, HunkdbgError>`
///
/// ```rust
/// use hunkdbg_core::error::Result;
/// fn foo() -> Result<()>
/// {
///     Ok(())
/// }
/// ```
pub type Result<T> = std::result::Result<T, HunkdbgError>;
