//! Symbol and source location types.

use std::fmt;

/// A named offset inside a hunk, taken from a `HUNK_SYMBOL` block.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol
{
    /// Symbol name with NUL padding removed.
    pub name: String,
    /// Byte offset within the owning hunk.
    pub offset: u32,
}

impl Symbol
{
    /// Construct a symbol.
    pub fn new(name: impl Into<String>, offset: u32) -> Self
    {
        Self {
            name: name.into(),
            offset,
        }
    }
}

impl fmt::Display for Symbol
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{} @ 0x{:08x}", self.name, self.offset)
    }
}

/// A symbol paired with the segment it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentSymbol<'a>
{
    /// The symbol itself.
    pub symbol: &'a Symbol,
    /// Segment id of the owning hunk.
    pub segment_id: usize,
}

/// Source location for an address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation
{
    /// Resolved path of the source file.
    pub file: String,
    /// 1-based line number as recorded in the line table.
    pub line: u32,
    /// Text of that line, when the file could be read and is long enough.
    pub text: Option<String>,
}

impl fmt::Display for SourceLocation
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{}:{}", self.file, self.line)?;
        if let Some(text) = &self.text {
            write!(f, "  {text}")?;
        }
        Ok(())
    }
}
