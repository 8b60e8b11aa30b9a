//! Line table types.

/// One entry of a line table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceLine
{
    /// Byte offset within the hunk where the code for this line starts.
    pub offset: u32,
    /// 1-based line number in the source file.
    pub line: u32,
}

impl SourceLine
{
    pub const fn new(offset: u32, line: u32) -> Self
    {
        Self { offset, line }
    }
}

/// Line table for one source file referenced by a hunk.
///
/// `lines` is ordered by non-decreasing offset. Several entries may share a
/// line number (macros expanded more than once).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFileLines
{
    /// Source path exactly as recorded in the binary.
    pub name: String,
    /// Entries ordered by offset.
    pub lines: Vec<SourceLine>,
}

impl SourceFileLines
{
    /// Build a table, sorting the entries by offset.
    ///
    /// The sort is stable so entries sharing an offset keep their file order.
    pub fn new(name: impl Into<String>, mut lines: Vec<SourceLine>) -> Self
    {
        lines.sort_by_key(|line| line.offset);
        Self {
            name: name.into(),
            lines,
        }
    }

    /// Find the line that covers `offset`.
    ///
    /// An entry at exactly `offset` wins immediately. Otherwise the last entry
    /// starting before `offset` is used, but only if some entry starts after it:
    /// an offset past the last recorded entry has no known extent and is not
    /// attributed to this file.
    #[must_use]
    pub fn find_line(&self, offset: u32) -> Option<u32>
    {
        let mut source_line = 0;
        let mut was_over = false;

        for entry in &self.lines {
            if entry.offset == offset {
                return Some(entry.line);
            }
            if entry.offset < offset {
                source_line = entry.line;
            } else {
                was_over = true;
            }
        }

        was_over.then_some(source_line)
    }

    /// Offset of the first entry recording `line`.
    #[must_use]
    pub fn offset_of_line(&self, line: u32) -> Option<u32>
    {
        self.lines.iter().find(|entry| entry.line == line).map(|entry| entry.offset)
    }
}
