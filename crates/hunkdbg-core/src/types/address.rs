//! Segment-qualified address type.

use std::fmt;

/// Address inside a loaded hunk binary
///
/// Hunk binaries are relocated by the loader, so the debugger never sees
/// absolute addresses in the file. An address is instead qualified by the
/// segment (hunk index) it lives in plus the byte offset within that segment.
///
/// ## Example
///
/// ```rust
/// use hunkdbg_core::types::SegmentOffset;
///
/// let addr = SegmentOffset::new(1, 0x20);
/// assert_eq!(addr.to_string(), "1:0x00000020");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SegmentOffset
{
    /// Index of the hunk in the decoded sequence
    pub segment_id: usize,
    /// Byte offset within that hunk
    pub offset: u32,
}

impl SegmentOffset
{
    /// Create a new segment-qualified address
    pub const fn new(segment_id: usize, offset: u32) -> Self
    {
        Self { segment_id, offset }
    }

    /// Absolute address once the segment is known to be loaded at `base`
    ///
    /// Returns `None` if the sum does not fit in the 32-bit address space.
    ///
    /// ## Example
    ///
    /// ```rust
    /// use hunkdbg_core::types::SegmentOffset;
    ///
    /// let addr = SegmentOffset::new(0, 0x10);
    /// assert_eq!(addr.relocate(0x0002_0000), Some(0x0002_0010));
    /// assert_eq!(addr.relocate(u32::MAX), None);
    /// ```
    #[must_use]
    pub fn relocate(self, base: u32) -> Option<u32>
    {
        base.checked_add(self.offset)
    }
}

impl From<(usize, u32)> for SegmentOffset
{
    fn from((segment_id, offset): (usize, u32)) -> Self
    {
        Self { segment_id, offset }
    }
}

impl fmt::Display for SegmentOffset
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{}:0x{:08x}", self.segment_id, self.offset)
    }
}
