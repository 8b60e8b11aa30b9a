//! Decoded hunk records.

use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use super::lines::SourceFileLines;
use super::symbols::Symbol;

/// Kind of loadable unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HunkType
{
    /// Executable code (`HUNK_CODE`).
    Code,
    /// Initialized data (`HUNK_DATA`).
    Data,
    /// Zero-filled data with no file payload (`HUNK_BSS`).
    Bss,
}

impl fmt::Display for HunkType
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        let label = match self {
            HunkType::Code => "CODE",
            HunkType::Data => "DATA",
            HunkType::Bss => "BSS",
        };
        write!(f, "{label}")
    }
}

/// Memory the loader should allocate the hunk in.
///
/// Taken from the two top bits of the hunk size (header table or block tag).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MemoryKind
{
    /// No requirement.
    #[default]
    Any,
    /// Chip RAM (reachable by the custom chips).
    Chip,
    /// Fast RAM.
    Fast,
    /// Explicit attribute longword (both flag bits set).
    Attributes(u32),
}

impl MemoryKind
{
    /// Decode the two flag bits found at bits 30/31 of a size or tag longword.
    ///
    /// Flag value 3 has no meaning by itself: the attributes live in an extra
    /// longword, so this returns `Attributes(0)` and the caller fills it in.
    #[must_use]
    pub const fn from_flag_bits(value: u32) -> Self
    {
        match value >> 30 {
            1 => MemoryKind::Chip,
            2 => MemoryKind::Fast,
            3 => MemoryKind::Attributes(0),
            _ => MemoryKind::Any,
        }
    }
}

impl fmt::Display for MemoryKind
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self {
            MemoryKind::Any => write!(f, "any"),
            MemoryKind::Chip => write!(f, "chip"),
            MemoryKind::Fast => write!(f, "fast"),
            MemoryKind::Attributes(attrs) => write!(f, "attrs=0x{attrs:08x}"),
        }
    }
}

/// One loadable unit of a hunk binary.
///
/// Hunks are created once by the decoder and never mutated afterwards. The
/// position of a hunk in the decoded sequence is its segment id, which is what
/// the debugger uses to qualify addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk
{
    /// Position of this hunk in the decoded sequence.
    pub segments_id: usize,
    /// Code, data or BSS.
    pub hunk_type: HunkType,
    /// Memory placement requested by the binary.
    pub memory: MemoryKind,
    /// Size in bytes the loader allocates for this hunk.
    pub alloc_size: u32,
    /// Name given by a preceding `HUNK_NAME` block (object files only).
    pub name: Option<String>,
    /// Raw code bytes. Only present for code hunks.
    pub code_data: Option<Arc<[u8]>>,
    /// Symbols from `HUNK_SYMBOL` blocks, in file order.
    pub symbols: Option<Vec<Symbol>>,
    /// Line tables from `HUNK_DEBUG` blocks, one entry per recorded source file.
    pub line_debug_info: Option<SmallVec<[SourceFileLines; 1]>>,
}

impl Hunk
{
    /// Create an empty hunk of the given type.
    #[must_use]
    pub fn new(segments_id: usize, hunk_type: HunkType) -> Self
    {
        Self {
            segments_id,
            hunk_type,
            memory: MemoryKind::Any,
            alloc_size: 0,
            name: None,
            code_data: None,
            symbols: None,
            line_debug_info: None,
        }
    }

    /// Symbols of this hunk (empty when the hunk has no symbol table).
    pub fn symbols(&self) -> &[Symbol]
    {
        self.symbols.as_deref().unwrap_or(&[])
    }

    /// Source files referenced by this hunk's line tables.
    pub fn source_files(&self) -> &[SourceFileLines]
    {
        self.line_debug_info.as_deref().unwrap_or(&[])
    }

    pub(crate) fn push_symbol(&mut self, symbol: Symbol)
    {
        self.symbols.get_or_insert_with(Vec::new).push(symbol);
    }

    pub(crate) fn push_source_file(&mut self, file: SourceFileLines)
    {
        self.line_debug_info.get_or_insert_with(SmallVec::new).push(file);
    }
}

impl fmt::Display for Hunk
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(
            f,
            "#{} {} size={} mem={}",
            self.segments_id, self.hunk_type, self.alloc_size, self.memory
        )?;
        if let Some(name) = &self.name {
            write!(f, " name={name}")?;
        }
        Ok(())
    }
}
