//! # Hunk Decoder
//!
//! Turns the block stream of a hunk file into [`Hunk`] records.
//!
//! A file is a sequence of big-endian longword-tagged blocks. `HUNK_CODE`,
//! `HUNK_DATA` and `HUNK_BSS` open a loadable unit; the blocks that follow
//! (`HUNK_SYMBOL`, `HUNK_DEBUG`, relocations, ...) belong to that unit until
//! `HUNK_END`. Each unit becomes one [`Hunk`] whose index in the output is its
//! segment id.
//!
//! ## Termination
//!
//! Every loop iteration consumes at least the 4-byte tag, and every block is
//! either fully decoded or skipped by its declared length through a
//! bounds-checked reader. A corrupt file therefore ends in an error at the
//! first inconsistent length, never in a loop or an out-of-bounds read.

use std::sync::Arc;

use tracing::{debug, trace, warn};

use super::constants::{
    block_name, EXT_COMMON, EXT_REF_FIRST, EXT_RELCOMMON, HUNKF_ADVISORY, HUNK_ABSRELOC16, HUNK_BREAK, HUNK_BSS,
    HUNK_CODE, HUNK_DATA, HUNK_DEBUG, HUNK_DREL16, HUNK_DREL32, HUNK_DREL8, HUNK_END, HUNK_EXT, HUNK_HEADER,
    HUNK_INDEX, HUNK_LIB, HUNK_NAME, HUNK_OVERLAY, HUNK_RELOC16, HUNK_RELOC32, HUNK_RELOC32SHORT, HUNK_RELOC8,
    HUNK_RELRELOC32, HUNK_SYMBOL, HUNK_TYPE_MASK, HUNK_UNIT, SYMBOL_LENGTH_MASK,
};
use super::line_debug::parse_debug_block;
use super::reader::{longs_to_bytes, BinaryReader};
use crate::error::{HunkdbgError, Result};
use crate::types::{Hunk, HunkType, MemoryKind, Symbol};

/// Size and placement of one hunk as declared by `HUNK_HEADER`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HeaderEntry
{
    size: u32,
    memory: MemoryKind,
}

/// What kind of file the first block announced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileKind
{
    /// Executable starting with `HUNK_HEADER`.
    Load,
    /// Object file starting with `HUNK_UNIT`.
    Object,
}

/// Decode a complete hunk file held in memory.
///
/// ## Errors
///
/// - [`HunkdbgError::UnknownBlock`] if the first block is neither
///   `HUNK_HEADER` nor `HUNK_UNIT`.
/// - [`HunkdbgError::MalformedBinary`] if any block runs past the end of the
///   buffer or is internally inconsistent.
pub fn parse_hunks(data: &[u8]) -> Result<Vec<Hunk>>
{
    HunkParser::new(data).parse()
}

/// Stateful decoder over one file buffer.
pub struct HunkParser<'data>
{
    reader: BinaryReader<'data>,
    kind: FileKind,
    header: Vec<HeaderEntry>,
    hunks: Vec<Hunk>,
    current: Option<Hunk>,
    pending_name: Option<String>,
}

impl<'data> HunkParser<'data>
{
    #[must_use]
    pub fn new(data: &'data [u8]) -> Self
    {
        Self {
            reader: BinaryReader::new(data),
            kind: FileKind::Load,
            header: Vec::new(),
            hunks: Vec::new(),
            current: None,
            pending_name: None,
        }
    }

    /// Decode every block and return the hunks in file order.
    pub fn parse(mut self) -> Result<Vec<Hunk>>
    {
        self.parse_first_block()?;

        while !self.reader.is_empty() {
            let offset = self.reader.offset();
            let raw = self.reader.read_u32()?;
            let tag = raw & HUNK_TYPE_MASK & !HUNKF_ADVISORY;
            trace!(offset, tag = block_name(tag), "block");
            self.parse_block(offset, raw, tag)?;
        }

        if let Some(hunk) = self.current.take() {
            warn!(segment = hunk.segments_id, "file ends without HUNK_END");
            self.hunks.push(hunk);
        }

        if self.kind == FileKind::Load && self.header.len() != self.hunks.len() {
            warn!(
                declared = self.header.len(),
                decoded = self.hunks.len(),
                "hunk count differs from HUNK_HEADER table"
            );
        }

        debug!(hunks = self.hunks.len(), bytes = self.reader.offset(), "decoded hunk file");
        Ok(self.hunks)
    }

    fn parse_first_block(&mut self) -> Result<()>
    {
        let offset = self.reader.offset();
        let tag = self.reader.read_u32()? & HUNK_TYPE_MASK;
        match tag {
            HUNK_HEADER => {
                self.kind = FileKind::Load;
                self.parse_header()
            }
            HUNK_UNIT => {
                self.kind = FileKind::Object;
                let unit = self.reader.read_string()?;
                debug!(unit = %unit, "object file unit");
                Ok(())
            }
            _ => Err(HunkdbgError::UnknownBlock { offset, tag }),
        }
    }

    fn parse_block(&mut self, offset: usize, raw: u32, tag: u32) -> Result<()>
    {
        match tag {
            HUNK_CODE | HUNK_DATA | HUNK_BSS => {
                if let Some(open) = self.current.take() {
                    warn!(segment = open.segments_id, "hunk not closed by HUNK_END");
                    self.hunks.push(open);
                }
                let hunk = self.parse_segment(raw, tag)?;
                self.current = Some(hunk);
            }
            HUNK_END | HUNK_BREAK => {
                if let Some(hunk) = self.current.take() {
                    self.hunks.push(hunk);
                } else {
                    trace!(offset, "{} outside of a hunk", block_name(tag));
                }
            }
            HUNK_SYMBOL => {
                let reader = &mut self.reader;
                let hunk = open_hunk(&mut self.current, offset, tag)?;
                parse_symbols(reader, hunk)?;
            }
            HUNK_DEBUG => {
                let longs = self.reader.read_u32()?;
                let len = block_len(&self.reader, longs)?;
                let mut block = self.reader.sub_reader(len)?;
                let hunk = open_hunk(&mut self.current, offset, tag)?;
                if let Some(file) = parse_debug_block(&mut block)? {
                    hunk.push_source_file(file);
                }
            }
            HUNK_RELOC32 | HUNK_RELOC16 | HUNK_RELOC8 | HUNK_DREL16 | HUNK_DREL8 | HUNK_RELRELOC32
            | HUNK_ABSRELOC16 => {
                let count = skip_long_relocs(&mut self.reader)?;
                trace!(offset, count, "skipped {}", block_name(tag));
            }
            HUNK_DREL32 if self.kind == FileKind::Object => {
                let count = skip_long_relocs(&mut self.reader)?;
                trace!(offset, count, "skipped HUNK_DREL32");
            }
            HUNK_DREL32 | HUNK_RELOC32SHORT => {
                let count = skip_short_relocs(&mut self.reader)?;
                trace!(offset, count, "skipped short {}", block_name(tag));
            }
            HUNK_EXT => skip_ext(&mut self.reader)?,
            HUNK_NAME => {
                self.pending_name = Some(self.reader.read_string()?);
            }
            HUNK_UNIT => {
                if let Some(open) = self.current.take() {
                    self.hunks.push(open);
                }
                let unit = self.reader.read_string()?;
                debug!(unit = %unit, "object file unit");
            }
            HUNK_OVERLAY => {
                // The overlay table size excludes its own first longword.
                let longs = self.reader.read_u32()?;
                let longs = longs
                    .checked_add(1)
                    .ok_or_else(|| HunkdbgError::malformed(offset, "overlay table size overflows"))?;
                self.reader.skip_longs(longs)?;
            }
            HUNK_LIB => {
                // The library body is a plain sequence of hunk blocks.
                let longs = self.reader.read_u32()?;
                trace!(offset, longs, "entering HUNK_LIB");
            }
            HUNK_HEADER => {
                return Err(HunkdbgError::malformed(offset, "HUNK_HEADER after the first block"));
            }
            HUNK_INDEX => {
                let longs = self.reader.read_u32()?;
                self.reader.skip_longs(longs)?;
            }
            _ => {
                let longs = self.reader.read_u32()?;
                if raw & HUNKF_ADVISORY == 0 {
                    warn!(offset, tag, longs, "skipping unknown block");
                }
                self.reader.skip_longs(longs)?;
            }
        }
        Ok(())
    }

    fn parse_header(&mut self) -> Result<()>
    {
        // Resident library names, terminated by a zero length.
        loop {
            let longs = self.reader.read_u32()?;
            if longs == 0 {
                break;
            }
            self.reader.skip_longs(longs)?;
        }

        let table_size = self.reader.read_u32()?;
        let first = self.reader.read_u32()?;
        let last = self.reader.read_u32()?;
        if last < first {
            return Err(HunkdbgError::malformed(
                self.reader.offset(),
                format!("HUNK_HEADER last hunk {last} before first hunk {first}"),
            ));
        }
        let count = (last - first) as usize + 1;
        if count > self.reader.remaining() / 4 {
            return Err(HunkdbgError::malformed(
                self.reader.offset(),
                format!("HUNK_HEADER declares {count} hunks, buffer too short"),
            ));
        }

        self.header.reserve(count);
        for _ in 0..count {
            let raw = self.reader.read_u32()?;
            let memory = self.read_memory_kind(raw)?;
            let size = (raw & HUNK_TYPE_MASK)
                .checked_mul(4)
                .ok_or_else(|| HunkdbgError::malformed(self.reader.offset(), "hunk size overflows 32 bits"))?;
            self.header.push(HeaderEntry { size, memory });
        }

        debug!(table_size, first, last, "HUNK_HEADER");
        Ok(())
    }

    fn parse_segment(&mut self, raw_tag: u32, tag: u32) -> Result<Hunk>
    {
        let segments_id = self.hunks.len();
        let hunk_type = match tag {
            HUNK_CODE => HunkType::Code,
            HUNK_DATA => HunkType::Data,
            _ => HunkType::Bss,
        };
        let tag_memory = self.read_memory_kind(raw_tag)?;

        let longs = self.reader.read_u32()? & HUNK_TYPE_MASK;
        // BSS has no payload in the file, so only code and data are bounded by it.
        let len = match hunk_type {
            HunkType::Bss => longs_to_bytes(longs)
                .ok_or_else(|| HunkdbgError::malformed(self.reader.offset(), "BSS size overflows"))?,
            HunkType::Code | HunkType::Data => block_len(&self.reader, longs)?,
        };

        let mut hunk = Hunk::new(segments_id, hunk_type);
        hunk.name = self.pending_name.take();
        // Masked longword counts always fit in 32 bits once scaled to bytes.
        let block_size = len as u32;
        match self.header.get(segments_id) {
            Some(entry) => {
                hunk.memory = entry.memory;
                hunk.alloc_size = entry.size.max(block_size);
            }
            None => {
                hunk.memory = tag_memory;
                hunk.alloc_size = block_size;
            }
        }

        match hunk_type {
            HunkType::Code => {
                hunk.code_data = Some(Arc::from(self.reader.read_bytes(len)?));
            }
            HunkType::Data => self.reader.skip(len)?,
            HunkType::Bss => {}
        }

        trace!(%hunk, "opened hunk");
        Ok(hunk)
    }

    fn read_memory_kind(&mut self, raw: u32) -> Result<MemoryKind>
    {
        Ok(match MemoryKind::from_flag_bits(raw) {
            MemoryKind::Attributes(_) => MemoryKind::Attributes(self.reader.read_u32()?),
            other => other,
        })
    }
}

fn open_hunk(current: &mut Option<Hunk>, offset: usize, tag: u32) -> Result<&mut Hunk>
{
    current
        .as_mut()
        .ok_or_else(|| HunkdbgError::malformed(offset, format!("{} outside of a hunk", block_name(tag))))
}

fn block_len(reader: &BinaryReader<'_>, longs: u32) -> Result<usize>
{
    longs_to_bytes(longs)
        .filter(|len| *len <= reader.remaining())
        .ok_or_else(|| {
            HunkdbgError::malformed(
                reader.offset(),
                format!(
                    "block declares {longs} longwords, only {} bytes left",
                    reader.remaining()
                ),
            )
        })
}

fn parse_symbols(reader: &mut BinaryReader<'_>, hunk: &mut Hunk) -> Result<()>
{
    loop {
        let longs = reader.read_u32()? & SYMBOL_LENGTH_MASK;
        if longs == 0 {
            break;
        }
        let name = reader.read_padded_string(longs)?;
        let offset = reader.read_u32()?;
        hunk.push_symbol(Symbol::new(name, offset));
    }
    Ok(())
}

fn skip_long_relocs(reader: &mut BinaryReader<'_>) -> Result<usize>
{
    let mut total = 0usize;
    loop {
        let count = reader.read_u32()?;
        if count == 0 {
            break;
        }
        let _target = reader.read_u32()?;
        reader.skip_longs(count)?;
        total = total.saturating_add(count as usize);
    }
    Ok(total)
}

fn skip_short_relocs(reader: &mut BinaryReader<'_>) -> Result<usize>
{
    let mut total = 0usize;
    loop {
        let count = reader.read_u16()?;
        if count == 0 {
            break;
        }
        let _target = reader.read_u16()?;
        reader.skip(usize::from(count) * 2)?;
        total += usize::from(count);
    }
    reader.align_long()?;
    Ok(total)
}

fn skip_ext(reader: &mut BinaryReader<'_>) -> Result<()>
{
    loop {
        let word = reader.read_u32()?;
        if word == 0 {
            break;
        }
        let ext_type = (word >> 24) as u8;
        reader.skip_longs(word & SYMBOL_LENGTH_MASK)?;
        if ext_type < EXT_REF_FIRST {
            // Definition: a single value longword.
            reader.skip(4)?;
        } else {
            if ext_type == EXT_COMMON || ext_type == EXT_RELCOMMON {
                reader.skip(4)?;
            }
            let refs = reader.read_u32()?;
            reader.skip_longs(refs)?;
        }
    }
    Ok(())
}
