//! Line-debug payloads of `HUNK_DEBUG` blocks.
//!
//! Two layouts are understood, selected by the longword after the base offset:
//!
//! - `LINE` (vasm, SAS/C, GNU as): source name, then `(line, offset)`
//!   longword pairs until the end of the block.
//! - `HCLN` (Devpac, vasm `-linedebug` in compressed mode): source name,
//!   an entry count, then per entry a line delta and an offset delta. Each
//!   delta is a byte; a zero byte escapes to a word, a zero word escapes to a
//!   longword.
//!
//! Both produce a [`SourceFileLines`] with absolute hunk offsets, so nothing
//! past this module knows which toolchain wrote the table.

use tracing::{trace, warn};

use super::constants::{DEBUG_HCLN, DEBUG_LINE, LINE_NUMBER_MASK};
use super::reader::BinaryReader;
use crate::error::{HunkdbgError, Result};
use crate::types::{SourceFileLines, SourceLine};

/// Layout of a line-debug payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineEncoding
{
    Line,
    Hcln,
}

impl LineEncoding
{
    fn from_tag(tag: u32) -> Option<Self>
    {
        match tag {
            DEBUG_LINE => Some(Self::Line),
            DEBUG_HCLN => Some(Self::Hcln),
            _ => None,
        }
    }
}

/// Decode one `HUNK_DEBUG` payload.
///
/// Returns `Ok(None)` for payloads that are not line tables (stabs, tool
/// specific data, tables too short to carry a header). The reader must be
/// bounded to the block so a broken table cannot read into the next block.
pub fn parse_debug_block(reader: &mut BinaryReader<'_>) -> Result<Option<SourceFileLines>>
{
    if reader.remaining() < 8 {
        trace!(len = reader.remaining(), "debug block too short for a line table");
        return Ok(None);
    }

    let base_offset = reader.read_u32()?;
    let tag = reader.read_u32()?;
    let Some(encoding) = LineEncoding::from_tag(tag) else {
        trace!("skipping debug block with tag 0x{tag:08x}");
        return Ok(None);
    };

    let name = reader.read_string()?;
    let lines = match encoding {
        LineEncoding::Line => parse_line_pairs(reader, base_offset)?,
        LineEncoding::Hcln => parse_compressed_lines(reader, base_offset)?,
    };

    trace!(file = %name, entries = lines.len(), ?encoding, "decoded line table");
    Ok(Some(SourceFileLines::new(name, lines)))
}

fn parse_line_pairs(reader: &mut BinaryReader<'_>, base_offset: u32) -> Result<Vec<SourceLine>>
{
    let count = reader.remaining() / 8;
    let mut lines = Vec::with_capacity(count);
    for _ in 0..count {
        let line = reader.read_u32()? & LINE_NUMBER_MASK;
        let offset = reader.read_u32()?;
        lines.push(SourceLine::new(add_offset(reader, base_offset, offset)?, line));
    }
    if !reader.is_empty() {
        warn!(
            extra = reader.remaining(),
            offset = reader.offset(),
            "ignoring trailing bytes after LINE table"
        );
    }
    Ok(lines)
}

fn parse_compressed_lines(reader: &mut BinaryReader<'_>, base_offset: u32) -> Result<Vec<SourceLine>>
{
    let count = reader.read_u32()?;
    // Each entry takes at least two bytes, which bounds the allocation.
    if count as usize > reader.remaining() / 2 {
        return Err(HunkdbgError::malformed(
            reader.offset(),
            format!("HCLN table claims {count} entries in {} bytes", reader.remaining()),
        ));
    }

    let mut lines = Vec::with_capacity(count as usize);
    let mut line: u32 = 0;
    let mut offset: u32 = 0;
    for _ in 0..count {
        let line_delta = read_compressed(reader)?;
        let offset_delta = read_compressed(reader)?;
        line = line
            .checked_add(line_delta)
            .ok_or_else(|| HunkdbgError::malformed(reader.offset(), "HCLN line number overflows"))?;
        offset = add_offset(reader, offset, offset_delta)?;
        lines.push(SourceLine::new(add_offset(reader, base_offset, offset)?, line));
    }
    Ok(lines)
}

fn read_compressed(reader: &mut BinaryReader<'_>) -> Result<u32>
{
    let value = u32::from(reader.read_u8()?);
    if value != 0 {
        return Ok(value);
    }
    let value = u32::from(reader.read_u16()?);
    if value != 0 {
        return Ok(value);
    }
    reader.read_u32()
}

fn add_offset(reader: &BinaryReader<'_>, base: u32, delta: u32) -> Result<u32>
{
    base.checked_add(delta)
        .ok_or_else(|| HunkdbgError::malformed(reader.offset(), "line table offset overflows 32 bits"))
}
