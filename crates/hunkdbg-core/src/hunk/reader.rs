//! Big-endian cursor over a hunk file buffer.
//!
//! Every read is bounds-checked and reports a [`HunkdbgError::MalformedBinary`]
//! carrying the absolute file offset, so decoding a truncated file fails at the
//! first short read instead of panicking.

use crate::error::{HunkdbgError, Result};

/// Cursor over a borrowed byte buffer.
///
/// `base` is the absolute file offset of `data[0]`; sub-readers created with
/// [`BinaryReader::sub_reader`] keep reporting file offsets in their errors.
#[derive(Debug, Clone)]
pub struct BinaryReader<'data>
{
    data: &'data [u8],
    pos: usize,
    base: usize,
}

impl<'data> BinaryReader<'data>
{
    #[must_use]
    pub fn new(data: &'data [u8]) -> Self
    {
        Self { data, pos: 0, base: 0 }
    }

    /// Absolute file offset of the cursor.
    #[must_use]
    pub fn offset(&self) -> usize
    {
        self.base + self.pos
    }

    /// Bytes left after the cursor.
    #[must_use]
    pub fn remaining(&self) -> usize
    {
        self.data.len() - self.pos
    }

    #[must_use]
    pub fn is_empty(&self) -> bool
    {
        self.remaining() == 0
    }

    /// Take `len` bytes and advance past them.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'data [u8]>
    {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| {
                HunkdbgError::malformed(
                    self.offset(),
                    format!("wanted {len} bytes, only {} left", self.remaining()),
                )
            })?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    /// Advance by `len` bytes without looking at them.
    pub fn skip(&mut self, len: usize) -> Result<()>
    {
        self.read_bytes(len).map(|_| ())
    }

    /// Advance by `count` longwords.
    pub fn skip_longs(&mut self, count: u32) -> Result<()>
    {
        let len = longs_to_bytes(count).ok_or_else(|| {
            HunkdbgError::malformed(self.offset(), format!("longword count {count} overflows"))
        })?;
        self.skip(len)
    }

    pub fn read_u8(&mut self) -> Result<u8>
    {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16>
    {
        let bytes = self.read_bytes(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    pub fn read_u32(&mut self) -> Result<u32>
    {
        let bytes = self.read_bytes(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read a string stored as `longs` padded longwords.
    ///
    /// Trailing NUL padding is trimmed. Names from foreign toolchains are not
    /// always valid UTF-8, so invalid sequences are replaced rather than
    /// rejected.
    pub fn read_padded_string(&mut self, longs: u32) -> Result<String>
    {
        let len = longs_to_bytes(longs).ok_or_else(|| {
            HunkdbgError::malformed(self.offset(), format!("string length {longs} longwords overflows"))
        })?;
        let bytes = self.read_bytes(len)?;
        let end = bytes.iter().rposition(|b| *b != 0).map_or(0, |pos| pos + 1);
        Ok(String::from_utf8_lossy(&bytes[..end]).into_owned())
    }

    /// Read a longword length prefix followed by the padded string.
    pub fn read_string(&mut self) -> Result<String>
    {
        let longs = self.read_u32()?;
        self.read_padded_string(longs)
    }

    /// Skip to the next longword boundary of the file.
    pub fn align_long(&mut self) -> Result<()>
    {
        let misalignment = self.offset() % 4;
        if misalignment == 0 {
            Ok(())
        } else {
            self.skip(4 - misalignment)
        }
    }

    /// Split off the next `len` bytes as an independent reader and advance past them.
    ///
    /// Decoding a block through a sub-reader guarantees the outer cursor moves
    /// by exactly the declared block length, whatever the block contains.
    pub fn sub_reader(&mut self, len: usize) -> Result<BinaryReader<'data>>
    {
        let base = self.offset();
        let data = self.read_bytes(len)?;
        Ok(BinaryReader { data, pos: 0, base })
    }
}

/// Convert a longword count into a byte count.
#[must_use]
pub fn longs_to_bytes(count: u32) -> Option<usize>
{
    (count as usize).checked_mul(4)
}
