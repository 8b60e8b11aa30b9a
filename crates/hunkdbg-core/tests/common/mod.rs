//! Shared helpers: an in-memory hunk file writer and a probe-counting filesystem.

#![allow(dead_code)]

use std::cell::Cell;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use hunkdbg_core::hunk::constants::{
    HUNK_BSS, HUNK_CODE, HUNK_DATA, HUNK_DEBUG, HUNK_END, HUNK_HEADER, HUNK_RELOC32, HUNK_RELOC32SHORT, HUNK_SYMBOL,
};
use hunkdbg_core::source::FileSystem;

/// Writes hunk files block by block.
#[derive(Debug, Default)]
pub struct HunkFileBuilder
{
    bytes: Vec<u8>,
}

impl HunkFileBuilder
{
    pub fn new() -> Self
    {
        Self::default()
    }

    /// `HUNK_HEADER` for hunks of the given sizes (in longwords).
    pub fn header(self, sizes: &[u32]) -> Self
    {
        let mut builder = self.long(HUNK_HEADER).long(0).long(sizes.len() as u32).long(0);
        builder = builder.long(sizes.len() as u32 - 1);
        for size in sizes {
            builder = builder.long(*size);
        }
        builder
    }

    pub fn long(mut self, value: u32) -> Self
    {
        self.bytes.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn raw(mut self, bytes: &[u8]) -> Self
    {
        self.bytes.extend_from_slice(bytes);
        self
    }

    /// Length-prefixed, NUL-padded string.
    pub fn string(self, value: &str) -> Self
    {
        self.raw(&encode_string(value))
    }

    /// `HUNK_CODE` with `code` padded to a longword boundary.
    pub fn code(self, code: &[u8]) -> Self
    {
        let padded = pad_long(code.to_vec());
        self.long(HUNK_CODE).long((padded.len() / 4) as u32).raw(&padded)
    }

    pub fn data(self, data: &[u8]) -> Self
    {
        let padded = pad_long(data.to_vec());
        self.long(HUNK_DATA).long((padded.len() / 4) as u32).raw(&padded)
    }

    pub fn bss(self, longs: u32) -> Self
    {
        self.long(HUNK_BSS).long(longs)
    }

    pub fn symbols(self, symbols: &[(&str, u32)]) -> Self
    {
        let mut builder = self.long(HUNK_SYMBOL);
        for (name, offset) in symbols {
            builder = builder.string(name).long(*offset);
        }
        builder.long(0)
    }

    /// `HUNK_DEBUG` with a `LINE` table; `lines` are `(line, offset)` pairs.
    pub fn line_debug(self, base_offset: u32, name: &str, lines: &[(u32, u32)]) -> Self
    {
        let mut payload = Vec::new();
        payload.extend_from_slice(&base_offset.to_be_bytes());
        payload.extend_from_slice(b"LINE");
        payload.extend_from_slice(&encode_string(name));
        for (line, offset) in lines {
            payload.extend_from_slice(&line.to_be_bytes());
            payload.extend_from_slice(&offset.to_be_bytes());
        }
        self.debug_payload(payload)
    }

    /// `HUNK_DEBUG` with an `HCLN` table; `deltas` are `(line delta, offset delta)` pairs.
    pub fn hcln_debug(self, base_offset: u32, name: &str, deltas: &[(u32, u32)]) -> Self
    {
        let mut payload = Vec::new();
        payload.extend_from_slice(&base_offset.to_be_bytes());
        payload.extend_from_slice(b"HCLN");
        payload.extend_from_slice(&encode_string(name));
        payload.extend_from_slice(&(deltas.len() as u32).to_be_bytes());
        for (line_delta, offset_delta) in deltas {
            encode_compressed(&mut payload, *line_delta);
            encode_compressed(&mut payload, *offset_delta);
        }
        self.debug_payload(pad_long(payload))
    }

    /// `HUNK_DEBUG` with an arbitrary payload (must be longword sized).
    pub fn debug_payload(self, payload: Vec<u8>) -> Self
    {
        assert_eq!(payload.len() % 4, 0, "debug payload must be longword aligned");
        self.long(HUNK_DEBUG).long((payload.len() / 4) as u32).raw(&payload)
    }

    /// `HUNK_RELOC32` with one group of `offsets` against `target`.
    pub fn reloc32(self, target: u32, offsets: &[u32]) -> Self
    {
        let mut builder = self.long(HUNK_RELOC32).long(offsets.len() as u32).long(target);
        for offset in offsets {
            builder = builder.long(*offset);
        }
        builder.long(0)
    }

    /// `HUNK_RELOC32SHORT` with one group of `offsets` against `target`.
    pub fn reloc32_short(self, target: u16, offsets: &[u16]) -> Self
    {
        let mut words = vec![offsets.len() as u16, target];
        words.extend_from_slice(offsets);
        words.push(0);
        let mut bytes: Vec<u8> = words.iter().flat_map(|word| word.to_be_bytes()).collect();
        bytes = pad_long(bytes);
        self.long(HUNK_RELOC32SHORT).raw(&bytes)
    }

    pub fn end(self) -> Self
    {
        self.long(HUNK_END)
    }

    pub fn build(self) -> Vec<u8>
    {
        self.bytes
    }
}

fn pad_long(mut bytes: Vec<u8>) -> Vec<u8>
{
    while bytes.len() % 4 != 0 {
        bytes.push(0);
    }
    bytes
}

fn encode_string(value: &str) -> Vec<u8>
{
    let padded = pad_long(value.as_bytes().to_vec());
    let mut bytes = ((padded.len() / 4) as u32).to_be_bytes().to_vec();
    bytes.extend_from_slice(&padded);
    bytes
}

fn encode_compressed(out: &mut Vec<u8>, value: u32)
{
    if (1..=0xFF).contains(&value) {
        out.push(value as u8);
    } else if (1..=0xFFFF).contains(&value) {
        out.push(0);
        out.extend_from_slice(&(value as u16).to_be_bytes());
    } else {
        out.push(0);
        out.extend_from_slice(&0u16.to_be_bytes());
        out.extend_from_slice(&value.to_be_bytes());
    }
}

/// In-memory filesystem counting every existence probe and read.
#[derive(Debug, Default)]
pub struct MemoryFs
{
    files: HashMap<PathBuf, Vec<u8>>,
    unreadable: Vec<PathBuf>,
    probes: Cell<usize>,
    reads: Cell<usize>,
}

impl MemoryFs
{
    pub fn new() -> Self
    {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self
    {
        self.files.insert(path.into(), contents.into());
        self
    }

    /// A path that exists but fails to read.
    pub fn with_unreadable(mut self, path: impl Into<PathBuf>) -> Self
    {
        self.unreadable.push(path.into());
        self
    }

    pub fn probes(&self) -> usize
    {
        self.probes.get()
    }

    pub fn reads(&self) -> usize
    {
        self.reads.get()
    }
}

impl FileSystem for MemoryFs
{
    fn exists(&self, path: &Path) -> bool
    {
        self.probes.set(self.probes.get() + 1);
        self.files.contains_key(path) || self.unreadable.iter().any(|p| p == path)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>>
    {
        self.reads.set(self.reads.get() + 1);
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.display().to_string()))
    }
}

/// A single code hunk with three symbols and the line table
/// `[(offset 0, line 5), (offset 10, line 6), (offset 20, line 8)]` for `/a/b/x.s`.
pub fn single_hunk_binary() -> Vec<u8>
{
    HunkFileBuilder::new()
        .header(&[8])
        .code(&[0x4e, 0x71].repeat(16))
        .symbols(&[("init", 0), ("loop", 10), ("done", 28)])
        .line_debug(0, "/a/b/x.s", &[(5, 0), (6, 10), (8, 20)])
        .end()
        .build()
}

/// Source text for `/a/b/x.s`: line N reads `line N`.
pub fn numbered_source(lines: usize) -> String
{
    (1..=lines).map(|n| format!("line {n}")).collect::<Vec<_>>().join("\n")
}
