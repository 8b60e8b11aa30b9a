//! # Hunk Format Constants
//!
//! Block type tags and flag masks of the hunk file format.
//!
//! ## Organization
//!
//! Constants are organized by category:
//! - Block type tags
//! - Flag bits and masks
//! - Line-debug discriminants

// ============================================================================
// Block Type Tags
// ============================================================================

/// Start of a compilation unit in an object file.
pub const HUNK_UNIT: u32 = 0x3E7;
/// Name of the following hunk (object files).
pub const HUNK_NAME: u32 = 0x3E8;
/// Code hunk: size in longwords followed by the code payload.
pub const HUNK_CODE: u32 = 0x3E9;
/// Initialized data hunk: size in longwords followed by the payload.
pub const HUNK_DATA: u32 = 0x3EA;
/// Uninitialized data hunk: size in longwords, no payload.
pub const HUNK_BSS: u32 = 0x3EB;
/// 32-bit absolute relocations (long format).
pub const HUNK_RELOC32: u32 = 0x3EC;
/// 16-bit PC-relative relocations (long format).
pub const HUNK_RELOC16: u32 = 0x3ED;
/// 8-bit PC-relative relocations (long format).
pub const HUNK_RELOC8: u32 = 0x3EE;
/// External symbol definitions and references (object files).
pub const HUNK_EXT: u32 = 0x3EF;
/// Symbol table: name/offset pairs terminated by a zero-length name.
pub const HUNK_SYMBOL: u32 = 0x3F0;
/// Debug data: longword count followed by a tool-specific payload.
pub const HUNK_DEBUG: u32 = 0x3F1;
/// End of the current hunk.
pub const HUNK_END: u32 = 0x3F2;
/// Load file header with the hunk size table.
pub const HUNK_HEADER: u32 = 0x3F3;
/// Overlay table.
pub const HUNK_OVERLAY: u32 = 0x3F5;
/// End of an overlay node.
pub const HUNK_BREAK: u32 = 0x3F6;
/// 32-bit data-relative relocations.
///
/// Load files written by V37+ linkers reuse this tag for the short
/// relocation format.
pub const HUNK_DREL32: u32 = 0x3F7;
/// 16-bit data-relative relocations.
pub const HUNK_DREL16: u32 = 0x3F8;
/// 8-bit data-relative relocations.
pub const HUNK_DREL8: u32 = 0x3F9;
/// Library file hunk.
pub const HUNK_LIB: u32 = 0x3FA;
/// Library index.
pub const HUNK_INDEX: u32 = 0x3FB;
/// 32-bit absolute relocations, 16-bit word format.
pub const HUNK_RELOC32SHORT: u32 = 0x3FC;
/// 32-bit PC-relative relocations.
pub const HUNK_RELRELOC32: u32 = 0x3FD;
/// 16-bit absolute relocations.
pub const HUNK_ABSRELOC16: u32 = 0x3FE;

// ============================================================================
// Flag Bits and Masks
// ============================================================================

/// Mask removing the memory flags stored in the two top bits of tags and sizes.
pub const HUNK_TYPE_MASK: u32 = 0x3FFF_FFFF;

/// Advisory flag on a block tag: loaders may skip unknown advisory blocks.
pub const HUNKF_ADVISORY: u32 = 1 << 29;

/// Mask for the name length in a `HUNK_SYMBOL`/`HUNK_EXT` entry (low 24 bits).
pub const SYMBOL_LENGTH_MASK: u32 = 0x00FF_FFFF;

/// Mask for a line number in a `LINE` debug table (low 24 bits).
///
/// SAS/C stores flags in the top byte.
pub const LINE_NUMBER_MASK: u32 = 0x00FF_FFFF;

// ============================================================================
// Line-Debug Discriminants
// ============================================================================

/// `"LINE"`: flat list of (line, offset) longword pairs.
pub const DEBUG_LINE: u32 = u32::from_be_bytes(*b"LINE");

/// `"HCLN"`: entry count followed by compressed line/offset deltas.
pub const DEBUG_HCLN: u32 = u32::from_be_bytes(*b"HCLN");

// ============================================================================
// HUNK_EXT Entry Types
// ============================================================================

/// Entry types below this value are definitions carrying a single value.
pub const EXT_REF_FIRST: u8 = 0x80;
/// Common block: name, size longword, then a reference list.
pub const EXT_COMMON: u8 = 130;
/// Relative common block, same layout as `EXT_COMMON`.
pub const EXT_RELCOMMON: u8 = 137;

/// Human-readable name for a block tag, for logs.
#[must_use]
pub fn block_name(tag: u32) -> &'static str
{
    match tag {
        HUNK_UNIT => "HUNK_UNIT",
        HUNK_NAME => "HUNK_NAME",
        HUNK_CODE => "HUNK_CODE",
        HUNK_DATA => "HUNK_DATA",
        HUNK_BSS => "HUNK_BSS",
        HUNK_RELOC32 => "HUNK_RELOC32",
        HUNK_RELOC16 => "HUNK_RELOC16",
        HUNK_RELOC8 => "HUNK_RELOC8",
        HUNK_EXT => "HUNK_EXT",
        HUNK_SYMBOL => "HUNK_SYMBOL",
        HUNK_DEBUG => "HUNK_DEBUG",
        HUNK_END => "HUNK_END",
        HUNK_HEADER => "HUNK_HEADER",
        HUNK_OVERLAY => "HUNK_OVERLAY",
        HUNK_BREAK => "HUNK_BREAK",
        HUNK_DREL32 => "HUNK_DREL32",
        HUNK_DREL16 => "HUNK_DREL16",
        HUNK_DREL8 => "HUNK_DREL8",
        HUNK_LIB => "HUNK_LIB",
        HUNK_INDEX => "HUNK_INDEX",
        HUNK_RELOC32SHORT => "HUNK_RELOC32SHORT",
        HUNK_RELRELOC32 => "HUNK_RELRELOC32",
        HUNK_ABSRELOC16 => "HUNK_ABSRELOC16",
        _ => "unknown",
    }
}
