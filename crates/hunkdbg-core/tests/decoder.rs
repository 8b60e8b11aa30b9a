//! Tests for the hunk decoder

mod common;

use common::{single_hunk_binary, HunkFileBuilder};
use hunkdbg_core::hunk::constants::{HUNK_CODE, HUNK_END, HUNK_UNIT};
use hunkdbg_core::hunk::parse_hunks;
use hunkdbg_core::types::{HunkType, MemoryKind, SourceLine};
use hunkdbg_core::HunkdbgError;

#[test]
fn test_single_hunk_symbols_in_order()
{
    let hunks = parse_hunks(&single_hunk_binary()).unwrap();
    assert_eq!(hunks.len(), 1);

    let hunk = &hunks[0];
    assert_eq!(hunk.segments_id, 0);
    assert_eq!(hunk.hunk_type, HunkType::Code);
    let names: Vec<_> = hunk.symbols().iter().map(|s| (s.name.as_str(), s.offset)).collect();
    assert_eq!(names, vec![("init", 0), ("loop", 10), ("done", 28)]);
    assert_eq!(hunk.code_data.as_deref().map(<[u8]>::len), Some(32));
}

#[test]
fn test_single_hunk_line_table()
{
    let hunks = parse_hunks(&single_hunk_binary()).unwrap();
    let files = hunks[0].source_files();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].name, "/a/b/x.s");
    assert_eq!(
        files[0].lines,
        vec![SourceLine::new(0, 5), SourceLine::new(10, 6), SourceLine::new(20, 8)]
    );
}

#[test]
fn test_code_data_bss_in_file_order()
{
    let bytes = HunkFileBuilder::new()
        .header(&[1, 2, 4])
        .code(&[0x4e, 0x75, 0, 0])
        .symbols(&[("start", 0)])
        .end()
        .data(&[1, 2, 3, 4, 5, 6, 7, 8])
        .symbols(&[("Spr", 0), ("Copper", 4)])
        .end()
        .bss(4)
        .symbols(&[("Screen", 0)])
        .end()
        .build();

    let hunks = parse_hunks(&bytes).unwrap();
    let types: Vec<_> = hunks.iter().map(|h| h.hunk_type).collect();
    assert_eq!(types, vec![HunkType::Code, HunkType::Data, HunkType::Bss]);
    assert!(hunks[0].code_data.is_some());
    assert!(hunks[1].code_data.is_none());
    assert!(hunks[2].code_data.is_none());
    assert_eq!(hunks[1].symbols()[0].name, "Spr");
    assert_eq!(hunks[2].symbols()[0].name, "Screen");
    assert_eq!(hunks[2].alloc_size, 16);
    for (index, hunk) in hunks.iter().enumerate() {
        assert_eq!(hunk.segments_id, index);
    }
}

#[test]
fn test_hunk_without_symbols_or_lines()
{
    let bytes = HunkFileBuilder::new().header(&[1]).code(&[0, 0, 0, 0]).end().build();
    let hunks = parse_hunks(&bytes).unwrap();
    assert!(hunks[0].symbols.is_none());
    assert!(hunks[0].line_debug_info.is_none());
    assert!(hunks[0].symbols().is_empty());
}

#[test]
fn test_compressed_line_table()
{
    // Deltas exercising the byte, word and longword forms.
    let bytes = HunkFileBuilder::new()
        .header(&[1])
        .code(&[0, 0, 0, 0])
        .hcln_debug(0x100, "hello.c", &[(3, 2), (1, 0x1234), (0x0001_0000, 4)])
        .end()
        .build();

    let hunks = parse_hunks(&bytes).unwrap();
    let file = &hunks[0].source_files()[0];
    assert_eq!(file.name, "hello.c");
    assert_eq!(
        file.lines,
        vec![
            SourceLine::new(0x102, 3),
            SourceLine::new(0x1336, 4),
            SourceLine::new(0x133a, 0x0001_0004),
        ]
    );
}

#[test]
fn test_line_table_base_offset_and_flag_byte()
{
    let bytes = HunkFileBuilder::new()
        .header(&[1])
        .code(&[0, 0, 0, 0])
        .line_debug(0x40, "main.s", &[(0x0100_0007, 0), (9, 4)])
        .end()
        .build();

    let hunks = parse_hunks(&bytes).unwrap();
    assert_eq!(
        hunks[0].source_files()[0].lines,
        vec![SourceLine::new(0x40, 7), SourceLine::new(0x44, 9)]
    );
}

#[test]
fn test_line_table_sorted_by_offset()
{
    let bytes = HunkFileBuilder::new()
        .header(&[1])
        .code(&[0, 0, 0, 0])
        .line_debug(0, "macro.s", &[(12, 8), (10, 0), (11, 4)])
        .end()
        .build();

    let hunks = parse_hunks(&bytes).unwrap();
    let offsets: Vec<_> = hunks[0].source_files()[0].lines.iter().map(|l| l.offset).collect();
    assert_eq!(offsets, vec![0, 4, 8]);
}

#[test]
fn test_multiple_source_files_per_hunk()
{
    let bytes = HunkFileBuilder::new()
        .header(&[1])
        .code(&[0, 0, 0, 0])
        .line_debug(0, "main.s", &[(1, 0), (2, 2)])
        .line_debug(0, "include/macros.i", &[(40, 2)])
        .end()
        .build();

    let hunks = parse_hunks(&bytes).unwrap();
    let names: Vec<_> = hunks[0].source_files().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["main.s", "include/macros.i"]);
}

#[test]
fn test_foreign_debug_block_skipped()
{
    let mut payload = vec![0, 0, 0, 0];
    payload.extend_from_slice(b"ODEF");
    payload.extend_from_slice(&[0xde, 0xad, 0xbe, 0xef]);
    let bytes = HunkFileBuilder::new()
        .header(&[1])
        .code(&[0, 0, 0, 0])
        .debug_payload(payload)
        .symbols(&[("after", 0)])
        .end()
        .build();

    let hunks = parse_hunks(&bytes).unwrap();
    assert!(hunks[0].line_debug_info.is_none());
    assert_eq!(hunks[0].symbols()[0].name, "after");
}

#[test]
fn test_relocations_skipped()
{
    let bytes = HunkFileBuilder::new()
        .header(&[2, 1])
        .code(&[0; 8])
        .reloc32(1, &[2])
        .reloc32_short(1, &[0, 4, 6])
        .symbols(&[("main", 0)])
        .end()
        .data(&[0; 4])
        .end()
        .build();

    let hunks = parse_hunks(&bytes).unwrap();
    assert_eq!(hunks.len(), 2);
    assert_eq!(hunks[0].symbols()[0].name, "main");
}

#[test]
fn test_unknown_block_skipped_by_length()
{
    let bytes = HunkFileBuilder::new()
        .header(&[1])
        .code(&[0, 0, 0, 0])
        .long(0x0000_0500)
        .long(2)
        .long(0xffff_ffff)
        .long(0xffff_ffff)
        .symbols(&[("kept", 0)])
        .end()
        .build();

    let hunks = parse_hunks(&bytes).unwrap();
    assert_eq!(hunks[0].symbols()[0].name, "kept");
}

#[test]
fn test_header_memory_flags()
{
    let bytes = HunkFileBuilder::new()
        .header(&[0x4000_0001, 0x8000_0001])
        .code(&[0, 0, 0, 0])
        .end()
        .bss(1)
        .end()
        .build();

    let hunks = parse_hunks(&bytes).unwrap();
    assert_eq!(hunks[0].memory, MemoryKind::Chip);
    assert_eq!(hunks[1].memory, MemoryKind::Fast);
    assert_eq!(hunks[0].alloc_size, 4);
}

#[test]
fn test_object_file_with_names()
{
    let bytes = HunkFileBuilder::new()
        .long(HUNK_UNIT)
        .string("startup.o")
        .long(0x3e8)
        .string("CODE")
        .long(HUNK_CODE)
        .long(1)
        .long(0x4e75_0000)
        .long(HUNK_END)
        .build();

    let hunks = parse_hunks(&bytes).unwrap();
    assert_eq!(hunks.len(), 1);
    assert_eq!(hunks[0].name.as_deref(), Some("CODE"));
    assert_eq!(hunks[0].code_data.as_deref(), Some(&[0x4e, 0x75, 0, 0][..]));
}

#[test]
fn test_missing_hunk_end_closes_hunk()
{
    let bytes = HunkFileBuilder::new().header(&[1]).code(&[0, 0, 0, 0]).build();
    let hunks = parse_hunks(&bytes).unwrap();
    assert_eq!(hunks.len(), 1);
}

#[test]
fn test_first_block_must_be_header_or_unit()
{
    let bytes = HunkFileBuilder::new().code(&[0, 0, 0, 0]).end().build();
    match parse_hunks(&bytes) {
        Err(HunkdbgError::UnknownBlock { offset, tag }) => {
            assert_eq!(offset, 0);
            assert_eq!(tag, HUNK_CODE);
        }
        other => panic!("expected UnknownBlock, got {other:?}"),
    }
}

#[test]
fn test_empty_input_is_malformed()
{
    assert!(parse_hunks(&[]).unwrap_err().is_malformed());
}

#[test]
fn test_truncated_code_block_is_malformed()
{
    let mut bytes = HunkFileBuilder::new().header(&[4]).code(&[0; 16]).end().build();
    bytes.truncate(bytes.len() - 10);
    assert!(matches!(parse_hunks(&bytes), Err(HunkdbgError::MalformedBinary { .. })));
}

#[test]
fn test_oversized_debug_block_is_malformed()
{
    let bytes = HunkFileBuilder::new()
        .header(&[1])
        .code(&[0, 0, 0, 0])
        .long(0x3f1)
        .long(0x7fff_ffff)
        .long(0)
        .build();
    assert!(matches!(parse_hunks(&bytes), Err(HunkdbgError::MalformedBinary { .. })));
}

#[test]
fn test_unknown_block_with_huge_length_is_malformed()
{
    let bytes = HunkFileBuilder::new()
        .header(&[1])
        .code(&[0, 0, 0, 0])
        .long(0x0000_0777)
        .long(0xffff_ffff)
        .build();
    assert!(parse_hunks(&bytes).unwrap_err().is_malformed());
}

#[test]
fn test_symbol_name_past_end_is_malformed()
{
    let bytes = HunkFileBuilder::new()
        .header(&[1])
        .code(&[0, 0, 0, 0])
        .long(0x3f0)
        .long(100)
        .raw(b"abcd")
        .build();
    assert!(parse_hunks(&bytes).unwrap_err().is_malformed());
}

#[test]
fn test_trailing_partial_longword_is_malformed()
{
    let bytes = HunkFileBuilder::new()
        .header(&[1])
        .code(&[0, 0, 0, 0])
        .end()
        .raw(&[0, 0])
        .build();
    assert!(parse_hunks(&bytes).unwrap_err().is_malformed());
}

#[test]
fn test_header_with_inverted_range_is_malformed()
{
    let bytes = HunkFileBuilder::new()
        .long(0x3f3)
        .long(0)
        .long(1)
        .long(3)
        .long(1)
        .build();
    assert!(parse_hunks(&bytes).unwrap_err().is_malformed());
}

#[test]
fn test_every_truncation_fails_cleanly()
{
    // Cutting a valid file anywhere must either decode or fail, never panic.
    let bytes = single_hunk_binary();
    for len in 0..bytes.len() {
        let _ = parse_hunks(&bytes[..len]);
    }
}

#[test]
fn test_trailing_bss_larger_than_file()
{
    // BSS sizes describe memory to allocate, not bytes present in the file.
    let bytes = HunkFileBuilder::new()
        .header(&[1, 2560])
        .code(&[0x4e, 0x75, 0, 0])
        .end()
        .bss(2560)
        .symbols(&[("Screen", 0)])
        .end()
        .build();

    let hunks = parse_hunks(&bytes).unwrap();
    assert_eq!(hunks.len(), 2);
    assert_eq!(hunks[1].hunk_type, HunkType::Bss);
    assert_eq!(hunks[1].alloc_size, 2560 * 4);
    assert_eq!(hunks[1].symbols()[0].name, "Screen");
}

#[test]
fn test_bss_without_header_uses_block_size()
{
    let bytes = HunkFileBuilder::new()
        .long(HUNK_UNIT)
        .string("bss.o")
        .bss(0x1000)
        .end()
        .build();

    let hunks = parse_hunks(&bytes).unwrap();
    assert_eq!(hunks[0].alloc_size, 0x4000);
}
