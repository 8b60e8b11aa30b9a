//! # Debug Info
//!
//! Source-level queries over one loaded hunk binary.
//!
//! A [`DebugInfo`] owns the decoded hunks of exactly one binary plus two lazy
//! caches: recorded source name to resolved path, and resolved path to file
//! text. Loading another binary resets both, so results from a previous load
//! (paths, segment ids) must not be reused afterwards.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use hunkdbg_core::source::PathConfig;
//! use hunkdbg_core::DebugInfo;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>>
//! {
//!     let config = PathConfig::new().with_workspace_root("/home/me/demo");
//!     let mut info = DebugInfo::new(config);
//!
//!     if !info.load_info("/home/me/demo/uae/dh0/gencop".as_ref())? {
//!         println!("binary not built yet");
//!         return Ok(());
//!     }
//!
//!     // Address to source
//!     if let Some(location) = info.resolve_file_line(0, 0x24) {
//!         println!("{}:{}", location.file, location.line);
//!     }
//!
//!     // Source to address
//!     if let Some(address) = info.address_seg("gencop.s", 32) {
//!         println!("breakpoint at {address}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Thread Safety
//!
//! The caches use `RefCell`, so a `DebugInfo` is not `Sync`. Hosts issue
//! queries one at a time from the thread that owns it.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::hunk::parse_hunks;
use crate::source::{
    normalize, same_source_file_names, FileSystem, PathConfig, PathResolver, SourceTextCache, StdFileSystem,
};
use crate::types::{Hunk, HunkType, SegmentOffset, SegmentSymbol, SourceFileLines, SourceLocation};

/// Decoded debug information of one binary plus its lookup caches.
pub struct DebugInfo
{
    hunks: Vec<Hunk>,
    fs: Arc<dyn FileSystem>,
    paths: PathResolver,
    sources: SourceTextCache,
}

impl DebugInfo
{
    /// Create an empty instance using the real filesystem.
    #[must_use]
    pub fn new(config: PathConfig) -> Self
    {
        Self::with_file_system(config, Arc::new(StdFileSystem))
    }

    /// Create an empty instance probing through `fs`.
    pub fn with_file_system(config: PathConfig, fs: Arc<dyn FileSystem>) -> Self
    {
        Self {
            hunks: Vec::new(),
            paths: PathResolver::new(config, fs.clone()),
            sources: SourceTextCache::new(fs.clone()),
            fs,
        }
    }

    /// Wrap already decoded hunks.
    pub fn from_hunks(hunks: Vec<Hunk>, config: PathConfig, fs: Arc<dyn FileSystem>) -> Self
    {
        let mut info = Self::with_file_system(config, fs);
        info.hunks = hunks;
        info
    }

    /// Decode `bytes` and wrap the result.
    ///
    /// ## Errors
    ///
    /// Decode errors from [`parse_hunks`].
    pub fn from_bytes(bytes: &[u8], config: PathConfig, fs: Arc<dyn FileSystem>) -> Result<Self>
    {
        Ok(Self::from_hunks(parse_hunks(bytes)?, config, fs))
    }

    /// Load the binary at `path`, replacing any previously loaded one.
    ///
    /// Returns `Ok(false)` without touching the current state if the file does
    /// not exist. On success both caches start empty again.
    ///
    /// ## Errors
    ///
    /// - [`HunkdbgError::Io`](crate::error::HunkdbgError::Io) if the file exists
    ///   but cannot be read
    /// - a decode error if the file is not a valid hunk binary; the previously
    ///   loaded state is kept in that case
    pub fn load_info(&mut self, path: &Path) -> Result<bool>
    {
        if !self.fs.exists(path) {
            debug!(path = %path.display(), "binary not found");
            return Ok(false);
        }

        let bytes = self.fs.read(path)?;
        let hunks = parse_hunks(&bytes)?;
        info!(path = %path.display(), hunks = hunks.len(), "loaded debug info");

        let config = self.paths.config().clone();
        *self = Self::from_hunks(hunks, config, self.fs.clone());
        Ok(true)
    }

    /// The decoded hunks; the index of each is its segment id.
    pub fn hunks(&self) -> &[Hunk]
    {
        &self.hunks
    }

    /// Code bytes of every code hunk, in hunk order.
    pub fn code_data(&self) -> Vec<&[u8]>
    {
        self.hunks
            .iter()
            .filter(|hunk| hunk.hunk_type == HunkType::Code)
            .filter_map(|hunk| hunk.code_data.as_deref())
            .collect()
    }

    /// Symbols paired with their segment id.
    ///
    /// With a `filename`, only hunks whose line tables reference that file
    /// contribute, but they contribute all of their symbols: attribution is
    /// per hunk, not per line.
    pub fn symbols(&self, filename: Option<&str>) -> Vec<SegmentSymbol<'_>>
    {
        let wanted = filename.map(|name| self.paths.resolve(name));
        let mut symbols = Vec::new();
        for hunk in &self.hunks {
            let Some(hunk_symbols) = &hunk.symbols else {
                continue;
            };
            if let Some(wanted) = &wanted {
                if !hunk.source_files().iter().any(|file| self.is_same_file(file, wanted)) {
                    continue;
                }
            }
            symbols.extend(hunk_symbols.iter().map(|symbol| SegmentSymbol {
                symbol,
                segment_id: hunk.segments_id,
            }));
        }
        symbols
    }

    /// Source location of `offset` in segment `segment_id`.
    ///
    /// The source files of the segment are tried in order; the first whose
    /// line table covers `offset` wins. The line text is attached when the file
    /// can be read; an unreadable file only drops the text.
    pub fn resolve_file_line(&self, segment_id: usize, offset: u32) -> Option<SourceLocation>
    {
        let hunk = self.hunks.get(segment_id)?;
        hunk.source_files().iter().find_map(|file| {
            let line = file.find_line(offset)?;
            let resolved = self.paths.resolve(&file.name);
            let text = if line > 0 {
                match self.sources.line(&resolved, line as usize - 1) {
                    Ok(text) => text,
                    Err(err) => {
                        warn!(%err, "no source text available");
                        None
                    }
                }
            } else {
                None
            };
            Some(SourceLocation {
                file: resolved,
                line,
                text,
            })
        })
    }

    /// First recorded address of `line` in `filename`.
    pub fn address_seg(&self, filename: &str, line: u32) -> Option<SegmentOffset>
    {
        let wanted = normalize(filename);
        self.hunks.iter().enumerate().find_map(|(segment_id, hunk)| {
            hunk.source_files()
                .iter()
                .filter(|file| self.is_same_file(file, &wanted))
                .find_map(|file| file.offset_of_line(line))
                .map(|offset| SegmentOffset::new(segment_id, offset))
        })
    }

    /// Every segment referencing `filename`, once per referencing line table.
    pub fn all_segment_ids(&self, filename: &str) -> Vec<usize>
    {
        let wanted = normalize(filename);
        let mut ids = Vec::new();
        for (segment_id, hunk) in self.hunks.iter().enumerate() {
            for file in hunk.source_files() {
                if self.is_same_file(file, &wanted) {
                    ids.push(segment_id);
                }
            }
        }
        ids
    }

    /// Resolve a recorded source name (memoized).
    pub fn resolve_file_name(&self, raw: &str) -> String
    {
        self.paths.resolve(raw)
    }

    /// Line `zero_based` of the source file recorded as `filename`.
    ///
    /// ## Errors
    ///
    /// [`HunkdbgError::SourceUnreadable`](crate::error::HunkdbgError::SourceUnreadable)
    /// if the resolved file cannot be read.
    pub fn source_line(&self, filename: &str, zero_based: usize) -> Result<Option<String>>
    {
        let resolved = self.paths.resolve(filename);
        self.sources.line(&resolved, zero_based)
    }

    fn is_same_file(&self, file: &SourceFileLines, wanted: &str) -> bool
    {
        same_source_file_names(&self.paths.resolve(&file.name), wanted)
    }
}
