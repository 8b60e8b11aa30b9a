//! Lazily loaded source file text, split into lines.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use super::fs::FileSystem;
use crate::error::{HunkdbgError, Result};

/// Cache of source files keyed by resolved path.
///
/// A file is read on first access and kept for the lifetime of the cache.
pub struct SourceTextCache
{
    fs: Arc<dyn FileSystem>,
    files: RefCell<HashMap<String, Arc<[String]>>>,
}

impl SourceTextCache
{
    pub fn new(fs: Arc<dyn FileSystem>) -> Self
    {
        Self {
            fs,
            files: RefCell::new(HashMap::new()),
        }
    }

    /// Line `zero_based` of the file at `resolved`.
    ///
    /// Returns `Ok(None)` when the file has fewer lines.
    ///
    /// ## Errors
    ///
    /// [`HunkdbgError::SourceUnreadable`] if the file cannot be read.
    pub fn line(&self, resolved: &str, zero_based: usize) -> Result<Option<String>>
    {
        let lines = self.lines(resolved)?;
        Ok(lines.get(zero_based).cloned())
    }

    /// All lines of the file at `resolved`.
    ///
    /// ## Errors
    ///
    /// [`HunkdbgError::SourceUnreadable`] if the file cannot be read.
    pub fn lines(&self, resolved: &str) -> Result<Arc<[String]>>
    {
        if let Some(lines) = self.files.borrow().get(resolved) {
            return Ok(lines.clone());
        }

        let path = Path::new(resolved);
        let bytes = self.fs.read(path).map_err(|source| HunkdbgError::SourceUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let lines: Arc<[String]> = split_lines(&String::from_utf8_lossy(&bytes)).into();
        debug!(path = resolved, lines = lines.len(), "loaded source file");
        self.files.borrow_mut().insert(resolved.to_string(), lines.clone());
        Ok(lines)
    }
}

/// Split on `\r\n`, `\r` or `\n`.
///
/// A trailing terminator yields a final empty line, so line indices match what
/// an editor shows.
#[must_use]
pub fn split_lines(text: &str) -> Vec<String>
{
    let bytes = text.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\r' => {
                lines.push(text[start..i].to_string());
                if bytes.get(i + 1) == Some(&b'\n') {
                    i += 1;
                }
                start = i + 1;
            }
            b'\n' => {
                lines.push(text[start..i].to_string());
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    lines.push(text[start..].to_string());
    lines
}
