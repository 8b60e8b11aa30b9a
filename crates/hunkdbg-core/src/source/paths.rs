//! # Source Path Resolution
//!
//! Line tables record source paths as the assembler saw them, which is often an
//! absolute path on another machine (`/Users/someone/project/gencop.s`) or a
//! Windows path under an emulator. This module maps those recorded names to
//! files in the current project.
//!
//! Resolution strategy, in order:
//! 1. Apply the first configured substring replacement that matches
//! 2. Look for the path under each workspace root
//! 3. If it still does not exist, look under each extra source root
//! 4. Normalize separators (and case on non-`/` platforms)
//!
//! Resolution never fails: a name that cannot be found is returned as the best
//! candidate and the caller finds out when it tries to read it.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::path::{Component, Path, PathBuf, MAIN_SEPARATOR};
use std::str::FromStr;
use std::sync::Arc;

use tracing::{debug, trace};

use super::fs::FileSystem;

/// One substring rewrite applied to recorded source paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathReplacement
{
    /// Substring to look for.
    pub from: String,
    /// Text substituted for the first occurrence of `from`.
    pub to: String,
}

impl PathReplacement
{
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self
    {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Apply to `path` if `from` occurs in it.
    #[must_use]
    pub fn apply(&self, path: &str) -> Option<String>
    {
        path.contains(&self.from).then(|| path.replacen(&self.from, &self.to, 1))
    }
}

impl FromStr for PathReplacement
{
    type Err = String;

    /// Parse `FROM=TO`. Only the first `=` separates, so `TO` may contain `=`.
    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.split_once('=') {
            Some((from, to)) if !from.is_empty() => Ok(Self::new(from, to)),
            _ => Err(format!("Invalid path replacement: {s}. Use 'FROM=TO'")),
        }
    }
}

impl fmt::Display for PathReplacement
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{}={}", self.from, self.to)
    }
}

/// Where recorded source paths are looked up.
///
/// All three lists are ordered; the first match wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathConfig
{
    /// Substring rewrites applied before any lookup.
    pub replacements: Vec<PathReplacement>,
    /// Project roots (the editor's workspace folders).
    pub workspace_roots: Vec<PathBuf>,
    /// Extra directories probed when a path is not found otherwise.
    pub source_roots: Vec<PathBuf>,
}

impl PathConfig
{
    #[must_use]
    pub fn new() -> Self
    {
        Self::default()
    }

    #[must_use]
    pub fn with_replacement(mut self, from: impl Into<String>, to: impl Into<String>) -> Self
    {
        self.replacements.push(PathReplacement::new(from, to));
        self
    }

    #[must_use]
    pub fn with_workspace_root(mut self, root: impl Into<PathBuf>) -> Self
    {
        self.workspace_roots.push(root.into());
        self
    }

    #[must_use]
    pub fn with_source_root(mut self, root: impl Into<PathBuf>) -> Self
    {
        self.source_roots.push(root.into());
        self
    }

    /// Rewrite `path` with the first matching replacement, if any.
    #[must_use]
    pub fn apply_replacements(&self, path: &str) -> String
    {
        self.replacements
            .iter()
            .find_map(|replacement| replacement.apply(path))
            .unwrap_or_else(|| path.to_string())
    }
}

/// Memoizing resolver from recorded source names to real paths.
///
/// The cache lives as long as the resolver, which lives as long as one loaded
/// binary. Files appearing on disk later are not noticed until the binary is
/// reloaded.
pub struct PathResolver
{
    config: PathConfig,
    fs: Arc<dyn FileSystem>,
    resolved: RefCell<HashMap<String, String>>,
}

impl PathResolver
{
    pub fn new(config: PathConfig, fs: Arc<dyn FileSystem>) -> Self
    {
        Self {
            config,
            fs,
            resolved: RefCell::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &PathConfig
    {
        &self.config
    }

    /// Resolve a recorded source name to the path to use for this project.
    ///
    /// Repeated calls with the same `raw` return the cached answer without
    /// touching the filesystem.
    pub fn resolve(&self, raw: &str) -> String
    {
        if let Some(hit) = self.resolved.borrow().get(raw) {
            return hit.clone();
        }

        let resolved = self.resolve_uncached(raw);
        debug!(raw, resolved = %resolved, "resolved source path");
        self.resolved.borrow_mut().insert(raw.to_string(), resolved.clone());
        resolved
    }

    /// Number of distinct names resolved so far.
    pub fn cached_len(&self) -> usize
    {
        self.resolved.borrow().len()
    }

    fn resolve_uncached(&self, raw: &str) -> String
    {
        let rewritten = self.config.apply_replacements(raw);
        let mut candidate = self.find_in_workspace(&rewritten);

        if !self.config.source_roots.is_empty() && !self.fs.exists(Path::new(&candidate)) {
            for root in &self.config.source_roots {
                let checked = join_under(root, &candidate);
                trace!(candidate = %checked.display(), "probing source root");
                if self.fs.exists(&checked) {
                    candidate = checked.to_string_lossy().into_owned();
                    break;
                }
            }
        }

        normalize(&candidate)
    }

    fn find_in_workspace(&self, path: &str) -> String
    {
        for root in &self.config.workspace_roots {
            let checked = join_under(root, path);
            trace!(candidate = %checked.display(), "probing workspace root");
            if self.fs.exists(&checked) {
                return checked.to_string_lossy().into_owned();
            }
        }
        path.to_string()
    }
}

/// Append `path` to `root`, treating an absolute `path` as relative.
///
/// `/Users/me/src/a.s` under `/work` becomes `/work/Users/me/src/a.s`, which
/// is how mirrored source trees are usually laid out.
#[must_use]
pub fn join_under(root: &Path, path: &str) -> PathBuf
{
    let mut joined = root.to_path_buf();
    for component in Path::new(path).components() {
        match component {
            Component::Prefix(_) | Component::RootDir => {}
            other => joined.push(other),
        }
    }
    joined
}

/// Normalize a path for comparison.
///
/// Runs of foreign separators become one native separator. On platforms whose
/// separator is not `/` the result is also upper-cased, since their
/// filesystems compare names case-insensitively.
#[must_use]
pub fn normalize(path: &str) -> String
{
    if MAIN_SEPARATOR == '/' {
        replace_separator_runs(path, '\\', '/')
    } else {
        replace_separator_runs(path, '/', MAIN_SEPARATOR).to_uppercase()
    }
}

fn replace_separator_runs(path: &str, from: char, to: char) -> String
{
    let mut out = String::with_capacity(path.len());
    let mut in_run = false;
    for c in path.chars() {
        if c == from {
            if !in_run {
                out.push(to);
            }
            in_run = true;
        } else {
            out.push(c);
            in_run = false;
        }
    }
    out
}

/// Whether two source names refer to the same file.
///
/// Two absolute paths must match exactly. Otherwise only the file names are
/// compared, so a relative name recorded by the assembler matches the absolute
/// path of the file in the project.
#[must_use]
pub fn same_source_file_names(a: &str, b: &str) -> bool
{
    let (path_a, path_b) = (Path::new(a), Path::new(b));
    if path_a.is_absolute() && path_b.is_absolute() {
        return a == b;
    }
    path_a.file_name() == path_b.file_name()
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_replacement_parse()
    {
        let replacement: PathReplacement = "C:\\work=/home/me/work".parse().unwrap();
        assert_eq!(replacement.from, "C:\\work");
        assert_eq!(replacement.to, "/home/me/work");
        assert!("no-separator".parse::<PathReplacement>().is_err());
        assert!("=empty-from".parse::<PathReplacement>().is_err());
    }

    #[test]
    fn test_first_replacement_wins()
    {
        let config = PathConfig::new()
            .with_replacement("/old", "/first")
            .with_replacement("/old/src", "/second");
        assert_eq!(config.apply_replacements("/old/src/a.s"), "/first/src/a.s");
        assert_eq!(config.apply_replacements("/other/a.s"), "/other/a.s");
    }

    #[test]
    fn test_join_under_drops_root()
    {
        assert_eq!(join_under(Path::new("/ws"), "/abs/x.s"), PathBuf::from("/ws/abs/x.s"));
        assert_eq!(join_under(Path::new("/ws"), "rel/x.s"), PathBuf::from("/ws/rel/x.s"));
    }

    #[test]
    fn test_resolve_memoizes_per_name()
    {
        let resolver = PathResolver::new(PathConfig::new(), Arc::new(crate::source::StdFileSystem));
        assert_eq!(resolver.cached_len(), 0);
        assert_eq!(resolver.resolve("gencop.s"), "gencop.s");
        assert_eq!(resolver.resolve("gencop.s"), "gencop.s");
        assert_eq!(resolver.cached_len(), 1);
        resolver.resolve("macros.i");
        assert_eq!(resolver.cached_len(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn test_normalize_backslashes()
    {
        assert_eq!(normalize("src\\\\sub\\x.s"), "src/sub/x.s");
        assert_eq!(normalize("/a/b/X.s"), "/a/b/X.s");
    }
}
