//! Filesystem access used by path resolution and source loading.

use std::fs;
use std::io;
use std::path::Path;

/// The filesystem capability the host provides.
///
/// Path resolution only asks whether candidates exist; the source text cache
/// reads whole files. Hosts with virtual filesystems (remote workspaces,
/// emulator-mounted volumes) implement this trait; tests use it to count
/// probes.
pub trait FileSystem
{
    /// Whether `path` names an existing file or directory.
    fn exists(&self, path: &Path) -> bool;

    /// Read the whole file.
    ///
    /// ## Errors
    ///
    /// Any I/O failure, including a missing file.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
}

/// [`FileSystem`] backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFileSystem;

impl FileSystem for StdFileSystem
{
    fn exists(&self, path: &Path) -> bool
    {
        path.exists()
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>>
    {
        fs::read(path)
    }
}
