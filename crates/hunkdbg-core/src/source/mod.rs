//! # Source Files
//!
//! Everything between a source name recorded in a binary and the text shown
//! to the user: the filesystem capability, path resolution and the text cache.

pub mod fs;
pub mod paths;
pub mod text_cache;

pub use fs::{FileSystem, StdFileSystem};
pub use paths::{normalize, same_source_file_names, PathConfig, PathReplacement, PathResolver};
pub use text_cache::SourceTextCache;
