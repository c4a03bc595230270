//! Filesystem access behind a seam.
//!
//! The reconciler only ever asks questions ([`Prober`]); lifecycle operations
//! additionally create, copy and remove directories ([`FileSystem`]). Both are
//! traits so the core logic runs unchanged against the real disk
//! ([`DiskFs`]) and against an in-memory tree ([`MemoryFs`]).
//!
//! ## Symbolic links
//!
//! Links are never followed. They contribute nothing to directory sizes,
//! are not reported as subdirectories, are skipped when copying templates,
//! and recursive removal deletes the link itself rather than its target.

pub mod disk;
pub mod memory;

use std::{
    collections::BTreeSet,
    ffi::OsString,
    io,
    path::{Path, PathBuf},
};

pub use disk::DiskFs;
pub use memory::MemoryFs;

/// Read-only filesystem queries. No caching: every call touches the filesystem.
pub trait Prober {
    /// Whether anything exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Whether `path` is a directory with no entries.
    ///
    /// # Errors
    ///
    /// Fails if `path` does not exist or is not a directory.
    fn is_empty_dir(&self, path: &Path) -> io::Result<bool>;

    /// Sum of the sizes of all regular files below `path`. A missing path is `0`.
    ///
    /// # Errors
    ///
    /// Fails if part of the tree cannot be read.
    fn dir_size(&self, path: &Path) -> io::Result<u64>;

    /// Whether a `.git` directory sits directly under `path`.
    fn uses_version_control(&self, path: &Path) -> bool;

    /// The immediate subdirectories of `path`.
    ///
    /// # Errors
    ///
    /// Fails if `path` cannot be listed (missing, not a directory, permissions).
    fn list_subdirectories(&self, path: &Path) -> io::Result<Subdirectories>;

    /// Absolute form of `path` with every link resolved.
    ///
    /// # Errors
    ///
    /// Fails if `path` does not exist.
    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf>;
}

/// Immediate subdirectories of a directory.
///
/// Only names that are valid UTF-8 can be stored in the index; the others
/// are kept apart as full paths so callers can report them.
#[derive(Clone, PartialEq, Eq, Default, Debug)]
pub struct Subdirectories {
    /// Sorted UTF-8 names.
    pub names: BTreeSet<String>,

    /// Subdirectories whose name is not valid UTF-8.
    pub unnamed: Vec<PathBuf>,
}

impl Subdirectories {
    /// File the subdirectory `name` of `parent` under the right list.
    pub fn insert(&mut self, parent: &Path, name: OsString) {
        match name.into_string() {
            Ok(name) => {
                self.names.insert(name);
            }
            Err(raw) => self.unnamed.push(parent.join(raw)),
        }
    }
}

impl IntoIterator for Subdirectories {
    type Item = String;
    type IntoIter = std::collections::btree_set::IntoIter<String>;

    /// Iterate over the UTF-8 names only.
    fn into_iter(self) -> Self::IntoIter {
        self.names.into_iter()
    }
}

/// How recursively removed directories disappear.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RemovalStrategy {
    /// Permanently delete the directory (`fs::remove_dir_all`).
    Permanent,

    /// Move the directory to the system trash (recoverable deletion).
    Trash,
}

impl RemovalStrategy {
    /// Create a removal strategy from the `use_trash` boolean flag.
    #[must_use]
    pub const fn from_use_trash(use_trash: bool) -> Self {
        if use_trash {
            Self::Trash
        } else {
            Self::Permanent
        }
    }
}

/// Mutating operations used by the lifecycle operations.
pub trait FileSystem: Prober {
    /// Create `path` and any missing parents.
    ///
    /// # Errors
    ///
    /// Fails on permission or I/O errors.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Remove `path`, which must be an empty directory.
    ///
    /// # Errors
    ///
    /// Fails if the directory is missing, not empty, or cannot be removed.
    fn remove_empty_dir(&self, path: &Path) -> io::Result<()>;

    /// Remove `path` and everything below it.
    ///
    /// # Errors
    ///
    /// Fails if any part of the tree cannot be removed.
    fn remove_tree(&self, path: &Path, strategy: RemovalStrategy) -> io::Result<()>;

    /// Copy the contents of `source` (not `source` itself) into `target`,
    /// overwriting files that already exist. Returns the number of files copied.
    ///
    /// # Errors
    ///
    /// Fails if `source` cannot be read or `target` cannot be written.
    fn copy_dir_contents(&self, source: &Path, target: &Path) -> io::Result<u64>;

    /// Initialise a version-control repository in `path`.
    ///
    /// # Errors
    ///
    /// Fails if the repository cannot be created.
    fn init_version_control(&self, path: &Path) -> io::Result<()>;
}
