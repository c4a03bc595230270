//! Loading and persisting the index file.
//!
//! Writes are atomic: the index is serialized into a temporary file next to
//! the target and renamed over it, so an interrupted write never leaves a
//! truncated index behind. Concurrent invocations are serialized with an
//! exclusive advisory lock on a sibling `.lock` file.

use std::{
    fs::{self, File, OpenOptions},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use fs2::FileExt;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use tempfile::NamedTempFile;
use tracing::debug;

use super::Index;
use crate::error::{Error, IoContext, Result};

/// Handle on the index file at a fixed path.
#[derive(Clone, Debug)]
pub struct IndexStore {
    path: PathBuf,
}

/// Exclusive advisory lock on the index; released on drop.
#[derive(Debug)]
pub struct IndexLock {
    file: File,
    path: PathBuf,
}

impl Drop for IndexLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            debug!(path = %self.path.display(), error = %e, "failed to release index lock");
        }
    }
}

impl IndexStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the sibling lock file (`<index file>.lock`).
    #[must_use]
    pub fn lock_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".lock");
        self.path.with_file_name(name)
    }

    /// Whether the index file exists yet.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the index.
    ///
    /// A missing file yields an empty index; the caller decides whether that
    /// means first-time setup.
    ///
    /// # Errors
    ///
    /// - [`Error::Io`] if the file exists but cannot be read
    /// - [`Error::Parse`] if the file is not well-formed
    pub fn load(&self) -> Result<Index> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "index file not found, starting empty");
                return Ok(Index::default());
            }
            Err(e) => return Err(Error::io("read index file", &self.path, e)),
        };

        serde_json::from_str(&content).map_err(|source| Error::Parse {
            path: self.path.clone(),
            source,
        })
    }

    /// Serialize the full index (4-space pretty printing) and atomically
    /// replace the index file with it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the directory cannot be created, the
    /// temporary file cannot be written, or the rename fails. The previous
    /// index file is left untouched in every failure case.
    pub fn persist(&self, index: &Index) -> Result<()> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir).with_path("create index directory", dir)?;

        let temp = NamedTempFile::new_in(dir).with_path("create temporary file in", dir)?;
        {
            let mut writer = BufWriter::new(temp.as_file());
            let formatter = PrettyFormatter::with_indent(b"    ");
            let mut serializer = Serializer::with_formatter(&mut writer, formatter);
            index
                .serialize(&mut serializer)
                .map_err(io::Error::from)
                .with_path("serialize index to", temp.path())?;
            writer.write_all(b"\n").with_path("write", temp.path())?;
            writer.flush().with_path("write", temp.path())?;
        }
        temp.as_file()
            .sync_all()
            .with_path("sync", temp.path())?;
        temp.persist(&self.path)
            .map_err(|e| Error::io("replace index file", &self.path, e.error))?;

        debug!(
            path = %self.path.display(),
            projects = index.projects.len(),
            languages = index.languages.len(),
            "index persisted"
        );
        Ok(())
    }

    /// Take the exclusive advisory lock, blocking until it is available.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the lock file cannot be created or locked.
    pub fn lock(&self) -> Result<IndexLock> {
        let path = self.lock_path();
        if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(dir).with_path("create index directory", dir)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .with_path("open lock file", &path)?;
        file.lock_exclusive().with_path("lock", &path)?;
        debug!(path = %path.display(), "index lock acquired");

        Ok(IndexLock { file, path })
    }
}
