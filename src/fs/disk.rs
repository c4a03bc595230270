//! [`FileSystem`] implementation backed by the real disk.

use std::{
    fs, io,
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use tracing::debug;
use walkdir::WalkDir;

use super::{FileSystem, Prober, RemovalStrategy, Subdirectories};

/// The real filesystem.
#[derive(Clone, Copy, Default, Debug)]
pub struct DiskFs;

impl DiskFs {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Prober for DiskFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_empty_dir(&self, path: &Path) -> io::Result<bool> {
        Ok(fs::read_dir(path)?.next().is_none())
    }

    /// Recursively traverses the tree with `walkdir` and sums the sizes of
    /// regular files. Links are not followed, so they add nothing and cannot
    /// form cycles.
    fn dir_size(&self, path: &Path) -> io::Result<u64> {
        if fs::symlink_metadata(path).is_err() {
            return Ok(0);
        }

        let mut total = 0u64;

        for entry in WalkDir::new(path).follow_links(false) {
            let entry = entry?;
            if entry.file_type().is_file() {
                total += entry.metadata()?.len();
            }
        }

        Ok(total)
    }

    fn uses_version_control(&self, path: &Path) -> bool {
        fs::symlink_metadata(path.join(".git")).is_ok_and(|meta| meta.is_dir())
    }

    fn list_subdirectories(&self, path: &Path) -> io::Result<Subdirectories> {
        let mut subdirs = Subdirectories::default();

        for entry in fs::read_dir(path)? {
            let entry = entry?;
            // `DirEntry::file_type` does not traverse links
            if entry.file_type()?.is_dir() {
                subdirs.insert(path, entry.file_name());
            }
        }

        Ok(subdirs)
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        fs::canonicalize(path)
    }
}

impl FileSystem for DiskFs {
    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn remove_empty_dir(&self, path: &Path) -> io::Result<()> {
        fs::remove_dir(path)
    }

    fn remove_tree(&self, path: &Path, strategy: RemovalStrategy) -> io::Result<()> {
        match strategy {
            RemovalStrategy::Permanent => fs::remove_dir_all(path),
            RemovalStrategy::Trash => trash::delete(path)
                .map_err(|e| io::Error::other(format!("failed to move to trash: {e}"))),
        }
    }

    fn copy_dir_contents(&self, source: &Path, target: &Path) -> io::Result<u64> {
        let mut copied = 0u64;

        fs::create_dir_all(target)?;

        for entry in WalkDir::new(source).min_depth(1).follow_links(false) {
            let entry = entry?;
            let relative = entry
                .path()
                .strip_prefix(source)
                .map_err(io::Error::other)?;
            let destination = target.join(relative);
            let file_type = entry.file_type();

            if file_type.is_dir() {
                fs::create_dir_all(&destination)?;
            } else if file_type.is_file() {
                fs::copy(entry.path(), &destination)?;
                copied += 1;
            } else {
                debug!(path = %entry.path().display(), "skipping symbolic link while copying");
            }
        }

        Ok(copied)
    }

    fn init_version_control(&self, path: &Path) -> io::Result<()> {
        let status = Command::new("git")
            .args(["init", "--quiet"])
            .current_dir(path)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()?;

        if status.success() {
            Ok(())
        } else {
            Err(io::Error::other(format!("`git init` exited with {status}")))
        }
    }
}
