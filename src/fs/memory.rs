//! In-memory [`FileSystem`] used to exercise the reconciler and the lifecycle
//! operations without touching real directories.
//!
//! Paths are stored verbatim; callers should use absolute paths built from a
//! common root. Failures can be injected per path with [`MemoryFs::fail_on`]:
//! any query or mutation touching that path (or something below it) returns
//! `PermissionDenied`, except plain existence checks.

use std::{
    cell::RefCell,
    collections::{BTreeMap, BTreeSet},
    io,
    path::{Path, PathBuf},
};

use super::{FileSystem, Prober, RemovalStrategy, Subdirectories};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Node {
    Dir,
    File(u64),
}

/// A filesystem tree held entirely in memory.
#[derive(Default, Debug)]
pub struct MemoryFs {
    nodes: RefCell<BTreeMap<PathBuf, Node>>,
    failing: RefCell<BTreeSet<PathBuf>>,
}

impl MemoryFs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a directory (and any missing parents).
    pub fn add_dir(&self, path: impl AsRef<Path>) {
        self.insert_parents(path.as_ref());
        self.nodes
            .borrow_mut()
            .insert(path.as_ref().to_path_buf(), Node::Dir);
    }

    /// Add a file of `size` bytes (and any missing parent directories).
    pub fn add_file(&self, path: impl AsRef<Path>, size: u64) {
        self.insert_parents(path.as_ref());
        self.nodes
            .borrow_mut()
            .insert(path.as_ref().to_path_buf(), Node::File(size));
    }

    /// Remove `path` and everything below it, bypassing failure injection.
    pub fn remove(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        self.nodes.borrow_mut().retain(|p, _| !p.starts_with(path));
    }

    /// Make every operation on `path` or below it fail with `PermissionDenied`.
    pub fn fail_on(&self, path: impl AsRef<Path>) {
        self.failing.borrow_mut().insert(path.as_ref().to_path_buf());
    }

    /// Whether `path` is a directory.
    #[must_use]
    pub fn is_dir(&self, path: impl AsRef<Path>) -> bool {
        self.nodes.borrow().get(path.as_ref()) == Some(&Node::Dir)
    }

    /// Whether `path` is a file.
    #[must_use]
    pub fn is_file(&self, path: impl AsRef<Path>) -> bool {
        matches!(self.nodes.borrow().get(path.as_ref()), Some(Node::File(_)))
    }

    fn insert_parents(&self, path: &Path) {
        let mut nodes = self.nodes.borrow_mut();
        for ancestor in path.ancestors().skip(1) {
            if ancestor.as_os_str().is_empty() {
                continue;
            }
            nodes.entry(ancestor.to_path_buf()).or_insert(Node::Dir);
        }
    }

    fn check(&self, path: &Path) -> io::Result<()> {
        if self.failing.borrow().iter().any(|f| path.starts_with(f)) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("permission denied: {}", path.display()),
            ));
        }
        Ok(())
    }

    fn require_dir(&self, path: &Path) -> io::Result<()> {
        match self.nodes.borrow().get(path) {
            Some(Node::Dir) => Ok(()),
            Some(Node::File(_)) => Err(io::Error::new(
                io::ErrorKind::NotADirectory,
                format!("not a directory: {}", path.display()),
            )),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such directory: {}", path.display()),
            )),
        }
    }

    fn children(&self, path: &Path) -> Vec<(PathBuf, Node)> {
        self.nodes
            .borrow()
            .iter()
            .filter(|(p, _)| p.parent() == Some(path))
            .map(|(p, n)| (p.clone(), *n))
            .collect()
    }
}

impl Prober for MemoryFs {
    fn exists(&self, path: &Path) -> bool {
        self.nodes.borrow().contains_key(path)
    }

    fn is_empty_dir(&self, path: &Path) -> io::Result<bool> {
        self.check(path)?;
        self.require_dir(path)?;
        Ok(self.children(path).is_empty())
    }

    fn dir_size(&self, path: &Path) -> io::Result<u64> {
        self.check(path)?;
        Ok(self
            .nodes
            .borrow()
            .iter()
            .filter(|(p, _)| p.starts_with(path))
            .map(|(_, node)| match node {
                Node::File(size) => *size,
                Node::Dir => 0,
            })
            .sum())
    }

    fn uses_version_control(&self, path: &Path) -> bool {
        self.is_dir(path.join(".git"))
    }

    fn list_subdirectories(&self, path: &Path) -> io::Result<Subdirectories> {
        self.check(path)?;
        self.require_dir(path)?;
        let mut subdirs = Subdirectories::default();
        for (child, node) in self.children(path) {
            if node == Node::Dir
                && let Some(name) = child.file_name()
            {
                subdirs.insert(path, name.to_os_string());
            }
        }
        Ok(subdirs)
    }

    /// Paths are stored verbatim, so an existing path is already canonical.
    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        self.check(path)?;
        if !self.exists(path) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such path: {}", path.display()),
            ));
        }
        Ok(path.to_path_buf())
    }
}

impl FileSystem for MemoryFs {
    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        self.check(path)?;
        if self.is_file(path) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("a file exists at {}", path.display()),
            ));
        }
        self.add_dir(path);
        Ok(())
    }

    fn remove_empty_dir(&self, path: &Path) -> io::Result<()> {
        self.check(path)?;
        self.require_dir(path)?;
        if !self.children(path).is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::DirectoryNotEmpty,
                format!("directory not empty: {}", path.display()),
            ));
        }
        self.nodes.borrow_mut().remove(path);
        Ok(())
    }

    fn remove_tree(&self, path: &Path, _strategy: RemovalStrategy) -> io::Result<()> {
        self.check(path)?;
        if !self.exists(path) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such directory: {}", path.display()),
            ));
        }
        self.remove(path);
        Ok(())
    }

    fn copy_dir_contents(&self, source: &Path, target: &Path) -> io::Result<u64> {
        self.check(source)?;
        self.check(target)?;
        self.require_dir(source)?;

        let entries: Vec<(PathBuf, Node)> = self
            .nodes
            .borrow()
            .iter()
            .filter(|(p, _)| p.starts_with(source) && p.as_path() != source)
            .map(|(p, n)| (p.clone(), *n))
            .collect();

        self.add_dir(target);
        let mut copied = 0u64;
        for (path, node) in entries {
            let relative = path.strip_prefix(source).map_err(io::Error::other)?;
            let destination = target.join(relative);
            match node {
                Node::Dir => self.add_dir(destination),
                Node::File(size) => {
                    self.add_file(destination, size);
                    copied += 1;
                }
            }
        }

        Ok(copied)
    }

    fn init_version_control(&self, path: &Path) -> io::Result<()> {
        self.check(path)?;
        self.require_dir(path)?;
        self.add_file(path.join(".git").join("HEAD"), 21);
        Ok(())
    }
}
