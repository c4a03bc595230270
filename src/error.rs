//! Error types shared by every part of the library.
//!
//! Each lifecycle operation and the reconciler report failures through
//! [`Error`]. The variants map onto the four failure classes the tool cares
//! about (missing entity, conflicting state, filesystem failure, malformed
//! index) plus two input classes (bad names, bad configuration).

use std::{
    fmt::{Display, Formatter},
    io,
    path::{Path, PathBuf},
};

/// Convenience alias used throughout the library.
pub type Result<T> = std::result::Result<T, Error>;

/// Every failure the library can report.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A referenced language, project or template does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The operation would clash with existing state (non-empty directory,
    /// entity already present).
    #[error("{0}")]
    Conflict(String),

    /// A filesystem operation failed for a reason other than absence.
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    /// The index file exists but is not well-formed JSON.
    #[error("failed to parse index file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A name that cannot be used as a single directory component.
    #[error("invalid name {0:?}: must be a non-empty single path component")]
    InvalidName(String),

    /// Configuration is missing, unreadable or malformed.
    #[error("{0}")]
    Config(String),
}

/// Coarse classification of an [`Error`], handy for matching in callers and tests.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    Io,
    Parse,
    InvalidName,
    Config,
}

impl Error {
    /// Wrap an [`io::Error`] with a description of what was being attempted on `path`.
    pub fn io(action: &str, path: &Path, source: io::Error) -> Self {
        Self::Io {
            context: format!("failed to {action} {}", path.display()),
            source,
        }
    }

    /// The class this error belongs to.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Io { .. } => ErrorKind::Io,
            Self::Parse { .. } => ErrorKind::Parse,
            Self::InvalidName(_) => ErrorKind::InvalidName,
            Self::Config(_) => ErrorKind::Config,
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::NotFound => "not found",
            Self::Conflict => "conflict",
            Self::Io => "io failure",
            Self::Parse => "parse failure",
            Self::InvalidName => "invalid name",
            Self::Config => "configuration error",
        };
        f.write_str(label)
    }
}

/// Attach path context to raw `io::Result`s.
pub trait IoContext<T> {
    /// Convert the error into [`Error::Io`] describing `action` on `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] when `self` is an error.
    fn with_path(self, action: &str, path: &Path) -> Result<T>;
}

impl<T> IoContext<T> for io::Result<T> {
    fn with_path(self, action: &str, path: &Path) -> Result<T> {
        self.map_err(|source| Error::io(action, path, source))
    }
}
