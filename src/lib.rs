//! # devmap
//!
//! Keeps a JSON index of local software projects, grouped by language, in
//! sync with the directory tree that actually holds them.
//!
//! ```text
//! <projects_root>/<language>/<project>/
//! <templates_root>/<language>/<template>/
//! ```
//!
//! The filesystem is authoritative. Every time the index is opened it is
//! reconciled with the tree: untracked directories are adopted, entries
//! whose directory vanished are pruned, and sizes and git status are
//! re-measured. Lifecycle operations (languages, projects, templates) change
//! the filesystem first and only then record the change in the index.
//!
//! ## Main Parts
//!
//! - [`fs`] - filesystem seam: [`fs::Prober`] / [`fs::FileSystem`], disk and in-memory implementations
//! - [`index`] - the persisted model and its atomic, locked store
//! - [`reconcile`] - drift detection and repair
//! - [`manager`] - [`DevMap`], the owner of the index and every lifecycle operation
//! - [`config`] - TOML configuration and layered settings
//! - [`output`] - tables and JSON documents for the command-line front end

pub mod config;
pub mod error;
pub mod fs;
pub mod index;
pub mod layout;
pub mod manager;
pub mod output;
pub mod reconcile;
pub mod utils;

pub use crate::error::{Error, ErrorKind, Result};
pub use crate::fs::{DiskFs, FileSystem, Prober, RemovalStrategy};
pub use crate::index::{Index, IndexStore, Language, Project};
pub use crate::layout::Layout;
pub use crate::manager::{
    Confirmation, Deletion, DevMap, LanguageOutcome, NewProject, Template,
};
pub use crate::reconcile::{SyncEvent, SyncReport};
