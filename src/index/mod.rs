//! The persisted index: languages, projects and users.
//!
//! The index is a cache of metadata about the project tree. The filesystem
//! stays authoritative for existence, size and version-control status; the
//! reconciler keeps the two in step.
//!
//! ## Main Parts
//!
//! - [`Index`] - the aggregate that is loaded and persisted as a whole
//! - [`Language`] - a language directory under the project root
//! - [`Project`] - a project directory under a language directory
//! - [`IndexStore`] - load / atomic persist / advisory lock on the index file

pub mod project;
pub mod store;
pub mod timestamp;

use std::{collections::BTreeSet, fmt, path::PathBuf};

use serde::{Deserialize, Serialize};

use crate::layout::Layout;

pub use project::Project;
pub use store::{IndexLock, IndexStore};

/// A language, identified by its directory name under the project root.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Language {
    name: String,
}

impl Language {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Directory holding this language's projects.
    #[must_use]
    pub fn project_dir(&self, layout: &Layout) -> PathBuf {
        layout.language_dir(&self.name)
    }

    /// Directory holding this language's templates.
    #[must_use]
    pub fn template_dir(&self, layout: &Layout) -> PathBuf {
        layout.template_language_dir(&self.name)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// The whole persisted index.
///
/// Serialized as a JSON object with the top-level arrays `Projects`,
/// `Languages` and `Users`. Missing arrays decode as empty.
#[derive(Clone, PartialEq, Eq, Default, Debug, Serialize, Deserialize)]
pub struct Index {
    #[serde(rename = "Projects", default)]
    pub projects: Vec<Project>,

    #[serde(rename = "Languages", default)]
    pub languages: Vec<Language>,

    #[serde(rename = "Users", default)]
    pub users: Vec<String>,
}

impl Index {
    /// Whether `name` is a tracked language.
    #[must_use]
    pub fn has_language(&self, name: &str) -> bool {
        self.languages.iter().any(|l| l.name() == name)
    }

    /// Append `name` unless it is already tracked. Returns whether it was added.
    pub fn add_language(&mut self, name: &str) -> bool {
        if self.has_language(name) {
            return false;
        }
        self.languages.push(Language::new(name));
        true
    }

    /// Remove the language `name`. Returns whether it was tracked.
    pub fn remove_language(&mut self, name: &str) -> bool {
        let before = self.languages.len();
        self.languages.retain(|l| l.name() != name);
        self.languages.len() != before
    }

    /// The project identified by `(language, folder_name)`.
    #[must_use]
    pub fn project(&self, language: &str, folder_name: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.is(language, folder_name))
    }

    /// Every project whose display name is `name`, in index order.
    #[must_use]
    pub fn projects_named(&self, name: &str) -> Vec<&Project> {
        self.projects.iter().filter(|p| p.name == name).collect()
    }

    /// Projects filed under `language`.
    pub fn projects_in<'a>(&'a self, language: &'a str) -> impl Iterator<Item = &'a Project> + 'a {
        self.projects.iter().filter(move |p| p.language == language)
    }

    /// Remove every record identified by `(language, folder_name)`.
    /// Returns how many were removed.
    pub fn remove_project(&mut self, language: &str, folder_name: &str) -> usize {
        let before = self.projects.len();
        self.projects.retain(|p| !p.is(language, folder_name));
        before - self.projects.len()
    }

    /// Recompute the user list: creators of every tracked project merged
    /// with the users already listed, sorted and de-duplicated.
    pub fn merge_users(&mut self) {
        let users: BTreeSet<String> = self
            .projects
            .iter()
            .map(|p| p.created_by.clone())
            .chain(self.users.drain(..))
            .collect();
        self.users = users.into_iter().collect();
    }
}
