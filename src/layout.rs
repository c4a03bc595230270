//! On-disk layout of the project and template trees.
//!
//! ```text
//! <projects_root>/<language>/<project folder>/
//! <templates_root>/<language>/<template>/
//! ```

use std::path::{Path, PathBuf};

/// The two roots every path in the tool is derived from.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Layout {
    projects_root: PathBuf,
    templates_root: PathBuf,
}

impl Layout {
    #[must_use]
    pub fn new(projects_root: impl Into<PathBuf>, templates_root: impl Into<PathBuf>) -> Self {
        Self {
            projects_root: projects_root.into(),
            templates_root: templates_root.into(),
        }
    }

    #[must_use]
    pub fn projects_root(&self) -> &Path {
        &self.projects_root
    }

    #[must_use]
    pub fn templates_root(&self) -> &Path {
        &self.templates_root
    }

    /// `<projects_root>/<language>`
    #[must_use]
    pub fn language_dir(&self, language: &str) -> PathBuf {
        self.projects_root.join(language)
    }

    /// `<projects_root>/<language>/<folder_name>`
    #[must_use]
    pub fn project_dir(&self, language: &str, folder_name: &str) -> PathBuf {
        self.projects_root.join(language).join(folder_name)
    }

    /// `<templates_root>/<language>`
    #[must_use]
    pub fn template_language_dir(&self, language: &str) -> PathBuf {
        self.templates_root.join(language)
    }

    /// `<templates_root>/<language>/<name>`
    #[must_use]
    pub fn template_dir(&self, language: &str, name: &str) -> PathBuf {
        self.templates_root.join(language).join(name)
    }
}
