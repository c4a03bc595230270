//! The project manager: one owned [`Index`] plus every lifecycle operation.
//!
//! A [`DevMap`] is opened once per invocation. Opening takes the index lock,
//! loads the index and reconciles it with the filesystem before anything
//! else can look at it. Each lifecycle operation then follows the same
//! order: validate, change the filesystem, update the index, persist. If a
//! filesystem step fails the operation stops there and the index is left
//! untouched, so the persisted index never claims a change that did not
//! happen.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    io,
    path::{Path, PathBuf},
};

use serde::Serialize;
use tracing::{info, warn};

use crate::{
    error::{Error, IoContext, Result},
    fs::{FileSystem, RemovalStrategy},
    index::{Index, IndexLock, IndexStore, Language, Project, timestamp},
    layout::Layout,
    reconcile::{Adoption, SyncReport, reconcile},
    utils::{current_user, derive_folder_name, validate_name},
};

/// Result of [`DevMap::create_language`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LanguageOutcome {
    /// The language was already tracked; nothing changed.
    AlreadyTracked,

    /// The language was added to the index.
    Created,
}

/// Result of an operation guarded by a double confirmation.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Deletion {
    Removed,

    /// The confirmation was not given twice; nothing changed.
    Aborted,
}

/// The two independent answers required before a recursive deletion.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct Confirmation {
    pub first: bool,
    pub second: bool,
}

impl Confirmation {
    #[must_use]
    pub const fn new(first: bool, second: bool) -> Self {
        Self { first, second }
    }

    /// Both answers affirmative.
    #[must_use]
    pub const fn granted() -> Self {
        Self::new(true, true)
    }

    #[must_use]
    pub const fn is_affirmed(&self) -> bool {
        self.first && self.second
    }
}

/// Parameters of [`DevMap::create_project`].
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct NewProject {
    /// Display name.
    pub name: String,

    /// Directory name; derived from `name` when absent.
    pub folder_name: Option<String>,

    /// Tracked language to file the project under.
    pub language: String,

    /// Run `git init` in the new directory.
    pub init_git: bool,

    /// Template (of the same language) whose contents are copied in.
    pub template: Option<String>,
}

impl NewProject {
    #[must_use]
    pub fn new(name: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            folder_name: None,
            language: language.into(),
            init_git: false,
            template: None,
        }
    }

    /// The folder name that will be used on disk.
    #[must_use]
    pub fn resolved_folder_name(&self) -> String {
        self.folder_name
            .clone()
            .unwrap_or_else(|| derive_folder_name(&self.name))
    }
}

/// A template directory, `<templates_root>/<language>/<name>`.
///
/// Templates are never recorded in the index; they exist only on disk.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Serialize)]
pub struct Template {
    pub language: String,
    pub name: String,
}

impl Template {
    #[must_use]
    pub fn path(&self, layout: &Layout) -> PathBuf {
        layout.template_dir(&self.language, &self.name)
    }
}

impl Display for Template {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}/{}", self.language, self.name)
    }
}

/// The index, the layout it describes and the filesystem it lives on.
///
/// Holds the index lock for as long as it is alive.
#[derive(Debug)]
pub struct DevMap<F: FileSystem> {
    index: Index,
    store: IndexStore,
    layout: Layout,
    fs: F,
    user: String,
    _lock: IndexLock,
}

impl<F: FileSystem> DevMap<F> {
    /// Open the index as the current operating-system user.
    ///
    /// See [`DevMap::open_as`].
    ///
    /// # Errors
    ///
    /// Same as [`DevMap::open_as`].
    pub fn open(store: IndexStore, layout: Layout, fs: F) -> Result<(Self, SyncReport)> {
        Self::open_as(store, layout, fs, current_user())
    }

    /// Lock, load and reconcile the index, then persist the reconciled state.
    ///
    /// `user` is recorded as the creator of projects created or adopted
    /// through this handle.
    ///
    /// # Errors
    ///
    /// - [`Error::Parse`] if the index file is malformed; nothing is reconciled
    /// - [`Error::NotFound`] if the project root does not exist
    /// - [`Error::Io`] if the lock, the root listing or the persist fails
    pub fn open_as(
        store: IndexStore,
        layout: Layout,
        fs: F,
        user: impl Into<String>,
    ) -> Result<(Self, SyncReport)> {
        let lock = store.lock()?;
        let index = store.load()?;

        let mut devmap = Self {
            index,
            store,
            layout,
            fs,
            user: user.into(),
            _lock: lock,
        };
        let report = devmap.reconcile()?;
        Ok((devmap, report))
    }

    /// Reconcile the index with the filesystem and persist the result.
    ///
    /// # Errors
    ///
    /// Returns the reconciliation error (missing or unlistable project root)
    /// or the persist error.
    pub fn reconcile(&mut self) -> Result<SyncReport> {
        let adoption = Adoption::new(self.user.clone(), timestamp::now());
        let report = reconcile(&mut self.index, &self.layout, &self.fs, &adoption)?;
        self.persist()?;
        Ok(report)
    }

    #[must_use]
    pub fn languages(&self) -> &[Language] {
        &self.index.languages
    }

    #[must_use]
    pub fn projects(&self) -> &[Project] {
        &self.index.projects
    }

    #[must_use]
    pub fn users(&self) -> &[String] {
        &self.index.users
    }

    #[must_use]
    pub const fn index(&self) -> &Index {
        &self.index
    }

    #[must_use]
    pub const fn layout(&self) -> &Layout {
        &self.layout
    }

    #[must_use]
    pub const fn store(&self) -> &IndexStore {
        &self.store
    }

    #[must_use]
    pub const fn fs(&self) -> &F {
        &self.fs
    }

    /// Every tracked project whose display name is `name`.
    #[must_use]
    pub fn find_projects(&self, name: &str) -> Vec<&Project> {
        self.index.projects_named(name)
    }

    /// Track a new language, creating its project and template directories.
    ///
    /// Directories that already exist are left as they are.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidName`] if `name` is not a single path component
    /// - [`Error::Io`] if a directory cannot be created or the index cannot be persisted
    pub fn create_language(&mut self, name: &str) -> Result<LanguageOutcome> {
        validate_name(name)?;
        if self.index.has_language(name) {
            info!(language = name, "language already tracked");
            return Ok(LanguageOutcome::AlreadyTracked);
        }

        for dir in self.language_dirs(name) {
            if !self.fs.exists(&dir) {
                self.fs
                    .create_dir_all(&dir)
                    .with_path("create directory", &dir)?;
                info!(path = %dir.display(), "created directory");
            }
        }

        self.index.add_language(name);
        self.persist()?;
        info!(language = name, "language created");
        Ok(LanguageOutcome::Created)
    }

    /// Stop tracking a language and remove its (empty) directories.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidName`] if `name` is not a single path component
    /// - [`Error::NotFound`] if the language is not tracked
    /// - [`Error::Conflict`] if its project or template directory has entries;
    ///   nothing is changed
    /// - [`Error::Io`] if a directory cannot be inspected or removed; the index
    ///   is not updated
    pub fn delete_language(&mut self, name: &str) -> Result<()> {
        validate_name(name)?;
        if !self.index.has_language(name) {
            return Err(Error::NotFound(format!("language '{name}' is not tracked")));
        }

        let present: Vec<PathBuf> = self
            .language_dirs(name)
            .into_iter()
            .filter(|dir| self.fs.exists(dir))
            .collect();

        for dir in &present {
            let empty = self
                .fs
                .is_empty_dir(dir)
                .with_path("inspect directory", dir)?;
            if !empty {
                return Err(Error::Conflict(format!(
                    "language '{name}' cannot be deleted: {} is not empty",
                    dir.display()
                )));
            }
        }

        for dir in &present {
            self.fs
                .remove_empty_dir(dir)
                .with_path("remove directory", dir)?;
            info!(path = %dir.display(), "removed directory");
        }

        self.index.remove_language(name);
        self.index.projects.retain(|p| p.language != name);
        self.persist()?;
        info!(language = name, "language deleted");
        Ok(())
    }

    /// Create a project directory, optionally fill it from a template and
    /// initialise version control, then track it.
    ///
    /// Every precondition is checked before the filesystem is touched. If
    /// populating the new directory fails, the directory is removed again
    /// and the index is left unchanged.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidName`] for an empty display name or an unusable folder name
    /// - [`Error::NotFound`] if the language is not tracked or the template does not exist
    /// - [`Error::Conflict`] if the project is already tracked or its directory exists
    /// - [`Error::Io`] if a filesystem step or the persist fails
    pub fn create_project(&mut self, request: &NewProject) -> Result<&Project> {
        if request.name.trim().is_empty() {
            return Err(Error::InvalidName(request.name.clone()));
        }
        let folder_name = request.resolved_folder_name();
        validate_name(&folder_name)?;
        let language = request.language.as_str();
        validate_name(language)?;
        if let Some(template) = &request.template {
            validate_name(template)?;
        }

        if !self.index.has_language(language) {
            return Err(Error::NotFound(format!(
                "language '{language}' is not tracked"
            )));
        }

        let template = match &request.template {
            Some(template) => {
                let dir = self.layout.template_dir(language, template);
                if !self.fs.exists(&dir) {
                    return Err(Error::NotFound(format!(
                        "template '{language}/{template}' does not exist"
                    )));
                }
                Some(dir)
            }
            None => None,
        };

        if self.index.project(language, &folder_name).is_some() {
            return Err(Error::Conflict(format!(
                "project '{language}/{folder_name}' is already tracked"
            )));
        }
        let path = self.layout.project_dir(language, &folder_name);
        if self.fs.exists(&path) {
            return Err(Error::Conflict(format!(
                "{} already exists",
                path.display()
            )));
        }

        self.fs
            .create_dir_all(&path)
            .with_path("create project directory", &path)?;
        info!(path = %path.display(), "created project directory");

        let (size, uses_git) = match self.populate(&path, template.as_deref(), request.init_git) {
            Ok(metrics) => metrics,
            Err(e) => {
                if let Err(cleanup) = self.fs.remove_tree(&path, RemovalStrategy::Permanent) {
                    warn!(path = %path.display(), error = %cleanup, "failed to roll back project directory");
                }
                return Err(e);
            }
        };

        self.index.projects.push(Project {
            name: request.name.clone(),
            folder_name,
            language: language.to_string(),
            created_by: self.user.clone(),
            created_at: timestamp::now(),
            size,
            uses_git,
        });
        self.index.merge_users();
        self.persist()?;

        let project = self
            .index
            .project(language, &request.resolved_folder_name())
            .ok_or_else(|| Error::NotFound(format!("project '{}' vanished", request.name)))?;
        info!(project = %project, "project created");
        Ok(project)
    }

    /// Recursively delete the project `(language, folder_name)` and stop tracking it.
    ///
    /// Nothing happens unless `confirmation` is affirmed twice.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidName`] if `language` or `folder_name` is not a single
    ///   path component
    /// - [`Error::NotFound`] if no such project is tracked
    /// - [`Error::Io`] if the directory cannot be removed (the index is not
    ///   updated) or the index cannot be persisted
    pub fn delete_project(
        &mut self,
        language: &str,
        folder_name: &str,
        confirmation: Confirmation,
        strategy: RemovalStrategy,
    ) -> Result<Deletion> {
        validate_name(language)?;
        validate_name(folder_name)?;
        let path = self
            .index
            .project(language, folder_name)
            .map(|p| p.path(&self.layout))
            .ok_or_else(|| {
                Error::NotFound(format!("project '{language}/{folder_name}' is not tracked"))
            })?;

        if !confirmation.is_affirmed() {
            info!(language, folder_name, "project deletion aborted");
            return Ok(Deletion::Aborted);
        }

        if self.fs.exists(&path) {
            self.fs
                .remove_tree(&path, strategy)
                .with_path("remove project directory", &path)?;
            info!(path = %path.display(), ?strategy, "removed project directory");
        } else {
            warn!(path = %path.display(), "project directory already gone");
        }

        self.index.remove_project(language, folder_name);
        self.persist()?;
        Ok(Deletion::Removed)
    }

    /// Copy the contents of `source` into a new template `<language>/<name>`.
    /// Returns the number of files copied.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidName`] if `language` or `name` is not a single path component
    /// - [`Error::NotFound`] if the language is not tracked or `source` is not a directory
    /// - [`Error::Conflict`] if the template already exists or would end up
    ///   inside `source`
    /// - [`Error::Io`] if copying fails; the partial template is removed
    pub fn add_template(&self, language: &str, name: &str, source: &Path) -> Result<u64> {
        validate_name(language)?;
        validate_name(name)?;
        if !self.index.has_language(language) {
            return Err(Error::NotFound(format!(
                "language '{language}' is not tracked"
            )));
        }

        match self.fs.is_empty_dir(source) {
            Ok(_) => {}
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
                ) =>
            {
                return Err(Error::NotFound(format!(
                    "{} is not a directory",
                    source.display()
                )));
            }
            Err(e) => return Err(Error::io("read template source", source, e)),
        }

        let target = self.layout.template_dir(language, name);
        if self.fs.exists(&target) {
            return Err(Error::Conflict(format!(
                "template '{language}/{name}' already exists"
            )));
        }

        let source_dir = self
            .fs
            .canonicalize(source)
            .with_path("resolve template source", source)?;
        if self.resolve(&target).starts_with(&source_dir) {
            return Err(Error::Conflict(format!(
                "template '{language}/{name}' would be created inside its source {}",
                source.display()
            )));
        }

        self.fs
            .create_dir_all(&target)
            .with_path("create template directory", &target)?;
        let copied = match self.fs.copy_dir_contents(source, &target) {
            Ok(copied) => copied,
            Err(e) => {
                if let Err(cleanup) = self.fs.remove_tree(&target, RemovalStrategy::Permanent) {
                    warn!(path = %target.display(), error = %cleanup, "failed to roll back template directory");
                }
                return Err(Error::io("copy template from", source, e));
            }
        };

        info!(template = %format!("{language}/{name}"), files = copied, "template added");
        Ok(copied)
    }

    /// Recursively delete the template `<language>/<name>`.
    ///
    /// Nothing happens unless `confirmation` is affirmed twice.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if the template does not exist
    /// - [`Error::Io`] if it cannot be removed
    pub fn remove_template(
        &self,
        language: &str,
        name: &str,
        confirmation: Confirmation,
        strategy: RemovalStrategy,
    ) -> Result<Deletion> {
        validate_name(language)?;
        validate_name(name)?;
        let target = self.layout.template_dir(language, name);
        if !self.fs.exists(&target) {
            return Err(Error::NotFound(format!(
                "template '{language}/{name}' does not exist"
            )));
        }

        if !confirmation.is_affirmed() {
            info!(language, name, "template removal aborted");
            return Ok(Deletion::Aborted);
        }

        self.fs
            .remove_tree(&target, strategy)
            .with_path("remove template directory", &target)?;
        info!(path = %target.display(), ?strategy, "removed template directory");
        Ok(Deletion::Removed)
    }

    /// Every template under the template root, sorted by language then name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if part of the template tree cannot be listed.
    pub fn templates(&self) -> Result<Vec<Template>> {
        let root = self.layout.templates_root();
        if !self.fs.exists(root) {
            return Ok(Vec::new());
        }

        let mut templates = Vec::new();
        for language in self
            .fs
            .list_subdirectories(root)
            .with_path("list templates in", root)?
            .into_iter()
            .filter(|language| validate_name(language).is_ok())
        {
            templates.extend(self.templates_for(&language)?);
        }
        Ok(templates)
    }

    /// Templates available for `language`, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidName`] if `language` is not a single path
    /// component and [`Error::Io`] if its template directory cannot be listed.
    pub fn templates_for(&self, language: &str) -> Result<Vec<Template>> {
        validate_name(language)?;
        let dir = self.layout.template_language_dir(language);
        if !self.fs.exists(&dir) {
            return Ok(Vec::new());
        }

        Ok(self
            .fs
            .list_subdirectories(&dir)
            .with_path("list templates in", &dir)?
            .into_iter()
            .map(|name| Template {
                language: language.to_string(),
                name,
            })
            .collect())
    }

    /// Canonical form of `path`, which need not exist yet: the deepest
    /// existing ancestor is resolved and the remaining components appended.
    fn resolve(&self, path: &Path) -> PathBuf {
        let mut missing = Vec::new();
        let mut current = path;
        loop {
            if let Ok(base) = self.fs.canonicalize(current) {
                return missing.iter().rev().fold(base, |acc, part| acc.join(part));
            }
            match (current.parent(), current.file_name()) {
                (Some(parent), Some(part)) => {
                    missing.push(part);
                    current = parent;
                }
                _ => return path.to_path_buf(),
            }
        }
    }

    fn language_dirs(&self, name: &str) -> [PathBuf; 2] {
        [
            self.layout.language_dir(name),
            self.layout.template_language_dir(name),
        ]
    }

    fn populate(&self, path: &Path, template: Option<&Path>, init_git: bool) -> Result<(u64, bool)> {
        if let Some(template) = template {
            let copied = self
                .fs
                .copy_dir_contents(template, path)
                .with_path("copy template from", template)?;
            info!(template = %template.display(), files = copied, "applied template");
        }
        if init_git {
            self.fs
                .init_version_control(path)
                .with_path("initialise git repository in", path)?;
        }

        let size = self.fs.dir_size(path).with_path("measure", path)?;
        Ok((size, self.fs.uses_version_control(path)))
    }

    fn persist(&self) -> Result<()> {
        self.store.persist(&self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::fs::{MemoryFs, Prober};
    use tempfile::TempDir;

    const ROOT: &str = "/home/dev/projects";
    const TEMPLATES: &str = "/home/dev/templates";

    struct Fixture {
        _temp: TempDir,
        store: IndexStore,
    }

    impl Fixture {
        fn new() -> Self {
            let temp = TempDir::new().unwrap();
            let store = IndexStore::new(temp.path().join("devmap.json"));
            Self { _temp: temp, store }
        }

        fn with_index(index: &Index) -> Self {
            let fixture = Self::new();
            fixture.store.persist(index).unwrap();
            fixture
        }

        fn open(&self, fs: MemoryFs) -> DevMap<MemoryFs> {
            DevMap::open_as(self.store.clone(), Layout::new(ROOT, TEMPLATES), fs, "tester")
                .unwrap()
                .0
        }

        fn persisted(&self) -> Index {
            self.store.load().unwrap()
        }
    }

    fn root(rel: &str) -> PathBuf {
        Path::new(ROOT).join(rel)
    }

    fn tpl(rel: &str) -> PathBuf {
        Path::new(TEMPLATES).join(rel)
    }

    fn tree() -> MemoryFs {
        let fs = MemoryFs::new();
        fs.add_dir(ROOT);
        fs
    }

    #[test]
    fn test_open_reconciles_and_persists() {
        let fs = tree();
        fs.add_file(root("Go/foo/main.go"), 42);
        let fixture = Fixture::new();

        let (devmap, report) =
            DevMap::open_as(fixture.store.clone(), Layout::new(ROOT, TEMPLATES), fs, "tester")
                .unwrap();

        assert_eq!(report.changes().count(), 2);
        assert_eq!(devmap.languages(), &[Language::new("Go")]);
        assert_eq!(devmap.users(), &["tester".to_string()]);
        drop(devmap);
        assert_eq!(fixture.persisted().projects.len(), 1);
        assert_eq!(fixture.persisted().projects[0].size, 42);
    }

    #[test]
    fn test_open_fails_on_malformed_index_without_touching_it() {
        let fixture = Fixture::new();
        std::fs::write(fixture.store.path(), "not json").unwrap();

        let err = DevMap::open_as(
            fixture.store.clone(),
            Layout::new(ROOT, TEMPLATES),
            tree(),
            "tester",
        )
        .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Parse);
        assert_eq!(
            std::fs::read_to_string(fixture.store.path()).unwrap(),
            "not json"
        );
    }

    #[test]
    fn test_create_language_creates_both_directories() {
        let fixture = Fixture::new();
        let mut devmap = fixture.open(tree());

        assert_eq!(devmap.create_language("Rust").unwrap(), LanguageOutcome::Created);
        assert_eq!(
            devmap.create_language("Rust").unwrap(),
            LanguageOutcome::AlreadyTracked
        );

        assert!(devmap.fs().is_dir(root("Rust")));
        assert!(devmap.fs().is_dir(tpl("Rust")));
        assert_eq!(fixture.persisted().languages, vec![Language::new("Rust")]);
    }

    #[test]
    fn test_create_language_keeps_existing_template_directory() {
        let fs = tree();
        fs.add_file(tpl("Rust/cli/Cargo.toml"), 9);
        let fixture = Fixture::new();
        let mut devmap = fixture.open(fs);

        devmap.create_language("Rust").unwrap();

        assert!(devmap.fs().is_file(tpl("Rust/cli/Cargo.toml")));
        assert!(devmap.index().has_language("Rust"));
    }

    #[test]
    fn test_create_language_rejects_path_like_names() {
        let fixture = Fixture::new();
        let mut devmap = fixture.open(tree());

        let err = devmap.create_language("../escape").unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidName);
        assert!(devmap.languages().is_empty());
    }

    #[test]
    fn test_create_language_failure_leaves_index_unchanged() {
        let fs = tree();
        fs.fail_on(tpl("Rust"));
        let fixture = Fixture::new();
        let mut devmap = fixture.open(fs);

        let err = devmap.create_language("Rust").unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(!devmap.index().has_language("Rust"));
        assert!(fixture.persisted().languages.is_empty());
    }

    #[test]
    fn test_delete_language_with_files_is_conflict() {
        let fs = tree();
        fs.add_file(root("Java/Main.java"), 10);
        let fixture = Fixture::new();
        let mut devmap = fixture.open(fs);
        let before = fixture.persisted();

        let err = devmap.delete_language("Java").unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(devmap.fs().is_file(root("Java/Main.java")));
        assert!(devmap.index().has_language("Java"));
        assert_eq!(fixture.persisted(), before);
    }

    #[test]
    fn test_delete_language_with_templates_is_conflict() {
        let fs = tree();
        fs.add_dir(root("Java"));
        fs.add_dir(tpl("Java/spring"));
        let fixture = Fixture::new();
        let mut devmap = fixture.open(fs);

        let err = devmap.delete_language("Java").unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(devmap.fs().is_dir(root("Java")));
        assert!(devmap.fs().is_dir(tpl("Java/spring")));
    }

    #[test]
    fn test_delete_empty_language() {
        let fixture = Fixture::new();
        let mut devmap = fixture.open(tree());
        devmap.create_language("Zig").unwrap();

        devmap.delete_language("Zig").unwrap();

        assert!(!devmap.fs().exists(&root("Zig")));
        assert!(!devmap.fs().exists(&tpl("Zig")));
        assert!(fixture.persisted().languages.is_empty());
    }

    #[test]
    fn test_delete_language_without_template_directory() {
        let fs = tree();
        fs.add_dir(root("Zig"));
        let fixture = Fixture::new();
        let mut devmap = fixture.open(fs);

        devmap.delete_language("Zig").unwrap();

        assert!(devmap.languages().is_empty());
    }

    #[test]
    fn test_delete_untracked_language_is_not_found() {
        let fixture = Fixture::new();
        let mut devmap = fixture.open(tree());

        assert_eq!(
            devmap.delete_language("Nope").unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn test_delete_language_io_failure_keeps_index() {
        let fixture = Fixture::new();
        let mut devmap = fixture.open(tree());
        devmap.create_language("Zig").unwrap();
        devmap.fs().fail_on(tpl("Zig"));

        let err = devmap.delete_language("Zig").unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(devmap.index().has_language("Zig"));
        assert_eq!(fixture.persisted().languages, vec![Language::new("Zig")]);
    }

    #[test]
    fn test_create_project_from_template_with_git() {
        let fs = tree();
        fs.add_dir(root("C++"));
        fs.add_file(tpl("C++/console/src/App.cpp"), 40);
        fs.add_file(tpl("C++/console/CMakeLists.txt"), 60);
        let fixture = Fixture::new();
        let mut devmap = fixture.open(fs);

        let mut request = NewProject::new("Sample Console App", "C++");
        request.init_git = true;
        request.template = Some("console".to_string());
        let project = devmap.create_project(&request).unwrap().clone();

        assert_eq!(project.folder_name, "sample-console-app");
        assert_eq!(project.created_by, "tester");
        assert!(project.uses_git);
        assert_eq!(project.size, 121);
        assert!(devmap.fs().is_file(root("C++/sample-console-app/src/App.cpp")));
        assert_eq!(fixture.persisted().projects, vec![project]);
    }

    #[test]
    fn test_create_project_with_explicit_folder() {
        let fs = tree();
        fs.add_dir(root("Rust"));
        let fixture = Fixture::new();
        let mut devmap = fixture.open(fs);

        let mut request = NewProject::new("Tool", "Rust");
        request.folder_name = Some("tool-rs".to_string());
        devmap.create_project(&request).unwrap();

        assert!(devmap.fs().is_dir(root("Rust/tool-rs")));
        assert_eq!(devmap.projects()[0].size, 0);
        assert!(!devmap.projects()[0].uses_git);
    }

    #[test]
    fn test_create_project_preconditions() {
        let fs = tree();
        fs.add_dir(root("Rust/taken"));
        let fixture = Fixture::new();
        let mut devmap = fixture.open(fs);

        let untracked = NewProject::new("App", "Go");
        assert_eq!(
            devmap.create_project(&untracked).unwrap_err().kind(),
            ErrorKind::NotFound
        );

        let mut missing_template = NewProject::new("App", "Rust");
        missing_template.template = Some("nope".to_string());
        assert_eq!(
            devmap.create_project(&missing_template).unwrap_err().kind(),
            ErrorKind::NotFound
        );
        assert!(!devmap.fs().exists(&root("Rust/app")));

        let duplicate = NewProject::new("Taken", "Rust");
        assert_eq!(
            devmap.create_project(&duplicate).unwrap_err().kind(),
            ErrorKind::Conflict
        );

        let unnamed = NewProject::new("!!!", "Rust");
        assert_eq!(
            devmap.create_project(&unnamed).unwrap_err().kind(),
            ErrorKind::InvalidName
        );
        assert_eq!(devmap.projects().len(), 1);
    }

    #[test]
    fn test_create_project_rejects_untracked_directory_on_disk() {
        let fs = tree();
        fs.add_dir(root("Rust"));
        let fixture = Fixture::new();
        let mut devmap = fixture.open(fs);
        devmap.fs().add_dir(root("Rust/late"));

        let err = devmap.create_project(&NewProject::new("Late", "Rust")).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(devmap.projects().is_empty());
    }

    #[test]
    fn test_create_project_rolls_back_on_template_failure() {
        let fs = tree();
        fs.add_dir(root("Rust"));
        fs.add_file(tpl("Rust/bin/main.rs"), 5);
        let fixture = Fixture::new();
        let mut devmap = fixture.open(fs);
        devmap.fs().fail_on(tpl("Rust/bin"));

        let mut request = NewProject::new("App", "Rust");
        request.init_git = true;
        request.template = Some("bin".to_string());
        let err = devmap.create_project(&request).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(!devmap.fs().exists(&root("Rust/app")));
        assert!(devmap.projects().is_empty());
        assert!(fixture.persisted().projects.is_empty());
    }

    #[test]
    fn test_find_and_delete_project_by_identity() {
        let fs = tree();
        fs.add_file(root("Rust/tool/a"), 1);
        fs.add_file(root("Rust/tool-v2/b"), 2);
        let fixture = Fixture::new();
        let mut devmap = fixture.open(fs);
        devmap.index.projects[1].name = "tool".to_string();

        assert_eq!(devmap.find_projects("tool").len(), 2);

        let outcome = devmap
            .delete_project("Rust", "tool-v2", Confirmation::granted(), RemovalStrategy::Permanent)
            .unwrap();

        assert_eq!(outcome, Deletion::Removed);
        assert!(devmap.fs().exists(&root("Rust/tool")));
        assert!(!devmap.fs().exists(&root("Rust/tool-v2")));
        assert_eq!(fixture.persisted().projects.len(), 1);
        assert_eq!(fixture.persisted().projects[0].folder_name, "tool");
    }

    #[test]
    fn test_delete_project_requires_double_confirmation() {
        let fs = tree();
        fs.add_file(root("Rust/keep/a"), 1);
        let fixture = Fixture::new();
        let mut devmap = fixture.open(fs);

        for confirmation in [
            Confirmation::default(),
            Confirmation::new(true, false),
            Confirmation::new(false, true),
        ] {
            let outcome = devmap
                .delete_project("Rust", "keep", confirmation, RemovalStrategy::Permanent)
                .unwrap();
            assert_eq!(outcome, Deletion::Aborted);
        }

        assert!(devmap.fs().is_file(root("Rust/keep/a")));
        assert_eq!(devmap.projects().len(), 1);
    }

    #[test]
    fn test_delete_project_failure_keeps_index() {
        let fs = tree();
        fs.add_file(root("Rust/stuck/a"), 1);
        let fixture = Fixture::new();
        let mut devmap = fixture.open(fs);
        devmap.fs().fail_on(root("Rust/stuck"));

        let err = devmap
            .delete_project("Rust", "stuck", Confirmation::granted(), RemovalStrategy::Trash)
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Io);
        assert_eq!(fixture.persisted().projects.len(), 1);
    }

    #[test]
    fn test_delete_unknown_project_is_not_found() {
        let fixture = Fixture::new();
        let mut devmap = fixture.open(tree());

        let err = devmap
            .delete_project("Rust", "ghost", Confirmation::granted(), RemovalStrategy::Permanent)
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_delete_project_rejects_names_outside_the_language() {
        let fs = tree();
        fs.add_file(root("Go/real/main.go"), 12);
        let fixture = Fixture::new();
        let mut devmap = fixture.open(fs);

        for (language, folder) in [("Go", ""), ("Go", ".."), ("Go", "real/.."), ("..", "Go")] {
            let err = devmap
                .delete_project(language, folder, Confirmation::granted(), RemovalStrategy::Permanent)
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidName);
        }

        assert!(devmap.fs().is_file(root("Go/real/main.go")));
        assert_eq!(devmap.projects().len(), 1);
    }

    #[test]
    fn test_open_drops_records_pointing_outside_their_language() {
        let fs = tree();
        fs.add_file(root("Go/real/main.go"), 12);
        let mut index = Index {
            languages: vec![Language::new("Go")],
            ..Index::default()
        };
        for folder in ["", ".."] {
            index.projects.push(Project {
                name: "broken".to_string(),
                folder_name: folder.to_string(),
                language: "Go".to_string(),
                created_by: "ann".to_string(),
                created_at: timestamp::now(),
                size: 0,
                uses_git: false,
            });
        }
        let fixture = Fixture::with_index(&index);

        let mut devmap = fixture.open(fs);

        assert_eq!(devmap.projects().len(), 1);
        assert_eq!(devmap.projects()[0].folder_name, "real");
        assert_eq!(devmap.projects()[0].size, 12);
        assert_eq!(fixture.persisted().projects.len(), 1);

        let err = devmap
            .delete_project("Go", "", Confirmation::granted(), RemovalStrategy::Permanent)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidName);
        assert!(devmap.fs().is_dir(root("Go/real")));
    }

    #[test]
    fn test_add_and_list_templates() {
        let fs = tree();
        fs.add_dir(root("Rust"));
        fs.add_file("/src/skeleton/Cargo.toml", 30);
        fs.add_file("/src/skeleton/src/main.rs", 12);
        let fixture = Fixture::new();
        let devmap = fixture.open(fs);

        let copied = devmap
            .add_template("Rust", "bin", Path::new("/src/skeleton"))
            .unwrap();

        assert_eq!(copied, 2);
        assert!(devmap.fs().is_file(tpl("Rust/bin/src/main.rs")));
        let names: Vec<String> = devmap.templates().unwrap().iter().map(ToString::to_string).collect();
        assert_eq!(names, vec!["Rust/bin"]);
        assert_eq!(devmap.templates_for("Rust").unwrap().len(), 1);
        assert!(devmap.templates_for("Go").unwrap().is_empty());
        assert_eq!(fixture.persisted(), *devmap.index());
    }

    #[test]
    fn test_add_template_preconditions() {
        let fs = tree();
        fs.add_dir(root("Rust"));
        fs.add_dir(tpl("Rust/bin"));
        fs.add_file("/src/file.txt", 1);
        fs.add_dir("/src/dir");
        let fixture = Fixture::new();
        let devmap = fixture.open(fs);

        let kind = |lang: &str, name: &str, source: &str| {
            devmap
                .add_template(lang, name, Path::new(source))
                .unwrap_err()
                .kind()
        };

        assert_eq!(kind("Go", "x", "/src/dir"), ErrorKind::NotFound);
        assert_eq!(kind("Rust", "x", "/src/missing"), ErrorKind::NotFound);
        assert_eq!(kind("Rust", "x", "/src/file.txt"), ErrorKind::NotFound);
        assert_eq!(kind("Rust", "bin", "/src/dir"), ErrorKind::Conflict);
        assert_eq!(kind("Rust", "a/b", "/src/dir"), ErrorKind::InvalidName);
    }

    #[test]
    fn test_add_template_refuses_source_containing_the_template() {
        let fs = tree();
        fs.add_dir(root("Rust"));
        fs.add_file(tpl("Rust/bin/Cargo.toml"), 10);
        fs.add_file("/home/dev/templates-old/Cargo.toml", 10);
        let fixture = Fixture::new();
        let devmap = fixture.open(fs);

        for source in [tpl("Rust"), PathBuf::from(TEMPLATES), PathBuf::from("/home/dev")] {
            let err = devmap.add_template("Rust", "copy", &source).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Conflict);
        }
        assert!(!devmap.fs().exists(&tpl("Rust/copy")));

        let copied = devmap
            .add_template("Rust", "old", Path::new("/home/dev/templates-old"))
            .unwrap();
        assert_eq!(copied, 1);
    }

    #[test]
    fn test_remove_template() {
        let fs = tree();
        fs.add_file(tpl("Rust/bin/main.rs"), 3);
        let fixture = Fixture::new();
        let devmap = fixture.open(fs);

        let aborted = devmap
            .remove_template("Rust", "bin", Confirmation::new(true, false), RemovalStrategy::Permanent)
            .unwrap();
        assert_eq!(aborted, Deletion::Aborted);
        assert!(devmap.fs().exists(&tpl("Rust/bin")));

        let removed = devmap
            .remove_template("Rust", "bin", Confirmation::granted(), RemovalStrategy::Permanent)
            .unwrap();
        assert_eq!(removed, Deletion::Removed);
        assert!(!devmap.fs().exists(&tpl("Rust/bin")));

        assert_eq!(
            devmap
                .remove_template("Rust", "bin", Confirmation::granted(), RemovalStrategy::Permanent)
                .unwrap_err()
                .kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn test_reconcile_after_external_changes() {
        let fs = tree();
        fs.add_dir(root("Rust/old"));
        let fixture = Fixture::new();
        let mut devmap = fixture.open(fs);
        devmap.fs().remove(root("Rust/old"));
        devmap.fs().add_file(root("Rust/new/x"), 4);

        let report = devmap.reconcile().unwrap();

        assert_eq!(report.changes().count(), 2);
        let persisted = fixture.persisted();
        assert_eq!(persisted.projects.len(), 1);
        assert_eq!(persisted.projects[0].folder_name, "new");
    }

    #[test]
    fn test_legacy_users_survive() {
        let index = Index {
            users: vec!["legacy".to_string()],
            ..Index::default()
        };
        let fixture = Fixture::with_index(&index);
        let fs = tree();
        fs.add_dir(root("Rust/app"));

        let devmap = fixture.open(fs);

        assert_eq!(devmap.users(), &["legacy".to_string(), "tester".to_string()]);
    }

    #[test]
    fn test_confirmation() {
        assert!(Confirmation::granted().is_affirmed());
        assert!(!Confirmation::new(true, false).is_affirmed());
        assert!(!Confirmation::default().is_affirmed());
    }
}
