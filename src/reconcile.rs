//! Reconciliation of the index with the project tree on disk.
//!
//! [`reconcile`] brings an [`Index`] back in line with the filesystem in a
//! fixed sequence of passes:
//!
//! 1. drop languages whose directory is gone, or whose entry is unusable
//! 2. adopt language directories that are not tracked
//! 3. drop projects whose directory is gone, or whose entry is unusable
//! 4. refresh size and version-control flag of every surviving project
//! 5. adopt project directories that are not tracked
//! 6. rebuild the user list (creators merged with the legacy list)
//!
//! Nothing on disk is modified. Every adoption, drop and skipped entity is
//! recorded in the returned [`SyncReport`]. Projects are matched on
//! `(language, folder name)` only, never on their display name.
//!
//! An entry is unusable when a name is not a single path component (it would
//! point outside its own directory) or when it repeats an earlier entry.

use std::{
    collections::BTreeSet,
    fmt::{Display, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
};

use chrono::NaiveDateTime;
use tracing::{info, warn};

use crate::{
    error::{Error, IoContext, Result},
    fs::{Prober, Subdirectories},
    index::{Index, Project},
    layout::Layout,
    utils::validate_name,
};

/// Who and when to record for projects adopted during a pass.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Adoption {
    pub creator: String,
    pub created_at: NaiveDateTime,
}

impl Adoption {
    #[must_use]
    pub fn new(creator: impl Into<String>, created_at: NaiveDateTime) -> Self {
        Self {
            creator: creator.into(),
            created_at,
        }
    }
}

/// One decision taken during reconciliation.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum SyncEvent {
    /// A tracked language whose directory no longer exists was dropped.
    LanguageDropped { language: String, path: PathBuf },

    /// An untracked language directory was added.
    LanguageAdopted { language: String },

    /// A tracked project whose directory no longer exists was dropped.
    ProjectDropped {
        language: String,
        folder_name: String,
        path: PathBuf,
    },

    /// An untracked project directory was added.
    ProjectAdopted {
        language: String,
        folder_name: String,
    },

    /// Size or version-control status of a project could not be measured;
    /// the previously stored values were kept.
    MetricsSkipped {
        language: String,
        folder_name: String,
        reason: String,
    },

    /// A language directory could not be listed; no projects were adopted from it.
    ListingSkipped { language: String, reason: String },

    /// An index entry that cannot map to its own directory was dropped.
    EntryRejected { entry: String, reason: String },

    /// A directory whose name cannot be stored in the index was left untracked.
    NameSkipped { path: PathBuf, reason: String },
}

impl SyncEvent {
    /// Whether the event reports a failure rather than a change.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::MetricsSkipped { .. } | Self::ListingSkipped { .. } | Self::NameSkipped { .. }
        )
    }
}

impl Display for SyncEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::LanguageDropped { language, path } => write!(
                f,
                "Language '{language}' has been moved or deleted: {}",
                path.display()
            ),
            Self::LanguageAdopted { language } => {
                write!(f, "Added new language from filesystem: {language}")
            }
            Self::ProjectDropped { path, .. } => {
                write!(f, "Project '{}' has been moved or deleted", path.display())
            }
            Self::ProjectAdopted {
                language,
                folder_name,
            } => write!(
                f,
                "Added new project from filesystem: {folder_name} in {language}"
            ),
            Self::MetricsSkipped {
                language,
                folder_name,
                reason,
            } => write!(
                f,
                "Could not refresh size of {language}/{folder_name}: {reason}"
            ),
            Self::ListingSkipped { language, reason } => {
                write!(f, "Could not scan language '{language}' for projects: {reason}")
            }
            Self::EntryRejected { entry, reason } => {
                write!(f, "Dropped index entry '{entry}': {reason}")
            }
            Self::NameSkipped { path, reason } => {
                write!(f, "Skipped {}: {reason}", path.display())
            }
        }
    }
}

/// Everything a reconciliation pass decided, in order.
#[derive(Clone, PartialEq, Eq, Default, Debug)]
pub struct SyncReport {
    pub events: Vec<SyncEvent>,
}

impl SyncReport {
    /// Whether the index already matched the filesystem.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.events.is_empty()
    }

    /// Events that report per-entity failures.
    pub fn failures(&self) -> impl Iterator<Item = &SyncEvent> {
        self.events.iter().filter(|e| e.is_failure())
    }

    /// Events that changed the index.
    pub fn changes(&self) -> impl Iterator<Item = &SyncEvent> {
        self.events.iter().filter(|e| !e.is_failure())
    }

    fn record(&mut self, event: SyncEvent) {
        if event.is_failure() {
            warn!("{event}");
        } else {
            info!("{event}");
        }
        self.events.push(event);
    }
}

/// Reconcile `index` with the tree described by `layout`.
///
/// The index is updated in place; persisting it is up to the caller.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if the project root does not exist and
/// [`Error::Io`] if it cannot be listed. Failures concerning a single
/// language or project are recorded in the report instead.
pub fn reconcile<P: Prober + ?Sized>(
    index: &mut Index,
    layout: &Layout,
    prober: &P,
    adoption: &Adoption,
) -> Result<SyncReport> {
    let root = layout.projects_root();
    if !prober.exists(root) {
        return Err(Error::NotFound(format!(
            "project root {} does not exist",
            root.display()
        )));
    }
    let root_entries = prober
        .list_subdirectories(root)
        .with_path("list project root", root)?;

    let mut report = SyncReport::default();

    prune_languages(index, layout, prober, &mut report);
    let root_entries = usable_names(root, root_entries, &mut report);
    adopt_languages(index, root_entries, &mut report);
    prune_projects(index, layout, prober, &mut report);
    refresh_metrics(index, layout, prober, &mut report);
    adopt_projects(index, layout, prober, adoption, &mut report);
    index.merge_users();

    Ok(report)
}

fn prune_languages<P: Prober + ?Sized>(
    index: &mut Index,
    layout: &Layout,
    prober: &P,
    report: &mut SyncReport,
) {
    let mut seen = BTreeSet::new();
    index.languages.retain(|language| {
        let name = language.name();
        if let Err(e) = validate_name(name) {
            report.record(SyncEvent::EntryRejected {
                entry: name.to_string(),
                reason: e.to_string(),
            });
            return false;
        }
        if !seen.insert(name.to_string()) {
            report.record(SyncEvent::EntryRejected {
                entry: name.to_string(),
                reason: "duplicate language".to_string(),
            });
            return false;
        }

        let path = language.project_dir(layout);
        let keep = prober.exists(&path);
        if !keep {
            report.record(SyncEvent::LanguageDropped {
                language: language.name().to_string(),
                path,
            });
        }
        keep
    });
}

fn adopt_languages(index: &mut Index, entries: Vec<String>, report: &mut SyncReport) {
    for name in entries {
        if index.add_language(&name) {
            report.record(SyncEvent::LanguageAdopted { language: name });
        }
    }
}

fn prune_projects<P: Prober + ?Sized>(
    index: &mut Index,
    layout: &Layout,
    prober: &P,
    report: &mut SyncReport,
) {
    let mut seen = BTreeSet::new();
    index.projects.retain(|project| {
        let entry = format!("{}/{}", project.language, project.folder_name);
        if let Err(e) =
            validate_name(&project.language).and_then(|()| validate_name(&project.folder_name))
        {
            report.record(SyncEvent::EntryRejected {
                entry,
                reason: e.to_string(),
            });
            return false;
        }
        if !seen.insert((project.language.clone(), project.folder_name.clone())) {
            report.record(SyncEvent::EntryRejected {
                entry,
                reason: "duplicate project".to_string(),
            });
            return false;
        }

        let path = project.path(layout);
        let keep = prober.exists(&path);
        if !keep {
            report.record(SyncEvent::ProjectDropped {
                language: project.language.clone(),
                folder_name: project.folder_name.clone(),
                path,
            });
        }
        keep
    });
}

fn refresh_metrics<P: Prober + ?Sized>(
    index: &mut Index,
    layout: &Layout,
    prober: &P,
    report: &mut SyncReport,
) {
    for project in &mut index.projects {
        let path = project.path(layout);
        match prober.dir_size(&path) {
            Ok(size) => {
                project.size = size;
                project.uses_git = prober.uses_version_control(&path);
            }
            Err(e) => report.record(SyncEvent::MetricsSkipped {
                language: project.language.clone(),
                folder_name: project.folder_name.clone(),
                reason: e.to_string(),
            }),
        }
    }
}

fn adopt_projects<P: Prober + ?Sized>(
    index: &mut Index,
    layout: &Layout,
    prober: &P,
    adoption: &Adoption,
    report: &mut SyncReport,
) {
    let languages: Vec<String> = index
        .languages
        .iter()
        .map(|l| l.name().to_string())
        .collect();

    for language in languages {
        let dir = layout.language_dir(&language);
        let folders = match prober.list_subdirectories(&dir) {
            Ok(folders) => folders,
            Err(e) => {
                report.record(SyncEvent::ListingSkipped {
                    language,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        for folder_name in usable_names(&dir, folders, report) {
            if index.project(&language, &folder_name).is_some() {
                continue;
            }

            let path = layout.project_dir(&language, &folder_name);
            let size = match prober.dir_size(&path) {
                Ok(size) => size,
                Err(e) => {
                    report.record(SyncEvent::MetricsSkipped {
                        language: language.clone(),
                        folder_name: folder_name.clone(),
                        reason: e.to_string(),
                    });
                    0
                }
            };

            index.projects.push(Project {
                name: folder_name.clone(),
                folder_name: folder_name.clone(),
                language: language.clone(),
                created_by: adoption.creator.clone(),
                created_at: adoption.created_at,
                size,
                uses_git: prober.uses_version_control(&path),
            });
            report.record(SyncEvent::ProjectAdopted {
                language: language.clone(),
                folder_name,
            });
        }
    }
}

/// Names of `entries` that can be stored in the index. The rest are reported.
fn usable_names(parent: &Path, entries: Subdirectories, report: &mut SyncReport) -> Vec<String> {
    for path in entries.unnamed {
        report.record(SyncEvent::NameSkipped {
            path,
            reason: "name is not valid UTF-8".to_string(),
        });
    }

    entries
        .names
        .into_iter()
        .filter(|name| match validate_name(name) {
            Ok(()) => true,
            Err(e) => {
                report.record(SyncEvent::NameSkipped {
                    path: parent.join(name),
                    reason: e.to_string(),
                });
                false
            }
        })
        .collect()
}
