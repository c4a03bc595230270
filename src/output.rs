//! Human-readable tables and structured JSON output.
//!
//! Listings render as plain aligned tables with a bold header row. When the
//! `--json` flag is passed, the serializable structures below are printed to
//! stdout instead, replacing all human-readable output.

use std::collections::BTreeMap;

use colored::Colorize;
use humansize::{DECIMAL, format_size};
use serde::Serialize;

use crate::{
    index::{Index, Language, Project, timestamp},
    layout::Layout,
    manager::Template,
    reconcile::{SyncEvent, SyncReport},
};

/// A single project entry in the JSON output.
#[derive(Serialize, Debug)]
pub struct JsonProject {
    pub name: String,
    pub folder_name: String,
    pub language: String,
    pub created_by: String,

    /// `HH:MM DD-MM-YYYY`, as stored in the index.
    pub created_at: String,

    /// Absolute path to the project directory.
    pub path: String,

    pub size: u64,

    /// Human-readable formatted size (e.g. `"1.23 MB"`).
    pub size_formatted: String,

    pub git: bool,
}

/// JSON document for `list projects --json`.
#[derive(Serialize, Debug)]
pub struct JsonProjects {
    pub projects: Vec<JsonProject>,
    pub summary: JsonSummary,
}

/// Aggregated summary across the listed projects.
#[derive(Serialize, Debug)]
pub struct JsonSummary {
    pub total_projects: usize,
    pub total_size: u64,
    pub total_size_formatted: String,

    /// Per-language breakdown (key is the language name).
    pub by_language: BTreeMap<String, JsonLanguageSummary>,
}

/// Per-language count and size.
#[derive(Serialize, Debug)]
pub struct JsonLanguageSummary {
    pub count: usize,
    pub size: u64,
    pub size_formatted: String,
}

/// JSON document for `sync --json`.
#[derive(Serialize, Debug)]
pub struct JsonSyncReport {
    /// Whether the index already matched the filesystem.
    pub clean: bool,
    pub changes: Vec<String>,
    pub failures: Vec<String>,
}

impl JsonProject {
    #[must_use]
    pub fn from_project(project: &Project, layout: &Layout) -> Self {
        Self {
            name: project.name.clone(),
            folder_name: project.folder_name.clone(),
            language: project.language.clone(),
            created_by: project.created_by.clone(),
            created_at: timestamp::format(&project.created_at),
            path: project.path(layout).display().to_string(),
            size: project.size,
            size_formatted: format_size(project.size, DECIMAL),
            git: project.uses_git,
        }
    }
}

impl JsonProjects {
    #[must_use]
    pub fn new(projects: &[Project], layout: &Layout) -> Self {
        Self {
            projects: projects
                .iter()
                .map(|p| JsonProject::from_project(p, layout))
                .collect(),
            summary: JsonSummary::from_projects(projects),
        }
    }
}

impl JsonSummary {
    /// Compute summary statistics from a slice of projects.
    #[must_use]
    pub fn from_projects(projects: &[Project]) -> Self {
        let mut by_language: BTreeMap<String, (usize, u64)> = BTreeMap::new();
        for project in projects {
            let entry = by_language.entry(project.language.clone()).or_insert((0, 0));
            entry.0 += 1;
            entry.1 += project.size;
        }

        let total_size: u64 = projects.iter().map(|p| p.size).sum();

        Self {
            total_projects: projects.len(),
            total_size,
            total_size_formatted: format_size(total_size, DECIMAL),
            by_language: by_language
                .into_iter()
                .map(|(language, (count, size))| {
                    (
                        language,
                        JsonLanguageSummary {
                            count,
                            size,
                            size_formatted: format_size(size, DECIMAL),
                        },
                    )
                })
                .collect(),
        }
    }
}

impl JsonSyncReport {
    #[must_use]
    pub fn from_report(report: &SyncReport) -> Self {
        Self {
            clean: report.is_clean(),
            changes: report.changes().map(ToString::to_string).collect(),
            failures: report.failures().map(ToString::to_string).collect(),
        }
    }
}

/// A left-aligned text table.
struct Table {
    headers: Vec<&'static str>,
    rows: Vec<Vec<String>>,
}

impl Table {
    fn new(headers: Vec<&'static str>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    fn render(&self) -> String {
        let widths: Vec<usize> = self
            .headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(i))
                    .map(|cell| cell.chars().count())
                    .chain(std::iter::once(header.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let pad = |cell: &str, width: usize| {
            let fill = width.saturating_sub(cell.chars().count());
            format!("{cell}{}", " ".repeat(fill))
        };

        let header = self
            .headers
            .iter()
            .zip(&widths)
            .map(|(h, w)| pad(h, *w).bold().to_string())
            .collect::<Vec<_>>()
            .join("  ");
        let rule = widths
            .iter()
            .map(|w| "─".repeat(*w))
            .collect::<Vec<_>>()
            .join("  ");

        let mut lines = vec![header.trim_end().to_string(), rule.dimmed().to_string()];
        for row in &self.rows {
            let line = row
                .iter()
                .zip(&widths)
                .map(|(cell, w)| pad(cell, *w))
                .collect::<Vec<_>>()
                .join("  ");
            lines.push(line.trim_end().to_string());
        }
        lines.join("\n")
    }
}

/// Languages with their project count and combined size.
#[must_use]
pub fn languages_table(index: &Index) -> String {
    let mut table = Table::new(vec!["Language", "Projects", "Size"]);
    for language in &index.languages {
        let (count, size) = index
            .projects_in(language.name())
            .fold((0usize, 0u64), |(c, s), p| (c + 1, s + p.size));
        table.push(vec![
            language.name().to_string(),
            count.to_string(),
            format_size(size, DECIMAL),
        ]);
    }
    table.render()
}

/// Projects, either brief (creator, name, language) or with every field.
#[must_use]
pub fn projects_table(projects: &[Project], detailed: bool) -> String {
    let mut table = if detailed {
        Table::new(vec![
            "Created by",
            "Name",
            "Language",
            "Folder",
            "Created at",
            "Size",
            "Git",
        ])
    } else {
        Table::new(vec!["Created by", "Name", "Language"])
    };

    for project in projects {
        let mut row = vec![
            project.created_by.clone(),
            project.name.clone(),
            project.language.clone(),
        ];
        if detailed {
            row.extend([
                project.folder_name.clone(),
                timestamp::format(&project.created_at),
                format_size(project.size, DECIMAL),
                if project.uses_git { "yes" } else { "no" }.to_string(),
            ]);
        }
        table.push(row);
    }
    table.render()
}

#[must_use]
pub fn users_table(users: &[String]) -> String {
    let mut table = Table::new(vec!["User"]);
    for user in users {
        table.push(vec![user.clone()]);
    }
    table.render()
}

#[must_use]
pub fn templates_table(templates: &[Template]) -> String {
    let mut table = Table::new(vec!["Language", "Template"]);
    for template in templates {
        table.push(vec![template.language.clone(), template.name.clone()]);
    }
    table.render()
}

/// One-line summary printed under a project listing.
#[must_use]
pub fn projects_summary(projects: &[Project], languages: &[Language]) -> String {
    let total: u64 = projects.iter().map(|p| p.size).sum();
    format!(
        "  💾 {} projects in {} languages, {} in total",
        projects.len().to_string().bright_white(),
        languages.len().to_string().bright_white(),
        format_size(total, DECIMAL).bright_green().bold()
    )
}

/// Print every reconciliation decision, colored by kind.
pub fn print_report(report: &SyncReport) {
    for event in &report.events {
        let line = event.to_string();
        match event {
            SyncEvent::LanguageAdopted { .. } | SyncEvent::ProjectAdopted { .. } => {
                println!("  {} {}", "+".green(), line.green());
            }
            SyncEvent::LanguageDropped { .. }
            | SyncEvent::ProjectDropped { .. }
            | SyncEvent::EntryRejected { .. } => {
                println!("  {} {}", "-".yellow(), line.yellow());
            }
            SyncEvent::MetricsSkipped { .. }
            | SyncEvent::ListingSkipped { .. }
            | SyncEvent::NameSkipped { .. } => {
                eprintln!("  {} {}", "!".red(), line.red());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(language: &str, folder: &str, size: u64) -> Project {
        Project {
            name: folder.to_uppercase(),
            folder_name: folder.to_string(),
            language: language.to_string(),
            created_by: "ann".to_string(),
            created_at: timestamp::parse("09:05 03-04-2025").unwrap(),
            size,
            uses_git: size > 1000,
        }
    }

    fn plain(rendered: &str) -> Vec<String> {
        rendered
            .lines()
            .map(|l| {
                // strip ANSI escapes if colors are forced on
                let mut out = String::new();
                let mut chars = l.chars();
                while let Some(c) = chars.next() {
                    if c == '\u{1b}' {
                        for c in chars.by_ref() {
                            if c == 'm' {
                                break;
                            }
                        }
                    } else {
                        out.push(c);
                    }
                }
                out
            })
            .collect()
    }

    #[test]
    fn test_brief_projects_table() {
        let lines = plain(&projects_table(&[project("Rust", "cli", 10)], false));

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Created by  Name  Language");
        assert_eq!(lines[2], "ann         CLI   Rust");
    }

    #[test]
    fn test_detailed_projects_table() {
        let lines = plain(&projects_table(&[project("Go", "srv", 2000)], true));

        assert!(lines[0].contains("Created at"));
        assert!(lines[2].contains("09:05 03-04-2025"));
        assert!(lines[2].contains(&format_size(2000u64, DECIMAL)));
        assert!(lines[2].ends_with("yes"));
    }

    #[test]
    fn test_languages_table_aggregates_projects() {
        let mut index = Index::default();
        index.add_language("Rust");
        index.add_language("Go");
        index.projects.push(project("Rust", "a", 1000));
        index.projects.push(project("Rust", "b", 500));

        let lines = plain(&languages_table(&index));

        assert!(lines[2].starts_with("Rust"));
        assert!(lines[2].contains("  2  "));
        assert!(lines[2].ends_with(&format_size(1500u64, DECIMAL)));
        assert!(lines[3].starts_with("Go"));
        assert!(lines[3].ends_with(&format_size(0u64, DECIMAL)));
    }

    #[test]
    fn test_templates_and_users_tables() {
        let templates = vec![Template {
            language: "C++".to_string(),
            name: "console".to_string(),
        }];

        assert_eq!(plain(&templates_table(&templates))[2], "C++       console");
        assert_eq!(plain(&users_table(&["ann".to_string()]))[2], "ann");
    }

    #[test]
    fn test_json_projects_summary() {
        let layout = Layout::new("/dev", "/tpl");
        let projects = vec![project("Rust", "a", 1000), project("Go", "b", 24)];

        let value = serde_json::to_value(JsonProjects::new(&projects, &layout)).unwrap();

        assert_eq!(value["projects"][0]["path"], "/dev/Rust/a");
        assert_eq!(value["projects"][0]["created_at"], "09:05 03-04-2025");
        assert_eq!(value["summary"]["total_projects"], 2);
        assert_eq!(value["summary"]["total_size"], 1024);
        assert_eq!(value["summary"]["by_language"]["Go"]["count"], 1);
    }

    #[test]
    fn test_json_sync_report() {
        let report = SyncReport {
            events: vec![
                SyncEvent::LanguageAdopted {
                    language: "Go".to_string(),
                },
                SyncEvent::ListingSkipped {
                    language: "C".to_string(),
                    reason: "denied".to_string(),
                },
            ],
        };

        let json = JsonSyncReport::from_report(&report);

        assert!(!json.clean);
        assert_eq!(json.changes, vec!["Added new language from filesystem: Go"]);
        assert_eq!(json.failures.len(), 1);
    }
}
