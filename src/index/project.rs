//! Tracked project records.

use std::{
    fmt::{Display, Formatter, Result},
    path::PathBuf,
};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::timestamp;
use crate::layout::Layout;

/// A project tracked in the index.
///
/// Identity is the pair `(language, folder_name)`; `name` is free text shown
/// to the user and may repeat.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Project {
    /// Display name.
    #[serde(default)]
    pub name: String,

    /// Directory name under the language directory.
    #[serde(rename = "folderName", default)]
    pub folder_name: String,

    /// Language the project is filed under (also its parent directory).
    #[serde(rename = "lang", default)]
    pub language: String,

    /// OS user that created or adopted the project.
    #[serde(default)]
    pub created_by: String,

    /// When the project was created or adopted.
    #[serde(with = "timestamp", default = "timestamp::now")]
    pub created_at: NaiveDateTime,

    /// Recursive size in bytes, refreshed on every reconciliation.
    #[serde(default)]
    pub size: u64,

    /// Whether a `.git` directory exists, refreshed on every reconciliation.
    #[serde(rename = "git", default)]
    pub uses_git: bool,
}

impl Project {
    /// Whether this record is the project `folder_name` filed under `language`.
    #[must_use]
    pub fn is(&self, language: &str, folder_name: &str) -> bool {
        self.language == language && self.folder_name == folder_name
    }

    /// Directory backing this project.
    #[must_use]
    pub fn path(&self, layout: &Layout) -> PathBuf {
        layout.project_dir(&self.language, &self.folder_name)
    }
}

impl Display for Project {
    /// `name (language/folder)`
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{} ({}/{})", self.name, self.language, self.folder_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};

    const RECORD: &str = r#"{
        "name": "DevCore Project Manager",
        "folderName": "DevCore-project-manager",
        "lang": "C++",
        "created_by": "Huplo",
        "created_at": "23:04 17-03-2025",
        "size": 25042,
        "git": true
    }"#;

    #[test]
    fn test_deserialize_record() {
        let project: Project = serde_json::from_str(RECORD).unwrap();

        assert_eq!(project.name, "DevCore Project Manager");
        assert_eq!(project.folder_name, "DevCore-project-manager");
        assert_eq!(project.language, "C++");
        assert_eq!(project.created_by, "Huplo");
        assert_eq!(
            project.created_at,
            NaiveDate::from_ymd_opt(2025, 3, 17)
                .unwrap()
                .and_hms_opt(23, 4, 0)
                .unwrap()
        );
        assert_eq!(project.size, 25042);
        assert!(project.uses_git);
    }

    #[test]
    fn test_serialize_uses_index_field_names() {
        let project: Project = serde_json::from_str(RECORD).unwrap();
        let value = serde_json::to_value(&project).unwrap();

        assert_eq!(value["folderName"], "DevCore-project-manager");
        assert_eq!(value["lang"], "C++");
        assert_eq!(value["created_at"], "23:04 17-03-2025");
        assert_eq!(value["git"], true);
        assert!(value.get("folder_name").is_none());
    }

    #[test]
    fn test_bad_or_missing_timestamp_falls_back_to_now() {
        let bad: Project =
            serde_json::from_str(r#"{"folderName": "a", "lang": "Go", "created_at": "soon"}"#)
                .unwrap();
        let missing: Project = serde_json::from_str(r#"{"folderName": "a", "lang": "Go"}"#).unwrap();
        let null: Project =
            serde_json::from_str(r#"{"folderName": "a", "lang": "Go", "created_at": null}"#)
                .unwrap();

        for project in [bad, missing, null] {
            assert_eq!(project.created_at.second(), 0);
            assert!(project.created_at <= timestamp::now());
        }
    }

    #[test]
    fn test_missing_fields_default() {
        let project: Project = serde_json::from_str(r#"{"lang": "Go"}"#).unwrap();

        assert_eq!(project.name, "");
        assert_eq!(project.folder_name, "");
        assert_eq!(project.size, 0);
        assert!(!project.uses_git);
    }

    #[test]
    fn test_identity_and_path() {
        let project: Project = serde_json::from_str(RECORD).unwrap();
        let layout = Layout::new("/dev", "/tpl");

        assert!(project.is("C++", "DevCore-project-manager"));
        assert!(!project.is("C", "DevCore-project-manager"));
        assert!(!project.is("C++", "DevCore Project Manager"));
        assert_eq!(
            project.path(&layout),
            PathBuf::from("/dev/C++/DevCore-project-manager")
        );
        assert_eq!(
            project.to_string(),
            "DevCore Project Manager (C++/DevCore-project-manager)"
        );
    }
}
