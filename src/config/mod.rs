//! Configuration for the tool.
//!
//! [`FileConfig`] is the on-disk TOML file; [`Settings`] is the effective
//! configuration after command-line overrides have been applied on top of it.

pub mod file;

use std::path::PathBuf;

pub use file::{FileConfig, expand_tilde};

use crate::{error::Result, fs::RemovalStrategy, index::IndexStore, layout::Layout};

/// Effective settings for one invocation.
#[derive(Clone, Debug)]
pub struct Settings {
    pub layout: Layout,
    pub index_path: PathBuf,
    pub editor: Option<String>,
    pub removal: RemovalStrategy,
}

impl Settings {
    /// Resolve the file configuration. `permanent` forces permanent deletion
    /// regardless of `use_trash`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Config`] if a required path cannot be resolved.
    pub fn resolve(config: &FileConfig, permanent: bool) -> Result<Self> {
        let removal = if permanent {
            RemovalStrategy::Permanent
        } else {
            RemovalStrategy::from_use_trash(config.use_trash())
        };

        Ok(Self {
            layout: config.layout()?,
            index_path: config.index_path()?,
            editor: config.editor().map(str::to_string),
            removal,
        })
    }

    #[must_use]
    pub fn store(&self) -> IndexStore {
        IndexStore::new(&self.index_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> FileConfig {
        FileConfig {
            projects_path: Some(PathBuf::from("/dev")),
            templates_path: Some(PathBuf::from("/tpl")),
            index_path: Some(PathBuf::from("/data/devmap.json")),
            ..FileConfig::default()
        }
    }

    #[test]
    fn test_resolve_defaults_to_trash() {
        let settings = Settings::resolve(&config(), false).unwrap();

        assert_eq!(settings.removal, RemovalStrategy::Trash);
        assert_eq!(settings.layout, Layout::new("/dev", "/tpl"));
        assert_eq!(settings.store().path(), PathBuf::from("/data/devmap.json"));
        assert!(settings.editor.is_none());
    }

    #[test]
    fn test_permanent_flag_overrides_file() {
        let mut config = config();
        config.use_trash = Some(true);

        assert_eq!(
            Settings::resolve(&config, true).unwrap().removal,
            RemovalStrategy::Permanent
        );

        config.use_trash = Some(false);
        assert_eq!(
            Settings::resolve(&config, false).unwrap().removal,
            RemovalStrategy::Permanent
        );
    }
}
