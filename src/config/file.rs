//! Configuration file support for persistent settings.
//!
//! Settings live in a TOML file at `~/.config/devmap/config.toml` (or the
//! platform-specific equivalent). Every key is optional in the file; unset
//! keys fall back to the defaults below, except `projects_path`, which the
//! tool cannot guess.
//!
//! # Layering
//!
//! The precedence order is: **CLI argument > config file > hardcoded default**.
//!
//! # Example config
//!
//! ```toml
//! projects_path = "~/dev"
//! templates_path = "~/.config/devmap/templates"   # default
//! index_path = "~/.config/devmap/devmap.json"     # default
//! editor = "code"
//! use_trash = true    # default; set to false for permanent deletion
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    layout::Layout,
};

/// Name of the per-user directory holding the config, the index and templates.
pub const APP_DIR: &str = "devmap";

/// Keys understood by [`FileConfig::get`] and [`FileConfig::set`].
pub const KEYS: [&str; 5] = [
    "projects_path",
    "templates_path",
    "index_path",
    "editor",
    "use_trash",
];

/// Top-level configuration file structure.
///
/// All fields are `Option<T>` so we can detect which values are present in the
/// config file and apply layered configuration (CLI > config file > defaults).
#[derive(Clone, PartialEq, Eq, Default, Debug, Serialize, Deserialize)]
pub struct FileConfig {
    /// Root directory holding one subdirectory per language. Required.
    pub projects_path: Option<PathBuf>,

    /// Root directory holding one subdirectory of templates per language.
    pub templates_path: Option<PathBuf>,

    /// Location of the JSON index.
    pub index_path: Option<PathBuf>,

    /// Command used to open a freshly created project.
    pub editor: Option<String>,

    /// Whether to move deleted projects and templates to the system trash.
    /// Defaults to `true` when absent.
    pub use_trash: Option<bool>,
}

/// Expand a leading `~` in a path to the user's home directory.
///
/// Paths that don't start with `~` are returned unchanged.
#[must_use]
pub fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    path.to_path_buf()
}

impl FileConfig {
    /// The per-user application directory, `<config_dir>/devmap`.
    ///
    /// # Returns
    ///
    /// `None` if the platform config directory cannot be determined.
    #[must_use]
    pub fn app_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join(APP_DIR))
    }

    /// Returns the path where the configuration file is expected.
    ///
    /// The configuration file is located at `<config_dir>/devmap/config.toml`,
    /// where `<config_dir>` is the platform-specific configuration directory
    /// (e.g., `~/.config` on Linux, `%APPDATA%` on Windows).
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        Self::app_dir().map(|p| p.join("config.toml"))
    }

    /// The explicit path if given, else [`FileConfig::config_path`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if neither is available.
    pub fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf> {
        explicit
            .map(expand_tilde)
            .or_else(Self::config_path)
            .ok_or_else(|| {
                Error::Config(
                    "could not determine the config directory on this platform".to_string(),
                )
            })
    }

    /// Load configuration from `path`.
    ///
    /// If the file doesn't exist, returns a default (empty) configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the file exists but cannot be read or
    /// contains invalid TOML or values of the wrong type.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "failed to read config file at {}: {e}",
                path.display()
            ))
        })?;

        toml::from_str(&content).map_err(|e| {
            Error::Config(format!(
                "failed to parse config file at {}: {e}",
                path.display()
            ))
        })
    }

    /// Write the configuration to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if serialization or writing fails.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {e}")))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Config(format!(
                    "failed to create config directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        fs::write(path, content).map_err(|e| {
            Error::Config(format!(
                "failed to write config file {}: {e}",
                path.display()
            ))
        })
    }

    /// String-keyed lookup of a raw file value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an unknown key.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let path = |p: &Option<PathBuf>| p.as_ref().map(|p| p.display().to_string());
        match key {
            "projects_path" => Ok(path(&self.projects_path)),
            "templates_path" => Ok(path(&self.templates_path)),
            "index_path" => Ok(path(&self.index_path)),
            "editor" => Ok(self.editor.clone()),
            "use_trash" => Ok(self.use_trash.map(|b| b.to_string())),
            _ => Err(unknown_key(key)),
        }
    }

    /// Set a file value by key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an unknown key, or for a `use_trash`
    /// value that is not `true` or `false`.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "projects_path" => self.projects_path = Some(PathBuf::from(value)),
            "templates_path" => self.templates_path = Some(PathBuf::from(value)),
            "index_path" => self.index_path = Some(PathBuf::from(value)),
            "editor" => self.editor = Some(value.to_string()),
            "use_trash" => {
                let flag = value.trim().parse().map_err(|_| {
                    Error::Config(format!("use_trash must be true or false, got {value:?}"))
                })?;
                self.use_trash = Some(flag);
            }
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }

    /// The project root.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `projects_path` is not set.
    pub fn projects_path(&self) -> Result<PathBuf> {
        self.projects_path
            .as_deref()
            .map(expand_tilde)
            .ok_or_else(|| {
                Error::Config(
                    "projects_path is not set; run `devmap config set projects_path <dir>`"
                        .to_string(),
                )
            })
    }

    /// The template root, defaulting to `<config_dir>/devmap/templates`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if unset and no config directory exists.
    pub fn templates_path(&self) -> Result<PathBuf> {
        self.path_or_default(self.templates_path.as_deref(), "templates")
    }

    /// The index file, defaulting to `<config_dir>/devmap/devmap.json`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if unset and no config directory exists.
    pub fn index_path(&self) -> Result<PathBuf> {
        self.path_or_default(self.index_path.as_deref(), "devmap.json")
    }

    #[must_use]
    pub fn editor(&self) -> Option<&str> {
        self.editor.as_deref().filter(|e| !e.trim().is_empty())
    }

    #[must_use]
    pub fn use_trash(&self) -> bool {
        self.use_trash.unwrap_or(true)
    }

    /// The project and template roots.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if either root cannot be resolved.
    pub fn layout(&self) -> Result<Layout> {
        Ok(Layout::new(self.projects_path()?, self.templates_path()?))
    }

    fn path_or_default(&self, value: Option<&Path>, default_name: &str) -> Result<PathBuf> {
        if let Some(path) = value {
            return Ok(expand_tilde(path));
        }
        Self::app_dir()
            .map(|dir| dir.join(default_name))
            .ok_or_else(|| {
                Error::Config(format!(
                    "could not determine a default location for {default_name}"
                ))
            })
    }
}

fn unknown_key(key: &str) -> Error {
    Error::Config(format!(
        "unknown config key {key:?} (expected one of: {})",
        KEYS.join(", ")
    ))
}
