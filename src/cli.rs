//! Command-line interface definition and argument parsing.
//!
//! This module defines all command-line arguments, options, and their validation
//! using the [clap](https://docs.rs/clap/) library.
//!
//! Helper methods on [`Cli`] accept a [`FileConfig`] reference so that config-file
//! values act as defaults that CLI arguments can override (layered config).

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};

use devmap::{
    Result,
    config::{FileConfig, Settings},
};

/// Options shared by every listing command.
#[derive(Args, Clone, Copy, Debug, Default)]
pub struct ListArgs {
    /// Output results as a single JSON document for scripting/piping
    #[arg(long)]
    pub json: bool,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Reconcile the index with the project tree and report every change
    Sync {
        #[command(flatten)]
        list: ListArgs,
    },

    /// Manage languages
    #[command(subcommand)]
    #[command(alias = "language")]
    Lang(LangCommand),

    /// Manage projects
    #[command(subcommand)]
    Project(ProjectCommand),

    /// Manage project templates
    #[command(subcommand)]
    Template(TemplateCommand),

    /// List everyone who created or adopted a project
    Users {
        #[command(flatten)]
        list: ListArgs,
    },

    /// Inspect the index file
    #[command(subcommand)]
    Index(IndexCommand),

    /// Inspect or edit the configuration file
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Subcommands for `lang`.
#[derive(Subcommand, Debug)]
pub enum LangCommand {
    /// List tracked languages
    List {
        #[command(flatten)]
        list: ListArgs,
    },

    /// Track a language, creating its project and template directories
    Create { name: String },

    /// Stop tracking a language and remove its directories (they must be empty)
    Delete { name: String },
}

/// Subcommands for `project`.
#[derive(Subcommand, Debug)]
pub enum ProjectCommand {
    /// List tracked projects
    List {
        /// Show folder, creation time, size and git status as well
        #[arg(short, long)]
        all: bool,

        /// Only list projects of this language
        #[arg(short, long)]
        lang: Option<String>,

        #[command(flatten)]
        list: ListArgs,
    },

    /// Create a project; prompts for anything not given on the command line
    Create(CreateProjectArgs),

    /// Delete a project directory and stop tracking it
    Delete {
        /// Display name of the project
        name: String,

        /// Language of the project, when several share the name
        #[arg(short, long)]
        lang: Option<String>,

        /// Folder of the project, when several share the name
        #[arg(short, long)]
        folder: Option<String>,

        /// Don't ask for confirmation
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Arguments of `project create`.
#[derive(Args, Debug, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct CreateProjectArgs {
    /// Display name
    #[arg(short, long)]
    pub name: Option<String>,

    /// Language to file the project under
    #[arg(short, long)]
    pub lang: Option<String>,

    /// Folder name (derived from the name when omitted)
    #[arg(short, long)]
    pub folder: Option<String>,

    /// Template to copy into the new project
    #[arg(short, long)]
    pub template: Option<String>,

    /// Initialise a git repository
    #[arg(short, long)]
    pub git: bool,

    /// Open the project in the configured editor afterwards
    #[arg(short, long)]
    pub open: bool,

    /// Don't prompt; use only what was given on the command line
    #[arg(short = 'y', long)]
    pub yes: bool,
}

/// Subcommands for `template`.
#[derive(Subcommand, Debug)]
pub enum TemplateCommand {
    /// List templates as `language/template` pairs
    List {
        /// Only list templates of this language
        #[arg(short, long)]
        lang: Option<String>,

        #[command(flatten)]
        list: ListArgs,
    },

    /// Copy a directory's contents into a new template
    Add {
        lang: String,
        name: String,
        source: PathBuf,
    },

    /// Delete a template directory
    Remove {
        lang: String,
        name: String,

        /// Don't ask for confirmation
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Subcommands for `index`.
#[derive(Subcommand, Debug)]
pub enum IndexCommand {
    /// Print the index file
    View,

    /// Print the path to the index file
    Path,
}

/// Subcommands for `config`.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration (file values + defaults for unset keys)
    Show,

    /// Write a config.toml if none exists yet
    Init {
        /// Project root to record (prompted for when omitted)
        projects_path: Option<PathBuf>,
    },

    /// Print the path to the config file
    Path,

    /// Print a single value from the config file
    Get { key: String },

    /// Set a single value in the config file
    Set { key: String, value: String },
}

/// Main command-line interface structure.
///
/// Helper methods accept a [`FileConfig`] reference so that config-file values act as
/// defaults when the corresponding CLI argument is not provided.
#[derive(Parser, Debug)]
#[command(name = "devmap")]
#[command(about = "Keep an index of your local projects, grouped by language, in sync with disk")]
#[command(version)]
#[command(author)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Use this config file instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Show debug logging on stderr (overridden by `RUST_LOG`)
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Permanently delete directories instead of moving them to the system trash
    ///
    /// By default, deleted projects and templates are moved to the system trash
    /// (Recycle Bin on Windows, Trash on macOS/Linux) so deletions are recoverable.
    #[arg(long, global = true)]
    permanent: bool,
}

impl Cli {
    #[must_use]
    pub const fn verbose(&self) -> bool {
        self.verbose
    }

    /// The `--config` path, if given.
    #[must_use]
    pub fn config_override(&self) -> Option<&Path> {
        self.config.as_deref()
    }

    /// Location of the config file: `--config` > platform default.
    ///
    /// # Errors
    ///
    /// Fails when no `--config` was given and the platform has no config directory.
    pub fn config_path(&self) -> Result<PathBuf> {
        FileConfig::resolve_path(self.config_override())
    }

    /// Effective settings: `--permanent` > config file `use_trash` > trash.
    ///
    /// # Errors
    ///
    /// Fails if the config file lacks `projects_path` or a default path cannot be resolved.
    pub fn settings(&self, config: &FileConfig) -> Result<Settings> {
        Settings::resolve(config, self.permanent)
    }
}
