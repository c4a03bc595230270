//! # devmap
//!
//! A command-line project manager that keeps an index of local software
//! projects, grouped by language, in sync with the directory tree.
//!
//! ## Usage
//!
//! ```bash
//! # First run: record where projects live
//! devmap config init ~/dev
//!
//! # Reconcile the index with disk and show what changed
//! devmap sync
//!
//! # Create and list projects
//! devmap project create --name "My App" --lang Rust --git
//! devmap project list --all
//! ```

mod cli;
mod wizard;

use std::{fs, process::exit, time::Duration};

use anyhow::{Ok, Result, bail};
use clap::Parser;
use cli::{
    Cli, Commands, ConfigCommand, CreateProjectArgs, IndexCommand, LangCommand, ProjectCommand,
    TemplateCommand,
};
use colored::Colorize;
use devmap::{
    Confirmation, Deletion, DevMap, DiskFs, LanguageOutcome, SyncReport,
    config::{FileConfig, Settings, file::KEYS},
    output::{self, JsonProjects, JsonSyncReport},
};
use humansize::{DECIMAL, format_size};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

/// Entry point for the devmap application.
///
/// This function handles all errors gracefully by calling [`inner_main`] and printing
/// any errors to stderr before exiting with a non-zero status code.
fn main() {
    if let Err(err) = inner_main() {
        eprintln!("Error: {err}");

        exit(1);
    }
}

/// Main application logic that can return errors.
///
/// Parses arguments, loads the configuration, opens (and thereby reconciles)
/// the index and dispatches the subcommand.
///
/// # Errors
///
/// Returns configuration, index, filesystem and prompt errors.
fn inner_main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.verbose());

    let config_path = args.config_path()?;
    if let Commands::Config(command) = &args.command {
        return handle_config_command(command, &config_path);
    }

    let file_config = FileConfig::load_from(&config_path)?;
    let settings = args.settings(&file_config)?;

    if let Commands::Index(IndexCommand::Path) = &args.command {
        println!("{}", settings.index_path.display());
        return Ok(());
    }

    let quiet = json_mode(&args.command);
    let (mut devmap, report) = open(&settings, quiet)?;

    if !quiet && !matches!(args.command, Commands::Sync { .. }) {
        output::print_report(&report);
    }

    match args.command {
        Commands::Sync { list } => print_sync(&report, list.json)?,
        Commands::Lang(command) => handle_lang_command(command, &mut devmap)?,
        Commands::Project(command) => handle_project_command(command, &mut devmap, &settings)?,
        Commands::Template(command) => handle_template_command(command, &mut devmap, &settings)?,
        Commands::Users { list } => {
            if list.json {
                println!("{}", serde_json::to_string_pretty(devmap.users())?);
            } else {
                println!("{}", output::users_table(devmap.users()));
            }
        }
        Commands::Index(IndexCommand::View) => {
            let path = devmap.store().path();
            let content = fs::read_to_string(path)
                .map_err(|e| anyhow::anyhow!("Failed to read index file {}: {e}", path.display()))?;
            print!("{content}");
        }
        Commands::Index(IndexCommand::Path) | Commands::Config(_) => {}
    }

    Ok(())
}

// ── Helper functions ────────────────────────────────────────────────────

/// Install the stderr log subscriber. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "error" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .init();
}

/// Whether the command prints a JSON document, which must be the only thing on stdout.
const fn json_mode(command: &Commands) -> bool {
    match command {
        Commands::Sync { list } | Commands::Users { list } => list.json,
        Commands::Lang(LangCommand::List { list })
        | Commands::Project(ProjectCommand::List { list, .. })
        | Commands::Template(TemplateCommand::List { list, .. }) => list.json,
        _ => false,
    }
}

/// Open and reconcile the index behind a spinner.
fn open(settings: &Settings, quiet: bool) -> Result<(DevMap<DiskFs>, SyncReport)> {
    let store = settings.store();
    let first_run = !store.exists();

    let progress = if quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
        pb.set_message("Syncing index with disk...");
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    };

    let opened = DevMap::open(store, settings.layout.clone(), DiskFs::new());
    progress.finish_and_clear();
    let (devmap, report) = opened?;

    if first_run && !quiet {
        println!(
            "{} {}",
            "📒 Created a new index at".cyan(),
            devmap.store().path().display()
        );
    }
    Ok((devmap, report))
}

fn print_sync(report: &SyncReport, json: bool) -> Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&JsonSyncReport::from_report(report))?
        );
    } else if report.is_clean() {
        println!("{}", "✨ Index is up to date".green());
    } else {
        output::print_report(report);
        println!(
            "\n{} {} changes, {} failures",
            "🔄 Sync complete:".bold(),
            report.changes().count().to_string().green(),
            report.failures().count().to_string().red()
        );
    }
    Ok(())
}

fn handle_lang_command(command: LangCommand, devmap: &mut DevMap<DiskFs>) -> Result<()> {
    match command {
        LangCommand::List { list } => {
            if list.json {
                println!("{}", serde_json::to_string_pretty(devmap.languages())?);
            } else {
                println!("{}", output::languages_table(devmap.index()));
            }
        }
        LangCommand::Create { name } => match devmap.create_language(&name)? {
            LanguageOutcome::Created => println!("{} {name}", "✅ Created language".green()),
            LanguageOutcome::AlreadyTracked => {
                println!("{}", format!("Language '{name}' is already tracked").yellow());
            }
        },
        LangCommand::Delete { name } => {
            devmap.delete_language(&name)?;
            println!("{} {name}", "🗑️  Deleted language".green());
        }
    }
    Ok(())
}

fn handle_project_command(
    command: ProjectCommand,
    devmap: &mut DevMap<DiskFs>,
    settings: &Settings,
) -> Result<()> {
    match command {
        ProjectCommand::List { all, lang, list } => {
            let projects: Vec<_> = devmap
                .projects()
                .iter()
                .filter(|p| lang.as_deref().is_none_or(|l| p.language == l))
                .cloned()
                .collect();

            if list.json {
                let document = JsonProjects::new(&projects, devmap.layout());
                println!("{}", serde_json::to_string_pretty(&document)?);
            } else if projects.is_empty() {
                println!("{}", "✨ No projects tracked yet".green());
            } else {
                println!("{}", output::projects_table(&projects, all));
                println!("\n{}", output::projects_summary(&projects, devmap.languages()));
            }
        }
        ProjectCommand::Create(args) => create_project(&args, devmap, settings)?,
        ProjectCommand::Delete {
            name,
            lang,
            folder,
            yes,
        } => {
            let matches: Vec<_> = devmap
                .find_projects(&name)
                .into_iter()
                .filter(|p| lang.as_deref().is_none_or(|l| p.language == l))
                .filter(|p| folder.as_deref().is_none_or(|f| p.folder_name == f))
                .cloned()
                .collect();

            let project = if matches.len() > 1 {
                wizard::pick_project(matches)?
            } else {
                matches
                    .into_iter()
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("no tracked project is named '{name}'"))?
            };

            let confirmation = if yes {
                Confirmation::granted()
            } else {
                wizard::confirm_twice(&project.to_string())?
            };

            match devmap.delete_project(
                &project.language,
                &project.folder_name,
                confirmation,
                settings.removal,
            )? {
                Deletion::Removed => println!("{} {project}", "🗑️  Deleted".green()),
                Deletion::Aborted => println!("{}", "Aborted, nothing was deleted".yellow()),
            }
        }
    }
    Ok(())
}

fn create_project(
    args: &CreateProjectArgs,
    devmap: &mut DevMap<DiskFs>,
    settings: &Settings,
) -> Result<()> {
    let request = wizard::new_project(args, devmap)?;
    let project = devmap.create_project(&request)?.clone();
    let path = project.path(devmap.layout());

    println!(
        "{} {} ({})",
        "✅ Created project".green(),
        project,
        format_size(project.size, DECIMAL).bright_white()
    );
    println!("   {}", path.display());

    let open = args.open
        || (!args.yes
            && settings.editor.is_some()
            && inquire::Confirm::new("Open it in your editor?")
                .with_default(false)
                .prompt()?);

    if open {
        match settings.editor.as_deref() {
            Some(editor) => {
                if let Err(e) = wizard::open_in_editor(editor, &path) {
                    eprintln!("{} {e}", "Warning:".yellow());
                }
            }
            None => eprintln!(
                "{} no editor configured; run `devmap config set editor <command>`",
                "Warning:".yellow()
            ),
        }
    }
    Ok(())
}

fn handle_template_command(
    command: TemplateCommand,
    devmap: &mut DevMap<DiskFs>,
    settings: &Settings,
) -> Result<()> {
    match command {
        TemplateCommand::List { lang, list } => {
            let templates = match &lang {
                Some(lang) => devmap.templates_for(lang)?,
                None => devmap.templates()?,
            };
            if list.json {
                println!("{}", serde_json::to_string_pretty(&templates)?);
            } else if templates.is_empty() {
                println!("{}", "No templates found".yellow());
            } else {
                println!("{}", output::templates_table(&templates));
            }
        }
        TemplateCommand::Add { lang, name, source } => {
            if !devmap.index().has_language(&lang) {
                wizard::ensure_language(devmap, &lang, false)?;
            }
            let copied = devmap.add_template(&lang, &name, &source)?;
            println!(
                "{} {lang}/{name} ({copied} files)",
                "✅ Added template".green()
            );
        }
        TemplateCommand::Remove { lang, name, yes } => {
            let confirmation = if yes {
                Confirmation::granted()
            } else {
                wizard::confirm_twice(&format!("template {lang}/{name}"))?
            };
            match devmap.remove_template(&lang, &name, confirmation, settings.removal)? {
                Deletion::Removed => println!("{} {lang}/{name}", "🗑️  Removed template".green()),
                Deletion::Aborted => println!("{}", "Aborted, nothing was deleted".yellow()),
            }
        }
    }
    Ok(())
}

// ── Config subcommand ────────────────────────────────────────────────

/// Dispatch a `config` subcommand.
fn handle_config_command(command: &ConfigCommand, path: &std::path::Path) -> Result<()> {
    match command {
        ConfigCommand::Path => println!("{}", path.display()),
        ConfigCommand::Show => show_config(path)?,
        ConfigCommand::Init { projects_path } => init_config(path, projects_path.as_deref())?,
        ConfigCommand::Get { key } => {
            let config = FileConfig::load_from(path)?;
            match config.get(key)? {
                Some(value) => println!("{value}"),
                None => bail!("{key} is not set in {}", path.display()),
            }
        }
        ConfigCommand::Set { key, value } => {
            let mut config = FileConfig::load_from(path)?;
            config.set(key, value)?;
            config.save_to(path)?;
            println!("{key} = {value}");
        }
    }
    Ok(())
}

/// Print the effective configuration (file values merged with defaults).
fn show_config(path: &std::path::Path) -> Result<()> {
    let config = FileConfig::load_from(path)?;
    if path.exists() {
        println!("Config file: {} (found)", path.display());
    } else {
        println!("Config file: {} (not found - showing defaults)", path.display());
    }
    println!();

    for key in KEYS {
        let shown = match config.get(key)? {
            Some(value) => format!("\"{value}\""),
            None => match key {
                "templates_path" => default_shown(config.templates_path()),
                "index_path" => default_shown(config.index_path()),
                "use_trash" => "true  (default)".to_string(),
                _ => "(not set)".dimmed().to_string(),
            },
        };
        println!("{key:<15}= {shown}");
    }
    Ok(())
}

fn default_shown(resolved: devmap::Result<std::path::PathBuf>) -> String {
    resolved.map_or_else(
        |_| "(unavailable)".to_string(),
        |p| format!("\"{}\"  (default)", p.display()),
    )
}

/// Write a config file recording the project root, and create that root.
fn init_config(path: &std::path::Path, projects_path: Option<&std::path::Path>) -> Result<()> {
    if path.exists() {
        println!("Config file already exists at: {}", path.display());
        println!("Use `devmap config set <key> <value>` to change it.");
        return Ok(());
    }

    let projects_path = match projects_path {
        Some(p) => p.display().to_string(),
        None => wizard::projects_path()?,
    };

    let mut config = FileConfig::default();
    config.set("projects_path", &projects_path)?;
    let root = config.projects_path()?;
    fs::create_dir_all(&root)
        .map_err(|e| anyhow::anyhow!("Failed to create {}: {e}", root.display()))?;
    config.save_to(path)?;

    println!("Config file written to: {}", path.display());
    println!("Projects live in: {}", root.display());
    Ok(())
}
