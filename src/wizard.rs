//! Interactive prompts used by the command-line front end.

use std::{path::Path, process::Command};

use anyhow::{Result, bail};
use colored::Colorize;
use inquire::{Confirm, Select, Text};

use devmap::{Confirmation, DevMap, DiskFs, LanguageOutcome, NewProject, Project, utils};

use crate::cli::CreateProjectArgs;

const NEW_LANGUAGE: &str = "+ new language";
const NO_TEMPLATE: &str = "(no template)";

/// Ask twice before a recursive deletion. The second question is only asked
/// when the first one was answered with yes.
///
/// # Errors
///
/// Fails if the terminal cannot prompt or the user cancels.
pub fn confirm_twice(what: &str) -> Result<Confirmation> {
    let first = Confirm::new(&format!("Delete {what}?"))
        .with_default(false)
        .prompt()?;
    if !first {
        return Ok(Confirmation::new(false, false));
    }

    let second = Confirm::new(&format!(
        "{} {what} will be removed with everything inside. Continue?",
        "Really?".red().bold()
    ))
    .with_default(false)
    .prompt()?;

    Ok(Confirmation::new(first, second))
}

/// Build a [`NewProject`] from the command line, prompting for whatever is
/// missing unless `--yes` was given. May create the chosen language.
///
/// # Errors
///
/// Fails on prompt errors, on missing values in `--yes` mode, or when
/// creating a new language fails.
pub fn new_project(args: &CreateProjectArgs, devmap: &mut DevMap<DiskFs>) -> Result<NewProject> {
    let language = match &args.lang {
        Some(lang) => lang.clone(),
        None if args.yes => bail!("--lang is required with --yes"),
        None => pick_language(devmap)?,
    };
    if !devmap.index().has_language(&language) {
        ensure_language(devmap, &language, args.yes)?;
    }

    let name = match &args.name {
        Some(name) => name.clone(),
        None if args.yes => bail!("--name is required with --yes"),
        None => Text::new("Project name:").prompt()?,
    };

    let folder_name = match &args.folder {
        Some(folder) => folder.clone(),
        None if args.yes => utils::derive_folder_name(&name),
        None => Text::new("Folder name:")
            .with_default(&utils::derive_folder_name(&name))
            .prompt()?,
    };

    let init_git = args.git
        || (!args.yes
            && Confirm::new("Initialise a git repository?")
                .with_default(true)
                .prompt()?);

    let template = match &args.template {
        Some(template) => Some(template.clone()),
        None if args.yes => None,
        None => pick_template(devmap, &language)?,
    };

    let mut request = NewProject::new(name, language);
    request.folder_name = Some(folder_name);
    request.init_git = init_git;
    request.template = template;
    Ok(request)
}

/// Offer to create an untracked language; `assume_yes` skips the question.
///
/// # Errors
///
/// Fails if the user declines, on prompt errors, or if creation fails.
pub fn ensure_language(devmap: &mut DevMap<DiskFs>, language: &str, assume_yes: bool) -> Result<()> {
    let create = assume_yes
        || Confirm::new(&format!("Language '{language}' is not tracked. Create it?"))
            .with_default(true)
            .prompt()?;
    if !create {
        bail!("language '{language}' is not tracked");
    }

    if devmap.create_language(language)? == LanguageOutcome::Created {
        println!("{} {language}", "Created language".green());
    }
    Ok(())
}

/// Let the user pick one of several projects sharing a display name.
///
/// # Errors
///
/// Fails on prompt errors.
pub fn pick_project(matches: Vec<Project>) -> Result<Project> {
    Ok(Select::new("Several projects share this name. Which one?", matches).prompt()?)
}

/// Launch `editor` on `path` without waiting for it.
///
/// # Errors
///
/// Fails if the editor command cannot be started.
pub fn open_in_editor(editor: &str, path: &Path) -> Result<()> {
    let mut parts = editor.split_whitespace();
    let Some(program) = parts.next() else {
        bail!("editor command is empty");
    };

    Command::new(program)
        .args(parts)
        .arg(path)
        .spawn()
        .map_err(|e| anyhow::anyhow!("failed to launch {program}: {e}"))?;
    Ok(())
}

/// Ask for the project root during `config init`.
///
/// # Errors
///
/// Fails on prompt errors.
pub fn projects_path() -> Result<String> {
    Ok(Text::new("Where do your projects live?")
        .with_default("~/dev")
        .prompt()?)
}

fn pick_language(devmap: &DevMap<DiskFs>) -> Result<String> {
    let mut options: Vec<String> = devmap
        .languages()
        .iter()
        .map(|l| l.name().to_string())
        .collect();
    options.push(NEW_LANGUAGE.to_string());

    let choice = Select::new("Language:", options).prompt()?;
    if choice == NEW_LANGUAGE {
        return Ok(Text::new("New language name:").prompt()?);
    }
    Ok(choice)
}

fn pick_template(devmap: &DevMap<DiskFs>, language: &str) -> Result<Option<String>> {
    let templates = devmap.templates_for(language)?;
    if templates.is_empty() {
        return Ok(None);
    }

    let mut options = vec![NO_TEMPLATE.to_string()];
    options.extend(templates.into_iter().map(|t| t.name));

    let choice = Select::new("Template:", options).prompt()?;
    Ok((choice != NO_TEMPLATE).then_some(choice))
}
