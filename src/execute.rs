use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use ace::descriptor::ModuleDescriptor;
use ace::error::AceError;
use ace::global::settings::Settings;
use ace::graph::render_tree;
use ace::installer::{install_module, remove_module, restore_modules, upgrade_modules, BatchReport};
use ace::lock::{AceLock, LockEntry};
use ace::project::Project;
use ace::util::{is_valid_module_name, normalize_module_name};
use crate::cli::{AceCommand, CLI};

pub fn execute(cli: CLI) -> Result<()> {
    let project = build_project(&cli)?;
    match cli.command {
        AceCommand::Install { source, rev } => {
            execute_install(&project, &source, rev.as_deref())
        }
        AceCommand::Remove { name } => {
            remove_module(&project, &name)
        }
        AceCommand::Restore => {
            execute_restore(&project)
        }
        AceCommand::Upgrade => {
            execute_upgrade(&project)
        }
        AceCommand::Init { name, author, module_version } => {
            execute_init(&project, name, author, module_version)
        }
        AceCommand::List { json } => {
            execute_list(&project, json)
        }
        AceCommand::Info { name, json } => {
            execute_info(&project, &name, json)
        }
        AceCommand::Tree => {
            execute_tree(&project)
        }
        AceCommand::Version => {
            println!("v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn build_project(cli: &CLI) -> Result<Project> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(lock_file) = &cli.lock_file {
        settings.lock_file = lock_file.clone();
    }
    if let Some(module_dir) = &cli.module_dir {
        settings.module_dir = module_dir.clone();
    }
    Project::current(settings)
}

pub fn execute_install(project: &Project, source: &str, rev: Option<&str>) -> Result<()> {
    let installed = install_module(project, source, rev)?;
    println!(
        "{} {} ({})",
        "Installed".green().bold(),
        installed.name,
        installed.entry.version_label().unwrap_or_else(|| String::from("HEAD"))
    );
    println!("Lockfile updated with version information.");
    Ok(())
}

pub fn execute_restore(project: &Project) -> Result<()> {
    let report = restore_modules(project)?;
    print_report("restored", &report);
    Ok(())
}

pub fn execute_upgrade(project: &Project) -> Result<()> {
    let report = upgrade_modules(project)?;
    print_report("upgraded", &report);
    Ok(())
}

fn print_report(verb: &str, report: &BatchReport) {
    if report.done.is_empty() && report.unchanged.is_empty() && report.failed.is_empty() {
        return;
    }
    println!();
    println!(
        "{} {}, {} up to date, {} failed",
        report.done.len(),
        verb,
        report.unchanged.len(),
        report.failed.len()
    );
    for (name, reason) in &report.failed {
        println!("  {} {}: {}", "failed".red(), name, reason);
    }
}

pub fn execute_init(
    project: &Project,
    name: Option<String>,
    author: Option<String>,
    module_version: Option<String>,
) -> Result<()> {
    let path = project.descriptor_file();
    if path.exists() {
        return Err(AceError::DescriptorExists(path).into());
    }
    let dir_name = project.root
        .file_name()
        .ok_or(anyhow::anyhow!("Could not get directory name"))?
        .to_string_lossy()
        .to_string();

    let mut descriptor = ModuleDescriptor::default(&dir_name);
    if let Some(name) = name {
        let name = normalize_module_name(&name);
        if !is_valid_module_name(&name) {
            return Err(AceError::InvalidModuleName(name).into());
        }
        descriptor.name = name;
    }
    if let Some(author) = author {
        descriptor.author = author;
    }
    if let Some(version) = module_version {
        descriptor.set_version(&version)?;
    }
    if !is_valid_module_name(&descriptor.name) {
        println!(
            "{} '{}' is not a valid module name; pass --name to choose another",
            "Warning:".yellow(),
            descriptor.name
        );
    }
    descriptor.save(&path)?;
    println!("Initialized module.");
    Ok(())
}

fn format_list_line(name: &str, entry: &LockEntry) -> String {
    let version_info = if !entry.requested_version.is_empty() {
        if entry.requested_version.starts_with('v') {
            format!(" ({})", entry.requested_version)
        } else {
            format!(" (v{})", entry.requested_version)
        }
    } else {
        match ace::util::short_hash(&entry.commit_hash) {
            Some(short) => format!(" ({})", short),
            None => String::new(),
        }
    };
    format!("- {}{} @ {} (installed {})", name, version_info, entry.repo, entry.timestamp)
}

pub fn execute_list(project: &Project, json: bool) -> Result<()> {
    let lock = AceLock::load(project.lock_file())?;
    if json {
        println!("{}", serde_json::to_string_pretty(&lock)?);
        return Ok(());
    }
    if lock.is_empty() {
        println!("No modules installed.");
        return Ok(());
    }
    for (name, entry) in lock.iter() {
        println!("{}", format_list_line(name, entry));
    }
    Ok(())
}

#[derive(Serialize)]
struct ModuleInfo<'a> {
    name: &'a str,
    #[serde(flatten)]
    entry: &'a LockEntry,
    descriptor: Option<ModuleDescriptor>,
}

pub fn execute_info(project: &Project, name: &str, json: bool) -> Result<()> {
    let lock = AceLock::load(project.lock_file())?;
    let entry = lock.get(name)
        .ok_or_else(|| AceError::ModuleNotFound(name.to_string()))?;
    if !is_valid_module_name(name) {
        return Err(AceError::InvalidModuleName(name.to_string()).into());
    }
    let descriptor = ModuleDescriptor::load(project.descriptor_in(&project.module_path(name))).ok();

    if json {
        let info = ModuleInfo { name, entry, descriptor };
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("Module: {}", name.bold());
    println!("Repository: {}", entry.repo);
    println!("Installed At: {}", entry.timestamp);
    if !entry.requested_version.is_empty() {
        println!("Requested Version: {}", entry.requested_version);
    }
    if !entry.commit_hash.is_empty() {
        println!("Commit Hash: {}", entry.commit_hash);
    }
    if !entry.branch.is_empty() {
        println!("Branch: {}", entry.branch);
    }
    if !entry.tags.is_empty() {
        println!("Tags: {}", entry.tags.join(", "));
    }
    match descriptor {
        Some(descriptor) => {
            if !descriptor.author.is_empty() {
                println!("Author: {}", descriptor.author);
            }
            if !descriptor.version.is_empty() {
                println!("Module Version: {}", descriptor.version);
            }
        }
        None => {
            println!(
                "{} {} not found in {}",
                "Warning:".yellow(),
                project.settings.descriptor_file,
                project.module_path(name).display()
            );
        }
    }
    Ok(())
}

pub fn execute_tree(project: &Project) -> Result<()> {
    let lock = AceLock::load(project.lock_file())?;
    if lock.is_empty() {
        println!("No modules installed.");
        return Ok(());
    }
    print!("{}", render_tree(&project.display_name(), &lock));
    Ok(())
}
