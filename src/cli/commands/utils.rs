//! Generic list/find/show/edit/delete engine shared by the record commands
//!
//! Every record type gets the same verbs; the list-surface registry supplies
//! the columns, filters and search fields, and the store supplies the single
//! save path, so derived fields are recomputed no matter which command wrote
//! the record.

use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::helpers::format_short_id;
use crate::cli::{table, GlobalOpts, OutputFormat};
use crate::core::entity::Entity;
use crate::core::identity::EntityPrefix;
use crate::core::registry::{spec_for, Tabular};
use crate::core::shortid::ShortIdIndex;
use crate::core::{loader, store};
use crate::core::{Config, Project};
use crate::entities::Organisation;

/// Open the project from --project or by discovery
pub fn open_project(global: &GlobalOpts) -> Result<Project> {
    let project = match &global.project {
        Some(path) => Project::discover_from(path),
        None => Project::discover(),
    };
    project.map_err(|e| miette::miette!("{}", e))
}

/// Shared list arguments, rendered through the registry
#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by status (case-insensitive)
    #[arg(long, short = 's')]
    pub status: Option<String>,

    /// Filter by owning organisation (ID, @N, or name)
    #[arg(long)]
    pub org: Option<String>,

    /// Filter by a declared filter field: field=value (repeatable)
    #[arg(long = "filter", value_name = "FIELD=VALUE")]
    pub filters: Vec<String>,

    /// Search the declared search fields (case-insensitive substring)
    #[arg(long)]
    pub search: Option<String>,

    /// Reverse sort order (default: oldest first)
    #[arg(long, short = 'r')]
    pub reverse: bool,

    /// Limit output to N items
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Show count only, not the items
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Record ID, @N short ID, or fuzzy title
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Record ID, @N short ID, or fuzzy title
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Record ID, @N short ID, or fuzzy title
    pub id: String,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

/// Generic list runner: load, filter, sort, render
pub fn run_list<T>(
    project: &Project,
    prefix: EntityPrefix,
    args: &ListArgs,
    global: &GlobalOpts,
) -> Result<()>
where
    T: Entity + Tabular + Serialize,
{
    let spec = spec_for(prefix);
    let mut records: Vec<T> = loader::load_all(&project.entity_dir(prefix))?;

    if let Some(ref status) = args.status {
        records.retain(|r| r.status().eq_ignore_ascii_case(status));
    }

    if let Some(ref org_query) = args.org {
        let org = resolve_organisation(project, org_query)?;
        records.retain(|r| r.organisation() == Some(&org.id));
    }

    for filter in &args.filters {
        let (field, value) = filter.split_once('=').ok_or_else(|| {
            miette::miette!("Invalid filter '{}'. Use field=value", filter)
        })?;
        if !spec.filters.contains(&field) {
            return Err(miette::miette!(
                "'{}' is not a filter field for {} (valid: {})",
                field,
                prefix,
                spec.filters.join(", ")
            ));
        }
        records.retain(|r| r.cell(field).eq_ignore_ascii_case(value));
    }

    if let Some(ref needle) = args.search {
        let needle = needle.to_lowercase();
        records.retain(|r| {
            spec.search
                .iter()
                .any(|field| r.cell(field).to_lowercase().contains(&needle))
        });
    }

    records.sort_by_key(|r| r.created());
    if args.reverse {
        records.reverse();
    }
    if let Some(limit) = args.limit {
        records.truncate(limit);
    }

    if args.count {
        println!("{}", records.len());
        return Ok(());
    }

    // Keep the short ID index current for @N references
    let mut short_ids = ShortIdIndex::load(project);
    short_ids.ensure_all(records.iter().map(|r| r.id().to_string()));
    let _ = short_ids.save(project);

    let format = match global.format {
        OutputFormat::Auto => OutputFormat::Tsv,
        f => f,
    };

    table::render_list(&records, spec, format, &short_ids, global.quiet)
}

/// Find a record by @N short ID, ID prefix, or fuzzy title match
pub fn find_record<T: Entity + 'static>(
    project: &Project,
    prefix: EntityPrefix,
    query: &str,
) -> Result<(PathBuf, T)> {
    let short_ids = ShortIdIndex::load(project);
    let resolved = short_ids
        .resolve(query)
        .unwrap_or_else(|| query.to_string());

    // Fast path: a full ID maps straight to its file
    if crate::core::EntityId::parse(&resolved).is_ok() {
        if let Some(found) = loader::load_entity::<T>(&project.entity_dir(prefix), &resolved)? {
            return Ok(found);
        }
    }

    let mut matches: Vec<(PathBuf, T)> = Vec::new();
    for (path, record) in store::load_with_paths::<T>(project, prefix) {
        let id_str = record.id().to_string();
        if id_str.starts_with(&resolved) || id_str == resolved {
            matches.push((path, record));
        } else if !query.starts_with('@')
            && !query.chars().all(|c| c.is_ascii_digit())
            && record
                .title()
                .to_lowercase()
                .contains(&resolved.to_lowercase())
        {
            matches.push((path, record));
        }
    }

    match matches.len() {
        0 => Err(miette::miette!(
            "No {} record found matching '{}'",
            prefix,
            query
        )),
        1 => Ok(matches.remove(0)),
        _ => {
            println!("{} Multiple matches found:", style("!").yellow());
            for (_, record) in &matches {
                println!("  {} - {}", format_short_id(record.id()), record.title());
            }
            Err(miette::miette!(
                "Ambiguous query '{}'. Please be more specific.",
                query
            ))
        }
    }
}

/// Resolve an organisation by ID, @N, or name (case-insensitive substring)
pub fn resolve_organisation(project: &Project, query: &str) -> Result<Organisation> {
    find_record::<Organisation>(project, EntityPrefix::Org, query).map(|(_, org)| org)
}

/// Generic show runner
pub fn run_show<T>(project: &Project, prefix: EntityPrefix, id: &str, global: &GlobalOpts) -> Result<()>
where
    T: Entity + Serialize,
{
    let (_, record) = find_record::<T>(project, prefix, id)?;

    let format = match global.format {
        OutputFormat::Auto => OutputFormat::Yaml,
        f => f,
    };

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&record).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Id => println!("{}", record.id()),
        _ => {
            let yaml = serde_yml::to_string(&record).into_diagnostic()?;
            print!("{}", yaml);
        }
    }

    Ok(())
}

/// Generic edit runner: open the file in the editor, then re-save through the
/// store so derived fields are recomputed even after hand edits
pub fn run_edit<T: Entity + 'static>(
    project: &Project,
    prefix: EntityPrefix,
    id: &str,
    config: &Config,
) -> Result<()> {
    let (path, record) = find_record::<T>(project, prefix, id)?;

    println!(
        "Opening {} in {}...",
        style(format_short_id(record.id())).cyan(),
        style(config.editor()).yellow()
    );
    config.run_editor(&path).into_diagnostic()?;

    let mut edited: T = crate::yaml::parse_yaml_file(&path)?;
    store::save(project, &mut edited).map_err(|e| miette::miette!("{}", e))?;

    println!("{} Saved {}", style("✓").green(), format_short_id(edited.id()));
    Ok(())
}

/// Generic delete runner for leaf records (no cascade)
pub fn run_delete<T: Entity>(
    project: &Project,
    prefix: EntityPrefix,
    args: &DeleteArgs,
) -> Result<()> {
    let (_, record) = find_record::<T>(project, prefix, &args.id)?;

    if !confirm_delete(&format!("Delete {} '{}'?", prefix, record.title()), args.yes)? {
        println!("Aborted.");
        return Ok(());
    }

    store::delete(project, prefix, record.id()).map_err(|e| miette::miette!("{}", e))?;
    println!(
        "{} Deleted {}",
        style("✓").green(),
        format_short_id(record.id())
    );
    Ok(())
}

/// Ask for confirmation unless --yes was given
pub fn confirm_delete(prompt: &str, yes: bool) -> Result<bool> {
    if yes {
        return Ok(true);
    }
    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(false)
        .interact()
        .into_diagnostic()
}

/// Print the standard creation confirmation
pub fn print_created(project: &Project, id: &crate::core::EntityId, path: &std::path::Path) {
    let mut short_ids = ShortIdIndex::load(project);
    let short = short_ids.add(id.to_string());
    let _ = short_ids.save(project);

    println!(
        "{} Created {} {}",
        style("✓").green(),
        id.prefix(),
        style(format!("@{} {}", short, id)).cyan()
    );
    println!("   {}", style(path.display()).dim());
}
