//! `qmt org` command - organisation management
//!
//! The organisation (and department) listings are the scoped surfaces:
//! administrators see everything, customers see what they represent or
//! belong to.

use clap::Subcommand;
use console::style;
use dialoguer::{theme::ColorfulTheme, Input};
use miette::{IntoDiagnostic, Result};

use crate::cli::commands::utils::{self, DeleteArgs, EditArgs, ListArgs, ShowArgs};
use crate::cli::{table, GlobalOpts, OutputFormat};
use crate::core::entity::Entity;
use crate::core::registry::spec_for;
use crate::core::scope::{visible_departments, visible_organisations};
use crate::core::shortid::ShortIdIndex;
use crate::core::users::UserDirectory;
use crate::core::{store, Config, EntityPrefix};
use crate::entities::organisation::{Organisation, OrganisationDepartment, OrgStatus};

#[derive(Subcommand, Debug)]
pub enum OrgCommands {
    /// List organisations visible to the acting user
    List(ListArgs),

    /// Register a new organisation
    New(NewArgs),

    /// Show an organisation's details
    Show(ShowArgs),

    /// Edit an organisation in your editor (locations, departments, SWOT,
    /// PESTLE, scope statement and memberships are edited inline)
    Edit(EditArgs),

    /// Delete an organisation and every record it owns
    Delete(DeleteArgs),

    /// List departments of visible organisations
    Departments,

    /// Add a department to an organisation
    DeptAdd(DeptAddArgs),

    /// Manage organisation memberships
    #[command(subcommand)]
    Member(MemberCommands),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Organisation name (unique)
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub address: Option<String>,

    #[arg(long)]
    pub tin_number: Option<String>,

    #[arg(long)]
    pub region: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub sector: Option<String>,

    /// Representative user email (must exist in the user directory)
    #[arg(long)]
    pub representative: Option<String>,

    #[arg(long)]
    pub evaluation_level: Option<String>,

    #[arg(long)]
    pub notes: Option<String>,

    /// Use interactive prompts to fill in fields
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

#[derive(clap::Args, Debug)]
pub struct DeptAddArgs {
    /// Organisation ID, @N, or name
    pub org: String,

    /// Department name
    pub name: String,

    /// Coordinating user email
    #[arg(long)]
    pub coordinator: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum MemberCommands {
    /// Add a user to an organisation
    Add(MemberArgs),

    /// Remove a user from an organisation
    Remove(MemberArgs),
}

#[derive(clap::Args, Debug)]
pub struct MemberArgs {
    /// Organisation ID, @N, or name
    pub org: String,

    /// User email
    pub email: String,
}

pub fn run(cmd: OrgCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        OrgCommands::List(args) => run_list(args, global),
        OrgCommands::New(args) => run_new(args, global),
        OrgCommands::Show(args) => {
            let project = utils::open_project(global)?;
            utils::run_show::<Organisation>(&project, EntityPrefix::Org, &args.id, global)
        }
        OrgCommands::Edit(args) => {
            let project = utils::open_project(global)?;
            utils::run_edit::<Organisation>(&project, EntityPrefix::Org, &args.id, &Config::load())
        }
        OrgCommands::Delete(args) => run_delete(args, global),
        OrgCommands::Departments => run_departments(global),
        OrgCommands::DeptAdd(args) => run_dept_add(args, global),
        OrgCommands::Member(cmd) => run_member(cmd, global),
    }
}

/// Load the organisations visible to the acting user.
/// With an empty user directory the listing is unscoped (bootstrap mode).
fn scoped_organisations(
    project: &crate::core::Project,
    global: &GlobalOpts,
    config: &Config,
) -> Result<Vec<Organisation>> {
    let organisations: Vec<Organisation> =
        crate::core::loader::load_all(&project.entity_dir(EntityPrefix::Org))?;

    let directory = UserDirectory::load(project);
    if directory.users.is_empty() {
        return Ok(organisations);
    }

    let acting = directory
        .acting_user(global.as_user.as_deref(), config)
        .ok_or_else(|| {
            miette::miette!(
                "No acting user resolved. Pass --as <email> or set QMT_USER to a directory user."
            )
        })?;

    Ok(visible_organisations(acting, organisations))
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let project = utils::open_project(global)?;
    let config = Config::load();
    let spec = spec_for(EntityPrefix::Org);

    let mut records = scoped_organisations(&project, global, &config)?;

    if let Some(ref status) = args.status {
        records.retain(|r| r.status().eq_ignore_ascii_case(status));
    }
    for filter in &args.filters {
        let (field, value) = filter
            .split_once('=')
            .ok_or_else(|| miette::miette!("Invalid filter '{}'. Use field=value", filter))?;
        if !spec.filters.contains(&field) {
            return Err(miette::miette!(
                "'{}' is not a filter field for ORG (valid: {})",
                field,
                spec.filters.join(", ")
            ));
        }
        records.retain(|r| {
            crate::core::registry::Tabular::cell(r, field).eq_ignore_ascii_case(value)
        });
    }
    if let Some(ref needle) = args.search {
        let needle = needle.to_lowercase();
        records.retain(|r| {
            spec.search.iter().any(|field| {
                crate::core::registry::Tabular::cell(r, field)
                    .to_lowercase()
                    .contains(&needle)
            })
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

    let mut short_ids = ShortIdIndex::load(&project);
    short_ids.ensure_all(records.iter().map(|r| r.id.to_string()));
    let _ = short_ids.save(&project);

    let format = match global.format {
        OutputFormat::Auto => OutputFormat::Tsv,
        f => f,
    };
    table::render_list(&records, spec, format, &short_ids, global.quiet)
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let project = utils::open_project(global)?;
    let config = Config::load();

    let name = if args.interactive {
        Input::with_theme(&ColorfulTheme::default())
            .with_prompt("Organisation name")
            .interact_text()
            .into_diagnostic()?
    } else {
        args.name
            .clone()
            .ok_or_else(|| miette::miette!("--name is required (or use --interactive)"))?
    };

    store::ensure_unique_organisation_name(&project, &name, None)
        .map_err(|e| miette::miette!("{}", e))?;

    if let Some(ref rep) = args.representative {
        let directory = UserDirectory::load(&project);
        if directory.find(rep).is_none() {
            return Err(miette::miette!(
                "Representative '{}' is not in the user directory. Run 'qmt user new' first.",
                rep
            ));
        }
    }

    let mut org = Organisation::new(name, config.author());
    org.address = args.address;
    org.tin_number = args.tin_number;
    org.region = args.region;
    org.phone = args.phone;
    org.email = args.email;
    org.sector = args.sector;
    org.representative = args.representative;
    org.evaluation_level = args.evaluation_level;
    org.notes = args.notes;

    let path = store::save(&project, &mut org).map_err(|e| miette::miette!("{}", e))?;
    utils::print_created(&project, &org.id, &path);
    println!("   Status: {}", style(OrgStatus::Pending).yellow());
    Ok(())
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let project = utils::open_project(global)?;
    let (_, org) = utils::find_record::<Organisation>(&project, EntityPrefix::Org, &args.id)?;

    let prompt = format!(
        "Delete organisation '{}' and every record it owns?",
        org.name
    );
    if !utils::confirm_delete(&prompt, args.yes)? {
        println!("Aborted.");
        return Ok(());
    }

    let stats =
        store::delete_organisation(&project, &org.id).map_err(|e| miette::miette!("{}", e))?;
    println!(
        "{} Deleted '{}' ({} record(s) removed)",
        style("✓").green(),
        org.name,
        stats.records_deleted
    );
    Ok(())
}

fn run_departments(global: &GlobalOpts) -> Result<()> {
    let project = utils::open_project(global)?;
    let config = Config::load();

    let organisations: Vec<Organisation> =
        crate::core::loader::load_all(&project.entity_dir(EntityPrefix::Org))?;
    let directory = UserDirectory::load(&project);

    let rows: Vec<(Organisation, OrganisationDepartment)> = if directory.users.is_empty() {
        organisations
            .into_iter()
            .flat_map(|org| {
                org.departments
                    .clone()
                    .into_iter()
                    .map(move |d| (org.clone(), d))
            })
            .collect()
    } else {
        let acting = directory
            .acting_user(global.as_user.as_deref(), &config)
            .ok_or_else(|| miette::miette!("No acting user resolved."))?;
        visible_departments(acting, organisations)
    };

    if rows.is_empty() {
        println!("No departments found.");
        return Ok(());
    }

    println!(
        "{:<28} {:<28} {:<28}",
        style("DEPARTMENT").bold(),
        style("ORGANISATION").bold(),
        style("COORDINATOR").bold()
    );
    println!("{}", "-".repeat(86));
    for (org, dept) in &rows {
        println!(
            "{:<28} {:<28} {:<28}",
            crate::cli::helpers::truncate_str(&dept.name, 26),
            crate::cli::helpers::truncate_str(&org.name, 26),
            dept.coordinator.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

fn run_dept_add(args: DeptAddArgs, global: &GlobalOpts) -> Result<()> {
    let project = utils::open_project(global)?;
    let (_, mut org) = utils::find_record::<Organisation>(&project, EntityPrefix::Org, &args.org)?;

    if let Some(ref coordinator) = args.coordinator {
        let directory = UserDirectory::load(&project);
        if directory.find(coordinator).is_none() {
            return Err(miette::miette!(
                "Coordinator '{}' is not in the user directory.",
                coordinator
            ));
        }
    }

    org.departments.push(OrganisationDepartment {
        name: args.name.clone(),
        coordinator: args.coordinator,
    });
    store::save(&project, &mut org).map_err(|e| miette::miette!("{}", e))?;

    println!(
        "{} Added department '{}' to '{}'",
        style("✓").green(),
        args.name,
        org.name
    );
    Ok(())
}

fn run_member(cmd: MemberCommands, global: &GlobalOpts) -> Result<()> {
    let project = utils::open_project(global)?;

    match cmd {
        MemberCommands::Add(args) => {
            let (_, mut org) =
                utils::find_record::<Organisation>(&project, EntityPrefix::Org, &args.org)?;
            let directory = UserDirectory::load(&project);
            if directory.find(&args.email).is_none() {
                return Err(miette::miette!(
                    "User '{}' is not in the user directory.",
                    args.email
                ));
            }
            org.add_member(&args.email)
                .map_err(|e| miette::miette!("{}", e))?;
            store::save(&project, &mut org).map_err(|e| miette::miette!("{}", e))?;
            println!(
                "{} Added '{}' to '{}'",
                style("✓").green(),
                args.email,
                org.name
            );
        }
        MemberCommands::Remove(args) => {
            let (_, mut org) =
                utils::find_record::<Organisation>(&project, EntityPrefix::Org, &args.org)?;
            if !org.remove_member(&args.email) {
                return Err(miette::miette!(
                    "'{}' is not a member of '{}'",
                    args.email,
                    org.name
                ));
            }
            store::save(&project, &mut org).map_err(|e| miette::miette!("{}", e))?;
            println!(
                "{} Removed '{}' from '{}'",
                style("✓").green(),
                args.email,
                org.name
            );
        }
    }
    Ok(())
}
