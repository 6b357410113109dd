//! `qmt stakeholder` command - stakeholder management

use clap::Subcommand;
use miette::Result;

use crate::cli::commands::utils::{self, DeleteArgs, EditArgs, ListArgs, ShowArgs};
use crate::cli::GlobalOpts;
use crate::core::{store, Config, EntityPrefix};
use crate::entities::stakeholder::{Stakeholder, StakeholderCategory, StakeholderRequirement};

#[derive(Subcommand, Debug)]
pub enum StakeholderCommands {
    /// List stakeholders with filtering
    List(ListArgs),

    /// Register a new stakeholder
    New(NewArgs),

    /// Show a stakeholder's details
    Show(ShowArgs),

    /// Edit a stakeholder in your editor (requirements are edited inline)
    Edit(EditArgs),

    /// Delete a stakeholder
    Delete(DeleteArgs),

    /// Add a requirement to a stakeholder
    Require(RequireArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Stakeholder name
    #[arg(long)]
    pub name: String,

    /// Category
    #[arg(long, value_enum, default_value = "customer")]
    pub category: StakeholderCategory,

    #[arg(long)]
    pub contact_person: Option<String>,

    #[arg(long)]
    pub contact_info: Option<String>,

    #[arg(long)]
    pub relevance: Option<String>,

    /// Owning organisation (ID, @N, or name)
    #[arg(long)]
    pub org: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct RequireArgs {
    /// Stakeholder ID, @N, or name
    pub id: String,

    /// Requirement description
    pub description: String,

    #[arg(long)]
    pub requirement_type: Option<String>,
}

pub fn run(cmd: StakeholderCommands, global: &GlobalOpts) -> Result<()> {
    let project = utils::open_project(global)?;
    match cmd {
        StakeholderCommands::List(args) => {
            utils::run_list::<Stakeholder>(&project, EntityPrefix::Stk, &args, global)
        }
        StakeholderCommands::New(args) => run_new(args, global),
        StakeholderCommands::Show(args) => {
            utils::run_show::<Stakeholder>(&project, EntityPrefix::Stk, &args.id, global)
        }
        StakeholderCommands::Edit(args) => {
            utils::run_edit::<Stakeholder>(&project, EntityPrefix::Stk, &args.id, &Config::load())
        }
        StakeholderCommands::Delete(args) => {
            utils::run_delete::<Stakeholder>(&project, EntityPrefix::Stk, &args)
        }
        StakeholderCommands::Require(args) => run_require(args, global),
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let project = utils::open_project(global)?;
    let config = Config::load();

    let mut stakeholder = Stakeholder::new(args.name, args.category, config.author());
    stakeholder.contact_person = args.contact_person;
    stakeholder.contact_info = args.contact_info;
    stakeholder.relevance_to_qms = args.relevance;
    stakeholder.created_by = global.as_user.clone().or_else(|| config.acting_user());
    if let Some(ref org_query) = args.org {
        stakeholder.organisation = Some(utils::resolve_organisation(&project, org_query)?.id);
    }

    let path = store::save(&project, &mut stakeholder).map_err(|e| miette::miette!("{}", e))?;
    utils::print_created(&project, &stakeholder.id, &path);
    Ok(())
}

fn run_require(args: RequireArgs, global: &GlobalOpts) -> Result<()> {
    let project = utils::open_project(global)?;
    let (_, mut stakeholder) =
        utils::find_record::<Stakeholder>(&project, EntityPrefix::Stk, &args.id)?;

    stakeholder.requirements.push(StakeholderRequirement {
        description: args.description,
        requirement_type: args.requirement_type,
        notes: None,
    });
    store::save(&project, &mut stakeholder).map_err(|e| miette::miette!("{}", e))?;

    println!(
        "{} Added requirement to '{}'",
        console::style("✓").green(),
        stakeholder.name
    );
    Ok(())
}
