//! `qmt resource` command - resource plan management

use clap::Subcommand;
use miette::Result;

use crate::cli::commands::utils::{self, DeleteArgs, EditArgs, ListArgs, ShowArgs};
use crate::cli::GlobalOpts;
use crate::core::{store, Config, EntityPrefix};
use crate::entities::resource_plan::{ResourcePlan, ResourceType};

#[derive(Subcommand, Debug)]
pub enum ResourceCommands {
    /// List resource plans with filtering
    List(ListArgs),

    /// Record a new resource plan
    New(NewArgs),

    /// Show a resource plan's details
    Show(ShowArgs),

    /// Edit a resource plan in your editor
    Edit(EditArgs),

    /// Delete a resource plan
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Plan title
    #[arg(long)]
    pub title: String,

    /// Resource classification
    #[arg(long, value_enum, default_value = "people")]
    pub resource_type: ResourceType,

    #[arg(long)]
    pub description: Option<String>,

    /// Responsible user email (default: acting user)
    #[arg(long)]
    pub responsible: Option<String>,

    /// Planned date (YYYY-MM-DD; default: today)
    #[arg(long)]
    pub planned: Option<chrono::NaiveDate>,

    /// Owning organisation (ID, @N, or name)
    #[arg(long)]
    pub org: Option<String>,
}

pub fn run(cmd: ResourceCommands, global: &GlobalOpts) -> Result<()> {
    let project = utils::open_project(global)?;
    match cmd {
        ResourceCommands::List(args) => {
            utils::run_list::<ResourcePlan>(&project, EntityPrefix::Res, &args, global)
        }
        ResourceCommands::New(args) => run_new(args, global),
        ResourceCommands::Show(args) => {
            utils::run_show::<ResourcePlan>(&project, EntityPrefix::Res, &args.id, global)
        }
        ResourceCommands::Edit(args) => {
            utils::run_edit::<ResourcePlan>(&project, EntityPrefix::Res, &args.id, &Config::load())
        }
        ResourceCommands::Delete(args) => {
            utils::run_delete::<ResourcePlan>(&project, EntityPrefix::Res, &args)
        }
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let project = utils::open_project(global)?;
    let config = Config::load();

    let mut plan = ResourcePlan::new(args.title, args.resource_type, config.author());
    plan.description = args.description;
    if let Some(date) = args.planned {
        plan.planned_date = date;
    }
    plan.responsible = args
        .responsible
        .clone()
        .or_else(|| global.as_user.clone())
        .or_else(|| config.acting_user());
    if let Some(ref org_query) = args.org {
        plan.organisation = Some(utils::resolve_organisation(&project, org_query)?.id);
    }

    let path = store::save(&project, &mut plan).map_err(|e| miette::miette!("{}", e))?;
    utils::print_created(&project, &plan.id, &path);
    Ok(())
}
