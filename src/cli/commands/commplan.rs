//! `qmt commplan` command - communication plan management

use clap::Subcommand;
use miette::Result;

use crate::cli::commands::utils::{self, DeleteArgs, EditArgs, ListArgs, ShowArgs};
use crate::cli::GlobalOpts;
use crate::core::{store, Config, EntityPrefix};
use crate::entities::CommunicationPlan;

#[derive(Subcommand, Debug)]
pub enum CommplanCommands {
    /// List communication plans with filtering
    List(ListArgs),

    /// Record a new communication plan
    New(NewArgs),

    /// Show a communication plan's details
    Show(ShowArgs),

    /// Edit a communication plan in your editor
    Edit(EditArgs),

    /// Delete a communication plan
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Plan title
    #[arg(long)]
    pub title: String,

    /// Target audience
    #[arg(long)]
    pub audience: String,

    #[arg(long)]
    pub method: String,

    /// Responsible user email (default: acting user)
    #[arg(long)]
    pub responsible: Option<String>,

    /// e.g. "Weekly", "Monthly"
    #[arg(long)]
    pub frequency: Option<String>,

    /// Start date (YYYY-MM-DD; default: today)
    #[arg(long)]
    pub start: Option<chrono::NaiveDate>,

    /// Owning organisation (ID, @N, or name)
    #[arg(long)]
    pub org: Option<String>,
}

pub fn run(cmd: CommplanCommands, global: &GlobalOpts) -> Result<()> {
    let project = utils::open_project(global)?;
    match cmd {
        CommplanCommands::List(args) => {
            utils::run_list::<CommunicationPlan>(&project, EntityPrefix::Com, &args, global)
        }
        CommplanCommands::New(args) => run_new(args, global),
        CommplanCommands::Show(args) => {
            utils::run_show::<CommunicationPlan>(&project, EntityPrefix::Com, &args.id, global)
        }
        CommplanCommands::Edit(args) => utils::run_edit::<CommunicationPlan>(
            &project,
            EntityPrefix::Com,
            &args.id,
            &Config::load(),
        ),
        CommplanCommands::Delete(args) => {
            utils::run_delete::<CommunicationPlan>(&project, EntityPrefix::Com, &args)
        }
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let project = utils::open_project(global)?;
    let config = Config::load();

    let mut plan =
        CommunicationPlan::new(args.title, args.audience, args.method, config.author());
    plan.frequency = args.frequency;
    if let Some(date) = args.start {
        plan.start_date = date;
    }
    plan.responsible_person = args
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
