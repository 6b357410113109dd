//! `qmt ncr` command - nonconformance record management

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::commands::utils::{self, DeleteArgs, EditArgs, ListArgs, ShowArgs};
use crate::cli::GlobalOpts;
use crate::core::{store, Config, EntityPrefix};
use crate::entities::ncr::{NcrDepartment, Nonconformance};

#[derive(Subcommand, Debug)]
pub enum NcrCommands {
    /// List nonconformance records with filtering
    List(ListArgs),

    /// Register a new nonconformance
    New(NewArgs),

    /// Show a nonconformance's details
    Show(ShowArgs),

    /// Edit a nonconformance in your editor
    Edit(EditArgs),

    /// Delete a nonconformance
    Delete(DeleteArgs),

    /// Record the corrective action taken
    Correct(CorrectArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Short title of the nonconformity
    #[arg(long)]
    pub title: String,

    /// What was found
    #[arg(long)]
    pub description: String,

    /// Reporting user email (default: acting user)
    #[arg(long)]
    pub reported_by: Option<String>,

    /// Reporting department
    #[arg(long, value_enum, default_value = "qa")]
    pub department: NcrDepartment,

    /// Detection date (YYYY-MM-DD; default: today)
    #[arg(long)]
    pub detected: Option<chrono::NaiveDate>,

    /// Owning organisation (ID, @N, or name)
    #[arg(long)]
    pub org: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct CorrectArgs {
    /// NCR ID, @N, or title
    pub id: String,

    /// The corrective action taken
    pub action: String,
}

pub fn run(cmd: NcrCommands, global: &GlobalOpts) -> Result<()> {
    let project = utils::open_project(global)?;
    match cmd {
        NcrCommands::List(args) => {
            utils::run_list::<Nonconformance>(&project, EntityPrefix::Ncr, &args, global)
        }
        NcrCommands::New(args) => run_new(args, global),
        NcrCommands::Show(args) => {
            utils::run_show::<Nonconformance>(&project, EntityPrefix::Ncr, &args.id, global)
        }
        NcrCommands::Edit(args) => {
            utils::run_edit::<Nonconformance>(&project, EntityPrefix::Ncr, &args.id, &Config::load())
        }
        NcrCommands::Delete(args) => {
            utils::run_delete::<Nonconformance>(&project, EntityPrefix::Ncr, &args)
        }
        NcrCommands::Correct(args) => run_correct(args, global),
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let project = utils::open_project(global)?;
    let config = Config::load();

    let mut ncr = Nonconformance::new(args.title, args.description, config.author());
    ncr.department = args.department;
    if let Some(date) = args.detected {
        ncr.detected_date = date;
    }
    ncr.reported_by = args
        .reported_by
        .clone()
        .or_else(|| global.as_user.clone())
        .or_else(|| config.acting_user());
    if let Some(ref org_query) = args.org {
        ncr.organisation = Some(utils::resolve_organisation(&project, org_query)?.id);
    }

    let path = store::save(&project, &mut ncr).map_err(|e| miette::miette!("{}", e))?;
    utils::print_created(&project, &ncr.id, &path);
    Ok(())
}

fn run_correct(args: CorrectArgs, global: &GlobalOpts) -> Result<()> {
    let project = utils::open_project(global)?;
    let (_, mut ncr) =
        utils::find_record::<Nonconformance>(&project, EntityPrefix::Ncr, &args.id)?;

    ncr.corrective_action_taken = Some(args.action);
    store::save(&project, &mut ncr).map_err(|e| miette::miette!("{}", e))?;

    println!(
        "{} Recorded corrective action on '{}' (status stays {})",
        style("✓").green(),
        ncr.title,
        ncr.status
    );
    Ok(())
}
