//! `qmt training` command - training record management

use clap::Subcommand;
use miette::Result;

use crate::cli::commands::utils::{self, DeleteArgs, EditArgs, ListArgs, ShowArgs};
use crate::cli::GlobalOpts;
use crate::core::{store, Config, EntityPrefix};
use crate::entities::TrainingRecord;

#[derive(Subcommand, Debug)]
pub enum TrainingCommands {
    /// List training records with filtering
    List(ListArgs),

    /// Record a new training
    New(NewArgs),

    /// Show a training record's details
    Show(ShowArgs),

    /// Edit a training record in your editor
    Edit(EditArgs),

    /// Delete a training record
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Training title
    #[arg(long)]
    pub title: String,

    /// Trained user email
    #[arg(long)]
    pub employee: Option<String>,

    #[arg(long)]
    pub training_type: Option<String>,

    #[arg(long)]
    pub trainer: Option<String>,

    /// Effectiveness assessment
    #[arg(long)]
    pub effectiveness: Option<String>,

    /// Date conducted (YYYY-MM-DD; default: today)
    #[arg(long)]
    pub date: Option<chrono::NaiveDate>,

    /// Owning organisation (ID, @N, or name)
    #[arg(long)]
    pub org: Option<String>,
}

pub fn run(cmd: TrainingCommands, global: &GlobalOpts) -> Result<()> {
    let project = utils::open_project(global)?;
    match cmd {
        TrainingCommands::List(args) => {
            utils::run_list::<TrainingRecord>(&project, EntityPrefix::Trn, &args, global)
        }
        TrainingCommands::New(args) => run_new(args, global),
        TrainingCommands::Show(args) => {
            utils::run_show::<TrainingRecord>(&project, EntityPrefix::Trn, &args.id, global)
        }
        TrainingCommands::Edit(args) => {
            utils::run_edit::<TrainingRecord>(&project, EntityPrefix::Trn, &args.id, &Config::load())
        }
        TrainingCommands::Delete(args) => {
            utils::run_delete::<TrainingRecord>(&project, EntityPrefix::Trn, &args)
        }
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let project = utils::open_project(global)?;
    let config = Config::load();

    let mut record = TrainingRecord::new(args.title, config.author());
    record.employee = args.employee;
    record.training_type = args.training_type;
    record.trainer = args.trainer;
    record.effectiveness = args.effectiveness;
    if let Some(date) = args.date {
        record.date_conducted = date;
    }
    if let Some(ref org_query) = args.org {
        record.organisation = Some(utils::resolve_organisation(&project, org_query)?.id);
    }

    let path = store::save(&project, &mut record).map_err(|e| miette::miette!("{}", e))?;
    utils::print_created(&project, &record.id, &path);
    Ok(())
}
