//! `qmt awareness` command - awareness record management

use clap::Subcommand;
use miette::Result;

use crate::cli::commands::utils::{self, DeleteArgs, EditArgs, ListArgs, ShowArgs};
use crate::cli::GlobalOpts;
use crate::core::{store, Config, EntityPrefix};
use crate::entities::AwarenessRecord;

#[derive(Subcommand, Debug)]
pub enum AwarenessCommands {
    /// List awareness records with filtering
    List(ListArgs),

    /// Record a new awareness communication
    New(NewArgs),

    /// Show an awareness record's details
    Show(ShowArgs),

    /// Edit an awareness record in your editor
    Edit(EditArgs),

    /// Delete an awareness record
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Record title
    #[arg(long)]
    pub title: String,

    /// Who received the communication
    #[arg(long)]
    pub audience: String,

    /// e.g. "Meeting", "Email", "Poster", "Training"
    #[arg(long)]
    pub method: String,

    /// Communicating user email (default: acting user)
    #[arg(long)]
    pub communicator: Option<String>,

    /// Date (YYYY-MM-DD; default: today)
    #[arg(long)]
    pub date: Option<chrono::NaiveDate>,

    /// Owning organisation (ID, @N, or name)
    #[arg(long)]
    pub org: Option<String>,
}

pub fn run(cmd: AwarenessCommands, global: &GlobalOpts) -> Result<()> {
    let project = utils::open_project(global)?;
    match cmd {
        AwarenessCommands::List(args) => {
            utils::run_list::<AwarenessRecord>(&project, EntityPrefix::Awr, &args, global)
        }
        AwarenessCommands::New(args) => run_new(args, global),
        AwarenessCommands::Show(args) => {
            utils::run_show::<AwarenessRecord>(&project, EntityPrefix::Awr, &args.id, global)
        }
        AwarenessCommands::Edit(args) => utils::run_edit::<AwarenessRecord>(
            &project,
            EntityPrefix::Awr,
            &args.id,
            &Config::load(),
        ),
        AwarenessCommands::Delete(args) => {
            utils::run_delete::<AwarenessRecord>(&project, EntityPrefix::Awr, &args)
        }
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let project = utils::open_project(global)?;
    let config = Config::load();

    let mut record =
        AwarenessRecord::new(args.title, args.audience, args.method, config.author());
    if let Some(date) = args.date {
        record.date = date;
    }
    record.communicator = args
        .communicator
        .clone()
        .or_else(|| global.as_user.clone())
        .or_else(|| config.acting_user());
    if let Some(ref org_query) = args.org {
        record.organisation = Some(utils::resolve_organisation(&project, org_query)?.id);
    }

    let path = store::save(&project, &mut record).map_err(|e| miette::miette!("{}", e))?;
    utils::print_created(&project, &record.id, &path);
    Ok(())
}
