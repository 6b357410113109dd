//! `qmt response` command - risk/opportunity response management

use clap::Subcommand;
use miette::Result;

use crate::cli::commands::utils::{self, DeleteArgs, EditArgs, ListArgs, ShowArgs};
use crate::cli::GlobalOpts;
use crate::core::{store, Config, EntityPrefix};
use crate::entities::response::{Response, ResponseType};
use crate::entities::{Opportunity, Risk};

#[derive(Subcommand, Debug)]
pub enum ResponseCommands {
    /// List responses with filtering
    List(ListArgs),

    /// Create a new response to a risk or an opportunity
    New(NewArgs),

    /// Show a response's details
    Show(ShowArgs),

    /// Edit a response in your editor
    Edit(EditArgs),

    /// Delete a response
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Response strategy
    #[arg(long, value_enum)]
    pub response_type: ResponseType,

    /// What will be done
    #[arg(long)]
    pub description: String,

    /// Responsible user email (deletion-protected; default: acting user)
    #[arg(long)]
    pub owner: Option<String>,

    /// Parent risk (ID, @N, or title)
    #[arg(long)]
    pub risk: Option<String>,

    /// Parent opportunity (ID, @N, or title)
    #[arg(long)]
    pub opportunity: Option<String>,

    /// Due date (YYYY-MM-DD)
    #[arg(long)]
    pub due_date: Option<chrono::NaiveDate>,
}

pub fn run(cmd: ResponseCommands, global: &GlobalOpts) -> Result<()> {
    let project = utils::open_project(global)?;
    match cmd {
        ResponseCommands::List(args) => {
            utils::run_list::<Response>(&project, EntityPrefix::Resp, &args, global)
        }
        ResponseCommands::New(args) => run_new(args, global),
        ResponseCommands::Show(args) => {
            utils::run_show::<Response>(&project, EntityPrefix::Resp, &args.id, global)
        }
        ResponseCommands::Edit(args) => {
            utils::run_edit::<Response>(&project, EntityPrefix::Resp, &args.id, &Config::load())
        }
        ResponseCommands::Delete(args) => {
            utils::run_delete::<Response>(&project, EntityPrefix::Resp, &args)
        }
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let project = utils::open_project(global)?;
    let config = Config::load();

    let owner = args
        .owner
        .clone()
        .or_else(|| global.as_user.clone())
        .or_else(|| config.acting_user())
        .ok_or_else(|| miette::miette!("--owner is required when no acting user is configured"))?;

    let mut response = Response::new(
        args.response_type,
        args.description,
        owner,
        config.author(),
    );
    response.due_date = args.due_date;

    if let Some(ref risk_query) = args.risk {
        let (_, risk) = utils::find_record::<Risk>(&project, EntityPrefix::Risk, risk_query)?;
        response.risk = Some(risk.id);
    }
    if let Some(ref opp_query) = args.opportunity {
        let (_, opp) =
            utils::find_record::<Opportunity>(&project, EntityPrefix::Opp, opp_query)?;
        response.opportunity = Some(opp.id);
    }

    let path = store::save(&project, &mut response).map_err(|e| miette::miette!("{}", e))?;
    utils::print_created(&project, &response.id, &path);
    Ok(())
}
