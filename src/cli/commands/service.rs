//! `qmt service` command - service report management

use clap::Subcommand;
use miette::Result;

use crate::cli::commands::utils::{self, DeleteArgs, EditArgs, ListArgs, ShowArgs};
use crate::cli::GlobalOpts;
use crate::core::{store, Config, EntityPrefix};
use crate::entities::ServiceReport;

#[derive(Subcommand, Debug)]
pub enum ServiceCommands {
    /// List service reports with filtering
    List(ListArgs),

    /// Record a new service report
    New(NewArgs),

    /// Show a service report's details
    Show(ShowArgs),

    /// Edit a service report in your editor
    Edit(EditArgs),

    /// Delete a service report
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Report title
    #[arg(long)]
    pub title: String,

    /// Delivering user email (default: acting user)
    #[arg(long)]
    pub provider: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    /// Mark the delivery as noncompliant with requirements
    #[arg(long)]
    pub noncompliant: bool,

    /// Service date (YYYY-MM-DD; default: today)
    #[arg(long)]
    pub date: Option<chrono::NaiveDate>,

    /// Owning organisation (ID, @N, or name)
    #[arg(long)]
    pub org: Option<String>,
}

pub fn run(cmd: ServiceCommands, global: &GlobalOpts) -> Result<()> {
    let project = utils::open_project(global)?;
    match cmd {
        ServiceCommands::List(args) => {
            utils::run_list::<ServiceReport>(&project, EntityPrefix::Svc, &args, global)
        }
        ServiceCommands::New(args) => run_new(args, global),
        ServiceCommands::Show(args) => {
            utils::run_show::<ServiceReport>(&project, EntityPrefix::Svc, &args.id, global)
        }
        ServiceCommands::Edit(args) => {
            utils::run_edit::<ServiceReport>(&project, EntityPrefix::Svc, &args.id, &Config::load())
        }
        ServiceCommands::Delete(args) => {
            utils::run_delete::<ServiceReport>(&project, EntityPrefix::Svc, &args)
        }
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let project = utils::open_project(global)?;
    let config = Config::load();

    let mut report = ServiceReport::new(args.title, config.author());
    report.description = args.description;
    report.compliance_with_requirements = !args.noncompliant;
    if let Some(date) = args.date {
        report.service_date = date;
    }
    report.service_provider = args
        .provider
        .clone()
        .or_else(|| global.as_user.clone())
        .or_else(|| config.acting_user());
    if let Some(ref org_query) = args.org {
        report.organisation = Some(utils::resolve_organisation(&project, org_query)?.id);
    }

    let path = store::save(&project, &mut report).map_err(|e| miette::miette!("{}", e))?;
    utils::print_created(&project, &report.id, &path);
    Ok(())
}
