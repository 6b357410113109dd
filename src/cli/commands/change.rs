//! `qmt change` command - QMS change management

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::commands::utils::{self, DeleteArgs, EditArgs, ListArgs, ShowArgs};
use crate::cli::GlobalOpts;
use crate::core::{store, Config, EntityPrefix};
use crate::entities::change::{ControlRecord, QmsChange};

#[derive(Subcommand, Debug)]
pub enum ChangeCommands {
    /// List changes with filtering
    List(ListArgs),

    /// Record a new change request
    New(NewArgs),

    /// Show a change's details
    Show(ShowArgs),

    /// Edit a change in your editor (control records are edited inline)
    Edit(EditArgs),

    /// Delete a change
    Delete(DeleteArgs),

    /// Record an approval (user, date) - independent of status
    Approve(SignoffArgs),

    /// Record an implementation (user, date) - independent of status
    Implement(SignoffArgs),

    /// Add a control record to a change
    Control(ControlArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Change title
    #[arg(long)]
    pub title: String,

    /// Nature and reason for the change
    #[arg(long)]
    pub description: String,

    /// Requesting user email (default: acting user)
    #[arg(long)]
    pub requested_by: Option<String>,

    #[arg(long)]
    pub department: Option<String>,

    /// Planned date (YYYY-MM-DD)
    #[arg(long)]
    pub planned_date: Option<chrono::NaiveDate>,

    /// Owning organisation (ID, @N, or name)
    #[arg(long)]
    pub org: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct SignoffArgs {
    /// Change ID, @N, or title
    pub id: String,

    /// Signing user email (default: acting user)
    #[arg(long)]
    pub user: Option<String>,

    /// Date (YYYY-MM-DD; default: today)
    #[arg(long)]
    pub date: Option<chrono::NaiveDate>,
}

#[derive(clap::Args, Debug)]
pub struct ControlArgs {
    /// Change ID, @N, or title
    pub id: String,

    /// The control or action taken
    pub action: String,

    /// Responsible user email
    #[arg(long)]
    pub responsible: Option<String>,

    /// Verification or validation of the change
    #[arg(long)]
    pub verification: Option<String>,

    #[arg(long)]
    pub document_reference: Option<String>,
}

pub fn run(cmd: ChangeCommands, global: &GlobalOpts) -> Result<()> {
    let project = utils::open_project(global)?;
    match cmd {
        ChangeCommands::List(args) => {
            utils::run_list::<QmsChange>(&project, EntityPrefix::Chg, &args, global)
        }
        ChangeCommands::New(args) => run_new(args, global),
        ChangeCommands::Show(args) => {
            utils::run_show::<QmsChange>(&project, EntityPrefix::Chg, &args.id, global)
        }
        ChangeCommands::Edit(args) => {
            utils::run_edit::<QmsChange>(&project, EntityPrefix::Chg, &args.id, &Config::load())
        }
        ChangeCommands::Delete(args) => {
            utils::run_delete::<QmsChange>(&project, EntityPrefix::Chg, &args)
        }
        ChangeCommands::Approve(args) => run_signoff(args, global, Signoff::Approve),
        ChangeCommands::Implement(args) => run_signoff(args, global, Signoff::Implement),
        ChangeCommands::Control(args) => run_control(args, global),
    }
}

enum Signoff {
    Approve,
    Implement,
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let project = utils::open_project(global)?;
    let config = Config::load();

    let mut change = QmsChange::new(args.title, args.description, config.author());
    change.requested_by = args
        .requested_by
        .clone()
        .or_else(|| global.as_user.clone())
        .or_else(|| config.acting_user());
    change.department = args.department;
    change.planned_date = args.planned_date;
    if let Some(ref org_query) = args.org {
        change.organisation = Some(utils::resolve_organisation(&project, org_query)?.id);
    }

    let path = store::save(&project, &mut change).map_err(|e| miette::miette!("{}", e))?;
    utils::print_created(&project, &change.id, &path);
    Ok(())
}

fn run_signoff(args: SignoffArgs, global: &GlobalOpts, kind: Signoff) -> Result<()> {
    let project = utils::open_project(global)?;
    let config = Config::load();

    let user = args
        .user
        .clone()
        .or_else(|| global.as_user.clone())
        .or_else(|| config.acting_user())
        .ok_or_else(|| miette::miette!("--user is required when no acting user is configured"))?;
    let date = args.date.unwrap_or_else(|| chrono::Local::now().date_naive());

    let (_, mut change) = utils::find_record::<QmsChange>(&project, EntityPrefix::Chg, &args.id)?;
    let verb = match kind {
        Signoff::Approve => {
            change.approved_by = Some(user.clone());
            change.approved_date = Some(date);
            "approval"
        }
        Signoff::Implement => {
            change.implemented_by = Some(user.clone());
            change.implemented_date = Some(date);
            "implementation"
        }
    };
    store::save(&project, &mut change).map_err(|e| miette::miette!("{}", e))?;

    println!(
        "{} Recorded {} of '{}' by '{}' (status stays {})",
        style("✓").green(),
        verb,
        change.title,
        user,
        change.status
    );
    Ok(())
}

fn run_control(args: ControlArgs, global: &GlobalOpts) -> Result<()> {
    let project = utils::open_project(global)?;
    let (_, mut change) = utils::find_record::<QmsChange>(&project, EntityPrefix::Chg, &args.id)?;

    change.control_records.push(ControlRecord {
        control_action: args.action.clone(),
        responsible_person: args.responsible,
        control_date: chrono::Local::now().date_naive(),
        verification: args.verification,
        document_reference: args.document_reference,
        evidence: None,
        notes: None,
    });
    store::save(&project, &mut change).map_err(|e| miette::miette!("{}", e))?;

    println!(
        "{} Added control record to '{}'",
        style("✓").green(),
        change.title
    );
    Ok(())
}
