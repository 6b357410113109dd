//! `qmt commitment` command - leadership commitment management

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::commands::utils::{self, DeleteArgs, EditArgs, ListArgs, ShowArgs};
use crate::cli::GlobalOpts;
use crate::core::{store, Config, EntityPrefix};
use crate::entities::commitment::{AccountabilityAssignment, Commitment, CommitmentType};

#[derive(Subcommand, Debug)]
pub enum CommitmentCommands {
    /// List commitments with filtering
    List(ListArgs),

    /// Record a new leadership commitment
    New(NewArgs),

    /// Show a commitment's details
    Show(ShowArgs),

    /// Edit a commitment in your editor (accountabilities, objectives,
    /// actions, reviews, communications and attachments are edited inline)
    Edit(EditArgs),

    /// Delete a commitment
    Delete(DeleteArgs),

    /// Assign an accountability (unique per (user, role) pair)
    Assign(AssignArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Commitment title
    #[arg(long)]
    pub title: String,

    /// Committing leader email (deletion-protected; default: acting user)
    #[arg(long)]
    pub leader: Option<String>,

    /// Commitment type
    #[arg(long, value_enum, default_value = "statement")]
    pub commitment_type: CommitmentType,

    #[arg(long)]
    pub summary: Option<String>,

    /// Effective date (YYYY-MM-DD; default: today)
    #[arg(long)]
    pub effective_date: Option<chrono::NaiveDate>,

    /// Owning organisation (ID, @N, or name)
    #[arg(long)]
    pub org: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct AssignArgs {
    /// Commitment ID, @N, or title
    pub id: String,

    /// Accountable user email (deletion-protected)
    pub user: String,

    /// Role or responsibility title, e.g. "QMS Sponsor"
    #[arg(long, default_value = "")]
    pub role: String,

    #[arg(long)]
    pub description: Option<String>,

    /// Target date (YYYY-MM-DD)
    #[arg(long)]
    pub target_date: Option<chrono::NaiveDate>,
}

pub fn run(cmd: CommitmentCommands, global: &GlobalOpts) -> Result<()> {
    let project = utils::open_project(global)?;
    match cmd {
        CommitmentCommands::List(args) => {
            utils::run_list::<Commitment>(&project, EntityPrefix::Lead, &args, global)
        }
        CommitmentCommands::New(args) => run_new(args, global),
        CommitmentCommands::Show(args) => {
            utils::run_show::<Commitment>(&project, EntityPrefix::Lead, &args.id, global)
        }
        CommitmentCommands::Edit(args) => {
            utils::run_edit::<Commitment>(&project, EntityPrefix::Lead, &args.id, &Config::load())
        }
        CommitmentCommands::Delete(args) => {
            utils::run_delete::<Commitment>(&project, EntityPrefix::Lead, &args)
        }
        CommitmentCommands::Assign(args) => run_assign(args, global),
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let project = utils::open_project(global)?;
    let config = Config::load();

    let leader = args
        .leader
        .clone()
        .or_else(|| global.as_user.clone())
        .or_else(|| config.acting_user())
        .ok_or_else(|| miette::miette!("--leader is required when no acting user is configured"))?;

    let mut commitment = Commitment::new(args.title, leader, config.author());
    commitment.commitment_type = args.commitment_type;
    commitment.summary = args.summary;
    if let Some(date) = args.effective_date {
        commitment.effective_date = date;
    }
    if let Some(ref org_query) = args.org {
        commitment.organisation = Some(utils::resolve_organisation(&project, org_query)?.id);
    }

    let path = store::save(&project, &mut commitment).map_err(|e| miette::miette!("{}", e))?;
    utils::print_created(&project, &commitment.id, &path);
    Ok(())
}

fn run_assign(args: AssignArgs, global: &GlobalOpts) -> Result<()> {
    let project = utils::open_project(global)?;
    let (_, mut commitment) =
        utils::find_record::<Commitment>(&project, EntityPrefix::Lead, &args.id)?;

    commitment
        .add_accountability(AccountabilityAssignment {
            user: args.user.clone(),
            role: args.role.clone(),
            responsibility_description: args.description,
            target_date: args.target_date,
        })
        .map_err(|e| miette::miette!("{}", e))?;

    store::save(&project, &mut commitment).map_err(|e| miette::miette!("{}", e))?;

    println!(
        "{} Assigned '{}' as '{}' on '{}'",
        style("✓").green(),
        args.user,
        if args.role.is_empty() { "Accountable" } else { args.role.as_str() },
        commitment.title
    );
    Ok(())
}
