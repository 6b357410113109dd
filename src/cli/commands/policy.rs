//! `qmt policy` command - quality policy management

use clap::Subcommand;
use miette::Result;

use crate::cli::commands::utils::{self, DeleteArgs, EditArgs, ListArgs, ShowArgs};
use crate::cli::GlobalOpts;
use crate::core::{store, Config, EntityPrefix};
use crate::entities::QualityPolicy;

#[derive(Subcommand, Debug)]
pub enum PolicyCommands {
    /// List quality policies
    List(ListArgs),

    /// Record a new quality policy
    New(NewArgs),

    /// Show a policy's details
    Show(ShowArgs),

    /// Edit a policy in your editor (communications and evidence are inline)
    Edit(EditArgs),

    /// Delete a policy
    Delete(DeleteArgs),

    /// Record policy approval (user, date)
    Approve(ApproveArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// The policy text
    #[arg(long)]
    pub content: String,

    /// Developing user email (deletion-protected; default: acting user)
    #[arg(long)]
    pub developed_by: Option<String>,

    #[arg(long)]
    pub title: Option<String>,

    /// Effective date (YYYY-MM-DD; default: today)
    #[arg(long)]
    pub effective_date: Option<chrono::NaiveDate>,

    /// Owning organisation (ID, @N, or name)
    #[arg(long)]
    pub org: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ApproveArgs {
    /// Policy ID, @N, or title
    pub id: String,

    /// Approving user email (deletion-protected; default: acting user)
    #[arg(long)]
    pub approved_by: Option<String>,

    /// Approval date (YYYY-MM-DD; default: today)
    #[arg(long)]
    pub date: Option<chrono::NaiveDate>,
}

pub fn run(cmd: PolicyCommands, global: &GlobalOpts) -> Result<()> {
    let project = utils::open_project(global)?;
    match cmd {
        PolicyCommands::List(args) => {
            utils::run_list::<QualityPolicy>(&project, EntityPrefix::Qpol, &args, global)
        }
        PolicyCommands::New(args) => run_new(args, global),
        PolicyCommands::Show(args) => {
            utils::run_show::<QualityPolicy>(&project, EntityPrefix::Qpol, &args.id, global)
        }
        PolicyCommands::Edit(args) => {
            utils::run_edit::<QualityPolicy>(&project, EntityPrefix::Qpol, &args.id, &Config::load())
        }
        PolicyCommands::Delete(args) => {
            utils::run_delete::<QualityPolicy>(&project, EntityPrefix::Qpol, &args)
        }
        PolicyCommands::Approve(args) => run_approve(args, global),
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let project = utils::open_project(global)?;
    let config = Config::load();

    let developed_by = args
        .developed_by
        .clone()
        .or_else(|| global.as_user.clone())
        .or_else(|| config.acting_user())
        .ok_or_else(|| {
            miette::miette!("--developed-by is required when no acting user is configured")
        })?;

    let mut policy = QualityPolicy::new(args.content, developed_by, config.author());
    if let Some(title) = args.title {
        policy.title = title;
    }
    if let Some(date) = args.effective_date {
        policy.effective_date = date;
    }
    if let Some(ref org_query) = args.org {
        policy.organisation = Some(utils::resolve_organisation(&project, org_query)?.id);
    }

    let path = store::save(&project, &mut policy).map_err(|e| miette::miette!("{}", e))?;
    utils::print_created(&project, &policy.id, &path);
    Ok(())
}

fn run_approve(args: ApproveArgs, global: &GlobalOpts) -> Result<()> {
    let project = utils::open_project(global)?;
    let config = Config::load();

    let approved_by = args
        .approved_by
        .clone()
        .or_else(|| global.as_user.clone())
        .or_else(|| config.acting_user())
        .ok_or_else(|| {
            miette::miette!("--approved-by is required when no acting user is configured")
        })?;

    let (_, mut policy) =
        utils::find_record::<QualityPolicy>(&project, EntityPrefix::Qpol, &args.id)?;
    policy.approved_by = Some(approved_by.clone());
    policy.approval_date = Some(args.date.unwrap_or_else(|| chrono::Local::now().date_naive()));
    store::save(&project, &mut policy).map_err(|e| miette::miette!("{}", e))?;

    println!(
        "{} Recorded approval of '{}' by '{}'",
        console::style("✓").green(),
        policy.title,
        approved_by
    );
    Ok(())
}
