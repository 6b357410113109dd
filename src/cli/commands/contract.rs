//! `qmt contract` command - contract review management

use clap::Subcommand;
use miette::Result;

use crate::cli::commands::utils::{self, DeleteArgs, EditArgs, ListArgs, ShowArgs};
use crate::cli::GlobalOpts;
use crate::core::{store, Config, EntityPrefix};
use crate::entities::contract_review::{ContractDepartment, ContractReview};

#[derive(Subcommand, Debug)]
pub enum ContractCommands {
    /// List contract reviews with filtering
    List(ListArgs),

    /// Record a new contract review
    New(NewArgs),

    /// Show a contract review's details
    Show(ShowArgs),

    /// Edit a contract review in your editor
    Edit(EditArgs),

    /// Delete a contract review
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Customer name
    #[arg(long)]
    pub customer: String,

    #[arg(long)]
    pub contract_number: Option<String>,

    /// Reviewing department
    #[arg(long, value_enum, default_value = "sales")]
    pub department: ContractDepartment,

    /// Reviewing user email (default: acting user)
    #[arg(long)]
    pub reviewed_by: Option<String>,

    #[arg(long)]
    pub findings: Option<String>,

    /// Owning organisation (ID, @N, or name)
    #[arg(long)]
    pub org: Option<String>,
}

pub fn run(cmd: ContractCommands, global: &GlobalOpts) -> Result<()> {
    let project = utils::open_project(global)?;
    match cmd {
        ContractCommands::List(args) => {
            utils::run_list::<ContractReview>(&project, EntityPrefix::Ctr, &args, global)
        }
        ContractCommands::New(args) => run_new(args, global),
        ContractCommands::Show(args) => {
            utils::run_show::<ContractReview>(&project, EntityPrefix::Ctr, &args.id, global)
        }
        ContractCommands::Edit(args) => {
            utils::run_edit::<ContractReview>(&project, EntityPrefix::Ctr, &args.id, &Config::load())
        }
        ContractCommands::Delete(args) => {
            utils::run_delete::<ContractReview>(&project, EntityPrefix::Ctr, &args)
        }
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let project = utils::open_project(global)?;
    let config = Config::load();

    let mut review = ContractReview::new(args.customer, config.author());
    review.contract_number = args.contract_number;
    review.department = args.department;
    review.findings = args.findings;
    review.reviewed_by = args
        .reviewed_by
        .clone()
        .or_else(|| global.as_user.clone())
        .or_else(|| config.acting_user());
    if let Some(ref org_query) = args.org {
        review.organisation = Some(utils::resolve_organisation(&project, org_query)?.id);
    }

    let path = store::save(&project, &mut review).map_err(|e| miette::miette!("{}", e))?;
    utils::print_created(&project, &review.id, &path);
    Ok(())
}
