//! `qmt supplier` command - supplier evaluation management

use clap::Subcommand;
use miette::Result;

use crate::cli::commands::utils::{self, DeleteArgs, EditArgs, ListArgs, ShowArgs};
use crate::cli::GlobalOpts;
use crate::core::{store, Config, EntityPrefix};
use crate::entities::SupplierEvaluation;

#[derive(Subcommand, Debug)]
pub enum SupplierCommands {
    /// List supplier evaluations with filtering
    List(ListArgs),

    /// Record a new supplier evaluation
    New(NewArgs),

    /// Show a supplier evaluation's details
    Show(ShowArgs),

    /// Edit a supplier evaluation in your editor
    Edit(EditArgs),

    /// Delete a supplier evaluation
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Supplier name
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub supplier_type: Option<String>,

    #[arg(long)]
    pub contact_person: Option<String>,

    #[arg(long)]
    pub contact_info: Option<String>,

    /// Evaluating user email (default: acting user)
    #[arg(long)]
    pub evaluator: Option<String>,

    #[arg(long)]
    pub result: Option<String>,

    /// Owning organisation (ID, @N, or name)
    #[arg(long)]
    pub org: Option<String>,
}

pub fn run(cmd: SupplierCommands, global: &GlobalOpts) -> Result<()> {
    let project = utils::open_project(global)?;
    match cmd {
        SupplierCommands::List(args) => {
            utils::run_list::<SupplierEvaluation>(&project, EntityPrefix::Sup, &args, global)
        }
        SupplierCommands::New(args) => run_new(args, global),
        SupplierCommands::Show(args) => {
            utils::run_show::<SupplierEvaluation>(&project, EntityPrefix::Sup, &args.id, global)
        }
        SupplierCommands::Edit(args) => utils::run_edit::<SupplierEvaluation>(
            &project,
            EntityPrefix::Sup,
            &args.id,
            &Config::load(),
        ),
        SupplierCommands::Delete(args) => {
            utils::run_delete::<SupplierEvaluation>(&project, EntityPrefix::Sup, &args)
        }
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let project = utils::open_project(global)?;
    let config = Config::load();

    let mut evaluation = SupplierEvaluation::new(args.name, config.author());
    evaluation.supplier_type = args.supplier_type;
    evaluation.contact_person = args.contact_person;
    evaluation.contact_info = args.contact_info;
    evaluation.evaluation_result = args.result;
    evaluation.evaluator = args
        .evaluator
        .clone()
        .or_else(|| global.as_user.clone())
        .or_else(|| config.acting_user());
    if let Some(ref org_query) = args.org {
        evaluation.organisation = Some(utils::resolve_organisation(&project, org_query)?.id);
    }

    let path = store::save(&project, &mut evaluation).map_err(|e| miette::miette!("{}", e))?;
    utils::print_created(&project, &evaluation.id, &path);
    Ok(())
}
