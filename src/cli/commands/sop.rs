//! `qmt sop` command - standard operating procedure management

use clap::Subcommand;
use miette::Result;

use crate::cli::commands::utils::{self, DeleteArgs, EditArgs, ListArgs, ShowArgs};
use crate::cli::GlobalOpts;
use crate::core::attach::{store_attachment, AttachmentKind};
use crate::core::{store, Config, EntityPrefix};
use crate::entities::sop::{Sop, SopDepartment};

#[derive(Subcommand, Debug)]
pub enum SopCommands {
    /// List SOPs with filtering
    List(ListArgs),

    /// Register a new SOP
    New(NewArgs),

    /// Show an SOP's details
    Show(ShowArgs),

    /// Edit an SOP in your editor
    Edit(EditArgs),

    /// Delete an SOP
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// SOP title
    #[arg(long)]
    pub title: String,

    /// Owning department
    #[arg(long, value_enum, default_value = "operations")]
    pub department: SopDepartment,

    #[arg(long)]
    pub description: Option<String>,

    /// Procedure document to store as an attachment
    #[arg(long)]
    pub file: Option<std::path::PathBuf>,

    /// Review date (YYYY-MM-DD)
    #[arg(long)]
    pub review_date: Option<chrono::NaiveDate>,

    /// Owning organisation (ID, @N, or name)
    #[arg(long)]
    pub org: Option<String>,
}

pub fn run(cmd: SopCommands, global: &GlobalOpts) -> Result<()> {
    let project = utils::open_project(global)?;
    match cmd {
        SopCommands::List(args) => {
            utils::run_list::<Sop>(&project, EntityPrefix::Sop, &args, global)
        }
        SopCommands::New(args) => run_new(args, global),
        SopCommands::Show(args) => {
            utils::run_show::<Sop>(&project, EntityPrefix::Sop, &args.id, global)
        }
        SopCommands::Edit(args) => {
            utils::run_edit::<Sop>(&project, EntityPrefix::Sop, &args.id, &Config::load())
        }
        SopCommands::Delete(args) => utils::run_delete::<Sop>(&project, EntityPrefix::Sop, &args),
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let project = utils::open_project(global)?;
    let config = Config::load();

    let mut sop = Sop::new(args.title, config.author());
    sop.department = args.department;
    sop.description = args.description;
    sop.review_date = args.review_date;
    sop.created_by = global.as_user.clone().or_else(|| config.acting_user());
    if let Some(ref org_query) = args.org {
        sop.organisation = Some(utils::resolve_organisation(&project, org_query)?.id);
    }
    if let Some(ref file) = args.file {
        sop.file = Some(
            store_attachment(&project, AttachmentKind::Sops, file)
                .map_err(|e| miette::miette!("{}", e))?,
        );
    }

    let path = store::save(&project, &mut sop).map_err(|e| miette::miette!("{}", e))?;
    utils::print_created(&project, &sop.id, &path);
    Ok(())
}
