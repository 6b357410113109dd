//! `qmt register` command - document register management

use clap::Subcommand;
use miette::Result;

use crate::cli::commands::utils::{self, DeleteArgs, EditArgs, ListArgs, ShowArgs};
use crate::cli::GlobalOpts;
use crate::core::attach::{store_attachment, AttachmentKind};
use crate::core::{store, Config, EntityPrefix};
use crate::entities::DocumentRegister;

#[derive(Subcommand, Debug)]
pub enum RegisterCommands {
    /// List document register entries with filtering
    List(ListArgs),

    /// Register a new controlled document
    New(NewArgs),

    /// Show a register entry's details
    Show(ShowArgs),

    /// Edit a register entry in your editor
    Edit(EditArgs),

    /// Delete a register entry
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Document title
    #[arg(long)]
    pub title: String,

    /// e.g. "procedure", "manual", "record"
    #[arg(long)]
    pub document_type: Option<String>,

    /// Responsible user email (default: acting user)
    #[arg(long)]
    pub responsible: Option<String>,

    #[arg(long)]
    pub version: Option<String>,

    /// Controlled document to store as an attachment
    #[arg(long)]
    pub file: Option<std::path::PathBuf>,

    /// Issue date (YYYY-MM-DD; default: today)
    #[arg(long)]
    pub issued: Option<chrono::NaiveDate>,

    /// Owning organisation (ID, @N, or name)
    #[arg(long)]
    pub org: Option<String>,
}

pub fn run(cmd: RegisterCommands, global: &GlobalOpts) -> Result<()> {
    let project = utils::open_project(global)?;
    match cmd {
        RegisterCommands::List(args) => {
            utils::run_list::<DocumentRegister>(&project, EntityPrefix::Doc, &args, global)
        }
        RegisterCommands::New(args) => run_new(args, global),
        RegisterCommands::Show(args) => {
            utils::run_show::<DocumentRegister>(&project, EntityPrefix::Doc, &args.id, global)
        }
        RegisterCommands::Edit(args) => utils::run_edit::<DocumentRegister>(
            &project,
            EntityPrefix::Doc,
            &args.id,
            &Config::load(),
        ),
        RegisterCommands::Delete(args) => {
            utils::run_delete::<DocumentRegister>(&project, EntityPrefix::Doc, &args)
        }
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let project = utils::open_project(global)?;
    let config = Config::load();

    let mut entry = DocumentRegister::new(args.title, config.author());
    entry.document_type = args.document_type;
    entry.version = args.version;
    if let Some(date) = args.issued {
        entry.issue_date = date;
    }
    entry.responsible_person = args
        .responsible
        .clone()
        .or_else(|| global.as_user.clone())
        .or_else(|| config.acting_user());
    if let Some(ref org_query) = args.org {
        entry.organisation = Some(utils::resolve_organisation(&project, org_query)?.id);
    }
    if let Some(ref file) = args.file {
        entry.file = Some(
            store_attachment(&project, AttachmentKind::DocumentRegisters, file)
                .map_err(|e| miette::miette!("{}", e))?,
        );
    }

    let path = store::save(&project, &mut entry).map_err(|e| miette::miette!("{}", e))?;
    utils::print_created(&project, &entry.id, &path);
    Ok(())
}
