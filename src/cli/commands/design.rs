//! `qmt design` command - design project management

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::commands::utils::{self, DeleteArgs, EditArgs, ListArgs, ShowArgs};
use crate::cli::GlobalOpts;
use crate::core::attach::{store_attachment, AttachmentKind};
use crate::core::{store, Config, EntityPrefix};
use crate::entities::design_project::{
    DesignDepartment, DesignProject, DesignRecord, DesignRecordType,
};

#[derive(Subcommand, Debug)]
pub enum DesignCommands {
    /// List design projects with filtering
    List(ListArgs),

    /// Create a new design project
    New(NewArgs),

    /// Show a design project's details
    Show(ShowArgs),

    /// Edit a design project in your editor (records are edited inline)
    Edit(EditArgs),

    /// Delete a design project
    Delete(DeleteArgs),

    /// Add a design record (plan, review, verification, validation)
    Record(RecordArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Project title
    #[arg(long)]
    pub title: String,

    /// Responsible department
    #[arg(long, value_enum, default_value = "technical")]
    pub department: DesignDepartment,

    /// Owning user email (default: acting user)
    #[arg(long)]
    pub owner: Option<String>,

    /// Planned end date (YYYY-MM-DD)
    #[arg(long)]
    pub planned_end: Option<chrono::NaiveDate>,

    /// Owning organisation (ID, @N, or name)
    #[arg(long)]
    pub org: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct RecordArgs {
    /// Design project ID, @N, or title
    pub id: String,

    /// Record type
    #[arg(long, value_enum, default_value = "plan")]
    pub record_type: DesignRecordType,

    #[arg(long)]
    pub description: Option<String>,

    /// Evidence document to store as an attachment
    #[arg(long)]
    pub file: Option<std::path::PathBuf>,
}

pub fn run(cmd: DesignCommands, global: &GlobalOpts) -> Result<()> {
    let project = utils::open_project(global)?;
    match cmd {
        DesignCommands::List(args) => {
            utils::run_list::<DesignProject>(&project, EntityPrefix::Dsn, &args, global)
        }
        DesignCommands::New(args) => run_new(args, global),
        DesignCommands::Show(args) => {
            utils::run_show::<DesignProject>(&project, EntityPrefix::Dsn, &args.id, global)
        }
        DesignCommands::Edit(args) => {
            utils::run_edit::<DesignProject>(&project, EntityPrefix::Dsn, &args.id, &Config::load())
        }
        DesignCommands::Delete(args) => {
            utils::run_delete::<DesignProject>(&project, EntityPrefix::Dsn, &args)
        }
        DesignCommands::Record(args) => run_record(args, global),
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let project = utils::open_project(global)?;
    let config = Config::load();

    let mut design = DesignProject::new(args.title, config.author());
    design.department = args.department;
    design.planned_end_date = args.planned_end;
    design.owner = args
        .owner
        .clone()
        .or_else(|| global.as_user.clone())
        .or_else(|| config.acting_user());
    if let Some(ref org_query) = args.org {
        design.organisation = Some(utils::resolve_organisation(&project, org_query)?.id);
    }

    let path = store::save(&project, &mut design).map_err(|e| miette::miette!("{}", e))?;
    utils::print_created(&project, &design.id, &path);
    Ok(())
}

fn run_record(args: RecordArgs, global: &GlobalOpts) -> Result<()> {
    let project = utils::open_project(global)?;
    let config = Config::load();
    let (_, mut design) =
        utils::find_record::<DesignProject>(&project, EntityPrefix::Dsn, &args.id)?;

    let document_file = match args.file {
        Some(ref file) => Some(
            store_attachment(&project, AttachmentKind::DesignRecords, file)
                .map_err(|e| miette::miette!("{}", e))?,
        ),
        None => None,
    };

    design.add_record(DesignRecord {
        record_type: args.record_type,
        description: args.description,
        document_file,
        created_by: global.as_user.clone().or_else(|| config.acting_user()),
        created_at: chrono::Utc::now(),
        notes: None,
    });
    store::save(&project, &mut design).map_err(|e| miette::miette!("{}", e))?;

    println!(
        "{} Added {} record to '{}'",
        style("✓").green(),
        args.record_type,
        design.title
    );
    Ok(())
}
