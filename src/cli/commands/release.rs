//! `qmt release` command - product release management

use clap::Subcommand;
use miette::Result;

use crate::cli::commands::utils::{self, DeleteArgs, EditArgs, ListArgs, ShowArgs};
use crate::cli::GlobalOpts;
use crate::core::{store, Config, EntityPrefix};
use crate::entities::ProductRelease;

#[derive(Subcommand, Debug)]
pub enum ReleaseCommands {
    /// List product releases with filtering
    List(ListArgs),

    /// Record a new pending product release
    New(NewArgs),

    /// Show a product release's details
    Show(ShowArgs),

    /// Edit a product release in your editor
    Edit(EditArgs),

    /// Delete a product release
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Product or service name
    #[arg(long)]
    pub product: String,

    /// Approving user email
    #[arg(long)]
    pub approved_by: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    /// Release date (YYYY-MM-DD; default: today)
    #[arg(long)]
    pub date: Option<chrono::NaiveDate>,

    /// Owning organisation (ID, @N, or name)
    #[arg(long)]
    pub org: Option<String>,
}

pub fn run(cmd: ReleaseCommands, global: &GlobalOpts) -> Result<()> {
    let project = utils::open_project(global)?;
    match cmd {
        ReleaseCommands::List(args) => {
            utils::run_list::<ProductRelease>(&project, EntityPrefix::Rel, &args, global)
        }
        ReleaseCommands::New(args) => run_new(args, global),
        ReleaseCommands::Show(args) => {
            utils::run_show::<ProductRelease>(&project, EntityPrefix::Rel, &args.id, global)
        }
        ReleaseCommands::Edit(args) => {
            utils::run_edit::<ProductRelease>(&project, EntityPrefix::Rel, &args.id, &Config::load())
        }
        ReleaseCommands::Delete(args) => {
            utils::run_delete::<ProductRelease>(&project, EntityPrefix::Rel, &args)
        }
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let project = utils::open_project(global)?;
    let config = Config::load();

    let mut release = ProductRelease::new(args.product, config.author());
    release.description = args.description;
    release.approved_by = args.approved_by;
    if let Some(date) = args.date {
        release.release_date = date;
    }
    if let Some(ref org_query) = args.org {
        release.organisation = Some(utils::resolve_organisation(&project, org_query)?.id);
    }

    let path = store::save(&project, &mut release).map_err(|e| miette::miette!("{}", e))?;
    utils::print_created(&project, &release.id, &path);
    Ok(())
}
