//! `qmt opp` command - opportunity management

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::commands::utils::{self, DeleteArgs, EditArgs, ListArgs, ShowArgs};
use crate::cli::GlobalOpts;
use crate::core::{store, Config, EntityPrefix};
use crate::entities::Opportunity;

#[derive(Subcommand, Debug)]
pub enum OppCommands {
    /// List opportunities with filtering
    List(ListArgs),

    /// Create a new opportunity (score = benefit * feasibility, computed on save)
    New(NewArgs),

    /// Show an opportunity's details
    Show(ShowArgs),

    /// Edit an opportunity in your editor (score recomputed on save)
    Edit(EditArgs),

    /// Delete an opportunity together with its responses
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Title
    #[arg(long)]
    pub title: String,

    /// Identifying user email (deletion-protected; default: acting user)
    #[arg(long)]
    pub identified_by: Option<String>,

    /// Benefit on a 1-5 scale
    #[arg(long)]
    pub benefit: Option<u8>,

    /// Feasibility on a 1-5 scale
    #[arg(long)]
    pub feasibility: Option<u8>,

    #[arg(long)]
    pub description: Option<String>,

    /// Owning organisation (ID, @N, or name)
    #[arg(long)]
    pub org: Option<String>,
}

pub fn run(cmd: OppCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        OppCommands::List(args) => {
            let project = utils::open_project(global)?;
            utils::run_list::<Opportunity>(&project, EntityPrefix::Opp, &args, global)
        }
        OppCommands::New(args) => run_new(args, global),
        OppCommands::Show(args) => {
            let project = utils::open_project(global)?;
            utils::run_show::<Opportunity>(&project, EntityPrefix::Opp, &args.id, global)
        }
        OppCommands::Edit(args) => {
            let project = utils::open_project(global)?;
            utils::run_edit::<Opportunity>(&project, EntityPrefix::Opp, &args.id, &Config::load())
        }
        OppCommands::Delete(args) => run_delete(args, global),
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let project = utils::open_project(global)?;
    let config = Config::load();

    let identified_by = args
        .identified_by
        .clone()
        .or_else(|| global.as_user.clone())
        .or_else(|| config.acting_user())
        .ok_or_else(|| {
            miette::miette!("--identified-by is required when no acting user is configured")
        })?;

    let mut opp = Opportunity::new(args.title, identified_by, config.author());
    opp.benefit = args.benefit;
    opp.feasibility = args.feasibility;
    opp.description = args.description;
    if let Some(ref org_query) = args.org {
        opp.organisation = Some(utils::resolve_organisation(&project, org_query)?.id);
    }

    let path = store::save(&project, &mut opp).map_err(|e| miette::miette!("{}", e))?;
    utils::print_created(&project, &opp.id, &path);
    if let Some(score) = opp.score {
        println!("   Score: {}", style(score).yellow());
    }
    Ok(())
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let project = utils::open_project(global)?;
    let (_, opp) = utils::find_record::<Opportunity>(&project, EntityPrefix::Opp, &args.id)?;

    let prompt = format!("Delete opportunity '{}' and its responses?", opp.title);
    if !utils::confirm_delete(&prompt, args.yes)? {
        println!("Aborted.");
        return Ok(());
    }

    let stats = store::delete_with_responses(&project, EntityPrefix::Opp, &opp.id)
        .map_err(|e| miette::miette!("{}", e))?;
    println!(
        "{} Deleted '{}' ({} record(s) removed)",
        style("✓").green(),
        opp.title,
        stats.records_deleted
    );
    Ok(())
}
