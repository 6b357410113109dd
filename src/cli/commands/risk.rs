//! `qmt risk` command - risk management

use clap::Subcommand;
use console::style;
use dialoguer::{theme::ColorfulTheme, Input};
use miette::{IntoDiagnostic, Result};

use crate::cli::commands::utils::{self, DeleteArgs, EditArgs, ListArgs, ShowArgs};
use crate::cli::GlobalOpts;
use crate::core::{store, Config, EntityPrefix};
use crate::entities::Risk;

#[derive(Subcommand, Debug)]
pub enum RiskCommands {
    /// List risks with filtering
    List(ListArgs),

    /// Create a new risk (score = likelihood * impact, computed on save)
    New(NewArgs),

    /// Show a risk's details
    Show(ShowArgs),

    /// Edit a risk in your editor (score recomputed on save)
    Edit(EditArgs),

    /// Delete a risk together with its responses
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Title
    #[arg(long)]
    pub title: Option<String>,

    /// Identifying user email (deletion-protected; default: acting user)
    #[arg(long)]
    pub identified_by: Option<String>,

    /// Likelihood on a 1-5 scale
    #[arg(long)]
    pub likelihood: Option<u8>,

    /// Impact on a 1-5 scale
    #[arg(long)]
    pub impact: Option<u8>,

    #[arg(long)]
    pub description: Option<String>,

    /// Owning organisation (ID, @N, or name)
    #[arg(long)]
    pub org: Option<String>,

    /// Use interactive prompts to fill in fields
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

pub fn run(cmd: RiskCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        RiskCommands::List(args) => {
            let project = utils::open_project(global)?;
            utils::run_list::<Risk>(&project, EntityPrefix::Risk, &args, global)
        }
        RiskCommands::New(args) => run_new(args, global),
        RiskCommands::Show(args) => {
            let project = utils::open_project(global)?;
            utils::run_show::<Risk>(&project, EntityPrefix::Risk, &args.id, global)
        }
        RiskCommands::Edit(args) => {
            let project = utils::open_project(global)?;
            utils::run_edit::<Risk>(&project, EntityPrefix::Risk, &args.id, &Config::load())
        }
        RiskCommands::Delete(args) => run_delete(args, global),
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let project = utils::open_project(global)?;
    let config = Config::load();

    let (title, likelihood, impact) = if args.interactive {
        let theme = ColorfulTheme::default();
        let title: String = Input::with_theme(&theme)
            .with_prompt("Risk title")
            .interact_text()
            .into_diagnostic()?;
        let likelihood: u8 = Input::with_theme(&theme)
            .with_prompt("Likelihood (1-5)")
            .default(3)
            .interact_text()
            .into_diagnostic()?;
        let impact: u8 = Input::with_theme(&theme)
            .with_prompt("Impact (1-5)")
            .default(3)
            .interact_text()
            .into_diagnostic()?;
        (title, Some(likelihood), Some(impact))
    } else {
        let title = args
            .title
            .clone()
            .ok_or_else(|| miette::miette!("--title is required (or use --interactive)"))?;
        (title, args.likelihood, args.impact)
    };

    let identified_by = args
        .identified_by
        .clone()
        .or_else(|| global.as_user.clone())
        .or_else(|| config.acting_user())
        .ok_or_else(|| {
            miette::miette!("--identified-by is required when no acting user is configured")
        })?;

    let mut risk = Risk::new(title, identified_by, config.author());
    risk.likelihood = likelihood;
    risk.impact = impact;
    risk.description = args.description;
    if let Some(ref org_query) = args.org {
        risk.organisation = Some(utils::resolve_organisation(&project, org_query)?.id);
    }

    let path = store::save(&project, &mut risk).map_err(|e| miette::miette!("{}", e))?;
    utils::print_created(&project, &risk.id, &path);
    if let Some(score) = risk.score {
        println!("   Score: {}", style(score).yellow());
    }
    Ok(())
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let project = utils::open_project(global)?;
    let (_, risk) = utils::find_record::<Risk>(&project, EntityPrefix::Risk, &args.id)?;

    let prompt = format!("Delete risk '{}' and its responses?", risk.title);
    if !utils::confirm_delete(&prompt, args.yes)? {
        println!("Aborted.");
        return Ok(());
    }

    let stats = store::delete_with_responses(&project, EntityPrefix::Risk, &risk.id)
        .map_err(|e| miette::miette!("{}", e))?;
    println!(
        "{} Deleted '{}' ({} record(s) removed)",
        style("✓").green(),
        risk.title,
        stats.records_deleted
    );
    Ok(())
}
