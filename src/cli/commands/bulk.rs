//! `qmt bulk` command - bulk operations on multiple records

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::commands::transition::transition_record;
use crate::cli::commands::utils;
use crate::cli::GlobalOpts;
use crate::core::lifecycle::TransitionPolicy;
use crate::core::Config;

#[derive(Subcommand, Debug)]
pub enum BulkCommands {
    /// Change the status of several records through the transition guard
    Transition(BulkTransitionArgs),
}

#[derive(clap::Args, Debug)]
pub struct BulkTransitionArgs {
    /// Record IDs or @N short IDs
    #[arg(required = true)]
    pub ids: Vec<String>,

    /// Target status
    #[arg(long)]
    pub to: String,

    /// Continue past records that fail instead of stopping
    #[arg(long)]
    pub keep_going: bool,
}

pub fn run(cmd: BulkCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        BulkCommands::Transition(args) => run_transition(args, global),
    }
}

fn run_transition(args: BulkTransitionArgs, global: &GlobalOpts) -> Result<()> {
    let project = utils::open_project(global)?;
    let config = Config::load();
    let policy = TransitionPolicy::from_config(&config);

    let mut changed = 0;
    let mut failed = 0;

    for query in &args.ids {
        match transition_record(&project, query, &args.to, policy) {
            Ok((id, from, to)) => {
                println!(
                    "{} {} {} -> {}",
                    style("✓").green(),
                    crate::cli::helpers::format_short_id(&id),
                    style(from).dim(),
                    style(to).yellow()
                );
                changed += 1;
            }
            Err(e) => {
                eprintln!("{} {}: {}", style("✗").red(), query, e);
                failed += 1;
                if !args.keep_going {
                    return Err(miette::miette!(
                        "Stopped after failure; {} record(s) changed. Use --keep-going to continue past errors.",
                        changed
                    ));
                }
            }
        }
    }

    println!();
    println!(
        "{} record(s) changed, {} failed",
        style(changed).cyan(),
        if failed > 0 {
            style(failed).red()
        } else {
            style(failed).dim()
        }
    );
    Ok(())
}
