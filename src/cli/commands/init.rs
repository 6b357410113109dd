//! `qmt init` command - project initialization

use console::style;
use miette::Result;
use std::path::PathBuf;

use crate::core::Project;

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

pub fn run(args: InitArgs) -> Result<()> {
    let project = Project::init(&args.path).map_err(|e| miette::miette!("{}", e))?;

    println!(
        "{} Initialized QMT project at {}",
        style("✓").green(),
        style(project.root().display()).cyan()
    );
    println!();
    println!("Next steps:");
    println!("  {} add your users", style("qmt user new <email> --name ...").yellow());
    println!("  {} register an organisation", style("qmt org new --name ...").yellow());
    println!("  {} see the dashboard", style("qmt status").yellow());
    Ok(())
}
