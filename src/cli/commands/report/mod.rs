//! `qmt report` command - QMS reports

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::cli::GlobalOpts;

pub mod review;
pub mod risks;

#[derive(Subcommand, Debug)]
pub enum ReportCommands {
    /// Risk register with score summary
    Risks(risks::RisksArgs),

    /// Management review (markdown)
    Review(review::ReviewArgs),
}

pub fn run(cmd: ReportCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ReportCommands::Risks(args) => risks::run(args, global),
        ReportCommands::Review(args) => review::run(args, global),
    }
}

/// Write report content to a file or stdout
pub(crate) fn write_output(content: &str, output: Option<PathBuf>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(&path, content).into_diagnostic()?;
            println!(
                "{} Report written to {}",
                style("✓").green(),
                style(path.display()).cyan()
            );
        }
        None => print!("{}", content),
    }
    Ok(())
}
