//! `qmt status` command - project dashboard by area

use clap::ValueEnum;
use console::style;
use miette::Result;

use crate::cli::commands::utils;
use crate::cli::GlobalOpts;
use crate::core::EntityPrefix;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Area {
    Organisation,
    Leadership,
    Planning,
    Operation,
    Support,
}

impl std::fmt::Display for Area {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Area::Organisation => write!(f, "Organisation"),
            Area::Leadership => write!(f, "Leadership"),
            Area::Planning => write!(f, "Planning"),
            Area::Operation => write!(f, "Operation"),
            Area::Support => write!(f, "Support"),
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct StatusArgs {
    /// Limit the dashboard to one area
    #[arg(long, value_enum)]
    pub area: Option<Area>,
}

/// Which record types make up each area, with display labels
fn area_sections(area: Area) -> &'static [(EntityPrefix, &'static str)] {
    match area {
        Area::Organisation => &[
            (EntityPrefix::Org, "Organisations"),
            (EntityPrefix::Stk, "Stakeholders"),
            (EntityPrefix::Emp, "Employees"),
        ],
        Area::Leadership => &[
            (EntityPrefix::Lead, "Leadership commitments"),
            (EntityPrefix::Qpol, "Quality policies"),
        ],
        Area::Planning => &[
            (EntityPrefix::Risk, "Risks"),
            (EntityPrefix::Opp, "Opportunities"),
            (EntityPrefix::Resp, "Responses"),
            (EntityPrefix::Chg, "QMS changes"),
        ],
        Area::Operation => &[
            (EntityPrefix::Sop, "SOPs"),
            (EntityPrefix::Ctr, "Contract reviews"),
            (EntityPrefix::Dsn, "Design projects"),
            (EntityPrefix::Sup, "Supplier evaluations"),
            (EntityPrefix::Svc, "Service reports"),
            (EntityPrefix::Rel, "Product releases"),
            (EntityPrefix::Ncr, "Nonconformances"),
        ],
        Area::Support => &[
            (EntityPrefix::Res, "Resource plans"),
            (EntityPrefix::Trn, "Training records"),
            (EntityPrefix::Awr, "Awareness records"),
            (EntityPrefix::Com, "Communication plans"),
            (EntityPrefix::Doc, "Document registers"),
        ],
    }
}

pub fn run(args: StatusArgs, global: &GlobalOpts) -> Result<()> {
    let project = utils::open_project(global)?;

    let areas: &[Area] = match args.area {
        Some(area) => match area {
            Area::Organisation => &[Area::Organisation],
            Area::Leadership => &[Area::Leadership],
            Area::Planning => &[Area::Planning],
            Area::Operation => &[Area::Operation],
            Area::Support => &[Area::Support],
        },
        None => &[
            Area::Organisation,
            Area::Leadership,
            Area::Planning,
            Area::Operation,
            Area::Support,
        ],
    };

    println!("{}", style("QMS record dashboard").bold());
    println!("{}", style(project.root().display()).dim());

    let mut total = 0;
    for area in areas {
        println!();
        println!("{}", style(area).bold().underlined());
        for (prefix, label) in area_sections(*area) {
            let count = project.iter_entity_files(*prefix).count();
            total += count;
            let count_display = if count == 0 {
                style(count.to_string()).dim()
            } else {
                style(count.to_string()).cyan()
            };
            println!("  {:<24} {}", label, count_display);
        }
    }

    println!();
    println!("{} record(s) total", style(total).cyan());
    Ok(())
}
