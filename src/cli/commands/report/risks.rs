//! Risk register report

use miette::Result;
use std::collections::HashMap;
use std::path::PathBuf;
use tabled::{builder::Builder, settings::Style};

use super::write_output;
use crate::cli::commands::utils;
use crate::cli::helpers::truncate_str;
use crate::cli::GlobalOpts;
use crate::core::shortid::ShortIdIndex;
use crate::core::EntityPrefix;
use crate::entities::{Response, Risk};

#[derive(clap::Args, Debug)]
pub struct RisksArgs {
    /// Output to file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Minimum score to include (default: 0)
    #[arg(long, default_value = "0")]
    pub min_score: u16,

    /// Limit to one organisation (ID, @N, or name)
    #[arg(long)]
    pub org: Option<String>,
}

pub fn run(args: RisksArgs, global: &GlobalOpts) -> Result<()> {
    let project = utils::open_project(global)?;
    let short_ids = ShortIdIndex::load(&project);

    let mut risks: Vec<Risk> =
        crate::core::loader::load_all(&project.entity_dir(EntityPrefix::Risk))?;

    if let Some(ref org_query) = args.org {
        let org = utils::resolve_organisation(&project, org_query)?;
        risks.retain(|r| r.organisation.as_ref() == Some(&org.id));
    }
    risks.retain(|r| r.score.unwrap_or(0) >= args.min_score);

    // Sort by score descending
    risks.sort_by(|a, b| b.score.unwrap_or(0).cmp(&a.score.unwrap_or(0)));

    // Responses per risk
    let mut responses_by_risk: HashMap<String, usize> = HashMap::new();
    let responses: Vec<Response> =
        crate::core::loader::load_all(&project.entity_dir(EntityPrefix::Resp))?;
    for response in responses {
        if let Some(ref risk_id) = response.risk {
            *responses_by_risk.entry(risk_id.to_string()).or_insert(0) += 1;
        }
    }

    let mut output = String::new();
    output.push_str("# Risk Register\n\n");

    let mut builder = Builder::default();
    builder.push_record(["ID", "Title", "Identified By", "L", "I", "Score", "Status", "Responses"]);

    let mut total_score: u32 = 0;
    let mut scored = 0;
    for risk in &risks {
        let id_display = short_ids
            .get_short_id(&risk.id.to_string())
            .map(|n| format!("@{}", n))
            .unwrap_or_else(|| risk.id.to_string());
        let responses = responses_by_risk
            .get(&risk.id.to_string())
            .copied()
            .unwrap_or(0);

        if let Some(score) = risk.score {
            total_score += score as u32;
            scored += 1;
        }

        builder.push_record([
            id_display,
            truncate_str(&risk.title, 32),
            risk.identified_by.clone(),
            risk.likelihood.map_or("-".to_string(), |v| v.to_string()),
            risk.impact.map_or("-".to_string(), |v| v.to_string()),
            risk.score.map_or("-".to_string(), |v| v.to_string()),
            risk.status.clone(),
            if responses == 0 {
                "None".to_string()
            } else {
                format!("{} action(s)", responses)
            },
        ]);
    }
    output.push_str(&builder.build().with(Style::markdown()).to_string());

    output.push_str("\n\n## Summary\n\n");
    output.push_str(&format!("- **Total Risks:** {}\n", risks.len()));
    if scored > 0 {
        output.push_str(&format!(
            "- **Average Score:** {:.1}\n",
            total_score as f64 / scored as f64
        ));
    }
    let open = risks.iter().filter(|r| r.status == "open").count();
    output.push_str(&format!("- **Open:** {}\n", open));
    let unanswered = risks
        .iter()
        .filter(|r| !responses_by_risk.contains_key(&r.id.to_string()))
        .count();
    output.push_str(&format!("- **Without responses:** {}\n", unanswered));

    write_output(&output, args.output)
}
