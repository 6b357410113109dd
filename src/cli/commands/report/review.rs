//! Management review report, rendered from an embedded template

use miette::Result;
use rust_embed::Embed;
use serde::Serialize;
use std::path::PathBuf;
use tera::Tera;
use thiserror::Error;

use super::write_output;
use crate::cli::commands::utils;
use crate::cli::GlobalOpts;
use crate::core::EntityPrefix;
use crate::entities::change::ChangeStatus;
use crate::entities::ncr::NcrStatus;
use crate::entities::{Nonconformance, Opportunity, QmsChange, QualityPolicy, Risk};

#[derive(Embed)]
#[folder = "templates/"]
struct EmbeddedTemplates;

/// Errors from template rendering
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template not found: {0}")]
    NotFound(String),

    #[error("Template rendering error: {0}")]
    Render(#[from] tera::Error),

    #[error("Template is not valid UTF-8: {0}")]
    Encoding(String),
}

fn load_templates() -> Result<Tera, TemplateError> {
    let mut tera = Tera::default();
    for filename in EmbeddedTemplates::iter() {
        if let Some(file) = EmbeddedTemplates::get(&filename) {
            let template_str = std::str::from_utf8(file.data.as_ref())
                .map_err(|_| TemplateError::Encoding(filename.to_string()))?;
            tera.add_raw_template(&filename, template_str)?;
        }
    }
    Ok(tera)
}

#[derive(clap::Args, Debug)]
pub struct ReviewArgs {
    /// Output to file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Limit to one organisation (ID, @N, or name)
    #[arg(long)]
    pub org: Option<String>,
}

#[derive(Debug, Serialize)]
struct RiskRow {
    title: String,
    score: String,
    status: String,
}

pub fn run(args: ReviewArgs, global: &GlobalOpts) -> Result<()> {
    let project = utils::open_project(global)?;

    let org = match &args.org {
        Some(query) => Some(utils::resolve_organisation(&project, query)?),
        None => None,
    };
    let org_id = org.as_ref().map(|o| o.id.clone());

    let owned = |record_org: Option<&crate::core::EntityId>| -> bool {
        match &org_id {
            Some(id) => record_org == Some(id),
            None => true,
        }
    };

    let mut risks: Vec<Risk> =
        crate::core::loader::load_all(&project.entity_dir(EntityPrefix::Risk))?;
    risks.retain(|r| owned(r.organisation.as_ref()));
    risks.sort_by(|a, b| b.score.unwrap_or(0).cmp(&a.score.unwrap_or(0)));

    let open_risks = risks.iter().filter(|r| r.status == "open").count();
    let top_risks: Vec<RiskRow> = risks
        .iter()
        .take(10)
        .map(|r| RiskRow {
            title: r.title.clone(),
            score: r.score.map_or("-".to_string(), |s| s.to_string()),
            status: r.status.clone(),
        })
        .collect();

    let opportunities: Vec<Opportunity> =
        crate::core::loader::load_all(&project.entity_dir(EntityPrefix::Opp))?;
    let open_opportunities = opportunities
        .iter()
        .filter(|o| owned(o.organisation.as_ref()))
        .filter(|o| o.status == "open")
        .count();

    let ncrs: Vec<Nonconformance> =
        crate::core::loader::load_all(&project.entity_dir(EntityPrefix::Ncr))?;
    let open_ncrs = ncrs
        .iter()
        .filter(|n| owned(n.organisation.as_ref()))
        .filter(|n| n.status != NcrStatus::Closed)
        .count();

    let changes: Vec<QmsChange> =
        crate::core::loader::load_all(&project.entity_dir(EntityPrefix::Chg))?;
    let changes_in_progress = changes
        .iter()
        .filter(|c| owned(c.organisation.as_ref()))
        .filter(|c| matches!(c.status, ChangeStatus::Planned | ChangeStatus::InProgress))
        .count();

    let policies: Vec<QualityPolicy> =
        crate::core::loader::load_all(&project.entity_dir(EntityPrefix::Qpol))?;
    let active_policies = policies
        .iter()
        .filter(|p| owned(p.organisation.as_ref()))
        .filter(|p| p.is_active)
        .count();

    let trainings = project.iter_entity_files(EntityPrefix::Trn).count();

    let tera = load_templates().map_err(|e| miette::miette!("{}", e))?;
    let mut context = tera::Context::new();
    context.insert("generated", &chrono::Local::now().format("%Y-%m-%d").to_string());
    context.insert("organisation", &org.as_ref().map(|o| o.name.clone()));
    context.insert("open_risks", &open_risks);
    context.insert("top_risks", &top_risks);
    context.insert("open_opportunities", &open_opportunities);
    context.insert("open_ncrs", &open_ncrs);
    context.insert("changes_in_progress", &changes_in_progress);
    context.insert("active_policies", &active_policies);
    context.insert("trainings", &trainings);

    let content = tera
        .render("review.md.tera", &context)
        .map_err(|e| miette::miette!("{}", TemplateError::Render(e)))?;

    write_output(&content, args.output)
}
