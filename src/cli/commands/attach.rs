//! `qmt attach` command - store an evidence file on a record
//!
//! The file is copied under the record type's date-partitioned prefix and
//! the project-relative path lands on the record's document field (or as an
//! embedded attachment/evidence row for commitments and policies).

use console::style;
use miette::Result;
use std::path::PathBuf;

use crate::cli::commands::utils::{self, find_record};
use crate::cli::GlobalOpts;
use crate::core::attach::{store_attachment, AttachmentKind};
use crate::core::shortid::ShortIdIndex;
use crate::core::{store, Config, EntityPrefix, Project};
use crate::entities::commitment::CommitmentAttachment;
use crate::entities::organisation::SiteDocument;
use crate::entities::policy::PolicyEvidence;
use crate::entities::{
    AwarenessRecord, Commitment, CommunicationPlan, ContractReview, DocumentRegister,
    Nonconformance, Organisation, ProductRelease, QmsChange, QualityPolicy, ResourcePlan,
    ServiceReport, Sop, SupplierEvaluation, TrainingRecord,
};

#[derive(clap::Args, Debug)]
pub struct AttachArgs {
    /// Record ID or @N short ID (the prefix selects the storage location)
    pub id: String,

    /// File to store
    pub file: PathBuf,

    /// Description of the evidence
    #[arg(long)]
    pub description: Option<String>,
}

pub fn run(args: AttachArgs, global: &GlobalOpts) -> Result<()> {
    let project = utils::open_project(global)?;
    let config = Config::load();

    let prefix = resolve_prefix(&project, &args.id)?;
    let kind = AttachmentKind::for_prefix(prefix).ok_or_else(|| {
        miette::miette!("{} records do not carry file attachments", prefix)
    })?;

    let stored = store_attachment(&project, kind, &args.file)
        .map_err(|e| miette::miette!("{}", e))?;

    let title = match prefix {
        EntityPrefix::Org => {
            let (_, mut org) = find_record::<Organisation>(&project, prefix, &args.id)?;
            org.site_document = Some(SiteDocument {
                title: args
                    .description
                    .clone()
                    .unwrap_or_else(|| file_name(&args.file)),
                description: args.description.clone(),
                file: Some(stored.clone()),
                url: None,
                uploaded_at: chrono::Utc::now(),
            });
            let name = org.name.clone();
            store::save(&project, &mut org).map_err(|e| miette::miette!("{}", e))?;
            name
        }
        EntityPrefix::Lead => {
            let (_, mut commitment) = find_record::<Commitment>(&project, prefix, &args.id)?;
            commitment.attachments.push(CommitmentAttachment {
                file: stored.clone(),
                description: args.description.clone(),
                uploaded_by: global.as_user.clone().or_else(|| config.acting_user()),
                uploaded_at: chrono::Utc::now(),
            });
            let title = commitment.title.clone();
            store::save(&project, &mut commitment).map_err(|e| miette::miette!("{}", e))?;
            title
        }
        EntityPrefix::Qpol => {
            let (_, mut policy) = find_record::<QualityPolicy>(&project, prefix, &args.id)?;
            policy.evidences.push(PolicyEvidence {
                description: args
                    .description
                    .clone()
                    .unwrap_or_else(|| file_name(&args.file)),
                file: Some(stored.clone()),
                submitted_by: global.as_user.clone().or_else(|| config.acting_user()),
                submitted_at: chrono::Utc::now(),
            });
            let title = policy.title.clone();
            store::save(&project, &mut policy).map_err(|e| miette::miette!("{}", e))?;
            title
        }
        EntityPrefix::Chg => {
            let (_, mut change) = find_record::<QmsChange>(&project, prefix, &args.id)?;
            let record = change.control_records.last_mut().ok_or_else(|| {
                miette::miette!(
                    "Change has no control records. Add one with 'qmt change control' first."
                )
            })?;
            record.evidence = Some(stored.clone());
            let title = change.title.clone();
            store::save(&project, &mut change).map_err(|e| miette::miette!("{}", e))?;
            title
        }
        EntityPrefix::Sop => set_file::<Sop, _>(&project, prefix, &args.id, &stored, |r, p| {
            r.file = Some(p)
        })?,
        EntityPrefix::Doc => {
            set_file::<DocumentRegister, _>(&project, prefix, &args.id, &stored, |r, p| {
                r.file = Some(p)
            })?
        }
        EntityPrefix::Ctr => {
            set_file::<ContractReview, _>(&project, prefix, &args.id, &stored, |r, p| {
                r.document_reference = Some(p)
            })?
        }
        EntityPrefix::Sup => {
            set_file::<SupplierEvaluation, _>(&project, prefix, &args.id, &stored, |r, p| {
                r.document_reference = Some(p)
            })?
        }
        EntityPrefix::Svc => {
            set_file::<ServiceReport, _>(&project, prefix, &args.id, &stored, |r, p| {
                r.document_reference = Some(p)
            })?
        }
        EntityPrefix::Rel => {
            set_file::<ProductRelease, _>(&project, prefix, &args.id, &stored, |r, p| {
                r.document_reference = Some(p)
            })?
        }
        EntityPrefix::Ncr => {
            set_file::<Nonconformance, _>(&project, prefix, &args.id, &stored, |r, p| {
                r.document_reference = Some(p)
            })?
        }
        EntityPrefix::Res => {
            set_file::<ResourcePlan, _>(&project, prefix, &args.id, &stored, |r, p| {
                r.document_reference = Some(p)
            })?
        }
        EntityPrefix::Trn => {
            set_file::<TrainingRecord, _>(&project, prefix, &args.id, &stored, |r, p| {
                r.document_reference = Some(p)
            })?
        }
        EntityPrefix::Awr => {
            set_file::<AwarenessRecord, _>(&project, prefix, &args.id, &stored, |r, p| {
                r.document_reference = Some(p)
            })?
        }
        EntityPrefix::Com => {
            set_file::<CommunicationPlan, _>(&project, prefix, &args.id, &stored, |r, p| {
                r.document_reference = Some(p)
            })?
        }
        other => {
            return Err(miette::miette!(
                "{} records do not carry file attachments",
                other
            ))
        }
    };

    println!(
        "{} Attached {} to '{}'",
        style("✓").green(),
        style(&stored).dim(),
        title
    );
    Ok(())
}

fn set_file<T, F>(
    project: &Project,
    prefix: EntityPrefix,
    query: &str,
    stored: &str,
    set: F,
) -> Result<String>
where
    T: crate::core::Entity,
    F: Fn(&mut T, String),
{
    let (_, mut record) = find_record::<T>(project, prefix, query)?;
    set(&mut record, stored.to_string());
    let title = record.title().to_string();
    store::save(project, &mut record).map_err(|e| miette::miette!("{}", e))?;
    Ok(title)
}

fn resolve_prefix(project: &Project, query: &str) -> Result<EntityPrefix> {
    let short_ids = ShortIdIndex::load(project);
    let resolved = short_ids
        .resolve(query)
        .unwrap_or_else(|| query.to_string());

    resolved
        .split('-')
        .next()
        .and_then(|p| p.parse().ok())
        .ok_or_else(|| {
            miette::miette!(
                "Cannot determine record type from '{}'. Use a full ID or @N reference.",
                query
            )
        })
}

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "attachment".to_string())
}
