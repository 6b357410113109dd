//! `qmt transition` command - guarded status changes
//!
//! Every status write routes through the transition guard and the normal
//! save path. The shipped policy is permissive; `enforce_transitions: true`
//! in the project config switches to the declared forward graphs without
//! touching this code.

use console::style;
use miette::Result;

use crate::cli::commands::utils::{self, find_record};
use crate::cli::GlobalOpts;
use crate::core::entity::Entity;
use crate::core::lifecycle::{parse_status, StatusCycle, TransitionPolicy};
use crate::core::shortid::ShortIdIndex;
use crate::core::{store, Config, EntityId, EntityPrefix, Project};
use crate::entities::change::ChangeStatus;
use crate::entities::design_project::DesignStatus;
use crate::entities::ncr::NcrStatus;
use crate::entities::product_release::ReleaseStatus;
use crate::entities::resource_plan::ResourceStatus;
use crate::entities::{
    DesignProject, Nonconformance, Opportunity, ProductRelease, QmsChange, ResourcePlan,
    Response, Risk,
};

#[derive(clap::Args, Debug)]
pub struct TransitionArgs {
    /// Record ID or @N short ID (the prefix selects the status set)
    pub id: String,

    /// Target status
    pub status: String,
}

pub fn run(args: TransitionArgs, global: &GlobalOpts) -> Result<()> {
    let project = utils::open_project(global)?;
    let config = Config::load();
    let policy = TransitionPolicy::from_config(&config);

    let (id, from, to) = transition_record(&project, &args.id, &args.status, policy)?;

    println!(
        "{} {} {} {} {}",
        style("✓").green(),
        crate::cli::helpers::format_short_id(&id),
        style(from).dim(),
        style("->").dim(),
        style(to).yellow()
    );
    Ok(())
}

/// Apply a status change to whichever record the query resolves to.
/// Returns (id, previous status, new status).
pub fn transition_record(
    project: &Project,
    query: &str,
    to: &str,
    policy: TransitionPolicy,
) -> Result<(EntityId, String, String)> {
    let prefix = resolve_prefix(project, query)?;

    match prefix {
        EntityPrefix::Chg => apply::<QmsChange, ChangeStatus, _, _>(
            project,
            prefix,
            query,
            to,
            policy,
            |r| r.status,
            |r, s| r.status = s,
        ),
        EntityPrefix::Ncr => apply::<Nonconformance, NcrStatus, _, _>(
            project,
            prefix,
            query,
            to,
            policy,
            |r| r.status,
            |r, s| r.status = s,
        ),
        EntityPrefix::Rel => apply::<ProductRelease, ReleaseStatus, _, _>(
            project,
            prefix,
            query,
            to,
            policy,
            |r| r.status,
            |r, s| r.status = s,
        ),
        EntityPrefix::Dsn => apply::<DesignProject, DesignStatus, _, _>(
            project,
            prefix,
            query,
            to,
            policy,
            |r| r.status,
            |r, s| r.status = s,
        ),
        EntityPrefix::Res => apply::<ResourcePlan, ResourceStatus, _, _>(
            project,
            prefix,
            query,
            to,
            policy,
            |r| r.status,
            |r, s| r.status = s,
        ),
        // Free-form status strings carry no declared graph; the write still
        // goes through the save hook so derived fields stay correct
        EntityPrefix::Risk => apply_freeform::<Risk>(project, prefix, query, to),
        EntityPrefix::Opp => apply_freeform::<Opportunity>(project, prefix, query, to),
        EntityPrefix::Resp => apply_freeform::<Response>(project, prefix, query, to),
        other => Err(miette::miette!(
            "{} records have no transitionable status field",
            other
        )),
    }
}

/// Determine the record prefix from an ID or @N reference
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

fn apply<T, S, G, F>(
    project: &Project,
    prefix: EntityPrefix,
    query: &str,
    to: &str,
    policy: TransitionPolicy,
    get: G,
    set: F,
) -> Result<(EntityId, String, String)>
where
    T: Entity,
    S: StatusCycle,
    G: Fn(&T) -> S,
    F: Fn(&mut T, S),
{
    let (_, mut record) = find_record::<T>(project, prefix, query)?;

    let target: S =
        parse_status(prefix.as_str(), to).map_err(|e| miette::miette!("{}", e))?;
    let current = get(&record);
    policy
        .check(current, target)
        .map_err(|e| miette::miette!("{}", e))?;

    let from = current.to_string();
    set(&mut record, target);
    store::save(project, &mut record).map_err(|e| miette::miette!("{}", e))?;

    Ok((record.id().clone(), from, target.to_string()))
}

fn apply_freeform<T>(
    project: &Project,
    prefix: EntityPrefix,
    query: &str,
    to: &str,
) -> Result<(EntityId, String, String)>
where
    T: Entity + FreeformStatus,
{
    let (_, mut record) = find_record::<T>(project, prefix, query)?;
    let from = record.status().to_string();
    record.set_status(to.to_string());
    store::save(project, &mut record).map_err(|e| miette::miette!("{}", e))?;
    Ok((record.id().clone(), from, to.to_string()))
}

/// Records whose status is a free-form string
pub trait FreeformStatus {
    fn set_status(&mut self, status: String);
}

impl FreeformStatus for Risk {
    fn set_status(&mut self, status: String) {
        self.status = status;
    }
}

impl FreeformStatus for Opportunity {
    fn set_status(&mut self, status: String) {
        self.status = status;
    }
}

impl FreeformStatus for Response {
    fn set_status(&mut self, status: String) {
        self.status = status;
    }
}
