//! `qmt validate` command - project-wide integrity checks
//!
//! Hand-edited YAML can bypass the typed write paths, so validation re-checks
//! everything the save paths enforce: parseability, uniqueness constraints,
//! referential integrity, derived-field freshness, and response parentage.

use console::style;
use miette::Result;

use crate::cli::commands::utils;
use crate::cli::GlobalOpts;
use crate::core::entity::Entity;
use crate::core::refs::UserRefs;
use crate::core::users::UserDirectory;
use crate::core::{store, EntityId, EntityPrefix, Project};
use crate::entities::{
    AwarenessRecord, Commitment, CommunicationPlan, ContractReview, DesignProject,
    DocumentRegister, Employee, Nonconformance, Opportunity, Organisation, ProductRelease,
    QmsChange, QualityPolicy, ResourcePlan, Response, Risk, ServiceReport, Sop, Stakeholder,
    SupplierEvaluation, TrainingRecord,
};

#[derive(clap::Args, Debug)]
pub struct ValidateArgs {
    /// Treat warnings as errors
    #[arg(long)]
    pub strict: bool,
}

#[derive(Default)]
struct Findings {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl Findings {
    fn error(&mut self, message: String) {
        self.errors.push(message);
    }

    fn warning(&mut self, message: String) {
        self.warnings.push(message);
    }
}

pub fn run(args: ValidateArgs, global: &GlobalOpts) -> Result<()> {
    let project = utils::open_project(global)?;
    let mut findings = Findings::default();

    check_parse_all(&project, &mut findings);
    check_uniqueness(&project, &mut findings);
    check_organisation_refs(&project, &mut findings);
    check_responses(&project, &mut findings);
    check_derived_scores(&project, &mut findings);
    check_user_refs(&project, &mut findings);

    for warning in &findings.warnings {
        println!("{} {}", style("!").yellow(), warning);
    }
    for error in &findings.errors {
        println!("{} {}", style("✗").red(), error);
    }

    println!();
    if findings.errors.is_empty() && findings.warnings.is_empty() {
        println!("{} All records valid.", style("✓").green());
        return Ok(());
    }

    println!(
        "{} error(s), {} warning(s)",
        style(findings.errors.len()).red(),
        style(findings.warnings.len()).yellow()
    );

    if !findings.errors.is_empty() || (args.strict && !findings.warnings.is_empty()) {
        return Err(miette::miette!("validation failed"));
    }
    Ok(())
}

fn check_parse<T: Entity + 'static>(project: &Project, prefix: EntityPrefix, findings: &mut Findings) {
    for path in project.iter_entity_files(prefix) {
        if let Err(e) = crate::yaml::parse_yaml_file::<T>(&path) {
            findings.error(format!("{}: {}", path.display(), e));
        }
    }
}

fn check_parse_all(project: &Project, findings: &mut Findings) {
    check_parse::<Organisation>(project, EntityPrefix::Org, findings);
    check_parse::<Stakeholder>(project, EntityPrefix::Stk, findings);
    check_parse::<Employee>(project, EntityPrefix::Emp, findings);
    check_parse::<Commitment>(project, EntityPrefix::Lead, findings);
    check_parse::<QualityPolicy>(project, EntityPrefix::Qpol, findings);
    check_parse::<Risk>(project, EntityPrefix::Risk, findings);
    check_parse::<Opportunity>(project, EntityPrefix::Opp, findings);
    check_parse::<Response>(project, EntityPrefix::Resp, findings);
    check_parse::<QmsChange>(project, EntityPrefix::Chg, findings);
    check_parse::<Sop>(project, EntityPrefix::Sop, findings);
    check_parse::<ContractReview>(project, EntityPrefix::Ctr, findings);
    check_parse::<DesignProject>(project, EntityPrefix::Dsn, findings);
    check_parse::<SupplierEvaluation>(project, EntityPrefix::Sup, findings);
    check_parse::<ServiceReport>(project, EntityPrefix::Svc, findings);
    check_parse::<ProductRelease>(project, EntityPrefix::Rel, findings);
    check_parse::<Nonconformance>(project, EntityPrefix::Ncr, findings);
    check_parse::<ResourcePlan>(project, EntityPrefix::Res, findings);
    check_parse::<TrainingRecord>(project, EntityPrefix::Trn, findings);
    check_parse::<AwarenessRecord>(project, EntityPrefix::Awr, findings);
    check_parse::<CommunicationPlan>(project, EntityPrefix::Com, findings);
    check_parse::<DocumentRegister>(project, EntityPrefix::Doc, findings);
}

fn check_uniqueness(project: &Project, findings: &mut Findings) {
    // Organisation names
    let organisations: Vec<Organisation> = store::load_with_paths(project, EntityPrefix::Org)
        .into_iter()
        .map(|(_, o)| o)
        .collect();
    for (i, org) in organisations.iter().enumerate() {
        if organisations[i + 1..]
            .iter()
            .any(|o| o.name.eq_ignore_ascii_case(&org.name))
        {
            findings.error(format!("duplicate organisation name '{}'", org.name));
        }
    }

    // Employee IDs
    let employees: Vec<Employee> = store::load_with_paths(project, EntityPrefix::Emp)
        .into_iter()
        .map(|(_, e)| e)
        .collect();
    for (i, emp) in employees.iter().enumerate() {
        if let Some(ref eid) = emp.employee_id {
            if employees[i + 1..]
                .iter()
                .any(|e| e.employee_id.as_deref() == Some(eid.as_str()))
            {
                findings.error(format!("duplicate employee_id '{}'", eid));
            }
        }
    }

    // Accountability (user, role) pairs within a commitment
    for (_, commitment) in store::load_with_paths::<Commitment>(project, EntityPrefix::Lead) {
        for (user, role) in commitment.duplicate_accountabilities() {
            findings.error(format!(
                "{}: duplicate accountability for '{}' with role '{}'",
                commitment.title, user, role
            ));
        }
    }

    // User directory email/phone
    let directory = UserDirectory::load(project);
    for (i, user) in directory.users.iter().enumerate() {
        if directory.users[i + 1..]
            .iter()
            .any(|u| u.email.eq_ignore_ascii_case(&user.email))
        {
            findings.error(format!("duplicate user email '{}'", user.email));
        }
        if let Some(ref phone) = user.phone_number {
            if directory.users[i + 1..]
                .iter()
                .any(|u| u.phone_number.as_deref() == Some(phone.as_str()))
            {
                findings.error(format!("duplicate user phone number '{}'", phone));
            }
        }
    }
}

fn check_org_ref<T: Entity + 'static>(
    project: &Project,
    prefix: EntityPrefix,
    org_ids: &[EntityId],
    findings: &mut Findings,
) {
    for (_, record) in store::load_with_paths::<T>(project, prefix) {
        if let Some(org) = record.organisation() {
            if !org_ids.contains(org) {
                findings.error(format!(
                    "{} '{}' references missing organisation {}",
                    prefix,
                    record.title(),
                    org
                ));
            }
        }
    }
}

fn check_organisation_refs(project: &Project, findings: &mut Findings) {
    let org_ids: Vec<EntityId> = store::load_with_paths::<Organisation>(project, EntityPrefix::Org)
        .into_iter()
        .map(|(_, o)| o.id)
        .collect();

    check_org_ref::<Stakeholder>(project, EntityPrefix::Stk, &org_ids, findings);
    check_org_ref::<Employee>(project, EntityPrefix::Emp, &org_ids, findings);
    check_org_ref::<Commitment>(project, EntityPrefix::Lead, &org_ids, findings);
    check_org_ref::<QualityPolicy>(project, EntityPrefix::Qpol, &org_ids, findings);
    check_org_ref::<Risk>(project, EntityPrefix::Risk, &org_ids, findings);
    check_org_ref::<Opportunity>(project, EntityPrefix::Opp, &org_ids, findings);
    check_org_ref::<QmsChange>(project, EntityPrefix::Chg, &org_ids, findings);
    check_org_ref::<Sop>(project, EntityPrefix::Sop, &org_ids, findings);
    check_org_ref::<ContractReview>(project, EntityPrefix::Ctr, &org_ids, findings);
    check_org_ref::<DesignProject>(project, EntityPrefix::Dsn, &org_ids, findings);
    check_org_ref::<SupplierEvaluation>(project, EntityPrefix::Sup, &org_ids, findings);
    check_org_ref::<ServiceReport>(project, EntityPrefix::Svc, &org_ids, findings);
    check_org_ref::<ProductRelease>(project, EntityPrefix::Rel, &org_ids, findings);
    check_org_ref::<Nonconformance>(project, EntityPrefix::Ncr, &org_ids, findings);
    check_org_ref::<ResourcePlan>(project, EntityPrefix::Res, &org_ids, findings);
    check_org_ref::<TrainingRecord>(project, EntityPrefix::Trn, &org_ids, findings);
    check_org_ref::<AwarenessRecord>(project, EntityPrefix::Awr, &org_ids, findings);
    check_org_ref::<CommunicationPlan>(project, EntityPrefix::Com, &org_ids, findings);
    check_org_ref::<DocumentRegister>(project, EntityPrefix::Doc, &org_ids, findings);
}

fn check_responses(project: &Project, findings: &mut Findings) {
    let risk_ids: Vec<EntityId> = store::load_with_paths::<Risk>(project, EntityPrefix::Risk)
        .into_iter()
        .map(|(_, r)| r.id)
        .collect();
    let opp_ids: Vec<EntityId> = store::load_with_paths::<Opportunity>(project, EntityPrefix::Opp)
        .into_iter()
        .map(|(_, o)| o.id)
        .collect();

    for (_, response) in store::load_with_paths::<Response>(project, EntityPrefix::Resp) {
        if let Some(ref risk) = response.risk {
            if !risk_ids.contains(risk) {
                findings.error(format!(
                    "response '{}' references missing risk {}",
                    response.description, risk
                ));
            }
        }
        if let Some(ref opp) = response.opportunity {
            if !opp_ids.contains(opp) {
                findings.error(format!(
                    "response '{}' references missing opportunity {}",
                    response.description, opp
                ));
            }
        }
        if !response.has_single_parent() {
            let kind = if response.risk.is_some() {
                "both a risk and an opportunity"
            } else {
                "neither a risk nor an opportunity"
            };
            findings.warning(format!(
                "response '{}' references {}",
                response.description, kind
            ));
        }
    }
}

fn check_derived_scores(project: &Project, findings: &mut Findings) {
    for (path, risk) in store::load_with_paths::<Risk>(project, EntityPrefix::Risk) {
        if risk.is_score_stale() {
            findings.error(format!(
                "{}: stored score disagrees with likelihood * impact",
                path.display()
            ));
        }
    }
    for (path, opp) in store::load_with_paths::<Opportunity>(project, EntityPrefix::Opp) {
        if opp.is_score_stale() {
            findings.error(format!(
                "{}: stored score disagrees with benefit * feasibility",
                path.display()
            ));
        }
    }
}

fn check_user_ref<T: Entity + UserRefs + 'static>(
    project: &Project,
    prefix: EntityPrefix,
    directory: &UserDirectory,
    findings: &mut Findings,
) {
    for (_, record) in store::load_with_paths::<T>(project, prefix) {
        for user_ref in record.user_refs() {
            if directory.find(&user_ref.email).is_none() {
                findings.warning(format!(
                    "{} '{}' field {} references unknown user '{}'",
                    prefix,
                    record.title(),
                    user_ref.field,
                    user_ref.email
                ));
            }
        }
    }
}

fn check_user_refs(project: &Project, findings: &mut Findings) {
    let directory = UserDirectory::load(project);
    if directory.users.is_empty() {
        return;
    }

    check_user_ref::<Organisation>(project, EntityPrefix::Org, &directory, findings);
    check_user_ref::<Stakeholder>(project, EntityPrefix::Stk, &directory, findings);
    check_user_ref::<Commitment>(project, EntityPrefix::Lead, &directory, findings);
    check_user_ref::<QualityPolicy>(project, EntityPrefix::Qpol, &directory, findings);
    check_user_ref::<Risk>(project, EntityPrefix::Risk, &directory, findings);
    check_user_ref::<Opportunity>(project, EntityPrefix::Opp, &directory, findings);
    check_user_ref::<Response>(project, EntityPrefix::Resp, &directory, findings);
    check_user_ref::<QmsChange>(project, EntityPrefix::Chg, &directory, findings);
    check_user_ref::<Sop>(project, EntityPrefix::Sop, &directory, findings);
    check_user_ref::<ContractReview>(project, EntityPrefix::Ctr, &directory, findings);
    check_user_ref::<DesignProject>(project, EntityPrefix::Dsn, &directory, findings);
    check_user_ref::<SupplierEvaluation>(project, EntityPrefix::Sup, &directory, findings);
    check_user_ref::<ServiceReport>(project, EntityPrefix::Svc, &directory, findings);
    check_user_ref::<ProductRelease>(project, EntityPrefix::Rel, &directory, findings);
    check_user_ref::<Nonconformance>(project, EntityPrefix::Ncr, &directory, findings);
    check_user_ref::<ResourcePlan>(project, EntityPrefix::Res, &directory, findings);
    check_user_ref::<TrainingRecord>(project, EntityPrefix::Trn, &directory, findings);
    check_user_ref::<AwarenessRecord>(project, EntityPrefix::Awr, &directory, findings);
    check_user_ref::<CommunicationPlan>(project, EntityPrefix::Com, &directory, findings);
    check_user_ref::<DocumentRegister>(project, EntityPrefix::Doc, &directory, findings);
}
