//! The record store: every write path goes through here
//!
//! `save` is the only way records reach disk: it refreshes the update
//! timestamp and runs the derived-field hook before serializing, so scores
//! are recomputed on interactive and bulk writes alike. Deletion implements
//! the ownership rules: organisations cascade to everything they own, and
//! user deletion honours the per-field Protect/SetNull policies.

use std::path::PathBuf;
use thiserror::Error;

use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::refs::{ProtectedRef, RefPolicy, UserRefs};
use crate::core::Project;
use crate::entities::{
    AwarenessRecord, Commitment, CommunicationPlan, ContractReview, DesignProject,
    DocumentRegister, Employee, Nonconformance, Opportunity, Organisation, ProductRelease,
    QmsChange, QualityPolicy, ResourcePlan, Response, Risk, ServiceReport, Sop, Stakeholder,
    SupplierEvaluation, TrainingRecord,
};

/// Errors from store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("an organisation named '{0}' already exists")]
    DuplicateOrganisationName(String),

    #[error("an employee with employee_id '{0}' already exists")]
    DuplicateEmployeeId(String),

    #[error(
        "user '{email}' is referenced by {count} protected attribution field(s) and cannot be deleted"
    )]
    ProtectedUser {
        email: String,
        count: usize,
        refs: Vec<ProtectedRef>,
    },

    #[error("record not found: {0}")]
    NotFound(String),

    #[error("failed to serialize record: {0}")]
    Serialize(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Persist a record. This is the single write path: the update timestamp is
/// refreshed and derived fields are recomputed before serialization.
pub fn save<T: Entity>(project: &Project, entity: &mut T) -> Result<PathBuf, StoreError> {
    entity.touch();
    entity.before_save();

    let prefix: EntityPrefix = T::PREFIX
        .parse()
        .map_err(|_| StoreError::NotFound(T::PREFIX.to_string()))?;
    let path = project.entity_path(prefix, entity.id());

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let yaml = serde_yml::to_string(entity).map_err(|e| StoreError::Serialize(e.to_string()))?;
    std::fs::write(&path, yaml)?;
    Ok(path)
}

/// Remove a record file
pub fn delete(project: &Project, prefix: EntityPrefix, id: &EntityId) -> Result<(), StoreError> {
    let path = project.entity_path(prefix, id);
    if !path.exists() {
        return Err(StoreError::NotFound(id.to_string()));
    }
    std::fs::remove_file(path)?;
    Ok(())
}

/// Enforce organisation name uniqueness
pub fn ensure_unique_organisation_name(
    project: &Project,
    name: &str,
    exclude: Option<&EntityId>,
) -> Result<(), StoreError> {
    for (_, org) in load_with_paths::<Organisation>(project, EntityPrefix::Org) {
        if Some(&org.id) != exclude && org.name.eq_ignore_ascii_case(name) {
            return Err(StoreError::DuplicateOrganisationName(name.to_string()));
        }
    }
    Ok(())
}

/// Enforce employee_id uniqueness across the project
pub fn ensure_unique_employee_id(
    project: &Project,
    employee_id: &str,
    exclude: Option<&EntityId>,
) -> Result<(), StoreError> {
    for (_, emp) in load_with_paths::<Employee>(project, EntityPrefix::Emp) {
        if Some(&emp.id) != exclude && emp.employee_id.as_deref() == Some(employee_id) {
            return Err(StoreError::DuplicateEmployeeId(employee_id.to_string()));
        }
    }
    Ok(())
}

/// What a cascade delete removed
#[derive(Debug, Default)]
pub struct CascadeStats {
    pub records_deleted: usize,
}

/// Delete an organisation and everything it owns.
///
/// All records whose `organisation` matches are removed, and responses whose
/// parent risk or opportunity was removed go with them. Referenced users are
/// never deleted.
pub fn delete_organisation(
    project: &Project,
    org_id: &EntityId,
) -> Result<CascadeStats, StoreError> {
    let org_path = project.entity_path(EntityPrefix::Org, org_id);
    if !org_path.exists() {
        return Err(StoreError::NotFound(org_id.to_string()));
    }

    let mut stats = CascadeStats::default();

    // Risks and opportunities first, remembering their IDs so orphaned
    // responses can be collected afterwards
    let mut removed_parents: Vec<EntityId> = Vec::new();
    for (path, risk) in load_with_paths::<Risk>(project, EntityPrefix::Risk) {
        if risk.organisation.as_ref() == Some(org_id) {
            std::fs::remove_file(path)?;
            removed_parents.push(risk.id);
            stats.records_deleted += 1;
        }
    }
    for (path, opp) in load_with_paths::<Opportunity>(project, EntityPrefix::Opp) {
        if opp.organisation.as_ref() == Some(org_id) {
            std::fs::remove_file(path)?;
            removed_parents.push(opp.id);
            stats.records_deleted += 1;
        }
    }
    for (path, resp) in load_with_paths::<Response>(project, EntityPrefix::Resp) {
        let orphaned = resp
            .risk
            .as_ref()
            .is_some_and(|r| removed_parents.contains(r))
            || resp
                .opportunity
                .as_ref()
                .is_some_and(|o| removed_parents.contains(o));
        if orphaned {
            std::fs::remove_file(path)?;
            stats.records_deleted += 1;
        }
    }

    stats.records_deleted += delete_owned::<Stakeholder>(project, EntityPrefix::Stk, org_id)?;
    stats.records_deleted += delete_owned::<Employee>(project, EntityPrefix::Emp, org_id)?;
    stats.records_deleted += delete_owned::<Commitment>(project, EntityPrefix::Lead, org_id)?;
    stats.records_deleted += delete_owned::<QualityPolicy>(project, EntityPrefix::Qpol, org_id)?;
    stats.records_deleted += delete_owned::<QmsChange>(project, EntityPrefix::Chg, org_id)?;
    stats.records_deleted += delete_owned::<Sop>(project, EntityPrefix::Sop, org_id)?;
    stats.records_deleted += delete_owned::<ContractReview>(project, EntityPrefix::Ctr, org_id)?;
    stats.records_deleted += delete_owned::<DesignProject>(project, EntityPrefix::Dsn, org_id)?;
    stats.records_deleted +=
        delete_owned::<SupplierEvaluation>(project, EntityPrefix::Sup, org_id)?;
    stats.records_deleted += delete_owned::<ServiceReport>(project, EntityPrefix::Svc, org_id)?;
    stats.records_deleted += delete_owned::<ProductRelease>(project, EntityPrefix::Rel, org_id)?;
    stats.records_deleted += delete_owned::<Nonconformance>(project, EntityPrefix::Ncr, org_id)?;
    stats.records_deleted += delete_owned::<ResourcePlan>(project, EntityPrefix::Res, org_id)?;
    stats.records_deleted += delete_owned::<TrainingRecord>(project, EntityPrefix::Trn, org_id)?;
    stats.records_deleted += delete_owned::<AwarenessRecord>(project, EntityPrefix::Awr, org_id)?;
    stats.records_deleted +=
        delete_owned::<CommunicationPlan>(project, EntityPrefix::Com, org_id)?;
    stats.records_deleted +=
        delete_owned::<DocumentRegister>(project, EntityPrefix::Doc, org_id)?;

    std::fs::remove_file(org_path)?;
    stats.records_deleted += 1;

    Ok(stats)
}

/// Delete a risk or opportunity together with its responses
pub fn delete_with_responses(
    project: &Project,
    prefix: EntityPrefix,
    id: &EntityId,
) -> Result<CascadeStats, StoreError> {
    let path = project.entity_path(prefix, id);
    if !path.exists() {
        return Err(StoreError::NotFound(id.to_string()));
    }

    let mut stats = CascadeStats::default();
    for (resp_path, resp) in load_with_paths::<Response>(project, EntityPrefix::Resp) {
        let references = match prefix {
            EntityPrefix::Risk => resp.risk.as_ref() == Some(id),
            EntityPrefix::Opp => resp.opportunity.as_ref() == Some(id),
            _ => false,
        };
        if references {
            std::fs::remove_file(resp_path)?;
            stats.records_deleted += 1;
        }
    }

    std::fs::remove_file(path)?;
    stats.records_deleted += 1;
    Ok(stats)
}

/// Clear all SET_NULL references to a user across the store.
///
/// Fails without touching anything when any PROTECT reference exists:
/// deleting a user must never silently delete or orphan record history they
/// own. Returns the number of references cleared.
pub fn clear_user_references(project: &Project, email: &str) -> Result<usize, StoreError> {
    // First pass: collect protected references across every record type
    let mut protected: Vec<ProtectedRef> = Vec::new();
    scan_protected::<Organisation>(project, EntityPrefix::Org, email, &mut protected);
    scan_protected::<Stakeholder>(project, EntityPrefix::Stk, email, &mut protected);
    scan_protected::<Employee>(project, EntityPrefix::Emp, email, &mut protected);
    scan_protected::<Commitment>(project, EntityPrefix::Lead, email, &mut protected);
    scan_protected::<QualityPolicy>(project, EntityPrefix::Qpol, email, &mut protected);
    scan_protected::<Risk>(project, EntityPrefix::Risk, email, &mut protected);
    scan_protected::<Opportunity>(project, EntityPrefix::Opp, email, &mut protected);
    scan_protected::<Response>(project, EntityPrefix::Resp, email, &mut protected);
    scan_protected::<QmsChange>(project, EntityPrefix::Chg, email, &mut protected);
    scan_protected::<Sop>(project, EntityPrefix::Sop, email, &mut protected);
    scan_protected::<ContractReview>(project, EntityPrefix::Ctr, email, &mut protected);
    scan_protected::<DesignProject>(project, EntityPrefix::Dsn, email, &mut protected);
    scan_protected::<SupplierEvaluation>(project, EntityPrefix::Sup, email, &mut protected);
    scan_protected::<ServiceReport>(project, EntityPrefix::Svc, email, &mut protected);
    scan_protected::<ProductRelease>(project, EntityPrefix::Rel, email, &mut protected);
    scan_protected::<Nonconformance>(project, EntityPrefix::Ncr, email, &mut protected);
    scan_protected::<ResourcePlan>(project, EntityPrefix::Res, email, &mut protected);
    scan_protected::<TrainingRecord>(project, EntityPrefix::Trn, email, &mut protected);
    scan_protected::<AwarenessRecord>(project, EntityPrefix::Awr, email, &mut protected);
    scan_protected::<CommunicationPlan>(project, EntityPrefix::Com, email, &mut protected);
    scan_protected::<DocumentRegister>(project, EntityPrefix::Doc, email, &mut protected);

    if !protected.is_empty() {
        return Err(StoreError::ProtectedUser {
            email: email.to_string(),
            count: protected.len(),
            refs: protected,
        });
    }

    // Second pass: clear SET_NULL references and rewrite the touched files
    let mut cleared = 0;
    cleared += clear_refs::<Organisation>(project, EntityPrefix::Org, email)?;
    cleared += clear_refs::<Stakeholder>(project, EntityPrefix::Stk, email)?;
    cleared += clear_refs::<Employee>(project, EntityPrefix::Emp, email)?;
    cleared += clear_refs::<Commitment>(project, EntityPrefix::Lead, email)?;
    cleared += clear_refs::<QualityPolicy>(project, EntityPrefix::Qpol, email)?;
    cleared += clear_refs::<Risk>(project, EntityPrefix::Risk, email)?;
    cleared += clear_refs::<Opportunity>(project, EntityPrefix::Opp, email)?;
    cleared += clear_refs::<Response>(project, EntityPrefix::Resp, email)?;
    cleared += clear_refs::<QmsChange>(project, EntityPrefix::Chg, email)?;
    cleared += clear_refs::<Sop>(project, EntityPrefix::Sop, email)?;
    cleared += clear_refs::<ContractReview>(project, EntityPrefix::Ctr, email)?;
    cleared += clear_refs::<DesignProject>(project, EntityPrefix::Dsn, email)?;
    cleared += clear_refs::<SupplierEvaluation>(project, EntityPrefix::Sup, email)?;
    cleared += clear_refs::<ServiceReport>(project, EntityPrefix::Svc, email)?;
    cleared += clear_refs::<ProductRelease>(project, EntityPrefix::Rel, email)?;
    cleared += clear_refs::<Nonconformance>(project, EntityPrefix::Ncr, email)?;
    cleared += clear_refs::<ResourcePlan>(project, EntityPrefix::Res, email)?;
    cleared += clear_refs::<TrainingRecord>(project, EntityPrefix::Trn, email)?;
    cleared += clear_refs::<AwarenessRecord>(project, EntityPrefix::Awr, email)?;
    cleared += clear_refs::<CommunicationPlan>(project, EntityPrefix::Com, email)?;
    cleared += clear_refs::<DocumentRegister>(project, EntityPrefix::Doc, email)?;

    Ok(cleared)
}

/// Load every record of a type together with its file path.
/// Unparseable files are skipped; `qmt validate` reports them.
pub fn load_with_paths<T: Entity + 'static>(
    project: &Project,
    prefix: EntityPrefix,
) -> Vec<(PathBuf, T)> {
    let mut out = Vec::new();
    for path in project.iter_entity_files(prefix) {
        if let Ok(content) = std::fs::read_to_string(&path) {
            if let Ok(entity) = serde_yml::from_str::<T>(&content) {
                out.push((path, entity));
            }
        }
    }
    out
}

fn delete_owned<T: Entity + 'static>(
    project: &Project,
    prefix: EntityPrefix,
    org_id: &EntityId,
) -> Result<usize, StoreError> {
    let mut deleted = 0;
    for (path, entity) in load_with_paths::<T>(project, prefix) {
        if entity.organisation() == Some(org_id) {
            std::fs::remove_file(path)?;
            deleted += 1;
        }
    }
    Ok(deleted)
}

fn scan_protected<T: Entity + UserRefs + 'static>(
    project: &Project,
    prefix: EntityPrefix,
    email: &str,
    out: &mut Vec<ProtectedRef>,
) {
    for (_, entity) in load_with_paths::<T>(project, prefix) {
        for user_ref in entity.user_refs() {
            if user_ref.policy == RefPolicy::Protect
                && user_ref.email.eq_ignore_ascii_case(email)
            {
                out.push(ProtectedRef {
                    record: entity.id().clone(),
                    record_title: entity.title().to_string(),
                    field: user_ref.field,
                });
            }
        }
    }
}

fn clear_refs<T: Entity + UserRefs + 'static>(
    project: &Project,
    prefix: EntityPrefix,
    email: &str,
) -> Result<usize, StoreError> {
    let mut cleared = 0;
    for (_, mut entity) in load_with_paths::<T>(project, prefix) {
        let n = entity.clear_user(email);
        if n > 0 {
            save(project, &mut entity)?;
            cleared += n;
        }
    }
    Ok(cleared)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn setup() -> (tempfile::TempDir, Project) {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();
        (tmp, project)
    }

    #[test]
    fn test_save_runs_derived_field_hook() {
        let (_tmp, project) = setup();

        let mut risk = Risk::new(
            "Supplier failure".to_string(),
            "qa@acme.test".to_string(),
            "test".to_string(),
        );
        risk.likelihood = Some(3);
        risk.impact = Some(4);

        let path = save(&project, &mut risk).unwrap();
        assert_eq!(risk.score, Some(12));
        assert!(risk.updated.is_some());

        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("score: 12"));
    }

    #[test]
    fn test_unique_organisation_name() {
        let (_tmp, project) = setup();

        let mut org = Organisation::new("Acme Ltd".to_string(), "test".to_string());
        save(&project, &mut org).unwrap();

        let err = ensure_unique_organisation_name(&project, "acme ltd", None).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateOrganisationName(_)));

        // The record itself is excluded when re-saving
        ensure_unique_organisation_name(&project, "Acme Ltd", Some(&org.id)).unwrap();
    }

    #[test]
    fn test_unique_employee_id() {
        let (_tmp, project) = setup();

        let mut org = Organisation::new("Acme Ltd".to_string(), "test".to_string());
        save(&project, &mut org).unwrap();

        let mut emp = Employee::new(org.id.clone(), "Dana Osei".to_string(), "test".to_string());
        emp.employee_id = Some("E-100".to_string());
        save(&project, &mut emp).unwrap();

        let err = ensure_unique_employee_id(&project, "E-100", None).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmployeeId(_)));
        ensure_unique_employee_id(&project, "E-101", None).unwrap();
    }

    #[test]
    fn test_delete_organisation_cascades() {
        let (_tmp, project) = setup();

        let mut org = Organisation::new("Acme Ltd".to_string(), "test".to_string());
        save(&project, &mut org).unwrap();
        let mut other = Organisation::new("Globex".to_string(), "test".to_string());
        save(&project, &mut other).unwrap();

        let mut emp = Employee::new(org.id.clone(), "Dana Osei".to_string(), "test".to_string());
        save(&project, &mut emp).unwrap();

        let mut risk = Risk::new(
            "Supplier failure".to_string(),
            "qa@acme.test".to_string(),
            "test".to_string(),
        );
        risk.organisation = Some(org.id.clone());
        save(&project, &mut risk).unwrap();

        let mut resp = Response::new(
            crate::entities::response::ResponseType::Mitigate,
            "Second source".to_string(),
            "ops@acme.test".to_string(),
            "test".to_string(),
        );
        resp.risk = Some(risk.id.clone());
        save(&project, &mut resp).unwrap();

        let mut other_risk = Risk::new(
            "Unrelated".to_string(),
            "qa@acme.test".to_string(),
            "test".to_string(),
        );
        other_risk.organisation = Some(other.id.clone());
        save(&project, &mut other_risk).unwrap();

        let stats = delete_organisation(&project, &org.id).unwrap();
        // org + employee + risk + response
        assert_eq!(stats.records_deleted, 4);

        assert!(load_with_paths::<Employee>(&project, EntityPrefix::Emp).is_empty());
        assert!(load_with_paths::<Response>(&project, EntityPrefix::Resp).is_empty());
        // The other organisation and its risk survive
        assert_eq!(
            load_with_paths::<Organisation>(&project, EntityPrefix::Org).len(),
            1
        );
        assert_eq!(load_with_paths::<Risk>(&project, EntityPrefix::Risk).len(), 1);
    }

    #[test]
    fn test_delete_risk_cascades_responses() {
        let (_tmp, project) = setup();

        let mut risk = Risk::new(
            "Supplier failure".to_string(),
            "qa@acme.test".to_string(),
            "test".to_string(),
        );
        save(&project, &mut risk).unwrap();

        let mut resp = Response::new(
            crate::entities::response::ResponseType::Mitigate,
            "Second source".to_string(),
            "ops@acme.test".to_string(),
            "test".to_string(),
        );
        resp.risk = Some(risk.id.clone());
        save(&project, &mut resp).unwrap();

        let stats = delete_with_responses(&project, EntityPrefix::Risk, &risk.id).unwrap();
        assert_eq!(stats.records_deleted, 2);
        assert!(load_with_paths::<Response>(&project, EntityPrefix::Resp).is_empty());
    }

    #[test]
    fn test_protected_user_rejected() {
        let (_tmp, project) = setup();

        let mut risk = Risk::new(
            "Supplier failure".to_string(),
            "qa@acme.test".to_string(),
            "test".to_string(),
        );
        save(&project, &mut risk).unwrap();

        let err = clear_user_references(&project, "qa@acme.test").unwrap_err();
        match err {
            StoreError::ProtectedUser { email, count, refs } => {
                assert_eq!(email, "qa@acme.test");
                assert_eq!(count, 1);
                assert_eq!(refs[0].field, "identified_by");
            }
            other => panic!("unexpected error: {other}"),
        }

        // Nothing was modified
        let (_, reloaded) = load_with_paths::<Risk>(&project, EntityPrefix::Risk)
            .into_iter()
            .next()
            .unwrap();
        assert_eq!(reloaded.identified_by, "qa@acme.test");
    }

    #[test]
    fn test_set_null_references_cleared() {
        let (_tmp, project) = setup();

        let mut org = Organisation::new("Acme Ltd".to_string(), "test".to_string());
        org.representative = Some("rep@acme.test".to_string());
        org.departments
            .push(crate::entities::organisation::OrganisationDepartment {
                name: "Operations".to_string(),
                coordinator: Some("rep@acme.test".to_string()),
            });
        save(&project, &mut org).unwrap();

        let mut ncr = Nonconformance::new(
            "Late delivery".to_string(),
            "Order shipped late".to_string(),
            "test".to_string(),
        );
        ncr.reported_by = Some("rep@acme.test".to_string());
        save(&project, &mut ncr).unwrap();

        let cleared = clear_user_references(&project, "rep@acme.test").unwrap();
        assert_eq!(cleared, 3);

        let (_, org) = load_with_paths::<Organisation>(&project, EntityPrefix::Org)
            .into_iter()
            .next()
            .unwrap();
        assert!(org.representative.is_none());
        assert!(org.departments[0].coordinator.is_none());
        // The department row survives the coordinator deletion
        assert_eq!(org.departments.len(), 1);
    }
}
