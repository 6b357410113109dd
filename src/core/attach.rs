//! Attachment storage
//!
//! Evidence files are copied into the project under content-type-specific,
//! date-partitioned prefixes: `attachments/<kind>/YYYY/MM/DD/<name>`.
//! Records hold the project-relative path.

use chrono::Datelike;
use std::path::Path;
use thiserror::Error;

use crate::core::identity::EntityPrefix;
use crate::core::Project;

/// Attachment kind determines the storage prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    Signatures,
    Sops,
    ContractReviews,
    DesignRecords,
    SupplierEvaluations,
    ServiceReports,
    ProductApprovals,
    Ncr,
    ResourcePlans,
    TrainingRecords,
    AwarenessRecords,
    CommunicationPlans,
    DocumentRegisters,
    Commitments,
    QualityPolicyEvidence,
    ChangeEvidence,
    OrganisationDocuments,
}

impl AttachmentKind {
    /// Storage prefix under attachments/
    pub fn prefix(&self) -> &'static str {
        match self {
            AttachmentKind::Signatures => "signatures",
            AttachmentKind::Sops => "sops",
            AttachmentKind::ContractReviews => "contract_reviews",
            AttachmentKind::DesignRecords => "design_records",
            AttachmentKind::SupplierEvaluations => "supplier_evaluations",
            AttachmentKind::ServiceReports => "service_reports",
            AttachmentKind::ProductApprovals => "product_approvals",
            AttachmentKind::Ncr => "ncr",
            AttachmentKind::ResourcePlans => "resource_plans",
            AttachmentKind::TrainingRecords => "training_records",
            AttachmentKind::AwarenessRecords => "awareness_records",
            AttachmentKind::CommunicationPlans => "communication_plans",
            AttachmentKind::DocumentRegisters => "document_registers",
            AttachmentKind::Commitments => "commitments",
            AttachmentKind::QualityPolicyEvidence => "quality_policy/evidence",
            AttachmentKind::ChangeEvidence => "change_evidence",
            AttachmentKind::OrganisationDocuments => "documents",
        }
    }

    /// Attachment kind for a record type, where one applies
    pub fn for_prefix(prefix: EntityPrefix) -> Option<Self> {
        match prefix {
            EntityPrefix::Org => Some(AttachmentKind::OrganisationDocuments),
            EntityPrefix::Lead => Some(AttachmentKind::Commitments),
            EntityPrefix::Qpol => Some(AttachmentKind::QualityPolicyEvidence),
            EntityPrefix::Chg => Some(AttachmentKind::ChangeEvidence),
            EntityPrefix::Sop => Some(AttachmentKind::Sops),
            EntityPrefix::Ctr => Some(AttachmentKind::ContractReviews),
            EntityPrefix::Dsn => Some(AttachmentKind::DesignRecords),
            EntityPrefix::Sup => Some(AttachmentKind::SupplierEvaluations),
            EntityPrefix::Svc => Some(AttachmentKind::ServiceReports),
            EntityPrefix::Rel => Some(AttachmentKind::ProductApprovals),
            EntityPrefix::Ncr => Some(AttachmentKind::Ncr),
            EntityPrefix::Res => Some(AttachmentKind::ResourcePlans),
            EntityPrefix::Trn => Some(AttachmentKind::TrainingRecords),
            EntityPrefix::Awr => Some(AttachmentKind::AwarenessRecords),
            EntityPrefix::Com => Some(AttachmentKind::CommunicationPlans),
            EntityPrefix::Doc => Some(AttachmentKind::DocumentRegisters),
            EntityPrefix::Stk | EntityPrefix::Emp | EntityPrefix::Risk
            | EntityPrefix::Opp | EntityPrefix::Resp => None,
        }
    }
}

/// Errors from attachment storage
#[derive(Debug, Error)]
pub enum AttachError {
    #[error("source file not found: {0}")]
    SourceNotFound(String),

    #[error("source path has no file name: {0}")]
    NoFileName(String),

    #[error("IO error storing attachment: {0}")]
    Io(#[from] std::io::Error),
}

/// Copy a file into the attachment store, returning the project-relative path
pub fn store_attachment(
    project: &Project,
    kind: AttachmentKind,
    source: &Path,
) -> Result<String, AttachError> {
    if !source.is_file() {
        return Err(AttachError::SourceNotFound(
            source.to_string_lossy().to_string(),
        ));
    }

    let file_name = source
        .file_name()
        .ok_or_else(|| AttachError::NoFileName(source.to_string_lossy().to_string()))?;

    let today = chrono::Local::now().date_naive();
    let relative = format!(
        "attachments/{}/{:04}/{:02}/{:02}",
        kind.prefix(),
        today.year(),
        today.month(),
        today.day()
    );

    let dest_dir = project.root().join(&relative);
    std::fs::create_dir_all(&dest_dir)?;

    let mut dest = dest_dir.join(file_name);
    // Never overwrite an existing attachment with the same name
    let mut counter = 1;
    while dest.exists() {
        let stem = Path::new(file_name)
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let ext = Path::new(file_name)
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        dest = dest_dir.join(format!("{}-{}{}", stem, counter, ext));
        counter += 1;
    }

    std::fs::copy(source, &dest)?;

    let stored_name = dest
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    Ok(format!("{}/{}", relative, stored_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_store_attachment_creates_dated_path() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();

        let src = tmp.path().join("evidence.pdf");
        std::fs::write(&src, b"pdf bytes").unwrap();

        let rel = store_attachment(&project, AttachmentKind::Ncr, &src).unwrap();
        assert!(rel.starts_with("attachments/ncr/"));
        assert!(rel.ends_with("evidence.pdf"));
        assert!(project.root().join(&rel).is_file());
    }

    #[test]
    fn test_store_attachment_avoids_collision() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();

        let src = tmp.path().join("minutes.txt");
        std::fs::write(&src, b"first").unwrap();

        let first = store_attachment(&project, AttachmentKind::Commitments, &src).unwrap();
        let second = store_attachment(&project, AttachmentKind::Commitments, &src).unwrap();
        assert_ne!(first, second);
        assert!(project.root().join(&second).is_file());
    }

    #[test]
    fn test_store_attachment_missing_source() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();

        let err = store_attachment(
            &project,
            AttachmentKind::Sops,
            Path::new("/nonexistent/file.pdf"),
        )
        .unwrap_err();
        assert!(matches!(err, AttachError::SourceNotFound(_)));
    }
}
