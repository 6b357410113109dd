//! QMS change record with its control line items

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::EntityId;
use crate::core::lifecycle::StatusCycle;
use crate::core::refs::{clear_if_matches, push_ref, RefPolicy, UserRef, UserRefs};
use crate::core::registry::Tabular;

/// Change lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum ChangeStatus {
    #[default]
    Planned,
    InProgress,
    Implemented,
    Rejected,
    Closed,
}

impl std::fmt::Display for ChangeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeStatus::Planned => write!(f, "planned"),
            ChangeStatus::InProgress => write!(f, "in_progress"),
            ChangeStatus::Implemented => write!(f, "implemented"),
            ChangeStatus::Rejected => write!(f, "rejected"),
            ChangeStatus::Closed => write!(f, "closed"),
        }
    }
}

impl StatusCycle for ChangeStatus {
    fn all() -> &'static [Self] {
        &[
            ChangeStatus::Planned,
            ChangeStatus::InProgress,
            ChangeStatus::Implemented,
            ChangeStatus::Rejected,
            ChangeStatus::Closed,
        ]
    }

    fn forward(&self) -> &'static [Self] {
        match self {
            ChangeStatus::Planned => &[ChangeStatus::InProgress, ChangeStatus::Rejected],
            ChangeStatus::InProgress => &[ChangeStatus::Implemented, ChangeStatus::Rejected],
            ChangeStatus::Implemented => &[ChangeStatus::Closed],
            ChangeStatus::Rejected => &[ChangeStatus::Closed],
            ChangeStatus::Closed => &[],
        }
    }
}

/// A control or action taken for the change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlRecord {
    pub control_action: String,

    /// Cleared when that user is deleted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsible_person: Option<String>,

    pub control_date: NaiveDate,

    /// Verification or validation of the change
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_reference: Option<String>,

    /// Project-relative attachment path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A planned or implemented change to the QMS
///
/// Approval and implementation are recorded as (user, date) pairs set
/// independently of the status field; nothing couples the two.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QmsChange {
    /// Unique identifier
    pub id: EntityId,

    /// Owning organisation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organisation: Option<EntityId>,

    pub title: String,

    /// Nature and reason for the change
    pub description: String,

    /// Cleared when that user is deleted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_by: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planned_date: Option<NaiveDate>,

    #[serde(default)]
    pub status: ChangeStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implemented_by: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implemented_date: Option<NaiveDate>,

    /// Potential impacts of the change on QMS processes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact_assessment: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub control_records: Vec<ControlRecord>,

    /// Creation timestamp, immutable after set
    pub created: DateTime<Utc>,

    /// Refreshed on every save
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,

    pub author: String,
}

impl Entity for QmsChange {
    const PREFIX: &'static str = "CHG";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn status(&self) -> &str {
        match self.status {
            ChangeStatus::Planned => "planned",
            ChangeStatus::InProgress => "in_progress",
            ChangeStatus::Implemented => "implemented",
            ChangeStatus::Rejected => "rejected",
            ChangeStatus::Closed => "closed",
        }
    }

    fn created(&self) -> DateTime<Utc> {
        self.created
    }

    fn author(&self) -> &str {
        &self.author
    }

    fn organisation(&self) -> Option<&EntityId> {
        self.organisation.as_ref()
    }

    fn touch(&mut self) {
        self.updated = Some(Utc::now());
    }
}

impl QmsChange {
    /// Create a new planned change
    pub fn new(title: String, description: String, author: String) -> Self {
        Self {
            id: EntityId::new(crate::core::EntityPrefix::Chg),
            organisation: None,
            title,
            description,
            requested_by: None,
            department: None,
            planned_date: None,
            status: ChangeStatus::default(),
            approved_by: None,
            approved_date: None,
            implemented_by: None,
            implemented_date: None,
            impact_assessment: None,
            remarks: None,
            control_records: Vec::new(),
            created: Utc::now(),
            updated: None,
            author,
        }
    }
}

impl UserRefs for QmsChange {
    fn user_refs(&self) -> Vec<UserRef> {
        let mut refs = Vec::new();
        push_ref(&mut refs, "requested_by", &self.requested_by, RefPolicy::SetNull);
        push_ref(&mut refs, "approved_by", &self.approved_by, RefPolicy::SetNull);
        push_ref(&mut refs, "implemented_by", &self.implemented_by, RefPolicy::SetNull);
        for cr in &self.control_records {
            push_ref(
                &mut refs,
                "control_records.responsible_person",
                &cr.responsible_person,
                RefPolicy::SetNull,
            );
        }
        refs
    }

    fn clear_user(&mut self, email: &str) -> usize {
        let mut cleared = clear_if_matches(&mut self.requested_by, email)
            + clear_if_matches(&mut self.approved_by, email)
            + clear_if_matches(&mut self.implemented_by, email);
        for cr in &mut self.control_records {
            cleared += clear_if_matches(&mut cr.responsible_person, email);
        }
        cleared
    }
}

impl Tabular for QmsChange {
    fn cell(&self, column: &str) -> String {
        match column {
            "title" => self.title.clone(),
            "description" => self.description.clone(),
            "requested_by" => self.requested_by.clone().unwrap_or_default(),
            "department" => self.department.clone().unwrap_or_default(),
            "status" => self.status.to_string(),
            "planned_date" => self.planned_date.map_or("-".to_string(), |d| d.to_string()),
            "approved_by" => self.approved_by.clone().unwrap_or_default(),
            "implemented_by" => self.implemented_by.clone().unwrap_or_default(),
            "created" => self.created.format("%Y-%m-%d").to_string(),
            _ => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_change() -> QmsChange {
        QmsChange::new(
            "Move inspection to incoming goods".to_string(),
            "Reduce rework by inspecting earlier".to_string(),
            "test".to_string(),
        )
    }

    #[test]
    fn test_change_creation() {
        let chg = test_change();

        assert!(chg.id.to_string().starts_with("CHG-"));
        assert_eq!(chg.status, ChangeStatus::Planned);
        assert!(chg.approved_by.is_none());
    }

    #[test]
    fn test_approval_independent_of_status() {
        // The (user, date) pairs carry no status coupling
        let mut chg = test_change();
        chg.approved_by = Some("qa@acme.test".to_string());
        chg.approved_date = Some(chrono::Local::now().date_naive());

        assert_eq!(chg.status, ChangeStatus::Planned);
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let mut chg = test_change();
        chg.status = ChangeStatus::InProgress;

        let yaml = serde_yml::to_string(&chg).unwrap();
        assert!(yaml.contains("status: in_progress"));
    }

    #[test]
    fn test_forward_graph() {
        assert!(ChangeStatus::Planned.forward().contains(&ChangeStatus::InProgress));
        assert!(ChangeStatus::Implemented.forward().contains(&ChangeStatus::Closed));
        assert!(!ChangeStatus::Closed.forward().contains(&ChangeStatus::Planned));
    }

    #[test]
    fn test_clear_user_covers_control_records() {
        let mut chg = test_change();
        chg.requested_by = Some("ops@acme.test".to_string());
        chg.control_records.push(ControlRecord {
            control_action: "Update SOP-7".to_string(),
            responsible_person: Some("ops@acme.test".to_string()),
            control_date: chrono::Local::now().date_naive(),
            verification: None,
            document_reference: None,
            evidence: None,
            notes: None,
        });

        assert_eq!(chg.clear_user("ops@acme.test"), 2);
        assert!(chg.requested_by.is_none());
        assert!(chg.control_records[0].responsible_person.is_none());
    }

    #[test]
    fn test_change_roundtrip() {
        let mut chg = test_change();
        chg.control_records.push(ControlRecord {
            control_action: "Revise checklist".to_string(),
            responsible_person: None,
            control_date: chrono::Local::now().date_naive(),
            verification: Some("Checklist reviewed by QA".to_string()),
            document_reference: Some("SOP-7".to_string()),
            evidence: None,
            notes: None,
        });

        let yaml = serde_yml::to_string(&chg).unwrap();
        let parsed: QmsChange = serde_yml::from_str(&yaml).unwrap();

        assert_eq!(chg.id, parsed.id);
        assert_eq!(parsed.control_records.len(), 1);
    }
}
