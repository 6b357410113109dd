//! Design project record with its design & development evidence line items

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::EntityId;
use crate::core::lifecycle::StatusCycle;
use crate::core::refs::{clear_if_matches, push_ref, RefPolicy, UserRef, UserRefs};
use crate::core::registry::Tabular;

/// Responsible department
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[derive(Default)]
pub enum DesignDepartment {
    #[default]
    #[serde(rename = "technical")]
    Technical,
    #[serde(rename = "QA")]
    Qa,
}

impl std::fmt::Display for DesignDepartment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DesignDepartment::Technical => write!(f, "technical"),
            DesignDepartment::Qa => write!(f, "QA"),
        }
    }
}

/// Design project status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum DesignStatus {
    #[default]
    Planned,
    InProgress,
    Completed,
    OnHold,
}

impl std::fmt::Display for DesignStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DesignStatus::Planned => write!(f, "planned"),
            DesignStatus::InProgress => write!(f, "in_progress"),
            DesignStatus::Completed => write!(f, "completed"),
            DesignStatus::OnHold => write!(f, "on_hold"),
        }
    }
}

impl StatusCycle for DesignStatus {
    fn all() -> &'static [Self] {
        &[
            DesignStatus::Planned,
            DesignStatus::InProgress,
            DesignStatus::Completed,
            DesignStatus::OnHold,
        ]
    }

    fn forward(&self) -> &'static [Self] {
        match self {
            DesignStatus::Planned => &[DesignStatus::InProgress, DesignStatus::OnHold],
            DesignStatus::InProgress => &[DesignStatus::Completed, DesignStatus::OnHold],
            DesignStatus::OnHold => &[DesignStatus::InProgress],
            DesignStatus::Completed => &[],
        }
    }
}

/// Design record classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum DesignRecordType {
    #[default]
    Plan,
    Review,
    Verification,
    Validation,
    Other,
}

impl std::fmt::Display for DesignRecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DesignRecordType::Plan => write!(f, "plan"),
            DesignRecordType::Review => write!(f, "review"),
            DesignRecordType::Verification => write!(f, "verification"),
            DesignRecordType::Validation => write!(f, "validation"),
            DesignRecordType::Other => write!(f, "other"),
        }
    }
}

/// Design & development evidence (plan, review, verification, validation)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignRecord {
    pub record_type: DesignRecordType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Project-relative attachment path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_file: Option<String>,

    /// Cleared when that user is deleted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,

    pub created_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A design/development project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignProject {
    /// Unique identifier
    pub id: EntityId,

    /// Owning organisation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organisation: Option<EntityId>,

    pub title: String,

    #[serde(default)]
    pub department: DesignDepartment,

    /// Cleared when that user is deleted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    pub start_date: NaiveDate,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planned_end_date: Option<NaiveDate>,

    #[serde(default)]
    pub status: DesignStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub records: Vec<DesignRecord>,

    /// Creation timestamp, immutable after set
    pub created: DateTime<Utc>,

    /// Refreshed on every save
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,

    pub author: String,
}

impl Entity for DesignProject {
    const PREFIX: &'static str = "DSN";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn status(&self) -> &str {
        match self.status {
            DesignStatus::Planned => "planned",
            DesignStatus::InProgress => "in_progress",
            DesignStatus::Completed => "completed",
            DesignStatus::OnHold => "on_hold",
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

impl DesignProject {
    /// Create a new planned design project
    pub fn new(title: String, author: String) -> Self {
        Self {
            id: EntityId::new(crate::core::EntityPrefix::Dsn),
            organisation: None,
            title,
            department: DesignDepartment::default(),
            owner: None,
            start_date: chrono::Local::now().date_naive(),
            planned_end_date: None,
            status: DesignStatus::default(),
            notes: None,
            records: Vec::new(),
            created: Utc::now(),
            updated: None,
            author,
        }
    }

    /// Append a design record line item
    pub fn add_record(&mut self, record: DesignRecord) {
        self.records.push(record);
    }
}

impl UserRefs for DesignProject {
    fn user_refs(&self) -> Vec<UserRef> {
        let mut refs = Vec::new();
        push_ref(&mut refs, "owner", &self.owner, RefPolicy::SetNull);
        for record in &self.records {
            push_ref(
                &mut refs,
                "records.created_by",
                &record.created_by,
                RefPolicy::SetNull,
            );
        }
        refs
    }

    fn clear_user(&mut self, email: &str) -> usize {
        let mut cleared = clear_if_matches(&mut self.owner, email);
        for record in &mut self.records {
            cleared += clear_if_matches(&mut record.created_by, email);
        }
        cleared
    }
}

impl Tabular for DesignProject {
    fn cell(&self, column: &str) -> String {
        match column {
            "title" => self.title.clone(),
            "department" => self.department.to_string(),
            "owner" => self.owner.clone().unwrap_or_default(),
            "start_date" => self.start_date.to_string(),
            "planned_end_date" => self
                .planned_end_date
                .map_or("-".to_string(), |d| d.to_string()),
            "status" => self.status.to_string(),
            "notes" => self.notes.clone().unwrap_or_default(),
            "created" => self.created.format("%Y-%m-%d").to_string(),
            _ => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_design_project_creation() {
        let dsn = DesignProject::new("New fixture design".to_string(), "test".to_string());

        assert!(dsn.id.to_string().starts_with("DSN-"));
        assert_eq!(dsn.status, DesignStatus::Planned);
        assert_eq!(dsn.department, DesignDepartment::Technical);
    }

    #[test]
    fn test_design_records_roundtrip() {
        let mut dsn = DesignProject::new("New fixture design".to_string(), "test".to_string());
        dsn.add_record(DesignRecord {
            record_type: DesignRecordType::Verification,
            description: Some("Fixture load test".to_string()),
            document_file: None,
            created_by: Some("eng@acme.test".to_string()),
            created_at: Utc::now(),
            notes: None,
        });

        let yaml = serde_yml::to_string(&dsn).unwrap();
        assert!(yaml.contains("record_type: verification"));

        let parsed: DesignProject = serde_yml::from_str(&yaml).unwrap();
        assert_eq!(parsed.records.len(), 1);
    }

    #[test]
    fn test_clear_user_covers_records() {
        let mut dsn = DesignProject::new("Fixture".to_string(), "test".to_string());
        dsn.owner = Some("eng@acme.test".to_string());
        dsn.add_record(DesignRecord {
            record_type: DesignRecordType::Plan,
            description: None,
            document_file: None,
            created_by: Some("eng@acme.test".to_string()),
            created_at: Utc::now(),
            notes: None,
        });

        assert_eq!(dsn.clear_user("eng@acme.test"), 2);
        assert!(dsn.owner.is_none());
        assert!(dsn.records[0].created_by.is_none());
    }

    #[test]
    fn test_on_hold_can_resume() {
        assert!(DesignStatus::OnHold.forward().contains(&DesignStatus::InProgress));
        assert!(DesignStatus::Completed.forward().is_empty());
    }
}
