//! Nonconformance record - identify, control, and correct nonconformities

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::EntityId;
use crate::core::lifecycle::StatusCycle;
use crate::core::refs::{clear_if_matches, push_ref, RefPolicy, UserRef, UserRefs};
use crate::core::registry::Tabular;

/// Reporting department
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[derive(Default)]
pub enum NcrDepartment {
    #[default]
    #[serde(rename = "QA")]
    Qa,
    Operations,
}

impl std::fmt::Display for NcrDepartment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NcrDepartment::Qa => write!(f, "QA"),
            NcrDepartment::Operations => write!(f, "Operations"),
        }
    }
}

impl std::str::FromStr for NcrDepartment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "qa" => Ok(NcrDepartment::Qa),
            "operations" => Ok(NcrDepartment::Operations),
            _ => Err(format!("Invalid department: {}. Use QA or Operations", s)),
        }
    }
}

/// NCR lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum NcrStatus {
    #[default]
    Open,
    InProgress,
    Closed,
}

impl std::fmt::Display for NcrStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NcrStatus::Open => write!(f, "open"),
            NcrStatus::InProgress => write!(f, "in_progress"),
            NcrStatus::Closed => write!(f, "closed"),
        }
    }
}

impl StatusCycle for NcrStatus {
    fn all() -> &'static [Self] {
        &[NcrStatus::Open, NcrStatus::InProgress, NcrStatus::Closed]
    }

    fn forward(&self) -> &'static [Self] {
        match self {
            NcrStatus::Open => &[NcrStatus::InProgress, NcrStatus::Closed],
            NcrStatus::InProgress => &[NcrStatus::Closed],
            NcrStatus::Closed => &[],
        }
    }
}

/// A nonconformance record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Nonconformance {
    /// Unique identifier
    pub id: EntityId,

    /// Owning organisation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organisation: Option<EntityId>,

    pub title: String,

    /// Cleared when that user is deleted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reported_by: Option<String>,

    #[serde(default)]
    pub department: NcrDepartment,

    pub description: String,

    pub detected_date: NaiveDate,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corrective_action_taken: Option<String>,

    #[serde(default)]
    pub status: NcrStatus,

    /// Project-relative attachment path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_reference: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Creation timestamp, immutable after set
    pub created: DateTime<Utc>,

    /// Refreshed on every save
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,

    pub author: String,
}

impl Entity for Nonconformance {
    const PREFIX: &'static str = "NCR";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn status(&self) -> &str {
        match self.status {
            NcrStatus::Open => "open",
            NcrStatus::InProgress => "in_progress",
            NcrStatus::Closed => "closed",
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

impl Nonconformance {
    /// Create a new open NCR
    pub fn new(title: String, description: String, author: String) -> Self {
        Self {
            id: EntityId::new(crate::core::EntityPrefix::Ncr),
            organisation: None,
            title,
            reported_by: None,
            department: NcrDepartment::default(),
            description,
            detected_date: chrono::Local::now().date_naive(),
            corrective_action_taken: None,
            status: NcrStatus::default(),
            document_reference: None,
            notes: None,
            created: Utc::now(),
            updated: None,
            author,
        }
    }
}

impl UserRefs for Nonconformance {
    fn user_refs(&self) -> Vec<UserRef> {
        let mut refs = Vec::new();
        push_ref(&mut refs, "reported_by", &self.reported_by, RefPolicy::SetNull);
        refs
    }

    fn clear_user(&mut self, email: &str) -> usize {
        clear_if_matches(&mut self.reported_by, email)
    }
}

impl Tabular for Nonconformance {
    fn cell(&self, column: &str) -> String {
        match column {
            "title" => self.title.clone(),
            "description" => self.description.clone(),
            "reported_by" => self.reported_by.clone().unwrap_or_default(),
            "department" => self.department.to_string(),
            "detected_date" => self.detected_date.to_string(),
            "corrective_action_taken" => {
                self.corrective_action_taken.clone().unwrap_or_default()
            }
            "status" => self.status.to_string(),
            "created" => self.created.format("%Y-%m-%d").to_string(),
            _ => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ncr_creation() {
        let ncr = Nonconformance::new(
            "Late delivery to customer".to_string(),
            "Order 4411 shipped two days late".to_string(),
            "test".to_string(),
        );

        assert!(ncr.id.to_string().starts_with("NCR-"));
        assert_eq!(ncr.status, NcrStatus::Open);
        assert_eq!(ncr.department, NcrDepartment::Qa);
    }

    #[test]
    fn test_department_serializes_as_qa() {
        let ncr = Nonconformance::new("T".to_string(), "D".to_string(), "test".to_string());
        let yaml = serde_yml::to_string(&ncr).unwrap();
        assert!(yaml.contains("department: QA"));
    }

    #[test]
    fn test_ncr_roundtrip() {
        let mut ncr = Nonconformance::new(
            "Wrong label applied".to_string(),
            "Batch 12 labelled as batch 13".to_string(),
            "test".to_string(),
        );
        ncr.status = NcrStatus::InProgress;
        ncr.corrective_action_taken = Some("Relabelled and re-inspected".to_string());

        let yaml = serde_yml::to_string(&ncr).unwrap();
        let parsed: Nonconformance = serde_yml::from_str(&yaml).unwrap();

        assert_eq!(ncr.id, parsed.id);
        assert_eq!(parsed.status, NcrStatus::InProgress);
    }

    #[test]
    fn test_reporter_cleared_on_user_delete() {
        let mut ncr = Nonconformance::new("T".to_string(), "D".to_string(), "test".to_string());
        ncr.reported_by = Some("staff@acme.test".to_string());

        assert_eq!(ncr.user_refs()[0].policy, RefPolicy::SetNull);
        assert_eq!(ncr.clear_user("staff@acme.test"), 1);
        assert!(ncr.reported_by.is_none());
    }

    #[test]
    fn test_forward_graph() {
        assert!(NcrStatus::Open.forward().contains(&NcrStatus::Closed));
        assert!(NcrStatus::Closed.forward().is_empty());
    }
}
