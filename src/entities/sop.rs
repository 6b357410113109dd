//! Standard operating procedure record

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::EntityId;
use crate::core::refs::{clear_if_matches, push_ref, RefPolicy, UserRef, UserRefs};
use crate::core::registry::Tabular;

/// Owning department
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[derive(Default)]
pub enum SopDepartment {
    #[default]
    #[serde(rename = "operations")]
    Operations,
    #[serde(rename = "QA")]
    Qa,
}

impl std::fmt::Display for SopDepartment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SopDepartment::Operations => write!(f, "operations"),
            SopDepartment::Qa => write!(f, "QA"),
        }
    }
}

/// A standard operating procedure or work instruction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sop {
    /// Unique identifier
    pub id: EntityId,

    /// Owning organisation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organisation: Option<EntityId>,

    pub title: String,

    #[serde(default)]
    pub department: SopDepartment,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Project-relative attachment path of the procedure document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Cleared when that user is deleted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_date: Option<NaiveDate>,

    #[serde(default = "default_true")]
    pub is_active: bool,

    /// Creation timestamp, immutable after set
    pub created: DateTime<Utc>,

    /// Refreshed on every save
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,

    pub author: String,
}

fn default_true() -> bool {
    true
}

impl Entity for Sop {
    const PREFIX: &'static str = "SOP";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn status(&self) -> &str {
        if self.is_active {
            "active"
        } else {
            "inactive"
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

impl Sop {
    /// Create a new active SOP
    pub fn new(title: String, author: String) -> Self {
        Self {
            id: EntityId::new(crate::core::EntityPrefix::Sop),
            organisation: None,
            title,
            department: SopDepartment::default(),
            description: None,
            file: None,
            created_by: None,
            review_date: None,
            is_active: true,
            created: Utc::now(),
            updated: None,
            author,
        }
    }
}

impl UserRefs for Sop {
    fn user_refs(&self) -> Vec<UserRef> {
        let mut refs = Vec::new();
        push_ref(&mut refs, "created_by", &self.created_by, RefPolicy::SetNull);
        refs
    }

    fn clear_user(&mut self, email: &str) -> usize {
        clear_if_matches(&mut self.created_by, email)
    }
}

impl Tabular for Sop {
    fn cell(&self, column: &str) -> String {
        match column {
            "title" => self.title.clone(),
            "department" => self.department.to_string(),
            "description" => self.description.clone().unwrap_or_default(),
            "created_by" => self.created_by.clone().unwrap_or_default(),
            "is_active" => self.is_active.to_string(),
            "file" => self.file.clone().unwrap_or_default(),
            "created" => self.created.format("%Y-%m-%d").to_string(),
            _ => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sop_creation() {
        let sop = Sop::new("Incoming inspection".to_string(), "test".to_string());

        assert!(sop.id.to_string().starts_with("SOP-"));
        assert!(sop.is_active);
        assert_eq!(sop.department, SopDepartment::Operations);
        assert_eq!(sop.status(), "active");
    }

    #[test]
    fn test_sop_roundtrip() {
        let mut sop = Sop::new("Incoming inspection".to_string(), "test".to_string());
        sop.department = SopDepartment::Qa;
        sop.file = Some("attachments/sops/2025/06/01/inspection.pdf".to_string());

        let yaml = serde_yml::to_string(&sop).unwrap();
        assert!(yaml.contains("department: QA"));

        let parsed: Sop = serde_yml::from_str(&yaml).unwrap();
        assert_eq!(sop.id, parsed.id);
        assert!(parsed.file.is_some());
    }

    #[test]
    fn test_creator_cleared_on_user_delete() {
        let mut sop = Sop::new("Inspection".to_string(), "test".to_string());
        sop.created_by = Some("ops@acme.test".to_string());
        assert_eq!(sop.clear_user("ops@acme.test"), 1);
        assert!(sop.created_by.is_none());
    }
}
