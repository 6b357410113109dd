//! Product release record - verify and approve products/services before delivery

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::EntityId;
use crate::core::lifecycle::StatusCycle;
use crate::core::refs::{clear_if_matches, push_ref, RefPolicy, UserRef, UserRefs};
use crate::core::registry::Tabular;

/// Release status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum ReleaseStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl std::fmt::Display for ReleaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReleaseStatus::Pending => write!(f, "pending"),
            ReleaseStatus::Approved => write!(f, "approved"),
            ReleaseStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl StatusCycle for ReleaseStatus {
    fn all() -> &'static [Self] {
        &[
            ReleaseStatus::Pending,
            ReleaseStatus::Approved,
            ReleaseStatus::Rejected,
        ]
    }

    fn forward(&self) -> &'static [Self] {
        match self {
            ReleaseStatus::Pending => &[ReleaseStatus::Approved, ReleaseStatus::Rejected],
            ReleaseStatus::Approved => &[],
            ReleaseStatus::Rejected => &[],
        }
    }
}

/// A product/service release record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRelease {
    /// Unique identifier
    pub id: EntityId,

    /// Owning organisation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organisation: Option<EntityId>,

    pub product_name: String,

    pub release_date: NaiveDate,

    /// Cleared when that user is deleted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Project-relative attachment path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_reference: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(default)]
    pub status: ReleaseStatus,

    /// Creation timestamp, immutable after set
    pub created: DateTime<Utc>,

    /// Refreshed on every save
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,

    pub author: String,
}

impl Entity for ProductRelease {
    const PREFIX: &'static str = "REL";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.product_name
    }

    fn status(&self) -> &str {
        match self.status {
            ReleaseStatus::Pending => "pending",
            ReleaseStatus::Approved => "approved",
            ReleaseStatus::Rejected => "rejected",
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

impl ProductRelease {
    /// Create a new pending release
    pub fn new(product_name: String, author: String) -> Self {
        Self {
            id: EntityId::new(crate::core::EntityPrefix::Rel),
            organisation: None,
            product_name,
            release_date: chrono::Local::now().date_naive(),
            approved_by: None,
            description: None,
            document_reference: None,
            notes: None,
            status: ReleaseStatus::default(),
            created: Utc::now(),
            updated: None,
            author,
        }
    }
}

impl UserRefs for ProductRelease {
    fn user_refs(&self) -> Vec<UserRef> {
        let mut refs = Vec::new();
        push_ref(&mut refs, "approved_by", &self.approved_by, RefPolicy::SetNull);
        refs
    }

    fn clear_user(&mut self, email: &str) -> usize {
        clear_if_matches(&mut self.approved_by, email)
    }
}

impl Tabular for ProductRelease {
    fn cell(&self, column: &str) -> String {
        match column {
            "product_name" => self.product_name.clone(),
            "description" => self.description.clone().unwrap_or_default(),
            "release_date" => self.release_date.to_string(),
            "approved_by" => self.approved_by.clone().unwrap_or_default(),
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
    fn test_release_creation() {
        let rel = ProductRelease::new("Model X valve".to_string(), "test".to_string());

        assert!(rel.id.to_string().starts_with("REL-"));
        assert_eq!(rel.status, ReleaseStatus::Pending);
    }

    #[test]
    fn test_release_roundtrip() {
        let mut rel = ProductRelease::new("Model X valve".to_string(), "test".to_string());
        rel.status = ReleaseStatus::Approved;
        rel.approved_by = Some("qa@acme.test".to_string());

        let yaml = serde_yml::to_string(&rel).unwrap();
        assert!(yaml.contains("status: approved"));

        let parsed: ProductRelease = serde_yml::from_str(&yaml).unwrap();
        assert_eq!(rel.id, parsed.id);
        assert_eq!(parsed.status, ReleaseStatus::Approved);
    }

    #[test]
    fn test_terminal_states_have_no_forward_transitions() {
        assert!(ReleaseStatus::Approved.forward().is_empty());
        assert!(ReleaseStatus::Rejected.forward().is_empty());
    }

    #[test]
    fn test_approver_cleared_on_user_delete() {
        let mut rel = ProductRelease::new("Valve".to_string(), "test".to_string());
        rel.approved_by = Some("qa@acme.test".to_string());
        assert_eq!(rel.clear_user("qa@acme.test"), 1);
        assert!(rel.approved_by.is_none());
    }
}
