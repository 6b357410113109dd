//! Contract review record - review of customer contracts and requirements

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::EntityId;
use crate::core::refs::{clear_if_matches, push_ref, RefPolicy, UserRef, UserRefs};
use crate::core::registry::Tabular;

/// Reviewing department
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[derive(Default)]
pub enum ContractDepartment {
    #[default]
    #[serde(rename = "sales")]
    Sales,
    #[serde(rename = "QA")]
    Qa,
}

impl std::fmt::Display for ContractDepartment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContractDepartment::Sales => write!(f, "sales"),
            ContractDepartment::Qa => write!(f, "QA"),
        }
    }
}

/// A customer contract review
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractReview {
    /// Unique identifier
    pub id: EntityId,

    /// Owning organisation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organisation: Option<EntityId>,

    pub customer_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_number: Option<String>,

    #[serde(default)]
    pub department: ContractDepartment,

    /// Cleared when that user is deleted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<String>,

    pub review_date: NaiveDate,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub findings: Option<String>,

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

impl Entity for ContractReview {
    const PREFIX: &'static str = "CTR";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.customer_name
    }

    fn status(&self) -> &str {
        "recorded"
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

impl ContractReview {
    pub fn new(customer_name: String, author: String) -> Self {
        Self {
            id: EntityId::new(crate::core::EntityPrefix::Ctr),
            organisation: None,
            customer_name,
            contract_number: None,
            department: ContractDepartment::default(),
            reviewed_by: None,
            review_date: chrono::Local::now().date_naive(),
            findings: None,
            document_reference: None,
            notes: None,
            created: Utc::now(),
            updated: None,
            author,
        }
    }
}

impl UserRefs for ContractReview {
    fn user_refs(&self) -> Vec<UserRef> {
        let mut refs = Vec::new();
        push_ref(&mut refs, "reviewed_by", &self.reviewed_by, RefPolicy::SetNull);
        refs
    }

    fn clear_user(&mut self, email: &str) -> usize {
        clear_if_matches(&mut self.reviewed_by, email)
    }
}

impl Tabular for ContractReview {
    fn cell(&self, column: &str) -> String {
        match column {
            "customer_name" => self.customer_name.clone(),
            "contract_number" => self.contract_number.clone().unwrap_or_default(),
            "department" => self.department.to_string(),
            "reviewed_by" => self.reviewed_by.clone().unwrap_or_default(),
            "review_date" => self.review_date.to_string(),
            "findings" => self.findings.clone().unwrap_or_default(),
            "created" => self.created.format("%Y-%m-%d").to_string(),
            _ => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_review_creation() {
        let ctr = ContractReview::new("Northwind Traders".to_string(), "test".to_string());

        assert!(ctr.id.to_string().starts_with("CTR-"));
        assert_eq!(ctr.department, ContractDepartment::Sales);
        assert!(ctr.contract_number.is_none());
    }

    #[test]
    fn test_contract_review_roundtrip() {
        let mut ctr = ContractReview::new("Northwind Traders".to_string(), "test".to_string());
        ctr.contract_number = Some("CN-2025-014".to_string());
        ctr.findings = Some("Delivery terms need clarification".to_string());

        let yaml = serde_yml::to_string(&ctr).unwrap();
        let parsed: ContractReview = serde_yml::from_str(&yaml).unwrap();

        assert_eq!(ctr.id, parsed.id);
        assert_eq!(parsed.contract_number.as_deref(), Some("CN-2025-014"));
    }

    #[test]
    fn test_reviewer_cleared_on_user_delete() {
        let mut ctr = ContractReview::new("Northwind".to_string(), "test".to_string());
        ctr.reviewed_by = Some("sales@acme.test".to_string());
        assert_eq!(ctr.clear_user("sales@acme.test"), 1);
        assert!(ctr.reviewed_by.is_none());
    }
}
