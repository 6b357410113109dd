//! Supplier evaluation record - evaluate and monitor suppliers/contractors

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::EntityId;
use crate::core::refs::{clear_if_matches, push_ref, RefPolicy, UserRef, UserRefs};
use crate::core::registry::Tabular;

/// A supplier/contractor evaluation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplierEvaluation {
    /// Unique identifier
    pub id: EntityId,

    /// Owning organisation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organisation: Option<EntityId>,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_person: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_info: Option<String>,

    pub evaluation_date: NaiveDate,

    /// Cleared when that user is deleted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluator: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation_result: Option<String>,

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

impl Entity for SupplierEvaluation {
    const PREFIX: &'static str = "SUP";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.name
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

impl SupplierEvaluation {
    pub fn new(name: String, author: String) -> Self {
        Self {
            id: EntityId::new(crate::core::EntityPrefix::Sup),
            organisation: None,
            name,
            supplier_type: None,
            contact_person: None,
            contact_info: None,
            evaluation_date: chrono::Local::now().date_naive(),
            evaluator: None,
            evaluation_result: None,
            document_reference: None,
            notes: None,
            created: Utc::now(),
            updated: None,
            author,
        }
    }
}

impl UserRefs for SupplierEvaluation {
    fn user_refs(&self) -> Vec<UserRef> {
        let mut refs = Vec::new();
        push_ref(&mut refs, "evaluator", &self.evaluator, RefPolicy::SetNull);
        refs
    }

    fn clear_user(&mut self, email: &str) -> usize {
        clear_if_matches(&mut self.evaluator, email)
    }
}

impl Tabular for SupplierEvaluation {
    fn cell(&self, column: &str) -> String {
        match column {
            "name" => self.name.clone(),
            "supplier_type" => self.supplier_type.clone().unwrap_or_default(),
            "contact_person" => self.contact_person.clone().unwrap_or_default(),
            "evaluation_date" => self.evaluation_date.to_string(),
            "evaluator" => self.evaluator.clone().unwrap_or_default(),
            "evaluation_result" => self.evaluation_result.clone().unwrap_or_default(),
            "created" => self.created.format("%Y-%m-%d").to_string(),
            _ => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supplier_evaluation_creation() {
        let sup = SupplierEvaluation::new("Apex Castings".to_string(), "test".to_string());

        assert!(sup.id.to_string().starts_with("SUP-"));
        assert_eq!(sup.name, "Apex Castings");
    }

    #[test]
    fn test_supplier_evaluation_roundtrip() {
        let mut sup = SupplierEvaluation::new("Apex Castings".to_string(), "test".to_string());
        sup.supplier_type = Some("foundry".to_string());
        sup.evaluation_result = Some("Approved with conditions".to_string());

        let yaml = serde_yml::to_string(&sup).unwrap();
        let parsed: SupplierEvaluation = serde_yml::from_str(&yaml).unwrap();

        assert_eq!(sup.id, parsed.id);
        assert_eq!(parsed.supplier_type.as_deref(), Some("foundry"));
    }

    #[test]
    fn test_evaluator_cleared_on_user_delete() {
        let mut sup = SupplierEvaluation::new("Apex".to_string(), "test".to_string());
        sup.evaluator = Some("qa@acme.test".to_string());
        assert_eq!(sup.clear_user("qa@acme.test"), 1);
        assert!(sup.evaluator.is_none());
    }
}
