//! Training record - training needs, completion, and effectiveness assessment

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::EntityId;
use crate::core::refs::{clear_if_matches, push_ref, RefPolicy, UserRef, UserRefs};
use crate::core::registry::Tabular;

/// A training record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingRecord {
    /// Unique identifier
    pub id: EntityId,

    /// Owning organisation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organisation: Option<EntityId>,

    pub title: String,

    /// Trained user email; cleared when that user is deleted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub training_type: Option<String>,

    pub date_conducted: NaiveDate,

    /// Assessment of training effectiveness
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effectiveness: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trainer: Option<String>,

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

impl Entity for TrainingRecord {
    const PREFIX: &'static str = "TRN";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
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

impl TrainingRecord {
    pub fn new(title: String, author: String) -> Self {
        Self {
            id: EntityId::new(crate::core::EntityPrefix::Trn),
            organisation: None,
            title,
            employee: None,
            training_type: None,
            date_conducted: chrono::Local::now().date_naive(),
            effectiveness: None,
            trainer: None,
            document_reference: None,
            notes: None,
            created: Utc::now(),
            updated: None,
            author,
        }
    }
}

impl UserRefs for TrainingRecord {
    fn user_refs(&self) -> Vec<UserRef> {
        let mut refs = Vec::new();
        push_ref(&mut refs, "employee", &self.employee, RefPolicy::SetNull);
        push_ref(&mut refs, "trainer", &self.trainer, RefPolicy::SetNull);
        refs
    }

    fn clear_user(&mut self, email: &str) -> usize {
        clear_if_matches(&mut self.employee, email) + clear_if_matches(&mut self.trainer, email)
    }
}

impl Tabular for TrainingRecord {
    fn cell(&self, column: &str) -> String {
        match column {
            "title" => self.title.clone(),
            "employee" => self.employee.clone().unwrap_or_default(),
            "training_type" => self.training_type.clone().unwrap_or_default(),
            "date_conducted" => self.date_conducted.to_string(),
            "trainer" => self.trainer.clone().unwrap_or_default(),
            "created" => self.created.format("%Y-%m-%d").to_string(),
            _ => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_training_record_creation() {
        let trn = TrainingRecord::new("ISO 9001 awareness".to_string(), "test".to_string());

        assert!(trn.id.to_string().starts_with("TRN-"));
        assert!(trn.employee.is_none());
    }

    #[test]
    fn test_training_record_roundtrip() {
        let mut trn = TrainingRecord::new("ISO 9001 awareness".to_string(), "test".to_string());
        trn.employee = Some("staff@acme.test".to_string());
        trn.trainer = Some("External Institute".to_string());
        trn.effectiveness = Some("Passed post-training quiz".to_string());

        let yaml = serde_yml::to_string(&trn).unwrap();
        let parsed: TrainingRecord = serde_yml::from_str(&yaml).unwrap();

        assert_eq!(trn.id, parsed.id);
        assert_eq!(parsed.trainer.as_deref(), Some("External Institute"));
    }

    #[test]
    fn test_employee_cleared_on_user_delete() {
        let mut trn = TrainingRecord::new("Training".to_string(), "test".to_string());
        trn.employee = Some("staff@acme.test".to_string());
        assert_eq!(trn.clear_user("staff@acme.test"), 1);
        assert!(trn.employee.is_none());
        // The record itself survives the user deletion
        assert_eq!(trn.title, "Training");
    }
}
