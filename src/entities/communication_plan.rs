//! Communication plan record - internal/external communication channels

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::EntityId;
use crate::core::refs::{clear_if_matches, push_ref, RefPolicy, UserRef, UserRefs};
use crate::core::registry::Tabular;

/// A communication plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunicationPlan {
    /// Unique identifier
    pub id: EntityId,

    /// Owning organisation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organisation: Option<EntityId>,

    pub title: String,

    /// Target audience
    pub audience: String,

    pub method: String,

    /// Cleared when that user is deleted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsible_person: Option<String>,

    /// e.g. "Weekly", "Monthly"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,

    pub start_date: NaiveDate,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_date: Option<NaiveDate>,

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

impl Entity for CommunicationPlan {
    const PREFIX: &'static str = "COM";

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

impl CommunicationPlan {
    pub fn new(title: String, audience: String, method: String, author: String) -> Self {
        Self {
            id: EntityId::new(crate::core::EntityPrefix::Com),
            organisation: None,
            title,
            audience,
            method,
            responsible_person: None,
            frequency: None,
            start_date: chrono::Local::now().date_naive(),
            review_date: None,
            document_reference: None,
            notes: None,
            created: Utc::now(),
            updated: None,
            author,
        }
    }
}

impl UserRefs for CommunicationPlan {
    fn user_refs(&self) -> Vec<UserRef> {
        let mut refs = Vec::new();
        push_ref(
            &mut refs,
            "responsible_person",
            &self.responsible_person,
            RefPolicy::SetNull,
        );
        refs
    }

    fn clear_user(&mut self, email: &str) -> usize {
        clear_if_matches(&mut self.responsible_person, email)
    }
}

impl Tabular for CommunicationPlan {
    fn cell(&self, column: &str) -> String {
        match column {
            "title" => self.title.clone(),
            "audience" => self.audience.clone(),
            "method" => self.method.clone(),
            "responsible_person" => self.responsible_person.clone().unwrap_or_default(),
            "start_date" => self.start_date.to_string(),
            "frequency" => self.frequency.clone().unwrap_or_default(),
            "created" => self.created.format("%Y-%m-%d").to_string(),
            _ => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_communication_plan_creation() {
        let com = CommunicationPlan::new(
            "Monthly quality bulletin".to_string(),
            "All staff".to_string(),
            "Email".to_string(),
            "test".to_string(),
        );

        assert!(com.id.to_string().starts_with("COM-"));
        assert!(com.frequency.is_none());
    }

    #[test]
    fn test_communication_plan_roundtrip() {
        let mut com = CommunicationPlan::new(
            "Monthly quality bulletin".to_string(),
            "All staff".to_string(),
            "Email".to_string(),
            "test".to_string(),
        );
        com.frequency = Some("Monthly".to_string());

        let yaml = serde_yml::to_string(&com).unwrap();
        let parsed: CommunicationPlan = serde_yml::from_str(&yaml).unwrap();

        assert_eq!(com.id, parsed.id);
        assert_eq!(parsed.frequency.as_deref(), Some("Monthly"));
    }

    #[test]
    fn test_responsible_cleared_on_user_delete() {
        let mut com = CommunicationPlan::new(
            "Bulletin".to_string(),
            "Staff".to_string(),
            "Email".to_string(),
            "test".to_string(),
        );
        com.responsible_person = Some("comms@acme.test".to_string());
        assert_eq!(com.clear_user("comms@acme.test"), 1);
        assert!(com.responsible_person.is_none());
    }
}
