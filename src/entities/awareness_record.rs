//! Awareness record - communication of quality policy, objectives, and roles

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::EntityId;
use crate::core::refs::{clear_if_matches, push_ref, RefPolicy, UserRef, UserRefs};
use crate::core::registry::Tabular;

/// An awareness communication record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AwarenessRecord {
    /// Unique identifier
    pub id: EntityId,

    /// Owning organisation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organisation: Option<EntityId>,

    pub title: String,

    /// Who received the communication
    pub target_audience: String,

    /// e.g. "Meeting", "Email", "Poster", "Training"
    pub method: String,

    pub date: NaiveDate,

    /// Cleared when that user is deleted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub communicator: Option<String>,

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

impl Entity for AwarenessRecord {
    const PREFIX: &'static str = "AWR";

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

impl AwarenessRecord {
    pub fn new(title: String, target_audience: String, method: String, author: String) -> Self {
        Self {
            id: EntityId::new(crate::core::EntityPrefix::Awr),
            organisation: None,
            title,
            target_audience,
            method,
            date: chrono::Local::now().date_naive(),
            communicator: None,
            document_reference: None,
            notes: None,
            created: Utc::now(),
            updated: None,
            author,
        }
    }
}

impl UserRefs for AwarenessRecord {
    fn user_refs(&self) -> Vec<UserRef> {
        let mut refs = Vec::new();
        push_ref(&mut refs, "communicator", &self.communicator, RefPolicy::SetNull);
        refs
    }

    fn clear_user(&mut self, email: &str) -> usize {
        clear_if_matches(&mut self.communicator, email)
    }
}

impl Tabular for AwarenessRecord {
    fn cell(&self, column: &str) -> String {
        match column {
            "title" => self.title.clone(),
            "method" => self.method.clone(),
            "target_audience" => self.target_audience.clone(),
            "date" => self.date.to_string(),
            "communicator" => self.communicator.clone().unwrap_or_default(),
            "created" => self.created.format("%Y-%m-%d").to_string(),
            _ => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_awareness_record_creation() {
        let awr = AwarenessRecord::new(
            "Quality objectives briefing".to_string(),
            "All production staff".to_string(),
            "Meeting".to_string(),
            "test".to_string(),
        );

        assert!(awr.id.to_string().starts_with("AWR-"));
        assert_eq!(awr.method, "Meeting");
    }

    #[test]
    fn test_awareness_record_roundtrip() {
        let awr = AwarenessRecord::new(
            "Quality objectives briefing".to_string(),
            "All production staff".to_string(),
            "Meeting".to_string(),
            "test".to_string(),
        );

        let yaml = serde_yml::to_string(&awr).unwrap();
        let parsed: AwarenessRecord = serde_yml::from_str(&yaml).unwrap();

        assert_eq!(awr.id, parsed.id);
        assert_eq!(parsed.target_audience, "All production staff");
    }

    #[test]
    fn test_communicator_cleared_on_user_delete() {
        let mut awr = AwarenessRecord::new(
            "Briefing".to_string(),
            "Staff".to_string(),
            "Email".to_string(),
            "test".to_string(),
        );
        awr.communicator = Some("hr@acme.test".to_string());
        assert_eq!(awr.clear_user("hr@acme.test"), 1);
        assert!(awr.communicator.is_none());
    }
}
