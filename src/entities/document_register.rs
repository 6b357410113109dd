//! Document register record - controlled documents such as procedures and manuals

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::EntityId;
use crate::core::refs::{clear_if_matches, push_ref, RefPolicy, UserRef, UserRefs};
use crate::core::registry::Tabular;

/// A controlled document register entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRegister {
    /// Unique identifier
    pub id: EntityId,

    /// Owning organisation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organisation: Option<EntityId>,

    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_type: Option<String>,

    /// Cleared when that user is deleted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsible_person: Option<String>,

    pub issue_date: NaiveDate,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Project-relative attachment path of the controlled document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Creation timestamp, immutable after set
    pub created: DateTime<Utc>,

    /// Refreshed on every save
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,

    pub author: String,
}

impl Entity for DocumentRegister {
    const PREFIX: &'static str = "DOC";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn status(&self) -> &str {
        "registered"
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

impl DocumentRegister {
    pub fn new(title: String, author: String) -> Self {
        Self {
            id: EntityId::new(crate::core::EntityPrefix::Doc),
            organisation: None,
            title,
            document_type: None,
            responsible_person: None,
            issue_date: chrono::Local::now().date_naive(),
            revision_date: None,
            version: None,
            file: None,
            notes: None,
            created: Utc::now(),
            updated: None,
            author,
        }
    }
}

impl UserRefs for DocumentRegister {
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

impl Tabular for DocumentRegister {
    fn cell(&self, column: &str) -> String {
        match column {
            "title" => self.title.clone(),
            "document_type" => self.document_type.clone().unwrap_or_default(),
            "version" => self.version.clone().unwrap_or_default(),
            "responsible_person" => self.responsible_person.clone().unwrap_or_default(),
            "issue_date" => self.issue_date.to_string(),
            "created" => self.created.format("%Y-%m-%d").to_string(),
            _ => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_register_creation() {
        let doc = DocumentRegister::new("Quality Manual".to_string(), "test".to_string());

        assert!(doc.id.to_string().starts_with("DOC-"));
        assert!(doc.version.is_none());
    }

    #[test]
    fn test_document_register_roundtrip() {
        let mut doc = DocumentRegister::new("Quality Manual".to_string(), "test".to_string());
        doc.version = Some("3.1".to_string());
        doc.document_type = Some("manual".to_string());
        doc.file = Some("attachments/document_registers/2025/02/01/manual.pdf".to_string());

        let yaml = serde_yml::to_string(&doc).unwrap();
        let parsed: DocumentRegister = serde_yml::from_str(&yaml).unwrap();

        assert_eq!(doc.id, parsed.id);
        assert_eq!(parsed.version.as_deref(), Some("3.1"));
    }

    #[test]
    fn test_responsible_cleared_on_user_delete() {
        let mut doc = DocumentRegister::new("Manual".to_string(), "test".to_string());
        doc.responsible_person = Some("qa@acme.test".to_string());
        assert_eq!(doc.clear_user("qa@acme.test"), 1);
        assert!(doc.responsible_person.is_none());
    }
}
