//! Service report record - delivery of services per requirements

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::EntityId;
use crate::core::refs::{clear_if_matches, push_ref, RefPolicy, UserRef, UserRefs};
use crate::core::registry::Tabular;

/// A service delivery report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceReport {
    /// Unique identifier
    pub id: EntityId,

    /// Owning organisation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organisation: Option<EntityId>,

    pub title: String,

    /// Cleared when that user is deleted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_provider: Option<String>,

    pub service_date: NaiveDate,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default = "default_true")]
    pub compliance_with_requirements: bool,

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

fn default_true() -> bool {
    true
}

impl Entity for ServiceReport {
    const PREFIX: &'static str = "SVC";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn status(&self) -> &str {
        if self.compliance_with_requirements {
            "compliant"
        } else {
            "noncompliant"
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

impl ServiceReport {
    pub fn new(title: String, author: String) -> Self {
        Self {
            id: EntityId::new(crate::core::EntityPrefix::Svc),
            organisation: None,
            title,
            service_provider: None,
            service_date: chrono::Local::now().date_naive(),
            description: None,
            compliance_with_requirements: true,
            document_reference: None,
            notes: None,
            created: Utc::now(),
            updated: None,
            author,
        }
    }
}

impl UserRefs for ServiceReport {
    fn user_refs(&self) -> Vec<UserRef> {
        let mut refs = Vec::new();
        push_ref(
            &mut refs,
            "service_provider",
            &self.service_provider,
            RefPolicy::SetNull,
        );
        refs
    }

    fn clear_user(&mut self, email: &str) -> usize {
        clear_if_matches(&mut self.service_provider, email)
    }
}

impl Tabular for ServiceReport {
    fn cell(&self, column: &str) -> String {
        match column {
            "title" => self.title.clone(),
            "service_provider" => self.service_provider.clone().unwrap_or_default(),
            "service_date" => self.service_date.to_string(),
            "description" => self.description.clone().unwrap_or_default(),
            "compliance_with_requirements" => self.compliance_with_requirements.to_string(),
            "created" => self.created.format("%Y-%m-%d").to_string(),
            _ => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_report_creation() {
        let svc = ServiceReport::new("Quarterly maintenance".to_string(), "test".to_string());

        assert!(svc.id.to_string().starts_with("SVC-"));
        assert!(svc.compliance_with_requirements);
        assert_eq!(svc.status(), "compliant");
    }

    #[test]
    fn test_service_report_roundtrip() {
        let mut svc = ServiceReport::new("Quarterly maintenance".to_string(), "test".to_string());
        svc.compliance_with_requirements = false;

        let yaml = serde_yml::to_string(&svc).unwrap();
        let parsed: ServiceReport = serde_yml::from_str(&yaml).unwrap();

        assert_eq!(svc.id, parsed.id);
        assert!(!parsed.compliance_with_requirements);
        assert_eq!(parsed.status(), "noncompliant");
    }

    #[test]
    fn test_provider_cleared_on_user_delete() {
        let mut svc = ServiceReport::new("Maintenance".to_string(), "test".to_string());
        svc.service_provider = Some("field@acme.test".to_string());
        assert_eq!(svc.clear_user("field@acme.test"), 1);
        assert!(svc.service_provider.is_none());
    }
}
