//! Quality policy record and its communication/evidence line items

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::EntityId;
use crate::core::refs::{clear_if_matches, push_ref, RefPolicy, UserRef, UserRefs};
use crate::core::registry::Tabular;

/// How the policy was communicated or displayed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyCommunication {
    /// e.g. "Email", "Training", "Notice Board", "Intranet"
    pub method: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audience: Option<String>,

    pub date: NaiveDate,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Project-relative attachment path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence_file: Option<String>,
}

/// Evidence that the policy is communicated and displayed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyEvidence {
    /// e.g. "Photo of policy on notice board"
    pub description: String,

    /// Project-relative attachment path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Cleared when that user is deleted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_by: Option<String>,

    pub submitted_at: DateTime<Utc>,
}

/// The organisation's quality policy and its lifecycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityPolicy {
    /// Unique identifier
    pub id: EntityId,

    /// Owning organisation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organisation: Option<EntityId>,

    #[serde(default = "default_title")]
    pub title: String,

    /// The actual text of the quality policy
    pub content: String,

    /// Developing user email; deletion-protected
    pub developed_by: String,

    /// Approving user email; deletion-protected when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval_date: Option<NaiveDate>,

    pub effective_date: NaiveDate,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_date: Option<NaiveDate>,

    #[serde(default = "default_true")]
    pub is_active: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub communications: Vec<PolicyCommunication>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub evidences: Vec<PolicyEvidence>,

    /// Creation timestamp, immutable after set
    pub created: DateTime<Utc>,

    /// Refreshed on every save
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,

    pub author: String,
}

fn default_title() -> String {
    "Quality Policy".to_string()
}

fn default_true() -> bool {
    true
}

impl Entity for QualityPolicy {
    const PREFIX: &'static str = "QPOL";

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

impl QualityPolicy {
    /// Create a new active policy
    pub fn new(content: String, developed_by: String, author: String) -> Self {
        Self {
            id: EntityId::new(crate::core::EntityPrefix::Qpol),
            organisation: None,
            title: default_title(),
            content,
            developed_by,
            approved_by: None,
            approval_date: None,
            effective_date: chrono::Local::now().date_naive(),
            review_date: None,
            is_active: true,
            communications: Vec::new(),
            evidences: Vec::new(),
            created: Utc::now(),
            updated: None,
            author,
        }
    }
}

impl UserRefs for QualityPolicy {
    fn user_refs(&self) -> Vec<UserRef> {
        let mut refs = vec![UserRef::protect("developed_by", &self.developed_by)];
        push_ref(&mut refs, "approved_by", &self.approved_by, RefPolicy::Protect);
        for ev in &self.evidences {
            push_ref(
                &mut refs,
                "evidences.submitted_by",
                &ev.submitted_by,
                RefPolicy::SetNull,
            );
        }
        refs
    }

    fn clear_user(&mut self, email: &str) -> usize {
        let mut cleared = 0;
        for ev in &mut self.evidences {
            cleared += clear_if_matches(&mut ev.submitted_by, email);
        }
        cleared
    }
}

impl Tabular for QualityPolicy {
    fn cell(&self, column: &str) -> String {
        match column {
            "title" => self.title.clone(),
            "content" => self.content.clone(),
            "developed_by" => self.developed_by.clone(),
            "approved_by" => self.approved_by.clone().unwrap_or_default(),
            "effective_date" => self.effective_date.to_string(),
            "is_active" => self.is_active.to_string(),
            "created" => self.created.format("%Y-%m-%d").to_string(),
            _ => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_policy() -> QualityPolicy {
        QualityPolicy::new(
            "We are committed to meeting customer requirements.".to_string(),
            "qa@acme.test".to_string(),
            "test".to_string(),
        )
    }

    #[test]
    fn test_policy_creation() {
        let p = test_policy();

        assert!(p.id.to_string().starts_with("QPOL-"));
        assert_eq!(p.title, "Quality Policy");
        assert!(p.is_active);
        assert!(p.approved_by.is_none());
    }

    #[test]
    fn test_developer_protected_approver_protected_when_set() {
        let mut p = test_policy();
        assert_eq!(p.user_refs().len(), 1);

        p.approved_by = Some("ceo@acme.test".to_string());
        let refs = p.user_refs();
        assert_eq!(refs.len(), 2);
        assert!(refs.iter().all(|r| r.policy == RefPolicy::Protect));
    }

    #[test]
    fn test_evidence_submitter_cleared() {
        let mut p = test_policy();
        p.evidences.push(PolicyEvidence {
            description: "Photo of notice board".to_string(),
            file: None,
            submitted_by: Some("staff@acme.test".to_string()),
            submitted_at: Utc::now(),
        });

        assert_eq!(p.clear_user("staff@acme.test"), 1);
        assert!(p.evidences[0].submitted_by.is_none());
        // The evidence row itself survives
        assert_eq!(p.evidences.len(), 1);
    }

    #[test]
    fn test_policy_roundtrip() {
        let mut p = test_policy();
        p.communications.push(PolicyCommunication {
            method: "Intranet".to_string(),
            audience: Some("All staff".to_string()),
            date: chrono::Local::now().date_naive(),
            notes: None,
            evidence_file: None,
        });

        let yaml = serde_yml::to_string(&p).unwrap();
        let parsed: QualityPolicy = serde_yml::from_str(&yaml).unwrap();

        assert_eq!(p.id, parsed.id);
        assert_eq!(parsed.communications.len(), 1);
        assert_eq!(parsed.communications[0].method, "Intranet");
    }
}
