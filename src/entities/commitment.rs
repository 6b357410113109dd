//! Leadership commitment record with its dependent line items
//!
//! A commitment carries six embedded collections (accountability
//! assignments, objectives, actions, reviews, communications, attachments)
//! edited together with the parent record.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::EntityId;
use crate::core::lifecycle::StatusCycle;
use crate::core::refs::{clear_if_matches, push_ref, RefPolicy, UserRef, UserRefs};
use crate::core::registry::Tabular;

/// Commitment classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum CommitmentType {
    Policy,
    #[default]
    Statement,
    Plan,
    Other,
}

impl std::fmt::Display for CommitmentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommitmentType::Policy => write!(f, "policy"),
            CommitmentType::Statement => write!(f, "statement"),
            CommitmentType::Plan => write!(f, "plan"),
            CommitmentType::Other => write!(f, "other"),
        }
    }
}

impl std::str::FromStr for CommitmentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "policy" => Ok(CommitmentType::Policy),
            "statement" => Ok(CommitmentType::Statement),
            "plan" => Ok(CommitmentType::Plan),
            "other" => Ok(CommitmentType::Other),
            _ => Err(format!("Unknown commitment type: {}", s)),
        }
    }
}

/// Action status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum ActionStatus {
    #[default]
    Open,
    InProgress,
    Done,
    Blocked,
}

impl std::fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionStatus::Open => write!(f, "open"),
            ActionStatus::InProgress => write!(f, "in_progress"),
            ActionStatus::Done => write!(f, "done"),
            ActionStatus::Blocked => write!(f, "blocked"),
        }
    }
}

impl StatusCycle for ActionStatus {
    fn all() -> &'static [Self] {
        &[
            ActionStatus::Open,
            ActionStatus::InProgress,
            ActionStatus::Done,
            ActionStatus::Blocked,
        ]
    }

    fn forward(&self) -> &'static [Self] {
        match self {
            ActionStatus::Open => &[ActionStatus::InProgress, ActionStatus::Done, ActionStatus::Blocked],
            ActionStatus::InProgress => &[ActionStatus::Done, ActionStatus::Blocked],
            ActionStatus::Blocked => &[ActionStatus::InProgress, ActionStatus::Done],
            ActionStatus::Done => &[],
        }
    }
}

/// Links a person to a specific accountability for the commitment
///
/// (commitment, user, role) triples are unique; duplicates are rejected by
/// [`Commitment::add_accountability`] and reported by validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountabilityAssignment {
    /// Accountable user email; deletion-protected
    pub user: String,

    /// Role or responsibility title, e.g. "QMS Sponsor", "Process Owner"
    #[serde(default)]
    pub role: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsibility_description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_date: Option<NaiveDate>,
}

/// A measurable objective derived from the commitment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitmentObjective {
    pub description: String,

    /// e.g. "Customer complaints per month"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    pub start_date: NaiveDate,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,

    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// A task created to implement the commitment or achieve its objectives
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitmentAction {
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Responsible user email; deletion-protected
    pub owner: String,

    #[serde(default)]
    pub status: ActionStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress_notes: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// A periodic review of the commitment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitmentReview {
    /// Reviewing user email; deletion-protected
    pub reviewer: String,

    pub review_date: NaiveDate,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub findings: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conclusions: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_review_date: Option<NaiveDate>,
}

/// How the commitment was communicated
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunicationRecord {
    /// e.g. "Townhall", "Email", "Training", "Poster"
    pub method: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audience: Option<String>,

    pub date: NaiveDate,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub materials: Option<String>,
}

/// An attached evidence file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitmentAttachment {
    /// Project-relative attachment path
    pub file: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Cleared when that user is deleted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_by: Option<String>,

    pub uploaded_at: DateTime<Utc>,
}

fn default_true() -> bool {
    true
}

/// A formal leadership commitment (policy or statement)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commitment {
    /// Unique identifier
    pub id: EntityId,

    /// Owning organisation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organisation: Option<EntityId>,

    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(default)]
    pub commitment_type: CommitmentType,

    /// Committing leader email; deletion-protected
    pub leader: String,

    pub effective_date: NaiveDate,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<NaiveDate>,

    /// Structured resource info (budget, staff, equipment, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<serde_json::Value>,

    #[serde(default = "default_true")]
    pub is_active: bool,

    /// URLs or internal refs to related documents
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_documents: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub accountabilities: Vec<AccountabilityAssignment>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub objectives: Vec<CommitmentObjective>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<CommitmentAction>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reviews: Vec<CommitmentReview>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub communications: Vec<CommunicationRecord>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<CommitmentAttachment>,

    /// Creation timestamp, immutable after set
    pub created: DateTime<Utc>,

    /// Refreshed on every save
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,

    pub author: String,
}

impl Entity for Commitment {
    const PREFIX: &'static str = "LEAD";

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

impl Commitment {
    /// Create a new active commitment
    pub fn new(title: String, leader: String, author: String) -> Self {
        Self {
            id: EntityId::new(crate::core::EntityPrefix::Lead),
            organisation: None,
            title,
            summary: None,
            commitment_type: CommitmentType::default(),
            leader,
            effective_date: chrono::Local::now().date_naive(),
            expiry_date: None,
            resources: None,
            is_active: true,
            related_documents: None,
            accountabilities: Vec::new(),
            objectives: Vec::new(),
            actions: Vec::new(),
            reviews: Vec::new(),
            communications: Vec::new(),
            attachments: Vec::new(),
            created: Utc::now(),
            updated: None,
            author,
        }
    }

    /// Add an accountability assignment, enforcing the (user, role) uniqueness
    pub fn add_accountability(
        &mut self,
        assignment: AccountabilityAssignment,
    ) -> Result<(), String> {
        if self.accountabilities.iter().any(|a| {
            a.user.eq_ignore_ascii_case(&assignment.user)
                && a.role.eq_ignore_ascii_case(&assignment.role)
        }) {
            return Err(format!(
                "accountability for user '{}' with role '{}' already exists on '{}'",
                assignment.user, assignment.role, self.title
            ));
        }
        self.accountabilities.push(assignment);
        Ok(())
    }

    /// Duplicate (user, role) pairs, for validation of hand-edited files
    pub fn duplicate_accountabilities(&self) -> Vec<(String, String)> {
        let mut seen: Vec<(String, String)> = Vec::new();
        let mut dups = Vec::new();
        for a in &self.accountabilities {
            let key = (a.user.to_lowercase(), a.role.to_lowercase());
            if seen.contains(&key) {
                if !dups.contains(&key) {
                    dups.push(key);
                }
            } else {
                seen.push(key);
            }
        }
        dups
    }
}

impl UserRefs for Commitment {
    fn user_refs(&self) -> Vec<UserRef> {
        let mut refs = vec![UserRef::protect("leader", &self.leader)];
        for a in &self.accountabilities {
            refs.push(UserRef::protect("accountabilities.user", &a.user));
        }
        for action in &self.actions {
            refs.push(UserRef::protect("actions.owner", &action.owner));
        }
        for review in &self.reviews {
            refs.push(UserRef::protect("reviews.reviewer", &review.reviewer));
        }
        for att in &self.attachments {
            push_ref(
                &mut refs,
                "attachments.uploaded_by",
                &att.uploaded_by,
                RefPolicy::SetNull,
            );
        }
        refs
    }

    fn clear_user(&mut self, email: &str) -> usize {
        let mut cleared = 0;
        for att in &mut self.attachments {
            cleared += clear_if_matches(&mut att.uploaded_by, email);
        }
        cleared
    }
}

impl Tabular for Commitment {
    fn cell(&self, column: &str) -> String {
        match column {
            "title" => self.title.clone(),
            "summary" => self.summary.clone().unwrap_or_default(),
            "commitment_type" => self.commitment_type.to_string(),
            "leader" => self.leader.clone(),
            "effective_date" => self.effective_date.to_string(),
            "expiry_date" => self.expiry_date.map_or("-".to_string(), |d| d.to_string()),
            "is_active" => self.is_active.to_string(),
            "created" => self.created.format("%Y-%m-%d").to_string(),
            _ => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_commitment() -> Commitment {
        Commitment::new(
            "Provide resources for the QMS".to_string(),
            "ceo@acme.test".to_string(),
            "test".to_string(),
        )
    }

    #[test]
    fn test_commitment_creation() {
        let c = test_commitment();

        assert!(c.id.to_string().starts_with("LEAD-"));
        assert_eq!(c.commitment_type, CommitmentType::Statement);
        assert!(c.is_active);
        assert_eq!(c.status(), "active");
    }

    #[test]
    fn test_accountability_uniqueness() {
        let mut c = test_commitment();

        c.add_accountability(AccountabilityAssignment {
            user: "qa@acme.test".to_string(),
            role: "QMS Sponsor".to_string(),
            responsibility_description: None,
            target_date: None,
        })
        .unwrap();

        // Same (user, role) pair is rejected
        let err = c.add_accountability(AccountabilityAssignment {
            user: "QA@ACME.TEST".to_string(),
            role: "qms sponsor".to_string(),
            responsibility_description: None,
            target_date: None,
        });
        assert!(err.is_err());

        // Same user under a different role is fine
        c.add_accountability(AccountabilityAssignment {
            user: "qa@acme.test".to_string(),
            role: "Process Owner".to_string(),
            responsibility_description: None,
            target_date: None,
        })
        .unwrap();

        assert_eq!(c.accountabilities.len(), 2);
    }

    #[test]
    fn test_duplicate_accountabilities_detected() {
        let mut c = test_commitment();
        // Simulate a hand-edited file bypassing add_accountability
        for _ in 0..2 {
            c.accountabilities.push(AccountabilityAssignment {
                user: "qa@acme.test".to_string(),
                role: "QMS Sponsor".to_string(),
                responsibility_description: None,
                target_date: None,
            });
        }

        let dups = c.duplicate_accountabilities();
        assert_eq!(dups.len(), 1);
        assert_eq!(dups[0].0, "qa@acme.test");
    }

    #[test]
    fn test_leader_and_line_items_protected() {
        let mut c = test_commitment();
        c.actions.push(CommitmentAction {
            title: "Publish the policy".to_string(),
            description: None,
            owner: "comms@acme.test".to_string(),
            status: ActionStatus::Open,
            progress_notes: None,
            due_date: None,
            completed_at: None,
        });
        c.attachments.push(CommitmentAttachment {
            file: "attachments/commitments/2025/01/01/minutes.pdf".to_string(),
            description: None,
            uploaded_by: Some("comms@acme.test".to_string()),
            uploaded_at: Utc::now(),
        });

        let refs = c.user_refs();
        assert!(refs
            .iter()
            .any(|r| r.field == "leader" && r.policy == RefPolicy::Protect));
        assert!(refs
            .iter()
            .any(|r| r.field == "actions.owner" && r.policy == RefPolicy::Protect));
        assert!(refs
            .iter()
            .any(|r| r.field == "attachments.uploaded_by" && r.policy == RefPolicy::SetNull));

        // Clearing only touches the attachment uploader
        assert_eq!(c.clear_user("comms@acme.test"), 1);
        assert_eq!(c.actions[0].owner, "comms@acme.test");
        assert!(c.attachments[0].uploaded_by.is_none());
    }

    #[test]
    fn test_action_status_forward_graph() {
        assert!(ActionStatus::Open.forward().contains(&ActionStatus::Done));
        assert!(ActionStatus::Done.forward().is_empty());
    }

    #[test]
    fn test_commitment_roundtrip() {
        let mut c = test_commitment();
        c.objectives.push(CommitmentObjective {
            description: "Reduce complaints".to_string(),
            metric: Some("Complaints per month".to_string()),
            baseline: Some("12".to_string()),
            target: Some("4".to_string()),
            unit: Some("count".to_string()),
            start_date: chrono::Local::now().date_naive(),
            end_date: None,
            is_active: true,
        });

        let yaml = serde_yml::to_string(&c).unwrap();
        let parsed: Commitment = serde_yml::from_str(&yaml).unwrap();

        assert_eq!(c.id, parsed.id);
        assert_eq!(parsed.objectives.len(), 1);
        assert_eq!(parsed.commitment_type, CommitmentType::Statement);
    }
}
