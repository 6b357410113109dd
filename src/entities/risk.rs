//! Risk record - identified risks within the QMS

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::{compute_score, Entity};
use crate::core::identity::EntityId;
use crate::core::refs::{RefPolicy, UserRef, UserRefs};
use crate::core::registry::Tabular;

/// An identified risk
///
/// `score` is never independently settable: it is recomputed from
/// `likelihood * impact` by the save hook on every write path, and cleared
/// when either factor is missing. Status is a free-form string; "open",
/// "mitigated" and "closed" are the conventional values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Risk {
    /// Unique identifier
    pub id: EntityId,

    /// Owning organisation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organisation: Option<EntityId>,

    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// User who identified the risk; that user cannot be deleted while
    /// this record exists
    pub identified_by: String,

    pub identified_date: NaiveDate,

    /// Scale 1 (Low) - 5 (High)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub likelihood: Option<u8>,

    /// Scale 1 (Low) - 5 (High)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact: Option<u8>,

    /// Derived: likelihood * impact at last save
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u16>,

    #[serde(default = "default_status")]
    pub status: String,

    /// Creation timestamp, immutable after set
    pub created: DateTime<Utc>,

    /// Refreshed on every save
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,

    pub author: String,
}

fn default_status() -> String {
    "open".to_string()
}

impl Entity for Risk {
    const PREFIX: &'static str = "RISK";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn status(&self) -> &str {
        &self.status
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

    fn before_save(&mut self) {
        self.score = compute_score(self.likelihood, self.impact);
    }
}

impl Risk {
    /// Create a new open risk
    pub fn new(title: String, identified_by: String, author: String) -> Self {
        Self {
            id: EntityId::new(crate::core::EntityPrefix::Risk),
            organisation: None,
            title,
            description: None,
            identified_by,
            identified_date: chrono::Local::now().date_naive(),
            likelihood: None,
            impact: None,
            score: None,
            status: default_status(),
            created: Utc::now(),
            updated: None,
            author,
        }
    }

    /// Check if the stored score disagrees with the computed one
    /// (possible after hand edits outside the save hook)
    pub fn is_score_stale(&self) -> bool {
        self.score != compute_score(self.likelihood, self.impact)
    }
}

impl UserRefs for Risk {
    fn user_refs(&self) -> Vec<UserRef> {
        vec![UserRef::protect("identified_by", &self.identified_by)]
    }

    fn clear_user(&mut self, _email: &str) -> usize {
        // identified_by is protected; nothing to clear
        0
    }
}

impl Tabular for Risk {
    fn cell(&self, column: &str) -> String {
        match column {
            "title" => self.title.clone(),
            "description" => self.description.clone().unwrap_or_default(),
            "identified_by" => self.identified_by.clone(),
            "identified_date" => self.identified_date.to_string(),
            "likelihood" => self.likelihood.map_or("-".to_string(), |v| v.to_string()),
            "impact" => self.impact.map_or("-".to_string(), |v| v.to_string()),
            "score" => self.score.map_or("-".to_string(), |v| v.to_string()),
            "status" => self.status.clone(),
            "organisation" => self
                .organisation
                .as_ref()
                .map(|o| o.to_string())
                .unwrap_or_default(),
            "created" => self.created.format("%Y-%m-%d").to_string(),
            _ => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_risk() -> Risk {
        Risk::new(
            "Supplier delivery failure".to_string(),
            "qa@acme.test".to_string(),
            "test".to_string(),
        )
    }

    #[test]
    fn test_risk_creation() {
        let risk = test_risk();

        assert!(risk.id.to_string().starts_with("RISK-"));
        assert_eq!(risk.title, "Supplier delivery failure");
        assert_eq!(risk.status, "open");
        assert!(risk.score.is_none());
    }

    #[test]
    fn test_score_computed_on_save() {
        let mut risk = test_risk();
        risk.likelihood = Some(4);
        risk.impact = Some(3);

        risk.before_save();
        assert_eq!(risk.score, Some(12));
    }

    #[test]
    fn test_score_recompute_is_idempotent() {
        let mut risk = test_risk();
        risk.likelihood = Some(4);
        risk.impact = Some(3);

        risk.before_save();
        let first = risk.score;
        risk.before_save();
        assert_eq!(risk.score, first);
    }

    #[test]
    fn test_score_unset_when_factor_missing() {
        let mut risk = test_risk();
        risk.likelihood = Some(4);

        risk.before_save();
        assert_eq!(risk.score, None);

        risk.likelihood = None;
        risk.impact = Some(3);
        risk.before_save();
        assert_eq!(risk.score, None);
    }

    #[test]
    fn test_score_cleared_when_factor_removed() {
        let mut risk = test_risk();
        risk.likelihood = Some(4);
        risk.impact = Some(3);
        risk.before_save();
        assert_eq!(risk.score, Some(12));

        risk.impact = None;
        risk.before_save();
        assert_eq!(risk.score, None);
    }

    #[test]
    fn test_out_of_range_factors_accepted() {
        // No validation rejects factors outside 1-5
        let mut risk = test_risk();
        risk.likelihood = Some(9);
        risk.impact = Some(9);
        risk.before_save();
        assert_eq!(risk.score, Some(81));
    }

    #[test]
    fn test_is_score_stale() {
        let mut risk = test_risk();
        risk.likelihood = Some(4);
        risk.impact = Some(3);
        risk.score = Some(5); // hand-edited

        assert!(risk.is_score_stale());

        risk.before_save();
        assert!(!risk.is_score_stale());
    }

    #[test]
    fn test_risk_roundtrip() {
        let mut risk = test_risk();
        risk.likelihood = Some(2);
        risk.impact = Some(5);
        risk.before_save();

        let yaml = serde_yml::to_string(&risk).unwrap();
        let parsed: Risk = serde_yml::from_str(&yaml).unwrap();

        assert_eq!(risk.id, parsed.id);
        assert_eq!(parsed.likelihood, Some(2));
        assert_eq!(parsed.score, Some(10));
        assert_eq!(parsed.status, "open");
    }

    #[test]
    fn test_identified_by_is_protected() {
        let risk = test_risk();
        let refs = risk.user_refs();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].field, "identified_by");
        assert_eq!(refs[0].policy, RefPolicy::Protect);

        // clear_user never touches a protected attribution
        let mut risk = risk;
        assert_eq!(risk.clear_user("qa@acme.test"), 0);
        assert_eq!(risk.identified_by, "qa@acme.test");
    }
}
