//! Opportunity record - identified opportunities within the QMS

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::{compute_score, Entity};
use crate::core::identity::EntityId;
use crate::core::refs::{RefPolicy, UserRef, UserRefs};
use crate::core::registry::Tabular;

/// An identified opportunity
///
/// The mirror of [`crate::entities::risk::Risk`]: `score` is derived from
/// `benefit * feasibility` by the save hook on every write path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Opportunity {
    /// Unique identifier
    pub id: EntityId,

    /// Owning organisation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organisation: Option<EntityId>,

    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// User who identified the opportunity; deletion-protected
    pub identified_by: String,

    pub identified_date: NaiveDate,

    /// Scale 1 (Low) - 5 (High)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub benefit: Option<u8>,

    /// Scale 1 (Low) - 5 (High)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feasibility: Option<u8>,

    /// Derived: benefit * feasibility at last save
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

impl Entity for Opportunity {
    const PREFIX: &'static str = "OPP";

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
        self.score = compute_score(self.benefit, self.feasibility);
    }
}

impl Opportunity {
    /// Create a new open opportunity
    pub fn new(title: String, identified_by: String, author: String) -> Self {
        Self {
            id: EntityId::new(crate::core::EntityPrefix::Opp),
            organisation: None,
            title,
            description: None,
            identified_by,
            identified_date: chrono::Local::now().date_naive(),
            benefit: None,
            feasibility: None,
            score: None,
            status: default_status(),
            created: Utc::now(),
            updated: None,
            author,
        }
    }

    /// Check if the stored score disagrees with the computed one
    pub fn is_score_stale(&self) -> bool {
        self.score != compute_score(self.benefit, self.feasibility)
    }
}

impl UserRefs for Opportunity {
    fn user_refs(&self) -> Vec<UserRef> {
        vec![UserRef::protect("identified_by", &self.identified_by)]
    }

    fn clear_user(&mut self, _email: &str) -> usize {
        0
    }
}

impl Tabular for Opportunity {
    fn cell(&self, column: &str) -> String {
        match column {
            "title" => self.title.clone(),
            "description" => self.description.clone().unwrap_or_default(),
            "identified_by" => self.identified_by.clone(),
            "identified_date" => self.identified_date.to_string(),
            "benefit" => self.benefit.map_or("-".to_string(), |v| v.to_string()),
            "feasibility" => self.feasibility.map_or("-".to_string(), |v| v.to_string()),
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

    fn test_opportunity() -> Opportunity {
        Opportunity::new(
            "Automate inspection reports".to_string(),
            "qa@acme.test".to_string(),
            "test".to_string(),
        )
    }

    #[test]
    fn test_opportunity_creation() {
        let opp = test_opportunity();

        assert!(opp.id.to_string().starts_with("OPP-"));
        assert_eq!(opp.status, "open");
        assert!(opp.score.is_none());
    }

    #[test]
    fn test_score_computed_from_benefit_and_feasibility() {
        let mut opp = test_opportunity();
        opp.benefit = Some(5);
        opp.feasibility = Some(4);

        opp.before_save();
        assert_eq!(opp.score, Some(20));

        // Idempotent on repeated saves with unchanged factors
        opp.before_save();
        assert_eq!(opp.score, Some(20));
    }

    #[test]
    fn test_score_unset_with_single_factor() {
        let mut opp = test_opportunity();
        opp.benefit = Some(5);

        opp.before_save();
        assert_eq!(opp.score, None);
    }

    #[test]
    fn test_opportunity_roundtrip() {
        let mut opp = test_opportunity();
        opp.benefit = Some(3);
        opp.feasibility = Some(3);
        opp.before_save();

        let yaml = serde_yml::to_string(&opp).unwrap();
        let parsed: Opportunity = serde_yml::from_str(&yaml).unwrap();

        assert_eq!(opp.id, parsed.id);
        assert_eq!(parsed.score, Some(9));
    }

    #[test]
    fn test_identified_by_is_protected() {
        let opp = test_opportunity();
        assert_eq!(opp.user_refs()[0].policy, RefPolicy::Protect);
    }
}
