//! Stakeholder record with its requirement line items

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::EntityId;
use crate::core::refs::{clear_if_matches, push_ref, RefPolicy, UserRef, UserRefs};
use crate::core::registry::Tabular;

/// Stakeholder classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum StakeholderCategory {
    #[default]
    Customer,
    Supplier,
    Regulator,
    Employee,
    Community,
    Other,
}

impl std::fmt::Display for StakeholderCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StakeholderCategory::Customer => write!(f, "customer"),
            StakeholderCategory::Supplier => write!(f, "supplier"),
            StakeholderCategory::Regulator => write!(f, "regulator"),
            StakeholderCategory::Employee => write!(f, "employee"),
            StakeholderCategory::Community => write!(f, "community"),
            StakeholderCategory::Other => write!(f, "other"),
        }
    }
}

/// A requirement or expectation the stakeholder places on the QMS
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StakeholderRequirement {
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirement_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// An interested party relevant to the QMS
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stakeholder {
    /// Unique identifier
    pub id: EntityId,

    /// Owning organisation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organisation: Option<EntityId>,

    pub name: String,

    #[serde(default)]
    pub category: StakeholderCategory,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_person: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_info: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevance_to_qms: Option<String>,

    /// Cleared when that user is deleted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requirements: Vec<StakeholderRequirement>,

    /// Creation timestamp, immutable after set
    pub created: DateTime<Utc>,

    /// Refreshed on every save
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,

    pub author: String,
}

impl Entity for Stakeholder {
    const PREFIX: &'static str = "STK";

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

impl Stakeholder {
    pub fn new(name: String, category: StakeholderCategory, author: String) -> Self {
        Self {
            id: EntityId::new(crate::core::EntityPrefix::Stk),
            organisation: None,
            name,
            category,
            contact_person: None,
            contact_info: None,
            relevance_to_qms: None,
            created_by: None,
            requirements: Vec::new(),
            created: Utc::now(),
            updated: None,
            author,
        }
    }
}

impl UserRefs for Stakeholder {
    fn user_refs(&self) -> Vec<UserRef> {
        let mut refs = Vec::new();
        push_ref(&mut refs, "created_by", &self.created_by, RefPolicy::SetNull);
        refs
    }

    fn clear_user(&mut self, email: &str) -> usize {
        clear_if_matches(&mut self.created_by, email)
    }
}

impl Tabular for Stakeholder {
    fn cell(&self, column: &str) -> String {
        match column {
            "name" => self.name.clone(),
            "category" => self.category.to_string(),
            "contact_person" => self.contact_person.clone().unwrap_or_default(),
            "contact_info" => self.contact_info.clone().unwrap_or_default(),
            "relevance_to_qms" => self.relevance_to_qms.clone().unwrap_or_default(),
            "created_by" => self.created_by.clone().unwrap_or_default(),
            "created" => self.created.format("%Y-%m-%d").to_string(),
            _ => String::new(),
        }
    }
}
