//! Resource plan record - resources provided by management

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::EntityId;
use crate::core::lifecycle::StatusCycle;
use crate::core::refs::{clear_if_matches, push_ref, RefPolicy, UserRef, UserRefs};
use crate::core::registry::Tabular;

/// Resource classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[derive(Default)]
pub enum ResourceType {
    #[default]
    #[serde(rename = "people")]
    People,
    #[serde(rename = "equipment")]
    Equipment,
    #[serde(rename = "IT")]
    It,
    #[serde(rename = "facility")]
    Facility,
    #[serde(rename = "other")]
    Other,
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceType::People => write!(f, "people"),
            ResourceType::Equipment => write!(f, "equipment"),
            ResourceType::It => write!(f, "IT"),
            ResourceType::Facility => write!(f, "facility"),
            ResourceType::Other => write!(f, "other"),
        }
    }
}

/// Resource plan status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum ResourceStatus {
    #[default]
    Planned,
    Provided,
    Reviewed,
}

impl std::fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceStatus::Planned => write!(f, "planned"),
            ResourceStatus::Provided => write!(f, "provided"),
            ResourceStatus::Reviewed => write!(f, "reviewed"),
        }
    }
}

impl StatusCycle for ResourceStatus {
    fn all() -> &'static [Self] {
        &[
            ResourceStatus::Planned,
            ResourceStatus::Provided,
            ResourceStatus::Reviewed,
        ]
    }

    fn forward(&self) -> &'static [Self] {
        match self {
            ResourceStatus::Planned => &[ResourceStatus::Provided],
            ResourceStatus::Provided => &[ResourceStatus::Reviewed],
            ResourceStatus::Reviewed => &[],
        }
    }
}

/// A resource plan (people, equipment, IT, facilities)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourcePlan {
    /// Unique identifier
    pub id: EntityId,

    /// Owning organisation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organisation: Option<EntityId>,

    pub title: String,

    #[serde(default)]
    pub resource_type: ResourceType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Cleared when that user is deleted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsible: Option<String>,

    pub planned_date: NaiveDate,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_date: Option<NaiveDate>,

    #[serde(default)]
    pub status: ResourceStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Project-relative attachment path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_reference: Option<String>,

    /// Creation timestamp, immutable after set
    pub created: DateTime<Utc>,

    /// Refreshed on every save
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,

    pub author: String,
}

impl Entity for ResourcePlan {
    const PREFIX: &'static str = "RES";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn status(&self) -> &str {
        match self.status {
            ResourceStatus::Planned => "planned",
            ResourceStatus::Provided => "provided",
            ResourceStatus::Reviewed => "reviewed",
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

impl ResourcePlan {
    pub fn new(title: String, resource_type: ResourceType, author: String) -> Self {
        Self {
            id: EntityId::new(crate::core::EntityPrefix::Res),
            organisation: None,
            title,
            resource_type,
            description: None,
            responsible: None,
            planned_date: chrono::Local::now().date_naive(),
            review_date: None,
            status: ResourceStatus::default(),
            notes: None,
            document_reference: None,
            created: Utc::now(),
            updated: None,
            author,
        }
    }
}

impl UserRefs for ResourcePlan {
    fn user_refs(&self) -> Vec<UserRef> {
        let mut refs = Vec::new();
        push_ref(&mut refs, "responsible", &self.responsible, RefPolicy::SetNull);
        refs
    }

    fn clear_user(&mut self, email: &str) -> usize {
        clear_if_matches(&mut self.responsible, email)
    }
}

impl Tabular for ResourcePlan {
    fn cell(&self, column: &str) -> String {
        match column {
            "title" => self.title.clone(),
            "resource_type" => self.resource_type.to_string(),
            "description" => self.description.clone().unwrap_or_default(),
            "responsible" => self.responsible.clone().unwrap_or_default(),
            "planned_date" => self.planned_date.to_string(),
            "status" => self.status.to_string(),
            "created" => self.created.format("%Y-%m-%d").to_string(),
            _ => String::new(),
        }
    }
}
