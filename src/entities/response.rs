//! Risk/opportunity response record - planned actions against risks and opportunities

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::EntityId;
use crate::core::refs::{RefPolicy, UserRef, UserRefs};
use crate::core::registry::Tabular;

/// Response strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum ResponseType {
    #[default]
    Mitigate,
    Accept,
    Transfer,
    Avoid,
    Exploit,
    Enhance,
    Share,
}

impl std::fmt::Display for ResponseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResponseType::Mitigate => write!(f, "mitigate"),
            ResponseType::Accept => write!(f, "accept"),
            ResponseType::Transfer => write!(f, "transfer"),
            ResponseType::Avoid => write!(f, "avoid"),
            ResponseType::Exploit => write!(f, "exploit"),
            ResponseType::Enhance => write!(f, "enhance"),
            ResponseType::Share => write!(f, "share"),
        }
    }
}

impl std::str::FromStr for ResponseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mitigate" => Ok(ResponseType::Mitigate),
            "accept" => Ok(ResponseType::Accept),
            "transfer" => Ok(ResponseType::Transfer),
            "avoid" => Ok(ResponseType::Avoid),
            "exploit" => Ok(ResponseType::Exploit),
            "enhance" => Ok(ResponseType::Enhance),
            "share" => Ok(ResponseType::Share),
            _ => Err(format!(
                "Invalid response type: {}. Use mitigate, accept, transfer, avoid, exploit, enhance, or share",
                s
            )),
        }
    }
}

/// A planned response to a risk or an opportunity
///
/// Carries two optional parent references. Neither-set and both-set are
/// accepted at save time (the inherited behaviour); `qmt validate` reports
/// them as findings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    /// Unique identifier
    pub id: EntityId,

    /// Parent risk, if this responds to a risk
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk: Option<EntityId>,

    /// Parent opportunity, if this responds to an opportunity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opportunity: Option<EntityId>,

    pub response_type: ResponseType,

    pub description: String,

    /// Responsible user; deletion-protected
    pub owner: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,

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

impl Entity for Response {
    const PREFIX: &'static str = "RESP";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.description
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

    fn touch(&mut self) {
        self.updated = Some(Utc::now());
    }
}

impl Response {
    /// Create a new open response
    pub fn new(response_type: ResponseType, description: String, owner: String, author: String) -> Self {
        Self {
            id: EntityId::new(crate::core::EntityPrefix::Resp),
            risk: None,
            opportunity: None,
            response_type,
            description,
            owner,
            due_date: None,
            status: default_status(),
            created: Utc::now(),
            updated: None,
            author,
        }
    }

    /// The intended referent: the parent risk or opportunity
    pub fn target(&self) -> Option<&EntityId> {
        self.risk.as_ref().or(self.opportunity.as_ref())
    }

    /// Whether the record has a well-formed parentage (exactly one parent)
    pub fn has_single_parent(&self) -> bool {
        self.risk.is_some() != self.opportunity.is_some()
    }
}

impl UserRefs for Response {
    fn user_refs(&self) -> Vec<UserRef> {
        vec![UserRef::protect("owner", &self.owner)]
    }

    fn clear_user(&mut self, _email: &str) -> usize {
        0
    }
}

impl Tabular for Response {
    fn cell(&self, column: &str) -> String {
        match column {
            "response_type" => self.response_type.to_string(),
            "description" => self.description.clone(),
            "owner" => self.owner.clone(),
            "status" => self.status.clone(),
            "due_date" => self.due_date.map_or("-".to_string(), |d| d.to_string()),
            "risk" => self.risk.as_ref().map(|r| r.to_string()).unwrap_or_default(),
            "opportunity" => self
                .opportunity
                .as_ref()
                .map(|o| o.to_string())
                .unwrap_or_default(),
            "created" => self.created.format("%Y-%m-%d").to_string(),
            _ => String::new(),
        }
    }
}
