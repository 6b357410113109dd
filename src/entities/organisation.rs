//! Organisation record - the owning entity for all QMS records

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::EntityId;
use crate::core::refs::{clear_if_matches, push_ref, RefPolicy, UserRef, UserRefs};
use crate::core::registry::Tabular;

/// Organisation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[derive(Default)]
pub enum OrgStatus {
    #[default]
    Pending,
    Active,
}

impl std::fmt::Display for OrgStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrgStatus::Pending => write!(f, "PENDING"),
            OrgStatus::Active => write!(f, "ACTIVE"),
        }
    }
}

impl std::str::FromStr for OrgStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PENDING" => Ok(OrgStatus::Pending),
            "ACTIVE" => Ok(OrgStatus::Active),
            _ => Err(format!("Unknown organisation status: {}", s)),
        }
    }
}

/// A physical location of the organisation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrganisationLocation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A department within the organisation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganisationDepartment {
    pub name: String,

    /// Coordinating user email; cleared when that user is deleted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinator: Option<String>,
}

/// A role, department seat or person responsible for clause actions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrgRole {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// SWOT entry classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwotKind {
    Strength,
    Weakness,
    Opportunity,
    Threat,
}

impl std::fmt::Display for SwotKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SwotKind::Strength => write!(f, "strength"),
            SwotKind::Weakness => write!(f, "weakness"),
            SwotKind::Opportunity => write!(f, "opportunity"),
            SwotKind::Threat => write!(f, "threat"),
        }
    }
}

impl std::str::FromStr for SwotKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strength" => Ok(SwotKind::Strength),
            "weakness" => Ok(SwotKind::Weakness),
            "opportunity" => Ok(SwotKind::Opportunity),
            "threat" => Ok(SwotKind::Threat),
            _ => Err(format!("Unknown SWOT type: {}", s)),
        }
    }
}

/// A SWOT analysis entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwotEntry {
    #[serde(rename = "type")]
    pub kind: SwotKind,
    pub description: String,
}

/// PESTLE entry classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PestleKind {
    Political,
    Economic,
    Social,
    Technological,
    Legal,
    Environmental,
}

impl std::fmt::Display for PestleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PestleKind::Political => write!(f, "political"),
            PestleKind::Economic => write!(f, "economic"),
            PestleKind::Social => write!(f, "social"),
            PestleKind::Technological => write!(f, "technological"),
            PestleKind::Legal => write!(f, "legal"),
            PestleKind::Environmental => write!(f, "environmental"),
        }
    }
}

impl std::str::FromStr for PestleKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "political" => Ok(PestleKind::Political),
            "economic" => Ok(PestleKind::Economic),
            "social" => Ok(PestleKind::Social),
            "technological" => Ok(PestleKind::Technological),
            "legal" => Ok(PestleKind::Legal),
            "environmental" => Ok(PestleKind::Environmental),
            _ => Err(format!("Unknown PESTLE type: {}", s)),
        }
    }
}

/// A PESTLE analysis entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PestleEntry {
    #[serde(rename = "type")]
    pub kind: PestleKind,
    pub description: String,
}

/// The organisation's QMS scope statement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopeStatement {
    pub text: String,

    /// Approving role name, if recorded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_date: Option<NaiveDate>,
}

/// Attached record or evidence for the organisation itself
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteDocument {
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Project-relative attachment path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    pub uploaded_at: DateTime<Utc>,
}

/// An organisation record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organisation {
    /// Unique identifier
    pub id: EntityId,

    /// Organisation name, unique across the project
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tin_number: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,

    /// Registered representative user email; at most one per organisation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub representative: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation_level: Option<String>,

    #[serde(default)]
    pub status: OrgStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Member user emails, unique per organisation
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<OrganisationLocation>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub departments: Vec<OrganisationDepartment>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<OrgRole>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub swot: Vec<SwotEntry>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pestle: Vec<PestleEntry>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope_statement: Option<ScopeStatement>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_document: Option<SiteDocument>,

    /// Creation timestamp, immutable after set
    pub created: DateTime<Utc>,

    /// Refreshed on every save
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,

    /// Author (who registered this organisation)
    pub author: String,
}

impl Entity for Organisation {
    const PREFIX: &'static str = "ORG";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.name
    }

    fn status(&self) -> &str {
        match self.status {
            OrgStatus::Pending => "PENDING",
            OrgStatus::Active => "ACTIVE",
        }
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

impl Organisation {
    /// Create a new pending organisation
    pub fn new(name: String, author: String) -> Self {
        Self {
            id: EntityId::new(crate::core::EntityPrefix::Org),
            name,
            address: None,
            tin_number: None,
            region: None,
            phone: None,
            email: None,
            sector: None,
            representative: None,
            evaluation_level: None,
            status: OrgStatus::default(),
            notes: None,
            members: Vec::new(),
            locations: Vec::new(),
            departments: Vec::new(),
            roles: Vec::new(),
            swot: Vec::new(),
            pestle: Vec::new(),
            scope_statement: None,
            site_document: None,
            created: Utc::now(),
            updated: None,
            author,
        }
    }

    /// Whether the given user is the registered representative
    pub fn is_representative(&self, email: &str) -> bool {
        self.representative
            .as_deref()
            .is_some_and(|r| r.eq_ignore_ascii_case(email))
    }

    /// Whether the given user holds a membership in this organisation
    pub fn has_member(&self, email: &str) -> bool {
        self.members.iter().any(|m| m.eq_ignore_ascii_case(email))
    }

    /// Add a membership; (organisation, user) pairs are unique
    pub fn add_member(&mut self, email: &str) -> Result<(), String> {
        if self.has_member(email) {
            return Err(format!(
                "user '{}' is already a member of '{}'",
                email, self.name
            ));
        }
        self.members.push(email.to_string());
        Ok(())
    }

    /// Remove a membership; returns whether one existed
    pub fn remove_member(&mut self, email: &str) -> bool {
        let before = self.members.len();
        self.members.retain(|m| !m.eq_ignore_ascii_case(email));
        self.members.len() < before
    }
}

impl UserRefs for Organisation {
    fn user_refs(&self) -> Vec<UserRef> {
        let mut refs = Vec::new();
        push_ref(&mut refs, "representative", &self.representative, RefPolicy::SetNull);
        for dept in &self.departments {
            push_ref(&mut refs, "departments.coordinator", &dept.coordinator, RefPolicy::SetNull);
        }
        for member in &self.members {
            refs.push(UserRef::set_null("members", member));
        }
        refs
    }

    fn clear_user(&mut self, email: &str) -> usize {
        let mut cleared = clear_if_matches(&mut self.representative, email);
        for dept in &mut self.departments {
            cleared += clear_if_matches(&mut dept.coordinator, email);
        }
        // Membership rows disappear with the user rather than being nulled
        let before = self.members.len();
        self.members.retain(|m| !m.eq_ignore_ascii_case(email));
        cleared + (before - self.members.len())
    }
}

impl Tabular for Organisation {
    fn cell(&self, column: &str) -> String {
        match column {
            "name" => self.name.clone(),
            "email" => self.email.clone().unwrap_or_default(),
            "address" => self.address.clone().unwrap_or_default(),
            "tin_number" => self.tin_number.clone().unwrap_or_default(),
            "region" => self.region.clone().unwrap_or_default(),
            "phone" => self.phone.clone().unwrap_or_default(),
            "sector" => self.sector.clone().unwrap_or_default(),
            "status" => self.status.to_string(),
            "representative" => self.representative.clone().unwrap_or_default(),
            "notes" => self.notes.clone().unwrap_or_default(),
            "created" => self.created.format("%Y-%m-%d").to_string(),
            _ => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_organisation_creation() {
        let org = Organisation::new("Acme Ltd".to_string(), "test".to_string());

        assert!(org.id.to_string().starts_with("ORG-"));
        assert_eq!(org.name, "Acme Ltd");
        assert_eq!(org.status, OrgStatus::Pending);
        assert!(org.representative.is_none());
    }

    #[test]
    fn test_organisation_roundtrip() {
        let mut org = Organisation::new("Acme Ltd".to_string(), "test".to_string());
        org.representative = Some("rep@acme.test".to_string());
        org.departments.push(OrganisationDepartment {
            name: "Quality Assurance".to_string(),
            coordinator: Some("qa@acme.test".to_string()),
        });
        org.swot.push(SwotEntry {
            kind: SwotKind::Strength,
            description: "Experienced staff".to_string(),
        });

        let yaml = serde_yml::to_string(&org).unwrap();
        let parsed: Organisation = serde_yml::from_str(&yaml).unwrap();

        assert_eq!(org.id, parsed.id);
        assert_eq!(parsed.departments.len(), 1);
        assert_eq!(parsed.departments[0].name, "Quality Assurance");
        assert_eq!(parsed.swot[0].kind, SwotKind::Strength);
    }

    #[test]
    fn test_status_serializes_uppercase() {
        let org = Organisation::new("Acme Ltd".to_string(), "test".to_string());
        let yaml = serde_yml::to_string(&org).unwrap();
        assert!(yaml.contains("status: PENDING"));
    }

    #[test]
    fn test_membership_uniqueness() {
        let mut org = Organisation::new("Acme Ltd".to_string(), "test".to_string());

        org.add_member("user@acme.test").unwrap();
        assert!(org.add_member("user@acme.test").is_err());
        assert!(org.add_member("USER@ACME.TEST").is_err());
        assert_eq!(org.members.len(), 1);
    }

    #[test]
    fn test_clear_user_nulls_set_null_refs() {
        let mut org = Organisation::new("Acme Ltd".to_string(), "test".to_string());
        org.representative = Some("rep@acme.test".to_string());
        org.departments.push(OrganisationDepartment {
            name: "Operations".to_string(),
            coordinator: Some("rep@acme.test".to_string()),
        });
        org.add_member("rep@acme.test").unwrap();

        let cleared = org.clear_user("rep@acme.test");
        assert_eq!(cleared, 3);
        assert!(org.representative.is_none());
        assert!(org.departments[0].coordinator.is_none());
        assert!(org.members.is_empty());
        // The department itself survives
        assert_eq!(org.departments.len(), 1);
    }

    #[test]
    fn test_no_protect_refs_on_organisation() {
        let mut org = Organisation::new("Acme Ltd".to_string(), "test".to_string());
        org.representative = Some("rep@acme.test".to_string());

        assert!(org
            .user_refs()
            .iter()
            .all(|r| r.policy == RefPolicy::SetNull));
    }

    #[test]
    fn test_entity_trait_implementation() {
        let org = Organisation::new("Acme Ltd".to_string(), "author".to_string());

        assert_eq!(Organisation::PREFIX, "ORG");
        assert_eq!(org.title(), "Acme Ltd");
        assert_eq!(org.status(), "PENDING");
        assert_eq!(org.author(), "author");
        assert!(org.organisation().is_none());
    }

    #[test]
    fn test_touch_sets_updated() {
        let mut org = Organisation::new("Acme Ltd".to_string(), "test".to_string());
        assert!(org.updated.is_none());
        org.touch();
        assert!(org.updated.is_some());
    }
}
