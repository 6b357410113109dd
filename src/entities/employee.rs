//! Employee record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::EntityId;
use crate::core::refs::{UserRef, UserRefs};
use crate::core::registry::Tabular;

/// An employee of an organisation
///
/// Employees are organisational records, not login accounts; the optional
/// `role` names one of the organisation's declared roles. `employee_id` is
/// unique across the project when present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier
    pub id: EntityId,

    /// Owning organisation
    pub organisation: EntityId,

    pub name: String,

    /// Job title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub designation: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,

    /// Unique across the project when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<String>,

    /// Name of one of the organisation's declared roles
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Creation timestamp, immutable after set
    pub created: DateTime<Utc>,

    /// Refreshed on every save
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,

    pub author: String,
}

impl Entity for Employee {
    const PREFIX: &'static str = "EMP";

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
        Some(&self.organisation)
    }

    fn touch(&mut self) {
        self.updated = Some(Utc::now());
    }
}

impl Employee {
    /// Create a new employee under the given organisation
    pub fn new(organisation: EntityId, name: String, author: String) -> Self {
        Self {
            id: EntityId::new(crate::core::EntityPrefix::Emp),
            organisation,
            name,
            designation: None,
            email: None,
            phone_number: None,
            employee_id: None,
            role: None,
            created: Utc::now(),
            updated: None,
            author,
        }
    }
}

impl UserRefs for Employee {
    fn user_refs(&self) -> Vec<UserRef> {
        // Employees reference directory users by nothing: their email is
        // plain contact data, not an account link
        Vec::new()
    }

    fn clear_user(&mut self, _email: &str) -> usize {
        0
    }
}

impl Tabular for Employee {
    fn cell(&self, column: &str) -> String {
        match column {
            "organisation" => self.organisation.to_string(),
            "name" => self.name.clone(),
            "designation" => self.designation.clone().unwrap_or_default(),
            "email" => self.email.clone().unwrap_or_default(),
            "role" => self.role.clone().unwrap_or_default(),
            "employee_id" => self.employee_id.clone().unwrap_or_default(),
            "created" => self.created.format("%Y-%m-%d").to_string(),
            _ => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::EntityPrefix;

    #[test]
    fn test_employee_creation() {
        let org_id = EntityId::new(EntityPrefix::Org);
        let emp = Employee::new(org_id.clone(), "Dana Osei".to_string(), "test".to_string());

        assert!(emp.id.to_string().starts_with("EMP-"));
        assert_eq!(emp.organisation, org_id);
        assert_eq!(emp.organisation().unwrap(), &org_id);
    }

    #[test]
    fn test_employee_roundtrip() {
        let org_id = EntityId::new(EntityPrefix::Org);
        let mut emp = Employee::new(org_id, "Dana Osei".to_string(), "test".to_string());
        emp.designation = Some("Line Supervisor".to_string());
        emp.employee_id = Some("EMP-0042".to_string());

        let yaml = serde_yml::to_string(&emp).unwrap();
        let parsed: Employee = serde_yml::from_str(&yaml).unwrap();

        assert_eq!(emp.id, parsed.id);
        assert_eq!(parsed.designation.as_deref(), Some("Line Supervisor"));
        assert_eq!(parsed.employee_id.as_deref(), Some("EMP-0042"));
    }

    #[test]
    fn test_employee_has_no_user_refs() {
        let org_id = EntityId::new(EntityPrefix::Org);
        let emp = Employee::new(org_id, "Dana Osei".to_string(), "test".to_string());
        assert!(emp.user_refs().is_empty());
    }
}
