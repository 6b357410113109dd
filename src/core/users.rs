//! User directory: accounts, roles, and acting-user resolution

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::core::{Config, Project};

/// Account types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccountType {
    Administrator,
    Customer,
}

impl Default for AccountType {
    fn default() -> Self {
        AccountType::Customer
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountType::Administrator => write!(f, "ADMINISTRATOR"),
            AccountType::Customer => write!(f, "CUSTOMER"),
        }
    }
}

impl std::str::FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ADMINISTRATOR" => Ok(AccountType::Administrator),
            "CUSTOMER" => Ok(AccountType::Customer),
            _ => Err(format!("Unknown account type: {}", s)),
        }
    }
}

/// User roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    Management,
    Representative,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Management => write!(f, "MANAGEMENT"),
            UserRole::Representative => write!(f, "REPRESENTATIVE"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "MANAGEMENT" => Ok(UserRole::Management),
            "REPRESENTATIVE" => Ok(UserRole::Representative),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

/// A user account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Login identifier, unique across the directory
    pub email: String,

    pub full_name: String,

    /// Unique when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,

    #[serde(default)]
    pub account_type: AccountType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,

    #[serde(default = "default_true")]
    pub use_two_factor_authentication: bool,

    #[serde(default)]
    pub department_head: bool,

    /// Relative path to the stored signature image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,

    #[serde(default = "default_true")]
    pub active: bool,

    pub date_joined: chrono::DateTime<chrono::Utc>,
}

fn default_true() -> bool {
    true
}

impl User {
    /// Create a new customer account
    pub fn new(email: String, full_name: String) -> Self {
        Self {
            email,
            full_name,
            phone_number: None,
            account_type: AccountType::default(),
            role: None,
            use_two_factor_authentication: true,
            department_head: false,
            signature: None,
            active: true,
            date_joined: chrono::Utc::now(),
        }
    }

    /// Administrators see every organisation; customers are scoped
    pub fn is_superuser(&self) -> bool {
        self.account_type == AccountType::Administrator
    }
}

/// The project's user directory, stored in .qmt/users.yaml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserDirectory {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub users: Vec<User>,
}

fn default_version() -> u32 {
    1
}

impl UserDirectory {
    /// Load the directory from the project's .qmt/users.yaml
    pub fn load(project: &Project) -> Self {
        Self::load_from_path(&project.qmt_dir().join("users.yaml")).unwrap_or_default()
    }

    /// Load the directory from a specific path
    pub fn load_from_path(path: &Path) -> Option<Self> {
        if !path.exists() {
            return None;
        }

        let contents = std::fs::read_to_string(path).ok()?;
        serde_yml::from_str(&contents).ok()
    }

    /// Save the directory to the project's .qmt/users.yaml
    pub fn save(&self, project: &Project) -> std::io::Result<()> {
        let contents = serde_yml::to_string(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(project.qmt_dir().join("users.yaml"), contents)
    }

    /// Find an active user by email
    pub fn find(&self, email: &str) -> Option<&User> {
        self.users
            .iter()
            .find(|u| u.active && u.email.eq_ignore_ascii_case(email))
    }

    /// Find a user by email, mutable
    pub fn find_mut(&mut self, email: &str) -> Option<&mut User> {
        self.users
            .iter_mut()
            .find(|u| u.email.eq_ignore_ascii_case(email))
    }

    /// Resolve the acting user: --as flag, QMT_USER, config, then git user.email
    pub fn acting_user(&self, override_email: Option<&str>, config: &Config) -> Option<&User> {
        if let Some(email) = override_email {
            return self.find(email);
        }
        config.acting_user().and_then(|email| self.find(&email))
    }

    /// Add a user, enforcing email and phone uniqueness
    pub fn add(&mut self, user: User) -> Result<(), UserError> {
        if self
            .users
            .iter()
            .any(|u| u.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(UserError::DuplicateEmail(user.email));
        }
        if let Some(ref phone) = user.phone_number {
            if self
                .users
                .iter()
                .any(|u| u.phone_number.as_deref() == Some(phone.as_str()))
            {
                return Err(UserError::DuplicatePhone(phone.clone()));
            }
        }
        self.users.push(user);
        Ok(())
    }

    /// Remove a user by email. Reference policy checks happen in the store;
    /// this only drops the directory entry.
    pub fn remove(&mut self, email: &str) -> bool {
        let len_before = self.users.len();
        self.users.retain(|u| !u.email.eq_ignore_ascii_case(email));
        self.users.len() < len_before
    }
}

/// Errors from user directory operations
#[derive(Debug, Error)]
pub enum UserError {
    #[error("a user with email '{0}' already exists")]
    DuplicateEmail(String),

    #[error("a user with phone number '{0}' already exists")]
    DuplicatePhone(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn create_test_directory() -> UserDirectory {
        let mut dir = UserDirectory::default();
        let mut admin = User::new("admin@acme.test".to_string(), "Admin User".to_string());
        admin.account_type = AccountType::Administrator;
        dir.add(admin).unwrap();

        let mut rep = User::new("rep@acme.test".to_string(), "Rhea Patel".to_string());
        rep.role = Some(UserRole::Representative);
        rep.phone_number = Some("+1555000001".to_string());
        dir.add(rep).unwrap();
        dir
    }

    #[test]
    fn test_find_user_case_insensitive() {
        let dir = create_test_directory();
        assert!(dir.find("REP@ACME.TEST").is_some());
        assert!(dir.find("nobody@acme.test").is_none());
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let mut dir = create_test_directory();
        let dup = User::new("rep@acme.test".to_string(), "Other".to_string());
        assert!(matches!(dir.add(dup), Err(UserError::DuplicateEmail(_))));
    }

    #[test]
    fn test_duplicate_phone_rejected() {
        let mut dir = create_test_directory();
        let mut dup = User::new("new@acme.test".to_string(), "Other".to_string());
        dup.phone_number = Some("+1555000001".to_string());
        assert!(matches!(dir.add(dup), Err(UserError::DuplicatePhone(_))));
    }

    #[test]
    fn test_superuser_is_administrator() {
        let dir = create_test_directory();
        assert!(dir.find("admin@acme.test").unwrap().is_superuser());
        assert!(!dir.find("rep@acme.test").unwrap().is_superuser());
    }

    #[test]
    fn test_two_factor_defaults_on() {
        let user = User::new("a@b.test".to_string(), "A".to_string());
        assert!(user.use_two_factor_authentication);
    }

    #[test]
    fn test_save_and_load() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();

        let dir = create_test_directory();
        dir.save(&project).unwrap();

        let loaded = UserDirectory::load(&project);
        assert_eq!(loaded.users.len(), 2);
        assert!(loaded.find("admin@acme.test").is_some());
    }

    #[test]
    fn test_remove_user() {
        let mut dir = create_test_directory();
        assert!(dir.remove("rep@acme.test"));
        assert!(!dir.remove("rep@acme.test"));
        assert!(dir.find("rep@acme.test").is_none());
    }
}
