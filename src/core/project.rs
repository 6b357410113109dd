//! Project discovery and structure

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::identity::{EntityId, EntityPrefix};

/// Represents a QMT project
#[derive(Debug)]
pub struct Project {
    /// Root directory of the project (parent of .qmt/)
    root: PathBuf,
}

impl Project {
    /// Find project root by walking up from the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let current =
            std::env::current_dir().map_err(|e| ProjectError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find project root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        loop {
            let qmt_dir = current.join(".qmt");
            if qmt_dir.is_dir() {
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(ProjectError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Create a new project structure at the given path
    pub fn init(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        let qmt_dir = root.join(".qmt");
        if qmt_dir.exists() {
            return Err(ProjectError::AlreadyExists(root.clone()));
        }

        std::fs::create_dir_all(&qmt_dir)
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        // Create default config
        let config_path = qmt_dir.join("config.yaml");
        std::fs::write(&config_path, Self::default_config())
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        // Create record directories
        Self::create_entity_dirs(&root)?;

        Ok(Self { root })
    }

    fn default_config() -> &'static str {
        r#"# QMT Project Configuration

# Default author for new records (can be overridden by global config)
# author: ""

# Acting user email for scoped listings (default: git user.email)
# user: ""

# Editor to use for `qmt <record> edit` commands (default: $EDITOR)
# editor: ""

# Default output format (auto, yaml, tsv, json, csv, md, id)
# default_format: auto

# Reject status changes outside the forward transition graph
# enforce_transitions: false
"#
    }

    fn create_entity_dirs(root: &Path) -> Result<(), ProjectError> {
        let dirs = [
            "organisation/organisations",
            "organisation/stakeholders",
            "organisation/employees",
            "leadership/commitments",
            "leadership/policies",
            "planning/risks",
            "planning/opportunities",
            "planning/responses",
            "planning/changes",
            "operation/sops",
            "operation/contract_reviews",
            "operation/design_projects",
            "operation/supplier_evaluations",
            "operation/service_reports",
            "operation/product_releases",
            "operation/ncrs",
            "support/resource_plans",
            "support/training_records",
            "support/awareness_records",
            "support/communication_plans",
            "support/document_registers",
            "attachments",
        ];

        for dir in dirs {
            std::fs::create_dir_all(root.join(dir))
                .map_err(|e| ProjectError::IoError(e.to_string()))?;
        }

        Ok(())
    }

    /// Get the project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .qmt configuration directory
    pub fn qmt_dir(&self) -> PathBuf {
        self.root.join(".qmt")
    }

    /// Get the attachment storage root
    pub fn attachments_dir(&self) -> PathBuf {
        self.root.join("attachments")
    }

    /// Get the path for a record file
    pub fn entity_path(&self, prefix: EntityPrefix, id: &EntityId) -> PathBuf {
        self.root
            .join(Self::entity_directory(prefix))
            .join(format!("{}.qmt.yaml", id))
    }

    /// Get the directory for a given record prefix
    pub fn entity_directory(prefix: EntityPrefix) -> &'static str {
        match prefix {
            EntityPrefix::Org => "organisation/organisations",
            EntityPrefix::Stk => "organisation/stakeholders",
            EntityPrefix::Emp => "organisation/employees",
            EntityPrefix::Lead => "leadership/commitments",
            EntityPrefix::Qpol => "leadership/policies",
            EntityPrefix::Risk => "planning/risks",
            EntityPrefix::Opp => "planning/opportunities",
            EntityPrefix::Resp => "planning/responses",
            EntityPrefix::Chg => "planning/changes",
            EntityPrefix::Sop => "operation/sops",
            EntityPrefix::Ctr => "operation/contract_reviews",
            EntityPrefix::Dsn => "operation/design_projects",
            EntityPrefix::Sup => "operation/supplier_evaluations",
            EntityPrefix::Svc => "operation/service_reports",
            EntityPrefix::Rel => "operation/product_releases",
            EntityPrefix::Ncr => "operation/ncrs",
            EntityPrefix::Res => "support/resource_plans",
            EntityPrefix::Trn => "support/training_records",
            EntityPrefix::Awr => "support/awareness_records",
            EntityPrefix::Com => "support/communication_plans",
            EntityPrefix::Doc => "support/document_registers",
        }
    }

    /// Get the absolute directory for a record prefix
    pub fn entity_dir(&self, prefix: EntityPrefix) -> PathBuf {
        self.root.join(Self::entity_directory(prefix))
    }

    /// Iterate all record files of a given prefix type
    pub fn iter_entity_files(&self, prefix: EntityPrefix) -> impl Iterator<Item = PathBuf> {
        let dir = self.entity_dir(prefix);
        walkdir::WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.path().to_string_lossy().ends_with(".qmt.yaml"))
            .map(|e| e.path().to_path_buf())
    }
}

/// Errors that can occur during project operations
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("not a QMT project (searched from {searched_from:?}). Run 'qmt init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("QMT project already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_project_init_creates_structure() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();

        assert!(project.qmt_dir().exists());
        assert!(project.qmt_dir().join("config.yaml").exists());
        assert!(project.root().join("organisation/organisations").is_dir());
        assert!(project.root().join("planning/risks").is_dir());
        assert!(project.root().join("support/document_registers").is_dir());
        assert!(project.root().join("attachments").is_dir());
    }

    #[test]
    fn test_project_init_fails_if_exists() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path()).unwrap();

        let err = Project::init(tmp.path()).unwrap_err();
        assert!(matches!(err, ProjectError::AlreadyExists(_)));
    }

    #[test]
    fn test_project_discover_finds_qmt_dir() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path()).unwrap();

        let subdir = tmp.path().join("some/nested/dir");
        std::fs::create_dir_all(&subdir).unwrap();

        let project = Project::discover_from(&subdir).unwrap();
        assert_eq!(
            project.root().canonicalize().unwrap(),
            tmp.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn test_project_discover_fails_without_qmt_dir() {
        let tmp = tempdir().unwrap();
        let err = Project::discover_from(tmp.path()).unwrap_err();
        assert!(matches!(err, ProjectError::NotFound { .. }));
    }

    #[test]
    fn test_entity_path_uses_prefix_directory() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();

        let id = EntityId::new(EntityPrefix::Ncr);
        let path = project.entity_path(EntityPrefix::Ncr, &id);
        assert!(path.to_string_lossy().contains("operation/ncrs"));
        assert!(path.to_string_lossy().ends_with(".qmt.yaml"));
    }
}
