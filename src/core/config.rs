//! Layered configuration: defaults ← global file ← project file ← environment

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::core::Project;

/// Settings recognised by the toolkit.
///
/// Every layer deserialises into this struct; later layers override earlier
/// ones field by field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default author for new records
    pub author: Option<String>,

    /// Acting user email for scoped listings
    pub user: Option<String>,

    /// Editor command for `qmt <record> edit`
    pub editor: Option<String>,

    /// Pager command for long output
    pub pager: Option<String>,

    /// Default output format
    pub default_format: Option<String>,

    /// Reject status changes outside the forward transition graph
    pub enforce_transitions: Option<bool>,
}

impl Config {
    /// Load configuration from all layers, lowest priority first.
    pub fn load() -> Self {
        let mut config = Config::default();

        let global = Self::global_config_path();
        if let Some(layer) = global.as_deref().and_then(Self::read_layer) {
            config.apply(layer);
        }

        if let Ok(project) = Project::discover() {
            if let Some(layer) = Self::read_layer(&project.qmt_dir().join("config.yaml")) {
                config.apply(layer);
            }
        }

        for (var, field) in [
            ("QMT_AUTHOR", &mut config.author),
            ("QMT_USER", &mut config.user),
            ("QMT_EDITOR", &mut config.editor),
        ] {
            if let Ok(value) = std::env::var(var) {
                *field = Some(value);
            }
        }

        config
    }

    /// Parse one config file, ignoring missing or malformed layers.
    fn read_layer(path: &Path) -> Option<Config> {
        let contents = std::fs::read_to_string(path).ok()?;
        serde_yml::from_str(&contents).ok()
    }

    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "qmt")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Overlay a higher-priority layer onto this one.
    fn apply(&mut self, layer: Config) {
        let Config {
            author,
            user,
            editor,
            pager,
            default_format,
            enforce_transitions,
        } = layer;

        self.author = author.or(self.author.take());
        self.user = user.or(self.user.take());
        self.editor = editor.or(self.editor.take());
        self.pager = pager.or(self.pager.take());
        self.default_format = default_format.or(self.default_format.take());
        self.enforce_transitions = enforce_transitions.or(self.enforce_transitions.take());
    }

    /// Author for new records: configured name, then git, then username.
    pub fn author(&self) -> String {
        if let Some(ref author) = self.author {
            return author.clone();
        }

        if let Some(name) = git_config("user.name") {
            return name;
        }

        std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_else(|_| "unknown".to_string())
    }

    /// Acting user email for scoped listings: configured email, then git.
    pub fn acting_user(&self) -> Option<String> {
        self.user.clone().or_else(|| git_config("user.email"))
    }

    /// Editor command, falling back to $EDITOR / $VISUAL / vi.
    pub fn editor(&self) -> String {
        self.editor
            .clone()
            .or_else(|| std::env::var("EDITOR").ok())
            .or_else(|| std::env::var("VISUAL").ok())
            .unwrap_or_else(|| "vi".to_string())
    }

    /// Whether the transition guard enforces the forward graph
    pub fn enforce_transitions(&self) -> bool {
        self.enforce_transitions.unwrap_or(false)
    }

    /// Run the editor on a file, splitting commands that carry arguments
    /// (e.g. "emacsclient -nw" or "code --wait").
    pub fn run_editor(
        &self,
        file_path: &std::path::Path,
    ) -> std::io::Result<std::process::ExitStatus> {
        let editor = self.editor();
        let mut parts = editor.split_whitespace();

        let cmd = parts.next().unwrap_or("vi");
        std::process::Command::new(cmd)
            .args(parts)
            .arg(file_path)
            .status()
    }
}

/// Read one key from git config, if git is present and the key is set.
fn git_config(key: &str) -> Option<String> {
    let output = std::process::Command::new("git")
        .args(["config", key])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }

    let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!value.is_empty()).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_overrides_field_by_field() {
        let mut base = Config {
            author: Some("global author".into()),
            editor: Some("vi".into()),
            ..Config::default()
        };

        base.apply(Config {
            editor: Some("nano".into()),
            enforce_transitions: Some(true),
            ..Config::default()
        });

        assert_eq!(base.author.as_deref(), Some("global author"));
        assert_eq!(base.editor.as_deref(), Some("nano"));
        assert!(base.enforce_transitions());
    }

    #[test]
    fn test_enforce_transitions_defaults_off() {
        assert!(!Config::default().enforce_transitions());
    }

    #[test]
    fn test_read_layer_tolerates_missing_file() {
        assert!(Config::read_layer(Path::new("/no/such/config.yaml")).is_none());
    }
}
