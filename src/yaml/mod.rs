//! YAML parsing with rich diagnostics

pub mod diagnostics;

pub use diagnostics::{YamlError, YamlSyntaxError};

use serde::de::DeserializeOwned;
use std::path::Path;

/// Parse a YAML file into a record, producing a labelled diagnostic on failure
pub fn parse_yaml_file<T: DeserializeOwned + 'static>(path: &Path) -> Result<T, YamlError> {
    let content = std::fs::read_to_string(path)?;
    serde_yml::from_str(&content).map_err(|e| {
        YamlSyntaxError::from_serde_error(&e, &content, &path.to_string_lossy()).into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_yaml_file_ok() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("value.yaml");
        std::fs::write(&path, "key: value\n").unwrap();

        let value: serde_json::Value = parse_yaml_file(&path).unwrap();
        assert_eq!(value["key"], "value");
    }

    #[test]
    fn test_parse_yaml_file_syntax_error() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("broken.yaml");
        std::fs::write(&path, "key: [unclosed\n").unwrap();

        let result: Result<serde_json::Value, _> = parse_yaml_file(&path);
        assert!(matches!(result, Err(YamlError::Syntax(_))));
    }
}
