//! Filesystem loading for record files
//!
//! Each record lives in its own `<ID>.qmt.yaml` file under the type
//! directory. Loading tolerates unparsable files (they are surfaced with
//! full diagnostics by `qmt validate`, not here).

use miette::{IntoDiagnostic, Result};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

const RECORD_SUFFIX: &str = ".qmt.yaml";

/// Every record file directly under `dir`, sorted by file name.
fn record_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.ends_with(RECORD_SUFFIX))
        })
        .collect();
    files.sort();
    files
}

/// Load every record of type `T` from a type directory.
pub fn load_all<T: DeserializeOwned + 'static>(dir: &Path) -> Result<Vec<T>> {
    let mut records = Vec::new();
    for path in record_files(dir) {
        let Ok(content) = fs::read_to_string(&path) else {
            continue;
        };
        if let Ok(record) = serde_yml::from_str::<T>(&content) {
            records.push(record);
        }
    }
    Ok(records)
}

/// Locate the file for a record whose file name starts with or contains `id`.
///
/// ULID ids make prefixes unambiguous in practice; the first sorted match
/// wins when a partial id matches several files.
pub fn find_entity_file(dir: &Path, id: &str) -> Option<PathBuf> {
    record_files(dir).into_iter().find(|path| {
        path.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with(id) || name.contains(id))
    })
}

/// Load a single record by full or partial id, returning its path as well.
pub fn load_entity<T: DeserializeOwned + 'static>(dir: &Path, id: &str) -> Result<Option<(PathBuf, T)>> {
    let Some(path) = find_entity_file(dir, id) else {
        return Ok(None);
    };

    let content = fs::read_to_string(&path).into_diagnostic()?;
    let record: T = serde_yml::from_str(&content).into_diagnostic()?;
    Ok(Some((path, record)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_load_all_missing_dir_is_empty() {
        let records: Vec<serde_json::Value> = load_all(Path::new("/no/such/dir")).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_load_all_skips_unparsable_and_foreign_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("RISK-A.qmt.yaml"), "id: RISK-A").unwrap();
        fs::write(dir.path().join("RISK-B.qmt.yaml"), ": not yaml [").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignore me").unwrap();

        let records: Vec<serde_json::Value> = load_all(dir.path()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["id"], "RISK-A");
    }

    #[test]
    fn test_find_entity_file_by_partial_id() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("NCR-01J9Z8Y7X6W5V4U3T2S1R0Q9P8.qmt.yaml");
        fs::write(&path, "id: x").unwrap();

        assert_eq!(find_entity_file(dir.path(), "NCR-01J9Z8"), Some(path));
        assert!(find_entity_file(dir.path(), "NCR-ZZZZ").is_none());
    }

    #[test]
    fn test_find_entity_file_prefers_sorted_first_match() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("OPP-0001.qmt.yaml");
        let b = dir.path().join("OPP-0002.qmt.yaml");
        fs::write(&b, "id: b").unwrap();
        fs::write(&a, "id: a").unwrap();

        assert_eq!(find_entity_file(dir.path(), "OPP-"), Some(a));
    }
}
