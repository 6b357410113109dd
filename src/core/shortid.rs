//! Numeric `@N` aliases for record selection
//!
//! Listing commands assign each record a small stable alias, kept in a
//! project-local index so a follow-up `qmt risk show @3` resolves without
//! retyping the full ULID.

use std::collections::BTreeMap;
use std::fs;

use crate::core::project::Project;

const INDEX_FILE: &str = ".qmt/shortids.json";

/// Alias-to-record-id index, persisted as JSON inside `.qmt/`.
#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct ShortIdIndex {
    /// Alias number to full record id; the map keeps the file diff-stable.
    entries: BTreeMap<u32, String>,
}

impl ShortIdIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the project index, starting fresh when absent or unreadable.
    pub fn load(project: &Project) -> Self {
        fs::read_to_string(project.root().join(INDEX_FILE))
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default()
    }

    pub fn save(&self, project: &Project) -> std::io::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(project.root().join(INDEX_FILE), content)
    }

    /// Alias for a record id, allocating the next free number if new.
    ///
    /// A record listed twice keeps its original alias.
    pub fn add(&mut self, entity_id: String) -> u32 {
        if let Some(existing) = self.get_short_id(&entity_id) {
            return existing;
        }

        let next = self.entries.keys().next_back().map_or(1, |last| last + 1);
        self.entries.insert(next, entity_id);
        next
    }

    /// Ensure every listed record has an alias.
    pub fn ensure_all(&mut self, entity_ids: impl IntoIterator<Item = String>) {
        for id in entity_ids {
            self.add(id);
        }
    }

    /// Resolve a user-typed reference to a record id string.
    ///
    /// `@N` and bare numbers look up the alias table; anything else passes
    /// through for full or partial id matching. `None` means the alias is
    /// unknown.
    pub fn resolve(&self, reference: &str) -> Option<String> {
        let alias = match reference.strip_prefix('@') {
            Some(rest) => rest,
            None if reference.chars().all(|c| c.is_ascii_digit()) && !reference.is_empty() => {
                reference
            }
            None => return Some(reference.to_string()),
        };

        self.entries.get(&alias.parse::<u32>().ok()?).cloned()
    }

    /// Alias currently assigned to a record id, if any.
    pub fn get_short_id(&self, entity_id: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|(_, id)| id.as_str() == entity_id)
            .map(|(alias, _)| *alias)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aliases_allocate_in_listing_order() {
        let mut index = ShortIdIndex::new();
        assert_eq!(index.add("RISK-01A".to_string()), 1);
        assert_eq!(index.add("RISK-01B".to_string()), 2);
        assert_eq!(index.add("OPP-01C".to_string()), 3);
    }

    #[test]
    fn test_relisting_keeps_existing_alias() {
        let mut index = ShortIdIndex::new();
        index.ensure_all(["NCR-01A".to_string(), "NCR-01B".to_string()]);
        index.ensure_all(["NCR-01B".to_string(), "NCR-01D".to_string()]);

        assert_eq!(index.get_short_id("NCR-01B"), Some(2));
        assert_eq!(index.get_short_id("NCR-01D"), Some(3));
    }

    #[test]
    fn test_resolve_alias_forms() {
        let mut index = ShortIdIndex::new();
        index.add("ORG-01A".to_string());

        assert_eq!(index.resolve("@1"), Some("ORG-01A".to_string()));
        assert_eq!(index.resolve("1"), Some("ORG-01A".to_string()));
        assert_eq!(index.resolve("@9"), None);
    }

    #[test]
    fn test_resolve_passes_through_ids_and_text() {
        let index = ShortIdIndex::new();
        assert_eq!(index.resolve("ORG-01A"), Some("ORG-01A".to_string()));
        assert_eq!(index.resolve("welding"), Some("welding".to_string()));
    }

    #[test]
    fn test_index_round_trips_through_project() {
        let tmp = tempfile::tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();

        let mut index = ShortIdIndex::new();
        index.add("REL-01A".to_string());
        index.save(&project).unwrap();

        let reloaded = ShortIdIndex::load(&project);
        assert_eq!(reloaded.get_short_id("REL-01A"), Some(1));
    }
}
