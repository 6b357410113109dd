//! Display helpers shared by the table renderer and record commands

use crate::core::identity::EntityId;

/// Render a record id for a table column.
///
/// Full type-prefixed ULIDs run past 30 characters; columns keep the prefix
/// and the leading ULID characters.
pub fn format_short_id(id: &EntityId) -> String {
    truncate_str(&id.to_string(), 16)
}

/// Clip a value to `max_len` characters, appending "..." when shortened.
///
/// Counts characters rather than bytes so multi-byte titles never split
/// mid-codepoint.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_owned();
    }
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{kept}...")
}

/// Quote a field for CSV output per RFC 4180.
pub fn escape_csv(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::EntityPrefix;

    #[test]
    fn test_format_short_id_clips_full_ulid() {
        let id = EntityId::new(EntityPrefix::Ncr);
        let shown = format_short_id(&id);
        assert_eq!(shown.chars().count(), 16);
        assert!(shown.starts_with("NCR-"));
        assert!(shown.ends_with("..."));
    }

    #[test]
    fn test_truncate_str_counts_chars_not_bytes() {
        assert_eq!(truncate_str("qualité", 10), "qualité");
        assert_eq!(truncate_str("nonconformance record", 10), "nonconf...");
        assert_eq!(truncate_str("étalonnage périodique", 10), "étalonn...");
    }

    #[test]
    fn test_truncate_str_exact_fit() {
        assert_eq!(truncate_str("audit", 5), "audit");
    }

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("supplier"), "supplier");
        assert_eq!(escape_csv("Acme, Ltd"), "\"Acme, Ltd\"");
        assert_eq!(escape_csv("say \"stop\""), "\"say \"\"stop\"\"\"");
        assert_eq!(escape_csv("line\nbreak"), "\"line\nbreak\"");
    }
}
