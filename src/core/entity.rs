//! Entity trait - common interface for all record types

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};

use crate::core::identity::EntityId;

/// Common trait for all QMT records
pub trait Entity: Serialize + DeserializeOwned + 'static {
    /// The record type prefix (e.g., "ORG", "RISK")
    const PREFIX: &'static str;

    /// Get the record's unique ID
    fn id(&self) -> &EntityId;

    /// Get the record's title
    fn title(&self) -> &str;

    /// Get the record's status
    fn status(&self) -> &str;

    /// Get the creation timestamp
    fn created(&self) -> DateTime<Utc>;

    /// Get the author
    fn author(&self) -> &str;

    /// The owning organisation, if any
    fn organisation(&self) -> Option<&EntityId> {
        None
    }

    /// Refresh the update timestamp. Called by the store on every save.
    fn touch(&mut self);

    /// Recompute derived fields. Called by the store on every write path,
    /// interactive and bulk alike, before the record is serialized.
    fn before_save(&mut self) {}
}

/// Derived score for two-factor assessments.
///
/// Returns the product when both factors are present, `None` otherwise.
/// Factors are nominally on a 1-5 scale but any positive integer is
/// accepted and multiplied.
pub fn compute_score(a: Option<u8>, b: Option<u8>) -> Option<u16> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a as u16 * b as u16),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_score_both_factors() {
        assert_eq!(compute_score(Some(3), Some(4)), Some(12));
        assert_eq!(compute_score(Some(5), Some(5)), Some(25));
        assert_eq!(compute_score(Some(1), Some(1)), Some(1));
    }

    #[test]
    fn test_compute_score_missing_factor() {
        assert_eq!(compute_score(Some(3), None), None);
        assert_eq!(compute_score(None, Some(4)), None);
        assert_eq!(compute_score(None, None), None);
    }

    #[test]
    fn test_compute_score_accepts_out_of_range() {
        // No range validation - any positive integer is multiplied
        assert_eq!(compute_score(Some(20), Some(20)), Some(400));
        assert_eq!(compute_score(Some(255), Some(255)), Some(65025));
    }

    #[test]
    fn test_compute_score_idempotent() {
        let first = compute_score(Some(2), Some(5));
        let second = compute_score(Some(2), Some(5));
        assert_eq!(first, second);
    }
}
