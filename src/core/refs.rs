//! User reference policies
//!
//! Records attribute work to users by email. Each reference carries one of
//! two deletion policies: `Protect` (the user owns the record history and
//! cannot be deleted while referenced) or `SetNull` (the attribution is
//! cleared and deletion proceeds). Every record type declares its references
//! through [`UserRefs`]; the store walks them when a user is deleted.

use crate::core::identity::EntityId;

/// What happens to a reference when the referenced user is deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefPolicy {
    /// Deletion of the user is rejected while this reference exists
    Protect,
    /// The reference is cleared and deletion proceeds
    SetNull,
}

/// A single user reference found on a record
#[derive(Debug, Clone)]
pub struct UserRef {
    /// Field path on the record, for diagnostics (e.g. "leader",
    /// "accountabilities.user")
    pub field: &'static str,
    pub email: String,
    pub policy: RefPolicy,
}

impl UserRef {
    pub fn protect(field: &'static str, email: &str) -> Self {
        Self {
            field,
            email: email.to_string(),
            policy: RefPolicy::Protect,
        }
    }

    pub fn set_null(field: &'static str, email: &str) -> Self {
        Self {
            field,
            email: email.to_string(),
            policy: RefPolicy::SetNull,
        }
    }
}

/// A protected reference blocking a user deletion, for diagnostics
#[derive(Debug, Clone)]
pub struct ProtectedRef {
    pub record: EntityId,
    pub record_title: String,
    pub field: &'static str,
}

/// Declared user references on a record type
pub trait UserRefs {
    /// Every user reference currently set on this record, including
    /// references inside embedded children
    fn user_refs(&self) -> Vec<UserRef>;

    /// Clear SET_NULL references to `email`; returns how many were cleared.
    /// PROTECT references are never cleared here - the store rejects the
    /// deletion before this is called.
    fn clear_user(&mut self, email: &str) -> usize;
}

/// Clear an optional email field if it matches; helper for `clear_user` impls
pub fn clear_if_matches(slot: &mut Option<String>, email: &str) -> usize {
    if slot.as_deref().is_some_and(|e| e.eq_ignore_ascii_case(email)) {
        *slot = None;
        1
    } else {
        0
    }
}

/// Push a reference for an optional email field; helper for `user_refs` impls
pub fn push_ref(
    refs: &mut Vec<UserRef>,
    field: &'static str,
    slot: &Option<String>,
    policy: RefPolicy,
) {
    if let Some(email) = slot {
        refs.push(UserRef {
            field,
            email: email.clone(),
            policy,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_if_matches() {
        let mut slot = Some("rep@acme.test".to_string());
        assert_eq!(clear_if_matches(&mut slot, "REP@ACME.TEST"), 1);
        assert!(slot.is_none());

        let mut other = Some("other@acme.test".to_string());
        assert_eq!(clear_if_matches(&mut other, "rep@acme.test"), 0);
        assert!(other.is_some());
    }

    #[test]
    fn test_push_ref_skips_empty() {
        let mut refs = Vec::new();
        push_ref(&mut refs, "coordinator", &None, RefPolicy::SetNull);
        assert!(refs.is_empty());

        push_ref(
            &mut refs,
            "coordinator",
            &Some("rep@acme.test".to_string()),
            RefPolicy::SetNull,
        );
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].field, "coordinator");
    }
}
