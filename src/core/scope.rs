//! Organisation visibility scoping
//!
//! The organisation and department listings are the only scoped surfaces.
//! Administrators see everything. Customers see the organisations they
//! represent, intersected with their membership organisation when one
//! exists; a customer who represents nothing sees their membership
//! organisation alone. The no-membership case is an explicit enum variant,
//! handled by the caller, never a swallowed lookup failure.

use crate::core::identity::EntityId;
use crate::core::users::User;
use crate::entities::organisation::{Organisation, OrganisationDepartment};

/// Result of the membership lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Membership {
    /// The user holds a membership in this organisation
    Organisation(EntityId),
    /// No membership record exists for the user
    None,
}

/// Resolve the user's membership organisation, if any.
/// Memberships are unique per (organisation, user); the first match wins.
pub fn membership_of(email: &str, organisations: &[Organisation]) -> Membership {
    for org in organisations {
        if org.has_member(email) {
            return Membership::Organisation(org.id.clone());
        }
    }
    Membership::None
}

/// Filter the organisations visible to a user
pub fn visible_organisations(user: &User, organisations: Vec<Organisation>) -> Vec<Organisation> {
    if user.is_superuser() {
        return organisations;
    }

    let membership = membership_of(&user.email, &organisations);

    let represented: Vec<Organisation> = organisations
        .iter()
        .filter(|o| o.is_representative(&user.email))
        .cloned()
        .collect();

    match membership {
        Membership::Organisation(member_org) => {
            if represented.is_empty() {
                // Representative of nothing: the membership organisation alone
                organisations
                    .into_iter()
                    .filter(|o| o.id == member_org)
                    .collect()
            } else {
                // Membership further restricts the represented set
                represented
                    .into_iter()
                    .filter(|o| o.id == member_org)
                    .collect()
            }
        }
        Membership::None => represented,
    }
}

/// Filter the departments visible to a user: those of visible organisations
pub fn visible_departments(
    user: &User,
    organisations: Vec<Organisation>,
) -> Vec<(Organisation, OrganisationDepartment)> {
    visible_organisations(user, organisations)
        .into_iter()
        .flat_map(|org| {
            org.departments
                .clone()
                .into_iter()
                .map(move |d| (org.clone(), d))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::users::AccountType;

    fn admin() -> User {
        let mut u = User::new("admin@acme.test".to_string(), "Admin".to_string());
        u.account_type = AccountType::Administrator;
        u
    }

    fn customer(email: &str) -> User {
        User::new(email.to_string(), "Customer".to_string())
    }

    fn org(name: &str) -> Organisation {
        Organisation::new(name.to_string(), "test".to_string())
    }

    #[test]
    fn test_superuser_sees_all() {
        let orgs = vec![org("Acme Ltd"), org("Globex")];
        let visible = visible_organisations(&admin(), orgs);
        assert_eq!(visible.len(), 2);
    }

    #[test]
    fn test_customer_sees_represented_organisation() {
        let mut a = org("Acme Ltd");
        a.representative = Some("rep@acme.test".to_string());
        let orgs = vec![a, org("Globex")];

        let visible = visible_organisations(&customer("rep@acme.test"), orgs);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].name, "Acme Ltd");
    }

    #[test]
    fn test_membership_restricts_represented_set() {
        let mut a = org("Acme Ltd");
        a.representative = Some("rep@acme.test".to_string());
        let mut b = org("Globex");
        b.representative = Some("rep@acme.test".to_string());
        b.add_member("rep@acme.test").unwrap();
        let orgs = vec![a, b];

        let visible = visible_organisations(&customer("rep@acme.test"), orgs);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].name, "Globex");
    }

    #[test]
    fn test_membership_alone_when_representative_of_nothing() {
        let mut b = org("Globex");
        b.add_member("staff@acme.test").unwrap();
        let orgs = vec![org("Acme Ltd"), b];

        let visible = visible_organisations(&customer("staff@acme.test"), orgs);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].name, "Globex");
    }

    #[test]
    fn test_no_membership_no_representation_sees_nothing() {
        let orgs = vec![org("Acme Ltd"), org("Globex")];
        let visible = visible_organisations(&customer("nobody@acme.test"), orgs);
        assert!(visible.is_empty());
    }

    #[test]
    fn test_membership_lookup_is_explicit() {
        let orgs = vec![org("Acme Ltd")];
        assert_eq!(membership_of("nobody@acme.test", &orgs), Membership::None);

        let mut b = org("Globex");
        b.add_member("staff@acme.test").unwrap();
        let id = b.id.clone();
        let orgs = vec![b];
        assert_eq!(
            membership_of("staff@acme.test", &orgs),
            Membership::Organisation(id)
        );
    }

    #[test]
    fn test_visible_departments_follow_organisations() {
        let mut a = org("Acme Ltd");
        a.representative = Some("rep@acme.test".to_string());
        a.departments.push(OrganisationDepartment {
            name: "Quality Assurance".to_string(),
            coordinator: None,
        });
        let mut b = org("Globex");
        b.departments.push(OrganisationDepartment {
            name: "Hidden".to_string(),
            coordinator: None,
        });
        let orgs = vec![a, b];

        let depts = visible_departments(&customer("rep@acme.test"), orgs.clone());
        assert_eq!(depts.len(), 1);
        assert_eq!(depts[0].1.name, "Quality Assurance");

        let all = visible_departments(&admin(), orgs);
        assert_eq!(all.len(), 2);
    }
}
