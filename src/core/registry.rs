//! Static list-surface registry
//!
//! One enumerated table declares, per record type, the list columns, filter
//! fields, search fields and inline child collections. Every `list`
//! subcommand renders from this table; nothing is discovered by runtime
//! introspection.

use crate::core::identity::EntityPrefix;

/// Column/filter/search/inline declaration for one record type
#[derive(Debug, Clone, Copy)]
pub struct ListSpec {
    pub prefix: EntityPrefix,
    /// Columns shown by `list`, in order
    pub columns: &'static [&'static str],
    /// Fields accepted by `--filter field=value`
    pub filters: &'static [&'static str],
    /// Fields scanned by `--search`
    pub search: &'static [&'static str],
    /// Embedded child collections edited inline with the parent
    pub inlines: &'static [&'static str],
}

/// Per-record column access for registry-driven rendering
pub trait Tabular {
    /// Render the value for a declared column; unknown columns render empty
    fn cell(&self, column: &str) -> String;
}

/// The full list-surface table, one entry per record type
pub const REGISTRY: &[ListSpec] = &[
    ListSpec {
        prefix: EntityPrefix::Org,
        columns: &["name", "email", "address", "tin_number", "region", "phone", "sector"],
        filters: &["status", "region", "sector"],
        search: &["name", "email", "tin_number"],
        inlines: &["locations", "departments"],
    },
    ListSpec {
        prefix: EntityPrefix::Stk,
        columns: &["name", "category", "contact_person", "contact_info", "created_by", "created"],
        filters: &["category"],
        search: &["name", "contact_person", "relevance_to_qms"],
        inlines: &["requirements"],
    },
    ListSpec {
        prefix: EntityPrefix::Emp,
        columns: &["organisation", "name", "designation", "role"],
        filters: &["role", "designation"],
        search: &["name", "designation", "email"],
        inlines: &[],
    },
    ListSpec {
        prefix: EntityPrefix::Lead,
        columns: &["title", "commitment_type", "leader", "effective_date", "expiry_date", "is_active"],
        filters: &["commitment_type", "is_active"],
        search: &["title", "summary", "leader"],
        inlines: &[
            "accountabilities",
            "objectives",
            "actions",
            "communications",
            "reviews",
            "attachments",
        ],
    },
    ListSpec {
        prefix: EntityPrefix::Qpol,
        columns: &["title", "developed_by", "approved_by", "effective_date", "is_active"],
        filters: &["is_active"],
        search: &["title", "content"],
        inlines: &["communications", "evidences"],
    },
    ListSpec {
        prefix: EntityPrefix::Risk,
        columns: &["title", "identified_by", "identified_date", "likelihood", "impact", "score", "status"],
        filters: &["status"],
        search: &["title", "description"],
        inlines: &[],
    },
    ListSpec {
        prefix: EntityPrefix::Opp,
        columns: &["title", "identified_by", "identified_date", "benefit", "feasibility", "score", "status"],
        filters: &["status"],
        search: &["title", "description"],
        inlines: &[],
    },
    ListSpec {
        prefix: EntityPrefix::Resp,
        columns: &["response_type", "owner", "status", "due_date", "risk", "opportunity"],
        filters: &["response_type", "status"],
        search: &["description"],
        inlines: &[],
    },
    ListSpec {
        prefix: EntityPrefix::Chg,
        columns: &["title", "requested_by", "department", "status", "planned_date", "approved_by", "implemented_by"],
        filters: &["status", "department"],
        search: &["title", "description", "department"],
        inlines: &["control_records"],
    },
    ListSpec {
        prefix: EntityPrefix::Sop,
        columns: &["title", "department", "created_by", "created", "is_active"],
        filters: &["department", "is_active"],
        search: &["title", "description"],
        inlines: &[],
    },
    ListSpec {
        prefix: EntityPrefix::Ctr,
        columns: &["customer_name", "contract_number", "department", "reviewed_by", "review_date"],
        filters: &["department"],
        search: &["customer_name", "contract_number", "findings"],
        inlines: &[],
    },
    ListSpec {
        prefix: EntityPrefix::Dsn,
        columns: &["title", "department", "owner", "start_date", "planned_end_date", "status"],
        filters: &["department", "status"],
        search: &["title", "notes"],
        inlines: &["records"],
    },
    ListSpec {
        prefix: EntityPrefix::Sup,
        columns: &["name", "supplier_type", "evaluation_date", "evaluator"],
        filters: &["supplier_type"],
        search: &["name", "contact_person", "evaluation_result"],
        inlines: &[],
    },
    ListSpec {
        prefix: EntityPrefix::Svc,
        columns: &["title", "service_provider", "service_date", "compliance_with_requirements"],
        filters: &["compliance_with_requirements"],
        search: &["title", "description"],
        inlines: &[],
    },
    ListSpec {
        prefix: EntityPrefix::Rel,
        columns: &["product_name", "release_date", "approved_by", "status"],
        filters: &["status"],
        search: &["product_name", "description"],
        inlines: &[],
    },
    ListSpec {
        prefix: EntityPrefix::Ncr,
        columns: &["title", "reported_by", "department", "detected_date", "status"],
        filters: &["department", "status"],
        search: &["title", "description", "corrective_action_taken"],
        inlines: &[],
    },
    ListSpec {
        prefix: EntityPrefix::Res,
        columns: &["title", "resource_type", "responsible", "planned_date", "status"],
        filters: &["resource_type", "status"],
        search: &["title", "description"],
        inlines: &[],
    },
    ListSpec {
        prefix: EntityPrefix::Trn,
        columns: &["title", "employee", "training_type", "date_conducted", "trainer"],
        filters: &["training_type"],
        search: &["title", "training_type", "trainer"],
        inlines: &[],
    },
    ListSpec {
        prefix: EntityPrefix::Awr,
        columns: &["title", "method", "date", "communicator"],
        filters: &["method"],
        search: &["title", "method", "target_audience"],
        inlines: &[],
    },
    ListSpec {
        prefix: EntityPrefix::Com,
        columns: &["title", "method", "responsible_person", "start_date", "frequency"],
        filters: &["method", "frequency"],
        search: &["title", "method", "audience"],
        inlines: &[],
    },
    ListSpec {
        prefix: EntityPrefix::Doc,
        columns: &["title", "document_type", "version", "responsible_person", "issue_date"],
        filters: &["document_type"],
        search: &["title", "document_type"],
        inlines: &[],
    },
];

/// Look up the list spec for a record type
pub fn spec_for(prefix: EntityPrefix) -> &'static ListSpec {
    REGISTRY
        .iter()
        .find(|s| s.prefix == prefix)
        .unwrap_or(&REGISTRY[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_covers_every_prefix() {
        for prefix in EntityPrefix::all() {
            assert!(
                REGISTRY.iter().any(|s| s.prefix == *prefix),
                "missing registry entry for {}",
                prefix
            );
        }
        assert_eq!(REGISTRY.len(), EntityPrefix::all().len());
    }

    #[test]
    fn test_spec_for_returns_declared_columns() {
        let spec = spec_for(EntityPrefix::Risk);
        assert!(spec.columns.contains(&"score"));
        assert!(spec.search.contains(&"description"));

        let spec = spec_for(EntityPrefix::Org);
        assert_eq!(spec.inlines, &["locations", "departments"]);
    }

    #[test]
    fn test_no_duplicate_entries() {
        for (i, spec) in REGISTRY.iter().enumerate() {
            assert!(
                !REGISTRY[i + 1..].iter().any(|s| s.prefix == spec.prefix),
                "duplicate registry entry for {}",
                spec.prefix
            );
        }
    }
}
