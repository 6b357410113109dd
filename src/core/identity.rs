//! Record identity system using type-prefixed ULIDs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use ulid::Ulid;

/// Record type prefixes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntityPrefix {
    /// Organisation
    Org,
    /// Stakeholder
    Stk,
    /// Employee
    Emp,
    /// Leadership commitment
    Lead,
    /// Quality policy
    Qpol,
    /// Risk
    Risk,
    /// Opportunity
    Opp,
    /// Risk/opportunity response
    Resp,
    /// QMS change
    Chg,
    /// Standard operating procedure
    Sop,
    /// Contract review
    Ctr,
    /// Design project
    Dsn,
    /// Supplier evaluation
    Sup,
    /// Service report
    Svc,
    /// Product release
    Rel,
    /// Nonconformance record
    Ncr,
    /// Resource plan
    Res,
    /// Training record
    Trn,
    /// Awareness record
    Awr,
    /// Communication plan
    Com,
    /// Document register entry
    Doc,
}

impl EntityPrefix {
    /// Get the string representation of the prefix
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityPrefix::Org => "ORG",
            EntityPrefix::Stk => "STK",
            EntityPrefix::Emp => "EMP",
            EntityPrefix::Lead => "LEAD",
            EntityPrefix::Qpol => "QPOL",
            EntityPrefix::Risk => "RISK",
            EntityPrefix::Opp => "OPP",
            EntityPrefix::Resp => "RESP",
            EntityPrefix::Chg => "CHG",
            EntityPrefix::Sop => "SOP",
            EntityPrefix::Ctr => "CTR",
            EntityPrefix::Dsn => "DSN",
            EntityPrefix::Sup => "SUP",
            EntityPrefix::Svc => "SVC",
            EntityPrefix::Rel => "REL",
            EntityPrefix::Ncr => "NCR",
            EntityPrefix::Res => "RES",
            EntityPrefix::Trn => "TRN",
            EntityPrefix::Awr => "AWR",
            EntityPrefix::Com => "COM",
            EntityPrefix::Doc => "DOC",
        }
    }

    /// Get all valid prefixes
    pub fn all() -> &'static [EntityPrefix] {
        &[
            EntityPrefix::Org,
            EntityPrefix::Stk,
            EntityPrefix::Emp,
            EntityPrefix::Lead,
            EntityPrefix::Qpol,
            EntityPrefix::Risk,
            EntityPrefix::Opp,
            EntityPrefix::Resp,
            EntityPrefix::Chg,
            EntityPrefix::Sop,
            EntityPrefix::Ctr,
            EntityPrefix::Dsn,
            EntityPrefix::Sup,
            EntityPrefix::Svc,
            EntityPrefix::Rel,
            EntityPrefix::Ncr,
            EntityPrefix::Res,
            EntityPrefix::Trn,
            EntityPrefix::Awr,
            EntityPrefix::Com,
            EntityPrefix::Doc,
        ]
    }

}

impl fmt::Display for EntityPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityPrefix {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_uppercase();
        Self::all()
            .iter()
            .copied()
            .find(|prefix| prefix.as_str() == upper)
            .ok_or_else(|| IdParseError::InvalidPrefix(s.to_string()))
    }
}

/// A unique record identifier combining a type prefix and ULID
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityId {
    prefix: EntityPrefix,
    ulid: Ulid,
}

impl EntityId {
    /// Create a new EntityId with the given prefix
    pub fn new(prefix: EntityPrefix) -> Self {
        Self {
            prefix,
            ulid: Ulid::new(),
        }
    }

    /// Get the record prefix
    pub fn prefix(&self) -> EntityPrefix {
        self.prefix
    }

    /// Parse an EntityId from a string
    pub fn parse(s: &str) -> Result<Self, IdParseError> {
        s.parse()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.prefix, self.ulid)
    }
}

impl FromStr for EntityId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix_str, ulid_str) = s
            .split_once('-')
            .ok_or_else(|| IdParseError::MissingDelimiter(s.to_string()))?;

        let prefix = prefix_str.parse()?;
        let ulid = Ulid::from_string(ulid_str)
            .map_err(|e| IdParseError::InvalidUlid(ulid_str.to_string(), e.to_string()))?;

        Ok(Self { prefix, ulid })
    }
}

impl Serialize for EntityId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Errors that can occur when parsing record IDs
#[derive(Debug, Error)]
pub enum IdParseError {
    #[error("invalid record prefix: '{0}' (valid: ORG, STK, EMP, LEAD, QPOL, RISK, OPP, RESP, CHG, SOP, CTR, DSN, SUP, SVC, REL, NCR, RES, TRN, AWR, COM, DOC)")]
    InvalidPrefix(String),

    #[error("missing '-' delimiter in record ID: '{0}'")]
    MissingDelimiter(String),

    #[error("invalid ULID '{0}': {1}")]
    InvalidUlid(String, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_generation() {
        let id = EntityId::new(EntityPrefix::Org);
        assert!(id.to_string().starts_with("ORG-"));
        assert_eq!(id.to_string().len(), 30); // ORG- (4) + ULID (26) = 30
    }

    #[test]
    fn test_entity_id_parsing() {
        let original = EntityId::new(EntityPrefix::Risk);
        let id_str = original.to_string();
        let parsed = EntityId::parse(&id_str).unwrap();
        assert_eq!(parsed.prefix(), EntityPrefix::Risk);
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_entity_id_invalid_prefix() {
        let err = EntityId::parse("XXX-01HQ3K4N5M6P7R8S9T0UVWXYZ").unwrap_err();
        assert!(matches!(err, IdParseError::InvalidPrefix(_)));
    }

    #[test]
    fn test_entity_id_missing_delimiter() {
        let err = EntityId::parse("ORG01HQ3K4N5M6P7R8S9T0UVWXYZ").unwrap_err();
        assert!(matches!(err, IdParseError::MissingDelimiter(_)));
    }

    #[test]
    fn test_entity_id_invalid_ulid() {
        let err = EntityId::parse("ORG-notaulid").unwrap_err();
        assert!(matches!(err, IdParseError::InvalidUlid(_, _)));
    }

    #[test]
    fn test_all_prefixes_roundtrip() {
        for prefix in EntityPrefix::all() {
            let id = EntityId::new(*prefix);
            let parsed = EntityId::parse(&id.to_string()).unwrap();
            assert_eq!(parsed.prefix(), *prefix);
        }
    }

    #[test]
    fn test_prefix_parse_is_case_insensitive() {
        assert_eq!("risk".parse::<EntityPrefix>().unwrap(), EntityPrefix::Risk);
        assert_eq!("Qpol".parse::<EntityPrefix>().unwrap(), EntityPrefix::Qpol);
    }
}
