//! Transition guard for status-bearing records
//!
//! Status fields in the domain have no enforced state machine: any state is
//! reachable from any other by direct write. That behaviour is preserved as
//! the default `Permissive` policy, but every status write goes through this
//! guard so the policy can be tightened (per project config) without touching
//! call sites. Each status enum declares its natural forward graph for the
//! `Enforced` policy.

use thiserror::Error;

use crate::core::Config;

/// A closed set of record states with a declared default and forward graph
pub trait StatusCycle: Sized + Copy + PartialEq + std::fmt::Display + 'static {
    /// All states, earliest (the default) first
    fn all() -> &'static [Self];

    /// States reachable from `self` under the enforced policy
    fn forward(&self) -> &'static [Self];
}

/// Transition validation policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionPolicy {
    /// Any state reachable from any other (the inherited behaviour)
    #[default]
    Permissive,
    /// Only the declared forward graph is legal
    Enforced,
}

impl TransitionPolicy {
    /// Read the policy from project configuration
    pub fn from_config(config: &Config) -> Self {
        if config.enforce_transitions() {
            TransitionPolicy::Enforced
        } else {
            TransitionPolicy::Permissive
        }
    }

    /// Check a status transition against this policy
    pub fn check<S: StatusCycle + 'static>(&self, from: S, to: S) -> Result<(), LifecycleError> {
        match self {
            TransitionPolicy::Permissive => Ok(()),
            TransitionPolicy::Enforced => {
                if from == to || from.forward().contains(&to) {
                    Ok(())
                } else {
                    Err(LifecycleError::InvalidTransition {
                        from: from.to_string(),
                        to: to.to_string(),
                    })
                }
            }
        }
    }
}

/// Errors from transition validation
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("invalid status transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("unknown status '{value}' for {record_type} (valid: {valid})")]
    UnknownStatus {
        record_type: String,
        value: String,
        valid: String,
    },
}

/// Parse a status value against a cycle, with a helpful error
pub fn parse_status<S: StatusCycle + 'static>(
    record_type: &str,
    value: &str,
) -> Result<S, LifecycleError> {
    S::all()
        .iter()
        .find(|s| s.to_string().eq_ignore_ascii_case(value))
        .copied()
        .ok_or_else(|| LifecycleError::UnknownStatus {
            record_type: record_type.to_string(),
            value: value.to_string(),
            valid: S::all()
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join(", "),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Phase {
        Open,
        Working,
        Closed,
    }

    impl std::fmt::Display for Phase {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Phase::Open => write!(f, "open"),
                Phase::Working => write!(f, "working"),
                Phase::Closed => write!(f, "closed"),
            }
        }
    }

    impl StatusCycle for Phase {
        fn all() -> &'static [Self] {
            &[Phase::Open, Phase::Working, Phase::Closed]
        }

        fn forward(&self) -> &'static [Self] {
            match self {
                Phase::Open => &[Phase::Working, Phase::Closed],
                Phase::Working => &[Phase::Closed],
                Phase::Closed => &[],
            }
        }
    }

    #[test]
    fn test_permissive_allows_everything() {
        let policy = TransitionPolicy::Permissive;
        // Including reopening a closed record
        assert!(policy.check(Phase::Closed, Phase::Open).is_ok());
        assert!(policy.check(Phase::Open, Phase::Closed).is_ok());
        assert!(policy.check(Phase::Working, Phase::Working).is_ok());
    }

    #[test]
    fn test_enforced_follows_forward_graph() {
        let policy = TransitionPolicy::Enforced;
        assert!(policy.check(Phase::Open, Phase::Working).is_ok());
        assert!(policy.check(Phase::Working, Phase::Closed).is_ok());
        assert!(policy.check(Phase::Closed, Phase::Open).is_err());
    }

    #[test]
    fn test_enforced_allows_self_transition() {
        let policy = TransitionPolicy::Enforced;
        assert!(policy.check(Phase::Closed, Phase::Closed).is_ok());
    }

    #[test]
    fn test_parse_status() {
        let phase: Phase = parse_status("test", "WORKING").unwrap();
        assert_eq!(phase, Phase::Working);

        let err = parse_status::<Phase>("test", "bogus").unwrap_err();
        assert!(matches!(err, LifecycleError::UnknownStatus { .. }));
    }

    #[test]
    fn test_default_policy_is_permissive() {
        assert_eq!(TransitionPolicy::default(), TransitionPolicy::Permissive);
    }
}
