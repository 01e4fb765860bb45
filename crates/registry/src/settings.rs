//! Resolver settings.
//!
//! Defaults reproduce the plain map semantics: a later provider for the same
//! saga type replaces the earlier one, and an empty discovery only warns.
//! Both can be tightened per deployment through the environment:
//!
//! | variable                    | values                       | default           |
//! |-----------------------------|------------------------------|-------------------|
//! | `SAGAFLOW_DUPLICATE_POLICY` | `last_write_wins`, `reject`  | `last_write_wins` |
//! | `SAGAFLOW_FAIL_ON_EMPTY`    | `true`, `false`              | `false`           |

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use sagaflow_core::{DomainError, DomainResult};

/// What to do when a second provider claims an already registered saga type.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Replace the earlier registration (logged as a warning).
    #[default]
    LastWriteWins,
    /// Fail with a configuration error.
    Reject,
}

impl FromStr for DuplicatePolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "last_write_wins" => Ok(Self::LastWriteWins),
            "reject" => Ok(Self::Reject),
            _ => Err(DomainError::validation(format!(
                "unknown duplicate policy '{s}' (expected last_write_wins or reject)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverSettings {
    pub duplicate_policy: DuplicatePolicy,
    /// Treat an empty discovery as fatal instead of warning.
    pub fail_on_empty: bool,
}

impl ResolverSettings {
    pub const DUPLICATE_POLICY_VAR: &'static str = "SAGAFLOW_DUPLICATE_POLICY";
    pub const FAIL_ON_EMPTY_VAR: &'static str = "SAGAFLOW_FAIL_ON_EMPTY";

    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }

    pub fn with_fail_on_empty(mut self, fail_on_empty: bool) -> Self {
        self.fail_on_empty = fail_on_empty;
        self
    }

    /// Read settings from the process environment.
    pub fn from_env() -> DomainResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary key lookup; unset keys keep defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> DomainResult<Self> {
        let mut settings = Self::default();

        if let Some(raw) = lookup(Self::DUPLICATE_POLICY_VAR) {
            settings.duplicate_policy = raw.parse()?;
        }
        if let Some(raw) = lookup(Self::FAIL_ON_EMPTY_VAR) {
            settings.fail_on_empty = parse_flag(Self::FAIL_ON_EMPTY_VAR, &raw)?;
        }

        Ok(settings)
    }
}

fn parse_flag(key: &str, raw: &str) -> DomainResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(DomainError::validation(format!(
            "{key}: expected a boolean, found '{raw}'"
        ))),
    }
}
