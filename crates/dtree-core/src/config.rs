//! Tree build configuration

use serde::{Deserialize, Serialize};

/// What to do when two input records share an identifier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Fail the build with `TreeError::DuplicateId`
    #[default]
    Reject,
    /// Later record owns the identifier; children attach to it
    ///
    /// Every record still yields exactly one node: the earlier record stays
    /// in place with no children.
    LastWins,
}

/// What to do when a node's running total cannot be derived
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValuationPolicy {
    /// Mark the node and its subtree unavailable, keep going
    #[default]
    Degrade,
    /// Stop at the first failure and return it
    Abort,
}

/// Tree build configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Duplicate identifier handling
    pub duplicate_policy: DuplicatePolicy,
    /// Valuation failure handling
    pub valuation_policy: ValuationPolicy,
}

impl TreeConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With duplicate policy
    #[inline]
    #[must_use]
    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }

    /// With valuation policy
    #[inline]
    #[must_use]
    pub fn with_valuation_policy(mut self, policy: ValuationPolicy) -> Self {
        self.valuation_policy = policy;
        self
    }

    /// Strict configuration: reject duplicates, abort on numeric failure
    #[inline]
    #[must_use]
    pub fn strict() -> Self {
        Self {
            duplicate_policy: DuplicatePolicy::Reject,
            valuation_policy: ValuationPolicy::Abort,
        }
    }
}
