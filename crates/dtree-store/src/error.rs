//! Error types for the discussion service and its stores

use dtree_core::{DiscussionId, TreeError};

/// Discussion service and store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Referenced record does not exist
    #[error("{entity} {id} not found")]
    NotFound {
        /// Record kind (`user`, `discussion`, `operation`)
        entity: &'static str,
        /// Requested identifier
        id: u64,
    },

    /// Payload or query rejected
    #[error("validation failed: {0}")]
    Validation(String),

    /// Discussion no longer accepts operations
    #[error("discussion {0} has ended")]
    DiscussionEnded(DiscussionId),

    /// Discussion was already ended
    #[error("discussion {0} already ended")]
    AlreadyEnded(DiscussionId),

    /// Tree build or strict valuation failed
    #[error("tree error: {0}")]
    Tree(#[from] TreeError),

    /// Service configuration is inconsistent
    #[error("invalid configuration for {setting}: {message}")]
    InvalidConfig {
        /// Offending setting
        setting: &'static str,
        /// What is wrong with it
        message: String,
    },

    /// Underlying storage failed
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Shorthand for a missing record
    #[inline]
    #[must_use]
    pub fn not_found(entity: &'static str, id: impl Into<u64>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Shorthand for a rejected payload
    #[inline]
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Check if the error is a missing record
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if the caller can fix the error by changing the request
    #[inline]
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            Self::Backend(_) | Self::Tree(_) | Self::InvalidConfig { .. }
        )
    }
}
