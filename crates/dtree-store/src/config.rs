//! Discussion service configuration

use crate::error::StoreError;
use dtree_core::TreeConfig;
use serde::{Deserialize, Serialize};

/// Discussion service configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Page size when a query omits one
    pub default_page_size: u32,
    /// Upper bound applied to requested page sizes
    pub max_page_size: u32,
    /// Longest accepted discussion title, in characters
    pub max_title_len: usize,
    /// Tree build and valuation policies
    pub tree: TreeConfig,
}

impl ServiceConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With default and maximum page sizes
    #[inline]
    #[must_use]
    pub fn with_page_sizes(mut self, default: u32, max: u32) -> Self {
        self.default_page_size = default;
        self.max_page_size = max;
        self
    }

    /// With tree configuration
    #[inline]
    #[must_use]
    pub fn with_tree(mut self, tree: TreeConfig) -> Self {
        self.tree = tree;
        self
    }

    /// Check internal consistency
    ///
    /// # Errors
    /// [`StoreError::InvalidConfig`] naming the first inconsistent setting.
    pub fn validate(&self) -> Result<(), StoreError> {
        let invalid = |setting, message: String| StoreError::InvalidConfig { setting, message };

        if self.max_page_size == 0 {
            return Err(invalid("max_page_size", "must be positive".to_string()));
        }
        if self.default_page_size == 0 || self.default_page_size > self.max_page_size {
            return Err(invalid(
                "default_page_size",
                format!("must be between 1 and max_page_size ({})", self.max_page_size),
            ));
        }
        if self.max_title_len == 0 {
            return Err(invalid("max_title_len", "must be positive".to_string()));
        }
        Ok(())
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            default_page_size: 10,
            max_page_size: 100,
            max_title_len: 200,
            tree: TreeConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(ServiceConfig::default().validate().is_ok());
    }

    #[test]
    fn default_page_size_cannot_exceed_max() {
        let config = ServiceConfig::new().with_page_sizes(50, 20);
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            StoreError::InvalidConfig {
                setting: "default_page_size",
                ..
            }
        ));
        assert!(!err.is_client_error());
    }
}
