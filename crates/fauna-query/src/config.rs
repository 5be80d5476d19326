//! Set iteration configuration

use fauna_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Page size used when none is configured
pub const DEFAULT_PAGE_SIZE: usize = 64;

/// Largest page the database will return
pub const MAX_PAGE_SIZE: usize = 100_000;

/// Configuration for a set iterator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IteratorConfig {
    /// Elements requested per fetch
    pub page_size: usize,
}

impl Default for IteratorConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl IteratorConfig {
    /// Create a configuration with the default page size
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set page size
    pub fn page_size(mut self, size: usize) -> Self {
        self.page_size = size;
        self
    }

    /// Check that the page size is within `1..=MAX_PAGE_SIZE`
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(Error::Configuration(format!(
                "page_size must be between 1 and {}, got {}",
                MAX_PAGE_SIZE, self.page_size
            )));
        }
        Ok(())
    }
}
