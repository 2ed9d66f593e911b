//! # Configuration Module
//!
//! Provides configuration constants and the [`EngineConfig`] used by the
//! tantivy-backed engine.
//!
//! These constants control resource usage and the default shape of searches.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default buffer size for the Tantivy index writer (50MB)
pub const DEFAULT_BUFFER_SIZE: usize = 50_000_000;

/// Maximum buffer size for the Tantivy index writer (200MB)
pub const MAX_BUFFER_SIZE: usize = 200_000_000;

/// Default limit for search results when the options carry none
pub const DEFAULT_SEARCH_LIMIT: usize = 100;

/// Maximum allowed limit for search results
pub const MAX_SEARCH_LIMIT: usize = 1000;

/// Maximum allowed query length in characters
pub const MAX_QUERY_LENGTH: usize = 1000;

/// Maximum fuzzy distance allowed
pub const MAX_FUZZY_DISTANCE: u8 = 2;

/// Version stamped into every exported index snapshot
pub const EXPORT_FORMAT_VERSION: u32 = 1;

/// Tunables for [`crate::engine::TantivyEngine`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Memory budget handed to the index writer
    pub writer_buffer_size: usize,
    /// Limit applied when a search does not set one
    pub default_search_limit: usize,
    /// Upper bound accepted for an explicit limit
    pub max_search_limit: usize,
    /// Upper bound on query length, in characters
    pub max_query_length: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            writer_buffer_size: DEFAULT_BUFFER_SIZE,
            default_search_limit: DEFAULT_SEARCH_LIMIT,
            max_search_limit: MAX_SEARCH_LIMIT,
            max_query_length: MAX_QUERY_LENGTH,
        }
    }
}

impl EngineConfig {
    /// Parse a config from TOML text. Missing keys fall back to defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).context("Failed to parse engine config")?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read engine config: {}", path.display()))?;
        Self::from_toml_str(&text)
            .with_context(|| format!("Invalid engine config: {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.writer_buffer_size == 0 || self.writer_buffer_size > MAX_BUFFER_SIZE {
            return Err(anyhow::anyhow!(
                "writer_buffer_size must be between 1 and {MAX_BUFFER_SIZE}"
            ));
        }
        if self.max_search_limit == 0 {
            return Err(anyhow::anyhow!("max_search_limit must be greater than 0"));
        }
        if self.default_search_limit > self.max_search_limit {
            return Err(anyhow::anyhow!(
                "default_search_limit ({}) exceeds max_search_limit ({})",
                self.default_search_limit,
                self.max_search_limit
            ));
        }
        if self.max_query_length == 0 {
            return Err(anyhow::anyhow!("max_query_length must be greater than 0"));
        }
        Ok(())
    }
}
