use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::EXPORT_FORMAT_VERSION;
use crate::engine::DocId;

/// One stored document in an exported snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedDocument {
    pub id: DocId,
    pub body: String,
}

/// Serializable snapshot of a [`crate::engine::TextIndex`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedIndex {
    pub format_version: u32,
    pub documents: Vec<ExportedDocument>,
}

impl ExportedIndex {
    pub fn new(documents: Vec<ExportedDocument>) -> Self {
        Self {
            format_version: EXPORT_FORMAT_VERSION,
            documents,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context("Failed to serialize exported index")
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub(crate) fn check_version(&self) -> Result<()> {
        if self.format_version != EXPORT_FORMAT_VERSION {
            return Err(anyhow::anyhow!(
                "Unsupported export format version {} (expected {})",
                self.format_version,
                EXPORT_FORMAT_VERSION
            ));
        }
        Ok(())
    }
}

impl FromStr for ExportedIndex {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let export: Self = serde_json::from_str(s).context("Failed to parse exported index")?;
        export.check_version()?;
        Ok(export)
    }
}
