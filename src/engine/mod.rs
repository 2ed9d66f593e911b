//! # Engine Module
//!
//! The capability a full-text engine must offer for a [`crate::SearchBinding`]
//! to drive it, plus a tantivy-backed implementation of that capability.
//!
//! ## Key Components
//!
//! - [`SearchEngine`] - creates empty indexes and imports exported ones
//! - [`SearchIndex`] - runs a query against a live index
//! - [`indexer`] - tantivy index construction and export
//! - [`searcher`] - tantivy query execution
//! - [`export`] - the exported snapshot type

pub mod export;
pub mod indexer;
pub mod searcher;

use std::fmt;

use anyhow::Result;
use serde::{Deserialize, Serialize};

pub use export::{ExportedDocument, ExportedIndex};
pub use indexer::{IndexStats, TantivyEngine, TextIndex};

/// Identifier of an indexed document, as handed back by a search
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocId {
    Number(u64),
    Text(String),
}

impl From<u64> for DocId {
    fn from(value: u64) -> Self {
        DocId::Number(value)
    }
}

impl From<u32> for DocId {
    fn from(value: u32) -> Self {
        DocId::Number(value.into())
    }
}

impl From<&str> for DocId {
    fn from(value: &str) -> Self {
        DocId::Text(value.to_string())
    }
}

impl From<String> for DocId {
    fn from(value: String) -> Self {
        DocId::Text(value)
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocId::Number(n) => write!(f, "{n}"),
            DocId::Text(s) => f.write_str(s),
        }
    }
}

/// Options forwarded untouched to [`SearchIndex::search`].
///
/// The binding only compares them for equality; their meaning belongs to the
/// engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    /// Maximum number of ids to return
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    /// Number of leading hits to skip
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
    /// Edit distance for typo tolerant matching
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuzzy: Option<u8>,
    /// Ask for the paged envelope shape instead of a flat id list
    pub paginate: bool,
}

impl SearchOptions {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }
}

/// A page of ids plus the cursor to the next one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultEnvelope {
    pub result: Vec<DocId>,
    #[serde(default)]
    pub total: Option<usize>,
    #[serde(default)]
    pub next: Option<usize>,
}

/// What an engine hands back from a search: a flat id sequence or an
/// envelope carrying one in `result`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SearchOutput {
    Ids(Vec<DocId>),
    Envelope(ResultEnvelope),
}

impl SearchOutput {
    /// Extract the id sequence regardless of shape
    pub fn into_ids(self) -> Vec<DocId> {
        match self {
            SearchOutput::Ids(ids) => ids,
            SearchOutput::Envelope(envelope) => envelope.result,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            SearchOutput::Ids(ids) => ids.len(),
            SearchOutput::Envelope(envelope) => envelope.result.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Vec<DocId>> for SearchOutput {
    fn from(ids: Vec<DocId>) -> Self {
        SearchOutput::Ids(ids)
    }
}

/// A live, queryable index
pub trait SearchIndex {
    fn search(&self, query: &str, options: &SearchOptions) -> Result<SearchOutput>;
}

/// Factory side of a full-text engine.
///
/// `Export` is whatever serializable form the engine can rebuild an index
/// from.
pub trait SearchEngine {
    type Index: SearchIndex;
    type Export;

    /// Name used in diagnostics and errors
    fn name(&self) -> &str;

    fn create_empty(&self) -> Result<Self::Index>;

    /// Load `export` into `index`, which was produced by [`Self::create_empty`]
    fn import(&self, index: &mut Self::Index, export: &Self::Export) -> Result<()>;
}
