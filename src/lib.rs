//! Keeps full-text search results in step with a query, an index and an
//! optional record store.
//!
//! The engine itself sits behind [`engine::SearchEngine`]; [`engine::TantivyEngine`]
//! is the bundled implementation.

pub mod binding;
pub mod config;
pub mod engine;
pub mod error;

pub use binding::{
    BindingState, Diagnostic, IndexSource, RecordStore, SearchBinding, SearchResults, search_once,
};
pub use config::EngineConfig;
pub use engine::{DocId, SearchEngine, SearchIndex, SearchOptions, SearchOutput, TantivyEngine};
pub use error::{BindingError, ConfigurationError};
