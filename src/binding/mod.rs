//! # Binding Module
//!
//! [`SearchBinding`] keeps a search result in step with its inputs: a query,
//! an index source, an optional record store and engine options.
//!
//! Two pieces of state are memoized:
//!
//! - the resolved index, keyed only on the identity of the [`IndexSource`]
//! - the raw id list, keyed on the query, the resolved index and the options
//!
//! The store is applied on every call, so swapping it never triggers a new
//! search.
//!
//! A missing index is a [`ConfigurationError`]. A missing store is not: the
//! binding logs a [`Diagnostic`] and returns raw ids.

pub mod diagnostics;
pub mod results;
pub mod source;
pub mod store;

use std::sync::Arc;

pub use diagnostics::Diagnostic;
pub use results::SearchResults;
pub use source::IndexSource;
pub use store::RecordStore;

use crate::engine::{DocId, SearchEngine, SearchIndex, SearchOptions};
use crate::error::{BindingError, ConfigurationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingState {
    Unresolved,
    Resolved,
}

struct ResolvedIndex<E: SearchEngine> {
    source: IndexSource<E>,
    index: Arc<E::Index>,
}

struct DiagnosedInputs<E: SearchEngine, R> {
    source: Option<IndexSource<E>>,
    store: Option<RecordStore<R>>,
}

struct SearchMemo<E: SearchEngine> {
    query: String,
    index: Arc<E::Index>,
    options: SearchOptions,
    ids: Vec<DocId>,
}

impl<E: SearchEngine> SearchMemo<E> {
    fn matches(&self, query: &str, index: &Arc<E::Index>, options: &SearchOptions) -> bool {
        self.query == query && Arc::ptr_eq(&self.index, index) && self.options == *options
    }
}

/// Memoized search over an engine index and an optional record store
pub struct SearchBinding<E: SearchEngine, R> {
    engine: E,
    resolved: Option<ResolvedIndex<E>>,
    diagnosed: Option<DiagnosedInputs<E, R>>,
    memo: Option<SearchMemo<E>>,
    last_diagnostic: Option<Diagnostic>,
}

impl<E: SearchEngine, R: Clone> SearchBinding<E, R> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            resolved: None,
            diagnosed: None,
            memo: None,
            last_diagnostic: None,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn state(&self) -> BindingState {
        if self.resolved.is_some() {
            BindingState::Resolved
        } else {
            BindingState::Unresolved
        }
    }

    /// The index searches currently run against
    pub fn resolved_index(&self) -> Option<&Arc<E::Index>> {
        self.resolved.as_ref().map(|resolved| &resolved.index)
    }

    /// Warning raised by the most recent change of index or store, if any
    pub fn last_diagnostic(&self) -> Option<&Diagnostic> {
        self.last_diagnostic.as_ref()
    }

    /// Produce results for the current inputs, reusing whatever is still valid
    /// from the previous call.
    pub fn bind(
        &mut self,
        query: Option<&str>,
        source: Option<&IndexSource<E>>,
        store: Option<&RecordStore<R>>,
        options: Option<&SearchOptions>,
    ) -> Result<SearchResults<R>, BindingError> {
        self.diagnose(source, store);

        let index = self.resolve(source)?;

        let query = match query {
            Some(query) if !query.is_empty() => query,
            _ => return Ok(results::project(&[], store)),
        };

        let default_options = SearchOptions::default();
        let options = options.unwrap_or(&default_options);

        let ids = self.search(query, index, options)?;
        Ok(results::project(ids, store))
    }

    fn diagnose(&mut self, source: Option<&IndexSource<E>>, store: Option<&RecordStore<R>>) {
        if let Some(previous) = &self.diagnosed {
            let same_store = match (&previous.store, store) {
                (None, None) => true,
                (Some(a), Some(b)) => a.ptr_eq(b),
                _ => false,
            };
            if same_store && source::same_input(previous.source.as_ref(), source) {
                return;
            }
        }

        self.diagnosed = Some(DiagnosedInputs {
            source: source.cloned(),
            store: store.cloned(),
        });

        self.last_diagnostic =
            Diagnostic::for_inputs(self.engine.name(), source.is_some(), store.is_some());
        if let Some(diagnostic) = &self.last_diagnostic {
            tracing::warn!("{}", diagnostic);
        }
    }

    fn resolve(&mut self, source: Option<&IndexSource<E>>) -> Result<Arc<E::Index>, BindingError> {
        let Some(source) = source else {
            self.resolved = None;
            self.memo = None;
            return Err(ConfigurationError::MissingIndex {
                engine: self.engine.name().to_string(),
            }
            .into());
        };

        if let Some(resolved) = &self.resolved {
            if resolved.source.same_source(source) {
                return Ok(Arc::clone(&resolved.index));
            }
        }

        // The old index is dropped before importing so a failed import leaves
        // the binding unresolved rather than pointing at stale data
        self.resolved = None;
        tracing::debug!("Resolving {} {} index", self.engine.name(), source.kind());

        let index = match source {
            IndexSource::Instance(index) => Arc::clone(index),
            IndexSource::Exported(export) => {
                let mut index = self.engine.create_empty()?;
                self.engine.import(&mut index, export)?;
                Arc::new(index)
            }
        };

        self.resolved = Some(ResolvedIndex {
            source: source.clone(),
            index: Arc::clone(&index),
        });
        Ok(index)
    }

    fn search(
        &mut self,
        query: &str,
        index: Arc<E::Index>,
        options: &SearchOptions,
    ) -> Result<&[DocId], BindingError> {
        let fresh = match &self.memo {
            Some(memo) => !memo.matches(query, &index, options),
            None => true,
        };

        if fresh {
            tracing::debug!("Searching {} for {:?}", self.engine.name(), query);
            let ids = index.search(query, options)?.into_ids();
            self.memo = Some(SearchMemo {
                query: query.to_string(),
                index,
                options: options.clone(),
                ids,
            });
        } else {
            tracing::trace!("Reusing results for {:?}", query);
        }

        Ok(self.memo.as_ref().map(|memo| memo.ids.as_slice()).unwrap_or(&[]))
    }
}

/// Bind once with a fresh binding. Same contract as [`SearchBinding::bind`].
pub fn search_once<E: SearchEngine, R: Clone>(
    engine: E,
    query: Option<&str>,
    source: Option<&IndexSource<E>>,
    store: Option<&RecordStore<R>>,
    options: Option<&SearchOptions>,
) -> Result<SearchResults<R>, BindingError> {
    SearchBinding::new(engine).bind(query, source, store, options)
}
