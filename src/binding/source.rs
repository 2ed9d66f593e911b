use std::fmt;
use std::sync::Arc;

use crate::engine::SearchEngine;

/// Where a binding gets its index from: a live instance, or an exported form
/// the engine can import.
pub enum IndexSource<E: SearchEngine> {
    Instance(Arc<E::Index>),
    Exported(Arc<E::Export>),
}

impl<E: SearchEngine> IndexSource<E> {
    pub fn instance(index: E::Index) -> Self {
        IndexSource::Instance(Arc::new(index))
    }

    pub fn exported(export: E::Export) -> Self {
        IndexSource::Exported(Arc::new(export))
    }

    /// True when both point at the same allocation
    pub fn same_source(&self, other: &Self) -> bool {
        match (self, other) {
            (IndexSource::Instance(a), IndexSource::Instance(b)) => Arc::ptr_eq(a, b),
            (IndexSource::Exported(a), IndexSource::Exported(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            IndexSource::Instance(_) => "instance",
            IndexSource::Exported(_) => "exported",
        }
    }
}

impl<E: SearchEngine> Clone for IndexSource<E> {
    fn clone(&self) -> Self {
        match self {
            IndexSource::Instance(index) => IndexSource::Instance(Arc::clone(index)),
            IndexSource::Exported(export) => IndexSource::Exported(Arc::clone(export)),
        }
    }
}

impl<E: SearchEngine> fmt::Debug for IndexSource<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexSource::Instance(index) => f
                .debug_tuple("Instance")
                .field(&Arc::as_ptr(index))
                .finish(),
            IndexSource::Exported(export) => f
                .debug_tuple("Exported")
                .field(&Arc::as_ptr(export))
                .finish(),
        }
    }
}

pub(crate) fn same_input<E: SearchEngine>(
    previous: Option<&IndexSource<E>>,
    current: Option<&IndexSource<E>>,
) -> bool {
    match (previous, current) {
        (None, None) => true,
        (Some(a), Some(b)) => a.same_source(b),
        _ => false,
    }
}
