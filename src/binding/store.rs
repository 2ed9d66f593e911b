use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::engine::DocId;

/// Shared, read-only map from document id to record.
///
/// Clones share the same map; two stores are the same input only when they
/// point at the same allocation.
pub struct RecordStore<R> {
    records: Arc<HashMap<DocId, R>>,
}

impl<R> RecordStore<R> {
    pub fn new(records: HashMap<DocId, R>) -> Self {
        Self {
            records: Arc::new(records),
        }
    }

    pub fn get(&self, id: &DocId) -> Option<&R> {
        self.records.get(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Identity comparison, not content comparison
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.records, &other.records)
    }
}

impl<R> Clone for RecordStore<R> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
        }
    }
}

impl<R> From<HashMap<DocId, R>> for RecordStore<R> {
    fn from(records: HashMap<DocId, R>) -> Self {
        Self::new(records)
    }
}

impl<K: Into<DocId>, R> FromIterator<(K, R)> for RecordStore<R> {
    fn from_iter<T: IntoIterator<Item = (K, R)>>(iter: T) -> Self {
        Self::new(iter.into_iter().map(|(k, r)| (k.into(), r)).collect())
    }
}

impl<R> fmt::Debug for RecordStore<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordStore")
            .field("len", &self.records.len())
            .field("ptr", &Arc::as_ptr(&self.records))
            .finish()
    }
}
