use serde::Serialize;

use crate::binding::RecordStore;
use crate::engine::DocId;

/// Output of a bind: raw ids when no store was given, otherwise one slot per
/// id holding the store's record (or `None` when the store has no entry).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SearchResults<R> {
    Ids(Vec<DocId>),
    Records(Vec<Option<R>>),
}

impl<R> SearchResults<R> {
    pub fn len(&self) -> usize {
        match self {
            SearchResults::Ids(ids) => ids.len(),
            SearchResults::Records(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ids(&self) -> Option<&[DocId]> {
        match self {
            SearchResults::Ids(ids) => Some(ids),
            SearchResults::Records(_) => None,
        }
    }

    pub fn records(&self) -> Option<&[Option<R>]> {
        match self {
            SearchResults::Ids(_) => None,
            SearchResults::Records(records) => Some(records),
        }
    }
}

/// Map ids through the store, keeping positions for ids the store lacks
pub(crate) fn project<R: Clone>(ids: &[DocId], store: Option<&RecordStore<R>>) -> SearchResults<R> {
    match store {
        Some(store) => SearchResults::Records(ids.iter().map(|id| store.get(id).cloned()).collect()),
        None => SearchResults::Ids(ids.to_vec()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projection_keeps_positions() {
        let store: RecordStore<&str> = [(1u64, "one"), (3u64, "three")].into_iter().collect();
        let ids = vec![DocId::Number(3), DocId::Number(2), DocId::Number(1)];

        let results = project(&ids, Some(&store));
        assert_eq!(
            results,
            SearchResults::Records(vec![Some("three"), None, Some("one")])
        );
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn test_without_store_returns_ids() {
        let ids = vec![DocId::from("b"), DocId::from("a")];
        let results = project::<()>(&ids, None);
        assert_eq!(results.ids(), Some(ids.as_slice()));
        assert!(results.records().is_none());
    }

    #[test]
    fn test_serializes_as_plain_array() {
        let results: SearchResults<&str> = SearchResults::Records(vec![Some("a"), None]);
        assert_eq!(serde_json::to_string(&results).unwrap(), r#"["a",null]"#);
    }
}
