use anyhow::{Context, Result};
use serde::Serialize;
use tantivy::{
    DocAddress, Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term, doc,
    collector::Count,
    indexer::NoMergePolicy,
    query::{QueryParser, TermQuery},
    schema::{Field, IndexRecordOption, STORED, STRING, Schema, TEXT, Value},
};

use crate::config::EngineConfig;
use crate::engine::{DocId, ExportedDocument, ExportedIndex, SearchEngine};

/// In-memory Tantivy index of `(id, body)` documents
pub struct TextIndex {
    pub(crate) index: Index,
    pub(crate) reader: IndexReader,
    pub(crate) query_parser: QueryParser,
    pub(crate) fields: IndexFields,
    pub(crate) config: EngineConfig,
    writer: Option<IndexWriter>,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct IndexFields {
    pub(crate) id: Field,
    pub(crate) body: Field,
}

impl TextIndex {
    /// Create an empty index held entirely in RAM
    pub fn in_ram(config: &EngineConfig) -> Result<Self> {
        config.validate()?;

        let mut schema_builder = Schema::builder();
        // Ids are stored as their JSON form so numbers and strings stay distinct
        let id_field = schema_builder.add_text_field("id", STRING | STORED);
        let body_field = schema_builder.add_text_field("body", TEXT | STORED);
        let schema = schema_builder.build();

        let fields = IndexFields {
            id: id_field,
            body: body_field,
        };

        let index = Index::create_in_ram(schema);
        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .context("Failed to open index reader")?;
        let query_parser = QueryParser::for_index(&index, vec![fields.body]);

        Ok(Self {
            index,
            reader,
            query_parser,
            fields,
            config: config.clone(),
            writer: None,
        })
    }

    /// Get or create an IndexWriter with the configured buffer size
    fn get_writer(&mut self) -> Result<&mut IndexWriter> {
        if self.writer.is_none() {
            let writer = self
                .index
                .writer(self.config.writer_buffer_size)
                .context("Failed to create index writer")?;
            // Segments are merged explicitly in `commit`
            writer.set_merge_policy(Box::new(NoMergePolicy));
            self.writer = Some(writer);
        }
        self.writer
            .as_mut()
            .ok_or_else(|| anyhow::anyhow!("Index writer unavailable"))
    }

    fn id_term(&self, id: &DocId) -> Result<Term> {
        let key = id_key(id)?;
        Ok(Term::from_field_text(self.fields.id, &key))
    }

    /// Add or replace a single document
    pub fn add(&mut self, id: impl Into<DocId>, body: &str) -> Result<()> {
        self.add_documents(std::iter::once((id.into(), body.to_string())))
    }

    /// Add or replace a batch of documents with a single commit
    pub fn add_documents<I>(&mut self, documents: I) -> Result<()>
    where
        I: IntoIterator<Item = (DocId, String)>,
    {
        let fields = self.fields;
        let mut pending = Vec::new();
        for (id, body) in documents {
            let term = self.id_term(&id)?;
            let key = id_key(&id)?;
            pending.push((term, doc!(fields.id => key, fields.body => body)));
        }

        let writer = self.get_writer()?;
        for (term, document) in pending {
            writer.delete_term(term);
            writer.add_document(document)?;
        }
        self.commit()
    }

    /// Remove a document by id. Unknown ids are ignored.
    pub fn remove(&mut self, id: &DocId) -> Result<()> {
        let term = self.id_term(id)?;
        self.get_writer()?.delete_term(term);
        self.commit()
    }

    /// Commit pending changes, then fold every segment into one.
    ///
    /// Deleted documents keep counting toward term statistics until their
    /// segment is merged, which would make this index score differently from
    /// one rebuilt out of [`Self::export`].
    fn commit(&mut self) -> Result<()> {
        self.get_writer()?
            .commit()
            .context("Failed to commit index changes")?;
        self.reader.reload()?;

        let needs_merge = {
            let searcher = self.reader.searcher();
            let segment_readers = searcher.segment_readers();
            segment_readers.len() > 1 || segment_readers.iter().any(|r| r.has_deletes())
        };
        if !needs_merge {
            return Ok(());
        }

        let segment_ids = self.index.searchable_segment_ids()?;
        self.get_writer()?
            .merge(&segment_ids)
            .wait()
            .context("Failed to merge index segments")?;
        self.reader.reload()?;
        Ok(())
    }

    pub fn contains(&self, id: &DocId) -> Result<bool> {
        let term = self.id_term(id)?;
        let query = TermQuery::new(term, IndexRecordOption::Basic);
        let searcher = self.reader.searcher();
        Ok(searcher.search(&query, &Count)? > 0)
    }

    pub fn num_docs(&self) -> u64 {
        self.reader.searcher().num_docs()
    }

    /// Load every document of an exported snapshot
    pub fn import(&mut self, export: &ExportedIndex) -> Result<()> {
        export.check_version()?;
        self.add_documents(
            export
                .documents
                .iter()
                .map(|document| (document.id.clone(), document.body.clone())),
        )
        .context("Failed to import exported index")
    }

    /// Snapshot every live document, in segment order
    pub fn export(&self) -> Result<ExportedIndex> {
        let searcher = self.reader.searcher();
        let mut documents = Vec::new();

        for (segment_ord, segment_reader) in searcher.segment_readers().iter().enumerate() {
            for doc_id in segment_reader.doc_ids_alive() {
                let address = DocAddress::new(segment_ord as u32, doc_id);
                let stored: TantivyDocument = searcher.doc(address)?;
                let id = self.stored_id(&stored)?;
                let body = stored
                    .get_first(self.fields.body)
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string();
                documents.push(ExportedDocument { id, body });
            }
        }

        Ok(ExportedIndex::new(documents))
    }

    pub(crate) fn stored_id(&self, stored: &TantivyDocument) -> Result<DocId> {
        let key = stored
            .get_first(self.fields.id)
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow::anyhow!("Stored document is missing its id"))?;
        serde_json::from_str(key).with_context(|| format!("Failed to parse stored id: {key}"))
    }

    pub fn stats(&self) -> IndexStats {
        let searcher = self.reader.searcher();
        IndexStats {
            documents: searcher.num_docs(),
            segments: searcher.segment_readers().len(),
        }
    }
}

/// Document and segment counts of a [`TextIndex`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub documents: u64,
    pub segments: usize,
}

fn id_key(id: &DocId) -> Result<String> {
    serde_json::to_string(id).context("Failed to encode document id")
}

/// [`SearchEngine`] backed by in-memory Tantivy indexes
#[derive(Debug, Clone, Default)]
pub struct TantivyEngine {
    config: EngineConfig,
}

impl TantivyEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

impl SearchEngine for TantivyEngine {
    type Index = TextIndex;
    type Export = ExportedIndex;

    fn name(&self) -> &str {
        "Tantivy"
    }

    fn create_empty(&self) -> Result<TextIndex> {
        TextIndex::in_ram(&self.config)
    }

    fn import(&self, index: &mut TextIndex, export: &ExportedIndex) -> Result<()> {
        tracing::debug!("Importing {} documents into a Tantivy index", export.len());
        index.import(export)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{SearchIndex, SearchOptions};

    fn sample_index() -> TextIndex {
        let mut index = TextIndex::in_ram(&EngineConfig::default()).unwrap();
        index
            .add_documents(vec![
                (DocId::Number(0), "alpha".to_string()),
                (DocId::from("one"), "beta".to_string()),
            ])
            .unwrap();
        index
    }

    #[test]
    fn test_create_index() {
        let index = TextIndex::in_ram(&EngineConfig::default()).unwrap();
        assert_eq!(index.num_docs(), 0);
        assert!(index.export().unwrap().is_empty());
    }

    #[test]
    fn test_add_replaces_same_id() {
        let mut index = sample_index();
        index.add(0u64, "gamma").unwrap();

        assert_eq!(index.num_docs(), 2);
        let export = index.export().unwrap();
        let replaced = export
            .documents
            .iter()
            .find(|d| d.id == DocId::Number(0))
            .unwrap();
        assert_eq!(replaced.body, "gamma");
    }

    #[test]
    fn test_numeric_and_text_ids_are_distinct() {
        let mut index = sample_index();
        index.add("0", "delta").unwrap();

        assert_eq!(index.num_docs(), 3);
        assert!(index.contains(&DocId::Number(0)).unwrap());
        assert!(index.contains(&DocId::from("0")).unwrap());
    }

    #[test]
    fn test_remove() {
        let mut index = sample_index();
        index.remove(&DocId::from("one")).unwrap();

        assert!(!index.contains(&DocId::from("one")).unwrap());
        assert_eq!(index.num_docs(), 1);

        // Removing again is a no-op
        index.remove(&DocId::from("one")).unwrap();
        assert_eq!(index.num_docs(), 1);
    }

    #[test]
    fn test_export_import() {
        let index = sample_index();
        let export = index.export().unwrap();
        assert_eq!(export.len(), 2);

        let engine = TantivyEngine::default();
        let mut imported = engine.create_empty().unwrap();
        engine.import(&mut imported, &export).unwrap();

        assert_eq!(imported.num_docs(), 2);
        assert_eq!(imported.export().unwrap(), export);
    }

    #[test]
    fn test_stats() {
        let mut index = sample_index();
        assert_eq!(
            index.stats(),
            IndexStats {
                documents: 2,
                segments: 1
            }
        );

        index.add(0u64, "gamma").unwrap();
        index.add("two", "delta").unwrap();
        assert_eq!(
            index.stats(),
            IndexStats {
                documents: 3,
                segments: 1
            }
        );
    }

    #[test]
    fn test_replaced_documents_do_not_skew_ranking() {
        let mut index = TextIndex::in_ram(&EngineConfig::default()).unwrap();
        index
            .add_documents(vec![
                (DocId::Number(1), "apple filler words".to_string()),
                (DocId::Number(2), "banana filler words".to_string()),
                (DocId::Number(3), "apple".to_string()),
            ])
            .unwrap();
        index.add(3u64, "cherry").unwrap();

        let engine = TantivyEngine::default();
        let mut rebuilt = engine.create_empty().unwrap();
        engine.import(&mut rebuilt, &index.export().unwrap()).unwrap();

        let options = SearchOptions::default();
        for query in ["apple banana", "apple", "cherry", "filler"] {
            assert_eq!(
                index.search(query, &options).unwrap().into_ids(),
                rebuilt.search(query, &options).unwrap().into_ids(),
                "query {query:?}"
            );
        }
        assert_eq!(index.stats().segments, 1);

        index.remove(&DocId::Number(1)).unwrap();
        let mut rebuilt = engine.create_empty().unwrap();
        engine.import(&mut rebuilt, &index.export().unwrap()).unwrap();
        assert_eq!(
            index.search("apple banana", &options).unwrap().into_ids(),
            rebuilt.search("apple banana", &options).unwrap().into_ids()
        );
        assert_eq!(index.stats().segments, 1);
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = EngineConfig {
            max_search_limit: 0,
            ..EngineConfig::default()
        };
        assert!(TextIndex::in_ram(&config).is_err());
    }
}
