use anyhow::Result;
use tantivy::{
    TantivyDocument, Term,
    collector::{Count, TopDocs},
    query::{BooleanQuery, FuzzyTermQuery, Occur, Query},
};

use crate::config::MAX_FUZZY_DISTANCE;
use crate::engine::{DocId, ResultEnvelope, SearchIndex, SearchOptions, SearchOutput, TextIndex};

impl TextIndex {
    fn validate_options(&self, query: &str, options: &SearchOptions) -> Result<()> {
        let length = query.chars().count();
        if length > self.config.max_query_length {
            return Err(anyhow::anyhow!(
                "Query length {} exceeds maximum of {}",
                length,
                self.config.max_query_length
            ));
        }
        if let Some(limit) = options.limit {
            if limit > self.config.max_search_limit {
                return Err(anyhow::anyhow!(
                    "Limit must not exceed {}",
                    self.config.max_search_limit
                ));
            }
        }
        let limit = options.limit.unwrap_or(self.config.default_search_limit);
        let offset = options.offset.unwrap_or(0);
        match limit.checked_add(offset) {
            Some(window) if window <= self.config.max_search_limit => {}
            _ => {
                return Err(anyhow::anyhow!(
                    "Offset plus limit must not exceed {}",
                    self.config.max_search_limit
                ));
            }
        }
        if let Some(distance) = options.fuzzy {
            if distance > MAX_FUZZY_DISTANCE {
                return Err(anyhow::anyhow!(
                    "Fuzzy distance must be between 0 and {MAX_FUZZY_DISTANCE}"
                ));
            }
        }
        Ok(())
    }

    /// Build fuzzy query with typo tolerance
    fn build_fuzzy_query(&self, query: &str, distance: u8) -> Box<dyn Query> {
        let mut clauses: Vec<(Occur, Box<dyn Query>)> = Vec::new();

        // FuzzyTermQuery bypasses the tokenizer, so match its lowercasing here
        for term in query.split_whitespace() {
            let fuzzy_query: Box<dyn Query> = Box::new(FuzzyTermQuery::new(
                Term::from_field_text(self.fields.body, &term.to_lowercase()),
                distance,
                true, // transpose_cost_one
            ));
            clauses.push((Occur::Should, fuzzy_query));
        }

        Box::new(BooleanQuery::new(clauses))
    }

    /// Build standard query through the query parser. Malformed syntax is
    /// dropped rather than rejected, so partially typed input still searches.
    fn build_standard_query(&self, query: &str) -> Box<dyn Query> {
        let (parsed_query, errors) = self.query_parser.parse_query_lenient(query);
        for error in &errors {
            tracing::debug!("Ignoring malformed part of query {:?}: {}", query, error);
        }
        parsed_query
    }
}

impl SearchIndex for TextIndex {
    fn search(&self, query: &str, options: &SearchOptions) -> Result<SearchOutput> {
        self.validate_options(query, options)?;

        let limit = options.limit.unwrap_or(self.config.default_search_limit);
        let offset = options.offset.unwrap_or(0);

        let search_query = match options.fuzzy {
            Some(distance) => self.build_fuzzy_query(query, distance),
            None => self.build_standard_query(query),
        };

        let searcher = self.reader.searcher();

        // TopDocs refuses a zero limit
        let (top_docs, total) = if limit == 0 {
            let total = if options.paginate {
                searcher.search(&*search_query, &Count)?
            } else {
                0
            };
            (Vec::new(), total)
        } else {
            let collector = TopDocs::with_limit(limit).and_offset(offset);
            if options.paginate {
                searcher.search(&*search_query, &(collector, Count))?
            } else {
                (searcher.search(&*search_query, &collector)?, 0)
            }
        };

        let mut ids: Vec<DocId> = Vec::with_capacity(top_docs.len());
        for (_score, doc_address) in top_docs {
            let stored: TantivyDocument = searcher.doc(doc_address)?;
            ids.push(self.stored_id(&stored)?);
        }

        tracing::trace!("Tantivy matched {} ids for {:?}", ids.len(), query);

        if !options.paginate {
            return Ok(SearchOutput::Ids(ids));
        }

        let consumed = offset + ids.len();
        let next = (limit > 0 && consumed < total).then_some(consumed);
        Ok(SearchOutput::Envelope(ResultEnvelope {
            result: ids,
            total: Some(total),
            next,
        }))
    }
}
