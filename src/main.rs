use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use search_binding::engine::{ExportedIndex, TextIndex};
use search_binding::{
    DocId, EngineConfig, IndexSource, RecordStore, SearchBinding, SearchOptions, TantivyEngine,
};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

/// Run queries over a JSON document set through a memoized search binding
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON file holding an array of objects, each with an "id" field
    #[arg(long)]
    documents: PathBuf,

    /// Engine config file (TOML)
    #[arg(long, env = "SEARCH_BINDING_CONFIG")]
    config: Option<PathBuf>,

    /// Bind through the exported snapshot instead of the live index
    #[arg(long)]
    via_export: bool,

    /// Write the exported snapshot to this path
    #[arg(long)]
    export: Option<PathBuf>,

    /// Maximum number of results per query
    #[arg(long)]
    limit: Option<usize>,

    /// Number of leading results to skip
    #[arg(long)]
    offset: Option<usize>,

    /// Edit distance for fuzzy matching (0-2)
    #[arg(long)]
    fuzzy: Option<u8>,

    /// Request paged results
    #[arg(long)]
    paginate: bool,

    /// Print ids instead of the matching documents
    #[arg(long)]
    raw_ids: bool,

    /// Queries to run, in order
    queries: Vec<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let config = match &args.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };

    let documents = load_documents(&args.documents)?;
    tracing::info!(
        "Loaded {} documents from {}",
        documents.len(),
        args.documents.display()
    );

    let mut index = TextIndex::in_ram(&config)?;
    index.add_documents(
        documents
            .iter()
            .map(|(id, document)| (id.clone(), document_body(document))),
    )?;
    let stats = index.stats();
    tracing::info!(
        "Indexed {} documents in {} segment(s)",
        stats.documents,
        stats.segments
    );

    let export = if args.via_export || args.export.is_some() {
        Some(index.export()?)
    } else {
        None
    };

    if let (Some(path), Some(export)) = (&args.export, &export) {
        write_export(path, export)?;
        tracing::info!("Wrote exported index to {}", path.display());
    }

    let source: IndexSource<TantivyEngine> = match export {
        Some(export) if args.via_export => IndexSource::exported(export),
        _ => IndexSource::instance(index),
    };

    let store: Option<RecordStore<Value>> = if args.raw_ids {
        None
    } else {
        Some(documents.into_iter().collect())
    };

    let options = SearchOptions {
        limit: args.limit,
        offset: args.offset,
        fuzzy: args.fuzzy,
        paginate: args.paginate,
    };

    let mut binding = SearchBinding::new(TantivyEngine::new(config));
    for query in &args.queries {
        let results = binding.bind(Some(query.as_str()), Some(&source), store.as_ref(), Some(&options))?;
        let line = serde_json::json!({
            "query": query,
            "total_results": results.len(),
            "results": results,
        });
        println!("{line}");
    }

    Ok(())
}

fn load_documents(path: &Path) -> Result<Vec<(DocId, Value)>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read documents: {}", path.display()))?;
    let values: Vec<Value> = serde_json::from_str(&text)
        .with_context(|| format!("Documents must be a JSON array: {}", path.display()))?;

    values
        .into_iter()
        .enumerate()
        .map(|(position, document)| {
            let id = document
                .get("id")
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("Document {position} has no id"))?;
            let id: DocId = serde_json::from_value(id)
                .with_context(|| format!("Document {position} id must be a string or number"))?;
            Ok((id, document))
        })
        .collect()
}

/// Searchable text of a document: its string fields, id excluded
fn document_body(document: &Value) -> String {
    match document {
        Value::Object(fields) => fields
            .iter()
            .filter(|(name, _)| name.as_str() != "id")
            .filter_map(|(_, value)| value.as_str())
            .collect::<Vec<_>>()
            .join(" "),
        Value::String(text) => text.clone(),
        _ => String::new(),
    }
}

fn write_export(path: &Path, export: &ExportedIndex) -> Result<()> {
    std::fs::write(path, export.to_json()?)
        .with_context(|| format!("Failed to write exported index: {}", path.display()))
}
