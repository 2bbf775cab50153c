//! End-to-end index construction: enumerate, tokenize, build blocks, merge.

use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

use crate::block::BlockBuilder;
use crate::config::IndexConfig;
use crate::corpus::list_documents;
use crate::error::{Error, Result};
use crate::index::DocId;
use crate::merge::{merge_blocks, MergeSummary};
use crate::persist::IndexPaths;
use crate::tokenizer;

/// Index every document in `input_dir` into `paths`. Any unreadable document
/// aborts the build. The temporary block files are removed whether or not
/// the build succeeds.
pub fn build_index(input_dir: &Path, paths: &IndexPaths, config: &IndexConfig) -> Result<MergeSummary> {
    config.validate()?;
    let docs = list_documents(input_dir)?;
    tracing::info!(num_docs = docs.len(), memory_budget = config.memory_budget, "indexing documents");

    let mut builder = BlockBuilder::create(&config.temp_dir, config.memory_budget)?;
    if let Err(e) = add_documents(&mut builder, docs) {
        builder.discard();
        return Err(e);
    }
    let blocks = builder.finish()?;
    match merge_blocks(&blocks, paths) {
        Ok(summary) => {
            blocks.remove()?;
            Ok(summary)
        }
        Err(e) => {
            blocks.files.discard();
            Err(e)
        }
    }
}

fn add_documents(builder: &mut BlockBuilder, docs: Vec<(DocId, PathBuf)>) -> Result<()> {
    for (doc_id, path) in docs {
        let bytes = fs::read(&path).map_err(|e| Error::input(&path, e))?;
        let text = String::from_utf8_lossy(&bytes);
        if matches!(text, Cow::Owned(_)) {
            tracing::warn!(doc_id, path = %path.display(), "document is not valid UTF-8; invalid bytes replaced");
        }
        builder.add_document(doc_id, tokenizer::terms(&text))?;
    }
    Ok(())
}
