use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type DocId = u32;

/// Reserved dictionary key for the posting list of every indexed document.
/// The tokenizer never yields it since terms cannot start with `_`.
pub const UNIVERSE_KEY: &str = "__universe__";

/// Current on-disk format version, recorded in the metadata file.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryEntry {
    pub term: String,
    pub doc_freq: u32,
    /// Byte offset of the term's line in the postings file.
    pub offset: u64,
}

/// Where a term's postings live and how many there are.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermInfo {
    pub doc_freq: u32,
    pub offset: u64,
}

/// Frozen, sorted dictionary loaded from disk for querying.
pub type Dictionary = BTreeMap<String, TermInfo>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndexMeta {
    pub num_docs: u32,
    pub num_terms: u32,
    pub num_blocks: u32,
    pub memory_budget: u64,
    pub created_at: String,
    pub version: u32,
}
