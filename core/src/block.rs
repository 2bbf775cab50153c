//! SPIMI block construction.
//!
//! All blocks share one temporary dictionary file and one temporary postings
//! file. A block is a sorted run of `term doc_freq postings_offset` lines in
//! the dictionary file closed by [`BLOCK_END`]; its postings lines are plain
//! `id id ...` without skip spacing.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::index::{DictionaryEntry, DocId};
use crate::persist::{format_dictionary_line, push_ids, OffsetWriter};
use crate::postings::PostingList;

/// Line closing each block's dictionary section.
pub const BLOCK_END: &str = "--";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockFiles {
    pub dictionary: PathBuf,
    pub postings: PathBuf,
}

impl BlockFiles {
    pub fn in_dir(dir: &Path) -> Self {
        Self { dictionary: dir.join("blocks.dict"), postings: dir.join("blocks.postings") }
    }

    /// Delete both files and, if empty, their directory.
    pub fn remove(&self) -> Result<()> {
        fs::remove_file(&self.dictionary)?;
        fs::remove_file(&self.postings)?;
        if let Some(dir) = self.dictionary.parent() {
            let _ = fs::remove_dir(dir);
        }
        Ok(())
    }

    /// Best-effort removal after a failed build.
    pub fn discard(&self) {
        if let Err(e) = self.remove() {
            tracing::warn!(dictionary = %self.dictionary.display(), postings = %self.postings.display(), error = %e, "could not remove block files");
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockInfo {
    /// Byte offset of the block's first line in the shared dictionary file.
    pub start: u64,
    pub num_terms: usize,
}

/// Flushed blocks plus the ids of every document that was added.
#[derive(Debug)]
pub struct Blocks {
    pub files: BlockFiles,
    pub blocks: Vec<BlockInfo>,
    pub universe: Vec<DocId>,
}

impl Blocks {
    /// Delete the temporary block files and, if empty, their directory.
    pub fn remove(self) -> Result<()> {
        self.files.remove()
    }
}

pub struct BlockBuilder {
    partial: BTreeMap<String, PostingList>,
    entries: usize,
    budget: usize,
    dict_out: OffsetWriter,
    postings_out: OffsetWriter,
    files: BlockFiles,
    blocks: Vec<BlockInfo>,
    universe: Vec<DocId>,
}

impl BlockBuilder {
    /// Start a builder writing block files into `temp_dir`. `budget` is the
    /// number of in-memory entries (distinct terms plus postings) allowed
    /// before a block is flushed.
    pub fn create(temp_dir: &Path, budget: usize) -> Result<Self> {
        fs::create_dir_all(temp_dir)?;
        let files = BlockFiles::in_dir(temp_dir);
        Ok(Self {
            partial: BTreeMap::new(),
            entries: 0,
            budget,
            dict_out: OffsetWriter::create(&files.dictionary)?,
            postings_out: OffsetWriter::create(&files.postings)?,
            files,
            blocks: Vec::new(),
            universe: Vec::new(),
        })
    }

    /// Number of in-memory entries currently held.
    pub fn entries(&self) -> usize {
        self.entries
    }

    pub fn blocks_flushed(&self) -> usize {
        self.blocks.len()
    }

    /// Add one document's terms. Documents must arrive in strictly ascending
    /// id order; repeated terms within a document count once.
    pub fn add_document<I, S>(&mut self, doc_id: DocId, terms: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Some(&last) = self.universe.last() {
            if doc_id <= last {
                return Err(Error::DocumentOrder { doc_id, last });
            }
        }
        self.universe.push(doc_id);

        let distinct: HashSet<String> = terms.into_iter().map(Into::into).collect();
        for term in distinct {
            let list = self.partial.entry(term).or_insert_with(|| {
                self.entries += 1;
                PostingList::new()
            });
            list.append(doc_id);
            self.entries += 1;
        }

        if self.entries > self.budget {
            self.flush()?;
        }
        Ok(())
    }

    /// Write the in-memory partial index as a new block and reset it.
    pub fn flush(&mut self) -> Result<()> {
        if self.partial.is_empty() {
            return Ok(());
        }
        let start = self.dict_out.offset();
        let partial = std::mem::take(&mut self.partial);
        let num_terms = partial.len();
        let mut line = String::new();
        for (term, list) in partial {
            line.clear();
            push_ids(&mut line, list.as_slice());
            let offset = self.postings_out.write_line(&line)?;
            let entry = DictionaryEntry { term, doc_freq: list.len() as u32, offset };
            self.dict_out.write_line(&format_dictionary_line(&entry))?;
        }
        self.dict_out.write_line(BLOCK_END)?;
        tracing::info!(block = self.blocks.len(), num_terms, entries = self.entries, start, "flushed block");
        self.blocks.push(BlockInfo { start, num_terms });
        self.entries = 0;
        Ok(())
    }

    /// Drop the in-memory index and delete the block files written so far.
    pub fn discard(self) {
        let files = self.files.clone();
        drop(self);
        files.discard();
    }

    /// Flush whatever is left and close the block files.
    pub fn finish(mut self) -> Result<Blocks> {
        self.flush()?;
        self.dict_out.finish()?;
        self.postings_out.finish()?;
        Ok(Blocks { files: self.files, blocks: self.blocks, universe: self.universe })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(s: &str) -> Vec<String> {
        s.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn single_block_is_sorted_with_end_marker() {
        let dir = tempfile::tempdir().unwrap();
        let mut b = BlockBuilder::create(dir.path(), 1000).unwrap();
        b.add_document(1, words("dog cat dog")).unwrap();
        b.add_document(2, words("cat")).unwrap();
        let blocks = b.finish().unwrap();
        assert_eq!(blocks.blocks, vec![BlockInfo { start: 0, num_terms: 2 }]);
        assert_eq!(blocks.universe, vec![1, 2]);
        let dict = fs::read_to_string(&blocks.files.dictionary).unwrap();
        assert_eq!(dict, "cat 2 0\ndog 1 4\n--\n");
        let postings = fs::read_to_string(&blocks.files.postings).unwrap();
        assert_eq!(postings, "1 2\n1\n");
    }

    #[test]
    fn flushes_when_budget_is_exceeded() {
        let dir = tempfile::tempdir().unwrap();
        // Each document brings one new term and one posting: two entries.
        let mut b = BlockBuilder::create(dir.path(), 3).unwrap();
        b.add_document(1, words("a")).unwrap();
        assert_eq!(b.entries(), 2);
        assert_eq!(b.blocks_flushed(), 0);
        b.add_document(2, words("b")).unwrap();
        assert_eq!(b.entries(), 0);
        assert_eq!(b.blocks_flushed(), 1);
        b.add_document(3, words("a")).unwrap();
        let blocks = b.finish().unwrap();
        assert_eq!(blocks.blocks.len(), 2);
        assert_eq!(blocks.blocks[1].start, "a 1 0\nb 1 2\n--\n".len() as u64);
        assert_eq!(blocks.universe, vec![1, 2, 3]);
    }

    #[test]
    fn documents_must_ascend() {
        let dir = tempfile::tempdir().unwrap();
        let mut b = BlockBuilder::create(dir.path(), 10).unwrap();
        b.add_document(5, words("x")).unwrap();
        assert!(matches!(b.add_document(5, words("y")), Err(Error::DocumentOrder { doc_id: 5, last: 5 })));
        assert!(matches!(b.add_document(3, words("y")), Err(Error::DocumentOrder { doc_id: 3, last: 5 })));
    }

    #[test]
    fn empty_input_produces_no_blocks() {
        let dir = tempfile::tempdir().unwrap();
        let blocks = BlockBuilder::create(dir.path(), 10).unwrap().finish().unwrap();
        assert!(blocks.blocks.is_empty());
        assert!(blocks.universe.is_empty());
        blocks.remove().unwrap();
        assert!(!dir.path().join("blocks.dict").exists());
    }

    #[test]
    fn discard_removes_partial_blocks() {
        let dir = tempfile::tempdir().unwrap();
        let temp = dir.path().join("blocks");
        let mut b = BlockBuilder::create(&temp, 1).unwrap();
        b.add_document(1, words("cat dog")).unwrap();
        assert_eq!(b.blocks_flushed(), 1);
        b.discard();
        assert!(!temp.join("blocks.dict").exists());
        assert!(!temp.join("blocks.postings").exists());
    }
}
