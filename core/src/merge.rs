//! External k-way merge of flushed blocks into the final index.

use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::Path;

use crate::block::{Blocks, BLOCK_END};
use crate::error::{Error, Result};
use crate::index::{DictionaryEntry, DocId, UNIVERSE_KEY};
use crate::persist::{format_dictionary_line, format_postings_line, parse_dictionary_line, parse_ids, IndexPaths, OffsetWriter};
use crate::postings::{skip_spacing, PostingList};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeSummary {
    pub num_docs: u32,
    pub num_terms: u32,
    pub num_blocks: u32,
}

/// Read position inside one block's dictionary section.
struct BlockCursor {
    block: usize,
    reader: BufReader<File>,
    current: Option<DictionaryEntry>,
    line: String,
}

impl BlockCursor {
    fn open(path: &Path, block: usize, start: u64) -> Result<Self> {
        let file = File::open(path).map_err(|e| Error::input(path, e))?;
        let mut reader = BufReader::new(file);
        reader.seek(SeekFrom::Start(start))?;
        let mut cursor = Self { block, reader, current: None, line: String::new() };
        cursor.advance()?;
        Ok(cursor)
    }

    /// Load the next record; hitting the end marker deactivates the cursor.
    fn advance(&mut self) -> Result<()> {
        self.line.clear();
        if self.reader.read_line(&mut self.line)? == 0 {
            return Err(Error::corrupt(format!("block {} ends without an end marker", self.block)));
        }
        let line = self.line.trim_end();
        self.current = if line == BLOCK_END { None } else { Some(parse_dictionary_line(line)?) };
        Ok(())
    }
}

fn read_block_postings(reader: &mut BufReader<File>, entry: &DictionaryEntry, block: usize) -> Result<Vec<DocId>> {
    reader.seek(SeekFrom::Start(entry.offset))?;
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Err(Error::corrupt(format!("block {block}: postings for {:?} are missing", entry.term)));
    }
    let ids = parse_ids(line.split_whitespace(), "block postings")?;
    if ids.len() != entry.doc_freq as usize {
        return Err(Error::corrupt(format!(
            "block {block}: {:?} lists {} postings but records {}",
            entry.term,
            ids.len(),
            entry.doc_freq
        )));
    }
    Ok(ids)
}

/// Merge all blocks into the final dictionary and postings files, then
/// append the universe list under [`UNIVERSE_KEY`].
pub fn merge_blocks(blocks: &Blocks, paths: &IndexPaths) -> Result<MergeSummary> {
    let mut cursors = blocks
        .blocks
        .iter()
        .enumerate()
        .map(|(i, b)| BlockCursor::open(&blocks.files.dictionary, i, b.start))
        .collect::<Result<Vec<_>>>()?;
    let postings_file = File::open(&blocks.files.postings).map_err(|e| Error::input(&blocks.files.postings, e))?;
    let mut postings_in = BufReader::new(postings_file);

    let mut dict_out = OffsetWriter::create(&paths.dictionary)?;
    let mut postings_out = OffsetWriter::create(&paths.postings)?;
    let mut num_terms = 0u32;

    loop {
        cursors.retain(|c| c.current.is_some());
        let Some(term) = cursors
            .iter()
            .filter_map(|c| c.current.as_ref())
            .map(|e| e.term.as_str())
            .min()
            .map(str::to_owned)
        else {
            break;
        };

        let mut merged: Vec<DocId> = Vec::new();
        let mut doc_freq = 0u64;
        let mut contributors = 0usize;
        for cursor in cursors.iter_mut() {
            let Some(entry) = cursor.current.as_ref().filter(|e| e.term == term) else {
                continue;
            };
            let ids = read_block_postings(&mut postings_in, entry, cursor.block)?;
            doc_freq += u64::from(entry.doc_freq);
            if let (Some(&last), Some(&first)) = (merged.last(), ids.first()) {
                if first <= last {
                    return Err(Error::corrupt(format!(
                        "block {} restarts {term:?} at document {first} after {last}",
                        cursor.block
                    )));
                }
            }
            merged.extend(ids);
            contributors += 1;
            cursor.advance()?;
        }
        debug_assert_eq!(doc_freq, merged.len() as u64);

        let mut list = PostingList::with_spacing(merged, 0);
        list.build_skips(skip_spacing(list.len()));
        let offset = postings_out.write_line(&format_postings_line(&list))?;
        let entry = DictionaryEntry { term, doc_freq: list.len() as u32, offset };
        dict_out.write_line(&format_dictionary_line(&entry))?;
        tracing::debug!(term = %entry.term, doc_freq = entry.doc_freq, contributors, "merged term");
        num_terms += 1;
    }

    let universe = PostingList::from_sorted(blocks.universe.clone());
    let offset = postings_out.write_line(&format_postings_line(&universe))?;
    let entry = DictionaryEntry { term: UNIVERSE_KEY.to_string(), doc_freq: universe.len() as u32, offset };
    dict_out.write_line(&format_dictionary_line(&entry))?;

    dict_out.finish()?;
    postings_out.finish()?;

    let summary = MergeSummary {
        num_docs: universe.len() as u32,
        num_terms,
        num_blocks: blocks.blocks.len() as u32,
    };
    tracing::info!(num_terms, num_docs = summary.num_docs, num_blocks = summary.num_blocks, "merged blocks");
    Ok(summary)
}
