//! Line-oriented on-disk format.
//!
//! Dictionary lines are `term doc_freq offset`; postings lines are
//! `skip_spacing id id ...`, with `offset` the byte position of the line.

use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::index::{DictionaryEntry, Dictionary, DocId, IndexMeta, TermInfo, UNIVERSE_KEY};
use crate::postings::PostingList;

#[derive(Debug, Clone)]
pub struct IndexPaths {
    pub dictionary: PathBuf,
    pub postings: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(dictionary: P, postings: Q) -> Self {
        Self { dictionary: dictionary.as_ref().to_path_buf(), postings: postings.as_ref().to_path_buf() }
    }

    pub fn meta(&self) -> PathBuf {
        let mut p = self.dictionary.clone().into_os_string();
        p.push(".meta.json");
        p.into()
    }
}

/// Buffered file writer that tracks the byte offset of the next line.
pub(crate) struct OffsetWriter {
    inner: BufWriter<File>,
    offset: u64,
}

impl OffsetWriter {
    pub(crate) fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        Ok(Self { inner: BufWriter::new(File::create(path)?), offset: 0 })
    }

    /// Byte offset the next line will start at.
    pub(crate) fn offset(&self) -> u64 {
        self.offset
    }

    /// Write `line` plus a newline, returning the offset it starts at.
    pub(crate) fn write_line(&mut self, line: &str) -> Result<u64> {
        let start = self.offset;
        self.inner.write_all(line.as_bytes())?;
        self.inner.write_all(b"\n")?;
        self.offset += line.len() as u64 + 1;
        Ok(start)
    }

    pub(crate) fn finish(mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }
}

pub(crate) fn push_ids(buf: &mut String, ids: &[DocId]) {
    for (i, id) in ids.iter().enumerate() {
        if i > 0 {
            buf.push(' ');
        }
        let _ = write!(buf, "{id}");
    }
}

pub(crate) fn parse_ids<'a>(fields: impl Iterator<Item = &'a str>, what: &str) -> Result<Vec<DocId>> {
    fields
        .map(|f| f.parse::<DocId>().map_err(|_| Error::corrupt(format!("{what}: bad document id {f:?}"))))
        .collect()
}

pub fn format_dictionary_line(entry: &DictionaryEntry) -> String {
    format!("{} {} {}", entry.term, entry.doc_freq, entry.offset)
}

pub fn parse_dictionary_line(line: &str) -> Result<DictionaryEntry> {
    let mut fields = line.split_whitespace();
    let (Some(term), Some(df), Some(offset), None) = (fields.next(), fields.next(), fields.next(), fields.next()) else {
        return Err(Error::corrupt(format!("dictionary line {line:?} does not have three fields")));
    };
    let doc_freq = df.parse().map_err(|_| Error::corrupt(format!("bad document frequency in {line:?}")))?;
    let offset = offset.parse().map_err(|_| Error::corrupt(format!("bad offset in {line:?}")))?;
    Ok(DictionaryEntry { term: term.to_string(), doc_freq, offset })
}

pub fn format_postings_line(list: &PostingList) -> String {
    let mut line = list.spacing().to_string();
    if !list.is_empty() {
        line.push(' ');
        push_ids(&mut line, list.as_slice());
    }
    line
}

/// Parse a final postings line, checking it against the dictionary's
/// document frequency.
pub fn parse_postings_line(line: &str, doc_freq: u32) -> Result<PostingList> {
    let mut fields = line.split_whitespace();
    let spacing = fields
        .next()
        .and_then(|s| s.parse::<usize>().ok())
        .ok_or_else(|| Error::corrupt(format!("postings line {line:?} has no skip spacing")))?;
    let ids = parse_ids(fields, "postings")?;
    if ids.len() != doc_freq as usize {
        return Err(Error::corrupt(format!(
            "posting list has {} ids but the dictionary says {doc_freq}",
            ids.len()
        )));
    }
    if !ids.windows(2).all(|w| w[0] < w[1]) {
        return Err(Error::corrupt("posting list is not strictly ascending"));
    }
    Ok(PostingList::with_spacing(ids, spacing))
}

pub fn save_meta(paths: &IndexPaths, meta: &IndexMeta) -> Result<()> {
    let json = serde_json::to_string_pretty(meta)?;
    fs::write(paths.meta(), json)?;
    Ok(())
}

pub fn load_meta(paths: &IndexPaths) -> Result<IndexMeta> {
    let path = paths.meta();
    let buf = fs::read_to_string(&path).map_err(|e| Error::input(&path, e))?;
    Ok(serde_json::from_str(&buf)?)
}

pub fn load_dictionary(paths: &IndexPaths) -> Result<Dictionary> {
    let file = File::open(&paths.dictionary).map_err(|e| Error::input(&paths.dictionary, e))?;
    let mut dict = Dictionary::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let entry = parse_dictionary_line(&line)?;
        let info = TermInfo { doc_freq: entry.doc_freq, offset: entry.offset };
        if dict.insert(entry.term, info).is_some() {
            return Err(Error::corrupt(format!("duplicate dictionary entry in {line:?}")));
        }
    }
    Ok(dict)
}

/// Read-only view of a final index: the dictionary snapshot, the postings
/// file and the universe list. Safe to share between threads.
pub struct IndexReader {
    dictionary: Dictionary,
    postings: Mutex<BufReader<File>>,
    universe: PostingList,
}

impl IndexReader {
    pub fn open(paths: &IndexPaths) -> Result<Self> {
        let mut dictionary = load_dictionary(paths)?;
        let file = File::open(&paths.postings).map_err(|e| Error::input(&paths.postings, e))?;
        let mut postings = BufReader::new(file);
        let universe_info = dictionary
            .remove(UNIVERSE_KEY)
            .ok_or_else(|| Error::corrupt(format!("dictionary has no {UNIVERSE_KEY} entry")))?;
        let universe = read_postings(&mut postings, universe_info)?;
        tracing::info!(num_terms = dictionary.len(), num_docs = universe.len(), "loaded index");
        Ok(Self { dictionary, postings: Mutex::new(postings), universe })
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    pub fn universe(&self) -> &PostingList {
        &self.universe
    }

    pub fn term_info(&self, term: &str) -> Option<TermInfo> {
        self.dictionary.get(term).copied()
    }

    /// Posting list for `term`; an unknown term yields an empty list.
    pub fn postings(&self, term: &str) -> Result<PostingList> {
        match self.term_info(term) {
            Some(info) => read_postings(&mut self.postings.lock(), info),
            None => Ok(PostingList::new()),
        }
    }
}

fn read_postings(reader: &mut BufReader<File>, info: TermInfo) -> Result<PostingList> {
    reader.seek(SeekFrom::Start(info.offset))?;
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Err(Error::corrupt(format!("postings offset {} is past the end of the file", info.offset)));
    }
    parse_postings_line(line.trim_end(), info.doc_freq)
}
