use anyhow::{Context, Result};
use boolsearch_core::persist::load_meta;
use boolsearch_core::{Evaluator, IndexPaths, IndexReader, INVALID_QUERY};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchStats {
    pub queries: usize,
    pub invalid: usize,
}

/// Open the index at `paths`, logging its metadata when present.
pub fn open_index(paths: &IndexPaths) -> Result<IndexReader> {
    match load_meta(paths) {
        Ok(meta) => tracing::info!(num_docs = meta.num_docs, num_terms = meta.num_terms, created_at = %meta.created_at, "index metadata"),
        Err(e) => tracing::debug!(error = %e, "no index metadata"),
    }
    IndexReader::open(paths).with_context(|| format!("opening index {}", paths.dictionary.display()))
}

/// Evaluate every line of `queries`, writing one result line per query.
pub fn run_batch<R: BufRead, W: Write>(reader: &IndexReader, queries: R, mut out: W) -> Result<BatchStats> {
    let evaluator = Evaluator::new(reader);
    let mut stats = BatchStats::default();
    for line in queries.lines() {
        let query = line.context("reading queries")?;
        let result = evaluator.result_line(&query)?;
        if result == INVALID_QUERY {
            stats.invalid += 1;
        }
        writeln!(out, "{result}")?;
        stats.queries += 1;
    }
    out.flush()?;
    Ok(stats)
}

/// Run the queries file against the index and write the results file.
pub fn run_search(paths: &IndexPaths, queries: &Path, results: &Path) -> Result<BatchStats> {
    let reader = open_index(paths)?;
    let qf = File::open(queries).with_context(|| format!("opening queries {}", queries.display()))?;
    let rf = File::create(results).with_context(|| format!("creating results {}", results.display()))?;
    let start = std::time::Instant::now();
    let stats = run_batch(&reader, BufReader::new(qf), BufWriter::new(rf))?;
    tracing::info!(queries = stats.queries, invalid = stats.invalid, took_s = start.elapsed().as_secs_f64(), "search complete");
    Ok(stats)
}
