use boolsearch_core::{build_index, IndexConfig, IndexPaths, IndexReader, INVALID_QUERY};
use search::{run_batch, run_search, BatchStats};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

// Hand-written index: universe {1..5}, cat -> {1, 3, 5}, dog -> {2, 3}.
fn write_tiny_index(dir: &Path) -> IndexPaths {
    let paths = IndexPaths::new(dir.join("dictionary.txt"), dir.join("postings.txt"));
    let postings = "2 1 3 5\n1 2 3\n2 1 2 3 4 5\n";
    let dictionary = "cat 3 0\ndog 2 8\n__universe__ 5 14\n";
    fs::write(&paths.postings, postings).unwrap();
    fs::write(&paths.dictionary, dictionary).unwrap();
    paths
}

#[test]
fn batch_writes_one_line_per_query() {
    let dir = tempdir().unwrap();
    let paths = write_tiny_index(dir.path());
    let reader = IndexReader::open(&paths).unwrap();

    let queries = "cat AND dog\ncat OR dog\nNOT cat\ncat AND NOT dog\nAND cat\nzzzz\n";
    let mut out = Vec::new();
    let stats = run_batch(&reader, queries.as_bytes(), &mut out).unwrap();
    assert_eq!(stats, BatchStats { queries: 6, invalid: 1 });
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.split('\n').collect();
    assert_eq!(lines, vec!["3", "1 2 3 5", "2 4", "1 5", INVALID_QUERY, "", ""]);
}

#[test]
fn end_to_end_from_documents() {
    let dir = tempdir().unwrap();
    let docs = dir.path().join("docs");
    fs::create_dir_all(&docs).unwrap();
    fs::write(docs.join("3"), "Gold prices rose.").unwrap();
    fs::write(docs.join("12"), "Silver and gold futures.").unwrap();
    fs::write(docs.join("40"), "Copper output fell.").unwrap();

    let paths = IndexPaths::new(dir.path().join("out/dictionary.txt"), dir.path().join("out/postings.txt"));
    let mut config = IndexConfig::for_dictionary(&paths.dictionary);
    config.memory_budget = 2;
    build_index(&docs, &paths, &config).unwrap();

    let queries = dir.path().join("queries.txt");
    let results = dir.path().join("results.txt");
    fs::write(&queries, "gold\ngold AND NOT silver\n(copper OR silver) AND NOT gold\nNOT price\ngold AND\n").unwrap();
    let stats = run_search(&paths, &queries, &results).unwrap();
    assert_eq!(stats.queries, 5);
    assert_eq!(fs::read_to_string(&results).unwrap(), format!("3 12\n3\n40\n12 40\n{INVALID_QUERY}\n"));
}

#[test]
fn reader_can_be_shared_across_threads() {
    let dir = tempdir().unwrap();
    let paths = write_tiny_index(dir.path());
    let reader = IndexReader::open(&paths).unwrap();
    let queries = ["cat", "dog", "NOT dog", "cat OR dog"];
    let expected = ["1 3 5", "2 3", "1 4 5", "1 2 3 5"];
    std::thread::scope(|s| {
        for (q, want) in queries.iter().zip(expected) {
            let reader = &reader;
            s.spawn(move || {
                for _ in 0..50 {
                    let mut out = Vec::new();
                    run_batch(reader, q.as_bytes(), &mut out).unwrap();
                    assert_eq!(String::from_utf8(out).unwrap(), format!("{want}\n"));
                }
            });
        }
    });
}

#[test]
fn missing_index_is_an_error() {
    let dir = tempdir().unwrap();
    let paths = IndexPaths::new(dir.path().join("nope.dict"), dir.path().join("nope.postings"));
    let queries = dir.path().join("q.txt");
    fs::write(&queries, "cat\n").unwrap();
    assert!(run_search(&paths, &queries, &dir.path().join("r.txt")).is_err());
}
