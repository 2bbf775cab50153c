//! Document enumeration: one plain-text file per document, named by its id.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::index::DocId;

/// List the documents in `dir` in ascending id order. Symlinks are followed,
/// so a dangling link is an input error. Directories and entries whose file
/// name is not an unsigned integer are skipped with a warning.
pub fn list_documents<P: AsRef<Path>>(dir: P) -> Result<Vec<(DocId, PathBuf)>> {
    let dir = dir.as_ref();
    let mut docs: BTreeMap<DocId, PathBuf> = BTreeMap::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(true) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            Error::input(path, e.into())
        })?;
        if !entry.file_type().is_file() {
            tracing::warn!(path = %entry.path().display(), "skipping entry that is not a regular file");
            continue;
        }
        let path = entry.path();
        let Some(doc_id) = path.file_name().and_then(|n| n.to_str()).and_then(|n| n.parse::<DocId>().ok()) else {
            tracing::warn!(path = %path.display(), "skipping file without a numeric document id");
            continue;
        };
        if let Some(prev) = docs.insert(doc_id, path.to_path_buf()) {
            return Err(Error::input(
                path,
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("document id {doc_id} also used by {}", prev.display()),
                ),
            ));
        }
    }
    Ok(docs.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn orders_numerically_and_skips_non_numeric() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["10", "9", "100", "notes.txt"] {
            fs::write(dir.path().join(name), "x").unwrap();
        }
        fs::create_dir(dir.path().join("5")).unwrap();
        let ids: Vec<DocId> = list_documents(dir.path()).unwrap().into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![9, 10, 100]);
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_documents_are_listed() {
        let dir = tempfile::tempdir().unwrap();
        let docs = dir.path().join("docs");
        fs::create_dir(&docs).unwrap();
        fs::write(docs.join("1"), "a").unwrap();
        fs::write(dir.path().join("elsewhere"), "b").unwrap();
        std::os::unix::fs::symlink(dir.path().join("elsewhere"), docs.join("2")).unwrap();
        let ids: Vec<DocId> = list_documents(&docs).unwrap().into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[cfg(unix)]
    #[test]
    fn dangling_link_is_an_input_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("1"), "a").unwrap();
        std::os::unix::fs::symlink(dir.path().join("missing"), dir.path().join("3")).unwrap();
        assert!(matches!(list_documents(dir.path()), Err(Error::Input { .. })));
    }

    #[test]
    fn colliding_ids_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("7"), "a").unwrap();
        fs::write(dir.path().join("007"), "b").unwrap();
        assert!(matches!(list_documents(dir.path()), Err(Error::Input { .. })));
    }

    #[test]
    fn missing_directory_is_an_input_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(list_documents(dir.path().join("nope")), Err(Error::Input { .. })));
    }
}
