//! Error types for index construction and querying.

use std::io;
use std::path::PathBuf;

use crate::index::DocId;
use crate::query::QueryError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("cannot read {}: {source}", path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("document {doc_id} added after document {last}; ids must ascend")]
    DocumentOrder { doc_id: DocId, last: DocId },

    #[error("malformed query: {0}")]
    MalformedQuery(#[from] QueryError),

    #[error("index corruption: {0}")]
    Corruption(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("metadata error: {0}")]
    Meta(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn input(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Input { path: path.into(), source }
    }

    pub(crate) fn corrupt(msg: impl Into<String>) -> Self {
        Error::Corruption(msg.into())
    }

    /// Query-local failures are reported per line; everything else aborts the run.
    pub fn is_query_local(&self) -> bool {
        matches!(self, Error::MalformedQuery(_))
    }
}
