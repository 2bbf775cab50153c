pub mod block;
pub mod config;
pub mod corpus;
pub mod error;
pub mod eval;
pub mod index;
pub mod indexing;
pub mod merge;
pub mod persist;
pub mod postings;
pub mod query;
pub mod setops;
pub mod tokenizer;

pub use config::IndexConfig;
pub use error::{Error, Result};
pub use eval::{Evaluator, INVALID_QUERY};
pub use index::{DictionaryEntry, DocId, IndexMeta, TermInfo, FORMAT_VERSION, UNIVERSE_KEY};
pub use indexing::build_index;
pub use persist::{IndexPaths, IndexReader};
pub use postings::PostingList;
