use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub const DEFAULT_MEMORY_BUDGET: usize = 1_000_000;
pub const MEMORY_BUDGET_ENV: &str = "BOOLSEARCH_MEMORY_BUDGET";
pub const TEMP_DIR_ENV: &str = "BOOLSEARCH_TEMP_DIR";

/// Settings for index construction.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// Maximum number of in-memory entries (distinct terms plus postings)
    /// the block builder holds before flushing a block.
    pub memory_budget: usize,
    /// Directory that holds the temporary block files.
    pub temp_dir: PathBuf,
}

impl IndexConfig {
    /// Defaults for an index whose dictionary lives at `dictionary`: block
    /// files go to a `blocks/` directory next to it.
    pub fn for_dictionary<P: AsRef<Path>>(dictionary: P) -> Self {
        let parent = dictionary
            .as_ref()
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self { memory_budget: DEFAULT_MEMORY_BUDGET, temp_dir: parent.join("blocks") }
    }

    /// Apply `BOOLSEARCH_MEMORY_BUDGET` and `BOOLSEARCH_TEMP_DIR` if set.
    pub fn with_env(mut self) -> Result<Self> {
        if let Ok(val) = std::env::var(MEMORY_BUDGET_ENV) {
            self.memory_budget = val.trim().parse().map_err(|_| {
                Error::Config(format!("{MEMORY_BUDGET_ENV} must be a positive integer, got {val:?}"))
            })?;
        }
        if let Ok(val) = std::env::var(TEMP_DIR_ENV) {
            if !val.trim().is_empty() {
                self.temp_dir = PathBuf::from(val);
            }
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.memory_budget == 0 {
            return Err(Error::Config("memory budget must be at least 1".into()));
        }
        Ok(())
    }
}
