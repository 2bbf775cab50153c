use anyhow::{Context, Result};
use boolsearch_core::persist::{load_meta, save_meta};
use boolsearch_core::tokenizer::normalize;
use boolsearch_core::{build_index, IndexConfig, IndexMeta, IndexPaths, IndexReader, FORMAT_VERSION};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build and inspect a boolean-retrieval inverted index", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index from a directory of numerically named documents
    Build {
        /// Directory of documents, one file per document
        #[arg(short = 'i', long)]
        input: PathBuf,
        /// Output dictionary file
        #[arg(short = 'd', long)]
        dictionary: PathBuf,
        /// Output postings file
        #[arg(short = 'p', long)]
        postings: PathBuf,
        /// In-memory entries allowed before a block is flushed
        #[arg(long)]
        memory_budget: Option<usize>,
        /// Directory for temporary block files
        #[arg(long)]
        temp_dir: Option<PathBuf>,
    },
    /// Print the posting lists of the given terms
    Inspect {
        #[arg(short = 'd', long)]
        dictionary: PathBuf,
        #[arg(short = 'p', long)]
        postings: PathBuf,
        /// Terms to look up; normalized the same way as query operands
        #[arg(required = true)]
        terms: Vec<String>,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(std::io::stderr).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, dictionary, postings, memory_budget, temp_dir } => {
            let paths = IndexPaths::new(dictionary, postings);
            let mut config = IndexConfig::for_dictionary(&paths.dictionary).with_env()?;
            if let Some(budget) = memory_budget {
                config.memory_budget = budget;
            }
            if let Some(dir) = temp_dir {
                config.temp_dir = dir;
            }
            build(&input, &paths, &config)
        }
        Commands::Inspect { dictionary, postings, terms } => inspect(&IndexPaths::new(dictionary, postings), &terms),
    }
}

fn build(input: &Path, paths: &IndexPaths, config: &IndexConfig) -> Result<()> {
    let summary = build_index(input, paths, config)
        .with_context(|| format!("building index from {}", input.display()))?;
    let meta = IndexMeta {
        num_docs: summary.num_docs,
        num_terms: summary.num_terms,
        num_blocks: summary.num_blocks,
        memory_budget: config.memory_budget as u64,
        created_at: time::OffsetDateTime::now_utc().format(&time::format_description::well_known::Rfc3339).unwrap_or_else(|_| "".into()),
        version: FORMAT_VERSION,
    };
    save_meta(paths, &meta)?;
    tracing::info!(dictionary = %paths.dictionary.display(), postings = %paths.postings.display(), "index build complete");
    Ok(())
}

fn inspect(paths: &IndexPaths, terms: &[String]) -> Result<()> {
    if let Ok(meta) = load_meta(paths) {
        tracing::info!(num_docs = meta.num_docs, num_terms = meta.num_terms, created_at = %meta.created_at, "index metadata");
    }
    let reader = IndexReader::open(paths).context("opening index")?;
    for raw in terms {
        let term = normalize(raw);
        match reader.term_info(&term) {
            Some(info) => {
                let list = reader.postings(&term)?;
                println!("{term}\tdf={}\toffset={}\tskip={}\t{list}", info.doc_freq, info.offset, list.spacing());
            }
            None => println!("{term}\tnot indexed"),
        }
    }
    Ok(())
}
