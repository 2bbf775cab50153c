use anyhow::Result;
use boolsearch_core::IndexPaths;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "search")]
#[command(about = "Evaluate a file of boolean queries against an index")]
struct Args {
    /// Dictionary file
    #[arg(short = 'd', long)]
    dictionary: PathBuf,
    /// Postings file
    #[arg(short = 'p', long)]
    postings: PathBuf,
    /// File of queries, one per line
    #[arg(short = 'q', long)]
    queries: PathBuf,
    /// Output file of results
    #[arg(short = 'o', long)]
    output: PathBuf,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(std::io::stderr).init();
    let args = Args::parse();
    let paths = IndexPaths::new(&args.dictionary, &args.postings);
    search::run_search(&paths, &args.queries, &args.output)?;
    Ok(())
}
