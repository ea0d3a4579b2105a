//! Command-line front end: build an index from a corpus directory, or
//! run queries against one already built.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use webdex::{IndexerConfig, Indexer, SearchConfig, SearchEngine};

#[derive(Parser)]
#[command(name = "webdex", about = "Inverted-index builder and TF-IDF search engine")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build (or rebuild) an index from a corpus directory of JSON document records.
    Build {
        /// Directory containing one JSON file per document ({"url": ..., "content": ...}).
        corpus_dir: PathBuf,
        /// Directory the shard files are written to.
        index_dir: PathBuf,
        /// Path the docid -> URL map is written to.
        #[arg(long, default_value = "url_map.bin")]
        url_map: PathBuf,
    },
    /// Run a single query against an existing index.
    Search {
        index_dir: PathBuf,
        #[arg(long, default_value = "url_map.bin")]
        url_map: PathBuf,
        query: String,
        #[arg(long)]
        limit: Option<usize>,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Build { corpus_dir, index_dir, url_map } => {
            let indexer = Indexer::new(IndexerConfig::default());
            match indexer.build(&corpus_dir, &index_dir, &url_map) {
                Ok(stats) => println!(
                    "indexed {} / {} documents ({} duplicates, {} failures)",
                    stats.documents_indexed, stats.documents_seen, stats.duplicates_skipped, stats.failures
                ),
                Err(err) => {
                    eprintln!("build failed: {err}");
                    std::process::exit(1);
                }
            }
        }
        Command::Search { index_dir, url_map, query, limit } => {
            let engine = match SearchEngine::new(&index_dir, &url_map, SearchConfig::default()) {
                Ok(engine) => engine,
                Err(err) => {
                    eprintln!("could not open index: {err}");
                    std::process::exit(1);
                }
            };

            match engine.search(&query, limit) {
                Ok(results) if results.is_empty() => println!("no results"),
                Ok(results) => {
                    for (rank, result) in results.iter().enumerate() {
                        println!("{:>3}. {:.4}  {}", rank + 1, result.score, result.url);
                    }
                }
                Err(err) => {
                    eprintln!("search failed: {err}");
                    std::process::exit(1);
                }
            }
        }
    }
}
