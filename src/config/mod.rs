pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use std::path::PathBuf;

/// Counts given on the command line must be at least 1.
#[cfg(feature = "cli")]
fn positive_count(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "vnnews-etl")]
#[command(about = "Crawl baochinhphu.vn and summarize articles with VnCoreNLP")]
pub struct CliConfig {
    /// Path to TOML configuration file (defaults to ./vnnews.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Crawl categories and articles into data/raw/<today>
    Crawl {
        #[arg(long, value_parser = positive_count)]
        max_categories: Option<usize>,

        #[arg(long, value_parser = positive_count)]
        max_subcategories: Option<usize>,

        #[arg(long, value_parser = positive_count)]
        max_articles: Option<usize>,
    },

    /// Summarize crawled articles into data/processed/<today>
    Preprocess {
        #[arg(long)]
        raw_dir: Option<PathBuf>,

        #[arg(long)]
        processed_dir: Option<PathBuf>,

        #[arg(long, value_parser = positive_count)]
        num_sentences: Option<usize>,

        /// Skip the VnCoreNLP liveness check before processing
        #[arg(long)]
        skip_server_check: bool,
    },

    /// Check Java, download VnCoreNLP and write the default stopword list
    Setup,
}
