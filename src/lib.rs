pub mod app;
pub mod config;
pub mod core;
pub mod crawling;
pub mod domain;
pub mod nlp;
pub mod utils;

pub use config::cli::LocalStorage;
#[cfg(feature = "cli")]
pub use config::{CliConfig, Command};
pub use config::toml_config::AppConfig;

pub use app::pipelines::{CrawlLimits, CrawlPipeline, CrawlReport, LatestLink, PreprocessPipeline};
pub use core::{etl::EtlEngine, launcher::ServerLauncher};
pub use utils::error::{EtlError, Result};
