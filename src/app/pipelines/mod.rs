pub mod crawl_pipeline;
pub mod preprocess_pipeline;

pub use crawl_pipeline::{CrawlLimits, CrawlPipeline, CrawlReport, LatestLink};
pub use preprocess_pipeline::PreprocessPipeline;
