use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use vnnews_etl::crawling::NewsScraper;
use vnnews_etl::domain::ports::WordSegmenter;
use vnnews_etl::nlp::setup::SetupOutcome;
use vnnews_etl::nlp::tfidf::TfidfOptions;
use vnnews_etl::nlp::{SentenceTokenizer, StopwordList, TfidfSummarizer, VnCoreNlpClient, VnCoreNlpInstaller};
use vnnews_etl::utils::paths::today_dir;
use vnnews_etl::utils::{logger, validation::Validate};
use vnnews_etl::{
    AppConfig, CliConfig, Command, CrawlLimits, CrawlPipeline, EtlEngine, EtlError, LatestLink,
    LocalStorage, PreprocessPipeline,
};

fn report_failure(e: &EtlError) {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
}

fn exit_on_error(e: EtlError) -> ! {
    report_failure(&e);
    std::process::exit(e.exit_code().max(1));
}

/// Console plus `<log_dir>/<file_name>`; console only when the file cannot be opened.
fn init_logging(verbose: bool, log_dir: &Path, file_name: &str) {
    match logger::init_file_logger(verbose, log_dir, file_name) {
        Ok(path) => tracing::info!("📝 Logging to {}", path.display()),
        Err(e) => {
            logger::init_cli_logger(verbose);
            tracing::warn!("Could not open log file in {}: {}", log_dir.display(), e);
        }
    }
}

async fn run_crawl(
    config: &AppConfig,
    monitor: bool,
    day: &str,
    limits: CrawlLimits,
) -> vnnews_etl::Result<()> {
    let output_dir = config.paths.raw_dir_for(day);

    tracing::info!("📅 Crawl date: {}", day);
    tracing::info!("  - Max categories: {}", describe_limit(limits.max_categories));
    tracing::info!("  - Max subcategories: {}", describe_limit(limits.max_subcategories));
    tracing::info!("  - Max articles: {}", describe_limit(limits.max_articles));
    tracing::info!("  - Output directory: {}", output_dir.display());

    let scraper = NewsScraper::new(config.crawler.clone())?;
    let pipeline = CrawlPipeline::new(scraper, LocalStorage::new(&output_dir), limits)
        .with_latest_link(LatestLink {
            base_dir: PathBuf::from(&config.paths.raw_data_base),
            day: day.to_string(),
        });

    let engine = EtlEngine::new_with_monitoring(pipeline, monitor);
    let report = engine.run().await?;

    println!("✅ Crawled {} categories", report.stats.categories);
    println!("✅ Crawled {} sub-categories", report.stats.subcategories);
    println!("✅ Saved {} articles", report.stats.articles);
    if report.failed > 0 {
        println!("⚠  {} articles could not be saved", report.failed);
    }
    println!("📁 Data saved to: {}", output_dir.display());
    if report.latest_linked {
        println!("🔗 {}/latest -> {}", config.paths.raw_data_base, day);
    }
    Ok(())
}

fn describe_limit(limit: Option<usize>) -> String {
    limit.map_or_else(|| "ALL".to_string(), |n| n.to_string())
}

async fn run_preprocess(
    config: &AppConfig,
    monitor: bool,
    raw_dir: PathBuf,
    processed_dir: PathBuf,
    num_sentences: usize,
    skip_server_check: bool,
) -> vnnews_etl::Result<()> {
    tracing::info!("  Raw data: {}", raw_dir.display());
    tracing::info!("  Processed data: {}", processed_dir.display());
    tracing::info!("  Summary sentences: {}", num_sentences);

    let client = VnCoreNlpClient::from_config(&config.vncorenlp)?;
    if !skip_server_check && !client.is_alive().await {
        tracing::error!(
            "VnCoreNLP server is not running. Start it with `vncorenlp_server` (runs `{}` in {})",
            vnnews_etl::core::launcher::ServerSettings::from(config).command_line(),
            config.paths.vncorenlp_dir
        );
        return Err(EtlError::SegmenterError {
            message: format!("server not reachable at {}", client.base_url()),
        });
    }

    let segmenter: Arc<dyn WordSegmenter> = Arc::new(client);
    let pre = &config.preprocessing;
    let stopwords = StopwordList::load(Path::new(&pre.stopwords_file));
    let tokenizer = SentenceTokenizer::new(
        segmenter.clone(),
        pre.min_sentence_length,
        pre.max_sentence_length,
    );
    let summarizer =
        TfidfSummarizer::new(segmenter, stopwords, num_sentences, TfidfOptions::from(pre));

    let pipeline = PreprocessPipeline::new(
        &raw_dir,
        LocalStorage::new(&processed_dir),
        tokenizer,
        summarizer,
    );
    let stats = EtlEngine::new_with_monitoring(pipeline, monitor)
        .run()
        .await?;

    println!("✅ Processed {} main categories", stats.categories);
    println!("✅ Processed {} sub-categories", stats.subcategories);
    println!("✅ Summarized {} articles", stats.processed);
    if stats.failed > 0 {
        println!("⚠  {} articles failed", stats.failed);
    }
    println!("📁 Data saved to: {}", processed_dir.display());
    Ok(())
}

async fn run_setup(config: &AppConfig) -> vnnews_etl::Result<()> {
    let installer = VnCoreNlpInstaller::new(&config.paths.vncorenlp_dir, &config.vncorenlp);
    installer.check_java().await?;

    match installer.setup().await? {
        SetupOutcome::AlreadyInstalled => println!("✓ VnCoreNLP is already installed"),
        SetupOutcome::Installed => println!("✓ VnCoreNLP installed successfully!"),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            logger::init_cli_logger(cli.verbose);
            exit_on_error(e);
        }
    };

    let day = today_dir();
    match &cli.command {
        Command::Crawl { .. } => init_logging(
            cli.verbose,
            &config.paths.log_dir_for("crawling", &day),
            "crawler.log",
        ),
        Command::Preprocess { .. } => init_logging(
            cli.verbose,
            &config.paths.log_dir_for("preprocessing", &day),
            "processing.log",
        ),
        Command::Setup => logger::init_cli_logger(cli.verbose),
    }

    tracing::info!("Starting vnnews-etl");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed");
        exit_on_error(e);
    }

    let monitor = cli.monitor || config.monitoring.enabled;
    if monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    let outcome = match cli.command {
        Command::Crawl {
            max_categories,
            max_subcategories,
            max_articles,
        } => {
            let limits = CrawlLimits {
                max_categories: max_categories.or(config.crawler.max_categories),
                max_subcategories: max_subcategories.or(config.crawler.max_subcategories),
                max_articles: max_articles.or(config.crawler.max_articles),
            };
            run_crawl(&config, monitor, &day, limits).await
        }
        Command::Preprocess {
            raw_dir,
            processed_dir,
            num_sentences,
            skip_server_check,
        } => {
            run_preprocess(
                &config,
                monitor,
                raw_dir.unwrap_or_else(|| config.paths.raw_dir_for(&day)),
                processed_dir.unwrap_or_else(|| config.paths.processed_dir_for(&day)),
                num_sentences.unwrap_or(config.preprocessing.summary_sentence_count),
                skip_server_check,
            )
            .await
        }
        Command::Setup => run_setup(&config).await,
    };

    match outcome {
        Ok(()) => tracing::info!("✅ Completed successfully"),
        Err(e) => {
            report_failure(&e);
            let exit_code = e.exit_code();
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}
