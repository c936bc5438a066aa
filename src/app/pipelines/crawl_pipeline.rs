use crate::crawling::scraper::NewsScraper;
use crate::crawling::store::ArticleStore;
use crate::domain::model::{Category, CrawlStats, CrawledArticle};
use crate::domain::ports::{Pipeline, Storage};
use crate::utils::error::Result;
use crate::utils::paths::create_latest_symlink;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlLimits {
    pub max_categories: Option<usize>,
    pub max_subcategories: Option<usize>,
    pub max_articles: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlReport {
    /// `articles` counts the articles actually written.
    pub stats: CrawlStats,
    pub failed: usize,
    pub latest_linked: bool,
}

/// `data/raw` and the day directory the crawl writes into. When set, a
/// `latest` symlink is pointed at the day once the crawl is done.
#[derive(Debug, Clone)]
pub struct LatestLink {
    pub base_dir: PathBuf,
    pub day: String,
}

pub struct CrawlPipeline<S: Storage> {
    scraper: NewsScraper,
    store: ArticleStore<S>,
    limits: CrawlLimits,
    latest: Option<LatestLink>,
}

impl<S: Storage> CrawlPipeline<S> {
    pub fn new(scraper: NewsScraper, storage: S, limits: CrawlLimits) -> Self {
        Self {
            scraper,
            store: ArticleStore::new(storage),
            limits,
            latest: None,
        }
    }

    pub fn with_latest_link(mut self, link: LatestLink) -> Self {
        self.latest = Some(link);
        self
    }

    /// Writes one category's articles, returning how many were saved and how many failed.
    async fn persist(&self, articles: &[CrawledArticle]) -> (usize, usize) {
        let mut saved = 0;
        let mut failed = 0;
        for article in articles {
            let result = match self.store.prepare(article) {
                Ok(prepared) => self.store.save(&prepared).await,
                Err(e) => Err(e),
            };
            match result {
                Ok(()) => saved += 1,
                Err(e) => {
                    failed += 1;
                    tracing::error!("Failed to save {}: {}", article.listing.link, e);
                }
            }
        }
        (saved, failed)
    }
}

#[async_trait::async_trait]
impl<S: Storage> Pipeline for CrawlPipeline<S> {
    type Extracted = Vec<Category>;
    type Transformed = CrawlReport;
    type Output = CrawlReport;

    async fn extract(&self) -> Result<Vec<Category>> {
        let mut categories = self.scraper.get_main_categories().await?;
        if categories.is_empty() {
            tracing::warn!("No categories found!");
            return Ok(categories);
        }
        if let Some(max) = self.limits.max_categories {
            categories.truncate(max);
            tracing::info!("Limited to {} categories", categories.len());
        }
        Ok(categories)
    }

    /// Crawls the categories one by one. Each category is written to storage
    /// before the next one is fetched.
    async fn transform(&self, categories: Vec<Category>) -> Result<CrawlReport> {
        let mut report = CrawlReport::default();
        let total = categories.len();
        let pause = Duration::from_millis(self.scraper.config().delay_between_categories_ms);

        for (idx, category) in categories.iter().enumerate() {
            tracing::info!("📁 Category {}/{}: {}", idx + 1, total, category.title);

            match self
                .scraper
                .crawl_category(
                    category,
                    self.limits.max_subcategories,
                    self.limits.max_articles,
                )
                .await
            {
                Ok(crawl) => {
                    let (saved, failed) = self.persist(&crawl.articles).await;
                    tracing::info!(
                        "  ✓ Done: {} sub-categories, {} articles saved",
                        crawl.subcategories,
                        saved
                    );
                    report.stats.categories += 1;
                    report.stats.subcategories += crawl.subcategories;
                    report.stats.articles += saved;
                    report.failed += failed;
                }
                Err(e) => {
                    tracing::error!("  ✗ Error processing category {}: {}", category.title, e);
                }
            }

            if idx + 1 < total && !pause.is_zero() {
                tokio::time::sleep(pause).await;
            }
        }

        Ok(report)
    }

    async fn load(&self, mut report: CrawlReport) -> Result<CrawlReport> {
        report.latest_linked = match &self.latest {
            Some(link) => match create_latest_symlink(&link.base_dir, &link.day) {
                Ok(()) => {
                    tracing::info!(
                        "✓ Symlink 'latest': {}/latest -> {}",
                        link.base_dir.display(),
                        link.day
                    );
                    true
                }
                Err(e) => {
                    tracing::warn!("Could not create symlink: {}", e);
                    false
                }
            },
            None => false,
        };

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::cli::LocalStorage;
    use crate::config::toml_config::CrawlerConfig;
    use crate::core::etl::EtlEngine;
    use httpmock::prelude::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_unreachable_home_page_fails_extract() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/");
            then.status(500);
        });

        let config = CrawlerConfig {
            base_url: server.base_url(),
            max_retries: 1,
            ..CrawlerConfig::default()
        }
        .without_delays();
        let temp = TempDir::new().unwrap();
        let pipeline = CrawlPipeline::new(
            NewsScraper::new(config).unwrap(),
            LocalStorage::new(temp.path()),
            CrawlLimits::default(),
        );

        let result = EtlEngine::new(pipeline).run().await;
        tokio_test::assert_err!(result);
    }

    #[tokio::test]
    async fn test_broken_category_does_not_stop_the_crawl() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/");
            then.status(200).body(
                r#"<div class="header__menu"><ul>
                    <li><a href="/hong.htm">Hỏng</a></li>
                    <li><a href="/tot.htm">Tốt</a></li>
                </ul></div>"#,
            );
        });
        server.mock(|when, then| {
            when.method(GET).path("/hong.htm");
            then.status(404);
        });
        server.mock(|when, then| {
            when.method(GET).path("/tot.htm");
            then.status(200).body("<html><body></body></html>");
        });

        let config = CrawlerConfig {
            base_url: server.base_url(),
            max_retries: 1,
            ..CrawlerConfig::default()
        }
        .without_delays();
        let temp = TempDir::new().unwrap();
        let pipeline = CrawlPipeline::new(
            NewsScraper::new(config).unwrap(),
            LocalStorage::new(temp.path()),
            CrawlLimits::default(),
        );

        let report = EtlEngine::new(pipeline).run().await.unwrap();

        assert_eq!(report.stats.categories, 1);
        assert_eq!(report.stats.articles, 0);
        assert_eq!(report.failed, 0);
        assert!(!report.latest_linked);
    }
}
