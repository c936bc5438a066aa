use crate::config::toml_config::CrawlerConfig;
use crate::crawling::parser;
use crate::crawling::retry::with_retry;
use crate::domain::model::{ArticleContent, ArticleListing, Category, CrawledArticle};
use crate::utils::error::{EtlError, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use std::time::Duration;

/// Articles fetched for one main category and its sub-categories.
#[derive(Debug, Clone, Default)]
pub struct CategoryCrawl {
    pub articles: Vec<CrawledArticle>,
    /// Sub-categories whose listing page yielded at least one article.
    pub subcategories: usize,
}

pub struct NewsScraper {
    client: Client,
    config: CrawlerConfig,
}

fn short_title(title: &str) -> String {
    let short: String = title.chars().take(50).collect();
    if short.len() < title.len() {
        format!("{}...", short)
    } else {
        short
    }
}

async fn pause(ms: u64) {
    if ms > 0 {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}

impl NewsScraper {
    pub fn new(config: CrawlerConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        for (key, value) in &config.headers {
            let name = HeaderName::from_bytes(key.as_bytes()).map_err(|e| {
                EtlError::InvalidConfigValueError {
                    field: "crawler.headers".to_string(),
                    value: key.clone(),
                    reason: e.to_string(),
                }
            })?;
            let value =
                HeaderValue::from_str(value).map_err(|e| EtlError::InvalidConfigValueError {
                    field: format!("crawler.headers.{}", key),
                    value: value.clone(),
                    reason: e.to_string(),
                })?;
            headers.insert(name, value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout())
            .build()?;

        tracing::info!("NewsScraper initialized for {}", config.base_url);
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &CrawlerConfig {
        &self.config
    }

    async fn fetch_once(&self, url: &str) -> Result<String> {
        tracing::debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(EtlError::HttpStatusError {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.text().await?)
    }

    /// GET with the configured retry policy.
    pub async fn fetch_html(&self, url: &str) -> Result<String> {
        with_retry(
            "fetch_html",
            self.config.max_retries,
            Duration::from_millis(self.config.retry_delay_ms),
            move || self.fetch_once(url),
        )
        .await
    }

    pub async fn get_main_categories(&self) -> Result<Vec<Category>> {
        tracing::info!("Fetching main categories...");
        let html = self.fetch_html(&self.config.base_url).await?;
        let categories = parser::parse_main_categories(
            &html,
            &self.config.base_url,
            &self.config.excluded_categories,
        )?;
        tracing::info!("✓ Found {} categories", categories.len());
        Ok(categories)
    }

    pub async fn get_subcategories(&self, category_url: &str) -> Result<Vec<Category>> {
        let html = self.fetch_html(category_url).await?;
        parser::parse_subcategories(&html, category_url, &self.config.base_url)
    }

    pub async fn get_articles_from_page(
        &self,
        page_url: &str,
        max_articles: Option<usize>,
    ) -> Result<Vec<ArticleListing>> {
        let html = self.fetch_html(page_url).await?;
        let articles = parser::parse_article_listings(&html, &self.config.base_url, max_articles)?;
        tracing::info!("      ✓ Found {} articles", articles.len());
        Ok(articles)
    }

    pub async fn get_article_content(&self, article_url: &str) -> Result<Option<ArticleContent>> {
        let html = self.fetch_html(article_url).await?;
        parser::parse_article_content(&html, &self.config.base_url, &self.config.source_name)
    }

    async fn fetch_articles(
        &self,
        listings: Vec<ArticleListing>,
        category: &Category,
        subcategory: Option<&Category>,
        out: &mut Vec<CrawledArticle>,
    ) {
        let total = listings.len();
        for (idx, listing) in listings.into_iter().enumerate() {
            tracing::info!(
                "    📄 Article {}/{}: {}",
                idx + 1,
                total,
                short_title(&listing.title)
            );

            match self.get_article_content(&listing.link).await {
                Ok(Some(content)) if !content.text.is_empty() => out.push(CrawledArticle {
                    listing,
                    content,
                    category: category.title.clone(),
                    subcategory: subcategory.map(|s| s.title.clone()),
                }),
                Ok(_) => tracing::warn!("No content found at {}", listing.link),
                Err(e) => tracing::warn!("Skipping article {}: {}", listing.link, e),
            }

            pause(self.config.delay_between_requests_ms).await;
        }
    }

    /// Main category listing first, then every (limited) sub-category.
    pub async fn crawl_category(
        &self,
        category: &Category,
        max_subcategories: Option<usize>,
        max_articles: Option<usize>,
    ) -> Result<CategoryCrawl> {
        let mut crawl = CategoryCrawl::default();

        tracing::info!("  📂 Crawling main category...");
        let listings = self
            .get_articles_from_page(&category.link, max_articles)
            .await?;
        self.fetch_articles(listings, category, None, &mut crawl.articles)
            .await;

        let mut subcategories = self.get_subcategories(&category.link).await?;
        if let Some(max) = max_subcategories {
            subcategories.truncate(max);
        }

        for sub in &subcategories {
            tracing::info!("  📁 Sub-category: {}", sub.title);

            match self.get_articles_from_page(&sub.link, max_articles).await {
                Ok(listings) => {
                    if !listings.is_empty() {
                        crawl.subcategories += 1;
                    }
                    self.fetch_articles(listings, category, Some(sub), &mut crawl.articles)
                        .await;
                }
                Err(e) => tracing::warn!("Skipping sub-category {}: {}", sub.title, e),
            }

            pause(self.config.delay_between_subcategories_ms).await;
        }

        Ok(crawl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn test_config(base_url: String) -> CrawlerConfig {
        CrawlerConfig {
            base_url,
            max_retries: 2,
            ..CrawlerConfig::default()
        }
        .without_delays()
    }

    #[tokio::test]
    async fn test_fetch_retries_then_fails_on_server_error() {
        let server = MockServer::start();
        let failing = server.mock(|when, then| {
            when.method(GET).path("/");
            then.status(503);
        });

        let scraper = NewsScraper::new(test_config(server.base_url())).unwrap();
        let result = scraper.get_main_categories().await;

        failing.assert_hits(2);
        assert!(matches!(
            result,
            Err(EtlError::HttpStatusError { status: 503, .. })
        ));
    }

    #[tokio::test]
    async fn test_sends_configured_headers() {
        let server = MockServer::start();
        let home = server.mock(|when, then| {
            when.method(GET)
                .path("/")
                .header("user-agent", "Mozilla/5.0 (compatible; vnnews-etl/0.1)");
            then.status(200)
                .body(r#"<div class="header__menu"><ul><li><a href="/thoi-su.htm">Thời sự</a></li></ul></div>"#);
        });

        let scraper = NewsScraper::new(test_config(server.base_url())).unwrap();
        let categories = scraper.get_main_categories().await.unwrap();

        home.assert();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].link, server.url("/thoi-su.htm"));
    }

    #[test]
    fn test_invalid_header_is_config_error() {
        let mut config = CrawlerConfig::default();
        config
            .headers
            .insert("Bad Header".to_string(), "x".to_string());

        let result = NewsScraper::new(config);
        assert!(matches!(
            result,
            Err(EtlError::InvalidConfigValueError { .. })
        ));
    }

    #[test]
    fn test_short_title() {
        assert_eq!(short_title("Ngắn"), "Ngắn");
        let long = "Ư".repeat(60);
        assert_eq!(short_title(&long), format!("{}...", "Ư".repeat(50)));
    }
}
