use serde::{Deserialize, Serialize};

/// A main menu entry or a breadcrumb sub-category of the news site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub title: String,
    pub link: String,
}

/// One article entry found on a category listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleListing {
    pub title: String,
    pub link: String,
    pub thumbnail: Option<String>,
    pub sapo: Option<String>,
    pub published_time: Option<String>,
}

/// Metadata extracted from the article page itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    pub author: Option<String>,
    pub source: String,
    pub date: Option<String>,
    pub published_time: Option<String>,
    pub featured_image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleContent {
    pub text: String,
    pub metadata: PageMetadata,
}

/// A fully fetched article together with its place in the category tree.
#[derive(Debug, Clone)]
pub struct CrawledArticle {
    pub listing: ArticleListing,
    pub content: ArticleContent,
    pub category: String,
    pub subcategory: Option<String>,
}

/// JSON document written next to every raw article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub index: usize,
    pub category: String,
    pub subcategory: Option<String>,
    pub category_normalized: String,
    pub subcategory_normalized: Option<String>,
    pub category_display: String,
    pub subcategory_display: Option<String>,
    pub title: String,
    pub url: String,
    pub link: String,
    pub crawl_date: String,
    pub author: Option<String>,
    pub source: String,
    pub date: Option<String>,
    pub published_time: Option<String>,
    pub thumbnail: Option<String>,
    pub sapo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CrawlStats {
    pub categories: usize,
    pub subcategories: usize,
    pub articles: usize,
}

/// Output of the extractive summarizer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryResult {
    pub summary: Vec<String>,
    /// Ascending positions of the selected sentences.
    pub indices: Vec<usize>,
    /// One score per input sentence.
    pub scores: Vec<f64>,
}

/// A raw article paired with its metadata, ready for summarization.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub article_id: String,
    /// Output directory relative to the processed root, e.g. `thoi-su/category`.
    pub relative_dir: String,
    pub text: String,
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone)]
pub struct SummarizedDocument {
    pub document: RawDocument,
    pub sentences: Vec<String>,
    pub result: SummaryResult,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PreprocessStats {
    pub categories: usize,
    pub subcategories: usize,
    pub processed: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Default)]
pub struct RawCorpus {
    pub documents: Vec<RawDocument>,
    pub stats: PreprocessStats,
}

#[derive(Debug, Clone, Default)]
pub struct SummarizedCorpus {
    pub documents: Vec<SummarizedDocument>,
    pub stats: PreprocessStats,
}
