use crate::crawling::category::{CategoryMapper, MAPPING_FILE};
use crate::domain::model::{ArticleRecord, CrawledArticle};
use crate::domain::ports::Storage;
use crate::utils::error::{EtlError, Result};
use crate::utils::paths::now_datetime;
use std::collections::HashMap;
use std::sync::Mutex;

pub const CATEGORY_DIR: &str = "category";
pub const SUB_CATEGORY_DIR: &str = "sub-category";
pub const ARTICLE_DIR: &str = "article";
pub const METADATA_DIR: &str = "metadata";

/// An article with its index and directory assigned, not yet written.
#[derive(Debug, Clone)]
pub struct PreparedArticle {
    /// Directory relative to the day root, e.g. `kinh-te/sub-category/tai-chinh`.
    pub relative_dir: String,
    pub record: ArticleRecord,
    pub text: String,
}

impl PreparedArticle {
    pub fn article_path(&self) -> String {
        format!(
            "{}/{}/article_{}.txt",
            self.relative_dir, ARTICLE_DIR, self.record.index
        )
    }

    pub fn metadata_path(&self) -> String {
        format!(
            "{}/{}/metadata_{}.json",
            self.relative_dir, METADATA_DIR, self.record.index
        )
    }
}

#[derive(Default)]
struct StoreState {
    mapper: CategoryMapper,
    counters: HashMap<String, usize>,
}

/// Writes crawled articles as `article_<n>.txt` + `metadata_<n>.json` pairs.
pub struct ArticleStore<S: Storage> {
    storage: S,
    state: Mutex<StoreState>,
}

impl<S: Storage> ArticleStore<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            state: Mutex::new(StoreState::default()),
        }
    }

    fn lock_state(&self) -> Result<std::sync::MutexGuard<'_, StoreState>> {
        self.state.lock().map_err(|_| EtlError::ProcessingError {
            message: "article store state poisoned".to_string(),
        })
    }

    /// Assigns the next index for the article's (category, subcategory) key
    /// and builds its metadata record.
    pub fn prepare(&self, article: &CrawledArticle) -> Result<PreparedArticle> {
        let mut state = self.lock_state()?;

        let category_normalized = state.mapper.normalized_name(&article.category);
        let category_display = state
            .mapper
            .display_name(&category_normalized)
            .unwrap_or(&article.category)
            .to_string();

        let (subcategory_normalized, subcategory_display) = match &article.subcategory {
            Some(sub) => {
                let slug = state.mapper.normalized_name(sub);
                let display = state.mapper.display_name(&slug).unwrap_or(sub).to_string();
                (Some(slug), Some(display))
            }
            None => (None, None),
        };

        let relative_dir = match &subcategory_normalized {
            Some(sub) => format!("{}/{}/{}", category_normalized, SUB_CATEGORY_DIR, sub),
            None => format!("{}/{}", category_normalized, CATEGORY_DIR),
        };

        let key = match &article.subcategory {
            Some(sub) => format!("{}::{}", article.category, sub),
            None => article.category.clone(),
        };
        let counter = state.counters.entry(key).or_insert(0);
        *counter += 1;
        let index = *counter;

        let listing = &article.listing;
        let page = &article.content.metadata;
        let record = ArticleRecord {
            index,
            category: article.category.clone(),
            subcategory: article.subcategory.clone(),
            category_normalized,
            subcategory_normalized,
            category_display,
            subcategory_display,
            title: listing.title.clone(),
            url: listing.link.clone(),
            link: listing.link.clone(),
            crawl_date: now_datetime(),
            author: page.author.clone(),
            source: page.source.clone(),
            date: page.date.clone(),
            published_time: listing
                .published_time
                .clone()
                .or_else(|| page.published_time.clone()),
            thumbnail: listing.thumbnail.clone(),
            sapo: listing.sapo.clone(),
            featured_image: page.featured_image.clone(),
        };

        Ok(PreparedArticle {
            relative_dir,
            record,
            text: article.content.text.clone(),
        })
    }

    /// Writes the article text, its metadata and the current category mapping.
    pub async fn save(&self, prepared: &PreparedArticle) -> Result<()> {
        self.storage
            .write_file(&prepared.article_path(), prepared.text.as_bytes())
            .await?;

        let metadata = serde_json::to_vec_pretty(&prepared.record)?;
        self.storage
            .write_file(&prepared.metadata_path(), &metadata)
            .await?;

        let mapping = self.lock_state()?.mapper.to_json()?;
        self.storage.write_file(MAPPING_FILE, &mapping).await?;

        tracing::info!(
            "✓ Saved article {}: {}",
            prepared.record.index,
            prepared.relative_dir
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{ArticleContent, ArticleListing, PageMetadata};
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex as AsyncMutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<AsyncMutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(AsyncMutex::new(HashMap::new())),
            }
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                EtlError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }

        async fn exists(&self, path: &str) -> bool {
            self.files.lock().await.contains_key(path)
        }
    }

    fn article(category: &str, subcategory: Option<&str>, title: &str) -> CrawledArticle {
        CrawledArticle {
            listing: ArticleListing {
                title: title.to_string(),
                link: format!("https://baochinhphu.vn/{}.htm", title.len()),
                thumbnail: None,
                sapo: Some("Tóm tắt".to_string()),
                published_time: None,
            },
            content: ArticleContent {
                text: format!("Nội dung của {}", title),
                metadata: PageMetadata {
                    author: Some("Minh Anh".to_string()),
                    source: "baochinhphu.vn".to_string(),
                    date: Some("09/11/2025".to_string()),
                    published_time: Some("09/11/2025 10:30".to_string()),
                    featured_image: None,
                },
            },
            category: category.to_string(),
            subcategory: subcategory.map(str::to_string),
        }
    }

    #[test]
    fn test_indices_are_counted_per_category_key() {
        let store = ArticleStore::new(MockStorage::new());

        let a = store.prepare(&article("Thời sự", None, "Một")).unwrap();
        let b = store.prepare(&article("Thời sự", None, "Hai")).unwrap();
        let c = store
            .prepare(&article("Thời sự", Some("Chỉ đạo"), "Ba"))
            .unwrap();
        let d = store.prepare(&article("Kinh tế", None, "Bốn")).unwrap();

        assert_eq!((a.record.index, b.record.index), (1, 2));
        assert_eq!(c.record.index, 1);
        assert_eq!(d.record.index, 1);
        assert_eq!(a.relative_dir, "thoi-su/category");
        assert_eq!(c.relative_dir, "thoi-su/sub-category/chi-dao");
        assert_eq!(c.record.subcategory_display.as_deref(), Some("Chỉ đạo"));
        assert_eq!(b.article_path(), "thoi-su/category/article/article_2.txt");
        assert_eq!(b.metadata_path(), "thoi-su/category/metadata/metadata_2.json");
    }

    #[test]
    fn test_page_published_time_used_when_listing_has_none() {
        let store = ArticleStore::new(MockStorage::new());
        let prepared = store.prepare(&article("Thời sự", None, "Một")).unwrap();

        assert_eq!(
            prepared.record.published_time.as_deref(),
            Some("09/11/2025 10:30")
        );
        assert_eq!(prepared.record.author.as_deref(), Some("Minh Anh"));
        assert_eq!(prepared.record.url, prepared.record.link);
    }

    #[tokio::test]
    async fn test_save_writes_article_metadata_and_mapping() {
        let storage = MockStorage::new();
        let store = ArticleStore::new(storage.clone());
        let prepared = store
            .prepare(&article("Đối ngoại", Some("Tin tức"), "Một"))
            .unwrap();

        store.save(&prepared).await.unwrap();

        let text = storage
            .get_file("doi-ngoai/sub-category/tin-tuc/article/article_1.txt")
            .await
            .unwrap();
        assert_eq!(String::from_utf8(text).unwrap(), "Nội dung của Một");

        let metadata = storage
            .get_file("doi-ngoai/sub-category/tin-tuc/metadata/metadata_1.json")
            .await
            .unwrap();
        let record: ArticleRecord = serde_json::from_slice(&metadata).unwrap();
        assert_eq!(record.index, 1);
        assert_eq!(record.category_display, "Đối ngoại");
        assert!(String::from_utf8(metadata).unwrap().contains("\"Đối ngoại\""));

        let mapping = storage.get_file(MAPPING_FILE).await.unwrap();
        let mapper = CategoryMapper::from_json(&mapping).unwrap();
        assert_eq!(mapper.display_name("tin-tuc"), Some("Tin tức"));
        assert!(storage.exists(MAPPING_FILE).await);
    }
}
