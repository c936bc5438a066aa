use crate::config::cli::LocalStorage;
use crate::crawling::store::{ARTICLE_DIR, CATEGORY_DIR, METADATA_DIR, SUB_CATEGORY_DIR};
use crate::domain::model::{PreprocessStats, RawCorpus, RawDocument, SummarizedCorpus, SummarizedDocument};
use crate::domain::ports::{Pipeline, Storage};
use crate::nlp::sentence::SentenceTokenizer;
use crate::nlp::tfidf::TfidfSummarizer;
use crate::utils::error::{EtlError, Result};
use crate::utils::paths::now_datetime;
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};

pub const SUMMARY_DIR: &str = "summary";
pub const SENTENCES_DIR: &str = "sentences";
pub const SUMMARY_METHOD: &str = "tfidf-vncorenlp";
pub const VNCORENLP_VERSION: &str = "1.2";

/// Sorted sub-directories of `dir`.
async fn list_dirs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut dirs = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_dir() {
            dirs.push(entry.path());
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Ids of every `article_<id>.txt`, ordered numerically.
async fn list_articles(article_dir: &Path) -> Result<Vec<String>> {
    let mut entries = tokio::fs::read_dir(article_dir).await?;
    let mut articles = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        let id = name
            .to_str()
            .and_then(|name| name.strip_prefix("article_"))
            .and_then(|rest| rest.strip_suffix(".txt"))
            .map(str::to_string);
        if let Some(id) = id {
            articles.push(id);
        }
    }
    articles.sort_by(|a, b| {
        match (a.parse::<u64>(), b.parse::<u64>()) {
            (Ok(x), Ok(y)) => x.cmp(&y),
            _ => a.cmp(b),
        }
    });
    Ok(articles)
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Reads raw articles from the crawl output, summarizes them and writes
/// `summary/`, `sentences/` and `metadata/` next to each other under the
/// processed root held by `storage`. Raw files are read through a
/// [`LocalStorage`] rooted at the raw directory.
pub struct PreprocessPipeline<S: Storage> {
    raw: LocalStorage,
    storage: S,
    tokenizer: SentenceTokenizer,
    summarizer: TfidfSummarizer,
}

impl<S: Storage> PreprocessPipeline<S> {
    pub fn new(
        raw_dir: impl Into<PathBuf>,
        storage: S,
        tokenizer: SentenceTokenizer,
        summarizer: TfidfSummarizer,
    ) -> Self {
        Self {
            raw: LocalStorage::new(raw_dir),
            storage,
            tokenizer,
            summarizer,
        }
    }

    async fn read_group(&self, group_dir: &Path, relative_dir: String, corpus: &mut RawCorpus) -> Result<()> {
        let article_dir = group_dir.join(ARTICLE_DIR);

        if !article_dir.is_dir() {
            tracing::warn!("Article directory not found: {}", article_dir.display());
            return Ok(());
        }

        for id in list_articles(&article_dir).await? {
            let article_path = format!("{}/{}/article_{}.txt", relative_dir, ARTICLE_DIR, id);
            let metadata_path = format!("{}/{}/metadata_{}.json", relative_dir, METADATA_DIR, id);
            if !self.raw.exists(&metadata_path).await {
                tracing::warn!("Metadata not found for article {} in {}", id, relative_dir);
                corpus.stats.failed += 1;
                continue;
            }

            match self.read_document(&article_path, &metadata_path).await {
                Ok((text, metadata)) => corpus.documents.push(RawDocument {
                    article_id: id,
                    relative_dir: relative_dir.clone(),
                    text,
                    metadata,
                }),
                Err(e) => {
                    tracing::error!("Error reading article {}: {}", article_path, e);
                    corpus.stats.failed += 1;
                }
            }
        }
        Ok(())
    }

    async fn read_document(
        &self,
        article_path: &str,
        metadata_path: &str,
    ) -> Result<(String, Map<String, Value>)> {
        let text = String::from_utf8(self.raw.read_file(article_path).await?).map_err(|e| {
            EtlError::ProcessingError {
                message: format!("{} is not valid UTF-8: {}", article_path, e),
            }
        })?;
        let raw = self.raw.read_file(metadata_path).await?;
        let metadata: Map<String, Value> = serde_json::from_slice(&raw)?;
        Ok((text, metadata))
    }

    async fn write_outputs(&self, doc: &SummarizedDocument) -> Result<()> {
        let id = &doc.document.article_id;
        let dir = &doc.document.relative_dir;

        let summary_text = doc.result.summary.join(" ");
        self.storage
            .write_file(
                &format!("{}/{}/summary_{}.txt", dir, SUMMARY_DIR, id),
                summary_text.as_bytes(),
            )
            .await?;

        let sentences = json!({
            "sentences": doc.sentences,
            "selected_indices": doc.result.indices,
            "scores": doc.result.scores,
        });
        self.storage
            .write_file(
                &format!("{}/{}/sentences_{}.json", dir, SENTENCES_DIR, id),
                &serde_json::to_vec_pretty(&sentences)?,
            )
            .await?;

        let mut metadata = doc.document.metadata.clone();
        metadata.insert("summary_method".to_string(), json!(SUMMARY_METHOD));
        metadata.insert(
            "summary_sentences_count".to_string(),
            json!(doc.result.summary.len()),
        );
        metadata.insert(
            "summary_selected_indices".to_string(),
            json!(doc.result.indices),
        );
        metadata.insert("processing_date".to_string(), json!(now_datetime()));
        metadata.insert("vncorenlp_version".to_string(), json!(VNCORENLP_VERSION));
        self.storage
            .write_file(
                &format!("{}/{}/metadata_{}.json", dir, METADATA_DIR, id),
                &serde_json::to_vec_pretty(&Value::Object(metadata))?,
            )
            .await?;

        Ok(())
    }
}


#[async_trait::async_trait]
impl<S: Storage> Pipeline for PreprocessPipeline<S> {
    type Extracted = RawCorpus;
    type Transformed = SummarizedCorpus;
    type Output = PreprocessStats;

    async fn extract(&self) -> Result<RawCorpus> {
        let raw_dir = self.raw.base_path();
        if !raw_dir.is_dir() {
            return Err(EtlError::ValidationError {
                message: format!("Raw data directory not found: {}", raw_dir.display()),
            });
        }
        tracing::info!("✓ Found raw data directory: {}", raw_dir.display());

        let mut corpus = RawCorpus::default();
        for category_dir in list_dirs(raw_dir).await? {
            let category = dir_name(&category_dir);
            tracing::info!("Processing category: {}", category);
            corpus.stats.categories += 1;

            self.read_group(
                &category_dir.join(CATEGORY_DIR),
                format!("{}/{}", category, CATEGORY_DIR),
                &mut corpus,
            )
            .await?;

            let sub_root = category_dir.join(SUB_CATEGORY_DIR);
            if !sub_root.is_dir() {
                continue;
            }
            for sub_dir in list_dirs(&sub_root).await? {
                let sub = dir_name(&sub_dir);
                tracing::info!("Processing subcategory: {}/{}", category, sub);
                corpus.stats.subcategories += 1;
                self.read_group(
                    &sub_dir,
                    format!("{}/{}/{}", category, SUB_CATEGORY_DIR, sub),
                    &mut corpus,
                )
                .await?;
            }
        }

        tracing::info!("Found {} articles to summarize", corpus.documents.len());
        Ok(corpus)
    }

    async fn transform(&self, data: RawCorpus) -> Result<SummarizedCorpus> {
        let mut output = SummarizedCorpus {
            documents: Vec::with_capacity(data.documents.len()),
            stats: data.stats,
        };

        for document in data.documents {
            let title = document
                .metadata
                .get("title")
                .and_then(Value::as_str)
                .unwrap_or_default();
            let short: String = title.chars().take(50).collect();
            tracing::info!("Processing article {}: {}...", document.article_id, short);

            let sentences = self.tokenizer.tokenize(&document.text).await;
            if sentences.is_empty() {
                tracing::warn!("No sentences extracted from article {}", document.article_id);
                output.stats.failed += 1;
                continue;
            }

            let result = self.summarizer.summarize(&sentences).await;
            if result.summary.is_empty() {
                tracing::warn!("Failed to generate summary for article {}", document.article_id);
                output.stats.failed += 1;
                continue;
            }
            tracing::debug!("Generated summary: {} sentences", result.summary.len());

            output.documents.push(SummarizedDocument {
                document,
                sentences,
                result,
            });
        }

        Ok(output)
    }

    async fn load(&self, result: SummarizedCorpus) -> Result<PreprocessStats> {
        let mut stats = result.stats;

        for doc in &result.documents {
            match self.write_outputs(doc).await {
                Ok(()) => stats.processed += 1,
                Err(e) => {
                    tracing::error!(
                        "Error saving article {} in {}: {}",
                        doc.document.article_id,
                        doc.document.relative_dir,
                        e
                    );
                    stats.failed += 1;
                }
            }
        }

        tracing::info!(
            "Batch processing completed: {} processed, {} failed",
            stats.processed,
            stats.failed
        );
        Ok(stats)
    }
}
