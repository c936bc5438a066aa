use crate::domain::ports::WordSegmenter;
use regex::Regex;
use std::sync::{Arc, OnceLock};

pub const DEFAULT_MIN_LENGTH: usize = 10;
pub const DEFAULT_MAX_LENGTH: usize = 500;

fn sentence_boundary() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[.!?]\s+").expect("valid sentence boundary regex"))
}

/// Splits article text into sentences through a [`WordSegmenter`] and keeps
/// those whose length in characters lies within `[min_length, max_length]`.
pub struct SentenceTokenizer {
    segmenter: Arc<dyn WordSegmenter>,
    min_length: usize,
    max_length: usize,
}

impl SentenceTokenizer {
    pub fn new(segmenter: Arc<dyn WordSegmenter>, min_length: usize, max_length: usize) -> Self {
        tracing::info!(
            "SentenceTokenizer initialized: min={}, max={}",
            min_length,
            max_length
        );
        Self {
            segmenter,
            min_length,
            max_length,
        }
    }

    pub fn with_defaults(segmenter: Arc<dyn WordSegmenter>) -> Self {
        Self::new(segmenter, DEFAULT_MIN_LENGTH, DEFAULT_MAX_LENGTH)
    }

    fn within_bounds(&self, sentence: &str) -> bool {
        let length = sentence.chars().count();
        self.min_length <= length && length <= self.max_length
    }

    pub async fn tokenize(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            tracing::warn!("Empty text provided");
            return Vec::new();
        }

        match self.segmenter.segment(text).await {
            Ok(segmented) => {
                let total = segmented.len();
                let kept: Vec<String> = segmented
                    .into_iter()
                    .map(|words| words.join(" ").trim().to_string())
                    .filter(|sentence| {
                        let keep = self.within_bounds(sentence);
                        if !keep {
                            tracing::debug!(
                                "Filtered sentence (length={})",
                                sentence.chars().count()
                            );
                        }
                        keep
                    })
                    .collect();
                tracing::debug!("Kept {}/{} sentences after filtering", kept.len(), total);
                kept
            }
            Err(e) => {
                tracing::warn!("Segmentation failed ({}), using fallback sentence splitting", e);
                self.fallback_tokenize(text)
            }
        }
    }

    /// Punctuation split used when the segmenter is unavailable.
    pub fn fallback_tokenize(&self, text: &str) -> Vec<String> {
        let sentences: Vec<String> = sentence_boundary()
            .split(text)
            .map(str::trim)
            .filter(|s| !s.is_empty() && self.within_bounds(s))
            .map(str::to_string)
            .collect();
        tracing::warn!("Fallback tokenization: {} sentences", sentences.len());
        sentences
    }

    pub async fn tokenize_batch(&self, texts: &[String]) -> Vec<Vec<String>> {
        let mut batches = Vec::with_capacity(texts.len());
        for text in texts {
            batches.push(self.tokenize(text).await);
        }
        batches
    }
}
