//! Extractive summarization: every sentence is scored by the sum of its
//! L2-normalized TF-IDF row and the best `n` are kept in document order.

use crate::config::toml_config::PreprocessingConfig;
use crate::domain::model::SummaryResult;
use crate::domain::ports::WordSegmenter;
use crate::nlp::stopwords::StopwordList;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TfidfOptions {
    pub use_idf: bool,
    pub smooth_idf: bool,
    pub sublinear_tf: bool,
}

impl Default for TfidfOptions {
    fn default() -> Self {
        Self {
            use_idf: true,
            smooth_idf: true,
            sublinear_tf: false,
        }
    }
}

impl From<&PreprocessingConfig> for TfidfOptions {
    fn from(config: &PreprocessingConfig) -> Self {
        Self {
            use_idf: config.use_idf,
            smooth_idf: config.smooth_idf,
            sublinear_tf: config.sublinear_tf,
        }
    }
}

/// Row sums of the L2-normalized TF-IDF matrix of `documents`.
///
/// Returns `None` when no document contains a single term.
pub fn tfidf_scores(documents: &[Vec<String>], options: TfidfOptions) -> Option<Vec<f64>> {
    let counts: Vec<HashMap<&str, usize>> = documents
        .iter()
        .map(|tokens| {
            let mut tf = HashMap::new();
            for token in tokens {
                *tf.entry(token.as_str()).or_insert(0) += 1;
            }
            tf
        })
        .collect();

    let mut document_frequency: HashMap<&str, usize> = HashMap::new();
    for tf in &counts {
        for term in tf.keys() {
            *document_frequency.entry(*term).or_insert(0) += 1;
        }
    }

    if document_frequency.is_empty() {
        return None;
    }

    let n = documents.len() as f64;
    let idf = |term: &str| -> f64 {
        if !options.use_idf {
            return 1.0;
        }
        let df = document_frequency.get(term).copied().unwrap_or(0) as f64;
        if options.smooth_idf {
            ((1.0 + n) / (1.0 + df)).ln() + 1.0
        } else {
            (n / df).ln() + 1.0
        }
    };

    let scores = counts
        .iter()
        .map(|tf| {
            let weights: Vec<f64> = tf
                .iter()
                .map(|(term, &count)| {
                    let count = count as f64;
                    let weight = if options.sublinear_tf {
                        1.0 + count.ln()
                    } else {
                        count
                    };
                    weight * idf(*term)
                })
                .collect();

            let norm = weights.iter().map(|w| w * w).sum::<f64>().sqrt();
            if norm == 0.0 {
                0.0
            } else {
                weights.iter().map(|w| w / norm).sum()
            }
        })
        .collect();

    Some(scores)
}

/// Indices of the `n` highest scores in ascending position order. Equal
/// scores prefer the earlier sentence.
pub fn select_top(scores: &[f64], n: usize) -> Vec<usize> {
    let mut ranked: Vec<usize> = (0..scores.len()).collect();
    ranked.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]).then(a.cmp(&b)));
    ranked.truncate(n);
    ranked.sort_unstable();
    ranked
}

fn is_word(token: &str) -> bool {
    !token.is_empty() && token.chars().all(char::is_alphanumeric)
}

pub struct TfidfSummarizer {
    segmenter: Arc<dyn WordSegmenter>,
    stopwords: StopwordList,
    num_sentences: usize,
    options: TfidfOptions,
}

impl TfidfSummarizer {
    pub fn new(
        segmenter: Arc<dyn WordSegmenter>,
        stopwords: StopwordList,
        num_sentences: usize,
        options: TfidfOptions,
    ) -> Self {
        tracing::info!(
            "TfidfSummarizer initialized: num_sentences={}, stopwords={}",
            num_sentences,
            stopwords.len()
        );
        Self {
            segmenter,
            stopwords,
            num_sentences,
            options,
        }
    }

    /// Lowercased words of `sentence`, without punctuation and stopwords.
    pub async fn terms(&self, sentence: &str) -> Vec<String> {
        match self.segmenter.segment(sentence).await {
            Ok(segmented) => segmented
                .into_iter()
                .flatten()
                .map(|word| word.to_lowercase())
                .filter(|word| is_word(&word.replace('_', "")) && !self.stopwords.contains(word))
                .collect(),
            Err(e) => {
                tracing::warn!("Segmentation failed ({}), using whitespace tokens", e);
                sentence
                    .to_lowercase()
                    .split_whitespace()
                    .filter(|token| is_word(token) && !self.stopwords.contains(token))
                    .map(str::to_string)
                    .collect()
            }
        }
    }

    pub async fn summarize(&self, sentences: &[String]) -> SummaryResult {
        if sentences.is_empty() {
            tracing::warn!("No sentences to summarize");
            return SummaryResult::default();
        }

        let n = self.num_sentences.min(sentences.len());
        if sentences.len() <= n {
            tracing::info!("Document has {} sentences, returning all", sentences.len());
            return SummaryResult {
                summary: sentences.to_vec(),
                indices: (0..sentences.len()).collect(),
                scores: vec![1.0; sentences.len()],
            };
        }

        let mut documents = Vec::with_capacity(sentences.len());
        for sentence in sentences {
            documents.push(self.terms(sentence).await);
        }

        let Some(scores) = tfidf_scores(&documents, self.options) else {
            tracing::warn!("Empty vocabulary after stopword filtering");
            return SummaryResult::default();
        };

        let indices = select_top(&scores, n);
        tracing::debug!("Selected sentences at indices: {:?}", indices);

        SummaryResult {
            summary: indices.iter().map(|&i| sentences[i].clone()).collect(),
            indices,
            scores,
        }
    }
}
