//! HTTP client for the VnCoreNLP server started by `vncorenlp_server`.
//!
//! The server accepts `POST /handle` with the form fields `text` and `props`
//! (comma separated annotators) and answers with
//! `{"status": true, "sentences": [[{"index": 1, "form": "Chính_phủ", ...}]]}`
//! or `{"status": false, "error": "..."}`.

use crate::config::toml_config::VnCoreNlpConfig;
use crate::domain::ports::WordSegmenter;
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedWord {
    #[serde(default)]
    pub index: Option<usize>,
    pub form: String,
    #[serde(default)]
    pub pos_tag: Option<String>,
    #[serde(default)]
    pub ner_label: Option<String>,
    #[serde(default)]
    pub head: Option<i64>,
    #[serde(default)]
    pub dep_label: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnnotateResponse {
    status: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    sentences: Vec<Vec<AnnotatedWord>>,
}

pub struct VnCoreNlpClient {
    client: Client,
    base_url: String,
    annotators: String,
}

impl VnCoreNlpClient {
    pub fn new(base_url: impl Into<String>, annotators: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, annotators, Duration::from_secs(30))
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        annotators: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            annotators: annotators.into(),
        })
    }

    pub fn from_config(config: &VnCoreNlpConfig) -> Result<Self> {
        Self::with_timeout(
            config.server_url(),
            config.annotators.clone(),
            Duration::from_secs(config.request_timeout_seconds),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// True when the server answers on its root URL.
    pub async fn is_alive(&self) -> bool {
        match self.client.get(&self.base_url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!("VnCoreNLP server not reachable at {}: {}", self.base_url, e);
                false
            }
        }
    }

    pub async fn annotate(&self, text: &str, annotators: &str) -> Result<Vec<Vec<AnnotatedWord>>> {
        let url = format!("{}/handle", self.base_url);
        let response = self
            .client
            .post(&url)
            .form(&[("text", text), ("props", annotators)])
            .send()
            .await
            .map_err(|e| EtlError::SegmenterError {
                message: format!("request to {} failed: {}", url, e),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(EtlError::SegmenterError {
                message: format!("{} answered HTTP {}", url, status.as_u16()),
            });
        }

        let body: AnnotateResponse = response.json().await.map_err(|e| EtlError::SegmenterError {
            message: format!("invalid response body: {}", e),
        })?;

        if !body.status {
            return Err(EtlError::SegmenterError {
                message: body
                    .error
                    .unwrap_or_else(|| "server reported failure".to_string()),
            });
        }

        Ok(body.sentences)
    }

    /// Word-segmented sentences of `text`, e.g. `[["Chính_phủ", "họp"]]`.
    pub async fn tokenize(&self, text: &str) -> Result<Vec<Vec<String>>> {
        let sentences = self.annotate(text, &self.annotators).await?;
        Ok(sentences
            .into_iter()
            .map(|words| words.into_iter().map(|w| w.form).collect())
            .collect())
    }
}

#[async_trait]
impl WordSegmenter for VnCoreNlpClient {
    async fn segment(&self, text: &str) -> Result<Vec<Vec<String>>> {
        self.tokenize(text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_tokenize_posts_form_and_reads_forms() {
        let server = MockServer::start();
        let handle = server.mock(|when, then| {
            when.method(POST)
                .path("/handle")
                .x_www_form_urlencoded_tuple("props", "wseg")
                .x_www_form_urlencoded_tuple("text", "Chính phủ họp. Thủ tướng chủ trì.");
            then.status(200).json_body(serde_json::json!({
                "status": true,
                "sentences": [
                    [{"index": 1, "form": "Chính_phủ"}, {"index": 2, "form": "họp"}, {"index": 3, "form": "."}],
                    [{"index": 1, "form": "Thủ_tướng"}, {"index": 2, "form": "chủ_trì"}, {"index": 3, "form": "."}]
                ]
            }));
        });

        let client = VnCoreNlpClient::new(server.base_url(), "wseg").unwrap();
        let sentences = client
            .tokenize("Chính phủ họp. Thủ tướng chủ trì.")
            .await
            .unwrap();

        handle.assert();
        assert_eq!(
            sentences,
            vec![
                vec!["Chính_phủ", "họp", "."],
                vec!["Thủ_tướng", "chủ_trì", "."]
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_status_is_segmenter_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/handle");
            then.status(200)
                .json_body(serde_json::json!({"status": false, "error": "annotator not loaded"}));
        });

        let client = VnCoreNlpClient::new(server.base_url(), "wseg").unwrap();
        let err = client.segment("Xin chào").await.unwrap_err();

        match err {
            EtlError::SegmenterError { message } => assert_eq!(message, "annotator not loaded"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_is_alive() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/");
            then.status(200).body("VnCoreNLP server");
        });

        let alive = VnCoreNlpClient::new(server.base_url(), "wseg").unwrap();
        assert!(alive.is_alive().await);

        let dead = VnCoreNlpClient::with_timeout("http://127.0.0.1:1", "wseg", Duration::from_millis(200))
            .unwrap();
        assert!(!dead.is_alive().await);
    }
}
