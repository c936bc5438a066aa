use httpmock::prelude::*;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use vnnews_etl::domain::ports::WordSegmenter;
use vnnews_etl::nlp::tfidf::TfidfOptions;
use vnnews_etl::nlp::{SentenceTokenizer, StopwordList, TfidfSummarizer, VnCoreNlpClient};
use vnnews_etl::{EtlEngine, LocalStorage, PreprocessPipeline};

const ARTICLE: &str = "Chính phủ họp phiên thường kỳ tháng mười. Thủ tướng yêu cầu đẩy mạnh giải ngân. Kinh tế tăng trưởng khá.";

const SEGMENTED: [&[&str]; 3] = [
    &["Chính_phủ", "họp", "phiên", "thường_kỳ", "tháng", "mười", "."],
    &["Thủ_tướng", "yêu_cầu", "đẩy_mạnh", "giải_ngân", "."],
    &["Kinh_tế", "tăng_trưởng", "khá", "."],
];

fn annotated(sentences: &[&[&str]]) -> Value {
    let sentences: Vec<Value> = sentences
        .iter()
        .map(|words| {
            Value::Array(
                words
                    .iter()
                    .enumerate()
                    .map(|(i, form)| serde_json::json!({"index": i + 1, "form": form}))
                    .collect(),
            )
        })
        .collect();
    serde_json::json!({"status": true, "sentences": sentences})
}

fn mock_segmentation(server: &MockServer, text: &str, sentences: &[&[&str]]) {
    let body = annotated(sentences);
    server.mock(|when, then| {
        when.method(POST)
            .path("/handle")
            .x_www_form_urlencoded_tuple("text", text);
        then.status(200).json_body(body);
    });
}

fn write_raw_article(raw: &Path) {
    let group = raw.join("thoi-su/category");
    std::fs::create_dir_all(group.join("article")).unwrap();
    std::fs::create_dir_all(group.join("metadata")).unwrap();
    std::fs::write(group.join("article/article_1.txt"), ARTICLE).unwrap();
    std::fs::write(
        group.join("metadata/metadata_1.json"),
        r#"{"index": 1, "title": "Phiên họp Chính phủ thường kỳ", "category": "Thời sự"}"#,
    )
    .unwrap();
}

fn pipeline(
    client: VnCoreNlpClient,
    raw: &Path,
    processed: &Path,
) -> PreprocessPipeline<LocalStorage> {
    let segmenter: Arc<dyn WordSegmenter> = Arc::new(client);
    PreprocessPipeline::new(
        raw,
        LocalStorage::new(processed),
        SentenceTokenizer::with_defaults(segmenter.clone()),
        TfidfSummarizer::new(
            segmenter,
            StopwordList::load(Path::new("missing-stopwords.txt")),
            2,
            TfidfOptions::default(),
        ),
    )
}

fn read_json(path: &Path) -> Value {
    serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap()
}

#[tokio::test]
async fn test_end_to_end_preprocess_against_mocked_vncorenlp() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/");
        then.status(200);
    });
    mock_segmentation(&server, ARTICLE, &SEGMENTED);
    for words in SEGMENTED {
        mock_segmentation(&server, &words.join(" "), &[words]);
    }

    let temp = TempDir::new().unwrap();
    let raw = temp.path().join("raw");
    let processed = temp.path().join("processed");
    write_raw_article(&raw);

    let client = VnCoreNlpClient::new(server.base_url(), "wseg").unwrap();
    assert!(client.is_alive().await);

    let stats = EtlEngine::new(pipeline(client, &raw, &processed))
        .run()
        .await
        .unwrap();

    assert_eq!(stats.categories, 1);
    assert_eq!(stats.subcategories, 0);
    assert_eq!(stats.processed, 1);
    assert_eq!(stats.failed, 0);

    let out = processed.join("thoi-su/category");
    let summary = std::fs::read_to_string(out.join("summary/summary_1.txt")).unwrap();
    assert_eq!(
        summary,
        "Chính_phủ họp phiên thường_kỳ tháng mười . Thủ_tướng yêu_cầu đẩy_mạnh giải_ngân ."
    );

    let sentences = read_json(&out.join("sentences/sentences_1.json"));
    assert_eq!(sentences["sentences"].as_array().unwrap().len(), 3);
    assert_eq!(sentences["selected_indices"], serde_json::json!([0, 1]));

    let metadata = read_json(&out.join("metadata/metadata_1.json"));
    assert_eq!(metadata["category"], "Thời sự");
    assert_eq!(metadata["summary_method"], "tfidf-vncorenlp");
    assert_eq!(metadata["summary_sentences_count"], 2);
    assert_eq!(metadata["summary_selected_indices"], serde_json::json!([0, 1]));
    assert_eq!(metadata["vncorenlp_version"], "1.2");
}

#[tokio::test]
async fn test_unreachable_server_falls_back_to_plain_splitting() {
    let temp = TempDir::new().unwrap();
    let raw = temp.path().join("raw");
    let processed = temp.path().join("processed");
    write_raw_article(&raw);

    let client =
        VnCoreNlpClient::with_timeout("http://127.0.0.1:1", "wseg", Duration::from_millis(500))
            .unwrap();
    assert!(!client.is_alive().await);

    let stats = EtlEngine::new(pipeline(client, &raw, &processed))
        .run()
        .await
        .unwrap();

    assert_eq!(stats.processed, 1);
    let sentences = read_json(&processed.join("thoi-su/category/sentences/sentences_1.json"));
    assert_eq!(
        sentences["sentences"],
        serde_json::json!([
            "Chính phủ họp phiên thường kỳ tháng mười",
            "Thủ tướng yêu cầu đẩy mạnh giải ngân",
            "Kinh tế tăng trưởng khá."
        ])
    );
    assert_eq!(sentences["selected_indices"], serde_json::json!([0, 1]));
}
