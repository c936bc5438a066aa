use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, validate_range,
    validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file picked up from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "vnnews.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub paths: PathsConfig,
    pub crawler: CrawlerConfig,
    pub preprocessing: PreprocessingConfig,
    pub vncorenlp: VnCoreNlpConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub raw_data_base: String,
    pub processed_data_base: String,
    pub log_base: String,
    pub vncorenlp_dir: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            raw_data_base: "data/raw".to_string(),
            processed_data_base: "data/processed".to_string(),
            log_base: "logs".to_string(),
            vncorenlp_dir: "vncorenlp".to_string(),
        }
    }
}

impl PathsConfig {
    pub fn raw_dir_for(&self, day: &str) -> PathBuf {
        Path::new(&self.raw_data_base).join(day)
    }

    pub fn processed_dir_for(&self, day: &str) -> PathBuf {
        Path::new(&self.processed_data_base).join(day)
    }

    /// `logs/<component>/<day>`, e.g. `logs/crawling/2025-11-09`.
    pub fn log_dir_for(&self, component: &str, day: &str) -> PathBuf {
        Path::new(&self.log_base).join(component).join(day)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    pub base_url: String,
    pub source_name: String,
    pub headers: BTreeMap<String, String>,
    pub delay_between_requests_ms: u64,
    pub delay_between_subcategories_ms: u64,
    pub delay_between_categories_ms: u64,
    pub request_timeout_seconds: u64,
    pub max_retries: usize,
    pub retry_delay_ms: u64,
    pub excluded_categories: Vec<String>,
    pub max_categories: Option<usize>,
    pub max_subcategories: Option<usize>,
    pub max_articles: Option<usize>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        let mut headers = BTreeMap::new();
        headers.insert(
            "User-Agent".to_string(),
            "Mozilla/5.0 (compatible; vnnews-etl/0.1)".to_string(),
        );
        headers.insert(
            "Accept".to_string(),
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8".to_string(),
        );
        headers.insert("Accept-Language".to_string(), "vi-VN,vi;q=0.9".to_string());
        headers.insert("Connection".to_string(), "keep-alive".to_string());

        Self {
            base_url: "https://baochinhphu.vn".to_string(),
            source_name: "baochinhphu.vn".to_string(),
            headers,
            delay_between_requests_ms: 1000,
            delay_between_subcategories_ms: 2000,
            delay_between_categories_ms: 3000,
            request_timeout_seconds: 15,
            max_retries: 3,
            retry_delay_ms: 5000,
            excluded_categories: vec!["trang chủ".to_string(), "góp ý hiến kế".to_string()],
            max_categories: None,
            max_subcategories: None,
            max_articles: Some(5),
        }
    }
}

impl CrawlerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// Same politeness settings with every delay set to zero.
    pub fn without_delays(mut self) -> Self {
        self.delay_between_requests_ms = 0;
        self.delay_between_subcategories_ms = 0;
        self.delay_between_categories_ms = 0;
        self.retry_delay_ms = 0;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessingConfig {
    pub summary_sentence_count: usize,
    pub min_sentence_length: usize,
    pub max_sentence_length: usize,
    pub use_idf: bool,
    pub smooth_idf: bool,
    pub sublinear_tf: bool,
    pub stopwords_file: String,
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        Self {
            summary_sentence_count: 3,
            min_sentence_length: 10,
            max_sentence_length: 500,
            use_idf: true,
            smooth_idf: true,
            sublinear_tf: false,
            stopwords_file: "vncorenlp/stopwords/vietnamese-stopwords.txt".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VnCoreNlpConfig {
    pub host: String,
    pub port: u16,
    pub java: String,
    pub jar: String,
    pub max_heap: String,
    pub annotators: String,
    pub download_url: String,
    pub request_timeout_seconds: u64,
}

impl Default for VnCoreNlpConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 9000,
            java: "java".to_string(),
            jar: "VnCoreNLP-1.2.jar".to_string(),
            max_heap: "2g".to_string(),
            annotators: "wseg".to_string(),
            download_url: "https://github.com/vncorenlp/VnCoreNLP/archive/refs/tags/v1.2.zip"
                .to_string(),
            request_timeout_seconds: 30,
        }
    }
}

impl VnCoreNlpConfig {
    /// Base URL of the segmentation server, e.g. `http://127.0.0.1:9000`.
    pub fn server_url(&self) -> String {
        let host = self.host.trim_end_matches('/');
        if host.starts_with("http://") || host.starts_with("https://") {
            format!("{}:{}", host, self.port)
        } else {
            format!("http://{}:{}", host, self.port)
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

impl AppConfig {
    /// Loads a TOML configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Loads `path` when given, otherwise `vnnews.toml` if it exists, otherwise defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::from_file(DEFAULT_CONFIG_FILE),
            None => Ok(Self::default()),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables stay as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_path("paths.raw_data_base", &self.paths.raw_data_base)?;
        validate_path("paths.processed_data_base", &self.paths.processed_data_base)?;
        validate_path("paths.log_base", &self.paths.log_base)?;
        validate_path("paths.vncorenlp_dir", &self.paths.vncorenlp_dir)?;

        validate_url("crawler.base_url", &self.crawler.base_url)?;
        validate_positive_number("crawler.max_retries", self.crawler.max_retries, 1)?;
        validate_positive_number(
            "crawler.request_timeout_seconds",
            self.crawler.request_timeout_seconds as usize,
            1,
        )?;
        for (field, limit) in [
            ("crawler.max_categories", self.crawler.max_categories),
            ("crawler.max_subcategories", self.crawler.max_subcategories),
            ("crawler.max_articles", self.crawler.max_articles),
        ] {
            if let Some(limit) = limit {
                validate_positive_number(field, limit, 1)?;
            }
        }

        let pre = &self.preprocessing;
        validate_positive_number(
            "preprocessing.summary_sentence_count",
            pre.summary_sentence_count,
            1,
        )?;
        if pre.min_sentence_length > pre.max_sentence_length {
            return Err(EtlError::InvalidConfigValueError {
                field: "preprocessing.min_sentence_length".to_string(),
                value: pre.min_sentence_length.to_string(),
                reason: format!(
                    "Must not exceed preprocessing.max_sentence_length ({})",
                    pre.max_sentence_length
                ),
            });
        }

        validate_non_empty_string("vncorenlp.host", &self.vncorenlp.host)?;
        validate_range("vncorenlp.port", self.vncorenlp.port, 1, u16::MAX)?;
        validate_non_empty_string("vncorenlp.jar", &self.vncorenlp.jar)?;
        validate_non_empty_string("vncorenlp.annotators", &self.vncorenlp.annotators)?;
        validate_url("vncorenlp.download_url", &self.vncorenlp.download_url)?;

        Ok(())
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
