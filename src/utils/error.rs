use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("HTTP request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("HTTP {status} from {url}")]
    HttpStatusError { url: String, status: u16 },

    #[error("Failed to scrape {url}: {message}")]
    ScrapeError { url: String, message: String },

    #[error("VnCoreNLP error: {message}")]
    SegmenterError { message: String },

    #[error("External process '{program}' failed: {message}")]
    ProcessError { program: String, message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Storage,
    Parsing,
    ExternalProcess,
    Processing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => ErrorCategory::Configuration,
            EtlError::ApiError(_)
            | EtlError::HttpStatusError { .. }
            | EtlError::SegmenterError { .. } => ErrorCategory::Network,
            EtlError::IoError(_) | EtlError::ZipError(_) => ErrorCategory::Storage,
            EtlError::SerializationError(_) | EtlError::ScrapeError { .. } => {
                ErrorCategory::Parsing
            }
            EtlError::ProcessError { .. } => ErrorCategory::ExternalProcess,
            EtlError::ProcessingError { .. } | EtlError::ValidationError { .. } => {
                ErrorCategory::Processing
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // transient, a rerun may succeed
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Parsing | ErrorCategory::Processing => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Storage | ErrorCategory::ExternalProcess => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => {
                "Check the TOML configuration file and command line flags"
            }
            EtlError::ApiError(_) | EtlError::HttpStatusError { .. } => {
                "Check the network connection and that the site is reachable, then retry"
            }
            EtlError::SegmenterError { .. } => {
                "Make sure the VnCoreNLP server is running (see the vncorenlp_server binary)"
            }
            EtlError::ProcessError { .. } => {
                "Make sure Java 8+ is installed and available on PATH"
            }
            EtlError::IoError(_) | EtlError::ZipError(_) => {
                "Check disk space and permissions of the data directories"
            }
            EtlError::ScrapeError { .. } => {
                "The page layout may have changed; inspect the HTML selectors"
            }
            EtlError::SerializationError(_) => "Inspect the JSON file for corruption",
            EtlError::ProcessingError { .. } | EtlError::ValidationError { .. } => {
                "Inspect the input data and the log file for details"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Network => format!("Network problem: {}", self),
            ErrorCategory::Storage => format!("File system problem: {}", self),
            ErrorCategory::Parsing => format!("Could not parse data: {}", self),
            ErrorCategory::ExternalProcess => format!("External program problem: {}", self),
            ErrorCategory::Processing => format!("Processing failed: {}", self),
        }
    }

    /// Exit code used by the binaries; `0` means the error is only a warning.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
