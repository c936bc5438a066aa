//! Vietnamese text processing on top of a VnCoreNLP server.

pub mod sentence;
pub mod setup;
pub mod stopwords;
pub mod tfidf;
pub mod vncorenlp;

pub use sentence::SentenceTokenizer;
pub use setup::VnCoreNlpInstaller;
pub use stopwords::StopwordList;
pub use tfidf::TfidfSummarizer;
pub use vncorenlp::VnCoreNlpClient;
