use std::collections::HashSet;
use std::path::Path;

/// Used when no stopword file can be read.
pub const FALLBACK_STOPWORDS: &[&str] = &[
    "là", "của", "và", "có", "được", "một", "trong", "với", "các", "những", "này", "đó", "cho",
    "không", "người", "từ", "đã", "sẽ", "theo", "về", "hay", "hoặc", "để",
];

/// Contents of the `vietnamese-stopwords.txt` file written by `setup`.
pub const DEFAULT_STOPWORDS_FILE: &[&str] = &[
    // articles
    "các", "một", "những", "cái", "chiếc", "con", "người",
    // conjunctions
    "và", "hay", "hoặc", "nhưng", "mà", "vì", "nên", "thì", "nếu",
    // prepositions
    "của", "cho", "với", "về", "từ", "trong", "ngoài", "trên", "dưới", "đến", "tại", "bởi",
    "theo", "qua", "sau", "trước", "giữa",
    // pronouns
    "tôi", "bạn", "anh", "chị", "em", "chúng", "nó", "họ", "chúng_ta", "ta", "mình", "ai", "gì",
    "đâu", "sao", "nào", "kia", "này", "đó",
    // verbs
    "là", "được", "có", "không", "đã", "sẽ", "đang", "bị", "phải", "cần", "muốn", "thể", "nữa",
    "vẫn", "còn",
    // adverbs
    "rất", "lại", "cũng", "đều", "như", "thế", "vậy", "thật", "quá",
    // others
    "ra", "vào", "lên", "xuống", "đi", "đây", "đấy", "ở", "tới", "nhiều", "ít", "hơn", "nhất",
    "cùng", "mỗi",
];

#[derive(Debug, Clone, Default)]
pub struct StopwordList {
    words: HashSet<String>,
}

impl StopwordList {
    pub fn fallback() -> Self {
        tracing::warn!("Using default stopwords");
        FALLBACK_STOPWORDS.iter().copied().collect()
    }

    /// One word per line. Missing or unreadable files yield [`Self::fallback`].
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            tracing::warn!("Stopwords file not found: {}", path.display());
            return Self::fallback();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => {
                let list = Self::parse(&content);
                tracing::info!(
                    "✓ Loaded {} stopwords from {}",
                    list.len(),
                    path.display()
                );
                list
            }
            Err(e) => {
                tracing::error!("Error loading stopwords from {}: {}", path.display(), e);
                Self::fallback()
            }
        }
    }

    pub fn parse(content: &str) -> Self {
        content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect()
    }

    pub fn add(&mut self, word: &str) {
        self.words.insert(word.to_lowercase());
    }

    pub fn remove(&mut self, word: &str) {
        self.words.remove(&word.to_lowercase());
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(&word.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl<'a> FromIterator<&'a str> for StopwordList {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self {
            words: iter.into_iter().map(str::to_lowercase).collect(),
        }
    }
}
