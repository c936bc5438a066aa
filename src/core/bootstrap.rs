use crate::utils::error::Result;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Marker files that keep the otherwise empty data, log and VnCoreNLP
/// directories in git.
pub const PLACEHOLDER_FILES: [&str; 7] = [
    "data/raw/.gitkeep",
    "data/processed/.gitkeep",
    "logs/crawling/.gitkeep",
    "logs/preprocessing/.gitkeep",
    "vncorenlp/.gitkeep",
    "vncorenlp/models/.gitkeep",
    "vncorenlp/stopwords/.gitkeep",
];

pub const CONFIRMATION_MESSAGE: &str = "Created 7 placeholder files.";

/// Creates every entry of [`PLACEHOLDER_FILES`] under `root` as an empty file.
///
/// Existing markers are truncated, so repeated runs end in the same state.
pub fn create_placeholders(root: &Path) -> Result<Vec<PathBuf>> {
    let mut created = Vec::with_capacity(PLACEHOLDER_FILES.len());

    for relative in PLACEHOLDER_FILES {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        File::create(&path)?;
        tracing::debug!("Created placeholder {}", path.display());
        created.push(path);
    }

    Ok(created)
}
