//! Downloads and unpacks VnCoreNLP into the configured directory.

use crate::config::toml_config::VnCoreNlpConfig;
use crate::nlp::stopwords::DEFAULT_STOPWORDS_FILE;
use crate::utils::error::{EtlError, Result};
use reqwest::Client;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

pub const MODELS_DIR: &str = "models";
pub const STOPWORDS_DIR: &str = "stopwords";
pub const STOPWORDS_FILE: &str = "vietnamese-stopwords.txt";
const ARCHIVE_NAME: &str = "VnCoreNLP-1.2.zip";
const EXTRACT_DIR: &str = "temp_extract";
const RELEASE_DIR: &str = "VnCoreNLP-1.2";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupOutcome {
    AlreadyInstalled,
    Installed,
}

pub struct VnCoreNlpInstaller {
    client: Client,
    install_dir: PathBuf,
    download_url: String,
    jar_name: String,
    java: String,
}

impl VnCoreNlpInstaller {
    pub fn new(install_dir: impl Into<PathBuf>, config: &VnCoreNlpConfig) -> Self {
        Self {
            client: Client::new(),
            install_dir: install_dir.into(),
            download_url: config.download_url.clone(),
            jar_name: config.jar.clone(),
            java: config.java.clone(),
        }
    }

    pub fn jar_path(&self) -> PathBuf {
        self.install_dir.join(&self.jar_name)
    }

    pub fn models_dir(&self) -> PathBuf {
        self.install_dir.join(MODELS_DIR)
    }

    pub fn stopwords_path(&self) -> PathBuf {
        self.install_dir.join(STOPWORDS_DIR).join(STOPWORDS_FILE)
    }

    pub fn is_installed(&self) -> bool {
        self.jar_path().exists() && self.models_dir().exists()
    }

    /// Fails when `java -version` cannot be spawned.
    pub async fn check_java(&self) -> Result<()> {
        match Command::new(&self.java).arg("-version").output().await {
            Ok(output) => {
                let banner = String::from_utf8_lossy(&output.stderr);
                tracing::info!(
                    "✓ Java found: {}",
                    banner.lines().next().unwrap_or("unknown version")
                );
                Ok(())
            }
            Err(e) => {
                tracing::error!("✗ Java not found. Please install a Java JDK 8+");
                Err(EtlError::ProcessError {
                    program: self.java.clone(),
                    message: e.to_string(),
                })
            }
        }
    }

    pub async fn download(&self, destination: &Path) -> Result<u64> {
        tracing::info!("📥 Downloading VnCoreNLP from {}", self.download_url);
        let mut response = self.client.get(&self.download_url).send().await?;
        if !response.status().is_success() {
            return Err(EtlError::HttpStatusError {
                url: self.download_url.clone(),
                status: response.status().as_u16(),
            });
        }

        let mut file = tokio::fs::File::create(destination).await?;
        let mut written = 0u64;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        tracing::info!("Downloaded {} bytes to {}", written, destination.display());
        Ok(written)
    }

    pub async fn extract(archive: &Path, destination: &Path) -> Result<()> {
        tracing::info!("📦 Extracting {}", archive.display());
        let archive = archive.to_path_buf();
        let destination = destination.to_path_buf();

        tokio::task::spawn_blocking(move || -> Result<()> {
            let file = std::fs::File::open(&archive)?;
            let mut zip = zip::ZipArchive::new(file)?;
            zip.extract(&destination)?;
            Ok(())
        })
        .await
        .map_err(|e| EtlError::ProcessingError {
            message: format!("extraction task failed: {}", e),
        })?
    }

    /// `VnCoreNLP-1.2` inside `extracted`, or else the first `VnCoreNLP*` directory.
    pub fn locate_release(extracted: &Path) -> Result<PathBuf> {
        let preferred = extracted.join(RELEASE_DIR);
        if preferred.is_dir() {
            return Ok(preferred);
        }

        let mut candidates: Vec<PathBuf> = std::fs::read_dir(extracted)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_dir()
                    && path
                        .file_name()
                        .and_then(|name| name.to_str())
                        .is_some_and(|name| name.starts_with("VnCoreNLP"))
            })
            .collect();
        candidates.sort();

        candidates
            .into_iter()
            .next()
            .ok_or_else(|| EtlError::ProcessingError {
                message: format!("no VnCoreNLP directory in {}", extracted.display()),
            })
    }

    async fn install_from(&self, release: &Path) -> Result<()> {
        let jar_source = release.join(&self.jar_name);
        if jar_source.exists() {
            tokio::fs::rename(&jar_source, self.jar_path()).await?;
            tracing::info!("Moved JAR to {}", self.jar_path().display());
        }

        let models_source = release.join(MODELS_DIR);
        if models_source.exists() {
            if self.models_dir().exists() {
                tokio::fs::remove_dir_all(self.models_dir()).await?;
            }
            tokio::fs::rename(&models_source, self.models_dir()).await?;
            tracing::info!("Moved models to {}", self.models_dir().display());
        }
        Ok(())
    }

    pub async fn write_default_stopwords(&self) -> Result<PathBuf> {
        let path = self.stopwords_path();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, DEFAULT_STOPWORDS_FILE.join("\n")).await?;
        tracing::info!("✓ Created stopwords file: {}", path.display());
        Ok(path)
    }

    pub async fn setup(&self) -> Result<SetupOutcome> {
        if self.is_installed() {
            tracing::info!("✓ VnCoreNLP already installed");
            return Ok(SetupOutcome::AlreadyInstalled);
        }

        tokio::fs::create_dir_all(&self.install_dir).await?;

        let archive = self.install_dir.join(ARCHIVE_NAME);
        self.download(&archive).await?;

        let extracted = self.install_dir.join(EXTRACT_DIR);
        Self::extract(&archive, &extracted).await?;

        tracing::info!("📁 Installing...");
        let release = Self::locate_release(&extracted)?;
        self.install_from(&release).await?;
        self.write_default_stopwords().await?;

        tokio::fs::remove_file(&archive).await?;
        tokio::fs::remove_dir_all(&extracted).await?;

        tracing::info!("✓ VnCoreNLP installed into {}", self.install_dir.display());
        Ok(SetupOutcome::Installed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::{FileOptions, ZipWriter};

    fn release_zip(root: &str) -> Vec<u8> {
        let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
        zip.start_file::<_, ()>(format!("{}/VnCoreNLP-1.2.jar", root), FileOptions::default())
            .unwrap();
        zip.write_all(b"jar bytes").unwrap();
        zip.start_file::<_, ()>(
            format!("{}/models/wordsegmenter/wordsegmenter.rdr", root),
            FileOptions::default(),
        )
        .unwrap();
        zip.write_all(b"rules").unwrap();
        zip.finish().unwrap().into_inner()
    }

    fn installer(dir: &Path, download_url: String) -> VnCoreNlpInstaller {
        let config = VnCoreNlpConfig {
            download_url,
            ..VnCoreNlpConfig::default()
        };
        VnCoreNlpInstaller::new(dir, &config)
    }

    #[tokio::test]
    async fn test_setup_downloads_extracts_and_cleans_up() {
        let server = MockServer::start();
        let download = server.mock(|when, then| {
            when.method(GET).path("/v1.2.zip");
            then.status(200).body(release_zip("VnCoreNLP-1.2"));
        });

        let temp = TempDir::new().unwrap();
        let install_dir = temp.path().join("vncorenlp");
        let installer = installer(&install_dir, server.url("/v1.2.zip"));

        let outcome = installer.setup().await.unwrap();

        download.assert();
        assert_eq!(outcome, SetupOutcome::Installed);
        assert!(installer.is_installed());
        assert!(installer
            .models_dir()
            .join("wordsegmenter/wordsegmenter.rdr")
            .exists());
        let stopwords = std::fs::read_to_string(installer.stopwords_path()).unwrap();
        assert!(stopwords.lines().any(|w| w == "chúng_ta"));
        assert!(!install_dir.join(ARCHIVE_NAME).exists());
        assert!(!install_dir.join(EXTRACT_DIR).exists());

        assert_eq!(
            installer.setup().await.unwrap(),
            SetupOutcome::AlreadyInstalled
        );
        download.assert_hits(1);
    }

    #[tokio::test]
    async fn test_failed_download_is_reported() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/missing.zip");
            then.status(404);
        });

        let temp = TempDir::new().unwrap();
        let installer = installer(temp.path(), server.url("/missing.zip"));

        let result = installer.setup().await;
        assert!(matches!(
            result,
            Err(EtlError::HttpStatusError { status: 404, .. })
        ));
    }

    #[test]
    fn test_locate_release_falls_back_to_prefixed_directory() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("VnCoreNLP-master")).unwrap();
        std::fs::create_dir_all(temp.path().join("other")).unwrap();

        let release = VnCoreNlpInstaller::locate_release(temp.path()).unwrap();
        assert_eq!(release, temp.path().join("VnCoreNLP-master"));

        let empty = TempDir::new().unwrap();
        assert!(VnCoreNlpInstaller::locate_release(empty.path()).is_err());
    }

    #[tokio::test]
    async fn test_missing_java_is_process_error() {
        let config = VnCoreNlpConfig {
            java: "definitely-not-a-java-binary".to_string(),
            ..VnCoreNlpConfig::default()
        };
        let installer = VnCoreNlpInstaller::new("vncorenlp", &config);

        let result = installer.check_java().await;
        assert!(matches!(result, Err(EtlError::ProcessError { .. })));
    }
}
