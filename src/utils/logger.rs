use crate::utils::error::{EtlError, Result};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

fn console_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("vnnews_etl=debug,info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vnnews_etl=info"))
    }
}

pub fn init_cli_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(console_filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

/// Console logging plus an append-only plain text log file at
/// `<log_dir>/<file_name>`. The file always receives debug output.
pub fn init_file_logger(verbose: bool, log_dir: &Path, file_name: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(log_dir)?;
    let log_file = log_dir.join(file_name);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file)?;

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .with_filter(console_filter(verbose));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_writer(Mutex::new(file))
        .with_filter(EnvFilter::new("vnnews_etl=debug,info"));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| EtlError::ConfigError {
            message: format!("Failed to install logger: {}", e),
        })?;

    tracing::info!("{}", "=".repeat(80));
    tracing::info!("Logging system initialized");
    tracing::info!("Log file: {}", log_file.display());
    tracing::info!("{}", "=".repeat(80));

    Ok(log_file)
}
