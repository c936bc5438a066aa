use chrono::Local;
use std::path::Path;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Name of the per-day data/log directory, e.g. `2025-11-09`.
pub fn today_dir() -> String {
    Local::now().format(DATE_FORMAT).to_string()
}

pub fn now_datetime() -> String {
    Local::now().format(DATETIME_FORMAT).to_string()
}

/// Points `<base_dir>/latest` at `<base_dir>/<day_dir>` with a relative
/// symlink, replacing an existing link.
#[cfg(unix)]
pub fn create_latest_symlink(base_dir: &Path, day_dir: &str) -> std::io::Result<()> {
    let latest = base_dir.join("latest");

    if latest.symlink_metadata().is_ok() {
        std::fs::remove_file(&latest)?;
        tracing::debug!("Removed old 'latest' symlink");
    }

    std::os::unix::fs::symlink(day_dir, &latest)?;
    tracing::info!("🔗 Created 'latest' symlink -> {}", day_dir);
    Ok(())
}

#[cfg(not(unix))]
pub fn create_latest_symlink(_base_dir: &Path, _day_dir: &str) -> std::io::Result<()> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "symlinks are only created on unix platforms",
    ))
}
