use crate::utils::error::Result;
use std::future::Future;
use std::time::Duration;

/// Runs `operation` up to `max_attempts` times, sleeping `delay` between
/// attempts. The last error is returned once all attempts failed.
pub async fn with_retry<T, F, Fut>(
    name: &str,
    max_attempts: usize,
    delay: Duration,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= max_attempts => {
                tracing::error!("{} failed after {} attempts: {}", name, max_attempts, e);
                return Err(e);
            }
            Err(e) => {
                tracing::warn!(
                    "{} attempt {}/{} failed: {}. Retrying in {:?}...",
                    name,
                    attempt,
                    max_attempts,
                    e,
                    delay
                );
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                attempt += 1;
            }
        }
    }
}
