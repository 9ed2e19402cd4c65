//! Retry with linear backoff.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Run `op` up to `max_attempts` times. After failed attempt `n` the call waits
/// `n * base_delay` before trying again. The last error is returned.
pub async fn with_retry<T, E, F, Fut>(
    label: &str,
    max_attempts: u32,
    base_delay: Duration,
    mut op: F,
) -> Result<T, E>
where
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 0;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                attempt += 1;
                if attempt >= max_attempts {
                    return Err(e);
                }
                let wait = base_delay * attempt;
                log::warn!(
                    "{} retry {}/{} after {}ms: {}",
                    label,
                    attempt,
                    max_attempts,
                    wait.as_millis(),
                    e
                );
                tokio::time::sleep(wait).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_failures() {
        let calls = Cell::new(0);
        let start = tokio::time::Instant::now();

        let result: Result<u32, String> = with_retry("op", 5, Duration::from_millis(100), || {
            calls.set(calls.get() + 1);
            let n = calls.get();
            async move { if n < 3 { Err(format!("fail {n}")) } else { Ok(n) } }
        })
        .await;

        assert_eq!(result, Ok(3));
        assert_eq!(calls.get(), 3);
        // 100ms after the first failure, 200ms after the second
        assert_eq!(start.elapsed(), Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_returns_last_error() {
        let calls = Cell::new(0);
        let result: Result<(), String> = with_retry("op", 2, Duration::from_millis(10), || {
            calls.set(calls.get() + 1);
            let n = calls.get();
            async move { Err(format!("fail {n}")) }
        })
        .await;

        assert_eq!(result, Err("fail 2".to_string()));
        assert_eq!(calls.get(), 2);
    }
}
