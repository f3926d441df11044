//! Bounded retry of whole passes

use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::warn;

/// Fixed-delay retry bounded by total elapsed time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Pause between two attempts
    pub delay: Duration,
    /// Give up once this much time has passed since the first attempt
    pub max_elapsed: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(1),
            max_elapsed: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    pub fn new(delay: Duration, max_elapsed: Duration) -> Self {
        Self { delay, max_elapsed }
    }

    /// Run `op` until it succeeds, fails with a non-retryable error or the
    /// elapsed budget is spent. The last error is returned on give-up.
    ///
    /// The pause before the final attempt is shortened so that no attempt
    /// starts after `max_elapsed`.
    pub async fn retry<T, E, F, Fut, P>(&self, mut op: F, is_retryable: P) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
        E: std::fmt::Display,
    {
        let started = Instant::now();
        let mut attempt = 1u32;

        loop {
            let err = match op().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if !is_retryable(&err) {
                return Err(err);
            }

            let elapsed = started.elapsed();
            if elapsed >= self.max_elapsed {
                warn!(
                    "Giving up after {} attempts in {:?}: {}",
                    attempt, elapsed, err
                );
                return Err(err);
            }

            let pause = self.delay.min(self.max_elapsed - elapsed);
            warn!("Attempt {} failed: {}, retrying in {:?}", attempt, err, pause);
            tokio::time::sleep(pause).await;
            attempt += 1;
        }
    }
}
