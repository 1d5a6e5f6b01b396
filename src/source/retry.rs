use std::thread;
use tracing::{debug, warn};

use crate::config::RetryPolicy;
use crate::error::RetrievalError;

/// Run `op` until it succeeds, fails permanently, or the policy runs out of
/// attempts. Only [`RetrievalError::is_transient`] errors are retried.
pub fn with_backoff<T>(
    policy: RetryPolicy,
    what: &str,
    mut op: impl FnMut() -> Result<T, RetrievalError>,
) -> Result<T, RetrievalError> {
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        debug!(attempt, max_attempts, what, "object store request");
        match op() {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt < max_attempts => {
                let delay = policy.delay_after(attempt);
                warn!(
                    attempt,
                    max_attempts,
                    what,
                    error = %err,
                    delay_ms = delay.as_millis() as u64,
                    "request failed, retrying"
                );
                thread::sleep(delay);
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
