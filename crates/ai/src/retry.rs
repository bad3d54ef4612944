use std::{future::Future, time::Duration};

use ollamate_shared::{AppEnv, AppError};

use crate::generate_text;

/// Fixed-count retry with a fixed pause between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
  /// Total attempts, including the first. Zero behaves like one.
  pub attempts: u32,
  pub delay: Duration,
}

impl RetryPolicy {
  #[must_use]
  pub const fn new(attempts: u32, delay: Duration) -> Self {
    Self { attempts, delay }
  }

  #[must_use]
  pub fn from_env(env: &AppEnv) -> Self {
    Self::new(env.retry_attempts, env.retry_delay)
  }
}

/// Run `op` until it succeeds or the policy's attempts are used up.
///
/// `op` receives the 1-based attempt number. The last error is returned with
/// the attempt count attached; there is no pause after the final failure.
pub async fn retry<T, F, Fut>(policy: RetryPolicy, mut op: F) -> Result<T, AppError>
where
  F: FnMut(u32) -> Fut,
  Fut: Future<Output = Result<T, AppError>>,
{
  let attempts = policy.attempts.max(1);
  let mut attempt = 1;

  loop {
    match op(attempt).await {
      Ok(value) => return Ok(value),
      Err(err) if attempt < attempts => {
        tracing::warn!(
          attempt,
          attempts,
          delay_ms = policy.delay.as_millis() as u64,
          error = %err,
          "attempt failed, retrying"
        );
        tokio::time::sleep(policy.delay).await;
        attempt += 1;
      }
      Err(err) => return Err(err.context(format!("gave up after {attempts} attempt(s)"))),
    }
  }
}

/// [`generate_text`] wrapped in [`retry`].
pub async fn generate_with_retry(
  env: &AppEnv,
  prompt: &str,
  system: Option<&str>,
  policy: RetryPolicy,
) -> Result<String, AppError> {
  retry(policy, |attempt| {
    tracing::debug!(attempt, "generating");
    generate_text(env, prompt, system)
  })
  .await
}
