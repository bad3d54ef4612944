use std::time::Duration;

use async_openai::{Client, config::OpenAIConfig};
use backoff::ExponentialBackoffBuilder;
use ollamate_shared::AppEnv;

/// Client for the daemon's OpenAI-compatible surface.
///
/// The built-in exponential backoff is switched off: every call is a single
/// request and retrying is left to [`crate::retry`].
pub(crate) fn openai_client(env: &AppEnv) -> Client<OpenAIConfig> {
  let config = OpenAIConfig::new()
    .with_api_key(&env.ollama_api_key)
    .with_api_base(env.openai_base_url());

  let no_retry = ExponentialBackoffBuilder::new()
    .with_max_elapsed_time(Some(Duration::ZERO))
    .build();

  Client::with_config(config).with_backoff(no_retry)
}
