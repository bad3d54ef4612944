use std::env;
use std::str::FromStr;
use std::sync::LazyLock;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "http://localhost:11434";
const DEFAULT_API_KEY: &str = "ollama";
const DEFAULT_CHAT_MODEL: &str = "llama3.2";
const DEFAULT_EMBEDDING_MODEL: &str = "nomic-embed-text";
const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
const DEFAULT_RETRY_DELAY_MS: u64 = 1000;

#[derive(Debug, Clone)]
pub struct AppEnv {
  /// Daemon root, e.g. `http://localhost:11434` (no `/v1` suffix).
  pub ollama_base_url: String,
  pub ollama_api_key: String,
  pub ollama_chat_model: String,
  pub ollama_embedding_model: String,
  pub retry_attempts: u32,
  pub retry_delay: Duration,
}

impl AppEnv {
  fn new() -> Self {
    let defaults = Self::default();
    Self {
      ollama_base_url: env::var("OLLAMA_BASE_URL").unwrap_or(defaults.ollama_base_url),
      ollama_api_key: env::var("OLLAMA_API_KEY").unwrap_or(defaults.ollama_api_key),
      ollama_chat_model: env::var("OLLAMA_CHAT_MODEL").unwrap_or(defaults.ollama_chat_model),
      ollama_embedding_model: env::var("OLLAMA_EMBEDDING_MODEL")
        .unwrap_or(defaults.ollama_embedding_model),
      retry_attempts: parse_var("OLLAMA_RETRY_ATTEMPTS").unwrap_or(defaults.retry_attempts),
      retry_delay: parse_var("OLLAMA_RETRY_DELAY_MS")
        .map_or(defaults.retry_delay, Duration::from_millis),
    }
  }

  /// Base URL of the OpenAI-compatible surface.
  #[must_use]
  pub fn openai_base_url(&self) -> String {
    format!("{}/v1", self.ollama_base_url.trim_end_matches('/'))
  }

  /// Build a URL under the daemon's native `/api` surface.
  #[must_use]
  pub fn native_url(&self, path: &str) -> String {
    format!(
      "{}/api/{}",
      self.ollama_base_url.trim_end_matches('/'),
      path.trim_start_matches('/')
    )
  }
}

impl Default for AppEnv {
  fn default() -> Self {
    Self {
      ollama_base_url: DEFAULT_BASE_URL.to_owned(),
      ollama_api_key: DEFAULT_API_KEY.to_owned(),
      ollama_chat_model: DEFAULT_CHAT_MODEL.to_owned(),
      ollama_embedding_model: DEFAULT_EMBEDDING_MODEL.to_owned(),
      retry_attempts: DEFAULT_RETRY_ATTEMPTS,
      retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
    }
  }
}

fn parse_var<T: FromStr>(key: &str) -> Option<T> {
  env::var(key).ok().and_then(|raw| parse_value(key, &raw))
}

/// Parse a numeric setting; an unparsable value is logged and ignored.
fn parse_value<T: FromStr>(key: &str, raw: &str) -> Option<T> {
  match raw.trim().parse() {
    Ok(value) => Some(value),
    Err(_) => {
      tracing::warn!(key, value = raw, "ignoring invalid setting, using the default");
      None
    }
  }
}

pub static APP_ENV: LazyLock<AppEnv> = LazyLock::new(AppEnv::new);
