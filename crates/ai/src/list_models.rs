use chrono::{DateTime, Utc};
use ollamate_shared::{AppEnv, AppError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDetails {
  pub format: Option<String>,
  pub family: Option<String>,
  pub parameter_size: Option<String>,
  pub quantization_level: Option<String>,
}

/// A model installed on the daemon, as reported by `/api/tags`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
  pub name: String,
  /// Size on disk in bytes.
  #[serde(default)]
  pub size: u64,
  pub modified_at: DateTime<Utc>,
  #[serde(default)]
  pub digest: String,
  #[serde(default)]
  pub details: ModelDetails,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
  #[serde(default)]
  models: Vec<ModelInfo>,
}

/// List the models installed on the daemon.
///
/// The OpenAI-compatible `/v1/models` omits sizes and quantization, so this
/// goes to the native endpoint instead.
pub async fn list_models(env: &AppEnv) -> Result<Vec<ModelInfo>, AppError> {
  let url = env.native_url("tags");
  tracing::debug!(%url, "listing models");

  let response = reqwest::Client::new()
    .get(&url)
    .send()
    .await?
    .error_for_status()?
    .json::<TagsResponse>()
    .await?;

  tracing::info!(count = response.models.len(), "listed models");

  Ok(response.models)
}
