use anyhow::anyhow;
use async_openai::types::embeddings::CreateEmbeddingRequestArgs;
use ollamate_shared::{AppEnv, AppError};

use crate::client::openai_client;

/// Embed multiple texts in a single API call.
///
/// Returns one vector per input, in the same order.
pub async fn embed_many(env: &AppEnv, inputs: &[String]) -> Result<Vec<Vec<f32>>, AppError> {
  if inputs.is_empty() {
    return Ok(vec![]);
  }

  let request = CreateEmbeddingRequestArgs::default()
    .model(&env.ollama_embedding_model)
    .input(inputs.to_vec())
    .build()?;

  let response = openai_client(env).embeddings().create(request).await?;

  // The daemon may answer out of order
  let mut data = response.data;
  data.sort_by_key(|e| e.index);

  if data.len() != inputs.len() {
    return Err(
      anyhow!(
        "embedding count mismatch: expected {}, got {}",
        inputs.len(),
        data.len()
      )
      .into(),
    );
  }

  Ok(data.into_iter().map(|e| e.embedding).collect())
}
