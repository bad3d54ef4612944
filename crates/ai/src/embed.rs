use anyhow::anyhow;
use async_openai::types::embeddings::CreateEmbeddingRequestArgs;
use ollamate_shared::{AppEnv, AppError};

use crate::client::openai_client;

pub async fn embed(env: &AppEnv, input: &str) -> Result<Vec<f32>, AppError> {
  let request = CreateEmbeddingRequestArgs::default()
    .model(&env.ollama_embedding_model)
    .input(input)
    .build()?;

  let embedding = openai_client(env)
    .embeddings()
    .create(request)
    .await
    .map(|r| r.data.into_iter())?
    .map(|e| e.embedding)
    .next_back()
    .ok_or_else(|| anyhow!("empty embedding"))?;

  tracing::debug!(
    model = %env.ollama_embedding_model,
    dimensions = embedding.len(),
    "embedded text"
  );

  Ok(embedding)
}
