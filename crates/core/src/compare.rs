use std::future::Future;

use anyhow::anyhow;
use ollamate_shared::{AppEnv, AppError};

use crate::similarity::{SimilarityMatrix, similarity_matrix};

/// Turns one text into one embedding vector.
pub trait Embedder {
  fn embed(&self, text: &str) -> impl Future<Output = Result<Vec<f32>, AppError>> + Send;
}

/// [`Embedder`] backed by the daemon's embedding model.
#[derive(Debug, Clone, Copy)]
pub struct DaemonEmbedder<'a> {
  env: &'a AppEnv,
}

impl<'a> DaemonEmbedder<'a> {
  #[must_use]
  pub const fn new(env: &'a AppEnv) -> Self {
    Self { env }
  }
}

impl Embedder for DaemonEmbedder<'_> {
  async fn embed(&self, text: &str) -> Result<Vec<f32>, AppError> {
    ollamate_ai::embed(self.env, text).await
  }
}

/// Texts and the similarity matrix computed from their embeddings.
///
/// Row `i` of the matrix always belongs to `texts()[i]`.
#[derive(Debug, Clone)]
pub struct Comparison {
  texts: Vec<String>,
  matrix: SimilarityMatrix,
}

impl Comparison {
  /// Score `vectors`, where `vectors[i]` is the embedding of `texts[i]`.
  pub fn from_embeddings<V: AsRef<[f32]>>(
    texts: Vec<String>,
    vectors: &[V],
  ) -> Result<Self, AppError> {
    if texts.len() != vectors.len() {
      return Err(
        anyhow!(
          "got {} embeddings for {} texts",
          vectors.len(),
          texts.len()
        )
        .into(),
      );
    }

    let matrix = similarity_matrix(vectors)?;
    tracing::info!(texts = texts.len(), "computed similarity matrix");

    Ok(Self { texts, matrix })
  }

  #[must_use]
  pub fn texts(&self) -> &[String] {
    &self.texts
  }

  #[must_use]
  pub const fn matrix(&self) -> &SimilarityMatrix {
    &self.matrix
  }

  /// The two most similar texts and their score.
  #[must_use]
  pub fn most_similar(&self) -> Option<(&str, &str, f32)> {
    let (i, j, score) = self.matrix.most_similar_pair()?;
    Some((self.texts.get(i)?.as_str(), self.texts.get(j)?.as_str(), score))
  }
}

/// Embed each text once, in order, and score every pair.
pub async fn compare_texts<E: Embedder>(
  embedder: &E,
  texts: &[String],
) -> Result<Comparison, AppError> {
  let mut vectors = Vec::with_capacity(texts.len());

  for (index, text) in texts.iter().enumerate() {
    let vector = embedder
      .embed(text)
      .await
      .map_err(|err| err.context(format!("failed to embed text {index}")))?;
    tracing::debug!(index, dimensions = vector.len(), "embedded text");
    vectors.push(vector);
  }

  Comparison::from_embeddings(texts.to_vec(), &vectors)
}

/// Like [`compare_texts`], but embeds every text in one daemon request.
pub async fn compare_texts_batched(
  env: &AppEnv,
  texts: &[String],
) -> Result<Comparison, AppError> {
  let vectors = ollamate_ai::embed_many(env, texts).await?;
  Comparison::from_embeddings(texts.to_vec(), &vectors)
}
