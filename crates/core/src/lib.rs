mod similarity;
pub use similarity::{SimilarityError, SimilarityMatrix, cosine_similarity, similarity_matrix};

mod compare;
pub use compare::{
  Comparison, DaemonEmbedder, Embedder, compare_texts, compare_texts_batched,
};

mod report;
pub use report::{
  Exchange, format_embedding, format_exchange, format_models, format_models_at,
  format_similarity, format_size,
};
