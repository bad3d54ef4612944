use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SimilarityError {
  #[error("vector {index} has {found} dimensions, expected {expected}")]
  DimensionMismatch {
    index: usize,
    expected: usize,
    found: usize,
  },
  /// Zero (or non-finite) norm: the angle to any other vector is undefined.
  #[error("vector {index} has zero norm, cosine similarity is undefined")]
  DegenerateVector { index: usize },
}

/// Square matrix of pairwise cosine similarities, row-major.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimilarityMatrix {
  size: usize,
  scores: Vec<f32>,
}

impl SimilarityMatrix {
  /// Number of vectors compared (rows == columns).
  #[must_use]
  pub const fn len(&self) -> usize {
    self.size
  }

  #[must_use]
  pub const fn is_empty(&self) -> bool {
    self.size == 0
  }

  #[must_use]
  pub fn get(&self, i: usize, j: usize) -> Option<f32> {
    if i < self.size && j < self.size {
      Some(self.scores[i * self.size + j])
    } else {
      None
    }
  }

  #[must_use]
  pub fn row(&self, i: usize) -> Option<&[f32]> {
    (i < self.size).then(|| &self.scores[i * self.size..(i + 1) * self.size])
  }

  pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
    // chunks_exact panics on 0
    self.scores.chunks_exact(self.size.max(1))
  }

  /// Highest-scoring pair of distinct vectors as `(i, j, score)` with `i < j`.
  ///
  /// Ties keep the earliest pair. `None` with fewer than two vectors.
  #[must_use]
  pub fn most_similar_pair(&self) -> Option<(usize, usize, f32)> {
    let mut best: Option<(usize, usize, f32)> = None;
    for i in 0..self.size {
      for j in (i + 1)..self.size {
        let score = self.scores[i * self.size + j];
        if best.is_none_or(|(_, _, top)| score > top) {
          best = Some((i, j, score));
        }
      }
    }
    best
  }
}

fn squared_norm(v: &[f32]) -> f64 {
  v.iter().map(|&x| f64::from(x)).fold(0.0, |acc, x| x.mul_add(x, acc))
}

fn is_degenerate(norm_sq: f64) -> bool {
  norm_sq == 0.0 || !norm_sq.is_finite()
}

/// Both inputs are known to be equal length and non-degenerate.
fn cosine_unchecked(a: &[f32], b: &[f32]) -> f32 {
  let mut dot = 0.0_f64;
  let mut norm_a = 0.0_f64;
  let mut norm_b = 0.0_f64;

  for (&x, &y) in a.iter().zip(b.iter()) {
    let x = f64::from(x);
    let y = f64::from(y);
    dot = x.mul_add(y, dot);
    norm_a = x.mul_add(x, norm_a);
    norm_b = y.mul_add(y, norm_b);
  }

  let denom = norm_a.sqrt() * norm_b.sqrt();
  (dot / denom).clamp(-1.0, 1.0) as f32
}

/// Compute cosine similarity between two embedding vectors.
///
/// Returns a value in [-1.0, 1.0] where 1.0 means identical direction.
/// In errors, `a` is index 0 and `b` is index 1.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32, SimilarityError> {
  if a.len() != b.len() {
    return Err(SimilarityError::DimensionMismatch {
      index: 1,
      expected: a.len(),
      found: b.len(),
    });
  }
  for (index, v) in [a, b].into_iter().enumerate() {
    if is_degenerate(squared_norm(v)) {
      return Err(SimilarityError::DegenerateVector { index });
    }
  }
  Ok(cosine_unchecked(a, b))
}

/// Every pairwise cosine similarity between `vectors`, in input order.
///
/// All vectors are validated before any score is computed. An empty input
/// gives an empty matrix.
pub fn similarity_matrix<V: AsRef<[f32]>>(
  vectors: &[V],
) -> Result<SimilarityMatrix, SimilarityError> {
  let Some(first) = vectors.first() else {
    return Ok(SimilarityMatrix::default());
  };

  let expected = first.as_ref().len();
  for (index, v) in vectors.iter().enumerate() {
    let found = v.as_ref().len();
    if found != expected {
      return Err(SimilarityError::DimensionMismatch {
        index,
        expected,
        found,
      });
    }
  }
  for (index, v) in vectors.iter().enumerate() {
    if is_degenerate(squared_norm(v.as_ref())) {
      return Err(SimilarityError::DegenerateVector { index });
    }
  }

  let size = vectors.len();
  let mut scores = Vec::with_capacity(size * size);
  for a in vectors {
    for b in vectors {
      scores.push(cosine_unchecked(a.as_ref(), b.as_ref()));
    }
  }

  Ok(SimilarityMatrix { size, scores })
}
