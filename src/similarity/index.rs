//! Immutable nearest-neighbor index over catalog vectors.
//!
//! Vectors are addressed by their catalog position. Distances are cosine
//! distances (`1 - cosine_similarity`), so identical directions are `0.0`
//! apart and orthogonal ones `1.0`.

use rayon::prelude::*;

/// A neighbor returned by the index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Catalog position of the neighbor
    pub position: usize,
    /// Cosine distance to the query (0.0 to 2.0)
    pub distance: f32,
}

/// Brute-force cosine index, built once and never mutated.
///
/// Safe to share between threads: every query only reads the stored
/// vectors and their precomputed norms.
#[derive(Debug, Clone)]
pub struct SimilarityIndex {
    vectors: Vec<Vec<f32>>,
    norms: Vec<f32>,
    dimensions: usize,
}

impl SimilarityIndex {
    /// Build the index from the catalog's vectors, in catalog order.
    ///
    /// The first vector fixes the dimensionality. Every vector must match it,
    /// contain only finite values and have a non-zero norm.
    pub fn build(vectors: Vec<Vec<f32>>) -> Result<Self, IndexError> {
        let dimensions = match vectors.first() {
            Some(first) if !first.is_empty() => first.len(),
            Some(_) => return Err(IndexError::EmptyVector),
            None => return Err(IndexError::Empty),
        };

        let mut norms = Vec::with_capacity(vectors.len());
        for (position, vector) in vectors.iter().enumerate() {
            if vector.len() != dimensions {
                return Err(IndexError::DimensionMismatch {
                    position,
                    expected: dimensions,
                    got: vector.len(),
                });
            }

            if vector.iter().any(|value| !value.is_finite()) {
                return Err(IndexError::NonFinite { position });
            }

            let norm = l2_norm(vector);
            if norm < f32::EPSILON {
                return Err(IndexError::ZeroNormVector { position });
            }
            norms.push(norm);
        }

        Ok(Self {
            vectors,
            norms,
            dimensions,
        })
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Find the `n` stored vectors nearest to the one at `position`.
    ///
    /// # Returns
    /// Up to `n` neighbors sorted by ascending distance. Equal distances are
    /// ordered by ascending position so results are deterministic. The stored
    /// vector is its own nearest neighbor, so it normally comes first.
    pub fn kneighbors_of(&self, position: usize, n: usize) -> Result<Vec<Neighbor>, IndexError> {
        let query = self
            .vectors
            .get(position)
            .ok_or(IndexError::OutOfBounds {
                position,
                len: self.vectors.len(),
            })?;
        let query_norm = self.norms[position];

        if n == 0 {
            return Ok(Vec::new());
        }

        let mut neighbors: Vec<Neighbor> = self
            .vectors
            .par_iter()
            .zip(self.norms.par_iter())
            .enumerate()
            .map(|(position, (vector, norm))| Neighbor {
                position,
                distance: cosine_distance(query, query_norm, vector, *norm),
            })
            .collect();

        let by_distance = |a: &Neighbor, b: &Neighbor| {
            a.distance
                .total_cmp(&b.distance)
                .then(a.position.cmp(&b.position))
        };

        // Partial selection first, full sort only on the kept prefix
        if n < neighbors.len() {
            neighbors.select_nth_unstable_by(n - 1, by_distance);
            neighbors.truncate(n);
        }
        neighbors.sort_unstable_by(by_distance);

        Ok(neighbors)
    }
}

fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Cosine distance with both norms precomputed.
fn cosine_distance(query: &[f32], query_norm: f32, target: &[f32], target_norm: f32) -> f32 {
    let dot_product: f32 = query.iter().zip(target.iter()).map(|(a, b)| a * b).sum();
    let similarity = (dot_product / (query_norm * target_norm)).clamp(-1.0, 1.0);
    // Rounding can push a self-match slightly below zero
    (1.0 - similarity).max(0.0)
}

/// Errors that can occur while building or querying the index.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("Cannot build an index without vectors")]
    Empty,

    #[error("Vectors must have at least one dimension")]
    EmptyVector,

    #[error("Dimension mismatch at row {position}: expected {expected}, got {got}")]
    DimensionMismatch {
        position: usize,
        expected: usize,
        got: usize,
    },

    #[error("Vector at row {position} contains NaN or infinite values")]
    NonFinite { position: usize },

    #[error("Vector at row {position} has zero norm")]
    ZeroNormVector { position: usize },

    #[error("Position {position} out of bounds for index of {len} vectors")]
    OutOfBounds { position: usize, len: usize },
}
