//! Top-K recommendation over a catalog and its similarity index.

use std::collections::HashSet;

use crate::catalog::{Catalog, CatalogStats};
use crate::similarity::index::{IndexError, SimilarityIndex};

/// Number of recommendations returned when the caller does not ask for more.
pub const DEFAULT_RECOMMENDATIONS: usize = 5;

/// A single recommended item.
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub title: String,
    /// Cosine distance from the queried item
    pub distance: f32,
}

/// Errors returned by [`Recommender::recommend`].
#[derive(Debug, thiserror::Error)]
pub enum RecommendError {
    #[error("Unknown item: {0:?}")]
    UnknownItem(String),

    #[error("Number of recommendations must be positive")]
    InvalidK,

    #[error("Index error: {0}")]
    Index(#[from] IndexError),
}

/// Recommends catalog items similar to a given one.
///
/// Owns the catalog and the index built from it. Both are read-only after
/// construction, so a recommender can be shared behind an `Arc` and queried
/// from any number of threads.
#[derive(Debug)]
pub struct Recommender {
    catalog: Catalog,
    index: SimilarityIndex,
}

impl Recommender {
    /// Build the index from the catalog vectors, moving them into the index.
    pub fn new(mut catalog: Catalog) -> Result<Self, IndexError> {
        let index = SimilarityIndex::build(catalog.take_vectors())?;
        Ok(Self { catalog, index })
    }

    #[cfg(test)]
    pub fn from_items(items: Vec<(String, Vec<f32>)>) -> Self {
        let catalog = Catalog::from_items(items).expect("valid catalog");
        Self::new(catalog).expect("valid vectors")
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn stats(&self) -> CatalogStats {
        CatalogStats {
            items: self.catalog.len(),
            dimensions: self.index.dimensions(),
            distinct_titles: self.catalog.distinct_len(),
            repeated_titles: self.catalog.repeated_titles(),
        }
    }

    /// Return up to `k` titles most similar to `query_title`.
    ///
    /// Candidates are walked in increasing distance. The queried item, any
    /// other item sharing its title, and titles already collected are
    /// skipped. The first `k + 1` neighbors are examined first; if repeated
    /// titles use up that window the search widens until `k` titles are
    /// found or the catalog is exhausted. Running short is not an error.
    pub fn recommend(&self, query_title: &str, k: usize) -> Result<Vec<Recommendation>, RecommendError> {
        if k == 0 {
            return Err(RecommendError::InvalidK);
        }

        let query = self
            .catalog
            .position_of(query_title)
            .ok_or_else(|| RecommendError::UnknownItem(query_title.to_string()))?;

        let total = self.index.len();
        // never more titles than items, whatever the caller asked for
        let k = k.min(total);
        let mut window = k.saturating_add(1).min(total);

        loop {
            let neighbors = self.index.kneighbors_of(query, window)?;

            let mut seen: HashSet<&str> = HashSet::with_capacity(k);
            let mut recommended = Vec::with_capacity(k);

            for neighbor in neighbors.iter().filter(|n| n.position != query) {
                let title = self.catalog.title(neighbor.position);
                if title == query_title || !seen.insert(title) {
                    continue;
                }

                recommended.push(Recommendation {
                    title: title.to_string(),
                    distance: neighbor.distance,
                });

                if recommended.len() == k {
                    break;
                }
            }

            if recommended.len() == k || window == total {
                log::debug!(
                    "query={query_title:?} k={k} window={window} found={}",
                    recommended.len()
                );
                return Ok(recommended);
            }

            window = window.saturating_mul(2).min(total);
        }
    }
}
