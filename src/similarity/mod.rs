//! Similarity search over the movie catalog.
//!
//! # Architecture
//!
//! - `index`: Immutable cosine-distance nearest-neighbor index
//! - `recommender`: Top-K recommendation with title de-duplication

mod index;
mod recommender;

#[cfg(test)]
pub use index::IndexError;
pub use recommender::{Recommendation, RecommendError, Recommender, DEFAULT_RECOMMENDATIONS};
