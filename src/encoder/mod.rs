//! Text embedding encoders
//!
//! An encoder maps text to a fixed-size embedding vector and must be
//! deterministic: identical input yields an identical vector. That property
//! is what makes the cache decorator sound and exact self-retrieval hold.

pub mod cache;
pub mod hashing;
pub mod remote;

pub use cache::CachedEncoder;
pub use hashing::HashingEncoder;
pub use remote::HttpEncoder;

use crate::error::Result;
use async_trait::async_trait;

/// Embedding computation boundary
#[async_trait]
pub trait Encoder: Send + Sync {
    /// Compute the embedding for a piece of text
    async fn encode(&self, text: &str) -> Result<Vec<f32>>;

    /// Length of every vector this encoder produces
    fn dimension(&self) -> usize;
}
