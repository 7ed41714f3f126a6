//! Caching decorator for encoders
//!
//! Encoders are deterministic, so caching by input text is lossless. Wraps
//! any `Encoder` with a bounded async cache.

use super::Encoder;
use crate::error::Result;
use crate::metrics::METRICS;
use async_trait::async_trait;
use moka::future::Cache;
use std::sync::Arc;
use tracing::debug;

/// Encoder wrapper that caches computed embeddings
pub struct CachedEncoder {
    inner: Arc<dyn Encoder>,
    cache: Cache<String, Vec<f32>>,
}

impl CachedEncoder {
    /// Wrap an encoder with a cache holding up to `capacity` embeddings
    pub fn new(inner: Arc<dyn Encoder>, capacity: u64) -> Self {
        Self {
            inner,
            cache: Cache::new(capacity),
        }
    }

    /// Number of embeddings currently cached
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

#[async_trait]
impl Encoder for CachedEncoder {
    async fn encode(&self, text: &str) -> Result<Vec<f32>> {
        if let Some(embedding) = self.cache.get(text).await {
            METRICS.record_cache_lookup(true);
            debug!("Embedding cache hit ({} chars)", text.len());
            return Ok(embedding);
        }

        METRICS.record_cache_lookup(false);
        let embedding = self.inner.encode(text).await?;
        self.cache.insert(text.to_string(), embedding.clone()).await;
        Ok(embedding)
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }
}
