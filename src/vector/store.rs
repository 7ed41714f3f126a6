//! Vector store facade
//!
//! Pairs an encoder with an index backend and enforces the write and query
//! contracts. Embeddings are computed here, at the boundary, so callers
//! never handle raw vectors.

use super::models::{Collection, DocumentRecord, ScoredDocument};
use super::VectorIndex;
use crate::encoder::Encoder;
use crate::error::{Result, RouterError};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Document store with semantic search
pub struct VectorStore {
    encoder: Arc<dyn Encoder>,
    index: Arc<dyn VectorIndex>,
}

impl VectorStore {
    /// Create a store over an encoder and an index backend
    pub fn new(encoder: Arc<dyn Encoder>, index: Arc<dyn VectorIndex>) -> Self {
        Self { encoder, index }
    }

    /// Look up or create a named collection
    ///
    /// Idempotent: an existing collection is returned untouched.
    pub async fn ensure_collection(&self, name: &str) -> Result<Collection> {
        self.index.ensure_collection(name).await?;
        Ok(Collection::new(name))
    }

    /// Add a document, computing its embedding from `text`
    ///
    /// Rejects empty text, metadata without a non-empty `question` entry,
    /// and ids already present in the collection.
    pub async fn add(
        &self,
        collection: &Collection,
        id: &str,
        text: &str,
        metadata: HashMap<String, String>,
    ) -> Result<()> {
        if id.is_empty() {
            return Err(RouterError::InvalidArgument(
                "document id cannot be empty".to_string(),
            ));
        }
        if text.is_empty() {
            return Err(RouterError::InvalidArgument(
                "document text cannot be empty".to_string(),
            ));
        }
        if metadata.get("question").map_or(true, |q| q.is_empty()) {
            return Err(RouterError::InvalidArgument(
                "metadata must carry a non-empty 'question' entry".to_string(),
            ));
        }

        let embedding = self.encoder.encode(text).await?;
        debug!(
            "Adding document id={} to '{}' ({} dims)",
            id,
            collection.name(),
            embedding.len()
        );

        let document = DocumentRecord {
            id: id.to_string(),
            text: text.to_string(),
            metadata,
            embedding,
        };

        self.index.insert(collection.name(), document).await
    }

    /// Whether a document id exists in the collection
    pub async fn contains(&self, collection: &Collection, id: &str) -> Result<bool> {
        self.index.contains(collection.name(), id).await
    }

    /// The `k` documents most similar to `query_text`, most similar first
    ///
    /// An empty collection yields an empty result, never an error.
    pub async fn query(
        &self,
        collection: &Collection,
        query_text: &str,
        k: usize,
    ) -> Result<Vec<ScoredDocument>> {
        if k < 1 {
            return Err(RouterError::InvalidArgument(
                "k must be at least 1".to_string(),
            ));
        }

        let embedding = self.encoder.encode(query_text).await?;
        self.index.search(collection.name(), &embedding, k).await
    }

    /// Number of documents in the collection
    pub async fn len(&self, collection: &Collection) -> Result<usize> {
        self.index.len(collection.name()).await
    }

    /// The encoder backing this store
    pub fn encoder(&self) -> &Arc<dyn Encoder> {
        &self.encoder
    }
}
