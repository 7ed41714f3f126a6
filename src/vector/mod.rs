//! Semantic document retrieval
//!
//! A `VectorStore` pairs an `Encoder` with a `VectorIndex` backend and
//! enforces the store contracts (unique ids, non-empty text, `question`
//! metadata, k >= 1). Two backends ship: an in-process index with on-disk
//! snapshots and a Qdrant-backed index.

pub mod memory;
pub mod models;
pub mod qdrant;
pub mod store;

pub use memory::{cosine_similarity, MemoryIndex};
pub use models::{Collection, DocumentRecord, ScoredDocument};
pub use qdrant::QdrantIndex;
pub use store::VectorStore;

use crate::error::Result;
use async_trait::async_trait;

/// Storage seam between the store facade and a concrete index backend
///
/// Implementations are keyed by collection name and own the duplicate-id
/// check: `insert` must reject an id already present in the collection.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Create the collection if it does not exist; idempotent
    async fn ensure_collection(&self, collection: &str) -> Result<()>;

    /// Insert a document; errors with `DuplicateId` if the id exists
    async fn insert(&self, collection: &str, document: DocumentRecord) -> Result<()>;

    /// Whether a document id exists in the collection
    async fn contains(&self, collection: &str, id: &str) -> Result<bool>;

    /// The `k` most similar documents, most similar first
    async fn search(&self, collection: &str, embedding: &[f32], k: usize)
        -> Result<Vec<ScoredDocument>>;

    /// Number of documents in the collection
    async fn len(&self, collection: &str) -> Result<usize>;
}
