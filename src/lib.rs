//! Tiered question answering
//!
//! Answers natural-language questions by consulting three progressively more
//! expensive knowledge sources in a fixed order: a structural knowledge-base
//! lookup, a semantic vector search, and a neural fallback responder. A tier
//! with no match escalates to the next; a tier that fails aborts the query
//! with an error tagged by the failing tier.
//!
//! ```no_run
//! use retrieval_router::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn run() -> retrieval_router::Result<()> {
//! let encoder: Arc<dyn Encoder> = Arc::new(HashingEncoder::new(384));
//! let store = Arc::new(VectorStore::new(encoder.clone(), Arc::new(MemoryIndex::new())));
//! let collection = store.ensure_collection("biomedical_faq").await?;
//!
//! let router = QueryRouter::standard(
//!     KnowledgeTier::new(Arc::new(TripleStore::default())),
//!     VectorTier::new(store.clone(), collection, 1),
//!     FallbackTier::new(Arc::new(FallbackResponder::new(encoder, "placeholder"))),
//! );
//!
//! let response = router.resolve("What is COVID-19?").await?;
//! println!("[{}] {}", response.tier, response.answer);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod encoder;
pub mod error;
pub mod fallback;
pub mod ingest;
pub mod knowledge;
pub mod metrics;
pub mod router;
pub mod vector;

pub use config::Config;
pub use error::{Result, RouterError};

/// Commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::encoder::{CachedEncoder, Encoder, HashingEncoder, HttpEncoder};
    pub use crate::error::{Result, RouterError};
    pub use crate::fallback::FallbackResponder;
    pub use crate::ingest::{IngestReport, IngestionPipeline, QaPair};
    pub use crate::knowledge::{Fact, TripleStore};
    pub use crate::router::{
        FallbackTier, KnowledgeTier, QueryRouter, RouterResponse, Tier, TierKind, TierMatch,
        VectorTier,
    };
    pub use crate::vector::{
        Collection, MemoryIndex, QdrantIndex, ScoredDocument, VectorIndex, VectorStore,
    };
}
