//! Service binary
//!
//! With a free-text argument, resolves it once and prints the answer and the
//! tier that produced it. With no argument, serves the HTTP API.

use retrieval_router::api::{build_router, AppState};
use retrieval_router::config::{
    Config, EmbeddingProvider, KnowledgeConfig, LoggingConfig, VectorBackend,
};
use retrieval_router::encoder::{CachedEncoder, Encoder, HashingEncoder, HttpEncoder};
use retrieval_router::fallback::FallbackResponder;
use retrieval_router::ingest::IngestionPipeline;
use retrieval_router::knowledge::TripleStore;
use retrieval_router::router::{FallbackTier, KnowledgeTier, QueryRouter, VectorTier};
use retrieval_router::vector::{MemoryIndex, QdrantIndex, VectorIndex, VectorStore};
use retrieval_router::Result;
use std::sync::Arc;
use tracing::{info, warn};

fn init_tracing(config: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.level));

    if config.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn build_encoder(config: &Config) -> Result<Arc<dyn Encoder>> {
    let base: Arc<dyn Encoder> = match config.embedding.provider {
        EmbeddingProvider::Hashing => Arc::new(HashingEncoder::new(config.embedding.dimension)),
        EmbeddingProvider::Remote => Arc::new(HttpEncoder::new(config.embedding.clone())?),
    };

    if config.embedding.cache_capacity > 0 {
        Ok(Arc::new(CachedEncoder::new(
            base,
            config.embedding.cache_capacity,
        )))
    } else {
        Ok(base)
    }
}

fn build_index(config: &Config) -> Result<Arc<dyn VectorIndex>> {
    if config.vector_db.vector_size != config.embedding.dimension {
        warn!(
            "vector_db.vector_size {} does not match embedding.dimension {}",
            config.vector_db.vector_size, config.embedding.dimension
        );
    }

    match config.vector_db.backend {
        VectorBackend::Memory => {
            let index = match &config.vector_db.data_dir {
                Some(dir) => MemoryIndex::with_data_dir(dir),
                None => MemoryIndex::new(),
            };
            Ok(Arc::new(index))
        }
        VectorBackend::Qdrant => Ok(Arc::new(QdrantIndex::connect(
            &config.vector_db.url,
            config.vector_db.vector_size,
        )?)),
    }
}

fn load_facts(config: &KnowledgeConfig) -> Result<TripleStore> {
    if let Some(pattern) = &config.facts_glob {
        TripleStore::load_glob(pattern)
    } else if let Some(path) = &config.facts_path {
        TripleStore::load_file(path)
    } else {
        Ok(TripleStore::default())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::load()?;
    init_tracing(&config.logging);
    info!("Starting retrieval router");

    let encoder = build_encoder(&config)?;
    let index = build_index(&config)?;
    let store = Arc::new(VectorStore::new(encoder.clone(), index));
    let collection = store
        .ensure_collection(&config.vector_db.collection_name)
        .await?;

    let facts = Arc::new(load_facts(&config.knowledge)?);
    info!("Knowledge base holds {} fact(s)", facts.len());

    let responder = Arc::new(FallbackResponder::new(
        encoder,
        config.fallback.response_template.clone(),
    ));

    let pipeline = Arc::new(IngestionPipeline::new(
        store.clone(),
        config.ingestion.concurrency,
    ));
    if let Some(path) = &config.ingestion.corpus_path {
        let report = pipeline.ingest_file(&collection, path).await?;
        info!(
            "Corpus '{}' loaded: {} ingested, {} skipped",
            path, report.ingested, report.skipped
        );
    }

    let router = Arc::new(
        QueryRouter::standard(
            KnowledgeTier::new(facts),
            VectorTier::new(store, collection.clone(), config.router.top_k),
            FallbackTier::new(responder),
        )
        .with_tier_timeout(config.router.tier_timeout()),
    );

    // One-shot mode: resolve the argument and exit.
    if let Some(query) = std::env::args().nth(1) {
        let response = router.resolve(&query).await?;
        println!("[{}] {}", response.tier, response.answer);
        return Ok(());
    }

    let state = AppState {
        router,
        pipeline,
        collection,
    };
    let app = build_router(state, config.server.max_body_bytes);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
