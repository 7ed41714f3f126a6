//! End-to-end tests for ingestion and retrieval
//!
//! Exercise the full wiring: corpus -> pipeline -> encoder -> index ->
//! router, including idempotent re-ingestion and snapshot persistence.

use retrieval_router::encoder::{CachedEncoder, Encoder, HashingEncoder};
use retrieval_router::fallback::FallbackResponder;
use retrieval_router::ingest::{IngestionPipeline, QaPair};
use retrieval_router::knowledge::TripleStore;
use retrieval_router::router::{FallbackTier, KnowledgeTier, QueryRouter, TierKind, VectorTier};
use retrieval_router::vector::{MemoryIndex, VectorStore};
use std::sync::Arc;

fn corpus() -> Vec<QaPair> {
    vec![
        QaPair {
            question: "What is COVID-19?".to_string(),
            answer: "COVID-19 is a disease caused by the SARS-CoV-2 virus.".to_string(),
        },
        QaPair {
            question: "What are flu symptoms?".to_string(),
            answer: "Flu symptoms include fever, cough, and fatigue.".to_string(),
        },
        QaPair {
            question: "What does ibuprofen do?".to_string(),
            answer: "Ibuprofen reduces pain, fever, and inflammation.".to_string(),
        },
    ]
}

fn hashing_store() -> Arc<VectorStore> {
    let encoder: Arc<dyn Encoder> = Arc::new(HashingEncoder::new(128));
    Arc::new(VectorStore::new(encoder, Arc::new(MemoryIndex::new())))
}

#[tokio::test]
async fn test_ingested_question_is_answered_verbatim() {
    let store = hashing_store();
    let collection = store.ensure_collection("biomedical_faq").await.unwrap();
    let pipeline = Arc::new(IngestionPipeline::new(store.clone(), 4));

    let report = pipeline.ingest(&collection, &corpus()).await.unwrap();
    assert_eq!(report.ingested, 3);
    assert_eq!(report.skipped, 0);

    let encoder = store.encoder().clone();
    let router = QueryRouter::standard(
        KnowledgeTier::new(Arc::new(TripleStore::default())),
        VectorTier::new(store, collection, 1),
        FallbackTier::new(Arc::new(FallbackResponder::new(encoder, "placeholder"))),
    );

    let response = router.resolve("What is COVID-19?").await.unwrap();
    assert_eq!(response.tier, TierKind::VectorSearch);
    assert_eq!(
        response.answer,
        "COVID-19 is a disease caused by the SARS-CoV-2 virus."
    );
    assert_eq!(
        response.provenance.get("question").map(String::as_str),
        Some("What is COVID-19?")
    );
    assert!(response.score.is_some());
}

#[tokio::test]
async fn test_reingest_is_idempotent() {
    let store = hashing_store();
    let collection = store.ensure_collection("biomedical_faq").await.unwrap();
    let pipeline = IngestionPipeline::new(store.clone(), 2);

    let first = pipeline.ingest(&collection, &corpus()).await.unwrap();
    assert_eq!(first.ingested, 3);

    let second = pipeline.ingest(&collection, &corpus()).await.unwrap();
    assert_eq!(second.ingested, 0);
    assert_eq!(second.skipped, 3);
    assert_eq!(store.len(&collection).await.unwrap(), 3);
}

#[tokio::test]
async fn test_snapshot_restores_across_instances() {
    let dir = tempfile::tempdir().unwrap();
    let encoder: Arc<dyn Encoder> = Arc::new(HashingEncoder::new(128));

    {
        let index = Arc::new(MemoryIndex::with_data_dir(dir.path()));
        let store = Arc::new(VectorStore::new(encoder.clone(), index));
        let collection = store.ensure_collection("biomedical_faq").await.unwrap();
        let pipeline = IngestionPipeline::new(store.clone(), 2);
        pipeline.ingest(&collection, &corpus()).await.unwrap();
        assert_eq!(store.len(&collection).await.unwrap(), 3);
    }

    // A fresh index over the same directory picks the records back up.
    let index = Arc::new(MemoryIndex::with_data_dir(dir.path()));
    let store = Arc::new(VectorStore::new(encoder, index));
    let collection = store.ensure_collection("biomedical_faq").await.unwrap();
    assert_eq!(store.len(&collection).await.unwrap(), 3);

    let results = store.query(&collection, "What is COVID-19?", 1).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(
        results[0].text,
        "COVID-19 is a disease caused by the SARS-CoV-2 virus."
    );
}

#[tokio::test]
async fn test_cached_encoder_through_full_pipeline() {
    let inner: Arc<dyn Encoder> = Arc::new(HashingEncoder::new(128));
    let encoder: Arc<dyn Encoder> = Arc::new(CachedEncoder::new(inner, 256));
    let store = Arc::new(VectorStore::new(encoder, Arc::new(MemoryIndex::new())));
    let collection = store.ensure_collection("biomedical_faq").await.unwrap();
    let pipeline = IngestionPipeline::new(store.clone(), 2);
    pipeline.ingest(&collection, &corpus()).await.unwrap();

    // Same query text hits the embedding cache on the second resolve;
    // the answer is unchanged.
    let first = store.query(&collection, "What does ibuprofen do?", 1).await.unwrap();
    let second = store.query(&collection, "What does ibuprofen do?", 1).await.unwrap();
    assert_eq!(first[0].id, second[0].id);
    assert_eq!(first[0].text, "Ibuprofen reduces pain, fever, and inflammation.");
}

#[tokio::test]
async fn test_query_empty_collection_returns_no_results() {
    let store = hashing_store();
    let collection = store.ensure_collection("biomedical_faq").await.unwrap();

    let results = store.query(&collection, "anything", 5).await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_corpus_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("corpus.json");
    std::fs::write(&path, serde_json::to_string(&corpus()).unwrap()).unwrap();

    let store = hashing_store();
    let collection = store.ensure_collection("biomedical_faq").await.unwrap();
    let pipeline = IngestionPipeline::new(store.clone(), 2);

    let report = pipeline.ingest_file(&collection, &path).await.unwrap();
    assert_eq!(report.ingested, 3);
    assert_eq!(store.len(&collection).await.unwrap(), 3);
}
