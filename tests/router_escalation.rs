//! Integration tests for the tier escalation policy
//!
//! These verify the core routing invariant: "no match" escalates to the next
//! tier, an error aborts the query tagged with the failing tier, and a hit
//! short-circuits everything below it.

use async_trait::async_trait;
use retrieval_router::encoder::{Encoder, HashingEncoder};
use retrieval_router::error::{Result, RouterError};
use retrieval_router::fallback::FallbackResponder;
use retrieval_router::ingest::{IngestionPipeline, QaPair};
use retrieval_router::knowledge::{Fact, TripleStore};
use retrieval_router::router::{FallbackTier, KnowledgeTier, QueryRouter, TierKind, VectorTier};
use retrieval_router::vector::{Collection, MemoryIndex, VectorStore};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Encoder that counts calls, for proving a tier was never consulted
struct CountingEncoder {
    inner: HashingEncoder,
    calls: Arc<AtomicUsize>,
}

impl CountingEncoder {
    fn new(calls: Arc<AtomicUsize>) -> Self {
        Self {
            inner: HashingEncoder::new(64),
            calls,
        }
    }
}

#[async_trait]
impl Encoder for CountingEncoder {
    async fn encode(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.encode(text).await
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }
}

/// Encoder that always fails, for proving errors propagate
struct FailingEncoder;

#[async_trait]
impl Encoder for FailingEncoder {
    async fn encode(&self, _text: &str) -> Result<Vec<f32>> {
        Err(RouterError::Encoder("model unavailable".to_string()))
    }

    fn dimension(&self) -> usize {
        64
    }
}

fn covid_corpus() -> Vec<QaPair> {
    vec![
        QaPair {
            question: "What is COVID-19?".to_string(),
            answer: "COVID-19 is a disease caused by the SARS-CoV-2 virus.".to_string(),
        },
        QaPair {
            question: "What does ibuprofen do?".to_string(),
            answer: "Ibuprofen reduces pain, fever, and inflammation.".to_string(),
        },
    ]
}

async fn populated_store(encoder: Arc<dyn Encoder>) -> (Arc<VectorStore>, Collection) {
    let store = Arc::new(VectorStore::new(encoder, Arc::new(MemoryIndex::new())));
    let collection = store.ensure_collection("biomedical_faq").await.unwrap();
    let pipeline = IngestionPipeline::new(store.clone(), 2);
    pipeline.ingest(&collection, &covid_corpus()).await.unwrap();
    (store, collection)
}

#[tokio::test]
async fn test_kb_hit_short_circuits_vector_and_fallback() {
    let calls = Arc::new(AtomicUsize::new(0));
    let encoder: Arc<dyn Encoder> = Arc::new(CountingEncoder::new(calls.clone()));

    // The vector store also contains COVID-19 content, so only the KB hit
    // explains a knowledge_base answer.
    let (store, collection) = populated_store(encoder.clone()).await;
    let facts = Arc::new(TripleStore::from_facts(vec![Fact::new(
        "COVID-19 article",
        "describes",
        "COVID-19 is a disease caused by SARS-CoV-2.",
    )]));

    let router = QueryRouter::standard(
        KnowledgeTier::new(facts),
        VectorTier::new(store, collection, 1),
        FallbackTier::new(Arc::new(FallbackResponder::new(encoder, "placeholder"))),
    );

    let calls_after_ingest = calls.load(Ordering::SeqCst);
    let response = router.resolve("COVID-19").await.unwrap();

    assert_eq!(response.tier, TierKind::KnowledgeBase);
    assert_eq!(response.answer, "COVID-19 is a disease caused by SARS-CoV-2.");
    assert_eq!(
        response.provenance.get("subject").map(String::as_str),
        Some("COVID-19 article")
    );
    // Neither the vector tier nor the fallback ran: no new encode calls.
    assert_eq!(calls.load(Ordering::SeqCst), calls_after_ingest);
}

#[tokio::test]
async fn test_kb_miss_escalates_to_vector() {
    let encoder: Arc<dyn Encoder> = Arc::new(HashingEncoder::new(64));
    let (store, collection) = populated_store(encoder.clone()).await;

    // Fact subjects share nothing with the query, so the KB misses.
    let facts = Arc::new(TripleStore::from_facts(vec![Fact::new(
        "Aspirin",
        "treats",
        "headaches",
    )]));

    let router = QueryRouter::standard(
        KnowledgeTier::new(facts),
        VectorTier::new(store, collection, 1),
        FallbackTier::new(Arc::new(FallbackResponder::new(encoder, "placeholder"))),
    );

    let response = router.resolve("What is COVID-19?").await.unwrap();
    assert_eq!(response.tier, TierKind::VectorSearch);
    assert_eq!(
        response.answer,
        "COVID-19 is a disease caused by the SARS-CoV-2 virus."
    );
}

#[tokio::test]
async fn test_fallback_liveness_on_empty_stores() {
    let encoder: Arc<dyn Encoder> = Arc::new(HashingEncoder::new(64));
    let store = Arc::new(VectorStore::new(
        encoder.clone(),
        Arc::new(MemoryIndex::new()),
    ));
    let collection = store.ensure_collection("biomedical_faq").await.unwrap();

    let router = QueryRouter::standard(
        KnowledgeTier::new(Arc::new(TripleStore::default())),
        VectorTier::new(store, collection, 1),
        FallbackTier::new(Arc::new(FallbackResponder::new(
            encoder,
            "Generated response from the neural fallback model (placeholder)",
        ))),
    );

    // Empty KB and empty collection: a well-formed query still gets an
    // answer, never an error.
    let response = router.resolve("What is tinnitus?").await.unwrap();
    assert_eq!(response.tier, TierKind::Fallback);
    assert_eq!(
        response.answer,
        "Generated response from the neural fallback model (placeholder)"
    );
}

#[tokio::test]
async fn test_vector_tier_error_propagates_with_tier_tag() {
    let failing: Arc<dyn Encoder> = Arc::new(FailingEncoder);
    let store = Arc::new(VectorStore::new(
        failing.clone(),
        Arc::new(MemoryIndex::new()),
    ));
    let collection = store.ensure_collection("biomedical_faq").await.unwrap();

    let router = QueryRouter::standard(
        KnowledgeTier::new(Arc::new(TripleStore::default())),
        VectorTier::new(store, collection, 1),
        FallbackTier::new(Arc::new(FallbackResponder::new(failing, "placeholder"))),
    );

    let err = router.resolve("What is COVID-19?").await.err().unwrap();
    assert_eq!(err.tier(), Some(TierKind::VectorSearch));
}

#[tokio::test]
async fn test_fallback_error_is_not_masked_as_answer() {
    // Working encoder for the (empty) vector store, failing encoder for the
    // fallback: the query escalates to the fallback and then fails there.
    let working: Arc<dyn Encoder> = Arc::new(HashingEncoder::new(64));
    let store = Arc::new(VectorStore::new(
        working,
        Arc::new(MemoryIndex::new()),
    ));
    let collection = store.ensure_collection("biomedical_faq").await.unwrap();

    let router = QueryRouter::standard(
        KnowledgeTier::new(Arc::new(TripleStore::default())),
        VectorTier::new(store, collection, 1),
        FallbackTier::new(Arc::new(FallbackResponder::new(
            Arc::new(FailingEncoder),
            "placeholder",
        ))),
    );

    let err = router.resolve("What is COVID-19?").await.err().unwrap();
    assert_eq!(err.tier(), Some(TierKind::Fallback));
}

#[tokio::test]
async fn test_top_k_zero_surfaces_as_vector_tier_error() {
    let encoder: Arc<dyn Encoder> = Arc::new(HashingEncoder::new(64));
    let (store, collection) = populated_store(encoder.clone()).await;

    let router = QueryRouter::standard(
        KnowledgeTier::new(Arc::new(TripleStore::default())),
        VectorTier::new(store, collection, 0),
        FallbackTier::new(Arc::new(FallbackResponder::new(encoder, "placeholder"))),
    );

    // k < 1 is a precondition violation, not a "no match": it must not fall
    // through to the fallback.
    let err = router.resolve("What is COVID-19?").await.err().unwrap();
    assert_eq!(err.tier(), Some(TierKind::VectorSearch));
}
