use criterion::{criterion_group, criterion_main, Criterion};
use retrieval_router::encoder::{Encoder, HashingEncoder};
use retrieval_router::vector::{DocumentRecord, MemoryIndex, VectorIndex, VectorStore};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::runtime::Runtime;

fn bench_hashing_encode(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let encoder = HashingEncoder::new(384);

    c.bench_function("hashing_encode_question", |b| {
        b.iter(|| {
            rt.block_on(encoder.encode("What are the common symptoms of seasonal influenza?"))
                .unwrap()
        })
    });
}

fn bench_memory_search_1k(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let encoder = HashingEncoder::new(384);
    let index = MemoryIndex::new();

    rt.block_on(async {
        index.ensure_collection("bench").await.unwrap();
        for i in 0..1000 {
            let text = format!("document number {i} about condition {}", i % 37);
            let embedding = encoder.encode(&text).await.unwrap();
            index
                .insert(
                    "bench",
                    DocumentRecord {
                        id: i.to_string(),
                        text,
                        metadata: HashMap::new(),
                        embedding,
                    },
                )
                .await
                .unwrap();
        }
    });

    let query = rt.block_on(encoder.encode("document about condition 12")).unwrap();

    c.bench_function("memory_search_top5_of_1k", |b| {
        b.iter(|| rt.block_on(index.search("bench", &query, 5)).unwrap())
    });
}

fn bench_store_query_end_to_end(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let encoder: Arc<dyn Encoder> = Arc::new(HashingEncoder::new(384));
    let store = VectorStore::new(encoder, Arc::new(MemoryIndex::new()));

    let collection = rt.block_on(async {
        let collection = store.ensure_collection("bench").await.unwrap();
        for i in 0..100 {
            let mut metadata = HashMap::new();
            metadata.insert("question".to_string(), format!("question {i}"));
            store
                .add(
                    &collection,
                    &i.to_string(),
                    &format!("answer text for question number {i}"),
                    metadata,
                )
                .await
                .unwrap();
        }
        collection
    });

    c.bench_function("store_query_top1_of_100", |b| {
        b.iter(|| {
            rt.block_on(store.query(&collection, "answer text for question number 42", 1))
                .unwrap()
        })
    });
}

criterion_group!(
    benches,
    bench_hashing_encode,
    bench_memory_search_1k,
    bench_store_query_end_to_end
);
criterion_main!(benches);
