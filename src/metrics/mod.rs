//! Metrics collection for observability

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec_with_registry, register_counter_with_registry,
    register_histogram_vec_with_registry, register_histogram_with_registry, Counter, CounterVec,
    Histogram, HistogramVec, Opts, Registry,
};
use std::sync::Arc;

/// Global metrics registry
pub static METRICS: Lazy<Arc<Metrics>> = Lazy::new(|| {
    Arc::new(Metrics::new().expect("Failed to initialize metrics"))
});

/// Metrics collector
pub struct Metrics {
    registry: Registry,

    // Routing metrics
    pub tier_requests: CounterVec,
    pub tier_duration: HistogramVec,
    pub resolve_duration: Histogram,
    pub escalations: Counter,

    // Ingestion metrics
    pub ingest_documents: CounterVec,

    // Encoder metrics
    pub encoder_requests: CounterVec,
    pub encoder_cache_hits: Counter,
    pub encoder_cache_misses: Counter,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let registry = Registry::new();

        // Routing metrics
        let tier_requests = register_counter_vec_with_registry!(
            Opts::new("tier_requests_total", "Tier attempts by outcome"),
            &["tier", "outcome"],
            registry
        )?;

        let tier_duration = register_histogram_vec_with_registry!(
            "tier_duration_seconds",
            "Time spent inside a single tier",
            &["tier"],
            registry
        )?;

        let resolve_duration = register_histogram_with_registry!(
            "resolve_duration_seconds",
            "End-to-end query resolution time",
            registry
        )?;

        let escalations = register_counter_with_registry!(
            Opts::new("escalations_total", "Total tier escalations (no-match results)"),
            registry
        )?;

        // Ingestion metrics
        let ingest_documents = register_counter_vec_with_registry!(
            Opts::new("ingest_documents_total", "Documents seen by the ingestion pipeline"),
            &["outcome"],
            registry
        )?;

        // Encoder metrics
        let encoder_requests = register_counter_vec_with_registry!(
            Opts::new("encoder_requests_total", "Remote encoder requests"),
            &["status"],
            registry
        )?;

        let encoder_cache_hits = register_counter_with_registry!(
            Opts::new("encoder_cache_hits_total", "Embedding cache hits"),
            registry
        )?;

        let encoder_cache_misses = register_counter_with_registry!(
            Opts::new("encoder_cache_misses_total", "Embedding cache misses"),
            registry
        )?;

        Ok(Self {
            registry,
            tier_requests,
            tier_duration,
            resolve_duration,
            escalations,
            ingest_documents,
            encoder_requests,
            encoder_cache_hits,
            encoder_cache_misses,
        })
    }

    /// Get the metrics registry for exporting
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Record a tier attempt outcome: "hit", "miss", or "error"
    pub fn record_tier(&self, tier: &str, outcome: &str) {
        self.tier_requests.with_label_values(&[tier, outcome]).inc();
        if outcome == "miss" {
            self.escalations.inc();
        }
    }

    /// Record an ingestion outcome: "ingested" or "skipped"
    pub fn record_ingest(&self, outcome: &str, count: usize) {
        self.ingest_documents
            .with_label_values(&[outcome])
            .inc_by(count as f64);
    }

    /// Record a remote encoder request
    pub fn record_encoder_request(&self, success: bool) {
        let status = if success { "success" } else { "error" };
        self.encoder_requests.with_label_values(&[status]).inc();
    }

    /// Record an embedding cache lookup
    pub fn record_cache_lookup(&self, hit: bool) {
        if hit {
            self.encoder_cache_hits.inc();
        } else {
            self.encoder_cache_misses.inc();
        }
    }

    /// Export metrics in Prometheus text format
    pub fn export_prometheus(&self) -> String {
        use prometheus::Encoder;

        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.registry.gather();

        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer).unwrap_or_default();

        String::from_utf8(buffer).unwrap_or_default()
    }
}
