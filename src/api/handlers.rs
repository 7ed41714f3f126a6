//! HTTP API handlers

use crate::error::RouterError;
use crate::ingest::{IngestReport, IngestionPipeline, QaPair};
use crate::metrics::METRICS;
use crate::router::{QueryRouter, TierKind};
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<QueryRouter>,
    pub pipeline: Arc<IngestionPipeline>,
    pub collection: crate::vector::Collection,
}

/// JSON error envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

fn error_response(e: RouterError) -> (StatusCode, Json<ApiError>) {
    error!("Request failed: {}", e);
    match e {
        RouterError::InvalidArgument(_) => (
            StatusCode::BAD_REQUEST,
            Json(ApiError::new("VALIDATION_ERROR", e.to_string())),
        ),
        RouterError::DuplicateId { .. } => (
            StatusCode::CONFLICT,
            Json(ApiError::new("DUPLICATE_ID", e.to_string())),
        ),
        RouterError::Tier { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError::new("TIER_ERROR", e.to_string())),
        ),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError::new("INTERNAL_ERROR", e.to_string())),
        ),
    }
}

/// Query request body
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

/// Query response body
#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub query_id: String,
    pub answer: String,
    pub tier: TierKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
    pub provenance: HashMap<String, String>,
}

/// Resolve a query through the tier chain
///
/// POST /api/v1/query
pub async fn resolve_query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, (StatusCode, Json<ApiError>)> {
    let query_id = uuid::Uuid::new_v4().to_string();
    info!("Query request: query_id={}", query_id);

    if request.query.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiError::new("VALIDATION_ERROR", "Query cannot be empty")),
        ));
    }

    match state.router.resolve(&request.query).await {
        Ok(response) => {
            info!(
                "Query resolved: query_id={}, tier={}",
                query_id, response.tier
            );
            Ok(Json(QueryResponse {
                query_id,
                answer: response.answer,
                tier: response.tier,
                score: response.score,
                provenance: response.provenance,
            }))
        }
        Err(e) => Err(error_response(e)),
    }
}

/// Ingestion request body
#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    pub pairs: Vec<QaPair>,
}

/// Ingest question/answer pairs into the corpus collection
///
/// POST /api/v1/ingest
pub async fn ingest_pairs(
    State(state): State<AppState>,
    Json(request): Json<IngestRequest>,
) -> Result<Json<IngestReport>, (StatusCode, Json<ApiError>)> {
    info!("Ingest request: {} pair(s)", request.pairs.len());

    if request.pairs.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiError::new("VALIDATION_ERROR", "No pairs to ingest")),
        ));
    }

    match state
        .pipeline
        .ingest(&state.collection, &request.pairs)
        .await
    {
        Ok(report) => Ok(Json(report)),
        Err(e) => Err(error_response(e)),
    }
}

/// Liveness check
///
/// GET /health
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Prometheus text-format metrics
///
/// GET /metrics
pub async fn export_metrics() -> String {
    METRICS.export_prometheus()
}
