use crate::errors::ApiError;
use crate::models::*;
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use circuit_inputs::CircuitInputs;
use serde_json::{Map, Value};
use tower_http::cors::{Any, CorsLayer};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/v1/circuits", get(list_circuits))
        .route("/api/v1/circuits/:id/inputs", post(compile_inputs))
        .route("/api/v1/circuits/:id/signals", post(parse_signals))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

async fn list_circuits(State(state): State<AppState>) -> Json<CircuitListResponse> {
    let circuits = state
        .registry
        .ids()
        .map(|(id, schema)| CircuitSummary::new(id, schema))
        .collect();

    Json(CircuitListResponse { circuits })
}

async fn compile_inputs(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<CircuitInputs>, ApiError> {
    // Tree hashing and RSA parsing are CPU-bound.
    let registry = state.registry.clone();
    let circuit = id.clone();
    let inputs = tokio::task::spawn_blocking(move || registry.compile(&circuit, &body))
        .await
        .map_err(|_| ApiError::Internal)??;

    tracing::info!(circuit = %id, "compiled circuit inputs");

    Ok(Json(inputs))
}

async fn parse_signals(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Map<String, Value>>, ApiError> {
    let signals = state.registry.parse_signals_json(&id, &body)?;
    Ok(Json(signals))
}
