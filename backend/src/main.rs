mod api;
mod errors;
mod models;
mod state;

use crate::errors::ApiError;
use crate::state::AppState;
use circuit_inputs::registry::ANON_AADHAAR_V1;
use circuit_inputs::{CircuitRegistry, SchemaVersion};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut registry = CircuitRegistry::with_defaults();
    let aadhaar_schema = aadhaar_schema_from_env();
    registry.register(ANON_AADHAAR_V1, aadhaar_schema);

    let state = AppState::new(registry);

    let app = api::router(state);

    let addr = std::env::var("BACKEND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|_| ApiError::Internal)?;

    tracing::info!(%addr, aadhaar_schema = %aadhaar_schema, "backend listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .map_err(|_| ApiError::Internal)?;

    Ok(())
}

/// `AADHAAR_SCHEMA=legacy` serves the first AnonAadhaar circuit under
/// `anonAadhaarV1`.
fn aadhaar_schema_from_env() -> SchemaVersion {
    match std::env::var("AADHAAR_SCHEMA").as_deref() {
        Ok("legacy") => SchemaVersion::AnonAadhaarV1Legacy,
        Ok("current") | Err(_) => SchemaVersion::AnonAadhaarV1,
        Ok(other) => {
            tracing::warn!(value = other, "unknown AADHAAR_SCHEMA, using current");
            SchemaVersion::AnonAadhaarV1
        }
    }
}
