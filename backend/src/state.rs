use circuit_inputs::CircuitRegistry;
use std::sync::Arc;

/// Registry is populated before the server starts and only read afterwards.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<CircuitRegistry>,
}

impl AppState {
    pub fn new(registry: CircuitRegistry) -> Self {
        Self { registry: Arc::new(registry) }
    }
}
