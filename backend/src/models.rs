use circuit_inputs::SchemaVersion;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct CircuitSummary {
    pub id: String,
    pub schema: String,
    /// Template tree depth, also the length of every sibling path.
    pub tree_depth: usize,
    pub signal_count: usize,
}

impl CircuitSummary {
    pub fn new(id: &str, schema: SchemaVersion) -> Self {
        Self {
            id: id.to_string(),
            schema: schema.name().to_string(),
            tree_depth: schema.depth(),
            signal_count: schema.signal_count(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CircuitListResponse {
    pub circuits: Vec<CircuitSummary>,
}
