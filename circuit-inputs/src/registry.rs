//! Circuit id dispatch.

use crate::compiler::{compile_aadhaar, compile_passport, CircuitInputs};
use crate::error::{CircuitInputError, Result};
use crate::hash::{FieldHasher, PoseidonHasher};
use crate::identity::{Iden3Resolver, IdentityResolver};
use crate::schema::{DocumentKind, SchemaVersion};
use crate::signals::PublicSignals;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

pub const ANON_AADHAAR_V1: &str = "anonAadhaarV1";
pub const PASSPORT_V1: &str = "passportV1";

/// Maps circuit ids to schema versions. Built once at startup and shared
/// read-only afterwards.
pub struct CircuitRegistry {
    circuits: BTreeMap<String, SchemaVersion>,
    resolver: Box<dyn IdentityResolver>,
    hasher: Arc<dyn FieldHasher>,
}

impl CircuitRegistry {
    pub fn new(resolver: Box<dyn IdentityResolver>, hasher: Arc<dyn FieldHasher>) -> Self {
        Self { circuits: BTreeMap::new(), resolver, hasher }
    }

    /// `anonAadhaarV1` and `passportV1` with the iden3 resolver and Poseidon.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new(Box::new(Iden3Resolver), Arc::new(PoseidonHasher));
        registry.register(ANON_AADHAAR_V1, SchemaVersion::AnonAadhaarV1);
        registry.register(PASSPORT_V1, SchemaVersion::PassportV1);
        registry
    }

    /// Bind `id` to `schema`, replacing any previous binding.
    pub fn register(&mut self, id: impl Into<String>, schema: SchemaVersion) {
        let id = id.into();
        debug!(circuit = %id, schema = %schema, "registered circuit");
        self.circuits.insert(id, schema);
    }

    pub fn schema(&self, id: &str) -> Result<SchemaVersion> {
        self.circuits
            .get(id)
            .copied()
            .ok_or_else(|| CircuitInputError::UnknownCircuit(id.to_string()))
    }

    pub fn ids(&self) -> impl Iterator<Item = (&str, SchemaVersion)> {
        self.circuits.iter().map(|(id, schema)| (id.as_str(), *schema))
    }

    /// Decode a request body for circuit `id` and compile it.
    pub fn compile(&self, id: &str, request: &[u8]) -> Result<CircuitInputs> {
        let schema = self.schema(id)?;
        let resolver = self.resolver.as_ref();

        Ok(match schema.document() {
            DocumentKind::AadhaarQr => {
                let request = serde_json::from_slice(request)?;
                CircuitInputs::AnonAadhaar(compile_aadhaar(schema, &request, resolver, self.hasher.clone())?)
            }
            DocumentKind::Passport => {
                let request = serde_json::from_slice(request)?;
                CircuitInputs::Passport(compile_passport(schema, &request, resolver, self.hasher.clone())?)
            }
        })
    }

    pub fn compile_json(&self, id: &str, request: &[u8]) -> Result<Vec<u8>> {
        self.compile(id, request)?.to_json()
    }

    pub fn parse_signals(&self, id: &str, signals: &[u8]) -> Result<PublicSignals> {
        PublicSignals::parse(self.schema(id)?, signals)
    }

    pub fn parse_signals_json(&self, id: &str, signals: &[u8]) -> Result<Map<String, Value>> {
        Ok(self.parse_signals(id, signals)?.to_map())
    }
}

impl Default for CircuitRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
