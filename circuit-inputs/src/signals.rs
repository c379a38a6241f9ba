//! Public signal parsing.
//!
//! A circuit's public outputs arrive as a JSON array of decimal strings.
//! Positions are fixed per circuit version.

use crate::error::{CircuitInputError, Result};
use crate::schema::SchemaVersion;
use serde_json::{Map, Value};

pub trait PubSignals: Sized {
    /// Number of signals the circuit emits.
    const COUNT: usize;

    fn from_signals(values: &[String]) -> Result<Self>;

    fn from_json(data: &[u8]) -> Result<Self> {
        let values: Vec<String> = serde_json::from_slice(data)?;
        Self::from_signals(&values)
    }

    /// Field name to value, using the circuit's camelCase names.
    fn to_map(&self) -> Map<String, Value>;
}

fn check_count(values: &[String], expected: usize) -> Result<()> {
    if values.len() != expected {
        return Err(CircuitInputError::SignalCountMismatch { expected, got: values.len() });
    }
    Ok(())
}

/// A field element signal: a non-empty run of ASCII digits.
fn decimal(field: &'static str, value: &str) -> Result<String> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CircuitInputError::SignalParse { field, value: value.to_string() });
    }
    Ok(value.to_string())
}

fn integer(field: &'static str, value: &str) -> Result<i64> {
    value
        .parse::<i64>()
        .map_err(|_| CircuitInputError::SignalParse { field, value: value.to_string() })
}

/// Signals of the current AnonAadhaar circuit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnonAadhaarV1PubSignals {
    pub pub_key_hash: String,
    pub nullifier: String,
    pub hash_index: String,
    pub hash_value: String,
    pub issuance_date: String,
    pub expiration_date: String,
    pub qr_version: i64,
    pub nullifier_seed: i64,
    pub signal_hash: i64,
    pub template_root: String,
    pub issuer_did_hash: String,
    pub revocation_nonce: i64,
}

impl PubSignals for AnonAadhaarV1PubSignals {
    const COUNT: usize = 12;

    fn from_signals(values: &[String]) -> Result<Self> {
        check_count(values, Self::COUNT)?;
        Ok(Self {
            pub_key_hash: decimal("pubKeyHash", &values[0])?,
            nullifier: decimal("nullifier", &values[1])?,
            hash_index: decimal("hashIndex", &values[2])?,
            hash_value: decimal("hashValue", &values[3])?,
            issuance_date: decimal("issuanceDate", &values[4])?,
            expiration_date: decimal("expirationDate", &values[5])?,
            qr_version: integer("qrVersion", &values[6])?,
            nullifier_seed: integer("nullifierSeed", &values[7])?,
            signal_hash: integer("signalHash", &values[8])?,
            template_root: decimal("templateRoot", &values[9])?,
            issuer_did_hash: decimal("issuerDIDHash", &values[10])?,
            revocation_nonce: integer("revocationNonce", &values[11])?,
        })
    }

    fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("pubKeyHash".into(), self.pub_key_hash.clone().into());
        map.insert("nullifier".into(), self.nullifier.clone().into());
        map.insert("hashIndex".into(), self.hash_index.clone().into());
        map.insert("hashValue".into(), self.hash_value.clone().into());
        map.insert("issuanceDate".into(), self.issuance_date.clone().into());
        map.insert("expirationDate".into(), self.expiration_date.clone().into());
        map.insert("qrVersion".into(), self.qr_version.into());
        map.insert("nullifierSeed".into(), self.nullifier_seed.into());
        map.insert("signalHash".into(), self.signal_hash.into());
        map.insert("templateRoot".into(), self.template_root.clone().into());
        map.insert("issuerDIDHash".into(), self.issuer_did_hash.clone().into());
        map.insert("revocationNonce".into(), self.revocation_nonce.into());
        map
    }
}

/// Signals of the first AnonAadhaar circuit (no QR version, no nonce).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnonAadhaarV1LegacyPubSignals {
    pub pub_key_hash: String,
    pub nullifier: String,
    pub hash_index: String,
    pub hash_value: String,
    pub issuance_date: String,
    pub expiration_date: String,
    pub nullifier_seed: i64,
    pub signal_hash: i64,
    pub template_root: String,
    pub issuer_did_hash: String,
}

impl PubSignals for AnonAadhaarV1LegacyPubSignals {
    const COUNT: usize = 10;

    fn from_signals(values: &[String]) -> Result<Self> {
        check_count(values, Self::COUNT)?;
        Ok(Self {
            pub_key_hash: decimal("pubKeyHash", &values[0])?,
            nullifier: decimal("nullifier", &values[1])?,
            hash_index: decimal("hashIndex", &values[2])?,
            hash_value: decimal("hashValue", &values[3])?,
            issuance_date: decimal("issuanceDate", &values[4])?,
            expiration_date: decimal("expirationDate", &values[5])?,
            nullifier_seed: integer("nullifierSeed", &values[6])?,
            signal_hash: integer("signalHash", &values[7])?,
            template_root: decimal("templateRoot", &values[8])?,
            issuer_did_hash: decimal("issuerDIDHash", &values[9])?,
        })
    }

    fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("pubKeyHash".into(), self.pub_key_hash.clone().into());
        map.insert("nullifier".into(), self.nullifier.clone().into());
        map.insert("hashIndex".into(), self.hash_index.clone().into());
        map.insert("hashValue".into(), self.hash_value.clone().into());
        map.insert("issuanceDate".into(), self.issuance_date.clone().into());
        map.insert("expirationDate".into(), self.expiration_date.clone().into());
        map.insert("nullifierSeed".into(), self.nullifier_seed.into());
        map.insert("signalHash".into(), self.signal_hash.into());
        map.insert("templateRoot".into(), self.template_root.clone().into());
        map.insert("issuerDIDHash".into(), self.issuer_did_hash.clone().into());
        map
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassportV1PubSignals {
    pub hash_index: String,
    pub hash_value: String,
    pub link_id: String,
    pub current_date: String,
    pub issuance_date: String,
    pub template_root: String,
}

impl PubSignals for PassportV1PubSignals {
    const COUNT: usize = 6;

    fn from_signals(values: &[String]) -> Result<Self> {
        check_count(values, Self::COUNT)?;
        Ok(Self {
            hash_index: decimal("hashIndex", &values[0])?,
            hash_value: decimal("hashValue", &values[1])?,
            link_id: decimal("linkId", &values[2])?,
            current_date: decimal("currentDate", &values[3])?,
            issuance_date: decimal("issuanceDate", &values[4])?,
            template_root: decimal("templateRoot", &values[5])?,
        })
    }

    fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("hashIndex".into(), self.hash_index.clone().into());
        map.insert("hashValue".into(), self.hash_value.clone().into());
        map.insert("linkId".into(), self.link_id.clone().into());
        map.insert("currentDate".into(), self.current_date.clone().into());
        map.insert("issuanceDate".into(), self.issuance_date.clone().into());
        map.insert("templateRoot".into(), self.template_root.clone().into());
        map
    }
}

/// Parsed signals of any schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicSignals {
    AnonAadhaarV1(AnonAadhaarV1PubSignals),
    AnonAadhaarV1Legacy(AnonAadhaarV1LegacyPubSignals),
    PassportV1(PassportV1PubSignals),
}

impl PublicSignals {
    pub fn parse(schema: SchemaVersion, data: &[u8]) -> Result<Self> {
        Ok(match schema {
            SchemaVersion::AnonAadhaarV1 => Self::AnonAadhaarV1(AnonAadhaarV1PubSignals::from_json(data)?),
            SchemaVersion::AnonAadhaarV1Legacy => {
                Self::AnonAadhaarV1Legacy(AnonAadhaarV1LegacyPubSignals::from_json(data)?)
            }
            SchemaVersion::PassportV1 => Self::PassportV1(PassportV1PubSignals::from_json(data)?),
        })
    }

    pub fn to_map(&self) -> Map<String, Value> {
        match self {
            PublicSignals::AnonAadhaarV1(s) => s.to_map(),
            PublicSignals::AnonAadhaarV1Legacy(s) => s.to_map(),
            PublicSignals::PassportV1(s) => s.to_map(),
        }
    }
}
