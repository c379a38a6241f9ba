//! DID to numeric identity conversion.

use crate::error::{CircuitInputError, Result};
use num_bigint::BigUint;

/// Converts a decentralized identifier into the integer the circuit binds a
/// proof to.
pub trait IdentityResolver: Send + Sync {
    fn user_id(&self, did: &str) -> Result<BigUint>;
}

const ID_LEN: usize = 31;
const TYPE_LEN: usize = 2;
const GENESIS_LEN: usize = 27;

/// iden3 identity: 2 type bytes, 27 genesis bytes, 2 checksum bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Iden3Id([u8; ID_LEN]);

impl Iden3Id {
    pub fn from_parts(typ: [u8; TYPE_LEN], genesis: [u8; GENESIS_LEN]) -> Self {
        let mut bytes = [0u8; ID_LEN];
        bytes[..TYPE_LEN].copy_from_slice(&typ);
        bytes[TYPE_LEN..TYPE_LEN + GENESIS_LEN].copy_from_slice(&genesis);
        let checksum = checksum(&bytes[..TYPE_LEN + GENESIS_LEN]);
        bytes[TYPE_LEN + GENESIS_LEN..].copy_from_slice(&checksum);
        Self(bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; ID_LEN] = bytes.try_into().map_err(|_| {
            CircuitInputError::IdentifierFormat(format!("id must be {ID_LEN} bytes, got {}", bytes.len()))
        })?;

        let expected = checksum(&bytes[..TYPE_LEN + GENESIS_LEN]);
        if bytes[TYPE_LEN + GENESIS_LEN..] != expected {
            return Err(CircuitInputError::IdentifierFormat("id checksum mismatch".to_string()));
        }
        Ok(Self(bytes))
    }

    pub fn from_base58(encoded: &str) -> Result<Self> {
        let bytes = bs58::decode(encoded)
            .into_vec()
            .map_err(|e| CircuitInputError::IdentifierFormat(format!("id is not base58: {e}")))?;
        Self::from_bytes(&bytes)
    }

    pub fn to_base58(&self) -> String {
        bs58::encode(self.0).into_string()
    }

    pub fn id_type(&self) -> [u8; TYPE_LEN] {
        [self.0[0], self.0[1]]
    }

    /// The id as a little-endian integer.
    pub fn to_biguint(&self) -> BigUint {
        BigUint::from_bytes_le(&self.0)
    }
}

/// Byte sum of type and genesis, big-endian.
fn checksum(payload: &[u8]) -> [u8; 2] {
    let sum = payload.iter().fold(0u16, |acc, b| acc.wrapping_add(u16::from(*b)));
    sum.to_be_bytes()
}

/// Resolves `did:<method>:<blockchain>:<network>:<id>` style identifiers by
/// decoding their trailing base58 id segment.
#[derive(Debug, Default, Clone, Copy)]
pub struct Iden3Resolver;

impl Iden3Resolver {
    pub fn parse(&self, did: &str) -> Result<Iden3Id> {
        let mut parts = did.split(':');
        if parts.next() != Some("did") {
            return Err(CircuitInputError::IdentifierFormat(format!("'{did}' is not a DID")));
        }

        let segments: Vec<&str> = parts.collect();
        let id = match segments.as_slice() {
            [method, .., id] if !method.is_empty() && !id.is_empty() => *id,
            _ => {
                return Err(CircuitInputError::IdentifierFormat(format!(
                    "'{did}' has no method-specific id"
                )));
            }
        };

        Iden3Id::from_base58(id)
    }
}

impl IdentityResolver for Iden3Resolver {
    fn user_id(&self, did: &str) -> Result<BigUint> {
        Ok(self.parse(did)?.to_biguint())
    }
}
