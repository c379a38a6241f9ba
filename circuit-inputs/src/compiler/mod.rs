//! Circuit input compilation.
//!
//! A compilation decodes one document, commits its attributes into a fresh
//! template tree and assembles the exact input object the circuit expects.
//! Any failure aborts the whole compilation.

pub mod aadhaar;
pub mod passport;

pub use aadhaar::{compile_aadhaar, AnonAadhaarV1CircuitInputs, AnonAadhaarV1Inputs};
pub use passport::{compile_passport, PassportV1CircuitInputs, PassportV1Inputs};

use crate::error::Result;
use crate::hash::FieldHasher;
use crate::identity::IdentityResolver;
use crate::types::FieldDecimal;
use ark_bn254::Fr;
use serde::{Deserialize, Serialize};

/// Compiled inputs of any supported circuit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CircuitInputs {
    AnonAadhaar(AnonAadhaarV1CircuitInputs),
    Passport(PassportV1CircuitInputs),
}

impl CircuitInputs {
    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// Credential-level values shared by every schema.
#[derive(Debug, Clone)]
pub(crate) struct CredentialFields {
    pub status_id: Fr,
    pub subject_id: Fr,
    pub issuer: Fr,
    /// Numeric identity of the credential subject
    pub user_id: String,
}

impl CredentialFields {
    pub fn new(
        status_id: &str,
        subject_id: &str,
        issuer: &str,
        resolver: &dyn IdentityResolver,
        hasher: &dyn FieldHasher,
    ) -> Result<Self> {
        let user_id = resolver.user_id(subject_id)?;

        Ok(Self {
            status_id: hasher.hash_str(status_id),
            subject_id: hasher.hash_str(subject_id),
            issuer: hasher.hash_str(issuer),
            user_id: user_id.to_str_radix(10),
        })
    }
}

pub(crate) fn siblings_to_wire(siblings: Vec<Vec<Fr>>) -> Vec<Vec<FieldDecimal>> {
    siblings
        .into_iter()
        .map(|path| path.into_iter().map(FieldDecimal).collect())
        .collect()
}
