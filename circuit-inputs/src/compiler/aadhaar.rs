//! Aadhaar QR compilation for the AnonAadhaar circuits.

use super::{siblings_to_wire, CredentialFields};
use crate::codec::{
    bytes_to_decimal_strings, delimiter_indices, sha256_pad, split_to_words, unix_nanos,
    words_to_decimal_strings,
};
use crate::constants::{
    AADHAAR_IDENTIFIER_TYPE, AADHAAR_ISSUING_COUNTRY, HALF_YEAR_SECONDS, QR_DELIMITER,
    QR_FIELD_COUNT, QR_MAX_PADDED_BYTES, RSA_WORD_BITS, RSA_WORD_COUNT,
};
use crate::dates::{date_to_int, from_unix_seconds};
use crate::error::{CircuitInputError, Result};
use crate::hash::FieldHasher;
use crate::identity::IdentityResolver;
use crate::keys::modulus_from_pem;
use crate::qr::{decode_qr, AadhaarQr};
use crate::schema::{Attribute, SchemaVersion};
use crate::template::TemplateTree;
use crate::types::FieldDecimal;
use ark_bn254::Fr;
use chrono::Duration;
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Compilation request for an Aadhaar QR credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnonAadhaarV1Inputs {
    /// QR payload as a decimal integer (string or number)
    #[serde(rename = "qrData", with = "biguint_decimal")]
    pub qr_data: BigUint,

    /// credentialSubject.id
    #[serde(rename = "credentialSubjectID")]
    pub credential_subject_id: String,

    /// credentialStatus.revocationNonce
    #[serde(rename = "credentialStatusRevocationNonce")]
    pub credential_status_revocation_nonce: u64,

    /// credentialStatus.id
    #[serde(rename = "credentialStatusID")]
    pub credential_status_id: String,

    #[serde(rename = "issuerID")]
    pub issuer_id: String,

    /// UIDAI RSA public key, PEM
    #[serde(rename = "pubKey")]
    pub pub_key: String,

    #[serde(rename = "nullifierSeed")]
    pub nullifier_seed: i64,

    #[serde(rename = "signalHash")]
    pub signal_hash: i64,

    /// Client clock, unix seconds
    #[serde(rename = "timeNow", default)]
    pub time_now: i64,
}

/// Inputs of the AnonAadhaar circuits. Field names are the circuit's signal
/// names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnonAadhaarV1CircuitInputs {
    #[serde(rename = "qrDataPadded")]
    pub qr_data_padded: Vec<String>,
    #[serde(rename = "qrDataPaddedLength")]
    pub qr_data_padded_length: usize,
    #[serde(rename = "delimiterIndices")]
    pub delimiter_indices: Vec<usize>,
    pub signature: Vec<String>,
    #[serde(rename = "pubKey")]
    pub pub_key: Vec<String>,
    #[serde(rename = "nullifierSeed")]
    pub nullifier_seed: i64,
    #[serde(rename = "signalHash")]
    pub signal_hash: i64,
    #[serde(rename = "revocationNonce")]
    pub revocation_nonce: u64,
    #[serde(rename = "credentialStatusID")]
    pub credential_status_id: FieldDecimal,
    #[serde(rename = "credentialSubjectID")]
    pub credential_subject_id: FieldDecimal,
    #[serde(rename = "userID")]
    pub user_id: String,
    /// Seconds the circuit adds to the signed time
    #[serde(rename = "expirationTime")]
    pub expiration_time: i64,
    pub issuer: FieldDecimal,
    #[serde(rename = "templateRoot")]
    pub template_root: FieldDecimal,
    pub siblings: Vec<Vec<FieldDecimal>>,
}

/// Compile an Aadhaar QR request under `schema` (either AnonAadhaar version).
pub fn compile_aadhaar(
    schema: SchemaVersion,
    request: &AnonAadhaarV1Inputs,
    resolver: &dyn IdentityResolver,
    hasher: Arc<dyn FieldHasher>,
) -> Result<AnonAadhaarV1CircuitInputs> {
    let legacy = match schema {
        SchemaVersion::AnonAadhaarV1 => false,
        SchemaVersion::AnonAadhaarV1Legacy => true,
        other => {
            return Err(CircuitInputError::TreeInvariant(format!(
                "{other} has no Aadhaar QR layout"
            )));
        }
    };

    let mut tree = TemplateTree::with_hasher(schema, hasher.clone())?;
    let template_root = tree.template_root();

    let qr = decode_qr(&request.qr_data)?;

    let modulus = modulus_from_pem(&request.pub_key)?;
    let pub_key = split_to_words(&modulus, RSA_WORD_BITS, RSA_WORD_COUNT)?;

    let credential = CredentialFields::new(
        &request.credential_status_id,
        &request.credential_subject_id,
        &request.issuer_id,
        resolver,
        hasher.as_ref(),
    )?;

    let values = if legacy {
        legacy_values(&qr, request, &credential, hasher.as_ref())?
    } else {
        current_values(&qr, request, &credential, hasher.as_ref())?
    };
    let siblings = tree.update_attributes(schema, &values)?;

    let (padded, padded_len) = sha256_pad(&qr.signed_data, QR_MAX_PADDED_BYTES)?;
    let delimiters = delimiter_indices(&qr.signed_data, QR_DELIMITER, QR_FIELD_COUNT);
    let signature = split_to_words(
        &BigUint::from_bytes_be(&qr.signature),
        RSA_WORD_BITS,
        RSA_WORD_COUNT,
    )?;

    info!(
        schema = %schema,
        signed_time = %qr.signed_time,
        padded_len,
        "compiled aadhaar circuit inputs"
    );

    Ok(AnonAadhaarV1CircuitInputs {
        qr_data_padded: bytes_to_decimal_strings(&padded),
        qr_data_padded_length: padded_len,
        delimiter_indices: delimiters,
        signature: words_to_decimal_strings(&signature),
        pub_key: words_to_decimal_strings(&pub_key),
        nullifier_seed: request.nullifier_seed,
        signal_hash: request.signal_hash,
        revocation_nonce: request.credential_status_revocation_nonce,
        credential_status_id: FieldDecimal(credential.status_id),
        credential_subject_id: FieldDecimal(credential.subject_id),
        user_id: credential.user_id,
        expiration_time: HALF_YEAR_SECONDS,
        issuer: FieldDecimal(credential.issuer),
        template_root: FieldDecimal(template_root),
        siblings: siblings_to_wire(siblings),
    })
}

fn current_values(
    qr: &AadhaarQr,
    request: &AnonAadhaarV1Inputs,
    credential: &CredentialFields,
    hasher: &dyn FieldHasher,
) -> Result<Vec<(Attribute, Fr)>> {
    let expiration = qr.signed_time + Duration::seconds(HALF_YEAR_SECONDS);
    let now = from_unix_seconds(request.time_now)?;
    if expiration < now {
        return Err(CircuitInputError::ExpiredDocument {
            expiry: expiration.to_rfc3339(),
            reference: now.to_rfc3339(),
        });
    }

    Ok(vec![
        (Attribute::DateOfBirth, Fr::from(date_to_int(&qr.date_of_birth)?)),
        (Attribute::FullName, hasher.hash_str(&qr.name)),
        (Attribute::Gender, hasher.hash_str(qr.gender.as_str())),
        (Attribute::GovernmentIdentifier, hasher.hash_str(&qr.reference_id)),
        (Attribute::GovernmentIdentifierType, hasher.hash_str(AADHAAR_IDENTIFIER_TYPE)),
        (Attribute::RevocationNonce, Fr::from(request.credential_status_revocation_nonce)),
        (Attribute::AddressLine1, hasher.hash_str(&qr.address.line())),
        (Attribute::CredentialStatusId, credential.status_id),
        (Attribute::CredentialSubjectId, credential.subject_id),
        (Attribute::ExpirationDate, unix_nanos(expiration)),
        (Attribute::IssuanceDate, unix_nanos(qr.signed_time)),
        (Attribute::Issuer, credential.issuer),
        (Attribute::DocumentIssuer, hasher.hash_str(AADHAAR_ISSUING_COUNTRY)),
    ])
}

fn legacy_values(
    qr: &AadhaarQr,
    request: &AnonAadhaarV1Inputs,
    credential: &CredentialFields,
    hasher: &dyn FieldHasher,
) -> Result<Vec<(Attribute, Fr)>> {
    let pincode: u64 = qr.address.pin_code.parse().map_err(|_| {
        CircuitInputError::validation(format!("pin code '{}' is not numeric", qr.address.pin_code))
    })?;
    let expiration = qr.signed_time + Duration::seconds(HALF_YEAR_SECONDS);

    Ok(vec![
        (Attribute::DateOfBirth, Fr::from(date_to_int(&qr.date_of_birth)?)),
        (Attribute::Gender, hasher.hash_str(qr.gender.as_str())),
        (Attribute::Pincode, Fr::from(pincode)),
        (Attribute::State, hasher.hash_str(&qr.address.state)),
        (Attribute::RevocationNonce, Fr::from(request.credential_status_revocation_nonce)),
        (Attribute::CredentialStatusId, credential.status_id),
        (Attribute::CredentialSubjectId, credential.subject_id),
        (Attribute::ExpirationDate, unix_nanos(expiration)),
        (Attribute::IssuanceDate, unix_nanos(qr.signed_time)),
        (Attribute::Issuer, credential.issuer),
    ])
}

/// `qrData` arrives as a decimal string or as a bare JSON number. Numbers are
/// read through `serde_json::Number`, which keeps every digit.
mod biguint_decimal {
    use num_bigint::BigUint;
    use serde::de;
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    pub fn serialize<S: Serializer>(value: &BigUint, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_str_radix(10))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigUint, D::Error> {
        let digits = match Value::deserialize(deserializer)? {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            other => {
                return Err(de::Error::custom(format!(
                    "expected a decimal integer, got {other}"
                )));
            }
        };

        let trimmed = digits.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(de::Error::custom(format!("'{digits}' is not a non-negative decimal integer")));
        }
        BigUint::parse_bytes(trimmed.as_bytes(), 10)
            .ok_or_else(|| de::Error::custom(format!("'{digits}' is not a non-negative decimal integer")))
    }
}
