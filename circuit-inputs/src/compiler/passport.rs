//! Passport DG1 compilation.

use super::{siblings_to_wire, CredentialFields};
use crate::codec::{bytes_to_ints, unix_nanos};
use crate::dates::{
    credential_expiration, date_to_int, from_unix_seconds, resolve_birth_date, resolve_expiry_date,
    to_yymmdd,
};
use crate::error::{CircuitInputError, Result};
use crate::hash::FieldHasher;
use crate::identity::IdentityResolver;
use crate::passport::parse_dg1;
use crate::schema::{Attribute, SchemaVersion};
use crate::template::TemplateTree;
use crate::types::FieldDecimal;
use ark_bn254::Fr;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Compilation request for a passport credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassportV1Inputs {
    /// DG1 as hex: 5-byte tag followed by the TD3 MRZ
    #[serde(rename = "passportData")]
    pub passport_data: String,

    #[serde(rename = "credentialSubjectID")]
    pub credential_subject_id: String,

    #[serde(rename = "credentialStatusRevocationNonce")]
    pub credential_status_revocation_nonce: u64,

    #[serde(rename = "credentialStatusID")]
    pub credential_status_id: String,

    /// Unix seconds; the reference "now" for every date check
    #[serde(rename = "issuanceDate")]
    pub issuance_date: i64,

    #[serde(rename = "linkNonce")]
    pub link_nonce: String,

    #[serde(rename = "issuerID")]
    pub issuer_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassportV1CircuitInputs {
    pub dg1: Vec<u32>,
    #[serde(rename = "lastNameSize")]
    pub last_name_size: usize,
    #[serde(rename = "firstNameSize")]
    pub first_name_size: usize,
    /// YYMMDD
    #[serde(rename = "currentDate")]
    pub current_date: String,
    #[serde(rename = "revocationNonce")]
    pub revocation_nonce: u64,
    #[serde(rename = "credentialStatusID")]
    pub credential_status_id: FieldDecimal,
    #[serde(rename = "credentialSubjectID")]
    pub credential_subject_id: FieldDecimal,
    #[serde(rename = "userID")]
    pub user_id: String,
    pub issuer: FieldDecimal,
    /// Unix seconds
    #[serde(rename = "issuanceDate")]
    pub issuance_date: i64,
    #[serde(rename = "linkNonce")]
    pub link_nonce: String,
    #[serde(rename = "templateRoot")]
    pub template_root: FieldDecimal,
    pub siblings: Vec<Vec<FieldDecimal>>,
}

pub fn compile_passport(
    schema: SchemaVersion,
    request: &PassportV1Inputs,
    resolver: &dyn IdentityResolver,
    hasher: Arc<dyn FieldHasher>,
) -> Result<PassportV1CircuitInputs> {
    if schema != SchemaVersion::PassportV1 {
        return Err(CircuitInputError::TreeInvariant(format!("{schema} has no passport layout")));
    }

    let mut tree = TemplateTree::with_hasher(schema, hasher.clone())?;
    let template_root = tree.template_root();

    let passport = parse_dg1(&request.passport_data)?;

    let now = from_unix_seconds(request.issuance_date)?;
    let today = now.date_naive();
    let date_of_birth = resolve_birth_date(&passport.date_of_birth, &today)?;
    let date_of_expiry = resolve_expiry_date(&passport.date_of_expiry, &today)?;
    let expiration = credential_expiration(date_of_expiry, now);

    let credential = CredentialFields::new(
        &request.credential_status_id,
        &request.credential_subject_id,
        &request.issuer_id,
        resolver,
        hasher.as_ref(),
    )?;

    let values = vec![
        (Attribute::DateOfBirth, Fr::from(date_to_int(&date_of_birth)?)),
        (Attribute::DocumentExpirationDate, Fr::from(date_to_int(&date_of_expiry)?)),
        (Attribute::FirstName, hasher.hash_str(&passport.given_names)),
        (Attribute::FullName, hasher.hash_str(&passport.surname)),
        (Attribute::GovernmentIdentifier, hasher.hash_str(&passport.document_number)),
        (Attribute::GovernmentIdentifierType, hasher.hash_str(&passport.document_type)),
        (Attribute::Sex, hasher.hash_str(passport.sex.as_str())),
        (Attribute::RevocationNonce, Fr::from(request.credential_status_revocation_nonce)),
        (Attribute::CredentialStatusId, credential.status_id),
        (Attribute::CredentialSubjectId, credential.subject_id),
        (Attribute::ExpirationDate, unix_nanos(expiration)),
        (Attribute::IssuanceDate, unix_nanos(now)),
        (Attribute::Issuer, credential.issuer),
        (Attribute::DocumentNationality, hasher.hash_str(&passport.nationality)),
        (Attribute::DocumentIssuer, hasher.hash_str(&passport.issuing_country)),
    ];
    let siblings = tree.update_attributes(schema, &values)?;

    info!(
        schema = %schema,
        issuing_country = %passport.issuing_country,
        credential_expiration = %expiration,
        "compiled passport circuit inputs"
    );

    Ok(PassportV1CircuitInputs {
        dg1: bytes_to_ints(&passport.raw),
        last_name_size: passport.surname.len(),
        first_name_size: passport.given_names.len(),
        current_date: to_yymmdd(&today),
        revocation_nonce: request.credential_status_revocation_nonce,
        credential_status_id: FieldDecimal(credential.status_id),
        credential_subject_id: FieldDecimal(credential.subject_id),
        user_id: credential.user_id,
        issuer: FieldDecimal(credential.issuer),
        issuance_date: now.timestamp(),
        link_nonce: request.link_nonce.clone(),
        template_root: FieldDecimal(template_root),
        siblings: siblings_to_wire(siblings),
    })
}
