//! Passport DG1 (ICAO TD3 machine readable zone) decoder.

use crate::constants::{DG1_TAG_SIZE, TD3_LINE_LEN, TD3_MRZ_LEN};
use crate::error::{CircuitInputError, Result};
use crate::types::Sex;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Fields of a TD3 passport MRZ, sliced at their fixed offsets.
///
/// Dates stay in the 6-digit `YYMMDD` form printed on the document; the
/// century is resolved later against a reference date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passport {
    /// "P" for passports
    pub document_type: String,
    pub issuing_country: String,
    pub surname: String,
    pub given_names: String,
    pub document_number: String,
    pub check_digit_number: String,
    pub nationality: String,
    pub date_of_birth: String,
    pub check_digit_dob: String,
    pub sex: Sex,
    pub date_of_expiry: String,
    pub check_digit_expiry: String,
    pub personal_number: String,
    pub check_digit_personal: String,
    pub check_digit_final: String,

    /// DG1 bytes including the group tag
    #[serde(skip)]
    pub raw: Vec<u8>,
}

/// Decode a hex encoded DG1 data group.
pub fn parse_dg1(data: &str) -> Result<Passport> {
    let raw = hex::decode(data.trim())
        .map_err(|e| CircuitInputError::Decode(format!("DG1 is not a hex string: {e}")))?;

    if raw.len() < DG1_TAG_SIZE {
        return Err(CircuitInputError::Format(format!(
            "DG1 is {} bytes, shorter than its {DG1_TAG_SIZE}-byte tag",
            raw.len()
        )));
    }

    let mrz = &raw[DG1_TAG_SIZE..];
    if mrz.len() != TD3_MRZ_LEN {
        return Err(CircuitInputError::Format(format!(
            "TD3 MRZ must be {TD3_MRZ_LEN} characters, got {}",
            mrz.len()
        )));
    }
    if !mrz.is_ascii() {
        return Err(CircuitInputError::Format("TD3 MRZ contains non-ASCII bytes".to_string()));
    }

    let mut passport = parse_mrz(std::str::from_utf8(mrz).map_err(|e| {
        CircuitInputError::Format(format!("TD3 MRZ is not text: {e}"))
    })?)?;
    passport.raw = raw;

    debug!(
        issuing_country = %passport.issuing_country,
        nationality = %passport.nationality,
        "decoded passport DG1"
    );

    Ok(passport)
}

/// Slice an 88 character TD3 MRZ. `raw` is left empty.
pub fn parse_mrz(mrz: &str) -> Result<Passport> {
    if mrz.len() != TD3_MRZ_LEN || !mrz.is_ascii() {
        return Err(CircuitInputError::Format(format!(
            "TD3 MRZ must be {TD3_MRZ_LEN} ASCII characters, got {}",
            mrz.len()
        )));
    }

    let (line1, line2) = mrz.split_at(TD3_LINE_LEN);
    if !line1.starts_with('P') {
        return Err(CircuitInputError::Format(
            "TD3 line 1 must start with document type 'P'".to_string(),
        ));
    }

    let (surname, given_names) = split_names(&line1[5..44]);

    Ok(Passport {
        document_type: line1[..1].to_string(),
        issuing_country: line1[2..5].to_string(),
        surname,
        given_names,
        document_number: line2[..9].to_string(),
        check_digit_number: line2[9..10].to_string(),
        nationality: line2[10..13].to_string(),
        date_of_birth: line2[13..19].to_string(),
        check_digit_dob: line2[19..20].to_string(),
        sex: Sex::from_mrz(&line2[20..21]),
        date_of_expiry: line2[21..27].to_string(),
        check_digit_expiry: line2[27..28].to_string(),
        personal_number: line2[28..42].trim().to_string(),
        check_digit_personal: line2[42..43].to_string(),
        check_digit_final: line2[43..44].to_string(),
        raw: Vec::new(),
    })
}

/// `SURNAME<<GIVEN<NAMES<<<<` into ("SURNAME", "GIVEN NAMES").
fn split_names(field: &str) -> (String, String) {
    let clean = |s: &str| s.replace('<', " ").trim().to_string();

    let mut parts = field.split("<<");
    let surname = parts.next().map(clean).unwrap_or_default();
    let given_names = parts.next().map(clean).unwrap_or_default();
    (surname, given_names)
}

#[cfg(test)]
pub(crate) mod fixtures {
    pub(crate) const MRZ: &str = "P<UKRKUZNETSOV<<VALERIY<<<<<<<<<<<<<<<<<<<<<AC12345674UKR9603091M3508035<<<<<<<<<<<<<<02";
    pub(crate) const TAG: [u8; 5] = [97, 91, 95, 31, 88];

    pub(crate) fn dg1_hex(mrz: &str) -> String {
        let mut raw = TAG.to_vec();
        raw.extend_from_slice(mrz.as_bytes());
        hex::encode(raw)
    }
}
