//! Aadhaar secure QR decoder.
//!
//! The QR payload is a big integer whose big-endian bytes are a zlib (or gzip)
//! stream. The decompressed body is a 0xFF separated record followed by a
//! detached RSA-2048 signature over everything before it.

use crate::constants::{QR_DELIMITER, QR_FIELD_COUNT, QR_SIGNATURE_LEN};
use crate::dates::{parse_aadhaar_dob, parse_signed_time};
use crate::error::{CircuitInputError, Result};
use crate::types::Gender;
use base64::Engine;
use base64::engine::general_purpose::STANDARD_NO_PAD;
use chrono::{DateTime, NaiveDate, Utc};
use flate2::read::{GzDecoder, ZlibDecoder};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::io::Read;
use tracing::debug;

/// Decoded Aadhaar QR record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AadhaarQr {
    /// QR format version marker (e.g. "V2")
    pub version: String,

    /// Email/mobile presence indicator
    pub contact_indicator: String,

    /// Reference ID (last 4 digits of Aadhaar + signing timestamp)
    pub reference_id: String,

    /// Last 4 digits of the Aadhaar number
    pub last_digits: String,

    /// Signing time, converted from IST to UTC
    pub signed_time: DateTime<Utc>,

    pub name: String,

    pub date_of_birth: NaiveDate,

    pub gender: Gender,

    pub address: Address,

    /// Last 4 digits of the registered mobile number
    pub mobile_last_digits: String,

    /// Photo segments, base64 without padding
    pub photo: String,

    /// Signed bytes (everything before the signature)
    #[serde(skip)]
    pub signed_data: Vec<u8>,

    /// RSA signature, 256 bytes
    #[serde(skip)]
    pub signature: Vec<u8>,
}

/// Address block of the QR record, in QR field order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub care_of: String,
    pub district: String,
    pub landmark: String,
    pub house: String,
    pub location: String,
    pub pin_code: String,
    pub post_office: String,
    pub state: String,
    pub street: String,
    pub sub_district: String,
    pub vtc: String,
}

impl Address {
    fn parts(&self) -> [&str; 11] {
        [
            &self.care_of,
            &self.district,
            &self.landmark,
            &self.house,
            &self.location,
            &self.pin_code,
            &self.post_office,
            &self.state,
            &self.street,
            &self.sub_district,
            &self.vtc,
        ]
    }

    /// Single-line address committed as the `addressLine1` attribute.
    pub fn line(&self) -> String {
        self.parts().join(" ")
    }
}

/// Decompress a QR payload, accepting zlib and falling back to gzip.
pub fn decompress(compressed: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    match ZlibDecoder::new(compressed).read_to_end(&mut out) {
        Ok(_) => return Ok(out),
        Err(zlib_err) => {
            debug!(error = %zlib_err, "zlib decode failed, retrying as gzip");
        }
    }

    out.clear();
    GzDecoder::new(compressed)
        .read_to_end(&mut out)
        .map_err(|e| CircuitInputError::Decode(format!("payload is neither zlib nor gzip: {e}")))?;
    Ok(out)
}

/// Decode the big-integer QR payload into a validated record.
pub fn decode_qr(payload: &BigUint) -> Result<AadhaarQr> {
    let body = decompress(&payload.to_bytes_be())?;
    decode_body(&body)
}

/// Decode an already decompressed QR body.
pub fn decode_body(body: &[u8]) -> Result<AadhaarQr> {
    if body.len() < QR_SIGNATURE_LEN {
        return Err(CircuitInputError::validation(format!(
            "signature must be {QR_SIGNATURE_LEN} bytes, body has only {}",
            body.len()
        )));
    }
    let (signed_data, signature) = body.split_at(body.len() - QR_SIGNATURE_LEN);

    let segments: Vec<&[u8]> = signed_data.split(|b| *b == QR_DELIMITER).collect();
    if segments.len() < QR_FIELD_COUNT {
        return Err(CircuitInputError::validation(format!(
            "expected at least {QR_FIELD_COUNT} fields, found {}",
            segments.len()
        )));
    }

    let fields = segments[..QR_FIELD_COUNT]
        .iter()
        .enumerate()
        .map(|(i, raw)| {
            String::from_utf8(raw.to_vec())
                .map_err(|e| CircuitInputError::Decode(format!("field {i} is not valid UTF-8: {e}")))
        })
        .collect::<Result<Vec<String>>>()?;
    let field = |i: usize| fields[i].clone();

    let reference_id = field(2);
    if reference_id.len() < 14 || !reference_id.is_char_boundary(4) || !reference_id.is_char_boundary(14) {
        return Err(CircuitInputError::validation(format!(
            "reference id '{reference_id}' is shorter than 14 characters"
        )));
    }
    let last_digits = reference_id[..4].to_string();
    let signed_time = parse_signed_time(&reference_id[4..14])?;
    if signed_time.timestamp() == 0 {
        return Err(CircuitInputError::validation("signed time is zero"));
    }

    let date_of_birth = parse_aadhaar_dob(&field(4))?;
    let gender = Gender::from_code(&field(5))?;

    let address = Address {
        care_of: field(6),
        district: field(7),
        landmark: field(8),
        house: field(9),
        location: field(10),
        pin_code: field(11),
        post_office: field(12),
        state: field(13),
        street: field(14),
        sub_district: field(15),
        vtc: field(16),
    };
    if address.pin_code.is_empty() {
        return Err(CircuitInputError::validation("pin code is empty"));
    }
    if address.state.is_empty() {
        return Err(CircuitInputError::validation("state is empty"));
    }

    let photo = segments[QR_FIELD_COUNT..].join(&QR_DELIMITER);

    let qr = AadhaarQr {
        version: field(0),
        contact_indicator: field(1),
        reference_id: reference_id.clone(),
        last_digits,
        signed_time,
        name: field(3),
        date_of_birth,
        gender,
        address,
        mobile_last_digits: field(17),
        photo: STANDARD_NO_PAD.encode(photo),
        signed_data: signed_data.to_vec(),
        signature: signature.to_vec(),
    };

    debug!(
        version = %qr.version,
        signed_time = %qr.signed_time,
        body_len = signed_data.len(),
        "decoded aadhaar qr"
    );

    Ok(qr)
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_decode_fields() {
        let photo = [0x10, QR_DELIMITER, 0x20, 0x30];
        let body = body_with(&FIELDS, &photo);
        let payload = BigUint::from_bytes_be(&zlib(&body));

        let qr = decode_qr(&payload).unwrap();
        assert_eq!(qr.version, "V2");
        assert_eq!(qr.last_digits, "2697");
        assert_eq!(qr.signed_time, Utc.with_ymd_and_hms(2019, 3, 2, 4, 30, 0).unwrap());
        assert_eq!(qr.name, "Sumit Kumar");
        assert_eq!(qr.date_of_birth, NaiveDate::from_ymd_opt(1984, 1, 1).unwrap());
        assert_eq!(qr.gender, Gender::Male);
        assert_eq!(qr.address.pin_code, "110051");
        assert_eq!(qr.address.state, "Delhi");
        assert_eq!(qr.mobile_last_digits, "1234");
        assert_eq!(qr.signature.len(), QR_SIGNATURE_LEN);
        assert_eq!(qr.signed_data.len(), body.len() - QR_SIGNATURE_LEN);
        assert_eq!(STANDARD_NO_PAD.decode(&qr.photo).unwrap(), photo);
    }

    #[test]
    fn test_zlib_and_gzip_agree() {
        let body = body_with(&FIELDS, b"photo");
        let from_zlib = decode_qr(&BigUint::from_bytes_be(&zlib(&body))).unwrap();
        let from_gzip = decode_qr(&BigUint::from_bytes_be(&gzip(&body))).unwrap();
        assert_eq!(from_zlib, from_gzip);
    }

    #[test]
    fn test_not_compressed() {
        let err = decode_qr(&BigUint::from_bytes_be(b"plainly not compressed")).unwrap_err();
        assert!(matches!(err, CircuitInputError::Decode(_)));
    }

    #[test]
    fn test_address_line() {
        let qr = decode_body(&body_with(&FIELDS, b"")).unwrap();
        assert_eq!(
            qr.address.line(),
            "C/O Ishwar Chand East Delhi  B-31, 3rd Floor  110051 Krishna Nagar Delhi Gali No 6 Krishna Nagar Delhi"
        );
    }

    fn rejected(index: usize, value: &str) -> CircuitInputError {
        let mut fields: [&str; 18] = FIELDS;
        fields[index] = value;
        decode_body(&body_with(&fields, b"")).unwrap_err()
    }

    #[test]
    fn test_validation_rules() {
        assert!(rejected(5, "X").to_string().contains("gender"));
        assert!(rejected(11, "").to_string().contains("pin code"));
        assert!(rejected(13, "").to_string().contains("state"));
        assert!(rejected(2, "2697").to_string().contains("reference id"));
        assert!(matches!(rejected(4, "1984/01/01"), CircuitInputError::Validation { .. }));
    }

    #[test]
    fn test_too_few_fields() {
        let body = body_with(&FIELDS[..10], b"");
        // The trailing photo delimiter adds one segment: 11 in total.
        let err = decode_body(&body).unwrap_err();
        assert!(err.to_string().contains("at least 18 fields"));
    }

    #[test]
    fn test_non_utf8_field() {
        let mut body = Vec::new();
        for (i, f) in FIELDS.iter().enumerate() {
            let raw: &[u8] = if i == 3 { b"Sumit \xC3\x28" } else { f.as_bytes() };
            body.extend_from_slice(raw);
            body.push(QR_DELIMITER);
        }
        // photo bytes are binary and may be anything
        body.extend_from_slice(&[0xC3, 0x28, 0x80]);
        body.extend(std::iter::repeat_n(0xA5, QR_SIGNATURE_LEN));

        let err = decode_body(&body).unwrap_err();
        assert!(matches!(err, CircuitInputError::Decode(_)));
        assert!(err.to_string().contains("field 3"));

        let photo_only = body_with(&FIELDS, &[0xC3, 0x28, 0x80]);
        assert!(decode_body(&photo_only).is_ok());
    }

    #[test]
    fn test_short_body() {
        let err = decode_body(&[1, 2, 3]).unwrap_err();
        assert!(err.to_string().contains("signature"));
    }
}
