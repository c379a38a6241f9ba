use circuit_inputs::codec::fr_to_decimal;
use circuit_inputs::identity::Iden3Id;
use circuit_inputs::registry::{ANON_AADHAAR_V1, PASSPORT_V1};
use circuit_inputs::template::TemplateTree;
use ark_bn254::Fr;
use circuit_inputs::{
    CircuitInputError, CircuitInputs, CircuitRegistry, FieldHasher, Iden3Resolver, PoseidonHasher, SchemaVersion,
};
use flate2::write::{GzEncoder, ZlibEncoder};
use flate2::Compression;
use num_bigint::BigUint;
use serde_json::{json, Value};
use std::io::Write;
use std::sync::Arc;

const PEM: &str = include_str!("fixtures/pubkey.pem");

/// 2019-03-02 10:00 IST, taken from the reference id below.
const SIGNED_AT: i64 = 1_551_501_000;

const FIELDS: [&str; 18] = [
    "V2",
    "3",
    "269720190302102309",
    "Sumit Kumar",
    "01-01-1984",
    "M",
    "C/O Ishwar Chand",
    "East Delhi",
    "",
    "B-31, 3rd Floor",
    "",
    "110051",
    "Krishna Nagar",
    "Delhi",
    "Gali No 6",
    "Krishna Nagar",
    "Delhi",
    "1234",
];

const MRZ: &str = "P<UKRKUZNETSOV<<VALERIY<<<<<<<<<<<<<<<<<<<<<AC12345674UKR9603091M3508035<<<<<<<<<<<<<<02";

/// 2023-10-01 00:00 UTC
const PASSPORT_ISSUED_AT: i64 = 1_696_118_400;

fn qr_body(fields: &[&str]) -> Vec<u8> {
    let mut body = Vec::new();
    for field in fields {
        body.extend_from_slice(field.as_bytes());
        body.push(0xFF);
    }
    body.extend_from_slice(&[0x10, 0x20, 0x30]);
    body.extend(std::iter::repeat_n(0x5A, 256));
    body
}

fn qr_payload(fields: &[&str], gzip: bool) -> String {
    let body = qr_body(fields);
    let compressed = if gzip {
        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(&body).unwrap();
        enc.finish().unwrap()
    } else {
        let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
        enc.write_all(&body).unwrap();
        enc.finish().unwrap()
    };
    BigUint::from_bytes_be(&compressed).to_str_radix(10)
}

fn subject() -> (String, Iden3Id) {
    let id = Iden3Id::from_parts([0x0d, 0x01], [7; 27]);
    (format!("did:iden3:polygon:amoy:{}", id.to_base58()), id)
}

fn aadhaar_request(qr_data: String, time_now: i64) -> Vec<u8> {
    let (did, _) = subject();
    serde_json::to_vec(&json!({
        "qrData": qr_data,
        "credentialSubjectID": did,
        "credentialStatusRevocationNonce": 7,
        "credentialStatusID": "https://issuer.example/v1/credentials/status",
        "issuerID": "did:iden3:polygon:amoy:issuer",
        "pubKey": PEM,
        "nullifierSeed": 12345678,
        "signalHash": 1,
        "timeNow": time_now,
    }))
    .unwrap()
}

fn passport_request(mrz: &str, issuance_date: i64) -> Vec<u8> {
    let (did, _) = subject();
    let mut dg1 = vec![97u8, 91, 95, 31, 88];
    dg1.extend_from_slice(mrz.as_bytes());
    serde_json::to_vec(&json!({
        "passportData": hex::encode(dg1),
        "credentialSubjectID": did,
        "credentialStatusRevocationNonce": 3,
        "credentialStatusID": "https://issuer.example/v1/credentials/status",
        "issuanceDate": issuance_date,
        "linkNonce": "42",
        "issuerID": "did:iden3:polygon:amoy:issuer",
    }))
    .unwrap()
}

fn compile_value(registry: &CircuitRegistry, id: &str, request: &[u8]) -> Value {
    serde_json::from_slice(&registry.compile_json(id, request).unwrap()).unwrap()
}

fn assert_siblings(inputs: &Value, schema: SchemaVersion) {
    let siblings = inputs["siblings"].as_array().unwrap();
    assert_eq!(siblings.len(), schema.mutable_table().len());
    for path in siblings {
        assert_eq!(path.as_array().unwrap().len(), schema.depth());
    }
}

#[test]
fn compiles_current_aadhaar_inputs() {
    let registry = CircuitRegistry::with_defaults();
    let request = aadhaar_request(qr_payload(&FIELDS, false), SIGNED_AT + 86_400);
    let inputs = compile_value(&registry, ANON_AADHAAR_V1, &request);

    assert_eq!(inputs["qrDataPadded"].as_array().unwrap().len(), 1536);
    let padded_len = inputs["qrDataPaddedLength"].as_u64().unwrap();
    assert_eq!(padded_len % 64, 0);
    assert_eq!(inputs["delimiterIndices"].as_array().unwrap().len(), 18);
    assert_eq!(inputs["delimiterIndices"][0], json!(2));
    assert_eq!(inputs["signature"].as_array().unwrap().len(), 17);
    assert_eq!(inputs["pubKey"].as_array().unwrap().len(), 17);
    assert_eq!(inputs["nullifierSeed"], json!(12345678));
    assert_eq!(inputs["revocationNonce"], json!(7));
    assert_eq!(inputs["expirationTime"], json!(15_776_640));

    let (_, id) = subject();
    assert_eq!(inputs["userID"], json!(id.to_biguint().to_str_radix(10)));

    let template = TemplateTree::new(SchemaVersion::AnonAadhaarV1).unwrap();
    assert_eq!(inputs["templateRoot"], json!(fr_to_decimal(&template.template_root())));
    assert_siblings(&inputs, SchemaVersion::AnonAadhaarV1);
}

#[test]
fn accepts_qr_data_as_bare_json_number() {
    let registry = CircuitRegistry::with_defaults();
    let digits = qr_payload(&FIELDS, false);
    assert!(digits.len() > 400);

    let quoted = aadhaar_request(digits.clone(), SIGNED_AT);
    let text = String::from_utf8(quoted.clone()).unwrap();
    let bare = text.replacen(&format!("\"{digits}\""), &digits, 1);
    assert_ne!(bare, text);

    assert_eq!(
        registry.compile_json(ANON_AADHAAR_V1, bare.as_bytes()).unwrap(),
        registry.compile_json(ANON_AADHAAR_V1, &quoted).unwrap()
    );
}

/// Adds its inputs. Only useful to show that the registry's hasher is used.
#[derive(Debug)]
struct SumHasher;

impl FieldHasher for SumHasher {
    fn hash_elements(&self, elements: &[Fr]) -> Fr {
        elements.iter().sum()
    }
}

#[test]
fn registry_uses_injected_hasher() {
    let mut registry = CircuitRegistry::new(Box::new(Iden3Resolver), Arc::new(SumHasher));
    registry.register(PASSPORT_V1, SchemaVersion::PassportV1);
    let request = passport_request(MRZ, PASSPORT_ISSUED_AT);

    let summed = compile_value(&registry, PASSPORT_V1, &request);
    let poseidon = compile_value(&CircuitRegistry::with_defaults(), PASSPORT_V1, &request);
    assert_ne!(summed["templateRoot"], poseidon["templateRoot"]);
    assert_ne!(summed["credentialStatusID"], poseidon["credentialStatusID"]);

    let template = TemplateTree::with_hasher(SchemaVersion::PassportV1, Arc::new(SumHasher)).unwrap();
    assert_eq!(summed["templateRoot"], json!(fr_to_decimal(&template.template_root())));
    assert_eq!(
        summed["credentialStatusID"],
        json!(fr_to_decimal(&SumHasher.hash_str("https://issuer.example/v1/credentials/status")))
    );
}

#[test]
fn compilation_is_deterministic() {
    let registry = CircuitRegistry::with_defaults();
    let request = aadhaar_request(qr_payload(&FIELDS, false), SIGNED_AT);
    assert_eq!(
        registry.compile_json(ANON_AADHAAR_V1, &request).unwrap(),
        registry.compile_json(ANON_AADHAAR_V1, &request).unwrap()
    );

    let request = passport_request(MRZ, PASSPORT_ISSUED_AT);
    assert_eq!(
        registry.compile_json(PASSPORT_V1, &request).unwrap(),
        registry.compile_json(PASSPORT_V1, &request).unwrap()
    );
}

#[test]
fn gzip_and_zlib_payloads_agree() {
    let registry = CircuitRegistry::with_defaults();
    let zlib = registry
        .compile(ANON_AADHAAR_V1, &aadhaar_request(qr_payload(&FIELDS, false), SIGNED_AT))
        .unwrap();
    let gzip = registry
        .compile(ANON_AADHAAR_V1, &aadhaar_request(qr_payload(&FIELDS, true), SIGNED_AT))
        .unwrap();
    assert_eq!(zlib, gzip);
}

#[test]
fn changed_name_changes_only_its_path() {
    let registry = CircuitRegistry::with_defaults();
    let base = compile_value(&registry, ANON_AADHAAR_V1, &aadhaar_request(qr_payload(&FIELDS, false), SIGNED_AT));

    let mut fields = FIELDS;
    fields[3] = "Sumit Kumar Singh";
    let other = compile_value(&registry, ANON_AADHAAR_V1, &aadhaar_request(qr_payload(&fields, false), SIGNED_AT));

    assert_eq!(base["templateRoot"], other["templateRoot"]);
    // dateOfBirth is updated before fullName, so its path is unaffected
    assert_eq!(base["siblings"][0], other["siblings"][0]);
    assert_ne!(base["siblings"], other["siblings"]);
}

#[test]
fn rejects_expired_qr() {
    let registry = CircuitRegistry::with_defaults();
    let request = aadhaar_request(qr_payload(&FIELDS, false), SIGNED_AT + 15_776_640 + 1);
    let err = registry.compile(ANON_AADHAAR_V1, &request).unwrap_err();
    assert!(matches!(err, CircuitInputError::ExpiredDocument { .. }));
}

#[test]
fn rejects_invalid_qr_fields() {
    let registry = CircuitRegistry::with_defaults();

    let mut fields = FIELDS;
    fields[5] = "X";
    let err = registry
        .compile(ANON_AADHAAR_V1, &aadhaar_request(qr_payload(&fields, false), SIGNED_AT))
        .unwrap_err();
    assert!(matches!(err, CircuitInputError::Validation { .. }));

    let err = registry
        .compile(ANON_AADHAAR_V1, &aadhaar_request("123456789".to_string(), SIGNED_AT))
        .unwrap_err();
    assert!(matches!(err, CircuitInputError::Decode(_)));
}

#[test]
fn rejects_bad_subject_and_key() {
    let registry = CircuitRegistry::with_defaults();
    let mut request: Value = serde_json::from_slice(&aadhaar_request(qr_payload(&FIELDS, false), SIGNED_AT)).unwrap();

    let mut bad_did = request.clone();
    bad_did["credentialSubjectID"] = json!("urn:uuid:1234");
    let err = registry.compile(ANON_AADHAAR_V1, &serde_json::to_vec(&bad_did).unwrap()).unwrap_err();
    assert!(matches!(err, CircuitInputError::IdentifierFormat(_)));

    request["pubKey"] = json!("not a key");
    let err = registry.compile(ANON_AADHAAR_V1, &serde_json::to_vec(&request).unwrap()).unwrap_err();
    assert!(matches!(err, CircuitInputError::KeyFormat(_)));
}

#[test]
fn compiles_legacy_aadhaar_inputs() {
    let mut registry = CircuitRegistry::new(Box::new(Iden3Resolver), Arc::new(PoseidonHasher));
    registry.register(ANON_AADHAAR_V1, SchemaVersion::AnonAadhaarV1Legacy);

    // the legacy layout has no expiry check
    let request = aadhaar_request(qr_payload(&FIELDS, false), SIGNED_AT + 10 * 15_776_640);
    let inputs = compile_value(&registry, ANON_AADHAAR_V1, &request);
    assert_siblings(&inputs, SchemaVersion::AnonAadhaarV1Legacy);

    let current = compile_value(
        &CircuitRegistry::with_defaults(),
        ANON_AADHAAR_V1,
        &aadhaar_request(qr_payload(&FIELDS, false), SIGNED_AT),
    );
    assert_ne!(inputs["templateRoot"], current["templateRoot"]);

    let mut fields = FIELDS;
    fields[11] = "11005A";
    let err = registry
        .compile(ANON_AADHAAR_V1, &aadhaar_request(qr_payload(&fields, false), SIGNED_AT))
        .unwrap_err();
    assert!(matches!(err, CircuitInputError::Validation { .. }));
}

#[test]
fn compiles_passport_inputs() {
    let registry = CircuitRegistry::with_defaults();
    let inputs = registry.compile(PASSPORT_V1, &passport_request(MRZ, PASSPORT_ISSUED_AT)).unwrap();
    let CircuitInputs::Passport(passport) = &inputs else {
        panic!("expected passport inputs, got {inputs:?}");
    };

    assert_eq!(passport.dg1.len(), 93);
    assert_eq!(&passport.dg1[..5], &[97, 91, 95, 31, 88]);
    assert_eq!(passport.last_name_size, "KUZNETSOV".len());
    assert_eq!(passport.first_name_size, "VALERIY".len());
    assert_eq!(passport.current_date, "231001");
    assert_eq!(passport.issuance_date, PASSPORT_ISSUED_AT);
    assert_eq!(passport.revocation_nonce, 3);
    assert_eq!(passport.link_nonce, "42");

    let template = TemplateTree::new(SchemaVersion::PassportV1).unwrap();
    assert_eq!(passport.template_root.to_fr(), template.template_root());

    let value: Value = serde_json::from_slice(&inputs.to_json().unwrap()).unwrap();
    assert_eq!(value["currentDate"], json!("231001"));
    assert!(value["templateRoot"].is_string());
    assert_siblings(&value, SchemaVersion::PassportV1);
}

#[test]
fn rejects_expired_passport() {
    let registry = CircuitRegistry::with_defaults();
    // 2036-01-01, after the 2035-08-03 expiry
    let err = registry
        .compile(PASSPORT_V1, &passport_request(MRZ, 2_082_758_400))
        .unwrap_err();
    assert!(matches!(err, CircuitInputError::ExpiredDocument { .. }));
}

#[test]
fn rejects_issuance_date_before_year_zero() {
    let registry = CircuitRegistry::with_defaults();
    let err = registry
        .compile(PASSPORT_V1, &passport_request(MRZ, -70_000_000_000))
        .unwrap_err();
    assert!(matches!(err, CircuitInputError::Validation { .. }));
}

#[test]
fn rejects_malformed_dg1() {
    let registry = CircuitRegistry::with_defaults();
    let err = registry
        .compile(PASSPORT_V1, &passport_request(&MRZ[..80], PASSPORT_ISSUED_AT))
        .unwrap_err();
    assert!(matches!(err, CircuitInputError::Format(_)));
}

#[test]
fn parses_signals_for_registered_circuits() {
    let registry = CircuitRegistry::with_defaults();
    let signals = serde_json::to_vec(&["5", "6", "7", "231001", "1696118400", "8"]).unwrap();
    let map = registry.parse_signals_json(PASSPORT_V1, &signals).unwrap();
    assert_eq!(map["currentDate"], json!("231001"));

    let err = registry.parse_signals_json(ANON_AADHAAR_V1, &signals).unwrap_err();
    assert!(matches!(err, CircuitInputError::SignalCountMismatch { expected: 12, got: 6 }));
}
