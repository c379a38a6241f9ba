//! Crate-wide constants shared by the decoders, codecs and compiler.
//!
//! Values in this file are part of the external circuit contract. Changing any
//! of them changes the circuit inputs bit-for-bit.

use ark_bn254::Fr;
use ark_crypto_primitives::sponge::poseidon::{find_poseidon_ark_and_mds, PoseidonConfig};
use ark_ff::PrimeField;
use std::sync::OnceLock;

/// Field separator inside a decompressed Aadhaar QR body.
pub const QR_DELIMITER: u8 = 0xFF;

/// Number of positional fields before the photo segments.
pub const QR_FIELD_COUNT: usize = 18;

/// RSA-2048 signature appended to every QR body.
pub const QR_SIGNATURE_LEN: usize = 256;

/// Signed timestamps are issued in IST (+05:30).
pub const IST_OFFSET_SECONDS: i64 = 19_800;

/// Maximum SHA-256 input the Aadhaar circuit accepts (3 x 512 bytes).
pub const QR_MAX_PADDED_BYTES: usize = 512 * 3;

/// Validity window the Aadhaar circuit adds to the signed time.
pub const HALF_YEAR_SECONDS: i64 = 15_776_640;

/// Credential validity cap for passports, equal to the circuit's year.
pub const CIRCUIT_YEAR_SECONDS: i64 = 31_536_000;

/// RSA words: 17 limbs of 121 bits.
pub const RSA_WORD_BITS: usize = 121;
pub const RSA_WORD_COUNT: usize = 17;

/// Bytes preceding the MRZ text inside DG1.
pub const DG1_TAG_SIZE: usize = 5;

/// Two TD3 lines of 44 characters.
pub const TD3_MRZ_LEN: usize = 88;
pub const TD3_LINE_LEN: usize = 44;

/// Issuing country attribute for Aadhaar credentials (ISO 3166 alpha-3).
pub const AADHAAR_ISSUING_COUNTRY: &str = "IND";

/// `governmentIdentifierType` value for Aadhaar reference ids.
pub const AADHAAR_IDENTIFIER_TYPE: &str = "other";

/// SHA-256 block size in bytes.
pub const SHA256_BLOCK_BYTES: usize = 64;

// Poseidon sponge configuration.
//
// Width-3 sponge (rate=2, capacity=1). Node hashing absorbs pairs and triples
// of field elements; string hashing absorbs 31-byte chunks.
pub const POSEIDON_RATE: usize = 2;
pub const POSEIDON_CAPACITY: usize = 1;

pub const POSEIDON_FULL_ROUNDS: usize = 8;
pub const POSEIDON_PARTIAL_ROUNDS: usize = 57;

/// Poseidon S-box exponent (alpha).
pub const POSEIDON_ALPHA: u64 = 5;

/// Deterministically derive Poseidon parameters for BN254::Fr.
///
/// Deriving the round constants is far more expensive than hashing, so the
/// result is computed once per process and shared read-only.
pub fn poseidon_config() -> &'static PoseidonConfig<Fr> {
    static CONFIG: OnceLock<PoseidonConfig<Fr>> = OnceLock::new();

    CONFIG.get_or_init(|| {
        let prime_bits = Fr::MODULUS_BIT_SIZE as u64;

        let (ark, mds) = find_poseidon_ark_and_mds::<Fr>(
            prime_bits,
            POSEIDON_RATE,
            POSEIDON_FULL_ROUNDS as u64,
            POSEIDON_PARTIAL_ROUNDS as u64,
            0,
        );

        PoseidonConfig::new(
            POSEIDON_FULL_ROUNDS,
            POSEIDON_PARTIAL_ROUNDS,
            POSEIDON_ALPHA,
            mds,
            ark,
            POSEIDON_RATE,
            POSEIDON_CAPACITY,
        )
    })
}
