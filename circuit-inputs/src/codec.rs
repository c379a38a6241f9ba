//! Low-level encoders that reproduce the circuit's own input conventions.

use crate::constants::SHA256_BLOCK_BYTES;
use crate::error::{CircuitInputError, Result};
use ark_bn254::Fr;
use ark_ff::{BigInteger, PrimeField};
use chrono::{DateTime, Utc};
use num_bigint::BigUint;
use num_traits::{One, Zero};

/// Pad `message` the way SHA-256 does, then zero-fill to `max_bytes`.
///
/// Returns the padded buffer and the length of the SHA-256 padded message
/// (terminator and 8-byte length included), which the circuit needs to know
/// where hashing stops.
pub fn sha256_pad(message: &[u8], max_bytes: usize) -> Result<(Vec<u8>, usize)> {
    if max_bytes % SHA256_BLOCK_BYTES != 0 {
        return Err(CircuitInputError::EncodingCapacity(format!(
            "padding target {max_bytes} is not a multiple of {SHA256_BLOCK_BYTES} bytes"
        )));
    }

    let bit_len = (message.len() as u64) * 8;

    let mut padded = Vec::with_capacity(max_bytes.max(message.len() + SHA256_BLOCK_BYTES + 9));
    padded.extend_from_slice(message);
    padded.push(0x80);
    while (padded.len() * 8 + 64) % 512 != 0 {
        padded.push(0);
    }
    padded.extend_from_slice(&bit_len.to_be_bytes());

    if (padded.len() * 8) % 512 != 0 {
        return Err(CircuitInputError::EncodingCapacity(
            "padding did not align to a 512-bit block".to_string(),
        ));
    }

    let padded_len = padded.len();
    if padded_len > max_bytes {
        return Err(CircuitInputError::EncodingCapacity(format!(
            "message pads to {padded_len} bytes, exceeding target of {max_bytes}"
        )));
    }
    padded.resize(max_bytes, 0);

    Ok((padded, padded_len))
}

/// Split `n` into `word_count` little-endian words of `word_bits` bits.
pub fn split_to_words(n: &BigUint, word_bits: usize, word_count: usize) -> Result<Vec<BigUint>> {
    let mask = (BigUint::one() << word_bits) - BigUint::one();

    let mut rest = n.clone();
    let mut words = Vec::with_capacity(word_count);
    for _ in 0..word_count {
        words.push(&rest & &mask);
        rest >>= word_bits;
    }

    if !rest.is_zero() {
        return Err(CircuitInputError::EncodingCapacity(format!(
            "value of {} bits does not fit {word_count} words of {word_bits} bits",
            n.bits()
        )));
    }

    Ok(words)
}

/// Positions of the first `limit` occurrences of `delimiter` in `bytes`.
pub fn delimiter_indices(bytes: &[u8], delimiter: u8, limit: usize) -> Vec<usize> {
    bytes
        .iter()
        .enumerate()
        .filter(|(_, b)| **b == delimiter)
        .map(|(i, _)| i)
        .take(limit)
        .collect()
}

pub fn bytes_to_decimal_strings(bytes: &[u8]) -> Vec<String> {
    bytes.iter().map(|b| b.to_string()).collect()
}

pub fn bytes_to_ints(bytes: &[u8]) -> Vec<u32> {
    bytes.iter().map(|b| u32::from(*b)).collect()
}

pub fn words_to_decimal_strings(words: &[BigUint]) -> Vec<String> {
    words.iter().map(|w| w.to_str_radix(10)).collect()
}

pub fn fr_to_biguint(value: &Fr) -> BigUint {
    BigUint::from_bytes_le(&value.into_bigint().to_bytes_le())
}

/// Canonical decimal form of a field element, `"0"` for zero.
pub fn fr_to_decimal(value: &Fr) -> String {
    fr_to_biguint(value).to_str_radix(10)
}

/// Strict conversion: values at or above the field modulus are rejected
/// instead of being reduced.
pub fn fr_from_biguint(value: &BigUint) -> Result<Fr> {
    let modulus = BigUint::from_bytes_le(&Fr::MODULUS.to_bytes_le());
    if value >= &modulus {
        return Err(CircuitInputError::EncodingCapacity(format!(
            "{value} is not below the BN254 scalar field modulus"
        )));
    }
    Ok(Fr::from_le_bytes_mod_order(&value.to_bytes_le()))
}

pub fn fr_from_decimal(value: &str) -> Result<Fr> {
    let parsed = BigUint::parse_bytes(value.as_bytes(), 10).ok_or_else(|| {
        CircuitInputError::EncodingCapacity(format!("'{value}' is not a decimal integer"))
    })?;
    fr_from_biguint(&parsed)
}

/// Issuance and expiration attributes are committed as Unix nanoseconds.
pub fn unix_nanos(time: DateTime<Utc>) -> Fr {
    let nanos = i128::from(time.timestamp()) * 1_000_000_000;
    if nanos < 0 {
        -Fr::from(nanos.unsigned_abs())
    } else {
        Fr::from(nanos.unsigned_abs())
    }
}
