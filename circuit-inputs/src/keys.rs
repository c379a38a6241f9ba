//! RSA public key glue.

use crate::error::{CircuitInputError, Result};
use num_bigint::BigUint;
use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::pkcs8::DecodePublicKey;
use rsa::traits::PublicKeyParts;
use rsa::RsaPublicKey;
use tracing::debug;

/// Parse a PEM public key (SPKI, falling back to PKCS#1) and return its
/// modulus.
pub fn modulus_from_pem(pem: &str) -> Result<BigUint> {
    let key = RsaPublicKey::from_public_key_pem(pem.trim())
        .or_else(|spki_err| {
            debug!(error = %spki_err, "not an SPKI key, trying PKCS#1");
            RsaPublicKey::from_pkcs1_pem(pem.trim())
        })
        .map_err(|e| CircuitInputError::KeyFormat(format!("failed to parse RSA public key: {e}")))?;

    debug!(bits = key.size() * 8, "loaded RSA public key");

    Ok(BigUint::from_bytes_be(&key.n().to_bytes_be()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PEM: &str = include_str!("../tests/fixtures/pubkey.pem");

    #[test]
    fn test_modulus_from_spki_pem() {
        let n = modulus_from_pem(PEM).unwrap();
        assert_eq!(n.bits(), 2048);

        let expected_prefix = BigUint::parse_bytes(b"B14A6001B6475038", 16).unwrap();
        assert_eq!(&n >> (2048 - 64), expected_prefix);
    }

    #[test]
    fn test_rejects_garbage() {
        let err = modulus_from_pem("-----BEGIN PUBLIC KEY-----\nAAAA\n-----END PUBLIC KEY-----").unwrap_err();
        assert!(matches!(err, CircuitInputError::KeyFormat(_)));
        assert!(modulus_from_pem("").is_err());
    }
}
