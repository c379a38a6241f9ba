//! Field-value hashing.
//!
//! Every string attribute that goes into the template tree, and every tree
//! node, is hashed through one [`FieldHasher`]. The default is the native
//! Poseidon sponge over BN254::Fr; circuits built on a different Poseidon
//! instance plug in their own implementation.

use crate::constants::poseidon_config;
use ark_bn254::Fr;
use ark_crypto_primitives::sponge::poseidon::PoseidonSponge;
use ark_crypto_primitives::sponge::CryptographicSponge;
use ark_ff::PrimeField;
use std::fmt;

/// Bytes per absorbed chunk. 31 bytes always fit below the BN254 modulus.
const BYTES_PER_ELEMENT: usize = 31;

pub trait FieldHasher: fmt::Debug + Send + Sync {
    /// Hash a sequence of field elements into one element. Tree nodes are
    /// hashed with this.
    fn hash_elements(&self, elements: &[Fr]) -> Fr;

    /// Hash an arbitrary byte string into one field element.
    ///
    /// The byte length is absorbed first so that inputs differing only in
    /// trailing zero bytes hash differently.
    fn hash_bytes(&self, bytes: &[u8]) -> Fr {
        let mut elements = Vec::with_capacity(1 + bytes.len().div_ceil(BYTES_PER_ELEMENT));
        elements.push(Fr::from(bytes.len() as u64));
        elements.extend(bytes.chunks(BYTES_PER_ELEMENT).map(Fr::from_le_bytes_mod_order));

        self.hash_elements(&elements)
    }

    fn hash_str(&self, value: &str) -> Fr {
        self.hash_bytes(value.as_bytes())
    }
}

/// Arkworks Poseidon sponge with the crate's [`poseidon_config`].
#[derive(Debug, Default, Clone, Copy)]
pub struct PoseidonHasher;

impl FieldHasher for PoseidonHasher {
    fn hash_elements(&self, elements: &[Fr]) -> Fr {
        let mut sponge = PoseidonSponge::<Fr>::new(poseidon_config());
        sponge.absorb(&elements);
        sponge.squeeze_field_elements::<Fr>(1)[0]
    }
}
