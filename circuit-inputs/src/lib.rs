//! Circuit input preparation for identity-document credentials.
//!
//! This crate contains:
//! - Decoders for the Aadhaar secure QR payload and the passport DG1 / TD3 MRZ.
//! - A sparse Merkle template tree that commits credential attributes as leaves.
//! - Compilers that turn one decoded document into the exact input object a circuit expects.
//! - Parsers that map a circuit's public signal array to named fields.

pub mod codec;
pub mod compiler;
pub mod constants;
pub mod dates;
pub mod error;
pub mod hash;
pub mod identity;
pub mod keys;
pub mod passport;
pub mod qr;
pub mod registry;
pub mod schema;
pub mod signals;
pub mod smt;
pub mod template;
pub mod types;

pub use compiler::{
    AnonAadhaarV1CircuitInputs, AnonAadhaarV1Inputs, CircuitInputs, PassportV1CircuitInputs,
    PassportV1Inputs,
};
pub use error::{CircuitInputError, Result};
pub use hash::{FieldHasher, PoseidonHasher};
pub use identity::{Iden3Resolver, IdentityResolver};
pub use registry::CircuitRegistry;
pub use schema::SchemaVersion;
pub use signals::{PubSignals, PublicSignals};
