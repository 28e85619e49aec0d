//! Cryptographic primitives for trackid.
//!
//! - **Ed25519** for signing proof statements and tracking statements
//! - **Blake2b** for signature ids and statement ids
//! - Canonical proof payloads, so that independent verifiers recompute the same signed bytes

pub mod hash;
pub mod keys;
pub mod proof;
pub mod sign;

pub use hash::{blake2b_256, blake2b_256_multi, sig_id};
pub use keys::{generate_keypair, keypair_from_private, keypair_from_seed, public_from_private};
pub use proof::{proof_payload, sign_proof, verify_proof, verify_proof_with_key};
pub use sign::{sign_message, verify_signature};
