//! Fundamental types for trackid.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! user identifiers, key material, timestamps, proof keys and the identity record
//! that the resolution layer loads from the directory.

pub mod error;
pub mod identity;
pub mod keys;
pub mod proof;
pub mod time;
pub mod user;

pub use error::TypesError;
pub use identity::{Identity, ProofStatement};
pub use keys::{KeyPair, PrivateKey, PublicKey, Signature};
pub use proof::{ProofKey, ProofType};
pub use time::{Clock, SystemClock, Timestamp};
pub use user::{UserId, Username};
