//! Top-level error type for malformed identity values.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypesError {
    #[error("invalid user id: {0}")]
    InvalidUserId(String),

    #[error("invalid username: {0}")]
    InvalidUsername(String),

    #[error("invalid proof key: {0}")]
    InvalidProofKey(String),

    #[error("invalid hex encoding for {field}: expected {expected} bytes")]
    InvalidHex { field: &'static str, expected: usize },
}
