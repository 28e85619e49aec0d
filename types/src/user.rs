//! Stable user identifiers and human-chosen usernames.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::TypesError;
use crate::keys::PublicKey;

/// A stable user identifier: 16 bytes rendered as 32 lowercase hex characters.
///
/// A user id never changes for the lifetime of an account, unlike the username
/// or the set of proofs attached to it.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Number of hex characters in a user id.
    pub const HEX_LEN: usize = 32;

    /// Parse a user id from its hex form. Uppercase input is normalised.
    pub fn parse(raw: &str) -> Result<Self, TypesError> {
        let s = raw.trim().to_ascii_lowercase();
        if s.len() != Self::HEX_LEN || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(TypesError::InvalidUserId(raw.to_string()));
        }
        Ok(Self(s))
    }

    /// Derive the id of an account from its initial public key.
    pub fn from_public_key(public_key: &PublicKey) -> Self {
        let mut hasher = Blake2b::<U32>::new();
        hasher.update(b"trackid-uid");
        hasher.update(public_key.as_bytes());
        let digest = hasher.finalize();
        Self(hex::encode(&digest[..16]))
    }

    /// Return the raw hex string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for UserId {
    type Error = TypesError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

/// A username, always lowercase.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    pub const MIN_LEN: usize = 2;
    pub const MAX_LEN: usize = 16;

    /// Parse and normalise a username: 2-16 characters of `[a-z0-9_]`.
    pub fn parse(raw: &str) -> Result<Self, TypesError> {
        let s = raw.trim().to_ascii_lowercase();
        let valid_len = (Self::MIN_LEN..=Self::MAX_LEN).contains(&s.len());
        let valid_chars = s.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_');
        if !valid_len || !valid_chars {
            return Err(TypesError::InvalidUsername(raw.to_string()));
        }
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Username {
    type Error = TypesError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Username> for String {
    fn from(name: Username) -> Self {
        name.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_normalises_case() {
        let id = UserId::parse("ABCDEF0123456789abcdef0123456789").unwrap();
        assert_eq!(id.as_str(), "abcdef0123456789abcdef0123456789");
    }

    #[test]
    fn user_id_rejects_wrong_length() {
        assert!(UserId::parse("abc").is_err());
        assert!(UserId::parse(&"a".repeat(33)).is_err());
    }

    #[test]
    fn user_id_rejects_non_hex() {
        assert!(UserId::parse(&"g".repeat(32)).is_err());
    }

    #[test]
    fn user_id_from_public_key_is_deterministic() {
        let pk = PublicKey([7u8; 32]);
        let a = UserId::from_public_key(&pk);
        let b = UserId::from_public_key(&pk);
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), UserId::HEX_LEN);
        assert_ne!(a, UserId::from_public_key(&PublicKey([8u8; 32])));
    }

    #[test]
    fn username_lowercases() {
        assert_eq!(Username::parse("Alice").unwrap().as_str(), "alice");
    }

    #[test]
    fn username_rejects_bad_input() {
        assert!(Username::parse("a").is_err());
        assert!(Username::parse("has space").is_err());
        assert!(Username::parse("way_too_long_for_a_name").is_err());
        assert!(Username::parse("bob:twitter").is_err());
    }

    #[test]
    fn serde_rejects_invalid_user_id() {
        let res: Result<UserId, _> = serde_json::from_str("\"nothex\"");
        assert!(res.is_err());
    }
}
