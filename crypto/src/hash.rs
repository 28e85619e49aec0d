//! Blake2b hashing for signature ids and statement ids.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use trackid_types::Signature;

type Blake2b256 = Blake2b<U32>;

/// Compute a 256-bit Blake2b hash of arbitrary data.
pub fn blake2b_256(data: &[u8]) -> [u8; 32] {
    blake2b_256_multi(&[data])
}

/// Hash multiple byte slices in sequence (avoids concatenation allocation).
pub fn blake2b_256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    for part in parts {
        hasher.update(part);
    }
    let mut output = [0u8; 32];
    output.copy_from_slice(&hasher.finalize());
    output
}

/// The public id of a signature: hex Blake2b-256 of its bytes.
///
/// Remote evidence (a post, a TXT record) carries this id rather than the
/// full signature.
pub fn sig_id(signature: &Signature) -> String {
    hex::encode(blake2b_256(signature.as_bytes()))
}
