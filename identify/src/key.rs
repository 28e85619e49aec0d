//! Where the tracker's signing key comes from.

use async_trait::async_trait;
use trackid_types::{PrivateKey, PublicKey};
use zeroize::Zeroizing;

use crate::error::KeyError;

/// Hands out the signing key for exactly one signature.
///
/// The returned [`PrivateKey`] is moved into the signer and zeroized when it drops.
#[async_trait]
pub trait SecretKeySource: Send + Sync {
    /// Public half, for checking the key belongs to the tracker.
    fn public_key(&self) -> PublicKey;

    /// Whether [`unlock`](Self::unlock) needs a passphrase from the UI.
    fn needs_passphrase(&self) -> bool;

    async fn unlock(&self, passphrase: Option<&str>) -> Result<PrivateKey, KeyError>;
}

/// An in-memory key with no passphrase.
pub struct StaticKeySource {
    seed: Zeroizing<[u8; 32]>,
    public: PublicKey,
}

impl StaticKeySource {
    pub fn new(private: PrivateKey) -> Self {
        let public = trackid_crypto::public_from_private(&private);
        Self {
            seed: Zeroizing::new(private.0),
            public,
        }
    }

    /// Read a hex-encoded private key from a file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, KeyError> {
        let text = Zeroizing::new(std::fs::read_to_string(path)?);
        let private = PrivateKey::from_hex(text.trim())?;
        Ok(Self::new(private))
    }
}

#[async_trait]
impl SecretKeySource for StaticKeySource {
    fn public_key(&self) -> PublicKey {
        self.public.clone()
    }

    fn needs_passphrase(&self) -> bool {
        false
    }

    async fn unlock(&self, _passphrase: Option<&str>) -> Result<PrivateKey, KeyError> {
        Ok(PrivateKey(*self.seed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn static_source_returns_its_key() {
        let kp = trackid_crypto::keypair_from_seed(&[4; 32]);
        let source = StaticKeySource::new(PrivateKey([4; 32]));
        assert_eq!(source.public_key(), kp.public);
        assert!(!source.needs_passphrase());
        let key = source.unlock(None).await.unwrap();
        assert_eq!(key.0, [4; 32]);
    }

    #[test]
    fn reads_hex_key_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", "07".repeat(32)).unwrap();
        let source = StaticKeySource::from_file(file.path()).unwrap();
        assert_eq!(source.public_key(), trackid_crypto::keypair_from_seed(&[7; 32]).public);
    }

    #[test]
    fn malformed_key_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not hex").unwrap();
        assert!(matches!(
            StaticKeySource::from_file(file.path()),
            Err(KeyError::Malformed(_))
        ));
        assert!(matches!(
            StaticKeySource::from_file(std::path::Path::new("/nonexistent/key")),
            Err(KeyError::Io(_))
        ));
    }
}
