//! Nullable signing key source, optionally behind a passphrase.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use trackid_identify::{KeyError, SecretKeySource};
use trackid_types::{PrivateKey, PublicKey};

pub struct NullKeySource {
    seed: [u8; 32],
    passphrase: Option<String>,
    unlocks: AtomicUsize,
}

impl NullKeySource {
    pub fn new(seed: [u8; 32]) -> Self {
        Self {
            seed,
            passphrase: None,
            unlocks: AtomicUsize::new(0),
        }
    }

    pub fn with_passphrase(mut self, passphrase: impl Into<String>) -> Self {
        self.passphrase = Some(passphrase.into());
        self
    }

    /// Number of successful unlocks.
    pub fn unlocks(&self) -> usize {
        self.unlocks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SecretKeySource for NullKeySource {
    fn public_key(&self) -> PublicKey {
        trackid_crypto::keypair_from_seed(&self.seed).public
    }

    fn needs_passphrase(&self) -> bool {
        self.passphrase.is_some()
    }

    async fn unlock(&self, passphrase: Option<&str>) -> Result<PrivateKey, KeyError> {
        if let Some(expected) = &self.passphrase {
            if passphrase != Some(expected.as_str()) {
                return Err(KeyError::BadPassphrase);
            }
        }
        self.unlocks.fetch_add(1, Ordering::SeqCst);
        Ok(PrivateKey(self.seed))
    }
}
