//! Signed test identities.

use trackid_crypto::{keypair_from_seed, sign_proof};
use trackid_types::{Identity, PrivateKey, ProofKey, ProofType, UserId, Username};

use crate::keys::NullKeySource;

/// An identity with a real key pair and a correctly signed proof table.
#[derive(Clone)]
pub struct TestUser {
    pub identity: Identity,
    seed: [u8; 32],
}

impl TestUser {
    /// # Panics
    ///
    /// If `username` is not a valid username.
    pub fn new(seed: u8, username: &str) -> Self {
        let seed = [seed; 32];
        let kp = keypair_from_seed(&seed);
        let identity = Identity {
            id: UserId::from_public_key(&kp.public),
            username: Username::parse(username).expect("test username must be valid"),
            public_key: kp.public,
            proofs: Vec::new(),
        };
        Self { identity, seed }
    }

    /// Add a proof statement signed by this user's key, at the next seqno.
    pub fn with_proof(mut self, proof_type: ProofType, value: &str, remote: &str) -> Self {
        let seqno = self.identity.proofs.len() as u64 + 1;
        let statement = sign_proof(
            &self.identity.id,
            ProofKey::new(proof_type, value),
            remote,
            seqno,
            &self.private_key(),
        );
        self.identity.proofs.push(statement);
        self
    }

    /// Mark the most recently added proof as revoked by its owner.
    pub fn revoke_last(mut self) -> Self {
        if let Some(last) = self.identity.proofs.last_mut() {
            last.revoked = true;
        }
        self
    }

    pub fn id(&self) -> &UserId {
        &self.identity.id
    }

    pub fn private_key(&self) -> PrivateKey {
        PrivateKey(self.seed)
    }

    pub fn key_source(&self) -> NullKeySource {
        NullKeySource::new(self.seed)
    }

    pub fn key(proof_type: ProofType, value: &str) -> ProofKey {
        ProofKey::new(proof_type, value)
    }
}
