//! Tracking statements: build, sign, verify, encode.
//!
//! The signed bytes are the `serde_json` encoding of [`StatementBody`]. Field
//! order is declaration order and the track set is sorted by key, so any
//! verifier holding the body recomputes exactly the bytes that were signed.

use serde::{Deserialize, Serialize};
use trackid_crypto::sign::TRACK_DOMAIN;
use trackid_crypto::{blake2b_256_multi, public_from_private, sign_message, verify_signature};
use trackid_types::{PrivateKey, PublicKey, Signature, Timestamp, UserId};

use crate::error::TrackError;
use crate::set::TrackSet;

/// Current statement format version.
pub const STATEMENT_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementBody {
    pub version: u32,
    pub tracker: UserId,
    pub tracked: UserId,
    /// The tracked identity's key at track time.
    pub tracked_key: PublicKey,
    pub track_set: TrackSet,
    pub ctime: Timestamp,
    /// Id of the statement this one supersedes.
    pub prev: Option<String>,
}

impl StatementBody {
    /// Canonical signed bytes.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        // Strings, integers and a sorted list always serialize.
        serde_json::to_vec(self).unwrap_or_default()
    }
}

/// A statement ready to be signed. Only [`sign`] turns it into a [`TrackingStatement`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnsignedStatement {
    pub body: StatementBody,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingStatement {
    pub body: StatementBody,
    /// Public key of the tracker that signed the body.
    pub signer: PublicKey,
    pub signature: Signature,
}

/// Assemble the unsigned statement for `tracker` tracking `tracked`.
pub fn build_statement(
    tracker: UserId,
    tracked: UserId,
    tracked_key: PublicKey,
    track_set: TrackSet,
    ctime: Timestamp,
    prior: Option<&TrackingStatement>,
) -> UnsignedStatement {
    UnsignedStatement {
        body: StatementBody {
            version: STATEMENT_VERSION,
            tracker,
            tracked,
            tracked_key,
            track_set,
            ctime,
            prev: prior.map(TrackingStatement::id),
        },
    }
}

/// Sign a statement. The key is consumed and zeroized when it drops here.
pub fn sign(unsigned: UnsignedStatement, key: PrivateKey) -> TrackingStatement {
    let signer = public_from_private(&key);
    let signature = sign_message(TRACK_DOMAIN, &unsigned.body.canonical_bytes(), &key);
    TrackingStatement {
        body: unsigned.body,
        signer,
        signature,
    }
}

impl TrackingStatement {
    /// Hex Blake2b-256 over the canonical body followed by the signature.
    pub fn id(&self) -> String {
        let body = self.body.canonical_bytes();
        hex::encode(blake2b_256_multi(&[body.as_slice(), self.signature.as_bytes().as_slice()]))
    }

    /// Check the version and that `signer` signed the body.
    pub fn verify(&self) -> Result<(), TrackError> {
        if self.body.version != STATEMENT_VERSION {
            return Err(TrackError::UnsupportedVersion {
                found: self.body.version,
                expected: STATEMENT_VERSION,
            });
        }
        if verify_signature(
            TRACK_DOMAIN,
            &self.body.canonical_bytes(),
            &self.signature,
            &self.signer,
        ) {
            Ok(())
        } else {
            Err(TrackError::BadSignature)
        }
    }

    /// Like [`verify`](Self::verify), and also require the signer to be `tracker_key`.
    pub fn verify_for(&self, tracker_key: &PublicKey) -> Result<(), TrackError> {
        if &self.signer != tracker_key {
            return Err(TrackError::WrongSigner {
                signer: self.signer.to_hex(),
            });
        }
        self.verify()
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Decode a published statement. Rejects unknown versions; does not check the signature.
    pub fn from_json(json: &str) -> Result<Self, TrackError> {
        let statement: Self = serde_json::from_str(json)?;
        if statement.body.version != STATEMENT_VERSION {
            return Err(TrackError::UnsupportedVersion {
                found: statement.body.version,
                expected: STATEMENT_VERSION,
            });
        }
        Ok(statement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::set::{ProofState, TrackedProof};
    use trackid_crypto::keypair_from_seed;
    use trackid_types::{ProofKey, ProofType};

    fn uid(c: char) -> UserId {
        UserId::parse(&c.to_string().repeat(32)).unwrap()
    }

    fn set() -> TrackSet {
        TrackSet::new([TrackedProof {
            key: ProofKey::new(ProofType::Github, "bob"),
            remote: "https://gist.github.com/bob/1".into(),
            state: ProofState::Ok,
        }])
    }

    fn signed(ctime: u64, prior: Option<&TrackingStatement>) -> TrackingStatement {
        let tracker = keypair_from_seed(&[1; 32]);
        let tracked = keypair_from_seed(&[2; 32]);
        let unsigned = build_statement(
            uid('a'),
            uid('b'),
            tracked.public,
            set(),
            Timestamp::new(ctime),
            prior,
        );
        sign(unsigned, tracker.private)
    }

    #[test]
    fn signed_statement_verifies() {
        let st = signed(100, None);
        assert!(st.verify().is_ok());
        assert!(st.verify_for(&keypair_from_seed(&[1; 32]).public).is_ok());
        assert!(matches!(
            st.verify_for(&keypair_from_seed(&[3; 32]).public),
            Err(TrackError::WrongSigner { .. })
        ));
    }

    #[test]
    fn tampering_breaks_signature() {
        let mut st = signed(100, None);
        st.body.ctime = Timestamp::new(101);
        assert!(matches!(st.verify(), Err(TrackError::BadSignature)));
    }

    #[test]
    fn prev_links_to_prior_id() {
        let first = signed(100, None);
        let second = signed(200, Some(&first));
        assert_eq!(second.body.prev, Some(first.id()));
        assert_ne!(first.id(), second.id());
        assert_eq!(first.id().len(), 64);
    }

    #[test]
    fn json_roundtrip_keeps_signature_valid() {
        let st = signed(100, None);
        let back = TrackingStatement::from_json(&st.to_json()).unwrap();
        assert_eq!(back, st);
        assert!(back.verify().is_ok());
        assert_eq!(back.id(), st.id());
    }

    #[test]
    fn unknown_version_is_rejected() {
        let mut st = signed(100, None);
        st.body.version = 2;
        assert!(matches!(
            TrackingStatement::from_json(&st.to_json()),
            Err(TrackError::UnsupportedVersion { found: 2, .. })
        ));
        assert!(st.verify().is_err());
    }

    #[test]
    fn body_field_order_is_stable() {
        let json = String::from_utf8(signed(5, None).body.canonical_bytes()).unwrap();
        let order = ["version", "tracker", "tracked", "tracked_key", "track_set", "ctime", "prev"];
        let positions: Vec<usize> = order
            .iter()
            .map(|f| json.find(&format!("\"{f}\":")).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{json}");
    }
}
