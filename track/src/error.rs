use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackError {
    #[error("unsupported statement version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("statement signature does not verify against the signer key")]
    BadSignature,

    #[error("statement is signed by {signer}, not by the tracker's key")]
    WrongSigner { signer: String },

    #[error("malformed statement: {0}")]
    Malformed(#[from] serde_json::Error),
}
