use std::time::Duration;
use thiserror::Error;
use trackid_assertion::ParseError;
use trackid_directory::DirectoryError;
use trackid_track::TrackError;
use trackid_types::{TypesError, UserId};

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no user matches {assertion}")]
    NotFound { assertion: String },

    #[error("{term} belongs to {found}, but {expected} was expected")]
    AssertionMismatch {
        term: String,
        expected: UserId,
        found: UserId,
    },

    #[error("unknown service {service}")]
    UnknownService { service: String },

    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UiError {
    #[error("no UI is available to answer the prompt")]
    Unavailable,

    #[error("the user dismissed the prompt")]
    Dismissed,
}

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("no signing key configured")]
    Missing,

    #[error("wrong passphrase for the signing key")]
    BadPassphrase,

    #[error("signing key does not belong to {0}")]
    WrongKey(UserId),

    #[error("cannot read signing key: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed signing key: {0}")]
    Malformed(#[from] TypesError),
}

/// Why an identify run produced no outcome.
///
/// Proof failures are not here: they are verdicts inside the outcome.
#[derive(Debug, Error)]
pub enum IdentifyError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("tracking statement: {0}")]
    Track(#[from] TrackError),

    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error("cannot identify yourself ({uid})")]
    SelfIdentify { uid: UserId },

    #[error("a prompt was needed but no UI is available")]
    UiUnavailable,

    #[error("identify run was cancelled")]
    Cancelled,

    #[error("identify run did not finish within {}s", .after.as_secs())]
    TimedOut { after: Duration },

    #[error("signing key unavailable: {0}")]
    KeyUnavailable(#[from] KeyError),
}
