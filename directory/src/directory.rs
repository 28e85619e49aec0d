//! The directory capability the resolver and the engine depend on.

use async_trait::async_trait;
use trackid_track::TrackingStatement;
use trackid_types::{Identity, ProofKey, UserId, Username};

use crate::error::DirectoryError;

/// Where identities, the proof index, and published tracking statements live.
///
/// Lookups that find nothing return `Ok(None)`; errors are reserved for
/// failures to ask.
#[async_trait]
pub trait IdentityDirectory: Send + Sync {
    /// The user id registered under `username`.
    async fn lookup_username(&self, username: &Username) -> Result<Option<UserId>, DirectoryError>;

    /// The user whose proof table currently claims `key`.
    async fn lookup_proof(&self, key: &ProofKey) -> Result<Option<UserId>, DirectoryError>;

    /// Load the identity record for `uid`. Unknown ids are [`DirectoryError::NotFound`].
    async fn load_identity(&self, uid: &UserId) -> Result<Identity, DirectoryError>;

    /// The most recent statement `tracker` published about `tracked`.
    async fn latest_tracking_statement(
        &self,
        tracker: &UserId,
        tracked: &UserId,
    ) -> Result<Option<TrackingStatement>, DirectoryError>;

    /// Publish a signed statement under its tracker.
    async fn publish_tracking_statement(
        &self,
        statement: &TrackingStatement,
    ) -> Result<(), DirectoryError>;
}
