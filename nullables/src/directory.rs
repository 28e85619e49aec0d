//! Nullable directory: an in-memory identity store that records publications.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use trackid_directory::{DirectoryError, IdentityDirectory};
use trackid_track::TrackingStatement;
use trackid_types::{Identity, ProofKey, UserId, Username};

#[derive(Default)]
pub struct NullDirectory {
    identities: Mutex<HashMap<UserId, Identity>>,
    statements: Mutex<HashMap<(UserId, UserId), TrackingStatement>>,
    published: Mutex<Vec<TrackingStatement>>,
    delay: Mutex<Option<Duration>>,
    unreachable: AtomicBool,
    publish_stalled: AtomicBool,
    calls: AtomicUsize,
}

impl NullDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an identity.
    pub fn add_identity(&self, identity: Identity) {
        self.identities
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(identity.id.clone(), identity);
    }

    /// Seed a previously published statement.
    pub fn add_statement(&self, statement: TrackingStatement) {
        let pair = (statement.body.tracker.clone(), statement.body.tracked.clone());
        self.statements
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(pair, statement);
    }

    /// Every statement published so far, in order.
    pub fn published(&self) -> Vec<TrackingStatement> {
        self.published
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Make every call fail as if the directory were down.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    /// Make publishing hang until the caller gives up.
    pub fn stall_publish(&self, stalled: bool) {
        self.publish_stalled.store(stalled, Ordering::SeqCst);
    }

    /// Delay every call by `delay`.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap_or_else(|e| e.into_inner()) = Some(delay);
    }

    /// Number of calls made.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn enter(&self) -> Result<(), DirectoryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(DirectoryError::Unreachable("null directory is down".into()));
        }
        Ok(())
    }

    fn find(&self, pred: impl Fn(&Identity) -> bool) -> Option<UserId> {
        self.identities
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .find(|i| pred(i))
            .map(|i| i.id.clone())
    }
}

#[async_trait]
impl IdentityDirectory for NullDirectory {
    async fn lookup_username(&self, username: &Username) -> Result<Option<UserId>, DirectoryError> {
        self.enter().await?;
        Ok(self.find(|i| &i.username == username))
    }

    async fn lookup_proof(&self, key: &ProofKey) -> Result<Option<UserId>, DirectoryError> {
        self.enter().await?;
        Ok(self.find(|i| i.latest_proof(key).is_some()))
    }

    async fn load_identity(&self, uid: &UserId) -> Result<Identity, DirectoryError> {
        self.enter().await?;
        self.identities
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(uid)
            .cloned()
            .ok_or_else(|| DirectoryError::NotFound(uid.to_string()))
    }

    async fn latest_tracking_statement(
        &self,
        tracker: &UserId,
        tracked: &UserId,
    ) -> Result<Option<TrackingStatement>, DirectoryError> {
        self.enter().await?;
        let pair = (tracker.clone(), tracked.clone());
        Ok(self
            .statements
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&pair)
            .cloned())
    }

    async fn publish_tracking_statement(
        &self,
        statement: &TrackingStatement,
    ) -> Result<(), DirectoryError> {
        self.enter().await?;
        if self.publish_stalled.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        self.published
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(statement.clone());
        self.add_statement(statement.clone());
        Ok(())
    }
}
