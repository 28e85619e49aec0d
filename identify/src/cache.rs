//! Short-lived cache of clean identify outcomes.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use trackid_types::{Clock, Timestamp, UserId};

use crate::outcome::IdentifyOutcome;
use crate::policy::IdentifyBehavior;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub me: Option<UserId>,
    pub target: UserId,
    pub behavior: IdentifyBehavior,
}

pub struct IdentifyCache {
    ttl_secs: u64,
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<CacheKey, (Timestamp, IdentifyOutcome)>>,
}

impl IdentifyCache {
    pub fn new(ttl_secs: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl_secs,
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// A fresh copy of the cached outcome, if one exists and has not expired.
    pub async fn get(&self, key: &CacheKey) -> Option<IdentifyOutcome> {
        let now = self.clock.now();
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some((stored, _)) if stored.has_expired(self.ttl_secs, now) => {
                entries.remove(key);
                None
            }
            Some((_, outcome)) => Some(outcome.clone()),
            None => None,
        }
    }

    /// Store `outcome`, sweeping out expired entries first so the map only
    /// ever holds live outcomes.
    pub async fn insert(&self, key: CacheKey, outcome: IdentifyOutcome) {
        let now = self.clock.now();
        let mut entries = self.entries.lock().await;
        entries.retain(|_, (stored, _)| !stored.has_expired(self.ttl_secs, now));
        entries.insert(key, (now, outcome));
    }

    /// Drop every expired entry. Returns how many were dropped.
    pub async fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, (stored, _)| !stored.has_expired(self.ttl_secs, now));
        before - entries.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}
