//! Snapshot store: single-writer, many-reader materialized view.
//!
//! The whole snapshot is held behind a `tokio::sync::watch` channel of
//! `Arc<Snapshot>`; every mutation goes through [`SnapshotStore::update`],
//! which runs under the channel's writer lock, so observers either see the
//! previous snapshot or the fully-applied next one and concurrent writers
//! cannot interleave between reading and replacing the value. Subscribers
//! get change notification for re-rendering.

use crate::domain::{Campaign, Donation, Snapshot};
use crate::foundation::CampaignId;
use std::sync::Arc;
use tokio::sync::watch;

pub struct SnapshotStore {
    tx: watch::Sender<Arc<Snapshot>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Arc::new(Snapshot::default()));
        Self { tx }
    }

    /// The current snapshot reference. Cheap; holds no lock.
    pub fn current(&self) -> Arc<Snapshot> {
        self.tx.borrow().clone()
    }

    /// Serialized read-modify-write on the snapshot.
    ///
    /// The closure sees the latest committed value and its result replaces it
    /// atomically; no other update can run in between. Subscribers are
    /// notified only when the closure returns true.
    pub fn update<F>(&self, f: F) -> bool
    where
        F: FnOnce(&mut Snapshot) -> bool,
    {
        self.tx.send_if_modified(|current| f(Arc::make_mut(current)))
    }

    /// Change notification stream for outward consumers.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.tx.subscribe()
    }

    pub fn campaigns(&self) -> Vec<Campaign> {
        self.current().campaigns.values().cloned().collect()
    }

    pub fn donations(&self) -> Vec<Donation> {
        self.current().donations.clone()
    }

    pub fn campaign(&self, id: CampaignId) -> Option<Campaign> {
        self.current().campaigns.get(&id).cloned()
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}
