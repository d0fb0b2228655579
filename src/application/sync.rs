//! The sync loop: owns the last-seen cursor and drives the snapshot store.
//!
//! `Uninitialized -> Loading -> Steady`, with `Error` reachable from any
//! state and never terminal: the next cadence tick retries from the last
//! successfully committed cursor, so a failed window is re-requested rather
//! than skipped. All polling state lives on the service instance; multiple
//! independent sync sessions can coexist and tear down cleanly.

use crate::domain::reconcile::{cross_check_raised, merge_campaign_records};
use crate::domain::{DonationStatus, LedgerEvent, PositionedEvent, Reconciler, Snapshot};
use crate::foundation::util::time::secs_to_nanos;
use crate::foundation::{now_nanos, Anomaly, Position, Result, SyncError};
use crate::infrastructure::config::SyncConfig;
use crate::infrastructure::{LedgerClient, SnapshotStore};
use log::{debug, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SyncState {
    Uninitialized,
    Loading,
    Steady,
    Error,
}

struct SyncInner {
    state: SyncState,
    /// Highest ledger position already folded into the published snapshot.
    cursor: Position,
    /// Whether an initial snapshot has ever been committed; decides whether
    /// recovery from `Error` re-runs the full load or resumes the delta path.
    initialized: bool,
    reconciler: Reconciler,
}

pub struct SyncService {
    ledger: Arc<dyn LedgerClient>,
    store: Arc<SnapshotStore>,
    config: SyncConfig,
    inner: Mutex<SyncInner>,
    /// Cleared on teardown; in-flight work observing `false` discards its
    /// results instead of publishing them.
    live: AtomicBool,
}

impl SyncService {
    pub fn new(ledger: Arc<dyn LedgerClient>, store: Arc<SnapshotStore>, config: SyncConfig) -> Self {
        let reconciler = Reconciler::new(secs_to_nanos(config.match_window_seconds), config.orphan_retry_cycles);
        Self {
            ledger,
            store,
            config,
            inner: Mutex::new(SyncInner { state: SyncState::Uninitialized, cursor: Position::ZERO, initialized: false, reconciler }),
            live: AtomicBool::new(true),
        }
    }

    pub fn store(&self) -> &Arc<SnapshotStore> {
        &self.store
    }

    pub async fn state(&self) -> SyncState {
        self.inner.lock().await.state
    }

    pub async fn cursor(&self) -> Position {
        self.inner.lock().await.cursor
    }

    /// One cadence tick of the state machine.
    pub async fn tick(&self) -> Result<()> {
        if !self.live.load(Ordering::SeqCst) {
            return Ok(());
        }
        let mut inner = self.inner.lock().await;
        let result = match (inner.state, inner.initialized) {
            (SyncState::Steady, _) | (SyncState::Error, true) => self.steady_tick(&mut inner).await,
            _ => self.initial_load(&mut inner).await,
        };
        if let Err(err) = &result {
            warn!("sync tick failed state={:?} cursor={} error={}", inner.state, inner.cursor, err);
            inner.state = SyncState::Error;
        }
        result
    }

    /// Re-run the full load on demand (after a user-initiated write).
    ///
    /// Reconciles rather than overwrites: optimistic entries still pending
    /// confirmation are carried into the rebuilt snapshot and superseded by
    /// the replayed history where it matches them.
    pub async fn force_reload(&self) -> Result<()> {
        if !self.live.load(Ordering::SeqCst) {
            return Ok(());
        }
        let mut inner = self.inner.lock().await;
        let result = self.initial_load(&mut inner).await;
        if let Err(err) = &result {
            warn!("forced reload failed error={}", err);
            inner.state = SyncState::Error;
        }
        result
    }

    /// Spawn the recurring cadence loop. Dropping (or shutting down) the
    /// returned handle cancels the timer and stops further ledger queries.
    pub fn spawn(self: &Arc<Self>) -> SyncHandle {
        let service = self.clone();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(service.config.poll_interval_seconds));
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                if !service.live.load(Ordering::SeqCst) {
                    break;
                }
                // Errors are already logged and leave the committed snapshot
                // untouched; the next tick retries.
                let _ = service.tick().await;
            }
        });
        SyncHandle { service: self.clone(), handle }
    }

    /// Full load: campaign list plus complete event history, committed as
    /// one atomic snapshot swap.
    async fn initial_load(&self, inner: &mut SyncInner) -> Result<()> {
        inner.state = SyncState::Loading;
        let target = self.ledger.current_position().await?;
        let records = self.ledger.list_campaigns().await?;
        let events = self.fetch_window(Position::ZERO, target).await?;
        info!("initial load fetched campaign_count={} event_count={} target_position={}", records.len(), events.len(), target);

        if !self.live.load(Ordering::SeqCst) {
            debug!("snapshot discarded after teardown target_position={}", target);
            return Ok(());
        }
        let reconciler = &mut inner.reconciler;
        let mut anomalies = Vec::new();
        self.store.update(|snapshot| {
            // Carry unconfirmed optimistic entries into the rebuilt view; the
            // replayed history supersedes the ones it confirms. Reading the
            // pending set and committing the result happen under the store's
            // writer lock, so a concurrent optimistic insert cannot be lost.
            let mut base = Snapshot::default();
            base.donations = snapshot.donations.iter().filter(|d| !d.is_confirmed()).cloned().collect();
            merge_campaign_records(&mut base, &records);

            let (mut next, found) = reconciler.apply(&base, &events, now_nanos());
            anomalies = found;
            anomalies.extend(cross_check_raised(&next, &records));
            next.position = target;
            *snapshot = next;
            true
        });
        report_anomalies(&anomalies);
        inner.cursor = target;
        inner.initialized = true;
        inner.state = SyncState::Steady;
        info!("sync steady cursor={}", target);
        Ok(())
    }

    /// Delta tick: pull only `(cursor, current]` and fold it in.
    async fn steady_tick(&self, inner: &mut SyncInner) -> Result<()> {
        let current = self.ledger.current_position().await?;
        if current <= inner.cursor {
            self.maybe_expire_stale(inner);
            inner.state = SyncState::Steady;
            return Ok(());
        }

        let from = inner.cursor.next();
        let events = self.fetch_window(from, current).await?;
        debug!("delta window applied from={} to={} event_count={}", from, current, events.len());

        // Creation/withdrawal events carry no display metadata; refresh the
        // campaign list for the same committed batch. Fetched before the base
        // snapshot is read so no await sits between read and commit.
        let needs_campaign_refresh =
            events.iter().any(|e| matches!(e.event, LedgerEvent::CampaignCreated { .. } | LedgerEvent::Withdrawn { .. }));
        let records = if needs_campaign_refresh { Some(self.ledger.list_campaigns().await?) } else { None };

        if !self.live.load(Ordering::SeqCst) {
            debug!("delta result discarded after teardown to={}", current);
            return Ok(());
        }
        let reconciler = &mut inner.reconciler;
        let mut anomalies = Vec::new();
        self.store.update(|snapshot| {
            let (mut next, found) = reconciler.apply(snapshot, &events, now_nanos());
            anomalies = found;
            if let Some(records) = &records {
                merge_campaign_records(&mut next, records);
            }
            next.position = current;
            *snapshot = next;
            true
        });
        report_anomalies(&anomalies);
        inner.cursor = current;
        inner.state = SyncState::Steady;
        Ok(())
    }

    /// Pending optimistic entries age out even when the ledger is idle.
    fn maybe_expire_stale(&self, inner: &mut SyncInner) {
        if !self.live.load(Ordering::SeqCst) {
            return;
        }
        let reconciler = &mut inner.reconciler;
        let mut anomalies = Vec::new();
        self.store.update(|snapshot| {
            let has_pending = snapshot.donations.iter().any(|d| d.status == DonationStatus::Pending);
            if !has_pending {
                return false;
            }
            let (next, found) = reconciler.apply(snapshot, &[], now_nanos());
            anomalies = found;
            let changed = next != *snapshot;
            *snapshot = next;
            changed
        });
        report_anomalies(&anomalies);
    }

    /// Fetch an inclusive window, splitting in half and retrying each half
    /// whenever the span exceeds the ledger's query limit. Events come back
    /// in ledger order.
    async fn fetch_window(&self, from: Position, to: Position) -> Result<Vec<PositionedEvent>> {
        let mut stack = vec![(from, to)];
        let mut events = Vec::new();
        while let Some((lo, hi)) = stack.pop() {
            match self.ledger.query_events(lo, hi).await {
                Ok(batch) => events.extend(batch),
                Err(SyncError::LedgerQueryTooLarge { limit, .. }) if lo < hi => {
                    let mid = Position::new(lo.value() + (hi.value() - lo.value()) / 2);
                    debug!("query window split lo={} hi={} mid={} limit={}", lo, hi, mid, limit);
                    stack.push((mid.next(), hi));
                    stack.push((lo, mid));
                }
                Err(err) => return Err(err),
            }
        }
        Ok(events)
    }
}

fn report_anomalies(anomalies: &[Anomaly]) {
    for anomaly in anomalies {
        warn!("{anomaly}");
    }
}

/// Owns the spawned cadence task; aborts it on drop so a torn-down view
/// stops issuing ledger queries.
pub struct SyncHandle {
    service: Arc<SyncService>,
    handle: JoinHandle<()>,
}

impl SyncHandle {
    pub fn shutdown(&self) {
        self.service.live.store(false, Ordering::SeqCst);
        self.handle.abort();
    }
}

impl Drop for SyncHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}
