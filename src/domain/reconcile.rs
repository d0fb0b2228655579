//! Event reconciler: folds ordered ledger events into a fresh snapshot.
//!
//! Applying the same ordered batch to the same snapshot twice is idempotent;
//! donation replays are screened by `DonationKey` and the other event kinds
//! are naturally idempotent.

use crate::domain::amount::Wei;
use crate::domain::model::{Campaign, CampaignRecord, Donation, DonationKey, DonationStatus, LedgerEvent, PositionedEvent};
use crate::domain::overlay::{self, MatchOutcome};
use crate::domain::snapshot::Snapshot;
use crate::foundation::Anomaly;
use log::{debug, warn};

/// A donation or withdrawal observed before its campaign-created event
/// (out-of-window replay). Retried for a bounded number of apply cycles.
#[derive(Clone, Debug)]
struct DeferredEvent {
    event: PositionedEvent,
    retries_left: u32,
}

pub struct Reconciler {
    match_window_nanos: u64,
    orphan_retry_cycles: u32,
    deferred: Vec<DeferredEvent>,
}

impl Reconciler {
    pub fn new(match_window_nanos: u64, orphan_retry_cycles: u32) -> Self {
        Self { match_window_nanos, orphan_retry_cycles, deferred: Vec::new() }
    }

    /// Fold `events` (already in ledger order) into a copy of `base`.
    ///
    /// Returns the next snapshot plus any anomalies found. `base` is never
    /// mutated; the caller publishes the returned value atomically.
    pub fn apply(&mut self, base: &Snapshot, events: &[PositionedEvent], now_nanos: u64) -> (Snapshot, Vec<Anomaly>) {
        let mut next = base.clone();
        let mut anomalies = Vec::new();

        for event in events {
            if let Some(deferred) = self.apply_one(&mut next, event, now_nanos, &mut anomalies) {
                self.deferred.push(DeferredEvent { event: deferred, retries_left: self.orphan_retry_cycles });
            }
        }

        self.retry_deferred(&mut next, now_nanos, &mut anomalies);
        overlay::expire_stale(&mut next, self.match_window_nanos, now_nanos);

        (next, anomalies)
    }

    /// Apply a single event; returns it back if it must be deferred.
    fn apply_one(
        &self,
        snapshot: &mut Snapshot,
        event: &PositionedEvent,
        now_nanos: u64,
        anomalies: &mut Vec<Anomaly>,
    ) -> Option<PositionedEvent> {
        match &event.event {
            LedgerEvent::CampaignCreated { campaign_id, owner } => {
                // Replays are a no-op; metadata is filled in from the next
                // campaign list read.
                snapshot.campaigns.entry(*campaign_id).or_insert_with(|| Campaign {
                    id: *campaign_id,
                    title: String::new(),
                    description: String::new(),
                    category: String::new(),
                    image_url: String::new(),
                    goal: Wei::ZERO,
                    raised: Wei::ZERO,
                    owner: owner.clone(),
                    withdrawn: false,
                });
                None
            }
            LedgerEvent::Donated { campaign_id, donor, amount } => {
                let key = DonationKey {
                    campaign_id: *campaign_id,
                    donor: donor.clone(),
                    amount: *amount,
                    position: event.position,
                    log_index: event.log_index,
                };
                if snapshot.applied.contains(&key) {
                    debug!("donation replay skipped campaign_id={} position={} log_index={}", campaign_id, event.position, event.log_index);
                    return None;
                }
                if !snapshot.campaigns.contains_key(campaign_id) {
                    debug!("donation deferred, campaign unknown campaign_id={} position={}", campaign_id, event.position);
                    return Some(event.clone());
                }

                let confirmed = Donation {
                    donor: donor.clone(),
                    amount: *amount,
                    campaign_id: *campaign_id,
                    timestamp_nanos: event.timestamp_nanos,
                    status: DonationStatus::Confirmed,
                };
                match overlay::match_confirmed(snapshot, &confirmed, self.match_window_nanos, now_nanos) {
                    MatchOutcome::Superseded => {}
                    MatchOutcome::Conflict(anomaly) => {
                        warn!("{anomaly}");
                        anomalies.push(anomaly);
                        snapshot.donations.insert(0, confirmed);
                    }
                    MatchOutcome::NoMatch => {
                        snapshot.donations.insert(0, confirmed);
                    }
                }

                if let Some(campaign) = snapshot.campaigns.get_mut(campaign_id) {
                    campaign.raised = campaign.raised.checked_add(*amount).unwrap_or(campaign.raised);
                }
                snapshot.applied.insert(key);
                None
            }
            LedgerEvent::Withdrawn { campaign_id, amount: _ } => match snapshot.campaigns.get_mut(campaign_id) {
                Some(campaign) => {
                    // false -> true exactly once; already-withdrawn campaigns
                    // are untouched.
                    campaign.withdrawn = true;
                    None
                }
                None => Some(event.clone()),
            },
        }
    }

    /// Re-attempt deferred events until a pass makes no progress, then charge
    /// one retry cycle to whatever is left and report the exhausted ones.
    fn retry_deferred(&mut self, snapshot: &mut Snapshot, now_nanos: u64, anomalies: &mut Vec<Anomaly>) {
        loop {
            if self.deferred.is_empty() {
                return;
            }
            let pending = std::mem::take(&mut self.deferred);
            let before = pending.len();
            for item in pending {
                if let Some(event) = self.apply_one(snapshot, &item.event, now_nanos, anomalies) {
                    self.deferred.push(DeferredEvent { event, retries_left: item.retries_left });
                }
            }
            if self.deferred.len() == before {
                break;
            }
        }

        let mut kept = Vec::new();
        for mut item in std::mem::take(&mut self.deferred) {
            item.retries_left = item.retries_left.saturating_sub(1);
            if item.retries_left == 0 {
                let anomaly = orphan_anomaly(&item.event);
                warn!("{anomaly}");
                anomalies.push(anomaly);
            } else {
                kept.push(item);
            }
        }
        self.deferred = kept;
    }

    /// Events still waiting for their campaign to appear.
    pub fn deferred_len(&self) -> usize {
        self.deferred.len()
    }
}

fn orphan_anomaly(event: &PositionedEvent) -> Anomaly {
    let (kind, campaign_id, donor) = match &event.event {
        LedgerEvent::Donated { campaign_id, donor, .. } => ("donated", campaign_id.value(), Some(donor.to_string())),
        LedgerEvent::Withdrawn { campaign_id, .. } => ("withdrawn", campaign_id.value(), None),
        LedgerEvent::CampaignCreated { campaign_id, owner } => ("campaign_created", campaign_id.value(), Some(owner.to_string())),
    };
    Anomaly::OrphanedEvent { kind, campaign_id, donor, position: event.position.value(), log_index: event.log_index }
}

/// Merge a fresh full-snapshot campaign read into the materialized view.
///
/// Display fields, goal, and owner come from the ledger record; the `raised`
/// aggregate stays event-derived, and `withdrawn` only ever moves
/// false -> true.
pub fn merge_campaign_records(snapshot: &mut Snapshot, records: &[CampaignRecord]) {
    for record in records {
        match snapshot.campaigns.get_mut(&record.id) {
            Some(existing) => {
                existing.title = record.title.clone();
                existing.description = record.description.clone();
                existing.category = record.category.clone();
                existing.image_url = record.image_url.clone();
                existing.goal = record.goal;
                existing.owner = record.owner.clone();
                existing.withdrawn = existing.withdrawn || record.withdrawn;
            }
            None => {
                snapshot.campaigns.insert(record.id, record.clone().into_campaign());
            }
        }
    }
}

/// Cross-check the ledger's own raised counters against the event-derived
/// aggregates. The aggregation is authoritative; mismatches are reported.
pub fn cross_check_raised(snapshot: &Snapshot, records: &[CampaignRecord]) -> Vec<Anomaly> {
    let mut anomalies = Vec::new();
    for record in records {
        let aggregated = snapshot.campaigns.get(&record.id).map(|c| c.raised).unwrap_or(Wei::ZERO);
        if aggregated != record.ledger_raised {
            anomalies.push(Anomaly::RaisedMismatch {
                campaign_id: record.id.value(),
                ledger_raised: record.ledger_raised.to_minor_string(),
                aggregated_raised: aggregated.to_minor_string(),
            });
        }
    }
    anomalies
}

/// True when every campaign's aggregate equals the sum of its confirmed
/// donations. Exported for tests and diagnostics.
pub fn conservation_holds(snapshot: &Snapshot) -> bool {
    snapshot.campaigns.iter().all(|(id, campaign)| snapshot.aggregated_raised(*id) == campaign.raised)
}
