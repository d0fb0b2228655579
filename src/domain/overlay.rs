//! Optimistic overlay: speculative local donations layered onto the
//! canonical view until the matching ledger event confirms them.

use crate::domain::amount::Wei;
use crate::domain::model::{Donation, DonationStatus};
use crate::domain::snapshot::Snapshot;
use crate::foundation::{AccountId, Anomaly, CampaignId};
use log::{debug, info};

/// Outcome of matching a freshly confirmed donation against pending entries.
#[derive(Debug, PartialEq, Eq)]
pub enum MatchOutcome {
    /// A pending entry with identical donor/campaign/amount was replaced in
    /// place; the confirmed donation must not be appended again.
    Superseded,
    /// A pending entry for the same donor/campaign disagreed on amount; it
    /// was discarded in favor of the confirmed event.
    Conflict(Anomaly),
    /// Nothing to reconcile; the confirmed donation is simply new.
    NoMatch,
}

/// Insert an unconfirmed donation at the front of the list.
///
/// The entry contributes to `Snapshot::displayed_raised` only; the
/// authoritative `raised` aggregate is owned by the reconciler.
pub fn insert_optimistic(snapshot: &mut Snapshot, donor: AccountId, campaign_id: CampaignId, amount: Wei, now_nanos: u64) {
    debug!("optimistic donation inserted donor={} campaign_id={} amount={}", donor, campaign_id, amount.display_major());
    snapshot.donations.insert(0, Donation { donor, amount, campaign_id, timestamp_nanos: now_nanos, status: DonationStatus::Pending });
}

/// Remove the most recent pending entry matching donor/campaign/amount.
///
/// Used to roll back an optimistic insert when the submitting transaction
/// fails, leaving the snapshot unchanged for the consumer.
pub fn remove_optimistic(snapshot: &mut Snapshot, donor: &AccountId, campaign_id: CampaignId, amount: Wei) -> bool {
    let found = snapshot
        .donations
        .iter()
        .position(|d| d.status == DonationStatus::Pending && &d.donor == donor && d.campaign_id == campaign_id && d.amount == amount);
    match found {
        Some(idx) => {
            snapshot.donations.remove(idx);
            true
        }
        None => false,
    }
}

/// Reconcile a confirmed donation against pending optimistic entries.
///
/// An exact match (donor, campaign, amount) whose entry is still inside the
/// reconciliation window is superseded in place, so the donation list ends up
/// with exactly one entry for it. A same-donor, same-campaign entry with a
/// different amount is a conflict: the confirmed event is trusted and the
/// optimistic entry dropped.
pub fn match_confirmed(snapshot: &mut Snapshot, confirmed: &Donation, window_nanos: u64, now_nanos: u64) -> MatchOutcome {
    let cutoff = now_nanos.saturating_sub(window_nanos);

    let exact = snapshot.donations.iter().position(|d| {
        d.status == DonationStatus::Pending
            && d.donor == confirmed.donor
            && d.campaign_id == confirmed.campaign_id
            && d.amount == confirmed.amount
            && d.timestamp_nanos >= cutoff
    });
    if let Some(idx) = exact {
        info!(
            "optimistic donation confirmed donor={} campaign_id={} amount={}",
            confirmed.donor,
            confirmed.campaign_id,
            confirmed.amount.display_major()
        );
        snapshot.donations[idx] = confirmed.clone();
        return MatchOutcome::Superseded;
    }

    let conflicting = snapshot.donations.iter().position(|d| {
        d.status == DonationStatus::Pending
            && d.donor == confirmed.donor
            && d.campaign_id == confirmed.campaign_id
            && d.timestamp_nanos >= cutoff
    });
    if let Some(idx) = conflicting {
        let dropped = snapshot.donations.remove(idx);
        return MatchOutcome::Conflict(Anomaly::ReconciliationConflict {
            campaign_id: confirmed.campaign_id.value(),
            donor: confirmed.donor.to_string(),
            optimistic_amount: dropped.amount.to_minor_string(),
            confirmed_amount: confirmed.amount.to_minor_string(),
        });
    }

    MatchOutcome::NoMatch
}

/// Flag pending entries older than the reconciliation window as stale.
///
/// Stale entries stay in the list (semantically distinct for display) but are
/// never matched again and never count toward any total.
pub fn expire_stale(snapshot: &mut Snapshot, window_nanos: u64, now_nanos: u64) -> usize {
    let cutoff = now_nanos.saturating_sub(window_nanos);
    let mut expired = 0;
    for donation in snapshot.donations.iter_mut() {
        if donation.status == DonationStatus::Pending && donation.timestamp_nanos < cutoff {
            donation.status = DonationStatus::Stale;
            expired += 1;
        }
    }
    expired
}
