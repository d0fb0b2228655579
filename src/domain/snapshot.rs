//! The materialized, consistent view exposed to consumers.
//!
//! A snapshot is an immutable value: the reconciler and overlay build a new
//! one and the store swaps the whole reference, so readers never observe a
//! half-applied batch. Derived views are computed lazily from the canonical
//! sets rather than separately maintained.

use crate::domain::amount::Wei;
use crate::domain::model::{Campaign, Donation, DonationKey, DonationStatus};
use crate::foundation::{AccountId, CampaignId, Position};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Snapshot {
    /// Canonical campaign set keyed by 1-based ledger id.
    pub campaigns: BTreeMap<CampaignId, Campaign>,
    /// Donation history, newest first. Contains confirmed entries plus any
    /// optimistic (pending/stale) local entries.
    pub donations: Vec<Donation>,
    /// Idempotency keys of every confirmed donation already folded in.
    pub applied: BTreeSet<DonationKey>,
    /// Highest ledger position reflected in this snapshot.
    pub position: Position,
}

impl Snapshot {
    pub fn campaign(&self, id: CampaignId) -> Option<&Campaign> {
        self.campaigns.get(&id)
    }

    /// Campaigns not yet withdrawn.
    pub fn active_campaigns(&self) -> impl Iterator<Item = &Campaign> {
        self.campaigns.values().filter(|c| c.is_active())
    }

    pub fn campaigns_owned_by<'a>(&'a self, owner: &'a AccountId) -> impl Iterator<Item = &'a Campaign> {
        self.campaigns.values().filter(move |c| &c.owner == owner)
    }

    /// Donation history for one campaign, newest first.
    pub fn donations_for(&self, id: CampaignId) -> impl Iterator<Item = &Donation> {
        self.donations.iter().filter(move |d| d.campaign_id == id)
    }

    /// The locally-displayed raised total: the authoritative aggregate plus
    /// pending optimistic entries. Stale entries never count, and
    /// goal-completion logic must use `Campaign::raised` instead.
    pub fn displayed_raised(&self, id: CampaignId) -> Wei {
        let confirmed = self.campaigns.get(&id).map(|c| c.raised).unwrap_or(Wei::ZERO);
        self.donations
            .iter()
            .filter(|d| d.campaign_id == id && d.status == DonationStatus::Pending)
            .fold(confirmed, |acc, d| acc.checked_add(d.amount).unwrap_or(acc))
    }

    /// Recompute a campaign's aggregate from confirmed donations. Used to
    /// verify the conservation invariant
    /// (`raised == sum of confirmed donation amounts`).
    pub fn aggregated_raised(&self, id: CampaignId) -> Wei {
        self.donations
            .iter()
            .filter(|d| d.campaign_id == id && d.is_confirmed())
            .fold(Wei::ZERO, |acc, d| acc.checked_add(d.amount).unwrap_or(acc))
    }
}
