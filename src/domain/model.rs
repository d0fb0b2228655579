use crate::domain::amount::Wei;
use crate::foundation::{AccountId, CampaignId, Position};
use serde::{Deserialize, Serialize};

/// A fundraising campaign as materialized from the ledger.
///
/// Display fields are immutable after creation. `raised` is derived by
/// folding confirmed donation events and is monotonically non-decreasing;
/// `withdrawn` transitions false -> true exactly once and never reverses.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Campaign {
    pub id: CampaignId,
    pub title: String,
    pub description: String,
    pub category: String,
    pub image_url: String,
    pub goal: Wei,
    pub raised: Wei,
    pub owner: AccountId,
    pub withdrawn: bool,
}

impl Campaign {
    pub fn is_active(&self) -> bool {
        !self.withdrawn
    }

    /// Goal completion in whole percent, computed from the authoritative
    /// `raised` aggregate only (optimistic entries never count here).
    pub fn goal_percent(&self) -> u8 {
        self.raised.percent_of(self.goal)
    }
}

/// Confirmation state of a donation entry.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DonationStatus {
    /// Backed by an observed ledger event.
    Confirmed,
    /// Optimistic local entry awaiting its confirming event.
    Pending,
    /// Optimistic entry whose reconciliation window elapsed without a match.
    /// Retained for display but excluded from every total.
    Stale,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Donation {
    pub donor: AccountId,
    pub amount: Wei,
    pub campaign_id: CampaignId,
    /// Block wall-clock time for confirmed entries, local submission time
    /// for optimistic ones.
    pub timestamp_nanos: u64,
    pub status: DonationStatus,
}

impl Donation {
    pub fn is_confirmed(&self) -> bool {
        self.status == DonationStatus::Confirmed
    }
}

/// Events emitted by the crowdfunding ledger, in wire order.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum LedgerEvent {
    CampaignCreated { campaign_id: CampaignId, owner: AccountId },
    Donated { campaign_id: CampaignId, donor: AccountId, amount: Wei },
    Withdrawn { campaign_id: CampaignId, amount: Wei },
}

/// An event together with its ledger coordinates.
///
/// `position` + `log_index` give the ledger-defined total order; the client
/// preserves it and never re-sorts. `timestamp_nanos` is the containing
/// block's wall-clock time, resolved by the ledger adapter.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct PositionedEvent {
    pub position: Position,
    pub log_index: u32,
    pub timestamp_nanos: u64,
    pub event: LedgerEvent,
}

/// Idempotency key for a donation event: replaying the same event must not
/// double count.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Deserialize, Serialize)]
pub struct DonationKey {
    pub campaign_id: CampaignId,
    pub donor: AccountId,
    pub amount: Wei,
    pub position: Position,
    pub log_index: u32,
}

/// A campaign row as returned by the ledger's full snapshot read, including
/// the ledger's own raised counter. That counter is cross-checked against
/// event aggregation and never trusted on its own.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct CampaignRecord {
    pub id: CampaignId,
    pub title: String,
    pub description: String,
    pub category: String,
    pub image_url: String,
    pub goal: Wei,
    pub ledger_raised: Wei,
    pub owner: AccountId,
    pub withdrawn: bool,
}

impl CampaignRecord {
    /// Materialize a campaign with an empty aggregate; `raised` is rebuilt
    /// from donation events by the reconciler.
    pub fn into_campaign(self) -> Campaign {
        Campaign {
            id: self.id,
            title: self.title,
            description: self.description,
            category: self.category,
            image_url: self.image_url,
            goal: self.goal,
            raised: Wei::ZERO,
            owner: self.owner,
            withdrawn: self.withdrawn,
        }
    }
}
