//! Domain layer: pure synchronization logic with no I/O.

pub mod amount;
pub mod model;
pub mod overlay;
pub mod reconcile;
pub mod snapshot;

pub use amount::Wei;
pub use model::{Campaign, CampaignRecord, Donation, DonationKey, DonationStatus, LedgerEvent, PositionedEvent};
pub use reconcile::Reconciler;
pub use snapshot::Snapshot;
