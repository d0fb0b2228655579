//! Application layer: orchestration of the sync loop and user actions.

pub mod actions;
pub mod sync;

pub use actions::{ActionContext, NewCampaign};
pub use sync::{SyncHandle, SyncService, SyncState};
