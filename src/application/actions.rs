//! User-initiated ledger writes: donate, create campaign, withdraw.
//!
//! Validation happens locally before any ledger write; a failed submission
//! leaves the published snapshot unchanged (the optimistic entry inserted
//! for responsiveness is rolled back).

use crate::application::sync::SyncService;
use crate::domain::{overlay, Wei};
use crate::foundation::{now_nanos, AccountId, CampaignId, Result, SyncError};
use crate::infrastructure::{SnapshotStore, TransactionCall, WalletClient};
use log::{info, warn};
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct NewCampaign {
    pub title: String,
    pub description: String,
    pub category: String,
    pub image_url: String,
    /// Major-unit decimal string, validated through the amount codec.
    pub goal: String,
}

pub struct ActionContext {
    wallet: Arc<dyn WalletClient>,
    sync: Arc<SyncService>,
}

impl ActionContext {
    pub fn new(wallet: Arc<dyn WalletClient>, sync: Arc<SyncService>) -> Self {
        Self { wallet, sync }
    }

    fn store(&self) -> &Arc<SnapshotStore> {
        self.sync.store()
    }

    /// Donate `amount_major` (major-unit decimal string) to a campaign.
    ///
    /// The donation appears immediately as an optimistic entry and is
    /// superseded by its confirming event once the sync loop observes it.
    pub async fn donate(&self, campaign_id: CampaignId, amount_major: &str) -> Result<()> {
        let amount = Wei::from_major_str(amount_major)?;
        if amount.is_zero() {
            return Err(SyncError::InvalidAmount("donation must be greater than zero".to_string()));
        }
        if self.store().campaign(campaign_id).is_none() {
            return Err(SyncError::Message(format!("unknown campaign {campaign_id}")));
        }
        let donor = self.wallet.active_identity().await?.ok_or(SyncError::NoActiveIdentity)?;

        self.store().update(|snapshot| {
            overlay::insert_optimistic(snapshot, donor.clone(), campaign_id, amount, now_nanos());
            true
        });

        match self.wallet.submit_transaction(TransactionCall::Donate { campaign_id, value: amount }).await {
            Ok(receipt) if receipt.confirmed => {
                info!("donation submitted donor={} campaign_id={} amount={}", donor, campaign_id, amount.display_major());
                self.refresh_after_write().await;
                Ok(())
            }
            Ok(_) => {
                self.rollback_optimistic(&donor, campaign_id, amount);
                Err(SyncError::TransactionFailed { action: "donate".to_string(), details: "transaction reverted".to_string() })
            }
            Err(err) => {
                self.rollback_optimistic(&donor, campaign_id, amount);
                Err(SyncError::TransactionFailed { action: "donate".to_string(), details: err.to_string() })
            }
        }
    }

    pub async fn create_campaign(&self, params: NewCampaign) -> Result<()> {
        let goal = Wei::from_major_str(&params.goal)?;
        if goal.is_zero() {
            return Err(SyncError::InvalidAmount("goal must be greater than zero".to_string()));
        }
        if params.title.trim().is_empty() {
            return Err(SyncError::Message("campaign title must not be empty".to_string()));
        }
        let owner = self.wallet.active_identity().await?.ok_or(SyncError::NoActiveIdentity)?;

        let call = TransactionCall::CreateCampaign {
            title: params.title,
            description: params.description,
            category: params.category,
            image_url: params.image_url,
            goal,
        };
        let receipt = self
            .wallet
            .submit_transaction(call)
            .await
            .map_err(|err| SyncError::TransactionFailed { action: "create_campaign".to_string(), details: err.to_string() })?;
        if !receipt.confirmed {
            return Err(SyncError::TransactionFailed { action: "create_campaign".to_string(), details: "transaction reverted".to_string() });
        }
        info!("campaign created owner={}", owner);
        self.refresh_after_write().await;
        Ok(())
    }

    pub async fn withdraw(&self, campaign_id: CampaignId) -> Result<()> {
        let identity = self.wallet.active_identity().await?.ok_or(SyncError::NoActiveIdentity)?;
        match self.store().campaign(campaign_id) {
            None => return Err(SyncError::Message(format!("unknown campaign {campaign_id}"))),
            Some(campaign) if campaign.owner != identity => {
                return Err(SyncError::Message(format!("only the owner can withdraw campaign {campaign_id}")))
            }
            Some(campaign) if campaign.withdrawn => {
                return Err(SyncError::Message(format!("campaign {campaign_id} already withdrawn")))
            }
            Some(_) => {}
        }

        let receipt = self
            .wallet
            .submit_transaction(TransactionCall::Withdraw { campaign_id })
            .await
            .map_err(|err| SyncError::TransactionFailed { action: "withdraw".to_string(), details: err.to_string() })?;
        if !receipt.confirmed {
            return Err(SyncError::TransactionFailed { action: "withdraw".to_string(), details: "transaction reverted".to_string() });
        }
        info!("withdrawal submitted campaign_id={} owner={}", campaign_id, identity);
        self.refresh_after_write().await;
        Ok(())
    }

    fn rollback_optimistic(&self, donor: &AccountId, campaign_id: CampaignId, amount: Wei) {
        self.store().update(|snapshot| overlay::remove_optimistic(snapshot, donor, campaign_id, amount));
    }

    /// A reload failure here is transient; the cadence tick retries it and
    /// the submitted write is already on the ledger.
    async fn refresh_after_write(&self) {
        if let Err(err) = self.sync.force_reload().await {
            warn!("post-write reload failed error={}", err);
        }
    }
}
