//! Wallet/signing boundary.
//!
//! The core never signs anything; it consumes this capability and inspects
//! the receipt to decide between optimistic and pessimistic updates.

use crate::domain::Wei;
use crate::foundation::{AccountId, CampaignId, Position, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A ledger write the user can request. The contract addresses campaigns by
/// 0-based index; callers pass the canonical 1-based id and the wallet
/// adapter applies `CampaignId::contract_index` exactly once.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub enum TransactionCall {
    Donate { campaign_id: CampaignId, value: Wei },
    CreateCampaign { title: String, description: String, category: String, image_url: String, goal: Wei },
    Withdraw { campaign_id: CampaignId },
}

impl TransactionCall {
    pub fn action_name(&self) -> &'static str {
        match self {
            TransactionCall::Donate { .. } => "donate",
            TransactionCall::CreateCampaign { .. } => "create_campaign",
            TransactionCall::Withdraw { .. } => "withdraw",
        }
    }
}

/// Submission outcome as reported by the wallet provider.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Receipt {
    pub confirmed: bool,
    /// Position of the including block when the provider reports one.
    pub position: Option<Position>,
}

#[async_trait]
pub trait WalletClient: Send + Sync {
    /// The currently connected identity, if any.
    async fn active_identity(&self) -> Result<Option<AccountId>>;

    /// Sign and submit a transaction; resolves once the provider reports a
    /// receipt or a failure.
    async fn submit_transaction(&self, call: TransactionCall) -> Result<Receipt>;
}
