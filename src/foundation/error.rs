use thiserror::Error;

pub type Result<T> = std::result::Result<T, SyncError>;

#[derive(Debug, Clone, Error)]
pub enum SyncError {
    #[error("ledger unavailable: {details}")]
    LedgerUnavailable { details: String },

    #[error("event query window [{from}, {to}] exceeds limit {limit}")]
    LedgerQueryTooLarge { from: u64, to: u64, limit: u64 },

    #[error("malformed ledger response: {0}")]
    MalformedResponse(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("no active wallet identity")]
    NoActiveIdentity,

    #[error("{action} transaction failed: {details}")]
    TransactionFailed { action: String, details: String },

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("{0}")]
    Message(String),
}

impl SyncError {
    /// Transient failures are recovered locally by the sync loop and never
    /// surfaced as fatal to consumers.
    pub fn is_transient(&self) -> bool {
        matches!(self, SyncError::LedgerUnavailable { .. } | SyncError::LedgerQueryTooLarge { .. })
    }
}

/// Data-integrity finding recorded for diagnostics.
///
/// Anomalies never halt synchronization; the reconciler returns them and the
/// sync loop logs them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Anomaly {
    /// An event referenced a campaign that never materialized within the
    /// bounded retry budget. `donor` is set for donation events only.
    OrphanedEvent { kind: &'static str, campaign_id: u64, donor: Option<String>, position: u64, log_index: u32 },
    /// An optimistic entry and a confirmed event disagreed on amount for the
    /// same donor and campaign inside the match window. The confirmed event
    /// wins; the optimistic entry is discarded.
    ReconciliationConflict { campaign_id: u64, donor: String, optimistic_amount: String, confirmed_amount: String },
    /// The ledger's own raised counter and the event aggregation disagree.
    /// The aggregation is authoritative.
    RaisedMismatch { campaign_id: u64, ledger_raised: String, aggregated_raised: String },
}

impl std::fmt::Display for Anomaly {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Anomaly::OrphanedEvent { kind, campaign_id, donor, position, log_index } => {
                write!(f, "orphaned event kind={kind} campaign_id={campaign_id} position={position} log_index={log_index}")?;
                if let Some(donor) = donor {
                    write!(f, " donor={donor}")?;
                }
                Ok(())
            }
            Anomaly::ReconciliationConflict { campaign_id, donor, optimistic_amount, confirmed_amount } => {
                write!(
                    f,
                    "reconciliation conflict campaign_id={campaign_id} donor={donor} optimistic_amount={optimistic_amount} confirmed_amount={confirmed_amount}"
                )
            }
            Anomaly::RaisedMismatch { campaign_id, ledger_raised, aggregated_raised } => {
                write!(f, "raised mismatch campaign_id={campaign_id} ledger_raised={ledger_raised} aggregated_raised={aggregated_raised}")
            }
        }
    }
}
