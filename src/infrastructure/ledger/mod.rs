//! Ledger client boundary: read calls and event queries against the
//! external append-only ledger.

pub mod decode;
pub mod json_rpc;

use crate::domain::{CampaignRecord, PositionedEvent};
use crate::foundation::{Position, Result, SyncError};
use async_trait::async_trait;
use log::debug;
use serde_json::json;

/// Read-side capability over the crowdfunding ledger.
///
/// Implementations must return events in ledger order (ascending position,
/// stable sub-order within a position) and guarantee at-least-once delivery
/// inside a requested range; the reconciler handles replays.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Full snapshot read of every campaign. The ledger returns the complete
    /// set; no pagination cursor exists.
    async fn list_campaigns(&self) -> Result<Vec<CampaignRecord>>;

    /// Events in the inclusive position range `[from, to]`.
    async fn query_events(&self, from: Position, to: Position) -> Result<Vec<PositionedEvent>>;

    /// The ledger's current (monotonic) position.
    async fn current_position(&self) -> Result<Position>;
}

/// `LedgerClient` over a JSON-RPC transport.
pub struct RpcLedgerClient {
    transport: json_rpc::JsonRpcTransport,
    max_query_window: u64,
}

impl RpcLedgerClient {
    pub fn new(transport: json_rpc::JsonRpcTransport, max_query_window: u64) -> Self {
        Self { transport, max_query_window }
    }
}

#[async_trait]
impl LedgerClient for RpcLedgerClient {
    async fn list_campaigns(&self) -> Result<Vec<CampaignRecord>> {
        let value = self.transport.call("fund_listCampaigns", json!([])).await?;
        let rows = value.as_array().ok_or_else(|| SyncError::MalformedResponse("campaign list is not an array".to_string()))?;
        let mut records = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            records.push(decode::decode_campaign(index, row)?);
        }
        debug!("campaign list fetched count={}", records.len());
        Ok(records)
    }

    async fn query_events(&self, from: Position, to: Position) -> Result<Vec<PositionedEvent>> {
        let span = to.value().saturating_sub(from.value()).saturating_add(1);
        if span > self.max_query_window {
            return Err(SyncError::LedgerQueryTooLarge { from: from.value(), to: to.value(), limit: self.max_query_window });
        }
        let value = self.transport.call("fund_queryEvents", json!([from.value(), to.value()])).await?;
        let rows = value.as_array().ok_or_else(|| SyncError::MalformedResponse("event list is not an array".to_string()))?;
        let mut events = Vec::with_capacity(rows.len());
        for row in rows {
            events.push(decode::decode_event(row)?);
        }
        debug!("events fetched from={} to={} count={}", from, to, events.len());
        Ok(events)
    }

    async fn current_position(&self) -> Result<Position> {
        let value = self.transport.call("fund_currentPosition", json!([])).await?;
        decode::decode_position(&value)
    }
}
