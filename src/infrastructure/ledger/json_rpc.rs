//! Minimal JSON-RPC 2.0 request/response transport over HTTP.

use crate::foundation::{Result, SyncError};
use log::trace;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

pub struct JsonRpcTransport {
    client: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl JsonRpcTransport {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| SyncError::ConfigError(format!("http client: {err}")))?;
        Ok(Self { client, url: url.into(), next_id: AtomicU64::new(1) })
    }

    /// Issue one request/response call. Transport failures map to
    /// `LedgerUnavailable`; protocol violations to `MalformedResponse`.
    pub async fn call(&self, method: &str, params: Value) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params });
        trace!("rpc call method={} id={}", method, id);

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|err| SyncError::LedgerUnavailable { details: format!("{method}: {err}") })?;
        let envelope: Value = response
            .json()
            .await
            .map_err(|err| SyncError::LedgerUnavailable { details: format!("{method}: {err}") })?;

        if let Some(error) = envelope.get("error") {
            if !error.is_null() {
                return Err(SyncError::LedgerUnavailable { details: format!("{method}: rpc error {error}") });
            }
        }
        match envelope.get("result") {
            Some(result) => Ok(result.clone()),
            None => Err(SyncError::MalformedResponse(format!("{method}: response has no result"))),
        }
    }
}
