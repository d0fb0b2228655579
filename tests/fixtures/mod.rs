//! Shared test fixtures: an in-memory ledger, a scripted wallet, and
//! builders for campaign records and positioned events.
#![allow(dead_code)]

use async_trait::async_trait;
use fundsync::application::SyncService;
use fundsync::domain::{CampaignRecord, LedgerEvent, PositionedEvent, Wei};
use fundsync::foundation::{AccountId, CampaignId, Position};
use fundsync::infrastructure::config::SyncConfig;
use fundsync::infrastructure::{LedgerClient, Receipt, SnapshotStore, TransactionCall, WalletClient};
use fundsync::{Result, SyncError};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

/// Parks one `list_campaigns` call: signals entry, then waits for release.
struct ListGate {
    entered: oneshot::Sender<()>,
    release: oneshot::Receiver<()>,
}

/// In-memory ledger with scriptable failures and a query log.
pub struct MockLedger {
    campaigns: Mutex<Vec<CampaignRecord>>,
    events: Mutex<Vec<PositionedEvent>>,
    position: AtomicU64,
    /// 0 disables the window limit.
    pub max_query_window: u64,
    fail_next_query: AtomicBool,
    fail_next_position: AtomicBool,
    list_gate: Mutex<Option<ListGate>>,
    query_log: Mutex<Vec<(u64, u64)>>,
}

impl MockLedger {
    pub fn new(max_query_window: u64) -> Self {
        Self {
            campaigns: Mutex::new(Vec::new()),
            events: Mutex::new(Vec::new()),
            position: AtomicU64::new(0),
            max_query_window,
            fail_next_query: AtomicBool::new(false),
            fail_next_position: AtomicBool::new(false),
            list_gate: Mutex::new(None),
            query_log: Mutex::new(Vec::new()),
        }
    }

    /// Arrange for the next `list_campaigns` call to block mid-flight.
    ///
    /// Returns a receiver that fires when the call is parked and a sender
    /// that lets it proceed.
    pub fn gate_next_list_campaigns(&self) -> (oneshot::Receiver<()>, oneshot::Sender<()>) {
        let (entered_tx, entered_rx) = oneshot::channel();
        let (release_tx, release_rx) = oneshot::channel();
        *self.list_gate.lock().unwrap() = Some(ListGate { entered: entered_tx, release: release_rx });
        (entered_rx, release_tx)
    }

    pub fn set_campaigns(&self, records: Vec<CampaignRecord>) {
        *self.campaigns.lock().unwrap() = records;
    }

    /// Append an event and advance the ledger head to its position.
    pub fn push_event(&self, event: PositionedEvent) {
        self.position.fetch_max(event.position.value(), Ordering::SeqCst);
        self.events.lock().unwrap().push(event);
    }

    pub fn set_position(&self, position: u64) {
        self.position.store(position, Ordering::SeqCst);
    }

    pub fn fail_next_query(&self) {
        self.fail_next_query.store(true, Ordering::SeqCst);
    }

    pub fn fail_next_position(&self) {
        self.fail_next_position.store(true, Ordering::SeqCst);
    }

    pub fn queried_windows(&self) -> Vec<(u64, u64)> {
        self.query_log.lock().unwrap().clone()
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn list_campaigns(&self) -> Result<Vec<CampaignRecord>> {
        let gate = self.list_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            let _ = gate.entered.send(());
            let _ = gate.release.await;
        }
        Ok(self.campaigns.lock().unwrap().clone())
    }

    async fn query_events(&self, from: Position, to: Position) -> Result<Vec<PositionedEvent>> {
        if self.fail_next_query.swap(false, Ordering::SeqCst) {
            return Err(SyncError::LedgerUnavailable { details: "scripted query failure".to_string() });
        }
        let span = to.value().saturating_sub(from.value()).saturating_add(1);
        if self.max_query_window > 0 && span > self.max_query_window {
            return Err(SyncError::LedgerQueryTooLarge { from: from.value(), to: to.value(), limit: self.max_query_window });
        }
        self.query_log.lock().unwrap().push((from.value(), to.value()));
        let events = self
            .events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.position >= from && e.position <= to)
            .cloned()
            .collect();
        Ok(events)
    }

    async fn current_position(&self) -> Result<Position> {
        if self.fail_next_position.swap(false, Ordering::SeqCst) {
            return Err(SyncError::LedgerUnavailable { details: "scripted position failure".to_string() });
        }
        Ok(Position::new(self.position.load(Ordering::SeqCst)))
    }
}

/// Wallet that records submissions and can be scripted to fail.
pub struct MockWallet {
    identity: Option<AccountId>,
    fail_next_submit: AtomicBool,
    submitted: Mutex<Vec<TransactionCall>>,
}

impl MockWallet {
    pub fn connected(identity: &str) -> Self {
        Self { identity: Some(AccountId::from(identity)), fail_next_submit: AtomicBool::new(false), submitted: Mutex::new(Vec::new()) }
    }

    pub fn disconnected() -> Self {
        Self { identity: None, fail_next_submit: AtomicBool::new(false), submitted: Mutex::new(Vec::new()) }
    }

    pub fn fail_next_submit(&self) {
        self.fail_next_submit.store(true, Ordering::SeqCst);
    }

    pub fn submitted(&self) -> Vec<TransactionCall> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl WalletClient for MockWallet {
    async fn active_identity(&self) -> Result<Option<AccountId>> {
        Ok(self.identity.clone())
    }

    async fn submit_transaction(&self, call: TransactionCall) -> Result<Receipt> {
        if self.fail_next_submit.swap(false, Ordering::SeqCst) {
            return Err(SyncError::Message("scripted submit failure".to_string()));
        }
        self.submitted.lock().unwrap().push(call);
        Ok(Receipt { confirmed: true, position: None })
    }
}

pub fn major(amount: &str) -> Wei {
    Wei::from_major_str(amount).unwrap()
}

pub fn campaign_record(id: u64, owner: &str, goal_major: &str, raised_major: &str, withdrawn: bool) -> CampaignRecord {
    CampaignRecord {
        id: CampaignId::new(id),
        title: format!("campaign {id}"),
        description: "a cause".to_string(),
        category: "general".to_string(),
        image_url: "https://img.example/c.png".to_string(),
        goal: major(goal_major),
        ledger_raised: major(raised_major),
        owner: AccountId::from(owner),
        withdrawn,
    }
}

pub fn created(position: u64, campaign: u64, owner: &str) -> PositionedEvent {
    PositionedEvent {
        position: Position::new(position),
        log_index: 0,
        timestamp_nanos: position * 1_000_000_000,
        event: LedgerEvent::CampaignCreated { campaign_id: CampaignId::new(campaign), owner: AccountId::from(owner) },
    }
}

pub fn donated(position: u64, log_index: u32, campaign: u64, donor: &str, amount_major: &str) -> PositionedEvent {
    donated_at(position, log_index, campaign, donor, amount_major, position * 1_000_000_000)
}

pub fn donated_at(position: u64, log_index: u32, campaign: u64, donor: &str, amount_major: &str, timestamp_nanos: u64) -> PositionedEvent {
    PositionedEvent {
        position: Position::new(position),
        log_index,
        timestamp_nanos,
        event: LedgerEvent::Donated { campaign_id: CampaignId::new(campaign), donor: AccountId::from(donor), amount: major(amount_major) },
    }
}

pub fn withdrawn(position: u64, campaign: u64, amount_major: &str) -> PositionedEvent {
    PositionedEvent {
        position: Position::new(position),
        log_index: 0,
        timestamp_nanos: position * 1_000_000_000,
        event: LedgerEvent::Withdrawn { campaign_id: CampaignId::new(campaign), amount: major(amount_major) },
    }
}

pub fn sync_config(match_window_seconds: u64) -> SyncConfig {
    SyncConfig {
        node_rpc_url: "mock://ledger".to_string(),
        poll_interval_seconds: 1,
        max_query_window: 0,
        match_window_seconds,
        orphan_retry_cycles: 3,
    }
}

pub fn service_with(ledger: Arc<MockLedger>, match_window_seconds: u64) -> (Arc<SyncService>, Arc<SnapshotStore>) {
    let store = Arc::new(SnapshotStore::new());
    let service = Arc::new(SyncService::new(ledger, store.clone(), sync_config(match_window_seconds)));
    (service, store)
}
