//! Headless sync daemon: keeps a live snapshot of the crowdfunding ledger
//! and logs summaries as it changes.

use fundsync::application::SyncService;
use fundsync::infrastructure::config::load_config;
use fundsync::infrastructure::ledger::json_rpc::JsonRpcTransport;
use fundsync::infrastructure::logging::init_logger;
use fundsync::infrastructure::{RpcLedgerClient, SnapshotStore};
use fundsync::Result;
use log::info;
use std::path::PathBuf;
use std::sync::Arc;

const CONFIG_PATH_ENV: &str = "FUNDSYNC_CONFIG_PATH";

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::var(CONFIG_PATH_ENV).map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("fundsync.toml"));
    let config = load_config(&config_path)?;
    init_logger(config.logging.log_dir.as_deref(), &config.logging.filters);
    info!("fundsyncd starting node_rpc_url={} poll_interval_seconds={}", config.sync.node_rpc_url, config.sync.poll_interval_seconds);

    let transport = JsonRpcTransport::new(config.sync.node_rpc_url.clone())?;
    let ledger = Arc::new(RpcLedgerClient::new(transport, config.sync.max_query_window));
    let store = Arc::new(SnapshotStore::new());
    let service = Arc::new(SyncService::new(ledger, store.clone(), config.sync));
    let _handle = service.spawn();

    let mut changes = store.subscribe();
    loop {
        if changes.changed().await.is_err() {
            break;
        }
        let snapshot = store.current();
        let active = snapshot.active_campaigns().count();
        info!(
            "snapshot updated position={} campaign_count={} active_count={} donation_count={}",
            snapshot.position,
            snapshot.campaigns.len(),
            active,
            snapshot.donations.len()
        );
    }
    Ok(())
}
