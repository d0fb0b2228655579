//! Infrastructure layer: edges of the system (ledger transport, wallet
//! capability, snapshot store, config, logging).

pub mod config;
pub mod ledger;
pub mod logging;
pub mod store;
pub mod wallet;

pub use ledger::{LedgerClient, RpcLedgerClient};
pub use store::SnapshotStore;
pub use wallet::{Receipt, TransactionCall, WalletClient};
