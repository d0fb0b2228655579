//! System-wide constants for fundsync.

/// Nanoseconds per second (10^9).
pub const NANOS_PER_SECOND: u64 = 1_000_000_000;

/// Minor units per major unit (10^18, the ledger's fixed 18-decimal scale).
pub const MINOR_UNITS_PER_MAJOR: u64 = 1_000_000_000_000_000_000;

/// Fractional digits in the minor-unit scale.
pub const MINOR_UNIT_DECIMALS: u32 = 18;

/// Decimal places kept when rendering an amount at the presentation boundary.
///
/// Rounding to this precision happens only in `Wei::display_major`; every
/// intermediate computation stays in exact minor units.
pub const DISPLAY_DECIMALS: u32 = 4;

/// Default cadence of the steady-state sync tick, in seconds.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 4;

/// Default maximum span (in positions) of a single event query.
///
/// Queries wider than the configured limit fail with `LedgerQueryTooLarge`
/// and are split in half by the sync loop.
pub const DEFAULT_MAX_QUERY_WINDOW: u64 = 2_000;

/// Default reconciliation window for optimistic donations, in seconds.
///
/// Pending entries older than this are no longer matched against confirmed
/// events and are flagged stale.
pub const DEFAULT_MATCH_WINDOW_SECS: u64 = 180;

/// Default number of sync cycles a donation for an unknown campaign is
/// retried before it is reported as an orphaned event.
pub const DEFAULT_ORPHAN_RETRY_CYCLES: u32 = 3;
