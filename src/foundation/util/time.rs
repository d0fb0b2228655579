use std::time::{SystemTime, UNIX_EPOCH};

/// Returns the current wall-clock timestamp in nanoseconds.
pub fn now_nanos() -> u64 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(now) => now.as_secs().saturating_mul(1_000_000_000).saturating_add(u64::from(now.subsec_nanos())),
        Err(_) => 0,
    }
}

pub fn secs_to_nanos(secs: u64) -> u64 {
    secs.saturating_mul(crate::foundation::constants::NANOS_PER_SECOND)
}
