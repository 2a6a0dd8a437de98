//! Windowed success/failure counts over the ledger.

use crate::ledger::Ledger;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Aggregate outcome counts for one window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WindowStats {
    pub succeeded: u64,
    pub failed: u64,
}

/// Count successes and failures over the half-open interval
/// `[now - window, now)`. Pure read; two independent ledger scans, no locking
/// beyond the ledger's own read consistency.
pub fn window_stats(ledger: &dyn Ledger, window: Duration, now: DateTime<Utc>) -> WindowStats {
    let since = now - window;
    WindowStats {
        succeeded: ledger.count_in_window(true, since, now) as u64,
        failed: ledger.count_in_window(false, since, now) as u64,
    }
}
