//! Cooldown enforcement.

use crate::ledger::Ledger;
use alloy::primitives::Address;
use chrono::{DateTime, Duration, Utc};
use std::net::IpAddr;
use tracing::debug;

/// Enforces a minimum elapsed time between successful dispenses attributed
/// to the same identity. Only successes count; a requester whose attempts
/// keep failing is never throttled by them.
#[derive(Debug, Clone, Copy)]
pub struct RateLimiter {
    cooldown: Duration,
}

impl RateLimiter {
    pub fn new(cooldown: Duration) -> Self {
        Self { cooldown }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// True when a successful dispense for either identity happened less than
    /// one cooldown ago. The boundary is strict: exactly one cooldown elapsed
    /// means the requester is no longer limited.
    pub fn is_limited(
        &self,
        ledger: &dyn Ledger,
        network_identity: IpAddr,
        wallet_identity: Address,
        now: DateTime<Utc>,
    ) -> bool {
        debug!(network = %network_identity, wallet = %wallet_identity, "checking rate limit");
        match ledger.most_recent_success(network_identity, wallet_identity) {
            Some(record) => now - record.requested_at < self.cooldown,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{DispenseRecord, MemoryLedger};
    use std::net::Ipv4Addr;

    const IP: IpAddr = IpAddr::V4(Ipv4Addr::new(192, 0, 2, 7));

    fn wallet() -> Address {
        Address::repeat_byte(0x42)
    }

    #[test]
    fn test_empty_ledger_is_not_limited() {
        let ledger = MemoryLedger::new();
        let limiter = RateLimiter::new(Duration::minutes(10));
        assert!(!limiter.is_limited(&ledger, IP, wallet(), Utc::now()));
    }

    #[test]
    fn test_recent_success_limits_until_cooldown_elapses() {
        let ledger = MemoryLedger::new();
        let limiter = RateLimiter::new(Duration::minutes(10));
        let start = Utc::now();

        ledger.append(DispenseRecord::success(IP, wallet(), start)).unwrap();

        assert!(limiter.is_limited(&ledger, IP, wallet(), start + Duration::minutes(9)));
        // Exactly at the boundary: strict less-than, so no longer limited.
        assert!(!limiter.is_limited(&ledger, IP, wallet(), start + Duration::minutes(10)));
        assert!(!limiter.is_limited(&ledger, IP, wallet(), start + Duration::minutes(11)));
    }

    #[test]
    fn test_either_identity_triggers_cooldown() {
        let ledger = MemoryLedger::new();
        let limiter = RateLimiter::new(Duration::minutes(10));
        let start = Utc::now();

        ledger.append(DispenseRecord::success(IP, wallet(), start)).unwrap();

        let other_ip = IpAddr::V4(Ipv4Addr::new(198, 51, 100, 1));
        let other_wallet = Address::repeat_byte(0x99);

        // Same wallet from a new network identity: still limited.
        assert!(limiter.is_limited(&ledger, other_ip, wallet(), start + Duration::minutes(1)));
        // Same network identity to a new wallet: still limited.
        assert!(limiter.is_limited(&ledger, IP, other_wallet, start + Duration::minutes(1)));
        // Both fresh: not limited.
        assert!(!limiter.is_limited(&ledger, other_ip, other_wallet, start + Duration::minutes(1)));
    }

    #[test]
    fn test_failures_never_throttle() {
        let ledger = MemoryLedger::new();
        let limiter = RateLimiter::new(Duration::minutes(10));
        let start = Utc::now();

        for i in 0..5 {
            ledger
                .append(DispenseRecord::failure(IP, wallet(), "rpc timeout", start + Duration::seconds(i)))
                .unwrap();
        }

        assert!(!limiter.is_limited(&ledger, IP, wallet(), start + Duration::seconds(10)));
    }
}
