//! Nonce sequencing for the single signing account.
//!
//! All concurrent dispense attempts draw their transaction nonce from one
//! [`NonceSequencer`]. The cached counter is bootstrapped lazily from the
//! chain's authoritative account transaction count and advanced under a
//! single async mutex, so two concurrent [`NonceSequencer::acquire`] calls
//! can never hand out the same value. The cache is per-process; running more
//! than one engine instance against the same signing account requires a
//! shared atomic counter instead.

use crate::chain::{ChainClient, ChainError};
use alloy::primitives::Address;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Hands out monotonically increasing nonces for one signing account.
pub struct NonceSequencer {
    account: Address,
    chain: Arc<dyn ChainClient>,
    /// `None` = cache miss; next acquire bootstraps from the chain.
    cached: Mutex<Option<u64>>,
}

impl NonceSequencer {
    pub fn new(account: Address, chain: Arc<dyn ChainClient>) -> Self {
        Self {
            account,
            chain,
            cached: Mutex::new(None),
        }
    }

    /// The signing account this sequencer allocates for.
    pub fn account(&self) -> Address {
        self.account
    }

    /// Take the next nonce and advance the cache.
    ///
    /// On cache miss the authoritative transaction count is fetched while the
    /// lock is held; the fetch is part of the critical section, otherwise two
    /// bootstrapping callers could both observe and return the same count.
    pub async fn acquire(&self) -> Result<u64, ChainError> {
        let mut cached = self.cached.lock().await;
        let nonce = match *cached {
            Some(next) => next,
            None => {
                let next = self.chain.account_nonce(self.account).await?;
                debug!(account = %self.account, nonce = next, "bootstrapped nonce cache");
                next
            }
        };
        *cached = Some(nonce + 1);
        Ok(nonce)
    }

    /// Overwrite the cache with the authoritative count, undoing drift after
    /// a failed broadcast (a failed broadcast does not consume its nonce).
    pub async fn release(&self, correct_nonce: u64) {
        let mut cached = self.cached.lock().await;
        if *cached != Some(correct_nonce) {
            warn!(
                account = %self.account,
                cached = ?*cached,
                correct = correct_nonce,
                "resynchronizing nonce cache"
            );
        }
        *cached = Some(correct_nonce);
    }

    /// Drop the cached value entirely; the next acquire re-bootstraps.
    pub async fn invalidate(&self) {
        *self.cached.lock().await = None;
    }

    /// Diagnostic view of the cached next nonce, if any.
    pub async fn peek(&self) -> Option<u64> {
        *self.cached.lock().await
    }
}
