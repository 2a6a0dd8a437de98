//! Dispense orchestration.
//!
//! One [`Dispatcher::dispense`] call is one best-effort broadcast attempt:
//! rate-limit check, nonce acquisition, broadcast through the chain client,
//! outcome written to the ledger, nonce resynchronized if the broadcast
//! failed. There is no internal retry and no deduplication; two identical
//! calls are two independent attempts.

use crate::chain::ChainClient;
use crate::error::{DispenseError, DispenseResult};
use crate::ledger::{DispenseRecord, Ledger};
use crate::nonce::NonceSequencer;
use crate::ratelimit::RateLimiter;
use alloy::primitives::{Address, TxHash};
use chrono::{DateTime, Utc};
use std::net::IpAddr;
use std::sync::Arc;
use tracing::{info, warn};

/// Orchestrates dispense attempts against a single signing account.
pub struct Dispatcher {
    ledger: Arc<dyn Ledger>,
    chain: Arc<dyn ChainClient>,
    nonces: Arc<NonceSequencer>,
    limiter: RateLimiter,
}

impl Dispatcher {
    pub fn new(
        ledger: Arc<dyn Ledger>,
        chain: Arc<dyn ChainClient>,
        nonces: Arc<NonceSequencer>,
        limiter: RateLimiter,
    ) -> Self {
        Self {
            ledger,
            chain,
            nonces,
            limiter,
        }
    }

    /// The nonce sequencer this dispatcher draws from.
    pub fn nonces(&self) -> &NonceSequencer {
        &self.nonces
    }

    /// Dispense the fixed payout to `wallet_identity`.
    pub async fn dispense(&self, network_identity: IpAddr, wallet_identity: Address) -> DispenseResult<TxHash> {
        self.dispense_at(network_identity, wallet_identity, Utc::now()).await
    }

    /// Deterministic entry point: `now` is both the rate-limit reference time
    /// and the `requested_at` stamp of the resulting record.
    ///
    /// Every call writes exactly one ledger record, except a rate-limited
    /// rejection, which writes nothing and touches no nonce.
    pub async fn dispense_at(
        &self,
        network_identity: IpAddr,
        wallet_identity: Address,
        now: DateTime<Utc>,
    ) -> DispenseResult<TxHash> {
        if self
            .limiter
            .is_limited(self.ledger.as_ref(), network_identity, wallet_identity, now)
        {
            info!(network = %network_identity, wallet = %wallet_identity, "dispense rate limited");
            return Err(DispenseError::RateLimited);
        }

        // Bootstrap fetch failure means no attempt was truly made: nothing is
        // recorded.
        let nonce = self.nonces.acquire().await.map_err(DispenseError::NonceFetch)?;

        match self.chain.broadcast_transfer(wallet_identity, nonce).await {
            Ok(tx_hash) => {
                self.ledger
                    .append(DispenseRecord::success(network_identity, wallet_identity, now))?;
                info!(wallet = %wallet_identity, nonce, tx = %tx_hash, "dispense succeeded");
                Ok(tx_hash)
            }
            Err(err) => {
                warn!(wallet = %wallet_identity, nonce, error = %err, "broadcast failed");
                let appended = self.ledger.append(DispenseRecord::failure(
                    network_identity,
                    wallet_identity,
                    err.to_string(),
                    now,
                ));
                // The failed broadcast did not consume its nonce; put the
                // cache back on the authoritative count before surfacing
                // anything, including a ledger fault.
                self.resync_nonce().await;
                appended?;
                Err(DispenseError::Broadcast(err))
            }
        }
    }

    async fn resync_nonce(&self) {
        match self.chain.account_nonce(self.nonces.account()).await {
            Ok(current) => self.nonces.release(current).await,
            Err(err) => {
                warn!(error = %err, "authoritative nonce re-fetch failed, invalidating cache");
                self.nonces.invalidate().await;
            }
        }
    }
}
