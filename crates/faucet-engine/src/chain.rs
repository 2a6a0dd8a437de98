//! Chain client boundary.
//!
//! The engine never speaks the wire protocol itself; it calls out through
//! [`ChainClient`] for the two things it needs from the network: the
//! authoritative transaction count of the signing account, and a single
//! best-effort broadcast of a signed transfer. Broadcast failures come back
//! as a typed [`ChainError`], so the dispatcher's failure path is an explicit
//! branch rather than a catch-all.

use alloy::primitives::{Address, TxHash};
use async_trait::async_trait;
use thiserror::Error;

/// Errors surfaced by a chain client.
#[derive(Error, Debug, Clone)]
pub enum ChainError {
    /// The RPC endpoint could not be reached or returned a transport-level
    /// failure.
    #[error("chain transport error: {0}")]
    Transport(String),

    /// The node accepted the request but rejected the transaction (bad
    /// signature, invalid address, underpriced, nonce conflict, ...).
    #[error("{0}")]
    Rejected(String),
}

/// External collaborator that talks to the chain network.
///
/// Implementations hold the signing key and the fixed transfer parameters
/// (value, gas, chain id); the engine only supplies the destination and the
/// nonce it allocated.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Authoritative current transaction count (the next valid nonce) for an
    /// account.
    async fn account_nonce(&self, account: Address) -> Result<u64, ChainError>;

    /// Sign and submit the fixed-value transfer to `to` using `nonce`.
    /// One attempt, no internal retry.
    async fn broadcast_transfer(&self, to: Address, nonce: u64) -> Result<TxHash, ChainError>;
}
