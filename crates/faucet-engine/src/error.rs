//! Error types for dispense attempts.

use crate::chain::ChainError;
use crate::ledger::LedgerError;
use thiserror::Error;

/// Outcome kinds a dispense attempt can fail with.
///
/// `RateLimited` is an expected control-flow outcome, not a fault. `Broadcast`
/// is recovered by recording the failure and resynchronizing the nonce, then
/// surfaced. `LedgerWrite` is the one genuinely fatal condition: the engine
/// cannot claim success without a durable record.
#[derive(Error, Debug)]
pub enum DispenseError {
    #[error("rate limit exceeded, try again later")]
    RateLimited,

    #[error("failed to fetch account nonce: {0}")]
    NonceFetch(#[source] ChainError),

    #[error("broadcast failed: {0}")]
    Broadcast(#[source] ChainError),

    #[error("ledger write failed: {0}")]
    LedgerWrite(#[from] LedgerError),
}

/// Result type alias for engine operations.
pub type DispenseResult<T> = Result<T, DispenseError>;
