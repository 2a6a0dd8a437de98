//! # Faucet Engine
//!
//! Transaction dispatch and rate-limiting engine for a testnet faucet. The
//! engine decides whether a dispense request is allowed given recent history,
//! serializes access to the single signing account's nonce so concurrent
//! requests produce valid non-colliding transactions, and durably records
//! every attempt for auditing and statistics.
//!
//! ## Components
//!
//! - [`ledger`] — append-only record of every dispense attempt, with recency
//!   and windowed-count queries.
//! - [`nonce`] — cached nonce sequencer for the one signing account,
//!   bootstrapped from the chain and advanced under a mutex.
//! - [`ratelimit`] — cooldown enforcement keyed on either the caller's
//!   network identity or the destination wallet.
//! - [`dispatch`] — orchestration: limit check, nonce acquisition, broadcast,
//!   outcome recording, nonce resynchronization on failure.
//! - [`stats`] — windowed success/failure counts.
//! - [`chain`] — the external chain-client boundary the engine broadcasts
//!   through.
//!
//! The HTTP surface, configuration, and the alloy-backed chain client live in
//! the `faucet-server` crate; this crate is the part with the concurrency and
//! consistency obligations.

pub mod chain;
pub mod dispatch;
pub mod error;
pub mod ledger;
pub mod nonce;
pub mod ratelimit;
pub mod stats;

pub use chain::{ChainClient, ChainError};
pub use dispatch::Dispatcher;
pub use error::{DispenseError, DispenseResult};
pub use ledger::{DispenseRecord, JsonlLedger, Ledger, LedgerError, MemoryLedger, RecordId};
pub use nonce::NonceSequencer;
pub use ratelimit::RateLimiter;
pub use stats::{window_stats, WindowStats};
