//! Testnet Faucet Server - thin HTTP shell over the dispatch engine
//!
//! This crate provides an HTTP server around `faucet-engine`:
//! 1. Callers POST a wallet address to `/faucet/fund`
//! 2. The engine rate-limits per caller IP and wallet, allocates a nonce for
//!    the single signing account, and broadcasts the fixed payout
//! 3. Every attempt is recorded in the append-only dispense ledger
//! 4. `/faucet/stats` reports windowed success/failure counts

pub mod config;
pub mod error;
pub mod eth;
pub mod http;

pub use config::FaucetConfig;
pub use error::{ApiError, ApiResult};
