//! Append-only ledger of dispense attempts.
//!
//! Every attempt that reaches the broadcast stage lands here exactly once,
//! success and failure alike, and is never deleted. The ledger backs both the
//! rate limiter (most recent success per identity) and the stats aggregator
//! (windowed counts).

use alloy::primitives::Address;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::net::IpAddr;
use std::path::Path;
use std::sync::{Mutex, RwLock};
use thiserror::Error;
use tracing::{debug, info};

/// Position of a record in the ledger, in creation order.
pub type RecordId = u64;

/// One row per dispense attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispenseRecord {
    /// Caller's source network address.
    pub network_identity: IpAddr,
    /// Destination wallet address.
    pub wallet_identity: Address,
    /// Set at creation, immutable.
    pub requested_at: DateTime<Utc>,
    /// Bookkeeping stamp; records are immutable after creation, so this
    /// tracks `requested_at` in normal operation.
    pub updated_at: DateTime<Utc>,
    pub succeeded: bool,
    /// Present iff `succeeded == false`.
    pub failure_reason: Option<String>,
}

impl DispenseRecord {
    /// Record for an attempt whose broadcast was accepted.
    pub fn success(network_identity: IpAddr, wallet_identity: Address, requested_at: DateTime<Utc>) -> Self {
        Self {
            network_identity,
            wallet_identity,
            requested_at,
            updated_at: requested_at,
            succeeded: true,
            failure_reason: None,
        }
    }

    /// Record for an attempt whose broadcast was rejected or never reached
    /// the network. `reason` must be non-empty; it is what operators see.
    pub fn failure(
        network_identity: IpAddr,
        wallet_identity: Address,
        reason: impl Into<String>,
        requested_at: DateTime<Utc>,
    ) -> Self {
        Self {
            network_identity,
            wallet_identity,
            requested_at,
            updated_at: requested_at,
            succeeded: false,
            failure_reason: Some(reason.into()),
        }
    }
}

/// Ledger failures. Appends are the only fallible operation: an engine that
/// cannot write its record cannot safely claim anything about the attempt.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("ledger I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode ledger record: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("corrupt ledger line {line}: {message}")]
    Replay { line: usize, message: String },
}

/// Durable-store contract the engine depends on.
///
/// Reads are infallible by construction here (both implementations answer
/// queries from an in-memory index); only `append` can fail.
pub trait Ledger: Send + Sync {
    /// Append one record, returning its position in the ledger.
    fn append(&self, record: DispenseRecord) -> Result<RecordId, LedgerError>;

    /// The single most recently created *successful* record whose network
    /// identity OR wallet identity matches. A cooldown is triggered by either
    /// dimension matching, not both.
    fn most_recent_success(&self, network_identity: IpAddr, wallet_identity: Address) -> Option<DispenseRecord>;

    /// Number of records with the given success flag and
    /// `since <= requested_at < until`.
    fn count_in_window(&self, succeeded: bool, since: DateTime<Utc>, until: DateTime<Utc>) -> usize;
}

#[derive(Default)]
struct LedgerIndex {
    records: Vec<DispenseRecord>,
    /// Record ids per network identity, ascending (creation order).
    by_network: HashMap<IpAddr, Vec<RecordId>>,
    /// Record ids per wallet identity, ascending.
    by_wallet: HashMap<Address, Vec<RecordId>>,
}

impl LedgerIndex {
    fn push(&mut self, record: DispenseRecord) -> RecordId {
        let id = self.records.len() as RecordId;
        self.by_network
            .entry(record.network_identity)
            .or_default()
            .push(id);
        self.by_wallet
            .entry(record.wallet_identity)
            .or_default()
            .push(id);
        self.records.push(record);
        id
    }

    fn last_success_in(&self, ids: Option<&Vec<RecordId>>) -> Option<RecordId> {
        ids?.iter()
            .rev()
            .copied()
            .find(|&id| self.records[id as usize].succeeded)
    }
}

/// In-memory ledger keeping one index per identity dimension.
///
/// Recency queries union the newest success from each dimension and keep the
/// most recent of the two.
#[derive(Default)]
pub struct MemoryLedger {
    inner: RwLock<LedgerIndex>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

// The ledger is append-only, so a writer that panicked mid-append cannot have
// left the index half-updated in a way later readers would misread; recover
// the guard instead of propagating the poison.
fn read_lock(lock: &RwLock<LedgerIndex>) -> std::sync::RwLockReadGuard<'_, LedgerIndex> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

fn write_lock(lock: &RwLock<LedgerIndex>) -> std::sync::RwLockWriteGuard<'_, LedgerIndex> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}

impl Ledger for MemoryLedger {
    fn append(&self, record: DispenseRecord) -> Result<RecordId, LedgerError> {
        let id = write_lock(&self.inner).push(record);
        debug!(record_id = id, "appended dispense record");
        Ok(id)
    }

    fn most_recent_success(&self, network_identity: IpAddr, wallet_identity: Address) -> Option<DispenseRecord> {
        let inner = read_lock(&self.inner);
        let by_net = inner.last_success_in(inner.by_network.get(&network_identity));
        let by_wallet = inner.last_success_in(inner.by_wallet.get(&wallet_identity));
        let id = match (by_net, by_wallet) {
            (Some(a), Some(b)) => a.max(b),
            (Some(a), None) => a,
            (None, Some(b)) => b,
            (None, None) => return None,
        };
        Some(inner.records[id as usize].clone())
    }

    fn count_in_window(&self, succeeded: bool, since: DateTime<Utc>, until: DateTime<Utc>) -> usize {
        read_lock(&self.inner)
            .records
            .iter()
            .filter(|r| r.succeeded == succeeded && r.requested_at >= since && r.requested_at < until)
            .count()
    }
}

/// Durable ledger: one JSON line per record, appended and flushed before the
/// append is acknowledged. The whole file is replayed into a [`MemoryLedger`]
/// at open, so reads never touch the disk.
pub struct JsonlLedger {
    file: Mutex<File>,
    index: MemoryLedger,
}

impl JsonlLedger {
    /// Open (or create) the ledger file at `path` and replay its contents.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, LedgerError> {
        let path = path.as_ref();
        let index = MemoryLedger::new();
        let mut replayed = 0usize;

        if path.exists() {
            let reader = BufReader::new(File::open(path)?);
            for (line_no, line) in reader.lines().enumerate() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                let record: DispenseRecord =
                    serde_json::from_str(&line).map_err(|e| LedgerError::Replay {
                        line: line_no + 1,
                        message: e.to_string(),
                    })?;
                index.append(record)?;
                replayed += 1;
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        info!(path = %path.display(), records = replayed, "opened dispense ledger");

        Ok(Self {
            file: Mutex::new(file),
            index,
        })
    }
}

impl Ledger for JsonlLedger {
    fn append(&self, record: DispenseRecord) -> Result<RecordId, LedgerError> {
        let line = serde_json::to_string(&record)?;
        {
            let mut file = self.file.lock().unwrap_or_else(|e| e.into_inner());
            writeln!(file, "{}", line)?;
            file.flush()?;
        }
        self.index.append(record)
    }

    fn most_recent_success(&self, network_identity: IpAddr, wallet_identity: Address) -> Option<DispenseRecord> {
        self.index.most_recent_success(network_identity, wallet_identity)
    }

    fn count_in_window(&self, succeeded: bool, since: DateTime<Utc>, until: DateTime<Utc>) -> usize {
        self.index.count_in_window(succeeded, since, until)
    }
}
