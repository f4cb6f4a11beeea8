//! Shared types for the wallet hunter.
//!
//! These types form the data model passed between the generator, the
//! balance oracle, the polling worker and the dashboard. None of them is
//! persisted; everything lives for one iteration or one process.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Candidate
// ---------------------------------------------------------------------------

/// Address used for the generation-failure sentinel.
pub const SENTINEL_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// A freshly generated address together with a diagnostic summary of the
/// entropy that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Truncated mnemonic (`"abandon ability ab..."`). Diagnostics only.
    pub entropy_summary: String,
    /// EIP-55 checksummed address.
    pub address: String,
}

impl Candidate {
    pub fn new(entropy_summary: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            entropy_summary: entropy_summary.into(),
            address: address.into(),
        }
    }

    /// The candidate returned when entropy or derivation failed.
    pub fn sentinel() -> Self {
        Self {
            entropy_summary: String::new(),
            address: SENTINEL_ADDRESS.to_string(),
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.address == SENTINEL_ADDRESS
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_sentinel() {
            write!(f, "<sentinel>")
        } else {
            write!(f, "{} ({})", self.address, self.entropy_summary)
        }
    }
}

// ---------------------------------------------------------------------------
// Balance outcome
// ---------------------------------------------------------------------------

/// Result of one balance check.
///
/// Every failure path is a variant here rather than an error, so the
/// worker can count it and the zero reading is an explicit branch.
#[derive(Debug)]
pub enum BalanceOutcome {
    /// The candidate was the generation sentinel; nothing was checked.
    Skipped,
    /// The local probabilistic path resolved the check to zero.
    ShortCircuit,
    /// Synthetic reading produced by the demo simulation hook.
    Simulated(Decimal),
    /// Real reading returned by the ledger service.
    Ledger(Decimal),
    /// Timeout, transport failure or malformed response. Reads as zero.
    Unavailable(LedgerError),
}

impl BalanceOutcome {
    /// Balance in native units. Zero for every variant without a reading.
    pub fn reading(&self) -> Decimal {
        match self {
            Self::Simulated(v) | Self::Ledger(v) => *v,
            Self::Skipped | Self::ShortCircuit | Self::Unavailable(_) => Decimal::ZERO,
        }
    }

    /// Where a nonzero reading came from, if it came from anywhere.
    pub fn source(&self) -> Option<HitSource> {
        match self {
            Self::Simulated(_) => Some(HitSource::Simulated),
            Self::Ledger(_) => Some(HitSource::Ledger),
            _ => None,
        }
    }
}

impl fmt::Display for BalanceOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skipped => write!(f, "skipped"),
            Self::ShortCircuit => write!(f, "short-circuit"),
            Self::Simulated(v) => write!(f, "simulated {v}"),
            Self::Ledger(v) => write!(f, "ledger {v}"),
            Self::Unavailable(e) => write!(f, "unavailable ({e})"),
        }
    }
}

// ---------------------------------------------------------------------------
// Hits
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HitSource {
    Simulated,
    Ledger,
}

impl fmt::Display for HitSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simulated => write!(f, "simulated"),
            Self::Ledger => write!(f, "ledger"),
        }
    }
}

/// A recorded hit, kept in the in-memory recent-hits ring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HitRecord {
    pub id: uuid::Uuid,
    pub address: String,
    pub balance: Decimal,
    pub entropy_summary: String,
    pub source: HitSource,
    pub found_at: DateTime<Utc>,
}

impl HitRecord {
    pub fn new(candidate: &Candidate, balance: Decimal, source: HitSource) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            address: candidate.address.clone(),
            balance,
            entropy_summary: candidate.entropy_summary.clone(),
            source,
            found_at: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// Statistics snapshot
// ---------------------------------------------------------------------------

/// Point-in-time copy of the worker statistics, as served by `/api/stats`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub checked: u64,
    pub hits: u64,
    pub running: bool,
    /// Seconds since the statistics were created (process start).
    pub uptime: f64,
}

// ---------------------------------------------------------------------------
// Worker lifecycle
// ---------------------------------------------------------------------------

/// Lifecycle of the polling worker. `Idle` and `Stopped` are equivalent
/// at rest; `Stopped` only records that the worker ran before.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkerState {
    Idle,
    Running,
    Stopped,
}

impl WorkerState {
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "IDLE"),
            Self::Running => write!(f, "RUNNING"),
            Self::Stopped => write!(f, "STOPPED"),
        }
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Failures of a single ledger balance query.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Failures while producing a candidate. Never leaves the generator.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("entropy source failed: {0}")]
    Entropy(String),

    #[error("mnemonic construction failed: {0}")]
    Mnemonic(String),

    #[error("key derivation failed: {0}")]
    Derivation(String),
}

/// Domain errors surfaced outside the worker.
#[derive(Debug, thiserror::Error)]
pub enum HunterError {
    #[error("Configuration error: {0}")]
    Config(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
