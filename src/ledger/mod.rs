//! Balance lookup.
//!
//! `BalanceOracle` decides per candidate whether a ledger request is made
//! at all: most checks short-circuit locally, an optional simulation hook
//! can fabricate readings for demos, and the rest go to a `LedgerClient`
//! under a hard timeout. Every path ends in a `BalanceOutcome`; nothing
//! propagates an error to the worker.

pub mod rpc;

use async_trait::async_trait;
use rand::Rng;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::OracleConfig;
use crate::types::{BalanceOutcome, Candidate, LedgerError};

/// Fixed decimal exponent of the native currency (wei → ether).
pub const NATIVE_DECIMALS: u32 = 18;

/// Bounds of a synthetic reading, in base units (0.001 to 0.1 native).
const SIMULATED_MIN_WEI: u128 = 1_000_000_000_000_000;
const SIMULATED_MAX_WEI: u128 = 100_000_000_000_000_000;

/// Abstraction over ledger services that can report an address balance.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Balance of `address` in base units.
    async fn get_balance(&self, address: &str) -> Result<u128, LedgerError>;

    /// Identifier for logging.
    fn name(&self) -> &str;
}

/// Convert a base-unit amount to native units. `None` if the amount does
/// not fit a `Decimal`.
pub fn wei_to_native(wei: u128) -> Option<Decimal> {
    let wei = i128::try_from(wei).ok()?;
    Decimal::try_from_i128_with_scale(wei, NATIVE_DECIMALS)
        .ok()
        .map(|d| d.normalize())
}

/// Which path a check takes before any I/O happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LocalPath {
    Empty,
    Simulated(u128),
    Network,
}

pub struct BalanceOracle {
    client: Arc<dyn LedgerClient>,
    empty_probability: f64,
    /// `Some(p)` only when the simulation hook is enabled.
    simulated_hit_probability: Option<f64>,
    timeout: Duration,
}

impl BalanceOracle {
    pub fn new(client: Arc<dyn LedgerClient>, cfg: &OracleConfig) -> Self {
        let simulated_hit_probability = cfg
            .simulation
            .enabled
            .then_some(cfg.simulation.hit_probability);
        if simulated_hit_probability.is_some() {
            warn!(
                hit_probability = cfg.simulation.hit_probability,
                "Simulation hook enabled: synthetic hits will be reported"
            );
        }

        Self {
            client,
            empty_probability: cfg.empty_probability,
            simulated_hit_probability,
            timeout: cfg.rpc_timeout(),
        }
    }

    /// Build an oracle backed by the JSON-RPC client for the configured
    /// endpoint.
    pub fn from_config(cfg: &OracleConfig) -> anyhow::Result<Self> {
        let client = rpc::JsonRpcLedger::new(cfg.resolve_rpc_url(), cfg.rpc_timeout())?;
        Ok(Self::new(Arc::new(client), cfg))
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Check one candidate. Never fails; see `BalanceOutcome`.
    pub async fn check_balance(&self, candidate: &Candidate) -> BalanceOutcome {
        if candidate.is_sentinel() {
            return BalanceOutcome::Skipped;
        }

        match self.roll() {
            LocalPath::Empty => return BalanceOutcome::ShortCircuit,
            LocalPath::Simulated(wei) => {
                return match wei_to_native(wei) {
                    Some(v) => BalanceOutcome::Simulated(v),
                    None => BalanceOutcome::ShortCircuit,
                };
            }
            LocalPath::Network => {}
        }

        let outcome = match tokio::time::timeout(
            self.timeout,
            self.client.get_balance(&candidate.address),
        )
        .await
        {
            Ok(Ok(wei)) => match wei_to_native(wei) {
                Some(v) => BalanceOutcome::Ledger(v),
                None => BalanceOutcome::Unavailable(LedgerError::Malformed(format!(
                    "balance {wei} out of range"
                ))),
            },
            Ok(Err(e)) => BalanceOutcome::Unavailable(e),
            Err(_) => BalanceOutcome::Unavailable(LedgerError::Timeout(
                self.timeout.as_millis() as u64,
            )),
        };

        if let BalanceOutcome::Unavailable(e) = &outcome {
            debug!(
                ledger = self.client.name(),
                address = %candidate.address,
                error = %e,
                "Balance unavailable, reading as zero"
            );
        }
        outcome
    }

    /// Draw the local decision. Kept synchronous so the thread-local RNG
    /// never lives across an await point.
    fn roll(&self) -> LocalPath {
        let mut rng = rand::thread_rng();
        if rng.gen::<f64>() < self.empty_probability {
            return LocalPath::Empty;
        }
        if let Some(p) = self.simulated_hit_probability {
            if rng.gen::<f64>() < p {
                return LocalPath::Simulated(rng.gen_range(SIMULATED_MIN_WEI..SIMULATED_MAX_WEI));
            }
        }
        LocalPath::Network
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
