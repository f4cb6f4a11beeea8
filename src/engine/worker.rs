//! Hunter — the polling worker.
//!
//! Owns the Idle/Running/Stopped lifecycle and one cancellable periodic
//! schedule. Every tick spawns an independent iteration
//! (generate → check → record), so a slow ledger call never delays the
//! next tick and a panicking iteration never reaches the schedule.

use anyhow::{Context, Result};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::alerts::telegram::TelegramAlerter;
use crate::alerts::HitAlerter;
use crate::config::{AppConfig, HunterConfig};
use crate::engine::stats::Statistics;
use crate::generator::mnemonic::MnemonicGenerator;
use crate::generator::AddressGenerator;
use crate::ledger::BalanceOracle;
use crate::types::{BalanceOutcome, Candidate, HitRecord, StatsSnapshot, WorkerState};

// ---------------------------------------------------------------------------
// Iteration pipeline
// ---------------------------------------------------------------------------

/// Everything one iteration needs. Shared by the schedule and every
/// in-flight iteration task.
struct Pipeline {
    generator: Arc<dyn AddressGenerator>,
    oracle: BalanceOracle,
    stats: Arc<Statistics>,
    alerter: Option<Arc<dyn HitAlerter>>,
    hit_threshold: Decimal,
    in_flight: AtomicUsize,
}

impl Pipeline {
    /// Generate a candidate and check it. Runs in its own task so a panic
    /// here is contained.
    async fn probe(&self) -> (Candidate, BalanceOutcome) {
        let candidate = self.generator.generate();
        let outcome = self.oracle.check_balance(&candidate).await;
        (candidate, outcome)
    }

    /// Run one iteration and record it exactly once, whatever happens.
    async fn supervise(self: Arc<Self>) -> bool {
        self.in_flight.fetch_add(1, Ordering::SeqCst);

        let worker = self.clone();
        let hit = match tokio::spawn(async move { worker.probe().await }).await {
            Ok((candidate, outcome)) => self.record(&candidate, &outcome),
            Err(e) => {
                error!(error = %e, "Iteration failed, counting as empty check");
                self.stats.record_iteration(false);
                false
            }
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        hit
    }

    fn record(&self, candidate: &Candidate, outcome: &BalanceOutcome) -> bool {
        let reading = outcome.reading();
        let hit = reading > self.hit_threshold;
        self.stats.record_iteration(hit);

        if !hit {
            debug!(candidate = %candidate, outcome = %outcome, "Checked");
            return false;
        }

        if let Some(source) = outcome.source() {
            let record = HitRecord::new(candidate, reading, source);
            info!(
                address = %record.address,
                balance = %record.balance,
                source = %record.source,
                "HIT"
            );
            self.stats.record_hit(record.clone());

            if let Some(alerter) = self.alerter.clone() {
                tokio::spawn(async move {
                    if let Err(e) = alerter.notify(&record).await {
                        warn!(channel = alerter.name(), error = %e, "Hit alert failed");
                    }
                });
            }
        }
        true
    }
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

struct Lifecycle {
    state: WorkerState,
    schedule: Option<JoinHandle<()>>,
}

/// The polling worker. Construct once and share by `Arc`.
pub struct Hunter {
    pipeline: Arc<Pipeline>,
    interval: Duration,
    lifecycle: Mutex<Lifecycle>,
}

impl Hunter {
    pub fn new(
        generator: Arc<dyn AddressGenerator>,
        oracle: BalanceOracle,
        stats: Arc<Statistics>,
        cfg: &HunterConfig,
    ) -> Self {
        let hit_threshold = Decimal::from_f64(cfg.hit_threshold).unwrap_or(Decimal::ZERO);

        Self {
            pipeline: Arc::new(Pipeline {
                generator,
                oracle,
                stats,
                alerter: None,
                hit_threshold,
                in_flight: AtomicUsize::new(0),
            }),
            interval: cfg.interval(),
            lifecycle: Mutex::new(Lifecycle {
                state: WorkerState::Idle,
                schedule: None,
            }),
        }
    }

    /// Attach a hit alerter. Fails once the pipeline is shared, i.e.
    /// after the first `start()`.
    pub fn with_alerter(mut self, alerter: Arc<dyn HitAlerter>) -> Result<Self> {
        let Some(pipeline) = Arc::get_mut(&mut self.pipeline) else {
            anyhow::bail!(
                "Cannot attach {} alerter: hunter pipeline is already shared",
                alerter.name()
            );
        };
        pipeline.alerter = Some(alerter);
        Ok(self)
    }

    /// Build the production worker: mnemonic generator, JSON-RPC oracle,
    /// optional Telegram alerts.
    pub fn from_config(cfg: &AppConfig, stats: Arc<Statistics>) -> Result<Self> {
        let generator = MnemonicGenerator::new().context("Failed to build address generator")?;
        let oracle = BalanceOracle::from_config(&cfg.oracle)?;
        let mut hunter = Self::new(Arc::new(generator), oracle, stats, &cfg.hunter);

        if let Some(telegram) = TelegramAlerter::from_config(&cfg.alerts)? {
            hunter = hunter.with_alerter(Arc::new(telegram))?;
        }
        Ok(hunter)
    }

    fn lock(&self) -> MutexGuard<'_, Lifecycle> {
        match self.lifecycle.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Idle/Stopped → Running. Returns `false` if already running, in
    /// which case nothing changes. Must be called inside a Tokio runtime.
    pub fn start(&self) -> bool {
        let mut lifecycle = self.lock();
        if lifecycle.state.is_running() {
            debug!("Start requested while running, ignoring");
            return false;
        }

        self.pipeline.stats.set_running(true);
        lifecycle.schedule = Some(tokio::spawn(schedule(self.pipeline.clone(), self.interval)));
        lifecycle.state = WorkerState::Running;

        info!(interval_ms = self.interval.as_millis() as u64, "Hunter started");
        true
    }

    /// Running → Stopped. Cancels the schedule; in-flight iterations run
    /// to completion and are still recorded. Returns `false` when the
    /// worker was not running.
    pub fn stop(&self) -> bool {
        let mut lifecycle = self.lock();
        if !lifecycle.state.is_running() {
            return false;
        }

        self.pipeline.stats.set_running(false);
        if let Some(handle) = lifecycle.schedule.take() {
            handle.abort();
        }
        lifecycle.state = WorkerState::Stopped;

        let snapshot = self.pipeline.stats.snapshot();
        info!(
            checked = snapshot.checked,
            hits = snapshot.hits,
            in_flight = self.in_flight(),
            "Hunter stopped"
        );
        true
    }

    /// Run a single iteration now, outside the schedule. Returns whether
    /// it was a hit.
    pub async fn run_once(&self) -> bool {
        self.pipeline.clone().supervise().await
    }

    pub fn state(&self) -> WorkerState {
        self.lock().state
    }

    pub fn is_running(&self) -> bool {
        self.state().is_running()
    }

    /// Iterations started but not yet recorded.
    pub fn in_flight(&self) -> usize {
        self.pipeline.in_flight.load(Ordering::SeqCst)
    }

    pub fn stats(&self) -> &Arc<Statistics> {
        &self.pipeline.stats
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        self.pipeline.stats.snapshot()
    }

    pub fn recent_hits(&self, limit: usize) -> Vec<HitRecord> {
        self.pipeline.stats.recent_hits(limit)
    }
}

impl Drop for Hunter {
    fn drop(&mut self) {
        if let Some(handle) = self.lock().schedule.take() {
            handle.abort();
        }
    }
}

/// The periodic task. First tick fires one period after start.
async fn schedule(pipeline: Arc<Pipeline>, period: Duration) {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        if !pipeline.stats.is_running() {
            break;
        }
        tokio::spawn(pipeline.clone().supervise());
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
