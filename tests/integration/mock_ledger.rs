//! Mock ledger and generator for integration testing.
//!
//! Deterministic `LedgerClient` / `AddressGenerator` implementations with
//! in-memory state controllable from test code.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use wallet_hunter::generator::AddressGenerator;
use wallet_hunter::ledger::LedgerClient;
use wallet_hunter::types::{Candidate, LedgerError};

/// A mock ledger returning a fixed balance for every address.
pub struct MockLedger {
    balance_wei: Arc<Mutex<u128>>,
    delay: Duration,
    calls: Arc<AtomicU64>,
    /// If set, all requests fail with a transport error carrying this text.
    force_error: Arc<Mutex<Option<String>>>,
}

impl MockLedger {
    pub fn new(balance_wei: u128) -> Self {
        Self {
            balance_wei: Arc::new(Mutex::new(balance_wei)),
            delay: Duration::ZERO,
            calls: Arc::new(AtomicU64::new(0)),
            force_error: Arc::new(Mutex::new(None)),
        }
    }

    /// A ledger that always fails.
    pub fn failing(msg: &str) -> Self {
        let ledger = Self::new(0);
        ledger.set_error(msg);
        ledger
    }

    /// Delay every response by `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn set_error(&self, msg: &str) {
        *self.force_error.lock().unwrap() = Some(msg.to_string());
    }

    pub fn set_balance(&self, wei: u128) {
        *self.balance_wei.lock().unwrap() = wei;
    }

    pub fn clear_error(&self) {
        *self.force_error.lock().unwrap() = None;
    }

    pub fn calls(&self) -> Arc<AtomicU64> {
        self.calls.clone()
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn get_balance(&self, _address: &str) -> Result<u128, LedgerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if let Some(msg) = self.force_error.lock().unwrap().clone() {
            return Err(LedgerError::Transport(msg));
        }
        Ok(*self.balance_wei.lock().unwrap())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Generator yielding distinct, well-formed addresses from a counter.
#[derive(Default)]
pub struct CountingGenerator {
    next: AtomicU64,
}

impl AddressGenerator for CountingGenerator {
    fn generate(&self) -> Candidate {
        let n = self.next.fetch_add(1, Ordering::SeqCst) + 1;
        Candidate::new(format!("candidate {n}..."), format!("0x{n:040x}"))
    }
}
