//! End-to-end worker scenarios: real pipeline, mock ledger, paused clock.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use wallet_hunter::config::{HunterConfig, OracleConfig, SimulationConfig};
use wallet_hunter::engine::stats::Statistics;
use wallet_hunter::engine::worker::Hunter;
use wallet_hunter::generator::mnemonic::MnemonicGenerator;
use wallet_hunter::generator::AddressGenerator;
use wallet_hunter::ledger::BalanceOracle;
use wallet_hunter::types::{BalanceOutcome, Candidate, LedgerError, WorkerState};

use crate::mock_ledger::{CountingGenerator, MockLedger};

const ONE_ETH: u128 = 1_000_000_000_000_000_000;

fn oracle_cfg(empty: f64, simulated: Option<f64>, timeout_ms: u64) -> OracleConfig {
    OracleConfig {
        empty_probability: empty,
        rpc_timeout_ms: timeout_ms,
        simulation: SimulationConfig {
            enabled: simulated.is_some(),
            hit_probability: simulated.unwrap_or(0.0),
        },
        ..OracleConfig::default()
    }
}

fn hunter(
    generator: Arc<dyn AddressGenerator>,
    ledger: MockLedger,
    oracle: OracleConfig,
) -> Hunter {
    Hunter::new(
        generator,
        BalanceOracle::new(Arc::new(ledger), &oracle),
        Arc::new(Statistics::new()),
        &HunterConfig::default(),
    )
}

#[tokio::test(start_paused = true)]
async fn test_forced_hits_scheduled_run() {
    let h = hunter(
        Arc::new(CountingGenerator::default()),
        MockLedger::failing("should not be called"),
        oracle_cfg(0.0, Some(1.0), 1000),
    );
    h.start();
    tokio::time::sleep(Duration::from_millis(10 * 500 + 250)).await;
    h.stop();

    let s = h.snapshot();
    assert_eq!(s.checked, 10);
    assert_eq!(s.hits, 10);
}

#[tokio::test(start_paused = true)]
async fn test_failing_network_real_generator() {
    let ledger = MockLedger::failing("connection reset");
    let calls = ledger.calls();
    let h = hunter(
        Arc::new(MnemonicGenerator::new().unwrap()),
        ledger,
        oracle_cfg(0.0, None, 1000),
    );
    h.start();
    tokio::time::sleep(Duration::from_millis(6 * 500 + 250)).await;
    h.stop();

    let s = h.snapshot();
    assert_eq!(s.checked, 6);
    assert_eq!(s.hits, 0);
    assert_eq!(calls.load(Ordering::SeqCst), 6);
}

#[tokio::test]
async fn test_hits_never_exceed_checked() {
    let ledger = MockLedger::new(ONE_ETH);
    let h = hunter(
        Arc::new(CountingGenerator::default()),
        ledger,
        oracle_cfg(0.5, None, 1000),
    );
    let mut last_checked = 0;
    for _ in 0..200 {
        h.run_once().await;
        let s = h.snapshot();
        assert!(s.hits <= s.checked);
        assert_eq!(s.checked, last_checked + 1);
        last_checked = s.checked;
    }
    // roughly half reach the funded ledger
    let hits = h.snapshot().hits;
    assert!(hits > 0 && hits < 200);
}

#[tokio::test]
async fn test_ledger_recovery() {
    let ledger = Arc::new(MockLedger::failing("down"));
    let oracle = BalanceOracle::new(ledger.clone(), &oracle_cfg(0.0, None, 1000));
    let candidate = Candidate::new("x...", "0x0000000000000000000000000000000000000001");

    assert!(matches!(
        oracle.check_balance(&candidate).await,
        BalanceOutcome::Unavailable(LedgerError::Transport(_))
    ));

    ledger.clear_error();
    ledger.set_balance(ONE_ETH);
    assert!(matches!(
        oracle.check_balance(&candidate).await,
        BalanceOutcome::Ledger(v) if v == rust_decimal::Decimal::ONE
    ));
}

#[tokio::test(start_paused = true)]
async fn test_forced_timeout_within_bound() {
    let ledger = MockLedger::new(ONE_ETH).with_delay(Duration::from_secs(60));
    let oracle = BalanceOracle::new(Arc::new(ledger), &oracle_cfg(0.0, None, 1000));
    let candidate = Candidate::new("x...", "0x0000000000000000000000000000000000000001");

    let started = tokio::time::Instant::now();
    let outcome = oracle.check_balance(&candidate).await;
    let elapsed = started.elapsed();

    assert!(matches!(outcome, BalanceOutcome::Unavailable(LedgerError::Timeout(1000))));
    assert_eq!(outcome.reading(), rust_decimal::Decimal::ZERO);
    assert!(elapsed >= Duration::from_millis(1000));
    assert!(elapsed <= Duration::from_millis(1050));
}

#[tokio::test(start_paused = true)]
async fn test_timeouts_are_counted_as_checks() {
    let ledger = MockLedger::new(ONE_ETH).with_delay(Duration::from_secs(60));
    let h = hunter(
        Arc::new(CountingGenerator::default()),
        ledger,
        oracle_cfg(0.0, None, 1000),
    );
    h.start();
    // ticks at 500..=2000 ms; each iteration times out 1000 ms later
    tokio::time::sleep(Duration::from_millis(2250)).await;
    h.stop();
    assert!(h.in_flight() > 0);

    tokio::time::sleep(Duration::from_secs(2)).await;
    let s = h.snapshot();
    assert_eq!(h.in_flight(), 0);
    assert_eq!(s.checked, 4);
    assert_eq!(s.hits, 0);
}

#[tokio::test(start_paused = true)]
async fn test_checked_stops_growing_after_stop() {
    let h = hunter(
        Arc::new(CountingGenerator::default()),
        MockLedger::new(0),
        oracle_cfg(0.0, None, 1000),
    );
    assert_eq!(h.state(), WorkerState::Idle);
    h.start();
    tokio::time::sleep(Duration::from_millis(1750)).await;
    h.stop();
    assert_eq!(h.state(), WorkerState::Stopped);

    let at_stop = h.snapshot().checked;
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(h.snapshot().checked, at_stop);
    assert_eq!(at_stop, 3);
}

#[tokio::test(start_paused = true)]
async fn test_start_twice_single_schedule() {
    let h = hunter(
        Arc::new(CountingGenerator::default()),
        MockLedger::new(0),
        oracle_cfg(1.0, None, 1000),
    );
    assert!(h.start());
    assert!(!h.start());
    tokio::time::sleep(Duration::from_millis(5250)).await;
    h.stop();
    assert_eq!(h.snapshot().checked, 10);
}

#[tokio::test]
async fn test_stop_idle_noop() {
    let h = hunter(
        Arc::new(CountingGenerator::default()),
        MockLedger::new(0),
        oracle_cfg(1.0, None, 1000),
    );
    assert!(!h.stop());
    assert!(!h.stop());
    let s = h.snapshot();
    assert_eq!(s.checked, 0);
    assert_eq!(s.hits, 0);
    assert!(!s.running);
}
