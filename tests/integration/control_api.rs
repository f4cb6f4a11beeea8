//! Control surface over a real socket: start, poll stats, stop.

use std::sync::Arc;
use std::time::Duration;

use wallet_hunter::config::{HunterConfig, OracleConfig, SimulationConfig};
use wallet_hunter::dashboard;
use wallet_hunter::engine::stats::Statistics;
use wallet_hunter::engine::worker::Hunter;
use wallet_hunter::ledger::BalanceOracle;

use crate::mock_ledger::{CountingGenerator, MockLedger};

/// Serve a fast, always-hitting hunter on an ephemeral port.
async fn spawn_server() -> (String, Arc<Hunter>) {
    let oracle = OracleConfig {
        empty_probability: 0.0,
        simulation: SimulationConfig {
            enabled: true,
            hit_probability: 1.0,
        },
        ..OracleConfig::default()
    };
    let hunter = Arc::new(Hunter::new(
        Arc::new(CountingGenerator::default()),
        BalanceOracle::new(Arc::new(MockLedger::new(0)), &oracle),
        Arc::new(Statistics::new()),
        &HunterConfig {
            interval_ms: 20,
            ..HunterConfig::default()
        },
    ));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = dashboard::build_router(hunter.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), hunter)
}

async fn stats(http: &reqwest::Client, base: &str) -> serde_json::Value {
    http.get(format!("{base}/api/stats"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

async fn hunt(http: &reqwest::Client, base: &str, action: &str) -> serde_json::Value {
    let resp = http
        .post(format!("{base}/api/hunt"))
        .json(&serde_json::json!({ "action": action }))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());
    resp.json().await.unwrap()
}

#[tokio::test]
async fn test_start_stats_stop_over_http() {
    let (base, hunter) = spawn_server().await;
    let http = reqwest::Client::new();

    let initial = stats(&http, &base).await;
    assert_eq!(initial["running"], false);
    assert_eq!(initial["checked"], 0);

    assert_eq!(hunt(&http, &base, "start").await["status"], "ok");
    assert_eq!(stats(&http, &base).await["running"], true);

    tokio::time::sleep(Duration::from_millis(300)).await;

    assert_eq!(hunt(&http, &base, "stop").await["status"], "ok");
    let after = stats(&http, &base).await;
    assert_eq!(after["running"], false);

    let checked = after["checked"].as_u64().unwrap();
    let hits = after["hits"].as_u64().unwrap();
    assert!(checked > 0);
    assert!(hits <= checked);

    // drain in-flight iterations, then the count must hold still
    tokio::time::sleep(Duration::from_millis(100)).await;
    let settled = hunter.snapshot().checked;
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(hunter.snapshot().checked, settled);
}

#[tokio::test]
async fn test_hits_and_liveness_over_http() {
    let (base, hunter) = spawn_server().await;
    hunter.run_once().await;

    let http = reqwest::Client::new();
    let hits: serde_json::Value = http
        .get(format!("{base}/api/hits"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(hits.as_array().unwrap().len(), 1);
    assert_eq!(hits[0]["address"], format!("0x{:040x}", 1));

    let live: serde_json::Value = http.get(&base).send().await.unwrap().json().await.unwrap();
    assert_eq!(live["status"], "Wallet Hunter live");
}

#[tokio::test]
async fn test_repeated_start_requests() {
    let (base, hunter) = spawn_server().await;
    let http = reqwest::Client::new();

    for _ in 0..3 {
        hunt(&http, &base, "start").await;
    }
    assert!(hunter.is_running());

    hunt(&http, &base, "stop").await;
    hunt(&http, &base, "stop").await;
    assert!(!hunter.is_running());
}
