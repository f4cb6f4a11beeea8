//! Ethereum JSON-RPC ledger client.
//!
//! Issues `eth_getBalance(address, "latest")` against the configured
//! endpoint. The endpoint URL may embed an API key, so it is held as a
//! secret and never logged.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::LedgerClient;
use crate::types::LedgerError;

const CLIENT_NAME: &str = "json-rpc";

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'static str,
    params: [&'a str; 2],
    id: u64,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    #[serde(default)]
    message: String,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct JsonRpcLedger {
    http: Client,
    url: Secret<String>,
    timeout: Duration,
}

impl JsonRpcLedger {
    pub fn new(url: Secret<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent("wallet-hunter/0.1.0")
            .build()
            .context("Failed to build HTTP client for ledger RPC")?;

        Ok(Self { http, url, timeout })
    }

    fn map_transport(&self, e: reqwest::Error) -> LedgerError {
        if e.is_timeout() {
            LedgerError::Timeout(self.timeout.as_millis() as u64)
        } else {
            // without_url keeps the keyed endpoint out of the message
            LedgerError::Transport(e.without_url().to_string())
        }
    }
}

#[async_trait]
impl LedgerClient for JsonRpcLedger {
    async fn get_balance(&self, address: &str) -> Result<u128, LedgerError> {
        let body = RpcRequest {
            jsonrpc: "2.0",
            method: "eth_getBalance",
            params: [address, "latest"],
            id: 1,
        };

        let resp = self
            .http
            .post(self.url.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        if !resp.status().is_success() {
            return Err(LedgerError::Transport(format!("HTTP {}", resp.status())));
        }

        let parsed: RpcResponse = resp
            .json()
            .await
            .map_err(|e| LedgerError::Malformed(e.without_url().to_string()))?;

        if let Some(err) = parsed.error {
            return Err(LedgerError::Rpc {
                code: err.code,
                message: err.message,
            });
        }

        let result = parsed
            .result
            .ok_or_else(|| LedgerError::Malformed("missing result".into()))?;
        parse_quantity(&result)
    }

    fn name(&self) -> &str {
        CLIENT_NAME
    }
}

/// Parse a JSON-RPC hex quantity (`"0x1bc16d674ec80000"`).
pub fn parse_quantity(raw: &str) -> Result<u128, LedgerError> {
    let digits = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .ok_or_else(|| LedgerError::Malformed(format!("quantity without 0x prefix: {raw}")))?;
    if digits.is_empty() {
        return Err(LedgerError::Malformed("empty quantity".into()));
    }
    u128::from_str_radix(digits, 16)
        .map_err(|e| LedgerError::Malformed(format!("bad quantity {raw}: {e}")))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
