//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Every field has a default, so a missing file runs the hunter with the
//! stock settings. Secrets (RPC key, Telegram token) are referenced by
//! env-var name in the config and resolved at runtime.

use anyhow::{Context, Result};
use secrecy::Secret;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::types::HunterError;

/// Premium ledger endpoint, keyed by the configured API key.
pub const PREMIUM_RPC_BASE: &str = "https://eth-mainnet.g.alchemy.com/v2";

/// Public ledger endpoint used when no API key is configured.
pub const PUBLIC_RPC_URL: &str = "https://rpc.ankr.com/eth";

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub hunter: HunterConfig,
    pub oracle: OracleConfig,
    pub server: ServerConfig,
    pub alerts: AlertsConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HunterConfig {
    /// Period between scheduled iterations.
    pub interval_ms: u64,
    /// A reading must exceed this (native units) to count as a hit.
    pub hit_threshold: f64,
}

impl Default for HunterConfig {
    fn default() -> Self {
        Self {
            interval_ms: 500,
            hit_threshold: 0.00001,
        }
    }
}

impl HunterConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OracleConfig {
    /// Probability that a check short-circuits to zero without a request.
    pub empty_probability: f64,
    /// Hard bound on one ledger request.
    pub rpc_timeout_ms: u64,
    /// Name of the env var holding the premium endpoint key.
    pub api_key_env: String,
    /// Explicit endpoint; overrides key-based resolution when set.
    pub rpc_url: Option<String>,
    pub simulation: SimulationConfig,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            empty_probability: 0.999,
            rpc_timeout_ms: 1000,
            api_key_env: "ALCHEMY_KEY".to_string(),
            rpc_url: None,
            simulation: SimulationConfig::default(),
        }
    }
}

impl OracleConfig {
    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_millis(self.rpc_timeout_ms)
    }

    /// Resolve the ledger endpoint: explicit URL, then keyed premium
    /// endpoint, then the public fallback.
    pub fn resolve_rpc_url(&self) -> Secret<String> {
        if let Some(url) = self.rpc_url.as_deref().filter(|u| !u.is_empty()) {
            return Secret::new(url.to_string());
        }
        match std::env::var(&self.api_key_env) {
            Ok(key) if !key.trim().is_empty() => {
                Secret::new(format!("{PREMIUM_RPC_BASE}/{}", key.trim()))
            }
            _ => Secret::new(PUBLIC_RPC_URL.to_string()),
        }
    }

    /// Whether the resolved endpoint is the public fallback.
    pub fn uses_public_endpoint(&self) -> bool {
        use secrecy::ExposeSecret;
        self.resolve_rpc_url().expose_secret() == PUBLIC_RPC_URL
    }
}

/// Synthetic-hit hook for demos and tests. Results it produces are not
/// genuine and are tagged `simulated` in the hits log.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SimulationConfig {
    pub enabled: bool,
    pub hit_probability: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            hit_probability: 0.0001,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub enabled: bool,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 3000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AlertsConfig {
    pub telegram_bot_token_env: String,
    pub telegram_chat_id_env: String,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            telegram_bot_token_env: "TELEGRAM_BOT_TOKEN".to_string(),
            telegram_chat_id_env: "TELEGRAM_CHAT_ID".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::parse(&contents).with_context(|| format!("Failed to parse config file: {path}"))
    }

    /// Load the file if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            info!(path, "No config file found, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Parse and validate TOML text.
    pub fn parse(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), HunterError> {
        let probability = |name: &str, p: f64| {
            if (0.0..=1.0).contains(&p) {
                Ok(())
            } else {
                Err(HunterError::Config(format!("{name} must be within [0, 1], got {p}")))
            }
        };
        probability("oracle.empty_probability", self.oracle.empty_probability)?;
        probability(
            "oracle.simulation.hit_probability",
            self.oracle.simulation.hit_probability,
        )?;

        if self.hunter.interval_ms == 0 {
            return Err(HunterError::Config("hunter.interval_ms must be positive".into()));
        }
        if self.oracle.rpc_timeout_ms == 0 {
            return Err(HunterError::Config("oracle.rpc_timeout_ms must be positive".into()));
        }
        if !self.hunter.hit_threshold.is_finite() || self.hunter.hit_threshold < 0.0 {
            return Err(HunterError::Config(
                "hunter.hit_threshold must be a non-negative number".into(),
            ));
        }
        Ok(())
    }

    /// Resolve an environment variable name to its value.
    pub fn resolve_env(env_name: &str) -> Result<String> {
        std::env::var(env_name)
            .with_context(|| format!("Environment variable not set: {env_name}"))
    }
}
