//! Hit notifications.
//!
//! Defines the `HitAlerter` trait. Alerting is best-effort: the worker
//! spawns each notification and only logs failures.

pub mod telegram;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::HitRecord;

#[async_trait]
pub trait HitAlerter: Send + Sync {
    /// Deliver a notification for one recorded hit.
    async fn notify(&self, hit: &HitRecord) -> Result<()>;

    /// Channel name for logging.
    fn name(&self) -> &str;
}
