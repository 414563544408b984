pub mod core;
pub mod watcher;

use crate::error::{DeliveryError, FetchError};
use async_trait::async_trait;
use std::time::Duration;

/// Where the current USD price comes from.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch_price(&self) -> Result<f64, FetchError>;
}

/// What happened to an alert that did not error.
#[cfg_attr(not(test), allow(dead_code))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Sent { status: u16 },
    SkippedMissingConfig,
}

/// Sink for price alerts.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, subject: &str, body: &str) -> Result<Delivery, DeliveryError>;
}

/// Pause between ticks.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
