//! Driving port for live toasts.

use async_trait::async_trait;

use crate::domain::{Error, Toast};

/// Stream of toasts for one subscriber.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ToastStream: Send {
    /// Wait for the next toast. `None` once the feed has shut down.
    async fn next_toast(&mut self) -> Option<Toast>;
}

/// Source of per-connection toast streams.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ToastFeed: Send + Sync {
    /// Start a subscription. Content existing at this point is the baseline
    /// and never produces toasts.
    async fn subscribe(&self) -> Result<Box<dyn ToastStream>, Error>;
}
