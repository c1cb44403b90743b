//! Delivery of seat change alerts.

pub mod discord_channel_notifier;
pub mod message;

use anyhow::Result;

/// Destination for seat change alerts.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Sends one alert message.
    async fn notify(&self, content: &str) -> Result<()>;
}
