//! Delivery channel trait and the two transports named in spec.md §6.
//!
//! The core treats delivery as a function `(alert) -> Result<(), _>`; the
//! actual Signal/desktop-notification transports are out of scope (spec.md
//! §1 "Out of scope ... desktop/SMS delivery transports") — these
//! implementations are thin injectable stubs a real deployment replaces.

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use crate::types::Alert;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("channel unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait DeliveryChannel: Send + Sync {
    async fn send(&self, alert: &Alert) -> Result<(), DeliveryError>;
}

/// Logs the alert as if handed to a Signal bot/bridge. A production
/// deployment swaps this for a real signal-cli or REST integration.
pub struct SignalChannel;

#[async_trait]
impl DeliveryChannel for SignalChannel {
    async fn send(&self, alert: &Alert) -> Result<(), DeliveryError> {
        info!(alert_id = %alert.id, urgency = %alert.urgency, "signal: {}", alert.title);
        Ok(())
    }
}

/// Logs the alert as if handed to a local desktop notifier (`notify-send`
/// or platform equivalent).
pub struct DesktopChannel;

#[async_trait]
impl DeliveryChannel for DesktopChannel {
    async fn send(&self, alert: &Alert) -> Result<(), DeliveryError> {
        info!(alert_id = %alert.id, urgency = %alert.urgency, "desktop: {}", alert.title);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crate::types::{AlertType, Urgency};

    #[tokio::test]
    async fn signal_channel_accepts_any_alert() {
        let alert = Alert::new(
            AlertType::FlareX,
            Urgency::Critical,
            "t",
            "b",
            Utc::now(),
            None,
        );
        assert!(SignalChannel.send(&alert).await.is_ok());
    }
}
