//! Status-change notifiers
//!
//! - [`LogNotifier`]: writes the event to the tracing log
//! - [`ChannelNotifier`]: pushes a [`ComponentEvent`] onto a bounded channel
//!
//! Neither blocks: a full channel is reported as an error, which the
//! lifecycle layer records and drops.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::info;

use crate::error::{Error, Result};
use crate::status::Status;
use crate::traits::EventNotifier;

/// Events emitted by the lifecycle layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentEvent {
    /// A new status was persisted
    StatusChanged { component_id: String, status: Status },
}

/// Notifier that only logs
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl EventNotifier for LogNotifier {
    async fn notify(&self, component_id: &str, status: &Status) -> Result<()> {
        info!(component = component_id, status = %status, "component status changed");
        Ok(())
    }
}

/// Notifier backed by a bounded tokio channel
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::Sender<ComponentEvent>,
}

impl ChannelNotifier {
    /// Create a notifier and the receiver its events go to
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<ComponentEvent>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }
}

#[async_trait]
impl EventNotifier for ChannelNotifier {
    async fn notify(&self, component_id: &str, status: &Status) -> Result<()> {
        let event = ComponentEvent::StatusChanged {
            component_id: component_id.to_string(),
            status: status.clone(),
        };

        self.tx.try_send(event).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => {
                Error::Other("Event channel full, dropping event".to_string())
            }
            mpsc::error::TrySendError::Closed(_) => {
                Error::Other("Event channel closed".to_string())
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_notifier_delivers() {
        let (notifier, mut rx) = ChannelNotifier::new(4);
        notifier.notify("COM1", &Status::from("running")).await.unwrap();

        assert_eq!(
            rx.recv().await,
            Some(ComponentEvent::StatusChanged {
                component_id: "COM1".into(),
                status: Status::from("running"),
            })
        );
    }

    #[tokio::test]
    async fn test_channel_notifier_full_is_error_not_block() {
        let (notifier, _rx) = ChannelNotifier::new(1);
        notifier.notify("COM1", &Status::from("a")).await.unwrap();

        let err = notifier.notify("COM1", &Status::from("b")).await.unwrap_err();
        assert!(err.to_string().contains("full"));
    }

    #[tokio::test]
    async fn test_channel_notifier_closed_is_error() {
        let (notifier, rx) = ChannelNotifier::new(1);
        drop(rx);
        assert!(notifier.notify("COM1", &Status::from("a")).await.is_err());
    }

    #[tokio::test]
    async fn test_log_notifier_never_fails() {
        assert!(LogNotifier.notify("COM1", &Status::from("running")).await.is_ok());
    }
}
