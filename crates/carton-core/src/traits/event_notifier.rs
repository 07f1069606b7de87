// # Event Notifier Trait
//
// Receives a notification after a component status has been persisted.
//
// Notification is fire-and-forget from the caller's point of view: the
// lifecycle layer records a failed notification in its return value but never
// turns it into an error, and never retries.

use async_trait::async_trait;

use crate::status::Status;

/// Trait for status-change notification sinks
#[async_trait]
pub trait EventNotifier: Send + Sync {
    /// Announce that `component_id` now has `status`
    ///
    /// Must not block on slow consumers.
    async fn notify(&self, component_id: &str, status: &Status) -> Result<(), crate::Error>;
}
