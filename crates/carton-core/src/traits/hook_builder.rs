use crate::operation::{Hook, Operation};

/// Builds the execution hook attached to a provisioning view
///
/// The default implementation is [`crate::operation::CategoryHookBuilder`].
pub trait HookBuilder: Send + Sync {
    /// Select and order the operations that belong to `category`
    fn build_hook(&self, operations: &[Operation], category: &str) -> Hook;
}
