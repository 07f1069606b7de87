//! Collaborator traits for the carton core
//!
//! - [`TableStore`]: keyed row access for component records
//! - [`EventNotifier`]: status-change notification sink
//! - [`HookBuilder`]: operation selection for provisioning hooks
//! - [`RequestAuthority`]: remote request lookup

pub mod event_notifier;
pub mod hook_builder;
pub mod request_authority;
pub mod table_store;

pub use event_notifier::EventNotifier;
pub use hook_builder::HookBuilder;
pub use request_authority::RequestAuthority;
pub use table_store::{Row, TableStore};
