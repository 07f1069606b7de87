//! Component lifecycle mutations
//!
//! [`Components`] reads component rows by id and writes status, state and
//! operation history back to the `components` table.
//!
//! ## Side effects
//!
//! ```text
//! set_status ──▶ update_row(inputs, status) ──ok──▶ notify(status)
//!                        │                             │
//!                       err ──▶ Err(..)               err ──▶ Ok(StatusUpdate::NotifyFailed)
//!
//! set_state  ──▶ update_row(state)                     (no event)
//! update_ops_run ──▶ update_row(operations)            (no event)
//! delete     ──▶ delete_row ──err──▶ DeleteOutcome::Failed (never Err)
//! ```
//!
//! Nothing here retries. A returned error means no durable change is
//! guaranteed.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use tracing::{debug, info, warn};

use crate::codec::{self, DecodeReport};
use crate::error::Result;
use crate::operation::RanOperation;
use crate::record::{COMPONENTS_TABLE, Component, ComponentRow, columns};
use crate::status::{State, Status};
use crate::traits::{EventNotifier, Row, TableStore};

/// Input key refreshed on every status change
pub const LAST_STATUS_UPDATE: &str = "lastsuccessstatusupdate";

/// RFC 822 layout used for `lastsuccessstatusupdate`
///
/// Status timestamps are written in UTC, so `%Z` renders as `UTC`. Other
/// zones render their numeric offset.
const RFC822: &str = "%d %b %y %H:%M %Z";

/// Outcome of a persisted status change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusUpdate {
    /// Status persisted and the notifier accepted the event
    Notified,
    /// Status persisted; the notification was dropped
    NotifyFailed(String),
}

impl StatusUpdate {
    pub fn notified(&self) -> bool {
        matches!(self, Self::Notified)
    }
}

/// Outcome of a best-effort delete
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The store rejected the delete; the row may still exist
    Failed(String),
}

/// Read and mutate component rows
#[derive(Clone)]
pub struct Components {
    store: Arc<dyn TableStore>,
    notifier: Arc<dyn EventNotifier>,
}

impl std::fmt::Debug for Components {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Components")
            .field("store", &self.store.store_name())
            .finish()
    }
}

/// Format a status timestamp
pub fn status_timestamp<Tz>(now: DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    now.format(RFC822).to_string()
}

impl Components {
    pub fn new(store: Arc<dyn TableStore>, notifier: Arc<dyn EventNotifier>) -> Self {
        Self { store, notifier }
    }

    /// Fetch and decode a component, also returning what was skipped
    pub async fn fetch_with_report(&self, id: &str) -> Result<(Component, DecodeReport)> {
        debug!("Fetching component {} from {}", id, self.store.store_name());

        let raw = self.store.fetch_row(COMPONENTS_TABLE, id).await?;
        let mut report = DecodeReport::new();
        let row = ComponentRow::from_row(&raw, &mut report);
        let (component, dig_report) = row.dig();
        report.extend(dig_report);

        if !report.is_clean() {
            warn!(
                "Component {} decoded with {} skipped field(s)",
                id,
                report.skipped_count()
            );
            for skipped in report.skipped() {
                warn!("  skipped {}", skipped);
            }
        }

        Ok((component, report))
    }

    /// Fetch and decode a component by id
    ///
    /// Returns `Error::NotFound` when no row exists. Malformed composite
    /// fields are skipped and logged, never raised.
    pub async fn fetch(&self, id: &str) -> Result<Component> {
        self.fetch_with_report(id).await.map(|(c, _)| c)
    }

    /// Persist a new status and announce it
    ///
    /// Refreshes the `status` and `lastsuccessstatusupdate` inputs without
    /// duplicating them, then writes `inputs` and `status`. The notifier is
    /// only called after a successful write, and its failure is reported in
    /// the returned [`StatusUpdate`] instead of as an error.
    pub async fn set_status(&self, c: &mut Component, status: Status) -> Result<StatusUpdate> {
        let mut updates = BTreeMap::new();
        updates.insert(
            LAST_STATUS_UPDATE.to_string(),
            vec![status_timestamp(Utc::now())],
        );
        updates.insert(columns::STATUS.to_string(), vec![status.to_string()]);
        let mut inputs = c.inputs.clone();
        inputs.nuke_and_set(&updates);

        let mut fields = Row::new();
        fields.insert(columns::INPUTS.into(), inputs.to_encoded()?.into());
        fields.insert(columns::STATUS.into(), status.to_string().into());
        self.store.update_row(COMPONENTS_TABLE, &c.id, fields).await?;

        // only touch the caller's copy once the write is durable
        c.inputs = inputs;
        c.status = status;
        info!("Component {} status -> {}", c.id, c.status);

        match self.notifier.notify(&c.id, &c.status).await {
            Ok(()) => Ok(StatusUpdate::Notified),
            Err(e) => {
                warn!("Status event for {} dropped: {}", c.id, e);
                Ok(StatusUpdate::NotifyFailed(e.to_string()))
            }
        }
    }

    /// Persist a new lifecycle state; emits no event
    pub async fn set_state(&self, c: &mut Component, state: State) -> Result<()> {
        let mut fields = Row::new();
        fields.insert(columns::STATE.into(), state.to_string().into());
        self.store.update_row(COMPONENTS_TABLE, &c.id, fields).await?;

        c.state = state;
        info!("Component {} state -> {}", c.id, c.state);
        Ok(())
    }

    /// Replace the stored operations with the ones that just ran
    ///
    /// The raw descriptors are written in execution order.
    pub async fn update_ops_run(&self, c: &mut Component, ran: &[RanOperation]) -> Result<()> {
        let raws: Vec<_> = ran.iter().map(|r| r.raw.clone()).collect();

        let mut fields = Row::new();
        fields.insert(columns::OPERATIONS.into(), codec::encode_each(&raws)?.into());
        self.store.update_row(COMPONENTS_TABLE, &c.id, fields).await?;

        info!("Component {} recorded {} operation(s) run", c.id, raws.len());
        for (op, error) in ran
            .iter()
            .filter_map(|r| r.failure().map(|e| (&r.raw, e)))
        {
            warn!("Component {} operation {} failed: {}", c.id, op.op_type, error);
        }
        c.operations = raws;
        Ok(())
    }

    /// Delete a component row, best effort
    ///
    /// Store failures are logged and returned as [`DeleteOutcome::Failed`].
    pub async fn delete(&self, id: &str) -> DeleteOutcome {
        match self.store.delete_row(COMPONENTS_TABLE, id).await {
            Ok(()) => {
                info!("Component {} deleted", id);
                DeleteOutcome::Deleted
            }
            Err(e) => {
                warn!("Failed to delete component {}: {}", id, e);
                DeleteOutcome::Failed(e.to_string())
            }
        }
    }
}
