// # carton-core
//
// Record projection and payload reconciliation for provisioned components.
//
// ## Architecture Overview
//
// - **Pairs**: ordered key/value attribute lists with first-match lookup
// - **Codec**: per-element JSON encoding of composite columns
// - **ComponentRow / Component**: stored row and its decoded form
// - **ProvisionBox**: read-only view handed to the provisioning engine
// - **Components**: status/state/operation-history mutations and events
// - **PayloadResolver**: local or remote resolution of inbound payloads
//
// ## Collaborators
//
// - **TableStore**: keyed row access (memory and file implementations here)
// - **RequestAuthority**: remote request lookup (`carton-api-http`)
// - **EventNotifier**: status-change sink
// - **HookBuilder**: operation selection for hooks
//
// ## Flow
//
// ```text
// TableStore ─fetch_row─▶ ComponentRow ─dig─▶ Component ─mk_box─▶ ProvisionBox
//     ▲                                           │
//     └───────── set_status / set_state ──────────┘──▶ EventNotifier
//
// queue bytes ─from_bytes─▶ Payload ─resolve─▶ Request
//                                       └─(no cat_id)─▶ RequestAuthority
// ```

pub mod codec;
pub mod config;
pub mod error;
pub mod events;
pub mod lifecycle;
pub mod operation;
pub mod pairs;
pub mod payload;
pub mod provision;
pub mod record;
pub mod status;
pub mod store;
pub mod traits;

// Re-export core types for convenience
pub use codec::{DecodeReport, SkippedField};
pub use config::{ApiConfig, CartonConfig, EventsConfig, StoreConfig};
pub use error::{Error, Result};
pub use events::{ChannelNotifier, ComponentEvent, LogNotifier};
pub use lifecycle::{Components, DeleteOutcome, StatusUpdate};
pub use operation::{CategoryHookBuilder, Hook, Operation, RanOperation};
pub use pairs::{Pair, Pairs};
pub use payload::{Payload, PayloadResolver, Request, Resolution};
pub use provision::{BoxLevel, EnvVar, ProvisionBox, RepoView};
pub use record::{Artifacts, Component, ComponentRow, Repo};
pub use status::{State, Status};
pub use store::{FileTableStore, MemoryTableStore};
pub use traits::{EventNotifier, HookBuilder, RequestAuthority, TableStore};
