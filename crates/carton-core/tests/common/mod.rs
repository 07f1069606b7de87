//! Test doubles and common utilities for carton contract tests

#![allow(dead_code)]

use carton_core::error::{Error, Result};
use carton_core::record::{COMPONENTS_TABLE, ComponentRow};
use carton_core::status::Status;
use carton_core::store::MemoryTableStore;
use carton_core::traits::{EventNotifier, RequestAuthority, Row, TableStore};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// A notifier that records every call and can be told to fail
#[derive(Default)]
pub struct RecordingNotifier {
    calls: Mutex<Vec<(String, String)>>,
    fail: AtomicBool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let n = Self::default();
        n.fail.store(true, Ordering::SeqCst);
        n
    }

    /// (component id, status) pairs in call order
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl EventNotifier for RecordingNotifier {
    async fn notify(&self, component_id: &str, status: &Status) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push((component_id.to_string(), status.to_string()));
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::Other("event bus unavailable".to_string()));
        }
        Ok(())
    }
}

/// A table store wrapper whose writes can be made to fail
pub struct FlakyStore {
    inner: MemoryTableStore,
    fail_updates: AtomicBool,
    fail_deletes: AtomicBool,
    update_calls: AtomicUsize,
}

impl FlakyStore {
    pub fn new(inner: MemoryTableStore) -> Self {
        Self {
            inner,
            fail_updates: AtomicBool::new(false),
            fail_deletes: AtomicBool::new(false),
            update_calls: AtomicUsize::new(0),
        }
    }

    pub fn fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl TableStore for FlakyStore {
    async fn fetch_row(&self, table: &str, key: &str) -> Result<Row> {
        self.inner.fetch_row(table, key).await
    }

    async fn insert_row(&self, table: &str, key: &str, row: Row) -> Result<()> {
        self.inner.insert_row(table, key, row).await
    }

    async fn update_row(&self, table: &str, key: &str, fields: Row) -> Result<()> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(Error::store("write timeout"));
        }
        self.inner.update_row(table, key, fields).await
    }

    async fn delete_row(&self, table: &str, key: &str) -> Result<()> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(Error::store("no host available"));
        }
        self.inner.delete_row(table, key).await
    }

    fn store_name(&self) -> &'static str {
        "flaky"
    }
}

/// What the mock authority answers with
pub enum AuthorityReply {
    Body(String),
    Fail(String),
}

/// A request authority that records requested ids
pub struct MockAuthority {
    reply: AuthorityReply,
    requested: Mutex<Vec<String>>,
}

impl MockAuthority {
    pub fn replying(body: &str) -> Self {
        Self {
            reply: AuthorityReply::Body(body.to_string()),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: AuthorityReply::Fail(message.to_string()),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }

    /// Paths the equivalent HTTP authority would have requested
    pub fn requested_paths(&self) -> Vec<String> {
        self.requested()
            .iter()
            .map(|id| format!("/requests/{}", id))
            .collect()
    }
}

#[async_trait::async_trait]
impl RequestAuthority for MockAuthority {
    async fn fetch_request(&self, id: &str) -> Result<Vec<u8>> {
        self.requested.lock().unwrap().push(id.to_string());
        match &self.reply {
            AuthorityReply::Body(body) => Ok(body.clone().into_bytes()),
            AuthorityReply::Fail(message) => Err(Error::http(message.clone())),
        }
    }

    fn authority_name(&self) -> &'static str {
        "mock"
    }
}

/// A fully populated component row
pub fn sample_row(id: &str) -> ComponentRow {
    ComponentRow {
        id: id.to_string(),
        name: "tolerant.megambox.com".to_string(),
        tosca_type: "tosca.app.java".to_string(),
        inputs: vec![
            r#"{"key":"domain","value":"megambox.com"}"#.to_string(),
            r#"{"key":"provider","value":"one"}"#.to_string(),
        ],
        outputs: vec![r#"{"key":"publicipv4","value":"192.168.1.10"}"#.to_string()],
        envs: vec![r#"{"key":"oneclick","value":"yes"}"#.to_string()],
        repo: r#"{"rtype":"source","source":"github","oneclick":"yes","url":"https://github.com/megamsys/java.git"}"#.to_string(),
        artifacts: String::new(),
        related_components: vec![],
        operations: vec![
            r#"{"operation_type":"ci","description":"github hook","properties":[],"status":""}"#
                .to_string(),
        ],
        status: "launching".to_string(),
        state: "bootstrapped".to_string(),
        created_at: "2016-04-06 11:46:36 +0000".to_string(),
    }
}

/// Seed `row` into `store`
pub async fn seed(store: &dyn TableStore, row: ComponentRow) {
    let id = row.id.clone();
    store
        .insert_row(COMPONENTS_TABLE, &id, row.into_row().expect("row encodes"))
        .await
        .expect("seed succeeds");
}

/// Shared handles for lifecycle tests
pub struct Harness {
    pub store: Arc<FlakyStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub components: carton_core::Components,
}

pub fn harness_with(notifier: RecordingNotifier) -> Harness {
    let store = Arc::new(FlakyStore::new(MemoryTableStore::new()));
    let notifier = Arc::new(notifier);
    let components = carton_core::Components::new(store.clone(), notifier.clone());
    Harness {
        store,
        notifier,
        components,
    }
}

pub fn harness() -> Harness {
    harness_with(RecordingNotifier::new())
}
