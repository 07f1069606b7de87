//! Contract Test: Component lifecycle mutations
//!
//! Constraints verified:
//! - status changes are persisted with a single refreshed timestamp input
//! - notification happens only after a successful persist, and its failure
//!   never turns into an error
//! - state changes never notify and never touch inputs
//! - operation history is replaced in execution order
//! - delete failures are reported, not raised
//! - a failed write leaves the caller's record as it was
//! - null or wrongly typed columns never make a row unreadable

mod common;

use carton_core::lifecycle::LAST_STATUS_UPDATE;
use carton_core::record::COMPONENTS_TABLE;
use carton_core::traits::TableStore;
use carton_core::{DeleteOutcome, Operation, RanOperation, State, Status, StatusUpdate};
use common::*;
use serde_json::{Value, json};

#[tokio::test]
async fn set_status_then_fetch_shows_status_and_single_timestamp() {
    let h = harness();
    seed(h.store.as_ref(), sample_row("COM0001")).await;

    let mut c = h.components.fetch("COM0001").await.unwrap();
    let outcome = h
        .components
        .set_status(&mut c, Status::from("running"))
        .await
        .unwrap();
    assert_eq!(outcome, StatusUpdate::Notified);

    // repeated calls must not duplicate the refreshed keys
    let mut again = h.components.fetch("COM0001").await.unwrap();
    h.components
        .set_status(&mut again, Status::from("running"))
        .await
        .unwrap();

    let fetched = h.components.fetch("COM0001").await.unwrap();
    assert_eq!(fetched.status.as_str(), "running");
    assert_eq!(fetched.inputs.matching("status"), "running");
    assert_eq!(fetched.inputs.count_of("status"), 1);
    assert_eq!(fetched.inputs.count_of(LAST_STATUS_UPDATE), 1);
    assert!(fetched.inputs.matching(LAST_STATUS_UPDATE).ends_with(" UTC"));

    // untouched inputs survive
    assert_eq!(fetched.inputs.matching("domain"), "megambox.com");
    assert_eq!(fetched.inputs.matching("provider"), "one");
}

#[tokio::test]
async fn set_status_notifies_after_persist() {
    let h = harness();
    seed(h.store.as_ref(), sample_row("COM0001")).await;

    let mut c = h.components.fetch("COM0001").await.unwrap();
    h.components
        .set_status(&mut c, Status::from("running"))
        .await
        .unwrap();

    assert_eq!(
        h.notifier.calls(),
        vec![("COM0001".to_string(), "running".to_string())]
    );
    assert_eq!(c.status.as_str(), "running");
}

#[tokio::test]
async fn notify_failure_is_reported_not_raised() {
    let h = harness_with(RecordingNotifier::failing());
    seed(h.store.as_ref(), sample_row("COM0001")).await;

    let mut c = h.components.fetch("COM0001").await.unwrap();
    let outcome = h
        .components
        .set_status(&mut c, Status::from("error"))
        .await
        .expect("persist succeeded, so no error");

    assert!(matches!(outcome, StatusUpdate::NotifyFailed(ref m) if m.contains("event bus")));
    let fetched = h.components.fetch("COM0001").await.unwrap();
    assert_eq!(fetched.status.as_str(), "error");
}

#[tokio::test]
async fn persist_failure_is_error_and_skips_notify() {
    let h = harness();
    seed(h.store.as_ref(), sample_row("COM0001")).await;
    h.store.fail_updates(true);

    let mut c = h.components.fetch("COM0001").await.unwrap();
    let before = c.clone();
    let result = h.components.set_status(&mut c, Status::from("running")).await;

    assert!(result.is_err());
    assert_eq!(h.notifier.call_count(), 0);
    // the caller's record is untouched, inputs included
    assert_eq!(c, before);
    assert_eq!(c.inputs.count_of(LAST_STATUS_UPDATE), 0);

    h.store.fail_updates(false);
    let fetched = h.components.fetch("COM0001").await.unwrap();
    assert_eq!(fetched.status.as_str(), "launching");
}

#[tokio::test]
async fn set_status_on_missing_row_is_not_found() {
    let h = harness();
    let mut c = carton_core::Component {
        id: "ghost".into(),
        ..Default::default()
    };

    let err = h
        .components
        .set_status(&mut c, Status::from("running"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(h.notifier.call_count(), 0);
}

#[tokio::test]
async fn set_state_persists_without_event_or_input_change() {
    let h = harness();
    seed(h.store.as_ref(), sample_row("COM0001")).await;

    let mut c = h.components.fetch("COM0001").await.unwrap();
    let inputs_before = c.inputs.clone();
    h.components
        .set_state(&mut c, State::from("deployed"))
        .await
        .unwrap();

    let fetched = h.components.fetch("COM0001").await.unwrap();
    assert_eq!(fetched.state.as_str(), "deployed");
    assert_eq!(fetched.status.as_str(), "launching");
    assert_eq!(fetched.inputs, inputs_before);
    assert_eq!(h.notifier.call_count(), 0);
}

#[tokio::test]
async fn set_state_failure_is_error() {
    let h = harness();
    seed(h.store.as_ref(), sample_row("COM0001")).await;
    h.store.fail_updates(true);

    let mut c = h.components.fetch("COM0001").await.unwrap();
    assert!(h.components.set_state(&mut c, State::from("deployed")).await.is_err());
    assert_eq!(c.state.as_str(), "bootstrapped");
}

#[tokio::test]
async fn update_ops_run_replaces_history_in_order() {
    let h = harness();
    seed(h.store.as_ref(), sample_row("COM0001")).await;

    let mut c = h.components.fetch("COM0001").await.unwrap();
    let ran = vec![
        RanOperation::succeeded(Operation::new("upgrade").with_description("first")),
        RanOperation::failed(Operation::new("ci").with_description("second"), "hook timed out"),
    ];
    h.components.update_ops_run(&mut c, &ran).await.unwrap();

    let fetched = h.components.fetch("COM0001").await.unwrap();
    let descriptions: Vec<_> = fetched
        .operations
        .iter()
        .map(|o| o.description.as_str())
        .collect();
    assert_eq!(descriptions, vec!["first", "second"]);
    assert_eq!(fetched.operations[1].op_type, "ci");
    assert_eq!(c.operations, fetched.operations);
}

#[tokio::test]
async fn fetch_missing_is_not_found() {
    let h = harness();
    let err = h.components.fetch("COM404").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn fetch_with_malformed_operation_drops_only_that_entry() {
    let h = harness();
    let mut row = sample_row("COM0001");
    row.operations.push("{this is not an operation".to_string());
    row.operations
        .push(r#"{"operation_type":"upgrade","description":"","properties":[],"status":""}"#.to_string());
    let stored = row.operations.len();
    seed(h.store.as_ref(), row).await;

    let (c, report) = h.components.fetch_with_report("COM0001").await.unwrap();

    assert_eq!(c.operations.len(), stored - 1);
    assert_eq!(report.skipped_count(), 1);
    assert_eq!(report.skipped()[0].field, "operations");
}

#[tokio::test]
async fn fetch_with_null_columns_reads_as_empty() {
    let h = harness();
    let mut raw = sample_row("COM0001").into_row().unwrap();
    raw.insert("artifacts".into(), Value::Null);
    raw.insert("related_components".into(), Value::Null);
    raw.insert("envs".into(), Value::Null);
    h.store
        .insert_row(COMPONENTS_TABLE, "COM0001", raw)
        .await
        .unwrap();

    let (c, report) = h.components.fetch_with_report("COM0001").await.unwrap();

    assert!(report.is_clean(), "unexpected skips: {:?}", report);
    assert!(c.artifacts.is_none());
    assert!(c.envs.is_empty());
    assert_eq!(c.inputs.matching("domain"), "megambox.com");
    assert!(c.repo.is_some());
}

#[tokio::test]
async fn fetch_with_non_string_element_keeps_the_rest() {
    let h = harness();
    let mut raw = sample_row("COM0001").into_row().unwrap();
    raw.insert(
        "outputs".into(),
        json!([r#"{"key":"publicipv4","value":"192.168.1.10"}"#, 42]),
    );
    raw.insert("operations".into(), json!({"not": "a list"}));
    h.store
        .insert_row(COMPONENTS_TABLE, "COM0001", raw)
        .await
        .unwrap();

    let (c, report) = h.components.fetch_with_report("COM0001").await.unwrap();

    assert_eq!(c.public_ip(), "192.168.1.10");
    assert!(c.operations.is_empty());
    assert_eq!(c.status.as_str(), "launching");
    assert_eq!(report.skipped_count(), 2);
    assert_eq!(report.skipped_in("outputs").next().unwrap().index, Some(1));
    assert_eq!(report.skipped_in("operations").count(), 1);
}

#[tokio::test]
async fn delete_reports_failure_without_error() {
    let h = harness();
    seed(h.store.as_ref(), sample_row("COM0001")).await;

    h.store.fail_deletes(true);
    assert!(matches!(
        h.components.delete("COM0001").await,
        DeleteOutcome::Failed(_)
    ));
    assert!(h.components.fetch("COM0001").await.is_ok());

    h.store.fail_deletes(false);
    assert_eq!(h.components.delete("COM0001").await, DeleteOutcome::Deleted);
    assert!(h.components.fetch("COM0001").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn fetched_component_projects_to_box() {
    let h = harness();
    seed(h.store.as_ref(), sample_row("COM0001")).await;

    let c = h.components.fetch("COM0001").await.unwrap();
    let b = c.mk_box();

    assert_eq!(b.domain_name, "megambox.com");
    assert_eq!(b.provider, "one");
    assert_eq!(b.public_ip, "192.168.1.10");
    let repo = b.repo.expect("repo section");
    assert!(repo.one_click);
    assert!(repo.hook.enabled);
}
