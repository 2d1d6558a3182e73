use fcst_core::prelude::*;
use fcst_edit::{DebounceState, EditConfig, NoticeLevel};
use fcst_test_utils::{
    sample_schema, scenario_records, FailingSink, RecordingNotifier, RecordingSink,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

fn debounced() -> DeskConfig {
    DeskConfig::new().with_edit(EditConfig::new().with_mode(EditMode::Debounced))
}

fn desk(sink: Arc<dyn CommitSink>, notifier: Arc<dyn Notifier>) -> Workbench {
    Workbench::new(sample_schema(), scenario_records(), &debounced(), sink, notifier).unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_burst_commits_last_value_once() {
    let sink = Arc::new(RecordingSink::new());
    let mut desk = desk(sink.clone(), Arc::new(RecordingNotifier::new()));

    for value in [1.0, 12.0, 123.0] {
        desk.edit("1", "amount", value).unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert_eq!(desk.store().get("1").unwrap().number("amount"), 123.0);
    assert_eq!(
        desk.edit_state("1", "amount"),
        DebounceState::Pending(Scalar::Number(123.0))
    );
    assert_eq!(sink.commit_count(), 0);

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(sink.commit_count(), 1);
    assert_eq!(sink.last_value("1", "amount"), Some(Scalar::Number(123.0)));
    assert_eq!(desk.edit_state("1", "amount"), DebounceState::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_cells_coalesce_independently() {
    let sink = Arc::new(RecordingSink::new());
    let mut desk = desk(sink.clone(), Arc::new(RecordingNotifier::new()));

    desk.edit("1", "amount", 5.0).unwrap();
    desk.edit("2", "amount", 6.0).unwrap();
    desk.edit("1", "amount", 7.0).unwrap();
    tokio::time::sleep(Duration::from_millis(250)).await;

    assert_eq!(sink.commit_count(), 2);
    assert_eq!(sink.last_value("1", "amount"), Some(Scalar::Number(7.0)));
    assert_eq!(sink.last_value("2", "amount"), Some(Scalar::Number(6.0)));
}

#[tokio::test(start_paused = true)]
async fn test_commit_failure_notifies_and_keeps_local_value() {
    let sink = Arc::new(FailingSink::unavailable());
    let notifier = Arc::new(RecordingNotifier::new());
    let mut desk = desk(sink.clone(), notifier.clone());

    desk.edit("3", "amount", 99.0).unwrap();
    tokio::time::sleep(Duration::from_millis(250)).await;

    assert_eq!(sink.attempts(), 1);
    let notices = notifier.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert_eq!(notices[0].key, Some(RecordKey::from("3")));
    assert_eq!(desk.store().get("3").unwrap().number("amount"), 99.0);
}

#[tokio::test(start_paused = true)]
async fn test_flush_and_cancel() {
    let sink = Arc::new(RecordingSink::new());
    let mut desk = desk(sink.clone(), Arc::new(RecordingNotifier::new()));

    desk.edit("1", "amount", 1.0).unwrap();
    desk.edit("2", "amount", 2.0).unwrap();
    desk.edit("4", "amount", 4.0).unwrap();
    assert_eq!(desk.cancel_edit("4", "amount"), Some(Scalar::Number(4.0)));

    assert_eq!(desk.flush().await.unwrap(), 2);
    assert_eq!(sink.batches(), vec![2]);

    tokio::time::sleep(Duration::from_millis(250)).await;
    assert_eq!(sink.commit_count(), 2);
    assert_eq!(desk.store().get("4").unwrap().number("amount"), 4.0);
}

#[tokio::test(start_paused = true)]
async fn test_batch_edit_sends_one_batch() {
    let sink = Arc::new(RecordingSink::new());
    let mut desk = desk(sink.clone(), Arc::new(RecordingNotifier::new()));

    desk.edit("1", "amount", 3.0).unwrap();
    let outcome = desk.batch_edit(vec![
        EditPatch::new("1", "amount", 8.0),
        EditPatch::new("2", "amount", 9.0),
    ]);
    assert_eq!(outcome.applied.len(), 2);

    tokio::time::sleep(Duration::from_millis(250)).await;
    assert_eq!(sink.batches(), vec![2]);
    assert_eq!(sink.commit_count(), 2);
    assert_eq!(sink.last_value("1", "amount"), Some(Scalar::Number(8.0)));
}

#[tokio::test(start_paused = true)]
async fn test_immediate_mode_never_commits() {
    let sink = Arc::new(RecordingSink::new());
    let mut desk = Workbench::new(
        sample_schema(),
        scenario_records(),
        &DeskConfig::default(),
        sink.clone(),
        Arc::new(RecordingNotifier::new()),
    )
    .unwrap();

    desk.edit("1", "amount", 42.0).unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(sink.commit_count(), 0);
    assert_eq!(desk.edit_state("1", "amount"), DebounceState::Idle);
}
