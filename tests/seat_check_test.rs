use std::sync::Arc;
use std::sync::atomic::Ordering;

use seat_watch::repository::subscription_table::SEATS_COLUMN;
use seat_watch::service::seat_check_service::PassOutcome;
use seat_watch::service::seat_check_service::SeatCheckService;
use tokio::sync::Notify;

mod common;

use common::MemoryRowStore;
use common::RecordingNotifier;
use common::ScriptedSource;

fn completed(outcome: PassOutcome) -> seat_watch::service::seat_check_service::PassSummary {
    match outcome {
        PassOutcome::Completed(summary) => summary,
        PassOutcome::AlreadyRunning => panic!("Expected a completed pass"),
    }
}

#[tokio::test]
async fn test_only_changed_class_is_alerted_and_stored() {
    let store = MemoryRowStore::with_rows(&[
        ["fall2024", "acct", "201", "111,222", "5"],
        ["fall2024", "acct", "305", "333", "-2"],
    ]);
    let source = Arc::new(
        ScriptedSource::new().page("fall2024", "acct", &[("201", 3), ("305", -2)]),
    );
    let notifier = Arc::new(RecordingNotifier::new());
    let service = SeatCheckService::new(common::table_over(&store), source.clone(), notifier.clone());

    let summary = completed(service.run_pass().await.unwrap());

    assert_eq!(source.call_count(), 1);
    assert_eq!(
        notifier.messages(),
        vec![
            "<@111> <@222> :warning: Class ACCT#201 now has 3 seats left, from 5 seats previously!"
                .to_string()
        ]
    );
    assert_eq!(store.cell(2, SEATS_COLUMN), "3");
    assert_eq!(store.cell(3, SEATS_COLUMN), "-2");
    assert_eq!(store.write_count(), 1);
    assert_eq!(summary.groups, 1);
    assert_eq!(summary.classes, 2);
    assert_eq!(summary.changed, 1);
    assert_eq!(summary.notified, 1);
}

#[tokio::test]
async fn test_failed_page_skips_group_but_not_others() {
    let store = MemoryRowStore::with_rows(&[
        ["fall2024", "acct", "201", "111", "5"],
        ["fall2024", "acct", "305", "111", "1"],
        ["fall2024", "math", "101", "222", "0"],
    ]);
    // No script for fall2024/acct: the whole page fails.
    let source = Arc::new(ScriptedSource::new().page("fall2024", "math", &[("101", -1)]));
    let notifier = Arc::new(RecordingNotifier::new());
    let service = SeatCheckService::new(common::table_over(&store), source.clone(), notifier.clone());

    let summary = completed(service.run_pass().await.unwrap());

    assert_eq!(source.call_count(), 2);
    assert_eq!(summary.not_found, 2);
    assert_eq!(store.cell(2, SEATS_COLUMN), "5");
    assert_eq!(store.cell(3, SEATS_COLUMN), "1");
    assert_eq!(store.cell(4, SEATS_COLUMN), "-1");
    assert_eq!(
        notifier.messages(),
        vec![
            "<@222> :warning: Class MATH#101 now has 1 of 5 waitlist seats full, from 0 seats previously!"
                .to_string()
        ]
    );
}

#[tokio::test]
async fn test_unwatched_class_is_stored_without_alert() {
    let store = MemoryRowStore::with_rows(&[["winter2025", "engl&", "2011", "", "10"]]);
    let source = Arc::new(ScriptedSource::new().page("winter2025", "engl&", &[("2011", 0)]));
    let notifier = Arc::new(RecordingNotifier::new());
    let service = SeatCheckService::new(common::table_over(&store), source, notifier.clone());

    let summary = completed(service.run_pass().await.unwrap());

    assert!(notifier.messages().is_empty());
    assert_eq!(store.cell(2, SEATS_COLUMN), "0");
    assert_eq!(summary.changed, 1);
    assert_eq!(summary.notified, 0);
}

#[tokio::test]
async fn test_unknown_previous_count_is_alerted() {
    let store = MemoryRowStore::with_rows(&[["fall2024", "acct", "201", "111", ""]]);
    let source = Arc::new(ScriptedSource::new().page("fall2024", "acct", &[("201", 0)]));
    let notifier = Arc::new(RecordingNotifier::new());
    let service = SeatCheckService::new(common::table_over(&store), source, notifier.clone());

    service.run_pass().await.unwrap();

    assert_eq!(
        notifier.messages(),
        vec![
            "<@111> :warning: Class ACCT#201 is now full (no waitlist information), from ? seats previously!"
                .to_string()
        ]
    );
    assert_eq!(store.cell(2, SEATS_COLUMN), "0");
}

#[tokio::test]
async fn test_failed_alert_keeps_previous_count() {
    let store = MemoryRowStore::with_rows(&[["fall2024", "acct", "201", "111", "5"]]);
    let source = Arc::new(ScriptedSource::new().page("fall2024", "acct", &[("201", 4)]));
    let notifier = Arc::new(RecordingNotifier::new());
    notifier.fail.store(true, Ordering::SeqCst);
    let service = SeatCheckService::new(common::table_over(&store), source, notifier.clone());

    let summary = completed(service.run_pass().await.unwrap());
    assert_eq!(summary.failures, 1);
    assert_eq!(store.cell(2, SEATS_COLUMN), "5");
    assert_eq!(store.write_count(), 0);

    // The change is reported again once delivery works.
    notifier.fail.store(false, Ordering::SeqCst);
    let summary = completed(service.run_pass().await.unwrap());
    assert_eq!(summary.notified, 1);
    assert_eq!(store.cell(2, SEATS_COLUMN), "4");
}

#[tokio::test]
async fn test_groups_ignore_case_and_fetch_once() {
    let store = MemoryRowStore::with_rows(&[
        ["fall2024", "acct", "201", "1", "5"],
        ["FALL2024", "ACCT", "305", "2", "5"],
    ]);
    let source = Arc::new(
        ScriptedSource::new().page("fall2024", "acct", &[("201", 5), ("305", 5)]),
    );
    let notifier = Arc::new(RecordingNotifier::new());
    let service = SeatCheckService::new(common::table_over(&store), source.clone(), notifier.clone());

    let summary = completed(service.run_pass().await.unwrap());

    let calls = source.calls.lock().unwrap().clone();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].2, vec!["201".to_string(), "305".to_string()]);
    assert_eq!(summary.changed, 0);
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn test_overlapping_pass_is_rejected() {
    let store = MemoryRowStore::with_rows(&[["fall2024", "acct", "201", "1", "5"]]);
    let entered = Arc::new(Notify::new());
    let gate = Arc::new(Notify::new());
    let source = Arc::new(
        ScriptedSource::with_gate(entered.clone(), gate.clone())
            .page("fall2024", "acct", &[("201", 5)]),
    );
    let notifier = Arc::new(RecordingNotifier::new());
    let service = Arc::new(SeatCheckService::new(
        common::table_over(&store),
        source.clone(),
        notifier,
    ));

    let first = tokio::spawn({
        let service = service.clone();
        async move { service.run_pass().await }
    });
    entered.notified().await;

    assert!(matches!(
        service.run_pass().await.unwrap(),
        PassOutcome::AlreadyRunning
    ));

    gate.notify_one();
    let summary = completed(first.await.unwrap().unwrap());
    assert_eq!(summary.classes, 1);
    assert_eq!(source.call_count(), 1);

    // The guard is released once the pass finishes.
    gate.notify_one();
    assert!(matches!(
        service.run_pass().await.unwrap(),
        PassOutcome::Completed(_)
    ));
}

#[tokio::test]
async fn test_empty_store_runs_no_fetches() {
    let store = MemoryRowStore::with_rows(&[]);
    let source = Arc::new(ScriptedSource::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let service = SeatCheckService::new(common::table_over(&store), source.clone(), notifier);

    let summary = completed(service.run_pass().await.unwrap());
    assert_eq!(summary.groups, 0);
    assert_eq!(source.call_count(), 0);
}

#[tokio::test]
async fn test_write_failures_do_not_stop_later_groups() {
    let store = MemoryRowStore::with_rows(&[
        ["fall2024", "acct", "201", "111", "5"],
        ["fall2024", "math", "101", "222", "2"],
    ]);
    store.fail_writes.store(true, Ordering::SeqCst);
    let source = Arc::new(
        ScriptedSource::new()
            .page("fall2024", "acct", &[("201", 3)])
            .page("fall2024", "math", &[("101", 0)]),
    );
    let notifier = Arc::new(RecordingNotifier::new());
    let service = SeatCheckService::new(common::table_over(&store), source.clone(), notifier.clone());

    let summary = completed(service.run_pass().await.unwrap());

    assert_eq!(source.call_count(), 2);
    assert_eq!(summary.groups, 2);
    assert_eq!(summary.changed, 2);
    assert_eq!(summary.failures, 2);
    assert_eq!(notifier.messages().len(), 2);
    assert_eq!(store.cell(2, SEATS_COLUMN), "5");
    assert_eq!(store.cell(3, SEATS_COLUMN), "2");
}

#[tokio::test]
async fn test_alert_repeats_until_count_is_stored() {
    let store = MemoryRowStore::with_rows(&[["fall2024", "acct", "201", "111", "5"]]);
    store.fail_writes.store(true, Ordering::SeqCst);
    let source = Arc::new(ScriptedSource::new().page("fall2024", "acct", &[("201", 3)]));
    let notifier = Arc::new(RecordingNotifier::new());
    let service = SeatCheckService::new(common::table_over(&store), source, notifier.clone());

    service.run_pass().await.unwrap();
    service.run_pass().await.unwrap();
    assert_eq!(notifier.messages().len(), 2);

    store.fail_writes.store(false, Ordering::SeqCst);
    service.run_pass().await.unwrap();
    service.run_pass().await.unwrap();
    assert_eq!(notifier.messages().len(), 3);
    assert_eq!(store.cell(2, SEATS_COLUMN), "3");
}

#[tokio::test]
async fn test_large_watch_list_is_alerted_in_several_messages() {
    let ids: Vec<String> = (0..150).map(|i| format!("2000000000000{i:05}")).collect();
    let subscribers = ids.join(",");
    let store = MemoryRowStore::with_rows(&[["fall2024", "acct", "201", &subscribers, "5"]]);
    let source = Arc::new(ScriptedSource::new().page("fall2024", "acct", &[("201", 3)]));
    let notifier = Arc::new(RecordingNotifier::new());
    let service = SeatCheckService::new(common::table_over(&store), source, notifier.clone());

    let summary = completed(service.run_pass().await.unwrap());

    let messages = notifier.messages();
    assert!(messages.len() > 1);
    assert!(messages.iter().all(|m| m.chars().count() <= 2000));
    assert_eq!(
        messages.iter().map(|m| m.matches("<@").count()).sum::<usize>(),
        150
    );
    assert_eq!(summary.notified, 1);
    assert_eq!(store.write_count(), 1);
    assert_eq!(store.cell(2, SEATS_COLUMN), "3");
}
