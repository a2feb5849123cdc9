// SPDX-FileCopyrightText: 2026 Foliowatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Poll loop timing under a paused tokio clock.

use std::sync::Arc;
use std::time::Duration;

use foliowatch_core::{AlertLevel, HistoryStore, Module};
use foliowatch_poller::{LocalSubmitter, Poller, PollerState};
use foliowatch_test_utils::{MockSource, RecordingSubmitter, TestHarness};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

const HOUR: Duration = Duration::from_secs(3600);

fn minutes(n: u64) -> Duration {
    Duration::from_secs(n * 60)
}

fn offsets(base: Instant, started: &[Instant]) -> Vec<Duration> {
    started.iter().map(|s| s.duration_since(base)).collect()
}

fn source() -> Arc<MockSource> {
    Arc::new(MockSource::new().with_series(Module::Invoice, "S01", 1, 100, Some(50)))
}

#[tokio::test(start_paused = true)]
async fn first_cycle_waits_one_interval() {
    let submitter = Arc::new(RecordingSubmitter::new());
    let poller = Arc::new(Poller::new(source(), submitter.clone(), HOUR));
    let cancel = CancellationToken::new();

    let handle = tokio::spawn({
        let poller = poller.clone();
        let cancel = cancel.clone();
        async move { poller.run(cancel).await }
    });

    tokio::time::sleep(minutes(59)).await;
    assert_eq!(submitter.call_count(), 0);
    assert_eq!(poller.state(), PollerState::Waiting);

    tokio::time::sleep(minutes(2)).await;
    assert_eq!(submitter.call_count(), 1);

    cancel.cancel();
    handle.await.unwrap();
    assert_eq!(poller.state(), PollerState::Stopped);
}

#[tokio::test(start_paused = true)]
async fn run_on_start_polls_immediately() {
    let submitter = Arc::new(RecordingSubmitter::new());
    let poller = Arc::new(Poller::new(source(), submitter.clone(), HOUR).run_on_start(true));
    let cancel = CancellationToken::new();
    let base = Instant::now();

    let handle = tokio::spawn({
        let poller = poller.clone();
        let cancel = cancel.clone();
        async move { poller.run(cancel).await }
    });

    tokio::time::sleep(minutes(90)).await;
    cancel.cancel();
    handle.await.unwrap();

    assert_eq!(
        offsets(base, &submitter.started()),
        vec![Duration::ZERO, HOUR]
    );
}

#[tokio::test(start_paused = true)]
async fn overrunning_cycle_skips_missed_ticks() {
    // The first submission stalls for two and a half intervals.
    let submitter =
        Arc::new(RecordingSubmitter::new().with_delays([HOUR * 2 + minutes(30)]));
    let poller = Arc::new(Poller::new(source(), submitter.clone(), HOUR));
    let cancel = CancellationToken::new();
    let base = Instant::now();

    let handle = tokio::spawn({
        let poller = poller.clone();
        let cancel = cancel.clone();
        async move { poller.run(cancel).await }
    });

    tokio::time::sleep(HOUR * 5 + minutes(30)).await;
    cancel.cancel();
    handle.await.unwrap();

    // One overdue tick fires on completion, then the schedule realigns.
    assert_eq!(
        offsets(base, &submitter.started()),
        vec![HOUR, HOUR * 3 + minutes(30), HOUR * 4, HOUR * 5]
    );
}

#[tokio::test(start_paused = true)]
async fn cancel_lets_running_cycle_finish() {
    let submitter = Arc::new(RecordingSubmitter::new().with_delays([minutes(30)]));
    let poller = Arc::new(Poller::new(source(), submitter.clone(), HOUR).run_on_start(true));
    let mut states = poller.subscribe();
    let cancel = CancellationToken::new();
    let base = Instant::now();

    let handle = tokio::spawn({
        let poller = poller.clone();
        let cancel = cancel.clone();
        async move { poller.run(cancel).await }
    });

    tokio::time::sleep(minutes(10)).await;
    assert_eq!(poller.state(), PollerState::Executing);
    assert!(submitter.batches().is_empty());

    cancel.cancel();
    handle.await.unwrap();

    assert!(Instant::now().duration_since(base) >= minutes(30));
    assert_eq!(submitter.batches().len(), 1);
    assert_eq!(*states.borrow_and_update(), PollerState::Stopped);
}

#[tokio::test(start_paused = true)]
async fn failed_cycle_does_not_stop_the_loop() {
    let source = Arc::new(
        MockSource::new()
            .with_series(Module::Invoice, "S01", 1, 100, Some(50))
            .fail_next(1),
    );
    let submitter = Arc::new(RecordingSubmitter::new());
    let poller = Arc::new(
        Poller::new(source.clone(), submitter.clone(), HOUR).run_on_start(true),
    );
    let cancel = CancellationToken::new();

    let handle = tokio::spawn({
        let poller = poller.clone();
        let cancel = cancel.clone();
        async move { poller.run(cancel).await }
    });

    tokio::time::sleep(minutes(90)).await;
    cancel.cancel();
    handle.await.unwrap();

    // First cycle fails on its first read, second cycle reads both modules.
    assert_eq!(source.calls(), 3);
    assert_eq!(submitter.batches().len(), 1);
    assert_eq!(submitter.batches()[0].invoices.len(), 1);
}

#[tokio::test]
async fn local_submitter_stores_and_alerts() {
    let harness = TestHarness::new().await.unwrap();
    let source = Arc::new(
        MockSource::new()
            .with_series(Module::Invoice, "S01", 1, 100, Some(50))
            .with_series(Module::CreditNote, "S01", 1, 200, Some(185)),
    );
    let poller = Poller::new(
        source,
        Arc::new(LocalSubmitter::new(harness.ingestor.clone())),
        HOUR,
    );

    poller.run_cycle().await.unwrap();

    let latest = harness.store.latest().await.unwrap();
    assert_eq!(latest.len(), 2);

    let levels: Vec<AlertLevel> = harness.sink.events().iter().map(|e| e.level).collect();
    assert_eq!(levels, vec![AlertLevel::Warning, AlertLevel::Critical]);
}
