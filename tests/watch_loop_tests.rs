//! Watch loop state machine tests
//!
//! Time is paused so reconnect delays and slow syncs run instantly.

mod common;

use common::{added, modified, CountingReconciler, FakeWatch, Subscription};
use std::time::Duration;
use thousandeyes_sync::prelude::*;

const RECONNECT_DELAY: Duration = Duration::from_secs(10);

fn watch_loop(
    watch: &FakeWatch,
    reconciler: &CountingReconciler,
) -> WatchLoop<FakeWatch, CountingReconciler> {
    WatchLoop::new(watch.clone(), reconciler.clone(), RECONNECT_DELAY)
}

#[tokio::test]
async fn test_connecting_opens_stream() {
    let watch = FakeWatch::new(vec![Subscription::Events(vec![])]);
    let reconciler = CountingReconciler::default();
    let watch_loop = watch_loop(&watch, &reconciler);

    let state = watch_loop.step(WatchState::Connecting).await;

    assert_eq!(state.name(), "streaming");
    assert_eq!(watch.opened(), 1);
}

#[tokio::test]
async fn test_subscribe_failure_moves_to_reconnecting() {
    let watch = FakeWatch::new(vec![Subscription::Fail("connection refused".to_string())]);
    let reconciler = CountingReconciler::default();
    let watch_loop = watch_loop(&watch, &reconciler);

    let state = watch_loop.step(WatchState::Connecting).await;

    assert!(matches!(state, WatchState::Reconnecting(_)));
    assert_eq!(reconciler.calls(), 0);
}

#[tokio::test]
async fn test_event_triggers_one_sync_and_keeps_streaming() {
    let watch = FakeWatch::new(vec![Subscription::Events(vec![added("tests")])]);
    let reconciler = CountingReconciler::default();
    let watch_loop = watch_loop(&watch, &reconciler);

    let state = watch_loop.step(WatchState::Connecting).await;
    let state = watch_loop.step(state).await;

    assert_eq!(state.name(), "streaming");
    assert_eq!(reconciler.calls(), 1);
}

#[tokio::test]
async fn test_stream_end_reconnects_without_delay() {
    let watch = FakeWatch::new(vec![Subscription::Events(vec![])]);
    let reconciler = CountingReconciler::default();
    let watch_loop = watch_loop(&watch, &reconciler);

    let state = watch_loop.step(WatchState::Connecting).await;
    let start = tokio::time::Instant::now();
    let state = watch_loop.step(state).await;

    assert_eq!(state.name(), "connecting");
    assert!(start.elapsed() < RECONNECT_DELAY);
    assert_eq!(reconciler.calls(), 0);
}

#[tokio::test]
async fn test_stream_error_moves_to_reconnecting() {
    let watch = FakeWatch::new(vec![Subscription::Events(vec![Err(
        SourceError::WatchEvent("410 Gone".to_string()),
    )])]);
    let reconciler = CountingReconciler::default();
    let watch_loop = watch_loop(&watch, &reconciler);

    let state = watch_loop.step(WatchState::Connecting).await;
    let state = watch_loop.step(state).await;

    assert!(matches!(
        state,
        WatchState::Reconnecting(SourceError::WatchEvent(_))
    ));
    assert_eq!(reconciler.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_reconnecting_waits_for_delay() {
    let watch = FakeWatch::default();
    let reconciler = CountingReconciler::default();
    let watch_loop = watch_loop(&watch, &reconciler);

    let start = tokio::time::Instant::now();
    let state = watch_loop
        .step(WatchState::Reconnecting(SourceError::Other(
            "connection reset".to_string(),
        )))
        .await;

    assert_eq!(state.name(), "connecting");
    assert_eq!(start.elapsed(), RECONNECT_DELAY);
    assert_eq!(watch.opened(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_run_survives_failures_and_syncs_every_event() {
    let watch = FakeWatch::new(vec![
        Subscription::Fail("connection refused".to_string()),
        Subscription::Events(vec![added("tests"), modified("tests")]),
        Subscription::Events(vec![modified("more-tests")]),
    ]);
    let reconciler = CountingReconciler::default();
    let watch_loop = watch_loop(&watch, &reconciler);

    let result = tokio::time::timeout(Duration::from_secs(60), watch_loop.run()).await;

    assert!(result.is_err(), "the watch loop never returns on its own");
    assert_eq!(reconciler.calls(), 3);
    // failed subscribe, two scripted streams, then the idle one it is parked on
    assert_eq!(watch.opened(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_syncs_never_overlap() {
    let watch = FakeWatch::new(vec![Subscription::Events(vec![
        added("a"),
        modified("a"),
        modified("b"),
    ])]);
    let reconciler = CountingReconciler::slow(Duration::from_secs(5));
    let watch_loop = watch_loop(&watch, &reconciler);

    let start = tokio::time::Instant::now();
    let result = tokio::time::timeout(Duration::from_secs(60), watch_loop.run()).await;

    assert!(result.is_err());
    assert!(start.elapsed() >= Duration::from_secs(15));
    assert_eq!(reconciler.calls(), 3);
    assert_eq!(reconciler.max_in_flight(), 1);
}
