// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! S2 (crash recovery) from spec.md §8: a worker reserves a job, is killed
//! before finishing it, and the reaper hands the job back to a fresh
//! worker without duplicating completion.

use super::prelude::{permissive_breaker_config, two_priority_worker_config};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wq_adapters::{FakeBrokerAdapter, ScriptedHandler};
use wq_core::{FakeClock, HandlerOutcome, Job, Priority};
use wq_engine::Breaker;

#[tokio::test]
async fn s2_dead_workers_reservation_is_recovered_and_then_completed() {
    let clock = FakeClock::new();
    let broker = Arc::new(FakeBrokerAdapter::new(clock.clone()));
    let config = Arc::new(two_priority_worker_config());

    // A worker reserves a job but never gets the chance to finish it or
    // refresh its heartbeat — simulating a crash right after reservation.
    let job = Job::new("a.txt", 1, Priority::new("high"), "t", "0");
    broker.push_head("ready:high", wq_wire::encode(&job)).await.expect("seed");
    let moved = broker.atomic_pop_move("ready:high", "reservation:crashed", config.block_timeout()).await.expect("pop-move");
    assert!(moved.is_some(), "job should have moved into the reservation list");
    assert_eq!(broker.list_len("ready:high"), 0);
    assert_eq!(broker.list_len("reservation:crashed"), 1);
    // No heartbeat was ever set for "crashed", so it reads as dead immediately.

    let report = wq_engine::reaper::run_once(broker.as_ref(), &config, &CancellationToken::new()).await.expect("reaper pass");
    assert_eq!(report.dead_workers, 1);
    assert_eq!(report.recovered_jobs, 1);
    assert_eq!(broker.list_len("reservation:crashed"), 0);
    assert_eq!(broker.list_len("ready:high"), 1, "recovered job should be back in its original ready queue");

    // A fresh worker now completes it exactly once.
    let handler = Arc::new(ScriptedHandler::always(HandlerOutcome::Ok));
    let breaker = Arc::new(Breaker::new(clock, &permissive_breaker_config()));
    let cancel = CancellationToken::new();
    let worker = tokio::spawn(wq_engine::worker::run(broker.clone(), handler.clone(), breaker, config.clone(), "fresh".to_string(), cancel.child_token()));

    let deadline = tokio::time::Instant::now() + Duration::from_secs(1);
    while broker.list_len("completed") < 1 && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    cancel.cancel();
    worker.await.expect("worker task panicked");

    assert_eq!(broker.list_len("completed"), 1);
    assert_eq!(broker.list_len("ready:high"), 0);
    assert_eq!(broker.list_len("reservation:fresh"), 0);
    let completed = broker.list_snapshot("completed");
    let decoded = wq_wire::decode(&completed[0]).expect("decode completed job");
    assert_eq!(decoded.id, job.id);
}

/// A second reaper pass over a reservation whose worker is still alive
/// (heartbeat present) must leave it untouched — only a dead worker's
/// reservation gets recovered (spec.md §4.7).
#[tokio::test]
async fn reaper_does_not_touch_a_live_workers_reservation() {
    let clock = FakeClock::new();
    let broker = Arc::new(FakeBrokerAdapter::new(clock.clone()));
    let config = Arc::new(two_priority_worker_config());

    let job = Job::new("a.txt", 1, Priority::new("high"), "t", "0");
    broker.push_head("ready:high", wq_wire::encode(&job)).await.expect("seed");
    broker.atomic_pop_move("ready:high", "reservation:alive", config.block_timeout()).await.expect("pop-move");
    broker.set_with_ttl("heartbeat:alive", b"1".to_vec(), config.heartbeat_ttl()).await.expect("heartbeat");

    let report = wq_engine::reaper::run_once(broker.as_ref(), &config, &CancellationToken::new()).await.expect("reaper pass");
    assert_eq!(report.dead_workers, 0);
    assert_eq!(report.recovered_jobs, 0);
    assert_eq!(broker.list_len("reservation:alive"), 1);
    assert_eq!(broker.list_len("ready:high"), 0);
}
