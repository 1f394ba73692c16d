// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Integration variant of S4 (spec.md §8): a worker loop actually pauses
//! consumption once the breaker trips, rather than exercising `Breaker` in
//! isolation (that's `wq-engine`'s own unit tests).

use super::prelude::two_priority_worker_config;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wq_adapters::{FakeBrokerAdapter, ScriptedHandler};
use wq_core::{HandlerOutcome, Job, Priority, SystemClock};
use wq_engine::{Breaker, CircuitBreakerConfig};

#[tokio::test]
async fn worker_stops_reserving_once_breaker_trips_and_resumes_after_cooldown() {
    // Real clock throughout: the test waits on the breaker's cooldown via
    // actual wall-clock sleeps, so a frozen `FakeClock` would never let the
    // cooldown elapse.
    let broker = Arc::new(FakeBrokerAdapter::new(SystemClock));
    // Terminal failures so every handled job is immediately dead-lettered
    // (no retry delay muddying the timing), and a breaker that trips on the
    // very first failure.
    let handler = Arc::new(ScriptedHandler::always(HandlerOutcome::Terminal));
    let breaker_config = CircuitBreakerConfig { failure_threshold: 0.99, window_ms: 60_000, cooldown_ms: 60, min_samples: 1 };
    let breaker = Arc::new(Breaker::new(SystemClock, &breaker_config));
    let config = Arc::new(two_priority_worker_config());

    for i in 0..20 {
        let job = Job::new(format!("h{i}.txt"), 1, Priority::new("high"), "t", "0");
        broker.push_head("ready:high", wq_wire::encode(&job)).await.expect("seed");
    }

    let cancel = CancellationToken::new();
    let worker = tokio::spawn(wq_engine::worker::run(broker.clone(), handler.clone(), breaker.clone(), config.clone(), "w0".to_string(), cancel.child_token()));

    // Give the worker time to process the first job (which trips the
    // breaker) and then try to reserve more while it's Open.
    tokio::time::sleep(Duration::from_millis(60)).await;
    let dlq_after_trip = broker.list_len("dlq");
    assert!(dlq_after_trip >= 1, "expected at least one job dead-lettered before the breaker tripped");
    assert!(dlq_after_trip < 20, "breaker should have stopped the worker from draining the whole queue: dlq={dlq_after_trip}");

    // After the cooldown elapses the breaker admits exactly one probe;
    // since the handler still fails terminally, it reopens, but the worker
    // keeps making forward progress one job at a time rather than bursting.
    tokio::time::sleep(Duration::from_millis(300)).await;
    let dlq_later = broker.list_len("dlq");
    assert!(dlq_later > dlq_after_trip, "worker should resume making progress after cooldown, once probes are admitted");

    cancel.cancel();
    worker.await.expect("worker task panicked");
}
