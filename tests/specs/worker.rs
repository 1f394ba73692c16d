// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! S1 (happy path) and S5 (priority starvation) from spec.md §8, run
//! against the real worker loop rather than a single-component unit test.

use super::prelude::{permissive_breaker_config, two_priority_worker_config};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wq_adapters::{FakeBrokerAdapter, ScriptedHandler};
use wq_core::{FakeClock, HandlerOutcome, Job, Priority};
use wq_engine::Breaker;

async fn seed(broker: &FakeBrokerAdapter<FakeClock>, list: &str, job: &Job) {
    broker.push_head(list, wq_wire::encode(job)).await.expect("seed push");
}

/// S1: two workers, three `high` jobs and two `low` jobs, handler always
/// succeeds. Every job ends in `completed`; every queue and reservation
/// list ends empty; the first three `completed` entries are the `high`
/// jobs in FIFO order.
#[tokio::test]
async fn s1_happy_path_drains_both_priorities_with_high_completed_first() {
    let clock = FakeClock::new();
    let broker = Arc::new(FakeBrokerAdapter::new(clock.clone()));
    let handler = Arc::new(ScriptedHandler::always(HandlerOutcome::Ok));
    let breaker = Arc::new(Breaker::new(clock, &permissive_breaker_config()));
    let config = Arc::new(two_priority_worker_config());

    let high_jobs: Vec<Job> = (0..3).map(|i| Job::new(format!("h{i}.txt"), 1, Priority::new("high"), "t", "0")).collect();
    let low_jobs: Vec<Job> = (0..2).map(|i| Job::new(format!("l{i}.txt"), 1, Priority::new("low"), "t", "0")).collect();
    for job in &high_jobs {
        seed(&broker, "ready:high", job).await;
    }
    for job in &low_jobs {
        seed(&broker, "ready:low", job).await;
    }

    let cancel = CancellationToken::new();
    let mut workers = Vec::new();
    for index in 0..2 {
        workers.push(tokio::spawn(wq_engine::worker::run(
            broker.clone(),
            handler.clone(),
            breaker.clone(),
            config.clone(),
            format!("w{index}"),
            cancel.child_token(),
        )));
    }

    // Poll until both queues and both reservations have drained, rather
    // than sleeping a fixed guess, since two workers race nondeterministically.
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
        let drained = broker.list_len("ready:high") == 0
            && broker.list_len("ready:low") == 0
            && broker.list_len("reservation:w0") == 0
            && broker.list_len("reservation:w1") == 0
            && broker.list_len("completed") == 5;
        if drained || tokio::time::Instant::now() >= deadline {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    cancel.cancel();
    for worker in workers {
        worker.await.expect("worker task panicked");
    }

    assert_eq!(broker.list_len("ready:high"), 0);
    assert_eq!(broker.list_len("ready:low"), 0);
    assert_eq!(broker.list_len("completed"), 5);

    let completed = broker.list_snapshot("completed");
    let decoded: Vec<Job> = completed.iter().map(|raw| wq_wire::decode(raw).expect("decode completed job")).collect();
    let high_ids: std::collections::HashSet<_> = high_jobs.iter().map(|j| j.id.clone()).collect();
    let first_three_are_high = decoded.iter().take(3).all(|job| high_ids.contains(&job.id));
    assert!(first_three_are_high, "expected the first three completed jobs to be the high-priority ones: {decoded:?}");
}

/// S5: a single worker, `high` continuously fed, one `low` job present
/// throughout. The `low` job is only reserved once `high` is empty, and
/// within `block_timeout` of that point (spec.md §8 S5, §4.6).
#[tokio::test]
async fn s5_low_priority_job_waits_for_high_queue_to_drain() {
    let clock = FakeClock::new();
    let broker = Arc::new(FakeBrokerAdapter::new(clock.clone()));
    let handler = Arc::new(ScriptedHandler::always(HandlerOutcome::Ok));
    let breaker = Arc::new(Breaker::new(clock, &permissive_breaker_config()));
    let config = Arc::new(two_priority_worker_config());

    let low_job = Job::new("low.txt", 1, Priority::new("low"), "t", "0");
    seed(&broker, "ready:low", &low_job).await;
    for i in 0..10 {
        seed(&broker, "ready:high", &Job::new(format!("h{i}.txt"), 1, Priority::new("high"), "t", "0")).await;
    }

    let cancel = CancellationToken::new();
    let worker = tokio::spawn(wq_engine::worker::run(broker.clone(), handler.clone(), breaker, config.clone(), "w0".to_string(), cancel.child_token()));

    // While `high` still has entries, `low`'s single job must not have been
    // reserved yet.
    tokio::time::sleep(Duration::from_millis(5)).await;
    if broker.list_len("ready:high") > 0 {
        assert_eq!(broker.list_len("ready:low"), 1, "low job was reserved before high drained");
    }

    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while broker.list_len("completed") < 11 && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    cancel.cancel();
    worker.await.expect("worker task panicked");

    assert_eq!(broker.list_len("ready:high"), 0);
    assert_eq!(broker.list_len("ready:low"), 0);
    assert_eq!(broker.list_len("completed"), 11);
}
