// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Producer: turns scanner output into enqueued jobs under a rate limit
//! (spec.md §4.5/§4.8).

use crate::config::{ProducerConfig, WorkerConfig};
use crate::limiter;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wq_adapters::{BrokerAdapter, Scanner};
use wq_core::{Priority, PriorityOrder};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProduceReport {
    pub enqueued: usize,
    pub rate_limited: usize,
    pub unknown_priority: usize,
}

/// Picks the queue priority for a scanned item: a path matching one of
/// `producer.high_priority_hints` (by extension) always escalates to the
/// highest configured priority, regardless of what the scanner guessed;
/// otherwise the scanner's own hint is honored if it names a configured
/// priority, and `producer.default_priority` otherwise (spec.md §4.5 —
/// "a priority classifier, e.g. by extension" is the producer's own, not
/// the scanner's).
fn classify_priority(path: &str, hint: Priority, priorities: &PriorityOrder, producer_config: &ProducerConfig, default_priority: &Priority) -> Priority {
    let extension = std::path::Path::new(path).extension().and_then(|e| e.to_str()).unwrap_or("");
    if producer_config.high_priority_hints.iter().any(|h| h.eq_ignore_ascii_case(extension)) {
        if let Some(highest) = priorities.highest() {
            return highest.clone();
        }
    }
    if priorities.contains(&hint) {
        hint
    } else {
        default_priority.clone()
    }
}

/// Sleeps for `delay`, returning early if `cancel` fires — mirrors
/// `worker::cancellable_sleep` (spec.md §5: every suspension point,
/// including the rate-limit wait below, must observe cancellation).
async fn cancellable_sleep(delay: Duration, cancel: &CancellationToken) {
    tokio::select! {
        _ = tokio::time::sleep(delay) => {}
        _ = cancel.cancelled() => {}
    }
}

/// Runs one full scan-and-enqueue pass, stopping early if `cancel` fires.
///
/// Every scanned item is eventually enqueued (spec.md §4.5): when the
/// shared rate-limit counter is exhausted, the producer sleeps until the
/// window resets (plus jitter) and retries rather than dropping the item
/// (spec.md §4.4). A hint that doesn't match a configured priority falls
/// back to `producer.default_priority` rather than being dropped, since
/// the scanner's classification is advisory (spec.md §6).
pub async fn run_once<B, S>(
    broker: &B,
    scanner: &S,
    worker_config: &WorkerConfig,
    producer_config: &ProducerConfig,
    cancel: &CancellationToken,
) -> Result<ProduceReport, crate::error::EngineError>
where
    B: BrokerAdapter,
    S: Scanner,
{
    let items = scanner.scan().await.map_err(|e| crate::error::EngineError::ProduceFailed(e.0))?;
    let priorities = worker_config.priority_order();
    let default_priority = Priority::new(producer_config.default_priority.clone());
    let mut report = ProduceReport::default();

    for item in items {
        if cancel.is_cancelled() {
            break;
        }

        let priority = classify_priority(&item.path, item.priority_hint.clone(), &priorities, producer_config, &default_priority);

        loop {
            if cancel.is_cancelled() {
                return Ok(report);
            }
            if limiter::try_acquire(broker, &producer_config.rate_limit_key, producer_config.rate_limit_per_sec).await? {
                break;
            }
            report.rate_limited += 1;
            let jitter_ms = (rand::random::<f64>() * 100.0) as u64;
            cancellable_sleep(Duration::from_millis(jitter_ms), cancel).await;
        }

        let Some(list) = worker_config.queue_for(&priority) else {
            report.unknown_priority += 1;
            continue;
        };

        let trace_id = wq_core::new_job_id();
        let job = wq_core::Job::new(item.path, item.size, priority, trace_id, "0");
        let encoded = wq_wire::encode(&job);
        broker.push_head(list, encoded).await?;
        report.enqueued += 1;
    }

    Ok(report)
}

/// Runs `run_once` repeatedly until cancelled, sleeping `interval` between
/// passes. This is the shape the daemon wires up as a background task.
pub async fn run_loop<B, S>(
    broker: Arc<B>,
    scanner: Arc<S>,
    worker_config: Arc<WorkerConfig>,
    producer_config: Arc<ProducerConfig>,
    interval: std::time::Duration,
    cancel: CancellationToken,
) where
    B: BrokerAdapter,
    S: Scanner,
{
    loop {
        match run_once(broker.as_ref(), scanner.as_ref(), &worker_config, &producer_config, &cancel).await {
            Ok(report) => tracing::info!(enqueued = report.enqueued, rate_limited = report.rate_limited, unknown_priority = report.unknown_priority, "producer pass complete"),
            Err(err) => tracing::warn!(%err, "producer pass failed"),
        }
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }
}
