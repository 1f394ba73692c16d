// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Worker loop (spec.md §4.6): the core reserve → decode → handle → resolve
//! cycle, run once per configured worker slot.

use crate::breaker::Breaker;
use crate::config::WorkerConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wq_adapters::{BrokerAdapter, Handler};
use wq_core::{Clock, HandlerOutcome, Job, Priority};

/// Jittered exponential backoff: `min(max, base * 2^(attempts-1)) * (1 + U(-0.1, 0.1))`
/// (spec.md §4.6 step 7). `attempts` is the post-increment count, so the
/// first retry (`attempts == 1`) waits `~base`.
fn retry_delay(base: Duration, max: Duration, attempts: u32) -> Duration {
    let exponent = attempts.saturating_sub(1).min(31);
    let scaled = base.as_millis().saturating_mul(1u128 << exponent);
    let capped = scaled.min(max.as_millis());
    let jitter = 1.0 + (rand::random::<f64>() * 0.2 - 0.1);
    Duration::from_millis(((capped as f64) * jitter).max(0.0) as u64)
}

/// Sleeps for `delay`, returning early if `cancel` fires (spec.md §4.6 step
/// 7: "sleep that delay (respecting cancellation)").
async fn cancellable_sleep(delay: Duration, cancel: &CancellationToken) {
    tokio::select! {
        _ = tokio::time::sleep(delay) => {}
        _ = cancel.cancelled() => {}
    }
}

/// Runs one worker's full lifecycle until `cancel` fires.
///
/// `identity` is the worker's stable `host:pid:index` string (spec.md
/// §4.6); callers construct it once per worker task via
/// [`wq_core::worker_identity`].
pub async fn run<B, H, C>(
    broker: Arc<B>,
    handler: Arc<H>,
    breaker: Arc<Breaker<C>>,
    config: Arc<WorkerConfig>,
    identity: String,
    cancel: CancellationToken,
) where
    B: BrokerAdapter,
    H: Handler,
    C: Clock,
{
    let priority_order = config.priority_order();
    let reservation_list = config.reservation_list(&identity);
    let heartbeat_key = config.heartbeat_key(&identity);

    while !cancel.is_cancelled() {
        if !breaker.allow() {
            cancellable_sleep(config.breaker_pause(), &cancel).await;
            continue;
        }

        if let Err(err) = broker.set_with_ttl(&heartbeat_key, b"1".to_vec(), config.heartbeat_ttl()).await {
            tracing::warn!(%err, worker = %identity, "heartbeat set failed");
        }

        let Some((priority, raw)) = reserve_next(broker.as_ref(), &priority_order, config.as_ref(), &reservation_list, &cancel).await else {
            continue;
        };

        if let Err(err) = broker.expire(&heartbeat_key, config.heartbeat_ttl()).await {
            tracing::warn!(%err, worker = %identity, "heartbeat refresh failed");
        }

        let job = match wq_wire::decode(&raw) {
            Ok(job) => job,
            Err(err) => {
                tracing::warn!(%err, worker = %identity, "malformed job in reservation, routing to dead letter");
                route_malformed(broker.as_ref(), &reservation_list, &raw, config.as_ref()).await;
                breaker.record(false);
                continue;
            }
        };

        if !priority_order.contains(&priority) {
            tracing::warn!(worker = %identity, job_id = %job.id, "job priority missing from configuration");
        }

        let outcome = handler.handle(&job, cancel.clone()).await;
        resolve_outcome(broker.as_ref(), &breaker, config.as_ref(), &reservation_list, &raw, job, priority, outcome, &cancel).await;
    }

    if let Err(err) = broker.delete(&heartbeat_key).await {
        tracing::debug!(%err, worker = %identity, "heartbeat release failed, will expire naturally");
    }
}

/// Polls each configured priority's ready queue in strict order (spec.md
/// §4.6 step 3). Returns `None` when the worker should loop back to the top
/// (no job this pass, or the caller was cancelled mid-poll).
async fn reserve_next<B: BrokerAdapter>(
    broker: &B,
    priority_order: &wq_core::PriorityOrder,
    config: &WorkerConfig,
    reservation_list: &str,
    cancel: &CancellationToken,
) -> Option<(Priority, Vec<u8>)> {
    for priority in priority_order.iter() {
        if cancel.is_cancelled() {
            return None;
        }
        let Some(ready_list) = config.queue_for(priority) else { continue };
        match broker.atomic_pop_move(ready_list, reservation_list, config.block_timeout()).await {
            Ok(Some(raw)) => return Some((priority.clone(), raw)),
            Ok(None) => continue,
            Err(err) => {
                tracing::warn!(%err, priority = %priority, "pop-move failed");
                continue;
            }
        }
    }
    None
}

async fn route_malformed<B: BrokerAdapter>(broker: &B, reservation_list: &str, raw: &[u8], config: &WorkerConfig) {
    if let Err(err) = broker.append(&config.dead_letter_list, raw.to_vec()).await {
        tracing::error!(%err, "failed to append malformed job to dead letter list");
    }
    if let Err(err) = broker.remove_one(reservation_list, raw).await {
        tracing::error!(%err, "failed to remove malformed job from reservation");
    }
}

#[allow(clippy::too_many_arguments)]
async fn resolve_outcome<B: BrokerAdapter, C: Clock>(
    broker: &B,
    breaker: &Breaker<C>,
    config: &WorkerConfig,
    reservation_list: &str,
    raw: &[u8],
    job: Job,
    priority: Priority,
    outcome: HandlerOutcome,
    cancel: &CancellationToken,
) {
    match outcome {
        HandlerOutcome::Ok => {
            if let Err(err) = broker.remove_one(reservation_list, raw).await {
                tracing::error!(%err, job_id = %job.id, "failed to clear completed reservation");
            }
            if let Err(err) = broker.append(&config.completed_list, raw.to_vec()).await {
                tracing::error!(%err, job_id = %job.id, "failed to append to completed list");
            }
            breaker.record(true);
        }
        HandlerOutcome::Retry => {
            let retried = job.with_attempt_incremented();
            if retried.attempts <= config.max_retries {
                let delay = retry_delay(config.backoff.base(), config.backoff.max(), retried.attempts);
                cancellable_sleep(delay, cancel).await;
                let Some(ready_list) = config.queue_for(&priority) else {
                    dead_letter(broker, config, reservation_list, raw, &retried.with_annotation("unknown_priority")).await;
                    breaker.record(false);
                    return;
                };
                let encoded = wq_wire::encode(&retried);
                // Re-enqueue before remove: a crash here leaves the job
                // duplicated across ready and reservation, never lost
                // (spec.md §4.6 step 7, §5 crash-safety invariant).
                if let Err(err) = broker.push_head(ready_list, encoded).await {
                    tracing::error!(%err, job_id = %job.id, "failed to re-enqueue retried job");
                }
                if let Err(err) = broker.remove_one(reservation_list, raw).await {
                    tracing::error!(%err, job_id = %job.id, "failed to remove retried job from reservation");
                }
            } else {
                dead_letter(broker, config, reservation_list, raw, &retried).await;
            }
            breaker.record(false);
        }
        HandlerOutcome::Terminal => {
            dead_letter(broker, config, reservation_list, raw, &job).await;
            breaker.record(false);
        }
    }
}

async fn dead_letter<B: BrokerAdapter>(broker: &B, config: &WorkerConfig, reservation_list: &str, raw: &[u8], job: &Job) {
    let encoded = wq_wire::encode(job);
    if let Err(err) = broker.append(&config.dead_letter_list, encoded).await {
        tracing::error!(%err, job_id = %job.id, "failed to append to dead letter list");
    }
    if let Err(err) = broker.remove_one(reservation_list, raw).await {
        tracing::error!(%err, job_id = %job.id, "failed to remove dead-lettered job from reservation");
    }
}
