// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Admin operations (spec.md §4.8): stats, peek, purge, and a throughput
//! benchmark, callable directly by the `wq-admin` CLI binary rather than
//! through a JSON command dispatcher (spec.md §1 lists the dispatcher as an
//! external collaborator).

use crate::config::{ProducerConfig, WorkerConfig};
use crate::limiter;
use serde::Serialize;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use wq_adapters::BrokerAdapter;
use wq_core::{Job, Priority};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub ready_lengths: HashMap<String, i64>,
    pub completed_length: i64,
    pub dead_letter_length: i64,
    pub live_workers: usize,
}

pub async fn stats<B: BrokerAdapter>(broker: &B, config: &WorkerConfig) -> Result<Stats, crate::error::EngineError> {
    let mut ready_lengths = HashMap::new();
    for priority in config.priority_order().iter() {
        if let Some(list) = config.queue_for(priority) {
            ready_lengths.insert(priority.as_str().to_string(), broker.length(list).await?);
        }
    }

    let completed_length = broker.length(&config.completed_list).await?;
    let dead_letter_length = broker.length(&config.dead_letter_list).await?;

    let mut live_workers = 0;
    let mut cursor = 0u64;
    let pattern = config.heartbeat_scan_pattern();
    loop {
        let page = broker.scan_page(&pattern, cursor, 500).await?;
        live_workers += page.keys.len();
        cursor = page.next_cursor;
        if page.is_done() {
            break;
        }
    }

    Ok(Stats { ready_lengths, completed_length, dead_letter_length, live_workers })
}

/// `queue_alias` is one of the configured priority labels, `"completed"`,
/// or `"dead_letter"`. Returns up to `n` jobs from the **tail** of the
/// list (spec.md §4.8) — the tail is where `atomic_pop_move` consumes, so
/// these are the jobs about to run next, not the most recently enqueued.
pub async fn peek<B: BrokerAdapter>(broker: &B, config: &WorkerConfig, queue_alias: &str, n: usize) -> Result<Vec<Job>, crate::error::EngineError> {
    let list = resolve_alias(config, queue_alias)?;
    if n == 0 {
        return Ok(Vec::new());
    }
    let raw = broker.range(&list, -(n as isize), -1).await?;
    let mut jobs = Vec::with_capacity(raw.len());
    for bytes in raw {
        jobs.push(wq_wire::decode(&bytes)?);
    }
    Ok(jobs)
}

fn resolve_alias(config: &WorkerConfig, alias: &str) -> Result<String, crate::error::EngineError> {
    if alias == "completed" {
        return Ok(config.completed_list.clone());
    }
    if alias == "dead_letter" {
        return Ok(config.dead_letter_list.clone());
    }
    config.queue_for(&Priority::new(alias)).map(|s| s.to_string()).ok_or_else(|| crate::error::EngineError::UnknownQueueAlias(alias.to_string()))
}

/// Idempotent: deletes the dead-letter list entirely, returning how many
/// entries it held.
pub async fn purge_dlq<B: BrokerAdapter>(broker: &B, config: &WorkerConfig) -> Result<i64, crate::error::EngineError> {
    let count = broker.length(&config.dead_letter_list).await?;
    broker.delete(&config.dead_letter_list).await?;
    Ok(count)
}

/// Idempotent: deletes every ready queue, `completed`, and the dead-letter
/// list, returning the total entries removed.
pub async fn purge_all<B: BrokerAdapter>(broker: &B, config: &WorkerConfig) -> Result<i64, crate::error::EngineError> {
    let mut total = 0;
    for priority in config.priority_order().iter() {
        if let Some(list) = config.queue_for(priority) {
            total += broker.length(list).await?;
            broker.delete(list).await?;
        }
    }
    total += broker.length(&config.completed_list).await?;
    broker.delete(&config.completed_list).await?;
    total += broker.length(&config.dead_letter_list).await?;
    broker.delete(&config.dead_letter_list).await?;
    Ok(total)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchResult {
    pub elapsed: Duration,
    pub throughput_per_sec: f64,
    pub success: bool,
}

/// Produces `count` synthetic jobs of `payload_size` bytes at `rate`
/// jobs/sec to `priority`'s ready queue, then polls `completed`'s length
/// until it has grown by `count` or `timeout` elapses.
///
/// Uses the real wall clock rather than the injected [`wq_core::Clock`]:
/// a benchmark exists to measure actual broker round-trip throughput, so
/// faking time here would defeat its purpose.
pub async fn bench<B: BrokerAdapter>(
    broker: &B,
    worker_config: &WorkerConfig,
    producer_config: &ProducerConfig,
    priority: &Priority,
    count: usize,
    rate_per_sec: u32,
    payload_size: usize,
    timeout: Duration,
) -> Result<BenchResult, crate::error::EngineError> {
    let list = worker_config.queue_for(priority).ok_or_else(|| crate::error::EngineError::UnknownPriority(priority.to_string()))?;
    let baseline = broker.length(&worker_config.completed_list).await?;
    let start = Instant::now();
    let payload = "x".repeat(payload_size);

    for _ in 0..count {
        while !limiter::try_acquire(broker, &producer_config.rate_limit_key, rate_per_sec).await? {
            let jitter_ms = (rand::random::<f64>() * 100.0) as u64;
            tokio::time::sleep(Duration::from_millis(jitter_ms)).await;
        }
        let job = Job::new(payload.clone(), payload_size as u64, priority.clone(), "bench", "0");
        broker.push_head(list, wq_wire::encode(&job)).await?;
    }

    let success = loop {
        let current = broker.length(&worker_config.completed_list).await?;
        if current - baseline >= count as i64 {
            break true;
        }
        if start.elapsed() >= timeout {
            break false;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    };

    let elapsed = start.elapsed();
    let throughput_per_sec = if elapsed.as_secs_f64() > 0.0 { count as f64 / elapsed.as_secs_f64() } else { 0.0 };
    Ok(BenchResult { elapsed, throughput_per_sec, success })
}
