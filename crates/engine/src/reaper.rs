// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Reaper (spec.md §4.7): periodically recovers jobs from workers whose
//! heartbeat has expired.

use crate::config::WorkerConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wq_adapters::BrokerAdapter;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReapReport {
    pub dead_workers: usize,
    pub recovered_jobs: usize,
    pub unknown_priority_jobs: usize,
}

const SCAN_PAGE_SIZE: usize = 200;

/// Runs one full SCAN pass over reservation-list keys, requeuing every job
/// owned by a worker whose heartbeat has expired.
pub async fn run_once<B: BrokerAdapter>(broker: &B, config: &WorkerConfig, cancel: &CancellationToken) -> Result<ReapReport, crate::error::EngineError> {
    let pattern = config.reservation_list_scan_pattern();
    let mut report = ReapReport::default();
    let mut cursor = 0u64;

    loop {
        if cancel.is_cancelled() {
            break;
        }
        let page = broker.scan_page(&pattern, cursor, SCAN_PAGE_SIZE).await?;

        for reservation_key in &page.keys {
            if cancel.is_cancelled() {
                break;
            }
            let Some(worker) = config.worker_from_reservation_list(reservation_key) else { continue };
            let heartbeat_key = config.heartbeat_key_for_reservation_worker(&worker);
            if broker.exists(&heartbeat_key).await? {
                continue;
            }

            report.dead_workers += 1;
            let items = broker.range(reservation_key, 0, -1).await?;
            for raw in items {
                match recover_one(broker, config, reservation_key, &raw).await? {
                    RecoverOutcome::Recovered => report.recovered_jobs += 1,
                    RecoverOutcome::UnknownPriority => report.unknown_priority_jobs += 1,
                }
            }
        }

        cursor = page.next_cursor;
        if page.is_done() {
            break;
        }
    }

    Ok(report)
}

enum RecoverOutcome {
    Recovered,
    UnknownPriority,
}

/// Re-enqueues a single reservation-list entry, then removes it. Order
/// matters: a crash between the two leaves the job duplicated in both
/// lists, never lost (spec.md §4.7, §5 crash-safety invariant).
async fn recover_one<B: BrokerAdapter>(
    broker: &B,
    config: &WorkerConfig,
    reservation_key: &str,
    raw: &[u8],
) -> Result<RecoverOutcome, crate::error::EngineError> {
    let decoded = wq_wire::decode(raw).ok();
    let target_list = decoded.as_ref().and_then(|job| config.queue_for(&job.priority)).map(|s| s.to_string());

    let outcome = match (&decoded, &target_list) {
        (Some(_), Some(list)) => {
            broker.push_head(list, raw.to_vec()).await?;
            RecoverOutcome::Recovered
        }
        _ => {
            let annotated = decoded
                .map(|job| job.with_annotation("unknown_priority"))
                .unwrap_or_else(|| wq_core::Job::new("", 0, wq_core::Priority::new(""), "", "").with_annotation("malformed"));
            broker.append(&config.dead_letter_list, wq_wire::encode(&annotated)).await?;
            RecoverOutcome::UnknownPriority
        }
    };

    broker.remove_one(reservation_key, raw).await?;
    Ok(outcome)
}

/// Runs `run_once` repeatedly on `interval` until cancelled (spec.md §4.7
/// default cadence: `heartbeat_ttl / 2`, chosen by the daemon wiring this
/// up, not by this function).
pub async fn run_loop<B: BrokerAdapter>(broker: Arc<B>, config: Arc<WorkerConfig>, interval: Duration, cancel: CancellationToken) {
    loop {
        match run_once(broker.as_ref(), &config, &cancel).await {
            Ok(report) if report.dead_workers > 0 => {
                tracing::info!(dead_workers = report.dead_workers, recovered = report.recovered_jobs, unknown_priority = report.unknown_priority_jobs, "reaper recovered jobs");
            }
            Ok(_) => {}
            Err(err) => tracing::warn!(%err, "reaper pass failed"),
        }
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }
}
