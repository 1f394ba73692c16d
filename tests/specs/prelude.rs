// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for the scenario tests.

use std::collections::HashMap;
use wq_engine::{BackoffConfig, CircuitBreakerConfig, WorkerConfig};

/// Two priorities, `high` then `low`, with generous retry/backoff settings
/// so scenario tests aren't flaky under real wall-clock timing.
pub fn two_priority_worker_config() -> WorkerConfig {
    let mut queues = HashMap::new();
    queues.insert("high".to_string(), "ready:high".to_string());
    queues.insert("low".to_string(), "ready:low".to_string());
    WorkerConfig {
        count: 1,
        heartbeat_ttl_ms: 200,
        max_retries: 2,
        backoff: BackoffConfig { base_ms: 5, max_ms: 40 },
        priorities: vec!["high".to_string(), "low".to_string()],
        queues,
        reservation_list_pattern: "reservation:{worker}".to_string(),
        heartbeat_key_pattern: "heartbeat:{worker}".to_string(),
        completed_list: "completed".to_string(),
        dead_letter_list: "dlq".to_string(),
        block_timeout_ms: 15,
        breaker_pause_ms: 10,
    }
}

/// A breaker configured to stay closed no matter what a scenario test's
/// handler does; scenario tests aren't exercising breaker behavior
/// themselves (that's `wq-engine`'s own unit tests) unless they opt in with
/// their own config.
pub fn permissive_breaker_config() -> CircuitBreakerConfig {
    CircuitBreakerConfig { failure_threshold: 1.0, window_ms: 60_000, cooldown_ms: 50, min_samples: 1_000_000 }
}
