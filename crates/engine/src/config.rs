// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration surface consumed by the engine (spec.md §6). Loading the
//! TOML file itself is the daemon binary's job; these are the typed shapes
//! it deserializes into.

use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use wq_core::{Priority, PriorityOrder};

#[derive(Debug, Clone, Deserialize)]
pub struct BackoffConfig {
    pub base_ms: u64,
    pub max_ms: u64,
}

impl BackoffConfig {
    pub fn base(&self) -> Duration {
        Duration::from_millis(self.base_ms)
    }

    pub fn max(&self) -> Duration {
        Duration::from_millis(self.max_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkerConfig {
    pub count: usize,
    pub heartbeat_ttl_ms: u64,
    pub max_retries: u32,
    pub backoff: BackoffConfig,
    pub priorities: Vec<String>,
    /// priority label -> ready-list key name.
    pub queues: HashMap<String, String>,
    /// `{worker}` placeholder template, e.g. `"reservation:{worker}"`.
    pub reservation_list_pattern: String,
    /// `{worker}` placeholder template, e.g. `"heartbeat:{worker}"`.
    pub heartbeat_key_pattern: String,
    pub completed_list: String,
    pub dead_letter_list: String,
    pub block_timeout_ms: u64,
    pub breaker_pause_ms: u64,
}

impl WorkerConfig {
    pub fn heartbeat_ttl(&self) -> Duration {
        Duration::from_millis(self.heartbeat_ttl_ms)
    }

    pub fn block_timeout(&self) -> Duration {
        Duration::from_millis(self.block_timeout_ms)
    }

    pub fn breaker_pause(&self) -> Duration {
        Duration::from_millis(self.breaker_pause_ms)
    }

    pub fn priority_order(&self) -> PriorityOrder {
        PriorityOrder::new(self.priorities.iter().map(|p| Priority::new(p.clone())).collect())
    }

    pub fn queue_for(&self, priority: &Priority) -> Option<&str> {
        self.queues.get(priority.as_str()).map(|s| s.as_str())
    }

    pub fn reservation_list(&self, worker: &str) -> String {
        self.reservation_list_pattern.replace("{worker}", worker)
    }

    pub fn heartbeat_key(&self, worker: &str) -> String {
        self.heartbeat_key_pattern.replace("{worker}", worker)
    }

    /// Glob pattern matching every worker's reservation list, for the
    /// reaper's SCAN (spec.md §4.7).
    pub fn reservation_list_scan_pattern(&self) -> String {
        self.reservation_list_pattern.replace("{worker}", "*")
    }

    pub fn heartbeat_scan_pattern(&self) -> String {
        self.heartbeat_key_pattern.replace("{worker}", "*")
    }

    /// Extracts the worker identity embedded in a concrete reservation list
    /// key, given the pattern's literal prefix/suffix around `{worker}`.
    pub fn worker_from_reservation_list(&self, key: &str) -> Option<String> {
        extract_placeholder(&self.reservation_list_pattern, key)
    }

    pub fn heartbeat_key_for_reservation_worker(&self, worker: &str) -> String {
        self.heartbeat_key(worker)
    }
}

fn extract_placeholder(pattern: &str, value: &str) -> Option<String> {
    let idx = pattern.find("{worker}")?;
    let prefix = &pattern[..idx];
    let suffix = &pattern[idx + "{worker}".len()..];
    if !value.starts_with(prefix) || !value.ends_with(suffix) {
        return None;
    }
    let start = prefix.len();
    let end = value.len().checked_sub(suffix.len())?;
    if start > end {
        return None;
    }
    Some(value[start..end].to_string())
}

#[derive(Debug, Clone, Deserialize)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: f64,
    pub window_ms: u64,
    pub cooldown_ms: u64,
    pub min_samples: usize,
}

impl CircuitBreakerConfig {
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProducerConfig {
    pub rate_limit_per_sec: u32,
    pub rate_limit_key: String,
    pub default_priority: String,
    /// File extensions (no leading dot, matched case-insensitively) that
    /// always escalate to the highest configured priority, overriding
    /// whatever hint the scanner attached (spec.md §4.5's "priority
    /// classifier, e.g. by extension" belongs to the producer, not the
    /// scanner).
    #[serde(default)]
    pub high_priority_hints: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    pub worker: WorkerConfig,
    pub circuit_breaker: CircuitBreakerConfig,
    pub producer: ProducerConfig,
}
