// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Broker adapter: the narrow interface the engine needs over the external
//! key-value broker (spec.md §4.1).

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum BrokerError {
    /// Network, timeout, or temporary unavailability. Retried at the call
    /// site with bounded backoff (spec.md §7: `transient_broker`).
    #[error("transient broker error: {0}")]
    Transient(String),
    /// Not expected to resolve on retry (auth failure, malformed command).
    #[error("broker error: {0}")]
    Permanent(String),
}

impl BrokerError {
    pub fn is_transient(&self) -> bool {
        matches!(self, BrokerError::Transient(_))
    }
}

/// One page of a cursor-driven SCAN (spec.md §4.1).
#[derive(Debug, Clone, Default)]
pub struct ScanPage {
    pub next_cursor: u64,
    pub keys: Vec<String>,
}

impl ScanPage {
    pub fn is_done(&self) -> bool {
        self.next_cursor == 0
    }
}

/// Minimal operations the core consumes from the broker (spec.md §4.1).
///
/// Every call either fails with [`BrokerError`] or succeeds — no silent
/// truncation.
#[async_trait]
pub trait BrokerAdapter: Send + Sync + 'static {
    /// Push `value` to the head of `list` (producer enqueue).
    async fn push_head(&self, list: &str, value: Vec<u8>) -> Result<(), BrokerError>;

    /// Atomically pop the tail of `src` and push it to the head of `dst`,
    /// blocking up to `block_timeout`. Returns `None` on timeout. If a value
    /// is returned, it appeared in `dst` and disappeared from `src` with no
    /// observable intermediate state.
    async fn atomic_pop_move(&self, src: &str, dst: &str, block_timeout: Duration) -> Result<Option<Vec<u8>>, BrokerError>;

    /// Remove exactly one occurrence of `value` from `list`. Returns whether
    /// an occurrence was found.
    async fn remove_one(&self, list: &str, value: &[u8]) -> Result<bool, BrokerError>;

    /// Append `value` to `list` (no eviction — `completed`/`dead_letter` are
    /// append-only from the core's perspective, spec.md §6).
    async fn append(&self, list: &str, value: Vec<u8>) -> Result<(), BrokerError>;

    async fn set_with_ttl(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), BrokerError>;

    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), BrokerError>;

    async fn delete(&self, key: &str) -> Result<(), BrokerError>;

    async fn exists(&self, key: &str) -> Result<bool, BrokerError>;

    /// Atomically increments `key` and returns the post-increment value.
    async fn incr(&self, key: &str) -> Result<i64, BrokerError>;

    /// Remaining TTL for `key`, if any.
    async fn ttl(&self, key: &str) -> Result<Option<Duration>, BrokerError>;

    /// One page of a cursor-driven SCAN over keys matching `pattern`.
    ///
    /// Pass `cursor = 0` to start; a returned cursor of `0` means the scan
    /// is complete. Bounded page size and an explicit cursor (rather than a
    /// buffered `Vec` of every match) let callers like the reaper check
    /// cancellation between pages (spec.md §4.7).
    async fn scan_page(&self, pattern: &str, cursor: u64, page_size: usize) -> Result<ScanPage, BrokerError>;

    async fn length(&self, list: &str) -> Result<i64, BrokerError>;

    /// Elements of `list` from `start` to `stop` inclusive (both ends
    /// broker-index semantics; `-1` means "last element").
    async fn range(&self, list: &str, start: isize, stop: isize) -> Result<Vec<Vec<u8>>, BrokerError>;
}
