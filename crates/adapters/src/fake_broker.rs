// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory broker adapter for deterministic tests (spec.md §8).

use crate::broker::{BrokerAdapter, BrokerError, ScanPage};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use wq_core::Clock;

struct StringEntry {
    value: Vec<u8>,
    expires_at_ms: Option<u64>,
}

#[derive(Default)]
struct State {
    lists: HashMap<String, VecDeque<Vec<u8>>>,
    strings: HashMap<String, StringEntry>,
}

/// In-memory stand-in for Redis, used by every engine test (spec.md §8
/// scenarios S1–S6) so they run without a live broker. Blocking
/// `atomic_pop_move` is implemented with a [`Notify`] per list rather than
/// polling, so it wakes immediately when a producer or retry path pushes.
#[derive(Clone)]
pub struct FakeBrokerAdapter<C: Clock> {
    state: Arc<Mutex<State>>,
    notify: Arc<Mutex<HashMap<String, Arc<Notify>>>>,
    clock: C,
}

impl<C: Clock> FakeBrokerAdapter<C> {
    pub fn new(clock: C) -> Self {
        Self { state: Arc::new(Mutex::new(State::default())), notify: Arc::new(Mutex::new(HashMap::new())), clock }
    }

    fn notifier_for(&self, list: &str) -> Arc<Notify> {
        self.notify.lock().entry(list.to_string()).or_insert_with(|| Arc::new(Notify::new())).clone()
    }

    fn expire_stale(&self, state: &mut State) {
        let now = self.clock.epoch_ms();
        state.strings.retain(|_, entry| entry.expires_at_ms.map(|exp| exp > now).unwrap_or(true));
    }

    /// Test helper: current length of `list`, without waiting.
    pub fn list_len(&self, list: &str) -> usize {
        self.state.lock().lists.get(list).map(|l| l.len()).unwrap_or(0)
    }

    /// Test helper: snapshot of `list` contents, head to tail.
    pub fn list_snapshot(&self, list: &str) -> Vec<Vec<u8>> {
        self.state.lock().lists.get(list).map(|l| l.iter().cloned().collect()).unwrap_or_default()
    }
}

#[async_trait]
impl<C: Clock> BrokerAdapter for FakeBrokerAdapter<C> {
    async fn push_head(&self, list: &str, value: Vec<u8>) -> Result<(), BrokerError> {
        self.state.lock().lists.entry(list.to_string()).or_default().push_front(value);
        self.notifier_for(list).notify_waiters();
        Ok(())
    }

    async fn atomic_pop_move(&self, src: &str, dst: &str, block_timeout: Duration) -> Result<Option<Vec<u8>>, BrokerError> {
        let deadline = tokio::time::Instant::now() + block_timeout;
        loop {
            {
                let mut state = self.state.lock();
                if let Some(value) = state.lists.get_mut(src).and_then(|l| l.pop_back()) {
                    state.lists.entry(dst.to_string()).or_default().push_front(value.clone());
                    return Ok(Some(value));
                }
            }
            let notified = self.notifier_for(src).notified();
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if remaining.is_zero() {
                return Ok(None);
            }
            if tokio::time::timeout(remaining, notified).await.is_err() {
                return Ok(None);
            }
        }
    }

    async fn remove_one(&self, list: &str, value: &[u8]) -> Result<bool, BrokerError> {
        let mut state = self.state.lock();
        if let Some(items) = state.lists.get_mut(list) {
            if let Some(pos) = items.iter().position(|v| v == value) {
                items.remove(pos);
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn append(&self, list: &str, value: Vec<u8>) -> Result<(), BrokerError> {
        self.state.lock().lists.entry(list.to_string()).or_default().push_back(value);
        Ok(())
    }

    async fn set_with_ttl(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), BrokerError> {
        let mut state = self.state.lock();
        let expires_at_ms = self.clock.epoch_ms() + ttl.as_millis() as u64;
        state.strings.insert(key.to_string(), StringEntry { value, expires_at_ms: Some(expires_at_ms) });
        Ok(())
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), BrokerError> {
        let mut state = self.state.lock();
        let expires_at_ms = self.clock.epoch_ms() + ttl.as_millis() as u64;
        if let Some(entry) = state.strings.get_mut(key) {
            entry.expires_at_ms = Some(expires_at_ms);
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), BrokerError> {
        self.state.lock().strings.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, BrokerError> {
        let mut state = self.state.lock();
        self.expire_stale(&mut state);
        Ok(state.strings.contains_key(key))
    }

    async fn incr(&self, key: &str) -> Result<i64, BrokerError> {
        let mut state = self.state.lock();
        self.expire_stale(&mut state);
        let entry = state.strings.entry(key.to_string()).or_insert(StringEntry { value: b"0".to_vec(), expires_at_ms: None });
        let current: i64 = std::str::from_utf8(&entry.value).ok().and_then(|s| s.parse().ok()).unwrap_or(0);
        let next = current + 1;
        entry.value = next.to_string().into_bytes();
        Ok(next)
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>, BrokerError> {
        let state = self.state.lock();
        let now = self.clock.epoch_ms();
        Ok(state.strings.get(key).and_then(|e| e.expires_at_ms).and_then(|exp| exp.checked_sub(now)).map(Duration::from_millis))
    }

    async fn scan_page(&self, pattern: &str, cursor: u64, page_size: usize) -> Result<ScanPage, BrokerError> {
        let mut state = self.state.lock();
        self.expire_stale(&mut state);
        let prefix = pattern.trim_end_matches('*');
        let mut matches: Vec<String> = state
            .strings
            .keys()
            .chain(state.lists.keys())
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect::<std::collections::BTreeSet<_>>()
            .into_iter()
            .collect();
        matches.sort();
        let start = cursor as usize;
        let end = (start + page_size).min(matches.len());
        let keys = if start < matches.len() { matches[start..end].to_vec() } else { Vec::new() };
        let next_cursor = if end < matches.len() { end as u64 } else { 0 };
        Ok(ScanPage { next_cursor, keys })
    }

    async fn length(&self, list: &str) -> Result<i64, BrokerError> {
        Ok(self.list_len(list) as i64)
    }

    async fn range(&self, list: &str, start: isize, stop: isize) -> Result<Vec<Vec<u8>>, BrokerError> {
        let items = self.list_snapshot(list);
        let len = items.len() as isize;
        let norm = |i: isize| -> isize {
            if i < 0 {
                (len + i).max(0)
            } else {
                i.min(len)
            }
        };
        let start = norm(start) as usize;
        let stop = (norm(stop) + 1).max(0) as usize;
        if start >= items.len() {
            return Ok(Vec::new());
        }
        Ok(items[start..stop.min(items.len())].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wq_core::SystemClock;

    #[tokio::test]
    async fn push_head_then_atomic_pop_move_transfers_fifo() {
        let broker = FakeBrokerAdapter::new(SystemClock);
        broker.push_head("ready", b"a".to_vec()).await.unwrap();
        broker.push_head("ready", b"b".to_vec()).await.unwrap();
        let moved = broker.atomic_pop_move("ready", "reservation", Duration::from_millis(10)).await.unwrap();
        assert_eq!(moved, Some(b"a".to_vec()));
        assert_eq!(broker.list_snapshot("reservation"), vec![b"a".to_vec()]);
        assert_eq!(broker.list_len("ready"), 1);
    }

    #[tokio::test]
    async fn atomic_pop_move_times_out_on_empty_source() {
        let broker = FakeBrokerAdapter::new(SystemClock);
        let moved = broker.atomic_pop_move("ready", "reservation", Duration::from_millis(20)).await.unwrap();
        assert_eq!(moved, None);
    }

    #[tokio::test]
    async fn incr_sets_ttl_only_on_first_call_per_caller_contract() {
        let broker = FakeBrokerAdapter::new(SystemClock);
        let first = broker.incr("ratelimit").await.unwrap();
        assert_eq!(first, 1);
        broker.expire("ratelimit", Duration::from_secs(1)).await.unwrap();
        assert!(broker.ttl("ratelimit").await.unwrap().is_some());
        let second = broker.incr("ratelimit").await.unwrap();
        assert_eq!(second, 2);
    }

    #[tokio::test]
    async fn scan_page_pages_through_all_matching_keys() {
        let broker = FakeBrokerAdapter::new(SystemClock);
        for i in 0..5 {
            broker.set_with_ttl(&format!("heartbeat:w{i}"), b"1".to_vec(), Duration::from_secs(5)).await.unwrap();
        }
        let mut seen = Vec::new();
        let mut cursor = 0;
        loop {
            let page = broker.scan_page("heartbeat:*", cursor, 2).await.unwrap();
            seen.extend(page.keys);
            cursor = page.next_cursor;
            if page.is_done() {
                break;
            }
        }
        assert_eq!(seen.len(), 5);
    }
}
