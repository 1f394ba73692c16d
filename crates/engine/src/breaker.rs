// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Circuit breaker (spec.md §4.3): sliding-window failure-rate trigger,
//! cooldown, and exactly one half-open probe.

use crate::config::CircuitBreakerConfig;
use parking_lot::Mutex;
use std::collections::VecDeque;
use wq_core::Clock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

struct Inner {
    state: BreakerState,
    results: VecDeque<(u64, bool)>,
    last_transition_ms: u64,
    half_open_in_flight: bool,
}

/// Process-wide breaker state, passed as an explicitly constructed,
/// `Arc`-shared value to every worker rather than living behind an ambient
/// global (spec.md §9's "process-wide mutable breaker" redesign note). All
/// operations are serialized behind a single mutex (spec.md §4.3/§5), which
/// is what gives "exactly one concurrent probe in HalfOpen" regardless of
/// caller count: `allow()`'s cooldown-elapsed check and the `HalfOpen`
/// branch's in-flight check both run under the same lock.
pub struct Breaker<C: Clock> {
    inner: Mutex<Inner>,
    clock: C,
    window_ms: u64,
    cooldown_ms: u64,
    failure_threshold: f64,
    min_samples: usize,
}

impl<C: Clock> Breaker<C> {
    pub fn new(clock: C, config: &CircuitBreakerConfig) -> Self {
        let now = clock.epoch_ms();
        Self {
            inner: Mutex::new(Inner {
                state: BreakerState::Closed,
                results: VecDeque::new(),
                last_transition_ms: now,
                half_open_in_flight: false,
            }),
            clock,
            window_ms: config.window_ms,
            cooldown_ms: config.cooldown_ms,
            failure_threshold: config.failure_threshold,
            min_samples: config.min_samples,
        }
    }

    pub fn state(&self) -> BreakerState {
        self.inner.lock().state
    }

    /// `true` in Closed; in Open, `false` until cooldown elapses then
    /// transitions to HalfOpen and returns `true` to exactly one caller; in
    /// HalfOpen, `true` to exactly one caller (the in-flight probe) and
    /// `false` to everyone else until that probe completes.
    pub fn allow(&self) -> bool {
        let mut inner = self.inner.lock();
        match inner.state {
            BreakerState::Closed => true,
            BreakerState::Open => {
                let now = self.clock.epoch_ms();
                if now.saturating_sub(inner.last_transition_ms) >= self.cooldown_ms {
                    inner.state = BreakerState::HalfOpen;
                    inner.half_open_in_flight = true;
                    inner.last_transition_ms = now;
                    tracing::info!("breaker: open -> half_open (probe admitted)");
                    true
                } else {
                    false
                }
            }
            BreakerState::HalfOpen => {
                if inner.half_open_in_flight {
                    false
                } else {
                    // A probe is only armed by the Open->HalfOpen transition
                    // above; reaching HalfOpen with no in-flight probe means
                    // record() hasn't yet moved us out of this state. Treat
                    // conservatively as "no room".
                    false
                }
            }
        }
    }

    /// Records an outcome, purges samples older than the window, and
    /// applies the transition rules.
    pub fn record(&self, ok: bool) {
        let mut inner = self.inner.lock();
        let now = self.clock.epoch_ms();
        inner.results.push_back((now, ok));
        while let Some(&(ts, _)) = inner.results.front() {
            if now.saturating_sub(ts) > self.window_ms {
                inner.results.pop_front();
            } else {
                break;
            }
        }

        match inner.state {
            BreakerState::Closed => {
                let total = inner.results.len();
                if total >= self.min_samples {
                    let failures = inner.results.iter().filter(|(_, ok)| !ok).count();
                    let rate = failures as f64 / total as f64;
                    if rate >= self.failure_threshold {
                        inner.state = BreakerState::Open;
                        inner.last_transition_ms = now;
                        tracing::warn!(failures, total, "breaker: closed -> open");
                    }
                }
            }
            BreakerState::Open => {
                // A failure recorded while Open (e.g. a caller that raced
                // `allow()` before it flipped) doesn't re-arm anything; the
                // next `allow()` call still governs the cooldown.
            }
            BreakerState::HalfOpen => {
                inner.half_open_in_flight = false;
                inner.last_transition_ms = now;
                if ok {
                    inner.state = BreakerState::Closed;
                    inner.results.clear();
                    tracing::info!("breaker: half_open -> closed");
                } else {
                    inner.state = BreakerState::Open;
                    tracing::warn!("breaker: half_open -> open");
                }
            }
        }
    }
}
