// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Fixed-window rate limiter for the producer (spec.md §4.8), built on a
//! single broker counter key rather than in-process state so multiple
//! producer processes share the same budget.

use crate::error::EngineError;
use std::time::Duration;
use wq_adapters::BrokerAdapter;

/// `true` if the caller may proceed, `false` if the current window's budget
/// is exhausted.
///
/// Implemented as `INCR key` with `EXPIRE key 1s` applied only on the first
/// increment of a window (spec.md §4.8: the broker's own key TTL marks
/// window boundaries, so no clock is threaded through here at all).
pub async fn try_acquire<B: BrokerAdapter>(broker: &B, key: &str, limit_per_sec: u32) -> Result<bool, EngineError> {
    let count = broker.incr(key).await?;
    if count == 1 {
        broker.expire(key, Duration::from_secs(1)).await?;
    }
    Ok(count <= limit_per_sec as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wq_adapters::FakeBrokerAdapter;
    use wq_core::FakeClock;

    #[tokio::test]
    async fn admits_up_to_the_limit_then_rejects_within_the_window() {
        let broker = FakeBrokerAdapter::new(FakeClock::new());
        for _ in 0..3 {
            assert!(try_acquire(&broker, "rl:scan", 3).await.unwrap());
        }
        assert!(!try_acquire(&broker, "rl:scan", 3).await.unwrap());
    }

    #[tokio::test]
    async fn window_resets_once_the_key_expires() {
        let clock = FakeClock::new();
        let broker = FakeBrokerAdapter::new(clock.clone());
        assert!(try_acquire(&broker, "rl:scan", 1).await.unwrap());
        assert!(!try_acquire(&broker, "rl:scan", 1).await.unwrap());
        clock.advance(std::time::Duration::from_millis(1100));
        assert!(try_acquire(&broker, "rl:scan", 1).await.unwrap());
    }
}
