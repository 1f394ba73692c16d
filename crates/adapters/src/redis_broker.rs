// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Real broker adapter backed by Redis.

use crate::broker::{BrokerAdapter, BrokerError, ScanPage};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::time::Duration;

/// Broker adapter over a Redis `ConnectionManager`, which transparently
/// reconnects and is cheap to clone (wraps a shared multiplexed connection)
/// — the same connection handle is shared by the producer, every worker,
/// and the reaper in one process (spec.md §5: "shared broker client handle
/// ... treated as a capability parameter, not a singleton").
#[derive(Clone)]
pub struct RedisBrokerAdapter {
    conn: ConnectionManager,
}

impl RedisBrokerAdapter {
    pub async fn connect(url: &str) -> Result<Self, BrokerError> {
        let client = redis::Client::open(url).map_err(|e| BrokerError::Permanent(e.to_string()))?;
        let conn = client.get_connection_manager().await.map_err(to_broker_error)?;
        Ok(Self { conn })
    }
}

fn to_broker_error(err: redis::RedisError) -> BrokerError {
    if err.is_connection_dropped() || err.is_timeout() || err.is_connection_refusal() {
        BrokerError::Transient(err.to_string())
    } else {
        BrokerError::Permanent(err.to_string())
    }
}

#[async_trait]
impl BrokerAdapter for RedisBrokerAdapter {
    async fn push_head(&self, list: &str, value: Vec<u8>) -> Result<(), BrokerError> {
        let mut conn = self.conn.clone();
        conn.lpush::<_, _, ()>(list, value).await.map_err(to_broker_error)
    }

    async fn atomic_pop_move(&self, src: &str, dst: &str, block_timeout: Duration) -> Result<Option<Vec<u8>>, BrokerError> {
        let mut conn = self.conn.clone();
        let timeout_secs = block_timeout.as_secs_f64().max(0.0);
        let value: Option<Vec<u8>> =
            redis::cmd("BRPOPLPUSH").arg(src).arg(dst).arg(timeout_secs).query_async(&mut conn).await.map_err(to_broker_error)?;
        Ok(value)
    }

    async fn remove_one(&self, list: &str, value: &[u8]) -> Result<bool, BrokerError> {
        let mut conn = self.conn.clone();
        let removed: i64 = conn.lrem(list, 1, value).await.map_err(to_broker_error)?;
        Ok(removed > 0)
    }

    async fn append(&self, list: &str, value: Vec<u8>) -> Result<(), BrokerError> {
        let mut conn = self.conn.clone();
        conn.rpush::<_, _, ()>(list, value).await.map_err(to_broker_error)
    }

    async fn set_with_ttl(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), BrokerError> {
        let mut conn = self.conn.clone();
        let ttl_secs = ttl.as_secs().max(1);
        conn.set_ex::<_, _, ()>(key, value, ttl_secs).await.map_err(to_broker_error)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), BrokerError> {
        let mut conn = self.conn.clone();
        conn.expire::<_, ()>(key, ttl.as_secs().max(1) as i64).await.map_err(to_broker_error)
    }

    async fn delete(&self, key: &str) -> Result<(), BrokerError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(key).await.map_err(to_broker_error)
    }

    async fn exists(&self, key: &str) -> Result<bool, BrokerError> {
        let mut conn = self.conn.clone();
        conn.exists(key).await.map_err(to_broker_error)
    }

    async fn incr(&self, key: &str) -> Result<i64, BrokerError> {
        let mut conn = self.conn.clone();
        conn.incr(key, 1).await.map_err(to_broker_error)
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>, BrokerError> {
        let mut conn = self.conn.clone();
        let secs: i64 = conn.ttl(key).await.map_err(to_broker_error)?;
        Ok(if secs >= 0 { Some(Duration::from_secs(secs as u64)) } else { None })
    }

    async fn scan_page(&self, pattern: &str, cursor: u64, page_size: usize) -> Result<ScanPage, BrokerError> {
        let mut conn = self.conn.clone();
        let (next_cursor, keys): (u64, Vec<String>) =
            redis::cmd("SCAN").arg(cursor).arg("MATCH").arg(pattern).arg("COUNT").arg(page_size).query_async(&mut conn).await.map_err(to_broker_error)?;
        Ok(ScanPage { next_cursor, keys })
    }

    async fn length(&self, list: &str) -> Result<i64, BrokerError> {
        let mut conn = self.conn.clone();
        conn.llen(list).await.map_err(to_broker_error)
    }

    async fn range(&self, list: &str, start: isize, stop: isize) -> Result<Vec<Vec<u8>>, BrokerError> {
        let mut conn = self.conn.clone();
        conn.lrange(list, start, stop).await.map_err(to_broker_error)
    }
}
