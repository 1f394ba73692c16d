// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error kinds shared by the engine's components (spec.md §7).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("broker error: {0}")]
    Broker(#[from] wq_adapters::BrokerError),
    #[error("wire error: {0}")]
    Wire(#[from] wq_wire::WireError),
    #[error("unknown priority: {0}")]
    UnknownPriority(String),
    #[error("unknown queue alias: {0}")]
    UnknownQueueAlias(String),
    #[error("produce failed: {0}")]
    ProduceFailed(String),
    #[error("operation cancelled")]
    Cancelled,
}
