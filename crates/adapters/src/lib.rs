// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! wq-adapters: the broker, handler, and scanner interfaces (spec.md §4.1,
//! §6), plus one real and one fake implementation of each.

mod broker;
mod fake_broker;
mod handler;
mod redis_broker;
mod scanner;

pub use broker::{BrokerAdapter, BrokerError, ScanPage};
pub use fake_broker::FakeBrokerAdapter;
pub use handler::Handler;
#[cfg(any(test, feature = "test-support"))]
pub use handler::fake::ScriptedHandler;
pub use redis_broker::RedisBrokerAdapter;
pub use scanner::{ScanError, ScanItem, Scanner, WalkDirScanner};
#[cfg(any(test, feature = "test-support"))]
pub use scanner::fake::FixedScanner;
