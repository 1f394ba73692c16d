// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error kinds shared across crates (spec.md §7).
//!
//! These are kinds, not a single error type: each downstream crate wraps the
//! ones relevant to it in its own `thiserror` enum via `#[from]`.

use thiserror::Error;

/// Outcome of a handler invocation (spec.md §6: `handle(job, cancel) -> {ok, retry, terminal}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerOutcome {
    Ok,
    Retry,
    Terminal,
}

impl HandlerOutcome {
    pub fn is_failure(self) -> bool {
        !matches!(self, HandlerOutcome::Ok)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("operation cancelled")]
    Cancelled,
}
