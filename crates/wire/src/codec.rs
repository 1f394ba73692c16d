// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Job codec (spec.md §4.2).
//!
//! Deterministic JSON encoding with a fixed schema. `Job` derives
//! `#[serde(deny_unknown_fields)]` (wq-core::job), so an unknown field on
//! decode is rejected rather than silently dropped, per the Open Question in
//! spec.md §9 ("choose rejected for strictness").

use thiserror::Error;
use wq_core::Job;

#[derive(Debug, Error)]
pub enum WireError {
    #[error("malformed job payload: {0}")]
    Malformed(String),
}

/// Encodes a job to its canonical wire bytes.
///
/// `remove_one` (spec.md §4.1) matches on these exact bytes, so two calls to
/// `encode` on equal jobs must produce byte-identical output; `serde_json`
/// preserves struct field order, which is fixed by `Job`'s declaration.
pub fn encode(job: &Job) -> Vec<u8> {
    // A `Job` is always representable as JSON; failure here would be a bug
    // in `Job`, not a runtime condition callers need to handle.
    serde_json::to_vec(job).unwrap_or_default()
}

/// Decodes a job from wire bytes produced by [`encode`].
pub fn decode(bytes: &[u8]) -> Result<Job, WireError> {
    serde_json::from_slice(bytes).map_err(|e| WireError::Malformed(e.to_string()))
}
