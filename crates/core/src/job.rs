// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The unit of work (spec.md §3).

use crate::id::new_job_id;
use crate::priority::Priority;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A job record. Round-trips byte-for-byte through `wq-wire`'s codec
/// (spec.md §8, invariant 6) so that `remove_one` can match on exact
/// encoded bytes between pop-move and removal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Job {
    pub id: String,
    pub file_path: String,
    pub file_size: u64,
    pub priority: Priority,
    pub trace_id: String,
    pub span_id: String,
    #[serde(default)]
    pub attempts: u32,
    pub created_at: DateTime<Utc>,
    /// Set when a job is routed to the dead-letter list by the reaper or the
    /// worker for a reason other than handler failure (spec.md §4.6 step 5,
    /// §4.7 edge case): `"malformed"`, `"unknown_priority"`, or empty.
    #[serde(default)]
    pub annotation: String,
}

impl Job {
    /// Constructs a fresh job with a new id and `created_at = now`, as the
    /// Producer does for each scanned item (spec.md §4.5).
    pub fn new(file_path: impl Into<String>, file_size: u64, priority: Priority, trace_id: impl Into<String>, span_id: impl Into<String>) -> Self {
        Self {
            id: new_job_id(),
            file_path: file_path.into(),
            file_size,
            priority,
            trace_id: trace_id.into(),
            span_id: span_id.into(),
            attempts: 0,
            created_at: Utc::now(),
            annotation: String::new(),
        }
    }

    pub fn with_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.annotation = annotation.into();
        self
    }

    /// Returns a copy with `attempts` incremented, as the worker does on the
    /// retry path before re-encoding and re-enqueuing (spec.md §4.6 step 7).
    pub fn with_attempt_incremented(&self) -> Self {
        let mut next = self.clone();
        next.attempts += 1;
        next
    }
}

#[cfg(any(test, feature = "test-support"))]
pub struct JobBuilder {
    file_path: String,
    file_size: u64,
    priority: Priority,
    trace_id: String,
    span_id: String,
    attempts: u32,
    annotation: String,
}

#[cfg(any(test, feature = "test-support"))]
impl Default for JobBuilder {
    fn default() -> Self {
        Self {
            file_path: "test.txt".to_string(),
            file_size: 0,
            priority: Priority::new("normal"),
            trace_id: "trace-1".to_string(),
            span_id: "span-1".to_string(),
            attempts: 0,
            annotation: String::new(),
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
impl JobBuilder {
    pub fn file_path(mut self, v: impl Into<String>) -> Self {
        self.file_path = v.into();
        self
    }

    pub fn priority(mut self, v: impl Into<Priority>) -> Self {
        self.priority = v.into();
        self
    }

    pub fn attempts(mut self, v: u32) -> Self {
        self.attempts = v;
        self
    }

    pub fn annotation(mut self, v: impl Into<String>) -> Self {
        self.annotation = v.into();
        self
    }

    pub fn build(self) -> Job {
        Job {
            id: new_job_id(),
            file_path: self.file_path,
            file_size: self.file_size,
            priority: self.priority,
            trace_id: self.trace_id,
            span_id: self.span_id,
            attempts: self.attempts,
            created_at: Utc::now(),
            annotation: self.annotation,
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
impl Job {
    pub fn builder() -> JobBuilder {
        JobBuilder::default()
    }
}
