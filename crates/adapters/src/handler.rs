// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Handler interface (spec.md §6): the business logic invoked per job.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use wq_core::{HandlerOutcome, Job};

/// Implemented by whatever subsystem actually does the work a job
/// describes. The core only cares about the three-way outcome.
#[async_trait]
pub trait Handler: Send + Sync + 'static {
    async fn handle(&self, job: &Job, cancel: CancellationToken) -> HandlerOutcome;
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Scripted handler for tests: returns outcomes from a fixed sequence
    /// (repeating the last one once exhausted), and records every job it
    /// was invoked with.
    #[derive(Clone)]
    pub struct ScriptedHandler {
        outcomes: Arc<Vec<HandlerOutcome>>,
        calls: Arc<Mutex<Vec<Job>>>,
    }

    impl ScriptedHandler {
        pub fn new(outcomes: Vec<HandlerOutcome>) -> Self {
            Self { outcomes: Arc::new(outcomes), calls: Arc::new(Mutex::new(Vec::new())) }
        }

        pub fn always(outcome: HandlerOutcome) -> Self {
            Self::new(vec![outcome])
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().len()
        }

        pub fn calls(&self) -> Vec<Job> {
            self.calls.lock().clone()
        }
    }

    #[async_trait]
    impl Handler for ScriptedHandler {
        async fn handle(&self, job: &Job, _cancel: CancellationToken) -> HandlerOutcome {
            let index = {
                let mut calls = self.calls.lock();
                calls.push(job.clone());
                calls.len() - 1
            };
            *self.outcomes.get(index).or_else(|| self.outcomes.last()).unwrap_or(&HandlerOutcome::Ok)
        }
    }
}
