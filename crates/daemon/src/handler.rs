// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The default handler the daemon wires up.
//!
//! The actual business logic a deployment wants to run per job is an
//! external collaborator: this crate only has to honor the `Handler`
//! contract, not implement any particular job semantics. `NoopHandler`
//! satisfies that contract by marking every job successful, which is
//! enough to exercise the rest of the pipeline end to end; real deployments
//! replace it with their own `wq_adapters::Handler` impl.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use wq_adapters::Handler;
use wq_core::{HandlerOutcome, Job};

pub struct NoopHandler;

#[async_trait]
impl Handler for NoopHandler {
    async fn handle(&self, job: &Job, _cancel: CancellationToken) -> HandlerOutcome {
        tracing::debug!(job_id = %job.id, file_path = %job.file_path, "handled job (noop)");
        HandlerOutcome::Ok
    }
}
