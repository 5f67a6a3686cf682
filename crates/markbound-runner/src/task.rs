//! Async entry points.
//!
//! A run does blocking file IO end to end, so async hosts hand the runner to
//! `spawn_blocking` instead of calling it on the reactor. These wrappers do
//! exactly that and nothing else; panics inside a run resurface in the
//! caller's task.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::collab::{ContractStore, SessionStaging, TemplateRenderer, WorkbookSource};
use crate::run::{DraftTestRequest, ReportRunner, RunFailure, RunOptions, RunOutcome};

/// Run a saved contract off the async reactor.
pub async fn run_report<S, F, R, W>(
    runner: Arc<ReportRunner<S, F, R, W>>,
    options: RunOptions,
) -> Result<RunOutcome, RunFailure>
where
    S: ContractStore + Send + Sync + 'static,
    F: SessionStaging + Send + Sync + 'static,
    R: TemplateRenderer + Send + Sync + 'static,
    W: WorkbookSource + Send + Sync + 'static,
{
    join_run(tokio::task::spawn_blocking(move || runner.run(&options))).await
}

/// Test-drive a draft off the async reactor.
pub async fn test_draft_report<S, F, R, W>(
    runner: Arc<ReportRunner<S, F, R, W>>,
    request: DraftTestRequest,
) -> Result<RunOutcome, RunFailure>
where
    S: ContractStore + Send + Sync + 'static,
    F: SessionStaging + Send + Sync + 'static,
    R: TemplateRenderer + Send + Sync + 'static,
    W: WorkbookSource + Send + Sync + 'static,
{
    join_run(tokio::task::spawn_blocking(move || runner.test_draft(&request))).await
}

async fn join_run<T>(handle: JoinHandle<T>) -> T {
    match handle.await {
        Ok(value) => value,
        Err(err) => match err.try_into_panic() {
            Ok(payload) => std::panic::resume_unwind(payload),
            // spawn_blocking closures are never aborted once started, so the
            // only other join error is a runtime already shutting down
            Err(err) => panic!("report task cancelled: {err}"),
        },
    }
}
