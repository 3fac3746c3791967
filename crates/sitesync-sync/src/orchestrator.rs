//! Batch application of a deployment plan.
//!
//! One open store handle serves the whole batch. Stages run in order; the
//! operations inside a stage are dispatched through a bounded worker set.
//! Transient transfer failures retry with backoff; the first unrecoverable
//! failure stops further dispatch, lets in-flight operations drain, and
//! aborts the batch. Nothing is rolled back: the mirror is only committed
//! by the caller after full success, so the next run re-derives whatever
//! was left undone.

use std::sync::Arc;
use std::time::Duration;

use sitesync_remote::{OpKind, RemoteStore, TransferError, TransferErrorKind};
use tokio::task::JoinSet;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use crate::error::{SyncError, SyncResult};
use crate::plan::{Operation, Plan};

/// Retry behavior for transient transfer failures.
#[derive(Clone, Debug)]
pub struct RetryPolicy {
    /// Total attempts per operation, including the first.
    pub max_attempts: u32,
    /// Base backoff; attempt `n` waits `n * backoff`.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_millis(500),
        }
    }
}

/// Tunables for batch application.
#[derive(Clone, Debug)]
pub struct SyncOptions {
    /// Upper bound on concurrently dispatched operations. The effective
    /// bound is further limited by what the store advertises.
    pub max_in_flight: usize,
    /// Deadline for a single remote operation.
    pub op_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            max_in_flight: 4,
            op_timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }
}

/// Immutable result of a fully successful batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SyncReport {
    pub completed: usize,
    pub total: usize,
}

/// Apply a plan against the store.
///
/// Returns the report on full success, or [`SyncError::Aborted`] carrying
/// how many operations completed before the first failure.
pub async fn apply(
    plan: Plan,
    store: Arc<dyn RemoteStore>,
    options: &SyncOptions,
) -> SyncResult<SyncReport> {
    let total = plan.len();
    let limit = options.max_in_flight.min(store.max_in_flight()).max(1);
    debug!(total, stages = plan.stages.len(), limit, "applying plan");

    let mut completed = 0usize;
    for stage in plan.stages {
        let mut pending = stage.into_iter();
        let mut workers: JoinSet<Result<Operation, TransferError>> = JoinSet::new();
        let mut failure: Option<TransferError> = None;

        loop {
            // Top up the worker set unless a failure stopped dispatch.
            while failure.is_none() && workers.len() < limit {
                match pending.next() {
                    Some(op) => {
                        let store = Arc::clone(&store);
                        let op_timeout = options.op_timeout;
                        let retry = options.retry.clone();
                        workers.spawn(async move {
                            execute_with_retry(op, store, op_timeout, retry).await
                        });
                    }
                    None => break,
                }
            }

            match workers.join_next().await {
                None => break, // stage drained
                Some(joined) => match joined.expect("sync worker panicked") {
                    Ok(op) => {
                        completed += 1;
                        info!(completed, total, operation = %op, "applied");
                    }
                    Err(err) => {
                        // Keep the first failure; later ones are noise
                        // from already-in-flight workers.
                        if failure.is_none() {
                            warn!(error = %err, "operation failed; aborting batch");
                            failure = Some(err);
                        }
                    }
                },
            }
        }

        if let Some(source) = failure {
            return Err(SyncError::Aborted {
                completed,
                total,
                source,
            });
        }
    }

    Ok(SyncReport { completed, total })
}

async fn execute_with_retry(
    op: Operation,
    store: Arc<dyn RemoteStore>,
    op_timeout: Duration,
    retry: RetryPolicy,
) -> Result<Operation, TransferError> {
    let mut attempt = 1u32;
    loop {
        let outcome = timeout(op_timeout, dispatch(&op, store.as_ref())).await;
        let err = match outcome {
            Ok(Ok(())) => return Ok(op),
            Ok(Err(err)) => err,
            Err(_) => TransferError::new(
                op_kind(&op),
                op.path().clone(),
                TransferErrorKind::Timeout,
            ),
        };
        if !err.is_transient() || attempt >= retry.max_attempts {
            return Err(err);
        }
        warn!(operation = %op, attempt, error = %err, "transient failure; retrying");
        sleep(retry.backoff * attempt).await;
        attempt += 1;
    }
}

async fn dispatch(op: &Operation, store: &dyn RemoteStore) -> Result<(), TransferError> {
    match op {
        Operation::MakeDir { path } => store.ensure_dir(path).await,
        Operation::Upload { local, remote } => store.upload_from(local, remote).await,
        Operation::Remove { path } => store.remove(path).await,
        Operation::RemoveDir { path } => store.remove_dir(path).await,
    }
}

fn op_kind(op: &Operation) -> OpKind {
    match op {
        Operation::MakeDir { .. } => OpKind::EnsureDir,
        Operation::Upload { .. } => OpKind::Upload,
        Operation::Remove { .. } => OpKind::Remove,
        Operation::RemoveDir { .. } => OpKind::RemoveDir,
    }
}
