//! The polling loop.
//!
//! [`Poller`] repeatedly fetches the status of an admitted task until a
//! terminal state is observed, sleeping a configured interval between
//! fetches and emitting progress events through a
//! [`ProgressListener`](crate::progress::ProgressListener). The loop is
//! interruptible through a [`CancellationToken`]; cancelling stops the
//! client-side observation only and leaves the server-side task
//! untouched.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::constants::DEFAULT_FETCH_RETRY_ATTEMPTS;
use crate::error::TaskError;
use crate::progress::ProgressListener;
use crate::service::TaskService;
use crate::types::task::{TaskHandle, TaskState, TaskStatus};

/// How a polling loop ended.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// The task reached a terminal state; the final snapshot is ready
    /// for rendering.
    Completed(TaskStatus),

    /// The observation was cancelled locally. The task keeps running on
    /// the server; no further status was fetched.
    Interrupted,
}

// Outcome of a single fetch, after retries.
enum Step {
    Status(TaskStatus),
    Interrupted,
}

/// Drives the polling loop for a single task.
///
/// Each poller owns only its handle and local loop state, so independent
/// pollers can run concurrently without shared mutable state.
///
/// # Loop shape
///
/// On every iteration the poller fetches a snapshot, returns it if the
/// state is terminal, emits one progress event (a distinguished
/// "waiting to begin" event while the task has not started, a plain
/// advance otherwise), and then sleeps exactly the configured interval.
/// No sleep follows the terminal fetch.
///
/// # Fetch failures
///
/// Transient [`TaskError::ServiceUnavailable`] errors are retried up to
/// the configured number of additional attempts, sleeping the same
/// interval between tries; exhaustion surfaces
/// [`TaskError::FetchRetriesExhausted`]. Other fetch errors surface
/// immediately.
///
/// # Cancellation
///
/// The token is checked at the top of every iteration and raced against
/// every sleep. On cancellation the loop returns
/// [`PollOutcome::Interrupted`] without performing another fetch.
pub struct Poller {
    service: Arc<dyn TaskService>,
    interval: Duration,
    fetch_retry_attempts: u32,
}

impl Poller {
    /// Creates a poller with the given fetch interval and the default
    /// retry budget.
    ///
    /// `interval` must be non-zero; configuration loading enforces this
    /// for intervals sourced from
    /// [`ClientConfig`](crate::config::ClientConfig).
    pub fn new(service: Arc<dyn TaskService>, interval: Duration) -> Self {
        Self {
            service,
            interval,
            fetch_retry_attempts: DEFAULT_FETCH_RETRY_ATTEMPTS,
        }
    }

    /// Overrides the number of additional fetch attempts made on
    /// transient service errors.
    pub fn with_fetch_retry_attempts(mut self, attempts: u32) -> Self {
        self.fetch_retry_attempts = attempts;
        self
    }

    /// Polls until the task reaches a terminal state or the observation
    /// is cancelled.
    ///
    /// Rejected and postponed submissions never reach this loop; they
    /// are filtered out by [`classify`](crate::classify::classify)
    /// before polling begins. Observing one here is a contract violation
    /// and surfaces [`TaskError::NotAdmitted`].
    ///
    /// # Errors
    ///
    /// - [`TaskError::NotFound`] if the task disappeared from the store.
    /// - [`TaskError::FetchRetriesExhausted`] after repeated transient
    ///   fetch failures.
    /// - [`TaskError::NotAdmitted`] if a pre-admission state is observed.
    pub async fn poll(
        &self,
        handle: &TaskHandle,
        listener: &dyn ProgressListener,
        cancel: &CancellationToken,
    ) -> Result<PollOutcome, TaskError> {
        loop {
            if cancel.is_cancelled() {
                return Ok(PollOutcome::Interrupted);
            }

            let status = match self.fetch_with_retry(handle, cancel).await? {
                Step::Status(status) => status,
                Step::Interrupted => return Ok(PollOutcome::Interrupted),
            };

            if status.state.is_pre_admission() {
                return Err(TaskError::NotAdmitted {
                    task_id: status.task_id,
                    state: status.state,
                });
            }

            if status.state.is_terminal() {
                tracing::debug!(
                    task_id = %status.task_id,
                    state = %status.state,
                    "task reached terminal state"
                );
                return Ok(PollOutcome::Completed(status));
            }

            if status.state == TaskState::Waiting {
                listener.waiting().await;
            } else {
                listener.advancing().await;
            }

            tokio::select! {
                () = cancel.cancelled() => return Ok(PollOutcome::Interrupted),
                () = tokio::time::sleep(self.interval) => {}
            }
        }
    }

    // Fetches one snapshot, retrying transient service errors with the
    // poll interval between attempts.
    async fn fetch_with_retry(
        &self,
        handle: &TaskHandle,
        cancel: &CancellationToken,
    ) -> Result<Step, TaskError> {
        let mut attempts = 0u32;
        loop {
            match self.service.fetch(handle).await {
                Ok(status) => return Ok(Step::Status(status)),
                Err(TaskError::ServiceUnavailable { message }) => {
                    attempts += 1;
                    if attempts > self.fetch_retry_attempts {
                        return Err(TaskError::FetchRetriesExhausted {
                            task_id: handle.task_id().to_string(),
                            attempts,
                            message,
                        });
                    }
                    tracing::warn!(
                        task_id = %handle.task_id(),
                        attempt = attempts,
                        error = %message,
                        "status fetch failed, retrying"
                    );
                    tokio::select! {
                        () = cancel.cancelled() => return Ok(Step::Interrupted),
                        () = tokio::time::sleep(self.interval) => {}
                    }
                }
                Err(other) => return Err(other),
            }
        }
    }
}
