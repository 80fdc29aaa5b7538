//! High-level operation flow: submit, classify, poll, render.
//!
//! [`TaskClient`] wraps an `Arc<dyn TaskService>` and runs the full
//! protocol for one operation: submit the request, fetch the initial
//! status, classify it, and either short-circuit (rejected/postponed)
//! or poll to completion and render the terminal snapshot.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::classify::{classify, RequestOutcome};
use crate::config::{ClientConfig, ConfigError};
use crate::error::TaskError;
use crate::poll::{PollOutcome, Poller};
use crate::progress::ProgressListener;
use crate::render::{render, Report};
use crate::service::TaskService;
use crate::types::content::OperationRequest;
use crate::types::task::{TaskHandle, TaskStatus};

/// The complete outcome of one submitted operation.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationOutcome {
    /// The submission was refused; the initial status is attached for
    /// reporting. No polling occurred.
    Rejected(TaskStatus),

    /// The submission was accepted but deferred behind earlier requests
    /// against the same consumer; it will run at the earliest possible
    /// time. No polling occurred.
    Postponed(TaskStatus),

    /// The task ran to a terminal state and was rendered.
    Completed(Report),

    /// The observation was cancelled locally; the task proceeds on the
    /// server and nothing further is reported.
    Interrupted,
}

/// Client facade over a task service.
///
/// Cloning is cheap and produces a handle to the same underlying
/// service.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use pulp_tasks::{ClientConfig, MemoryTaskQueue, TaskClient};
///
/// let queue = Arc::new(MemoryTaskQueue::new());
/// let client = TaskClient::new(queue, &ClientConfig::default()).unwrap();
/// ```
#[derive(Clone)]
pub struct TaskClient {
    service: Arc<dyn TaskService>,
    interval: Duration,
    fetch_retry_attempts: u32,
}

impl TaskClient {
    /// Creates a client, validating the configuration.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidPollFrequency`] when the configured poll
    ///   frequency is not a positive finite number.
    pub fn new(service: Arc<dyn TaskService>, config: &ClientConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            service,
            interval: config.poll_interval(),
            fetch_retry_attempts: config.output.fetch_retry_attempts,
        })
    }

    /// Submits an operation and returns its handle without polling.
    ///
    /// # Errors
    ///
    /// - [`TaskError::ConsumerNotFound`] if the consumer does not exist.
    /// - [`TaskError::ServiceUnavailable`] on transport failures.
    pub async fn submit(
        &self,
        consumer_id: &str,
        request: OperationRequest,
    ) -> Result<TaskHandle, TaskError> {
        let handle = self.service.submit(consumer_id, request).await?;
        tracing::debug!(
            consumer_id,
            task_id = %handle.task_id(),
            "operation submitted"
        );
        Ok(handle)
    }

    /// Fetches the current status snapshot for a task.
    ///
    /// # Errors
    ///
    /// - [`TaskError::NotFound`] if no task with the given ID exists.
    /// - [`TaskError::ServiceUnavailable`] on transport failures.
    pub async fn fetch(&self, handle: &TaskHandle) -> Result<TaskStatus, TaskError> {
        self.service.fetch(handle).await
    }

    /// Runs the full flow for one operation.
    ///
    /// Submits the request, fetches and classifies the initial status,
    /// and for admitted submissions polls until the task reaches a
    /// terminal state, rendering the final snapshot. Rejected and
    /// postponed submissions short-circuit without a single poll fetch.
    ///
    /// Cancelling `cancel` stops observation only; the server-side task
    /// is unaffected and [`OperationOutcome::Interrupted`] is returned.
    ///
    /// # Errors
    ///
    /// - [`TaskError::ConsumerNotFound`] if the consumer does not exist
    ///   (no handle was issued).
    /// - [`TaskError::FetchRetriesExhausted`] after repeated transient
    ///   fetch failures while polling.
    /// - [`TaskError::MissingResult`] if the terminal snapshot lacks the
    ///   payload its state requires.
    pub async fn execute(
        &self,
        consumer_id: &str,
        request: OperationRequest,
        listener: &dyn ProgressListener,
        cancel: &CancellationToken,
    ) -> Result<OperationOutcome, TaskError> {
        let handle = self.submit(consumer_id, request).await?;
        let initial = self.service.fetch(&handle).await?;

        match classify(&initial) {
            RequestOutcome::Rejected => {
                tracing::debug!(task_id = %handle.task_id(), "submission rejected");
                Ok(OperationOutcome::Rejected(initial))
            }
            RequestOutcome::Postponed => {
                tracing::debug!(task_id = %handle.task_id(), "submission postponed");
                Ok(OperationOutcome::Postponed(initial))
            }
            RequestOutcome::Proceed => {
                let poller = Poller::new(self.service.clone(), self.interval)
                    .with_fetch_retry_attempts(self.fetch_retry_attempts);
                match poller.poll(&handle, listener, cancel).await? {
                    PollOutcome::Completed(status) => {
                        Ok(OperationOutcome::Completed(render(status)?))
                    }
                    PollOutcome::Interrupted => Ok(OperationOutcome::Interrupted),
                }
            }
        }
    }
}
