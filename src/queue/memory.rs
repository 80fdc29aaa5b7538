//! Thread-safe in-memory task queue.
//!
//! Records live in a [`DashMap`] keyed by task ID; per-consumer
//! admission state (pending order, removal flag) lives behind a single
//! mutex. Lock ordering is admission state first, then records -- every
//! path that needs both acquires them in that order.
//!
//! # Admission semantics
//!
//! - The first pending submission against a consumer is admitted
//!   `Waiting`.
//! - While earlier submissions are still pending, later ones are
//!   admitted `Postponed` and promoted to `Waiting` in submission order
//!   as their predecessors reach terminal states.
//! - Once [`schedule_unregister`](MemoryTaskQueue::schedule_unregister)
//!   records an impending removal, new submissions are `Rejected`:
//!   recorded and fetchable, but never queued.
//! - Consumers are independent; ordering is never enforced across them.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::error::TaskError;
use crate::service::TaskService;
use crate::types::content::OperationRequest;
use crate::types::report::OperationResult;
use crate::types::task::{TaskHandle, TaskState, TaskStatus};

struct QueueRecord {
    status: TaskStatus,
    consumer_id: String,
    request: OperationRequest,
    last_updated_at: DateTime<Utc>,
}

#[derive(Default)]
struct ConsumerQueue {
    /// Task IDs admitted against this consumer, in submission order.
    pending: VecDeque<String>,
    /// Set once an unregister is pending; rejects new submissions.
    removal_pending: bool,
}

/// In-memory [`TaskService`] with per-consumer admission ordering.
///
/// Submissions and fetches go through the [`TaskService`] trait; the
/// inherent methods are the server-side progression API used by
/// whatever drives task execution ([`begin`](Self::begin),
/// [`succeed`](Self::succeed), [`fail`](Self::fail),
/// [`cancel`](Self::cancel)). All transitions are validated against the
/// task state machine.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use pulp_tasks::{
///     ContentUnit, InstallOptions, MemoryTaskQueue, OperationRequest,
///     OperationResult, TaskService, TaskState,
/// };
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let queue = MemoryTaskQueue::new();
/// queue.register("web-01");
///
/// let request = OperationRequest::Install {
///     units: vec![ContentUnit::by_name("rpm", "zsh")],
///     options: InstallOptions::default(),
/// };
/// let handle = queue.submit("web-01", request).await.unwrap();
/// assert_eq!(
///     queue.fetch(&handle).await.unwrap().state,
///     TaskState::Waiting,
/// );
///
/// queue.begin(handle.task_id()).unwrap();
/// queue
///     .succeed(handle.task_id(), OperationResult::empty_success())
///     .unwrap();
/// assert!(queue.fetch(&handle).await.unwrap().state.is_terminal());
/// # });
/// ```
pub struct MemoryTaskQueue {
    records: DashMap<String, QueueRecord>,
    consumers: Mutex<HashMap<String, ConsumerQueue>>,
}

impl MemoryTaskQueue {
    /// Creates an empty queue with no registered consumers.
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
            consumers: Mutex::new(HashMap::new()),
        }
    }

    /// Registers a consumer so it can accept submissions.
    ///
    /// Registering an already-known consumer is a no-op.
    pub fn register(&self, consumer_id: impl Into<String>) {
        let consumer_id = consumer_id.into();
        let mut consumers = self.consumers.lock();
        consumers.entry(consumer_id).or_default();
    }

    /// Records an impending unregister for a consumer.
    ///
    /// From this point on, new submissions against the consumer are
    /// rejected. Operations already admitted are left to run.
    ///
    /// # Errors
    ///
    /// - [`TaskError::ConsumerNotFound`] if the consumer is not
    ///   registered.
    pub fn schedule_unregister(&self, consumer_id: &str) -> Result<(), TaskError> {
        let mut consumers = self.consumers.lock();
        let queue = consumers
            .get_mut(consumer_id)
            .ok_or_else(|| TaskError::ConsumerNotFound {
                consumer_id: consumer_id.to_string(),
            })?;
        queue.removal_pending = true;
        tracing::debug!(consumer_id, "consumer removal pending, rejecting new submissions");
        Ok(())
    }

    /// Marks a waiting task as running.
    ///
    /// # Errors
    ///
    /// - [`TaskError::NotFound`] if no task with the given ID exists.
    /// - [`TaskError::InvalidTransition`] if the task is not waiting.
    pub fn begin(&self, task_id: &str) -> Result<TaskStatus, TaskError> {
        self.transition(task_id, TaskState::Running, |_| {})
    }

    /// Completes a task successfully, attaching its result payload, and
    /// promotes the consumer's next pending submission.
    ///
    /// # Errors
    ///
    /// - [`TaskError::NotFound`] if no task with the given ID exists.
    /// - [`TaskError::InvalidTransition`] if the task is already
    ///   terminal or was never admitted.
    pub fn succeed(
        &self,
        task_id: &str,
        result: OperationResult,
    ) -> Result<TaskStatus, TaskError> {
        let status = self.transition(task_id, TaskState::Succeeded, move |record| {
            record.status.result = Some(result);
        })?;
        self.settle(task_id);
        Ok(status)
    }

    /// Fails a task, attaching its exception detail, and promotes the
    /// consumer's next pending submission.
    ///
    /// # Errors
    ///
    /// - [`TaskError::NotFound`] if no task with the given ID exists.
    /// - [`TaskError::InvalidTransition`] if the task is already
    ///   terminal or was never admitted.
    pub fn fail(
        &self,
        task_id: &str,
        exception: impl Into<String>,
    ) -> Result<TaskStatus, TaskError> {
        let exception = exception.into();
        let status = self.transition(task_id, TaskState::Failed, move |record| {
            record.status.exception = Some(exception);
        })?;
        self.settle(task_id);
        Ok(status)
    }

    /// Cancels a task on the server side.
    ///
    /// Waiting, running, and postponed tasks can all be cancelled. A
    /// cancelled task is removed from its consumer's admission queue and
    /// any newly unblocked submission is promoted.
    ///
    /// # Errors
    ///
    /// - [`TaskError::NotFound`] if no task with the given ID exists.
    /// - [`TaskError::InvalidTransition`] if the task is already
    ///   terminal or was rejected.
    pub fn cancel(&self, task_id: &str) -> Result<TaskStatus, TaskError> {
        let status = self.transition(task_id, TaskState::Cancelled, |_| {})?;
        self.settle(task_id);
        Ok(status)
    }

    /// The admitted tasks pending against a consumer, in submission
    /// order. The head entry is the one currently waiting or running.
    ///
    /// # Errors
    ///
    /// - [`TaskError::ConsumerNotFound`] if the consumer is not
    ///   registered.
    pub fn pending_tasks(&self, consumer_id: &str) -> Result<Vec<TaskHandle>, TaskError> {
        let consumers = self.consumers.lock();
        let queue = consumers
            .get(consumer_id)
            .ok_or_else(|| TaskError::ConsumerNotFound {
                consumer_id: consumer_id.to_string(),
            })?;
        Ok(queue.pending.iter().cloned().map(TaskHandle::new).collect())
    }

    /// The operation a task was submitted with.
    ///
    /// # Errors
    ///
    /// - [`TaskError::NotFound`] if no task with the given ID exists.
    pub fn request(&self, task_id: &str) -> Result<OperationRequest, TaskError> {
        let record = self
            .records
            .get(task_id)
            .ok_or_else(|| TaskError::NotFound {
                task_id: task_id.to_string(),
            })?;
        Ok(record.request.clone())
    }

    /// Removes finished (terminal or rejected) records last touched
    /// before `older_than` ago. Returns the count removed.
    pub fn purge_finished(&self, older_than: chrono::Duration) -> usize {
        let cutoff = Utc::now() - older_than;
        let before = self.records.len();
        self.records.retain(|_, record| {
            let finished =
                record.status.state.is_terminal() || record.status.state == TaskState::Rejected;
            !(finished && record.last_updated_at < cutoff)
        });
        before - self.records.len()
    }

    /// Returns the number of task records held.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if no task records are held.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    // Applies a validated transition plus a payload edit, returning the
    // updated snapshot. The record guard is dropped before returning so
    // callers can take the admission lock afterwards.
    fn transition<F>(
        &self,
        task_id: &str,
        next: TaskState,
        edit: F,
    ) -> Result<TaskStatus, TaskError>
    where
        F: FnOnce(&mut QueueRecord),
    {
        let mut record = self
            .records
            .get_mut(task_id)
            .ok_or_else(|| TaskError::NotFound {
                task_id: task_id.to_string(),
            })?;
        record.status.state.validate_transition(task_id, &next)?;
        record.status.state = next;
        edit(&mut record);
        record.last_updated_at = Utc::now();
        tracing::debug!(task_id, state = %next, "task transitioned");
        Ok(record.status.clone())
    }

    // Removes a finished task from its consumer's admission queue and
    // promotes the new head if it was postponed.
    fn settle(&self, task_id: &str) {
        let consumer_id = match self.records.get(task_id) {
            Some(record) => record.consumer_id.clone(),
            None => return,
        };

        let mut consumers = self.consumers.lock();
        let Some(queue) = consumers.get_mut(&consumer_id) else {
            return;
        };
        queue.pending.retain(|id| id != task_id);

        if let Some(head) = queue.pending.front().cloned() {
            if let Some(mut record) = self.records.get_mut(&head) {
                if record.status.state == TaskState::Postponed {
                    record.status.state = TaskState::Waiting;
                    record.last_updated_at = Utc::now();
                    tracing::debug!(task_id = %head, consumer_id = %consumer_id, "postponed task promoted");
                }
            }
        }
    }
}

impl Default for MemoryTaskQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskService for MemoryTaskQueue {
    async fn submit(
        &self,
        consumer_id: &str,
        request: OperationRequest,
    ) -> Result<TaskHandle, TaskError> {
        let mut consumers = self.consumers.lock();
        let queue = consumers
            .get_mut(consumer_id)
            .ok_or_else(|| TaskError::ConsumerNotFound {
                consumer_id: consumer_id.to_string(),
            })?;

        let task_id = Uuid::new_v4().to_string();
        let state = if queue.removal_pending {
            TaskState::Rejected
        } else if queue.pending.is_empty() {
            TaskState::Waiting
        } else {
            TaskState::Postponed
        };
        if state != TaskState::Rejected {
            queue.pending.push_back(task_id.clone());
        }

        tracing::debug!(
            consumer_id,
            task_id = %task_id,
            operation = request.kind(),
            state = %state,
            "operation submitted"
        );
        self.records.insert(
            task_id.clone(),
            QueueRecord {
                status: TaskStatus::new(task_id.clone(), state),
                consumer_id: consumer_id.to_string(),
                request,
                last_updated_at: Utc::now(),
            },
        );
        Ok(TaskHandle::new(task_id))
    }

    async fn fetch(&self, handle: &TaskHandle) -> Result<TaskStatus, TaskError> {
        let record =
            self.records
                .get(handle.task_id())
                .ok_or_else(|| TaskError::NotFound {
                    task_id: handle.task_id().to_string(),
                })?;
        Ok(record.status.clone())
    }
}
