//! Error types for task submission and polling.
//!
//! Provides [`TaskError`], a rich error enum with context fields for every
//! failure the protocol can produce. Expected request outcomes (rejection,
//! postponement) are **not** errors; they are modeled as
//! [`TaskState`](crate::types::TaskState) variants and classified by
//! [`classify`](crate::classify::classify).

use thiserror::Error;

use crate::types::task::TaskState;

/// Errors that can occur during task submission, polling, and rendering.
///
/// Each variant carries contextual information (task ID, states, attempt
/// counts) to aid debugging. Submission-time errors (`ConsumerNotFound`)
/// are expected conditions recovered at the command boundary; transient
/// transport failures surface as `ServiceUnavailable` and are retried by
/// the poller before escalating to `FetchRetriesExhausted`.
///
/// # Examples
///
/// ```
/// use pulp_tasks::TaskError;
///
/// let err = TaskError::NotFound { task_id: "missing-task".to_string() };
/// assert!(err.to_string().contains("missing-task"));
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// The consumer targeted by a submission does not exist. Reported
    /// before a task handle is issued; no polling occurs.
    #[error("consumer not found: {consumer_id}")]
    ConsumerNotFound {
        /// The consumer ID that was not found.
        consumer_id: String,
    },

    /// Task with the given ID was not found.
    #[error("task not found: {task_id}")]
    NotFound {
        /// The task ID that was not found.
        task_id: String,
    },

    /// Attempted an invalid state machine transition.
    #[error("invalid transition from {from} to {to} for task {task_id}")]
    InvalidTransition {
        /// The task that was being transitioned.
        task_id: String,
        /// The current state of the task.
        from: TaskState,
        /// The target state that was rejected.
        to: TaskState,
    },

    /// A terminal-only operation (rendering) was applied to a task that
    /// has not reached a terminal state.
    #[error("task not in terminal state: {task_id} (state: {state})")]
    NotTerminal {
        /// The task ID.
        task_id: String,
        /// The task's current non-terminal state.
        state: TaskState,
    },

    /// The poller observed a task that was never admitted for execution.
    /// Rejected and postponed submissions must be classified before
    /// polling begins.
    #[error("task {task_id} was not admitted for polling (state: {state})")]
    NotAdmitted {
        /// The task ID.
        task_id: String,
        /// The pre-admission state that was observed.
        state: TaskState,
    },

    /// A terminal status is missing the payload its state requires: a
    /// succeeded task without a result, or a failed task without an
    /// exception.
    #[error("terminal status for task {task_id} is missing its payload")]
    MissingResult {
        /// The task ID.
        task_id: String,
    },

    /// The task service could not be reached. Transient; the poller
    /// retries these before giving up.
    #[error("task service unavailable: {message}")]
    ServiceUnavailable {
        /// Human-readable description of the transport failure.
        message: String,
    },

    /// Polling gave up after repeated transient fetch failures.
    #[error("fetching task {task_id} failed after {attempts} attempts: {message}")]
    FetchRetriesExhausted {
        /// The task being polled.
        task_id: String,
        /// Total fetch attempts made, including the first.
        attempts: u32,
        /// The last transport failure observed.
        message: String,
    },
}
