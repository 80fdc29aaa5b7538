//! Core task types: [`TaskHandle`], [`TaskState`], and [`TaskStatus`].
//!
//! A submitted operation is identified by a [`TaskHandle`] and observed
//! through [`TaskStatus`] snapshots fetched from the task service. The
//! service owns every status record; clients only ever hold read-only
//! copies and never mutate them.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::TaskError;
use crate::types::report::OperationResult;

/// Task lifecycle state.
///
/// An admitted task progresses through a monotonic state machine. Terminal
/// states (`Succeeded`, `Failed`, `Cancelled`) reject all transitions, and
/// self-transitions are rejected everywhere.
///
/// Two pre-admission outcomes short-circuit the machine: `Rejected`
/// submissions are never admitted and never transition, while `Postponed`
/// submissions are admitted but deferred behind earlier requests against
/// the same consumer and re-enter the machine at `Waiting` once promoted.
///
/// # State Machine
///
/// ```text
/// Waiting   -> Running, Succeeded, Failed, Cancelled
/// Running   -> Succeeded, Failed, Cancelled
/// Postponed -> Waiting, Cancelled
/// Rejected  -> (no transitions)
/// Succeeded -> (terminal, no transitions)
/// Failed    -> (terminal, no transitions)
/// Cancelled -> (terminal, no transitions)
/// ```
///
/// `Waiting -> Succeeded` is deliberately legal: a fast task may pass
/// through `Running` between two polls, and a client snapshot must not be
/// able to observe an invalid jump.
///
/// # Examples
///
/// ```
/// use pulp_tasks::TaskState;
///
/// let state = TaskState::Waiting;
/// assert!(!state.is_terminal());
/// assert!(state.can_transition_to(&TaskState::Running));
/// assert!(!state.can_transition_to(&TaskState::Waiting)); // self-transition rejected
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    /// Task is admitted and queued, waiting to begin.
    Waiting,
    /// Task is actively being processed.
    Running,
    /// Task completed successfully (terminal).
    Succeeded,
    /// Task failed (terminal); the status carries an exception.
    Failed,
    /// Task was cancelled on the server (terminal).
    Cancelled,
    /// Submission was refused because of a conflicting pending operation
    /// against the same consumer. Never admitted, never polled.
    Rejected,
    /// Submission was admitted but deferred behind earlier requests
    /// against the same consumer. It will run later, in submission order.
    Postponed,
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waiting => write!(f, "waiting"),
            Self::Running => write!(f, "running"),
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed => write!(f, "failed"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Rejected => write!(f, "rejected"),
            Self::Postponed => write!(f, "postponed"),
        }
    }
}

impl TaskState {
    /// Returns `true` if this state is terminal (no further transitions).
    ///
    /// Terminal states are exactly `Succeeded`, `Failed`, and `Cancelled`.
    /// `Rejected` is final in practice (it never transitions) but is not a
    /// terminal state of the polling loop; it is filtered out before
    /// polling begins.
    ///
    /// # Examples
    ///
    /// ```
    /// use pulp_tasks::TaskState;
    ///
    /// assert!(!TaskState::Waiting.is_terminal());
    /// assert!(!TaskState::Rejected.is_terminal());
    /// assert!(TaskState::Succeeded.is_terminal());
    /// assert!(TaskState::Failed.is_terminal());
    /// assert!(TaskState::Cancelled.is_terminal());
    /// ```
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }

    /// Returns `true` if this state is a pre-admission outcome
    /// (`Rejected` or `Postponed`) that must be classified before the
    /// polling loop is entered.
    pub fn is_pre_admission(&self) -> bool {
        matches!(self, Self::Rejected | Self::Postponed)
    }

    /// Returns `true` if transitioning from this state to `next` is valid.
    ///
    /// Self-transitions are rejected.
    ///
    /// # Examples
    ///
    /// ```
    /// use pulp_tasks::TaskState;
    ///
    /// assert!(TaskState::Waiting.can_transition_to(&TaskState::Running));
    /// assert!(TaskState::Postponed.can_transition_to(&TaskState::Waiting));
    /// assert!(!TaskState::Rejected.can_transition_to(&TaskState::Waiting));
    /// assert!(!TaskState::Succeeded.can_transition_to(&TaskState::Running));
    /// ```
    pub fn can_transition_to(&self, next: &Self) -> bool {
        if self == next {
            return false;
        }

        match self {
            Self::Waiting => matches!(
                next,
                Self::Running | Self::Succeeded | Self::Failed | Self::Cancelled
            ),
            Self::Running => {
                matches!(next, Self::Succeeded | Self::Failed | Self::Cancelled)
            }
            Self::Postponed => matches!(next, Self::Waiting | Self::Cancelled),
            Self::Rejected | Self::Succeeded | Self::Failed | Self::Cancelled => false,
        }
    }

    /// Validates a transition from this state to `next`.
    ///
    /// Returns [`TaskError::InvalidTransition`] with the offending task ID
    /// and both states when the transition is not allowed.
    ///
    /// # Examples
    ///
    /// ```
    /// use pulp_tasks::TaskState;
    ///
    /// assert!(TaskState::Waiting
    ///     .validate_transition("task-123", &TaskState::Running)
    ///     .is_ok());
    /// assert!(TaskState::Cancelled
    ///     .validate_transition("task-123", &TaskState::Running)
    ///     .is_err());
    /// ```
    pub fn validate_transition(&self, task_id: &str, next: &Self) -> Result<(), TaskError> {
        if self.can_transition_to(next) {
            Ok(())
        } else {
            Err(TaskError::InvalidTransition {
                task_id: task_id.to_string(),
                from: *self,
                to: *next,
            })
        }
    }
}

/// Identifies a server-side asynchronous operation.
///
/// Handles are issued by the task service at submission time, are
/// immutable, and are never reused. Holding a handle grants nothing but
/// the ability to fetch status snapshots for the task it names.
///
/// # Examples
///
/// ```
/// use pulp_tasks::TaskHandle;
///
/// let handle = TaskHandle::new("0c2a9f6e");
/// assert_eq!(handle.task_id(), "0c2a9f6e");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskHandle {
    task_id: String,
}

impl TaskHandle {
    /// Wraps a server-assigned task ID.
    pub fn new(task_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
        }
    }

    /// The opaque server-assigned task identifier.
    pub fn task_id(&self) -> &str {
        &self.task_id
    }
}

impl fmt::Display for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.task_id)
    }
}

/// A read-only snapshot of a task's current state.
///
/// Snapshots are created by the task service and mutated only by it as
/// the underlying operation progresses; every fetch returns an immutable
/// copy. Two fetches with no intervening server-side change return
/// snapshots equal in all fields.
///
/// `result` is only meaningful once the task has succeeded; `exception`
/// only once it has failed.
///
/// # Examples
///
/// ```
/// use pulp_tasks::{TaskState, TaskStatus};
///
/// let status = TaskStatus::new("task-1", TaskState::Running);
/// assert!(!status.state.is_terminal());
/// assert!(status.result.is_none());
/// assert_eq!(status.handle().task_id(), "task-1");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskStatus {
    /// The task this snapshot describes.
    pub task_id: String,

    /// Current lifecycle state.
    pub state: TaskState,

    /// Operation result payload. Only meaningful in the `Succeeded` state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<OperationResult>,

    /// Error detail. Only meaningful in the `Failed` state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exception: Option<String>,
}

impl TaskStatus {
    /// Creates a snapshot with no result or exception payload.
    pub fn new(task_id: impl Into<String>, state: TaskState) -> Self {
        Self {
            task_id: task_id.into(),
            state,
            result: None,
            exception: None,
        }
    }

    /// A handle for the task this snapshot describes.
    pub fn handle(&self) -> TaskHandle {
        TaskHandle::new(self.task_id.clone())
    }
}
