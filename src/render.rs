//! Rendering of terminal statuses into user-presentable reports.
//!
//! A [`Report`] is structured data, not text: presentation (prompt
//! rendering, document formatting) stays with the caller. The mapping
//! from terminal state to report variant is total and non-overlapping.

use std::collections::HashMap;

use crate::error::TaskError;
use crate::types::report::UnitReport;
use crate::types::task::{TaskState, TaskStatus};

/// A terminal task outcome, ready for presentation.
#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    /// The operation ran to completion.
    Succeeded {
        /// Overall server-reported outcome; `false` when one or more
        /// content types failed even though the task itself completed.
        all_succeeded: bool,

        /// Per-type reports, keyed by content type ID.
        details: HashMap<String, UnitReport>,
    },

    /// The task failed.
    Failed {
        /// The exception detail reported by the server, verbatim.
        exception: String,
    },

    /// The task was cancelled on the server.
    Cancelled,
}

/// Renders a terminal status snapshot into a [`Report`].
///
/// Exactly one variant is produced per terminal state: `Succeeded` maps
/// to [`Report::Succeeded`], `Failed` to [`Report::Failed`], and
/// `Cancelled` to [`Report::Cancelled`].
///
/// # Errors
///
/// - [`TaskError::NotTerminal`] if the snapshot is not in a terminal
///   state.
/// - [`TaskError::MissingResult`] if a succeeded snapshot carries no
///   result payload, or a failed snapshot no exception. Both are
///   protocol violations surfaced at the boundary rather than papered
///   over with defaults.
///
/// # Examples
///
/// ```
/// use pulp_tasks::{render, Report, TaskState, TaskStatus};
///
/// let mut status = TaskStatus::new("t1", TaskState::Failed);
/// status.exception = Some("disk full".to_string());
///
/// let report = render(status).unwrap();
/// assert_eq!(report, Report::Failed { exception: "disk full".to_string() });
/// ```
pub fn render(status: TaskStatus) -> Result<Report, TaskError> {
    match status.state {
        TaskState::Succeeded => {
            let result = status.result.ok_or(TaskError::MissingResult {
                task_id: status.task_id,
            })?;
            Ok(Report::Succeeded {
                all_succeeded: result.succeeded,
                details: result.details,
            })
        }
        TaskState::Failed => {
            let exception = status.exception.ok_or(TaskError::MissingResult {
                task_id: status.task_id,
            })?;
            Ok(Report::Failed { exception })
        }
        TaskState::Cancelled => Ok(Report::Cancelled),
        state => Err(TaskError::NotTerminal {
            task_id: status.task_id,
            state,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::report::OperationResult;
    use serde_json::json;

    fn succeeded_status(result: OperationResult) -> TaskStatus {
        let mut status = TaskStatus::new("t1", TaskState::Succeeded);
        status.result = Some(result);
        status
    }

    #[test]
    fn succeeded_maps_payload() {
        let result: OperationResult = serde_json::from_value(json!({
            "status": true,
            "details": {"type_1": {"status": true, "details": "ok"}},
        }))
        .unwrap();

        let report = render(succeeded_status(result)).unwrap();
        match report {
            Report::Succeeded {
                all_succeeded,
                details,
            } => {
                assert!(all_succeeded);
                assert_eq!(
                    details["type_1"],
                    UnitReport::Succeeded {
                        details: json!("ok")
                    }
                );
            }
            other => panic!("expected Succeeded, got {other:?}"),
        }
    }

    #[test]
    fn succeeded_carries_per_type_failure_message() {
        let result: OperationResult = serde_json::from_value(json!({
            "status": false,
            "details": {"type_2": {"status": false, "details": {"message": "boom"}}},
        }))
        .unwrap();

        let report = render(succeeded_status(result)).unwrap();
        match report {
            Report::Succeeded {
                all_succeeded,
                details,
            } => {
                assert!(!all_succeeded);
                assert_eq!(
                    details["type_2"],
                    UnitReport::Failed {
                        message: "boom".to_string()
                    }
                );
            }
            other => panic!("expected Succeeded, got {other:?}"),
        }
    }

    #[test]
    fn failed_maps_exception() {
        let mut status = TaskStatus::new("t1", TaskState::Failed);
        status.exception = Some("unit not available".to_string());
        assert_eq!(
            render(status).unwrap(),
            Report::Failed {
                exception: "unit not available".to_string()
            }
        );
    }

    #[test]
    fn cancelled_has_no_payload() {
        let status = TaskStatus::new("t1", TaskState::Cancelled);
        assert_eq!(render(status).unwrap(), Report::Cancelled);
    }

    #[test]
    fn non_terminal_is_rejected() {
        for state in [
            TaskState::Waiting,
            TaskState::Running,
            TaskState::Rejected,
            TaskState::Postponed,
        ] {
            let err = render(TaskStatus::new("t1", state)).unwrap_err();
            assert_eq!(
                err,
                TaskError::NotTerminal {
                    task_id: "t1".to_string(),
                    state,
                }
            );
        }
    }

    #[test]
    fn succeeded_without_result_is_a_violation() {
        let err = render(TaskStatus::new("t1", TaskState::Succeeded)).unwrap_err();
        assert_eq!(
            err,
            TaskError::MissingResult {
                task_id: "t1".to_string()
            }
        );
    }

    #[test]
    fn failed_without_exception_is_a_violation() {
        let err = render(TaskStatus::new("t1", TaskState::Failed)).unwrap_err();
        assert_eq!(
            err,
            TaskError::MissingResult {
                task_id: "t1".to_string()
            }
        );
    }
}
