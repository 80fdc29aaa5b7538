//! End-to-end operation flows against the in-memory queue: admission
//! classification, short-circuit outcomes, polling to completion, and
//! local observation cancellation.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::json;
use tokio_util::sync::CancellationToken;

use pulp_tasks::{
    ClientConfig, ContentUnit, InstallOptions, MemoryTaskQueue, NoopProgressListener,
    OperationOutcome, OperationRequest, OperationResult, Report, TaskClient, TaskError,
    TaskHandle, TaskService, TaskState, TaskStatus, UninstallOptions, UnitReport,
};

fn install_request(name: &str) -> OperationRequest {
    OperationRequest::Install {
        units: vec![ContentUnit::by_name("rpm", name)],
        options: InstallOptions::default(),
    }
}

fn registered_queue(consumer_id: &str) -> Arc<MemoryTaskQueue> {
    let queue = Arc::new(MemoryTaskQueue::new());
    queue.register(consumer_id);
    queue
}

/// Delegates to an inner service, counting fetch calls.
struct CountingService {
    inner: Arc<dyn TaskService>,
    fetches: AtomicUsize,
}

impl CountingService {
    fn new(inner: Arc<dyn TaskService>) -> Arc<Self> {
        Arc::new(Self {
            inner,
            fetches: AtomicUsize::new(0),
        })
    }

    fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TaskService for CountingService {
    async fn submit(
        &self,
        consumer_id: &str,
        request: OperationRequest,
    ) -> Result<TaskHandle, TaskError> {
        self.inner.submit(consumer_id, request).await
    }

    async fn fetch(&self, handle: &TaskHandle) -> Result<TaskStatus, TaskError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch(handle).await
    }
}

// Drives the head task for a consumer to the given terminal state, the
// way a coordinator worker would.
fn spawn_driver(
    queue: Arc<MemoryTaskQueue>,
    consumer_id: &'static str,
    finish: impl FnOnce(&MemoryTaskQueue, &TaskHandle) + Send + 'static,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let pending = queue.pending_tasks(consumer_id).unwrap();
            if let Some(handle) = pending.first() {
                queue.begin(handle.task_id()).unwrap();
                finish(&queue, handle);
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
}

#[tokio::test(start_paused = true)]
async fn execute_renders_a_successful_install() {
    let queue = registered_queue("web-01");
    let client = TaskClient::new(queue.clone(), &ClientConfig::default()).unwrap();

    let result: OperationResult = serde_json::from_value(json!({
        "status": true,
        "details": {"rpm": {"status": true, "details": {"installed": ["zsh"]}}},
    }))
    .unwrap();
    let driver = spawn_driver(queue.clone(), "web-01", move |queue, handle| {
        queue.succeed(handle.task_id(), result).unwrap();
    });

    let outcome = client
        .execute(
            "web-01",
            install_request("zsh"),
            &NoopProgressListener,
            &CancellationToken::new(),
        )
        .await
        .unwrap();
    driver.await.unwrap();

    match outcome {
        OperationOutcome::Completed(Report::Succeeded {
            all_succeeded,
            details,
        }) => {
            assert!(all_succeeded);
            assert_eq!(
                details["rpm"],
                UnitReport::Succeeded {
                    details: json!({"installed": ["zsh"]})
                }
            );
        }
        other => panic!("expected a success report, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn execute_renders_a_failed_task() {
    let queue = registered_queue("web-01");
    let client = TaskClient::new(queue.clone(), &ClientConfig::default()).unwrap();

    let driver = spawn_driver(queue.clone(), "web-01", |queue, handle| {
        queue.fail(handle.task_id(), "repo unreachable").unwrap();
    });

    let outcome = client
        .execute(
            "web-01",
            install_request("zsh"),
            &NoopProgressListener,
            &CancellationToken::new(),
        )
        .await
        .unwrap();
    driver.await.unwrap();

    assert_eq!(
        outcome,
        OperationOutcome::Completed(Report::Failed {
            exception: "repo unreachable".to_string(),
        })
    );
}

#[tokio::test(start_paused = true)]
async fn execute_renders_a_server_side_cancellation() {
    let queue = registered_queue("web-01");
    let client = TaskClient::new(queue.clone(), &ClientConfig::default()).unwrap();

    let driver = spawn_driver(queue.clone(), "web-01", |queue, handle| {
        queue.cancel(handle.task_id()).unwrap();
    });

    let outcome = client
        .execute(
            "web-01",
            OperationRequest::Uninstall {
                units: vec![ContentUnit::by_name("rpm", "emacs")],
                options: UninstallOptions::default(),
            },
            &NoopProgressListener,
            &CancellationToken::new(),
        )
        .await
        .unwrap();
    driver.await.unwrap();

    assert_eq!(outcome, OperationOutcome::Completed(Report::Cancelled));
}

#[tokio::test]
async fn postponed_submissions_short_circuit_without_polling() {
    let queue = registered_queue("web-01");
    // An earlier pending request occupies the admission slot.
    queue.submit("web-01", install_request("zsh")).await.unwrap();

    let counting = CountingService::new(queue.clone());
    let client = TaskClient::new(counting.clone(), &ClientConfig::default()).unwrap();

    let outcome = client
        .execute(
            "web-01",
            install_request("vim"),
            &NoopProgressListener,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    match outcome {
        OperationOutcome::Postponed(status) => {
            assert_eq!(status.state, TaskState::Postponed);
        }
        other => panic!("expected a postponed outcome, got {other:?}"),
    }
    // Only the initial classification fetch; the poller never ran.
    assert_eq!(counting.fetches(), 1);
}

#[tokio::test]
async fn rejected_submissions_short_circuit_without_polling() {
    let queue = registered_queue("web-01");
    queue.schedule_unregister("web-01").unwrap();

    let counting = CountingService::new(queue.clone());
    let client = TaskClient::new(counting.clone(), &ClientConfig::default()).unwrap();

    let outcome = client
        .execute(
            "web-01",
            install_request("zsh"),
            &NoopProgressListener,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    match outcome {
        OperationOutcome::Rejected(status) => {
            assert_eq!(status.state, TaskState::Rejected);
        }
        other => panic!("expected a rejected outcome, got {other:?}"),
    }
    assert_eq!(counting.fetches(), 1);
}

#[tokio::test]
async fn unknown_consumer_fails_before_any_handle_exists() {
    let queue = Arc::new(MemoryTaskQueue::new());
    let counting = CountingService::new(queue.clone());
    let client = TaskClient::new(counting.clone(), &ClientConfig::default()).unwrap();

    let err = client
        .execute(
            "ghost",
            install_request("zsh"),
            &NoopProgressListener,
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    assert_eq!(
        err,
        TaskError::ConsumerNotFound {
            consumer_id: "ghost".to_string(),
        }
    );
    assert_eq!(counting.fetches(), 0);
    assert!(queue.is_empty());
}

#[tokio::test]
async fn interrupting_observation_leaves_the_task_running() {
    let queue = registered_queue("web-01");
    let config = ClientConfig::from_toml_str("[output]\npoll_frequency_in_seconds = 30.0\n").unwrap();
    let client = TaskClient::new(queue.clone(), &config).unwrap();

    let cancel = CancellationToken::new();
    let observation = {
        let client = client.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            client
                .execute(
                    "web-01",
                    install_request("zsh"),
                    &NoopProgressListener,
                    &cancel,
                )
                .await
        })
    };

    tokio::time::sleep(Duration::from_millis(100)).await;
    cancel.cancel();
    let outcome = observation.await.unwrap().unwrap();
    assert_eq!(outcome, OperationOutcome::Interrupted);

    // Cancelling the observation never touches the server-side task.
    let pending = queue.pending_tasks("web-01").unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(
        queue.fetch(&pending[0]).await.unwrap().state,
        TaskState::Waiting
    );
}

#[tokio::test]
async fn snapshots_are_idempotent_between_state_changes() {
    let queue = registered_queue("web-01");
    let handle = queue.submit("web-01", install_request("zsh")).await.unwrap();

    let (first, second) =
        futures::future::join(queue.fetch(&handle), queue.fetch(&handle)).await;
    assert_eq!(first.unwrap(), second.unwrap());

    queue.begin(handle.task_id()).unwrap();
    let after = queue.fetch(&handle).await.unwrap();
    assert_eq!(after.state, TaskState::Running);
    assert_eq!(after, queue.fetch(&handle).await.unwrap());
}
