//! The task service contract.
//!
//! Submission and status fetch are delegated to an external collaborator:
//! in production a network-bound API client, in tests and embedded use
//! the in-process [`MemoryTaskQueue`](crate::queue::MemoryTaskQueue).
//! The service exclusively owns all status records; callers only ever
//! hold snapshots obtained via [`fetch`](TaskService::fetch).

use async_trait::async_trait;

use crate::error::TaskError;
use crate::types::content::OperationRequest;
use crate::types::task::{TaskHandle, TaskStatus};

/// Submission and status-fetch interface to the task coordinator.
///
/// Used as `Arc<dyn TaskService>` by [`TaskClient`](crate::client::TaskClient)
/// and [`Poller`](crate::poll::Poller).
///
/// # Ordering
///
/// For a given consumer, the service admits and executes conflicting
/// operations in submission order; this is what justifies postponement
/// (a later request waits behind earlier ones) and rejection (a request
/// is refused outright when a conflicting terminal operation, such as an
/// unregister, is already pending). No ordering is guaranteed across
/// unrelated consumers.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; independent pollers may fetch
/// concurrently.
#[async_trait]
pub trait TaskService: Send + Sync {
    /// Submits a content operation against a consumer.
    ///
    /// On success the returned handle identifies the new task; fetch its
    /// status and [`classify`](crate::classify::classify) it before
    /// polling.
    ///
    /// # Errors
    ///
    /// - [`TaskError::ConsumerNotFound`] if the consumer does not exist.
    ///   No task handle is issued.
    /// - [`TaskError::ServiceUnavailable`] on transport failures.
    async fn submit(
        &self,
        consumer_id: &str,
        request: OperationRequest,
    ) -> Result<TaskHandle, TaskError>;

    /// Fetches the current status snapshot for a task.
    ///
    /// Snapshots are immutable copies; two fetches with no intervening
    /// server-side change return equal values.
    ///
    /// # Errors
    ///
    /// - [`TaskError::NotFound`] if no task with the given ID exists.
    /// - [`TaskError::ServiceUnavailable`] on transport failures
    ///   (recoverable; the poller retries these).
    async fn fetch(&self, handle: &TaskHandle) -> Result<TaskStatus, TaskError>;
}
