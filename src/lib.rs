//! Task submission and polling protocol for the Pulp content platform.
//!
//! Long-running content operations against managed consumers (install,
//! update, uninstall of content units) run as server-side tasks. A
//! client submits a request, the coordinator may reject, postpone, or
//! admit it, and admitted tasks are observed by polling status
//! snapshots until a terminal state is reached.
//!
//! # Flow
//!
//! ```text
//! submit -> fetch initial status -> classify
//!   Rejected  -> report, no polling
//!   Postponed -> report, no polling (runs later, in submission order)
//!   Proceed   -> poll until terminal -> render report
//! ```
//!
//! # Module Organization
//!
//! - [`types`] - task identity, lifecycle states, status snapshots,
//!   content units, operation requests, result payloads.
//! - [`error`] - the [`TaskError`] enum.
//! - [`service`] - the [`TaskService`] submission/fetch contract.
//! - [`mod@classify`] - pre-poll fate decision for fresh submissions.
//! - [`poll`] - the interval polling loop with cooperative cancellation.
//! - [`progress`] - progress event sink driven by the poller.
//! - [`mod@render`] - terminal snapshots to structured [`Report`]s.
//! - [`client`] - [`TaskClient`], the whole flow as one call.
//! - [`queue`] - [`MemoryTaskQueue`], an in-process service with the
//!   coordinator's admission semantics.
//! - [`config`] - TOML-backed client configuration.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use pulp_tasks::{
//!     ClientConfig, ContentUnit, InstallOptions, MemoryTaskQueue,
//!     NoopProgressListener, OperationOutcome, OperationRequest,
//!     OperationResult, TaskClient,
//! };
//! use tokio_util::sync::CancellationToken;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let queue = Arc::new(MemoryTaskQueue::new());
//! queue.register("web-01");
//!
//! let client = TaskClient::new(queue.clone(), &ClientConfig::default()).unwrap();
//!
//! // Drive the task to completion as the server would.
//! let driver = {
//!     let queue = queue.clone();
//!     tokio::spawn(async move {
//!         loop {
//!             let pending = queue.pending_tasks("web-01").unwrap();
//!             if let Some(handle) = pending.first() {
//!                 queue.begin(handle.task_id()).unwrap();
//!                 queue
//!                     .succeed(handle.task_id(), OperationResult::empty_success())
//!                     .unwrap();
//!                 break;
//!             }
//!             tokio::time::sleep(std::time::Duration::from_millis(5)).await;
//!         }
//!     })
//! };
//!
//! let request = OperationRequest::Install {
//!     units: vec![ContentUnit::by_name("rpm", "zsh")],
//!     options: InstallOptions::default(),
//! };
//! let outcome = client
//!     .execute("web-01", request, &NoopProgressListener, &CancellationToken::new())
//!     .await
//!     .unwrap();
//! assert!(matches!(outcome, OperationOutcome::Completed(_)));
//! driver.await.unwrap();
//! # });
//! ```

pub mod classify;
pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod poll;
pub mod progress;
pub mod queue;
pub mod render;
pub mod service;
pub mod types;

// Re-exports for ergonomic access
pub use classify::{classify, RequestOutcome};
pub use client::{OperationOutcome, TaskClient};
pub use config::{ClientConfig, ConfigError, OutputConfig};
pub use constants::*;
pub use error::TaskError;
pub use poll::{PollOutcome, Poller};
pub use progress::{NoopProgressListener, ProgressListener, TracingProgressListener};
pub use queue::MemoryTaskQueue;
pub use render::{render, Report};
pub use service::TaskService;
pub use types::*;
