//! In-process task queue.
//!
//! [`MemoryTaskQueue`] implements the [`TaskService`](crate::service::TaskService)
//! contract with the coordinator's per-consumer admission semantics:
//! first-come ordering, postponement behind earlier requests, and
//! rejection once a consumer's removal is pending. Used for tests,
//! demos, and embedded deployments that do not talk to a remote
//! coordinator.

pub mod memory;

pub use memory::MemoryTaskQueue;
