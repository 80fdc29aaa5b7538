//! Progress events emitted while polling a task.
//!
//! The polling loop is separated from presentation: it emits ticks
//! through a [`ProgressListener`] instead of drawing a spinner itself.
//! A tick is emitted once per poll while the task is not yet terminal,
//! with a distinguished event while the task is still waiting to begin.

use async_trait::async_trait;

/// Sink for poll-driven progress events.
///
/// Implementations typically advance a spinner or emit log lines. One
/// event is delivered per non-terminal poll; no event is delivered for
/// the terminal fetch.
#[async_trait]
pub trait ProgressListener: Send + Sync {
    /// The task is admitted but has not started; a presentation layer
    /// would show a "waiting to begin" message.
    async fn waiting(&self);

    /// The task is in progress; the indicator advances without a message.
    async fn advancing(&self);
}

/// A listener that drops all progress events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgressListener;

#[async_trait]
impl ProgressListener for NoopProgressListener {
    async fn waiting(&self) {}

    async fn advancing(&self) {}
}

/// A listener that emits progress events as `tracing` debug lines.
///
/// Useful when a task is driven from a context with no interactive
/// terminal, such as a scheduled job.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgressListener;

#[async_trait]
impl ProgressListener for TracingProgressListener {
    async fn waiting(&self) {
        tracing::debug!("waiting for task to begin");
    }

    async fn advancing(&self) {
        tracing::debug!("task in progress");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_listener_accepts_events() {
        let listener = NoopProgressListener;
        listener.waiting().await;
        listener.advancing().await;
    }
}
