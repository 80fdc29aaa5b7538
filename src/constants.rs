//! Protocol defaults shared between the client configuration and the poller.

/// Default polling frequency in seconds used when the client configuration
/// does not provide `poll_frequency_in_seconds`.
pub const DEFAULT_POLL_FREQUENCY_IN_SECONDS: f64 = 1.0;

/// Default number of additional fetch attempts the poller makes when a
/// status fetch fails with a transient service error.
pub const DEFAULT_FETCH_RETRY_ATTEMPTS: u32 = 3;
