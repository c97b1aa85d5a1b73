//! How a consumer suspends while its next dependency is unpublished

use std::time::Duration;

/// Poll interval used by the reference pipelines
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_micros(10);

/// Suspension mechanism for [`BroadcastQueue::receive_wait`](super::BroadcastQueue::receive_wait)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WaitStrategy {
    /// Re-check the log after sleeping for `interval`
    Poll {
        /// Sleep between checks
        interval: Duration,
    },
    /// Block on a condition variable that every publish notifies
    Park,
}

impl WaitStrategy {
    /// Poll with the given sleep interval
    pub const fn poll(interval: Duration) -> Self {
        Self::Poll { interval }
    }
}

impl Default for WaitStrategy {
    fn default() -> Self {
        Self::Poll {
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}
