//! # Core Error Types

use thiserror::Error;

/// Errors raised by the core vocabulary types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Every `EventFeed` was dropped; no further events can arrive.
    #[error("event feed disconnected after {retained} retained events")]
    FeedDisconnected {
        /// Events still retained in the log.
        retained: usize,
    },

    /// A snapshot interval must be strictly positive.
    #[error("invalid snapshot interval: {0} ms")]
    InvalidSnapshotInterval(u64),
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
