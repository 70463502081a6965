//! Error types for deltalux-sync

use thiserror::Error;

/// Errors from the dispatcher plumbing
#[derive(Error, Debug)]
pub enum SyncError {
    /// The group's event channel is gone (worker shut down)
    #[error("group event channel has been closed")]
    ChannelClosed,
}

/// Result type for dispatcher operations
pub type Result<T> = std::result::Result<T, SyncError>;
