//! Error type for queue operations

use thiserror::Error;

/// Errors returned by the fallible queue operations.
///
/// Most operations follow a boolean or no-op contract for bad input (see the
/// individual methods); only insertion and multi-queue merging report errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueueError {
    /// The element or its string buffer could not be allocated
    #[error("allocation failed, queue left unchanged")]
    AllocFailed,
    /// The queue handle was freed or belongs to another storage
    #[error("queue handle is no longer valid")]
    UnknownQueue,
    /// The same queue appears in more than one merge context
    #[error("queue is referenced by more than one merge context")]
    DuplicateQueue,
}
