use thiserror::Error;

/// Failure modes shared by every priority-queue variant in this crate.
///
/// Every fallible operation returns `Result<T, HeapError>`; none of the
/// variants below are ever represented by a panic on a user-reachable path.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum HeapError {
    /// `find_min` / `delete_min` called on a heap with `size() == 0`.
    #[error("priority queue is empty")]
    Empty,

    /// `decrease_key` was given a priority strictly greater than the entry's
    /// current one.
    #[error("new key is not lower than or equal to the current key")]
    KeyNotDecreased,

    /// The `Entry` passed to `decrease_key` was not produced by this heap
    /// instance.
    #[error("entry does not belong to this heap")]
    WrongHeap,

    /// `meld` was called with a heap of a different concrete variant.
    #[error("queues must be of the same kind to be melded")]
    WrongKind,

    /// The operation is not offered by this particular variant.
    #[error("operation not supported by this priority queue variant")]
    NotSupported,
}
