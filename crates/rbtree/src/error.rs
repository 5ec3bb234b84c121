use thiserror::Error;

/// Errors reported by the fallible [`RbTree`](crate::RbTree) operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum Error {
    /// The handle does not refer to a live node of this tree.
    #[error("handle does not refer to a live node of this tree")]
    InvalidHandle,
    /// The operation requires a non-empty tree.
    #[error("tree is empty")]
    EmptyTree,
    /// The output buffer cannot hold every key in the tree.
    #[error("buffer holds {capacity} keys but {required} are required")]
    CapacityExceeded { capacity: usize, required: usize },
}
