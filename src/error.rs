use thiserror::Error;

/// Failures raised by the fallible container operations.
///
/// Every failure is reported synchronously at the point of violation and no
/// operation leaves a container partially mutated: the search phase completes
/// before any structural edit begins.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// The container has no elements to read or remove.
    #[error("container is empty")]
    EmptyContainer,

    /// A positional argument lies outside `[0, len)`, or a range has
    /// `start > end`.
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// Malformed serialized text or an unrecognized traversal selector.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, Error>;
