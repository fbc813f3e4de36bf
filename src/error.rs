//! Error types for rank trees.

use alloc::string::String;

use thiserror::Error;

/// Result type alias using the crate's [`Error`].
pub type Result<T> = core::result::Result<T, Error>;

/// Every failure a rank tree can report.
///
/// `NotFound` and `Duplicate` are only produced by the non-`try_` methods; the
/// `try_` counterparts report the same outcomes through `Option`/`bool`.
/// `ArithmeticOverflow` and `CapacityExhausted` are always detected before the
/// tree is touched, so a failed call leaves the collection unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The key or rank is not present.
    #[error("key not found")]
    NotFound,

    /// An add-only insertion found the key already present.
    #[error("key already present")]
    Duplicate,

    /// A length, count or rank argument is out of its permitted domain.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// A fixed-capacity node store has no free node left.
    #[error("node capacity exhausted ({capacity} nodes)")]
    CapacityExhausted {
        /// The capacity that was exceeded.
        capacity: usize,
    },

    /// A position, count or extent would leave the representable range.
    #[error("rank arithmetic overflow")]
    ArithmeticOverflow,

    /// A fast cursor was advanced after the tree was structurally modified.
    #[error("collection was modified; enumeration cannot continue")]
    ConcurrentModification,

    /// Reported only by the diagnostic validator.
    #[error("tree invariant violated: {0}")]
    InvariantViolation(String),
}

impl Error {
    /// Create an invariant violation error
    pub(crate) fn invariant(msg: impl Into<String>) -> Self {
        Error::InvariantViolation(msg.into())
    }
}
