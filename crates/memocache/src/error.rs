//! Error types for memocache

use std::fmt;

/// Result type alias for memocache operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for cache construction and internal bookkeeping
///
/// Only [`Error::ZeroCapacity`] is reachable through the public `Cache` and
/// `Memoizer` API. The remaining variants are raised by the building blocks
/// (`IndexMap`, the order trackers) and by `check_invariants`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Bounded cache requested with a capacity of zero
    ZeroCapacity,

    /// Eviction requested from an order tracker with no entries
    Empty,

    /// Index lookup or removal for a key that is not present
    KeyNotFound,

    /// Index and order tracker disagree
    Invariant(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ZeroCapacity => write!(f, "Capacity must be at least 1"),
            Error::Empty => write!(f, "Order tracker is empty"),
            Error::KeyNotFound => write!(f, "Key not found"),
            Error::Invariant(msg) => write!(f, "Invariant violated: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(Error::ZeroCapacity.to_string(), "Capacity must be at least 1");
        assert_eq!(
            Error::Invariant("size 4 > capacity 3".to_string()).to_string(),
            "Invariant violated: size 4 > capacity 3"
        );
    }
}
