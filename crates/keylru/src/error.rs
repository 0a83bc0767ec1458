//! Error types for keylru

use std::fmt;

/// Result type alias for keylru operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for cache construction and diagnostics
///
/// Lookups never fail: a missing key is reported as `None`, not as an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Capacity must be at least 1
    InvalidCapacity(usize),

    /// Index and recency list disagree (reported by `check_invariants`)
    Invariant(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidCapacity(cap) => {
                write!(f, "Invalid capacity: {} (must be at least 1)", cap)
            }
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
        assert_eq!(
            Error::InvalidCapacity(0).to_string(),
            "Invalid capacity: 0 (must be at least 1)"
        );
        assert!(Error::Invariant("tail has next".into())
            .to_string()
            .contains("tail has next"));
    }
}
