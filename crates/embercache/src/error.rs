//! Error types for embercache

use std::fmt;

/// Result type alias for embercache operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for cache operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Cache constructed with capacity zero
    ZeroCapacity,

    /// Cache is still shared by other handles
    Shared,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ZeroCapacity => write!(f, "capacity must be at least 1"),
            Error::Shared => write!(f, "cache is still shared by other handles"),
        }
    }
}

impl std::error::Error for Error {}
