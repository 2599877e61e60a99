//! Error type shared by every fallible table operation.

use std::collections::TryReserveError;

/// Represents errors that can occur while building or mutating a table
#[derive(Debug)]
pub enum TableError {
    /// A bucket array of zero slots was requested
    ZeroCapacity,

    /// The load-factor threshold of a growth policy is not a positive number
    InvalidLoadFactor(f64),

    /// The growth factor of a growth policy is below 2
    InvalidGrowthFactor(usize),

    /// The bucket array could not be allocated
    Alloc(TryReserveError),

    /// The key strategy could not produce an owned copy of the key
    KeyMaterialization,
}

impl std::fmt::Display for TableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroCapacity => write!(f, "ChainTableError: capacity must be nonzero"),
            Self::InvalidLoadFactor(lf) => {
                write!(f, "ChainTableError: invalid load factor threshold {lf}")
            }
            Self::InvalidGrowthFactor(n) => {
                write!(f, "ChainTableError: growth factor {n} must be at least 2")
            }
            Self::Alloc(e) => write!(f, "ChainTableError: bucket allocation failed: {e}"),
            Self::KeyMaterialization => write!(f, "ChainTableError: key could not be materialized"),
        }
    }
}

impl std::error::Error for TableError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Alloc(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TryReserveError> for TableError {
    fn from(value: TryReserveError) -> Self {
        Self::Alloc(value)
    }
}

/// Table result
pub type Result<T> = std::result::Result<T, TableError>;
