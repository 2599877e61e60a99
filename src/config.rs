//! Construction-time configuration: initial bucket count and growth policy.

use crate::error::{Result, TableError};

/// When, if ever, a table resizes itself.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum GrowthPolicy {
    /// Capacity only changes through an explicit `rehash`.
    #[default]
    Fixed,

    /// After an insert, if `len / capacity > max`, rehash to
    /// `capacity * factor` buckets.
    LoadFactor {
        /// Load-factor threshold, must be finite and positive
        max: f64,
        /// Capacity multiplier, must be at least 2
        factor: usize,
    },
}

impl GrowthPolicy {
    /// Load-factor growth doubling the bucket array.
    pub fn load_factor(max: f64) -> Self {
        Self::LoadFactor { max, factor: 2 }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        match *self {
            Self::Fixed => Ok(()),
            Self::LoadFactor { max, factor } => {
                if !max.is_finite() || max <= 0.0 {
                    return Err(TableError::InvalidLoadFactor(max));
                }
                if factor < 2 {
                    return Err(TableError::InvalidGrowthFactor(factor));
                }
                Ok(())
            }
        }
    }

    /// Returns the capacity to grow to, if `len` entries over `capacity`
    /// buckets exceed the threshold.
    pub(crate) fn grow_to(&self, len: usize, capacity: usize) -> Option<usize> {
        match *self {
            Self::Fixed => None,
            Self::LoadFactor { max, factor } => {
                if (len as f64) / (capacity as f64) > max {
                    Some(capacity.saturating_mul(factor))
                } else {
                    None
                }
            }
        }
    }
}

/// Table configuration
#[derive(Clone, Debug, PartialEq)]
pub struct TableConfig {
    /// Number of buckets allocated at construction
    pub capacity: usize,

    /// Growth policy, see [`GrowthPolicy`]
    pub growth: GrowthPolicy,
}

impl TableConfig {
    /// Fixed-capacity configuration with `capacity` buckets.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            growth: GrowthPolicy::Fixed,
        }
    }

    /// Sets the growth policy.
    #[must_use]
    pub fn growth(mut self, growth: GrowthPolicy) -> Self {
        self.growth = growth;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(TableError::ZeroCapacity);
        }
        self.growth.validate()
    }
}
