//! Exact chain statistics.
//!
//! `ChainTable::collisions()` is an event counter: it goes up once per
//! insert into an occupied chain and down once per removal (floored at
//! zero), so after removals it drifts from the real structure. The numbers
//! here come from walking every chain and are always exact. Without
//! removals since the last `clear`, `overflow` equals `collisions()`.

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct ChainStats {
    /// Number of buckets
    pub capacity: usize,
    /// Number of entries
    pub len: usize,
    /// Buckets with at least one entry
    pub occupied: usize,
    /// Buckets with more than one entry
    pub contended: usize,
    /// Length of the longest chain
    pub longest: usize,
    /// Entries that are not the head of their chain
    pub overflow: usize,
}

impl ChainStats {
    pub(crate) fn from_chain_lengths<I>(capacity: usize, lengths: I) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        let mut stats = Self {
            capacity,
            ..Self::default()
        };
        for n in lengths {
            stats.len += n;
            if n > 0 {
                stats.occupied += 1;
                stats.overflow += n - 1;
            }
            if n > 1 {
                stats.contended += 1;
            }
            stats.longest = stats.longest.max(n);
        }
        stats
    }

    /// Entries per bucket.
    pub fn load_factor(&self) -> f64 {
        if self.capacity == 0 {
            return 0.0;
        }
        self.len as f64 / self.capacity as f64
    }
}
