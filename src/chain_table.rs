//! ChainTable: separate-chaining table engine over a `BucketStore`.

use crate::buckets::{BucketStore, Entries, Slot};
use crate::config::{GrowthPolicy, TableConfig};
use crate::error::{Result, TableError};
use crate::export;
use crate::hooks::{Hashed, KeyEq, KeyHash, NativeEq};
use crate::key_strategy::{Cloned, KeyStrategy};
use crate::reentrancy::DebugReentrancy;
use crate::stats::ChainStats;
use core::borrow::Borrow;
use core::fmt::{self, Write as _};
use core::hash::Hash;
use core::marker::PhantomData;

/// A map from keys to values with caller-chosen hashing, equality and key
/// ownership.
///
/// - `H` hashes keys, `E` compares them, `M` materializes and releases the
///   key copies the table owns (see [`KeyStrategy`]).
/// - Values are stored as given and handed back by `put`/`remove`; the
///   table never copies or inspects them.
/// - Capacity is fixed unless the table was configured with a
///   [`GrowthPolicy::LoadFactor`] or [`ChainTable::rehash`] is called.
///
/// Dropping the table (or calling [`ChainTable::delete`]) releases every
/// key through `M`.
pub struct ChainTable<K, V, H = Hashed, E = NativeEq, M = Cloned>
where
    K: ?Sized,
    M: KeyStrategy<K>,
{
    store: BucketStore<M::Owned, V>,
    collisions: usize,
    growth: GrowthPolicy,
    hash: H,
    equals: E,
    strategy: M,
    reentrancy: DebugReentrancy,
    _key: PhantomData<fn(&K)>,
}

impl<K, V> ChainTable<K, V>
where
    K: ?Sized + Hash + Eq + ToOwned,
{
    /// Table over `K: Hash + Eq` keys, cloned on insert, with a fixed
    /// number of buckets.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Self::new(capacity, Hashed::default(), NativeEq, Cloned)
    }
}

/// Iterator over `(key, value)` pairs in bucket index then chain order.
pub struct Iter<'a, K: ?Sized, O, V> {
    inner: Entries<'a, O, V>,
    _key: PhantomData<&'a K>,
}

impl<'a, K, O, V> Iterator for Iter<'a, K, O, V>
where
    K: ?Sized + 'a,
    O: Borrow<K>,
{
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let n = self.inner.next()?;
        let k: &K = n.key.borrow();
        Some((k, &n.value))
    }
}

impl<K, V, H, E, M> ChainTable<K, V, H, E, M>
where
    K: ?Sized,
    H: KeyHash<K>,
    E: KeyEq<K>,
    M: KeyStrategy<K>,
{
    /// Creates a fixed-capacity table. Fails on zero capacity or if the
    /// bucket array cannot be allocated.
    pub fn new(capacity: usize, hash: H, equals: E, strategy: M) -> Result<Self> {
        Self::with_config(TableConfig::new(capacity), hash, equals, strategy)
    }

    pub fn with_config(config: TableConfig, hash: H, equals: E, strategy: M) -> Result<Self> {
        config.validate()?;
        let store = BucketStore::with_capacity(config.capacity)?;
        log::debug!(
            "Created chain table with {} buckets, growth {:?}",
            config.capacity,
            config.growth
        );
        Ok(Self {
            store,
            collisions: 0,
            growth: config.growth,
            hash,
            equals,
            strategy,
            reentrancy: DebugReentrancy::new(),
            _key: PhantomData,
        })
    }

    /// Hashes `key` and walks its chain. Calls the hash hook once and the
    /// equality hook once per node visited.
    fn locate(&self, key: &K) -> (u64, usize, Slot) {
        let hash = self.hash.hash_key(key);
        let index = self.store.index_of(hash);
        let slot = self.store.find_slot(index, |node| {
            let stored: &K = node.key.borrow();
            self.equals.eq_keys(key, stored)
        });
        (hash, index, slot)
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        let _g = self.reentrancy.enter("get");
        let (_, _, slot) = self.locate(key);
        slot.node.map(|k| &self.store.node(k).value)
    }

    /// Returns the stored key copy along with the value.
    pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        let _g = self.reentrancy.enter("get_key_value");
        let (_, _, slot) = self.locate(key);
        let node = self.store.node(slot.node?);
        let k: &K = node.key.borrow();
        Some((k, &node.value))
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let _g = self.reentrancy.enter("get_mut");
        let (_, _, slot) = self.locate(key);
        slot.node.map(|k| &mut self.store.node_mut(k).value)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        let _g = self.reentrancy.enter("contains_key");
        self.locate(key).2.node.is_some()
    }

    /// Inserts or updates the entry for `key`, returning the previous value.
    ///
    /// The key is materialized on every call. On update the new copy
    /// replaces the stored one and the stored one is released. A new entry
    /// goes to the head of its chain and bumps `collisions()` if the chain
    /// was not empty. If the key cannot be materialized the table is left
    /// unchanged and `value` is dropped. The same holds when the node for a
    /// new entry cannot be allocated, after the fresh key copy is released.
    pub fn put(&mut self, key: &K, value: V) -> Result<Option<V>> {
        let _g = self.reentrancy.enter("put");
        let (hash, index, slot) = self.locate(key);
        let owned = self
            .strategy
            .materialize(key)
            .ok_or(TableError::KeyMaterialization)?;

        if let Some(k) = slot.node {
            let node = self.store.node_mut(k);
            let stale = core::mem::replace(&mut node.key, owned);
            let previous = core::mem::replace(&mut node.value, value);
            self.strategy.release(stale);
            return Ok(Some(previous));
        }

        if let Err(e) = self.store.reserve_node() {
            self.strategy.release(owned);
            return Err(e);
        }
        if self.store.push_front(index, owned, value, hash) {
            self.collisions += 1;
        }
        drop(_g);
        self.grow_if_needed();
        Ok(None)
    }

    /// Removes the entry for `key`, releasing its key copy and returning
    /// the value. Absent keys leave the table untouched.
    ///
    /// `collisions()` drops by one on every successful removal, floored at
    /// zero, whether or not the entry's chain was contended.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let _g = self.reentrancy.enter("remove");
        let (_, _, slot) = self.locate(key);
        let node = self.store.unlink(slot.link, slot.node?)?;
        self.collisions = self.collisions.saturating_sub(1);
        self.strategy.release(node.key);
        Some(node.value)
    }

    /// Removes every entry, releasing all key copies. Capacity is kept.
    pub fn clear(&mut self) {
        let _g = self.reentrancy.enter("clear");
        log::trace!("Clearing {} entries from chain table", self.store.len());
        for node in self.store.drain() {
            self.strategy.release(node.key);
        }
        self.collisions = 0;
    }

    /// Consumes the table, releasing every key copy.
    pub fn delete(self) {
        log::trace!("Deleting chain table with {} entries", self.store.len());
        drop(self);
    }

    /// Moves every entry into a new array of `new_capacity` buckets.
    ///
    /// Entries keep their key copies; no hook is called. `collisions()` is
    /// rebuilt from zero as entries are relinked, old chains visited in
    /// bucket index then chain order. On error the table is unchanged.
    pub fn rehash(&mut self, new_capacity: usize) -> Result<()> {
        let _g = self.reentrancy.enter("rehash");
        let old_capacity = self.store.capacity();
        self.collisions = self.store.relocate(new_capacity)?;
        log::debug!(
            "Rehashed {} entries from {old_capacity} to {new_capacity} buckets, {} collisions",
            self.store.len(),
            self.collisions
        );
        Ok(())
    }

    fn grow_if_needed(&mut self) {
        let Some(target) = self.growth.grow_to(self.store.len(), self.store.capacity()) else {
            return;
        };
        if let Err(e) = self.rehash(target) {
            log::warn!("Could not grow chain table to {target} buckets: {e}");
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.store.len() == 0
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.store.capacity()
    }

    /// Approximate collision counter, see [`ChainTable::put`] and
    /// [`ChainTable::remove`]. [`ChainTable::chain_stats`] gives exact figures.
    #[inline]
    pub fn collisions(&self) -> usize {
        self.collisions
    }

    pub fn chain_stats(&self) -> ChainStats {
        ChainStats::from_chain_lengths(self.store.capacity(), self.store.chain_lengths())
    }

    pub fn hasher(&self) -> &H {
        &self.hash
    }

    pub fn equality(&self) -> &E {
        &self.equals
    }

    pub fn strategy(&self) -> &M {
        &self.strategy
    }

    pub fn growth(&self) -> GrowthPolicy {
        self.growth
    }

    pub fn iter(&self) -> Iter<'_, K, M::Owned, V> {
        Iter {
            inner: self.store.iter(),
            _key: PhantomData,
        }
    }

    /// Writes `{ "key": value, ... }` to `sink`, escaping keys (see
    /// [`export`](crate::export)) and formatting values with `value`.
    pub fn export_text<W, F>(&self, sink: &mut W, value: F) -> fmt::Result
    where
        K: fmt::Display,
        W: fmt::Write,
        F: FnMut(&mut W, &V) -> fmt::Result,
    {
        export::write_entries(sink, self.iter(), value)
    }

    /// [`ChainTable::export_text`] into a `String`, values via `Display`.
    pub fn to_text(&self) -> String
    where
        K: fmt::Display,
        V: fmt::Display,
    {
        let mut out = String::new();
        // String sinks only fail if a Display impl does.
        let _ = self.export_text(&mut out, |w, v| write!(w, "{v}"));
        out
    }
}

impl<K, V, H, E, M> Drop for ChainTable<K, V, H, E, M>
where
    K: ?Sized,
    M: KeyStrategy<K>,
{
    fn drop(&mut self) {
        for node in self.store.drain() {
            self.strategy.release(node.key);
        }
    }
}
