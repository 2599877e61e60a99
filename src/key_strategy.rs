//! Key materialization: how a table turns a borrowed key into the copy it
//! owns, and how it gives that copy back.
//!
//! Every stored key goes through exactly one `materialize` and, when the
//! entry is updated, removed, cleared or dropped with the table, exactly
//! one `release`. The table never keeps a reference to the caller's key.

use core::borrow::Borrow;
use core::marker::PhantomData;

/// Strategy for producing and disposing of table-owned key copies.
pub trait KeyStrategy<K: ?Sized> {
    /// The owned copy stored in an entry.
    type Owned: Borrow<K>;

    /// Produces an owned copy of `key`, or `None` if one cannot be made.
    fn materialize(&self, key: &K) -> Option<Self::Owned>;

    /// Disposes of a copy previously produced by `materialize`.
    fn release(&self, owned: Self::Owned);
}

/// Materializes through `ToOwned`; release is a plain drop.
#[derive(Copy, Clone, Debug, Default)]
pub struct Cloned;

impl<K: ?Sized + ToOwned> KeyStrategy<K> for Cloned {
    type Owned = K::Owned;

    #[inline]
    fn materialize(&self, key: &K) -> Option<K::Owned> {
        Some(key.to_owned())
    }

    #[inline]
    fn release(&self, owned: K::Owned) {
        drop(owned);
    }
}

/// Caller-supplied duplicate and release hooks.
///
/// `dup` returning `None` makes the calling table operation fail with
/// [`TableError::KeyMaterialization`](crate::TableError::KeyMaterialization).
pub struct DupRelease<O, D, R> {
    dup: D,
    release: R,
    _owned: PhantomData<fn() -> O>,
}

impl<O, D, R> DupRelease<O, D, R>
where
    R: Fn(O),
{
    pub fn new(dup: D, release: R) -> Self {
        Self {
            dup,
            release,
            _owned: PhantomData,
        }
    }
}

impl<O, D, R> core::fmt::Debug for DupRelease<O, D, R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("DupRelease")
    }
}

impl<K, O, D, R> KeyStrategy<K> for DupRelease<O, D, R>
where
    K: ?Sized,
    O: Borrow<K>,
    D: Fn(&K) -> Option<O>,
    R: Fn(O),
{
    type Owned = O;

    #[inline]
    fn materialize(&self, key: &K) -> Option<O> {
        (self.dup)(key)
    }

    #[inline]
    fn release(&self, owned: O) {
        (self.release)(owned)
    }
}

/// Fixed-layout keys copied byte for byte.
///
/// `size_of` reports how many leading bytes of the caller's buffer make up
/// the key; only that prefix is copied. A size of zero, or one larger than
/// the buffer, cannot be materialized.
#[derive(Clone, Debug)]
pub struct ByteCopy<F> {
    size_of: F,
}

impl<F> ByteCopy<F>
where
    F: Fn(&[u8]) -> usize,
{
    pub fn new(size_of: F) -> Self {
        Self { size_of }
    }
}

impl<F> KeyStrategy<[u8]> for ByteCopy<F>
where
    F: Fn(&[u8]) -> usize,
{
    type Owned = Box<[u8]>;

    fn materialize(&self, key: &[u8]) -> Option<Box<[u8]>> {
        let n = (self.size_of)(key);
        if n == 0 {
            return None;
        }
        key.get(..n).map(Box::from)
    }

    #[inline]
    fn release(&self, owned: Box<[u8]>) {
        drop(owned);
    }
}
