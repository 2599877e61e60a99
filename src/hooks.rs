//! Hash and equality hooks.
//!
//! A table is parameterized over one value of each trait. Plain closures
//! and `fn` items implement both through blanket impls, so
//! `|k: &str| my_hash(k)` works as a hash hook; [`Hashed`] and
//! [`NativeEq`] adapt the standard `Hash`/`PartialEq` machinery.
//!
//! The table assumes the usual contract: keys that compare equal hash
//! equally. Breaking it does not cause memory unsafety, but lookups may
//! miss entries.

use core::hash::{BuildHasher, Hash};
use hashbrown::hash_map::DefaultHashBuilder;

/// Computes the hash of a key.
pub trait KeyHash<K: ?Sized> {
    fn hash_key(&self, key: &K) -> u64;
}

/// Decides whether two keys denote the same entry.
pub trait KeyEq<K: ?Sized> {
    fn eq_keys(&self, a: &K, b: &K) -> bool;
}

impl<K: ?Sized, F> KeyHash<K> for F
where
    F: Fn(&K) -> u64,
{
    #[inline]
    fn hash_key(&self, key: &K) -> u64 {
        self(key)
    }
}

impl<K: ?Sized, F> KeyEq<K> for F
where
    F: Fn(&K, &K) -> bool,
{
    #[inline]
    fn eq_keys(&self, a: &K, b: &K) -> bool {
        self(a, b)
    }
}

/// Hashes keys through a `BuildHasher`.
///
/// The default builder is seeded per instance, so two tables built with
/// `Hashed::default()` generally place the same key in different buckets.
#[derive(Clone, Debug, Default)]
pub struct Hashed<S = DefaultHashBuilder>(pub S);

impl<K, S> KeyHash<K> for Hashed<S>
where
    K: ?Sized + Hash,
    S: BuildHasher,
{
    #[inline]
    fn hash_key(&self, key: &K) -> u64 {
        self.0.hash_one(key)
    }
}

/// Compares keys with `PartialEq`.
#[derive(Copy, Clone, Debug, Default)]
pub struct NativeEq;

impl<K: ?Sized + PartialEq> KeyEq<K> for NativeEq {
    #[inline]
    fn eq_keys(&self, a: &K, b: &K) -> bool {
        a == b
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::BuildHasherDefault;
    use test_log::test;

    fn len_hash(k: &str) -> u64 {
        k.len() as u64
    }

    /// Invariant: closures and fn items are usable as hooks directly.
    #[test]
    fn closures_and_fns_are_hooks() {
        let by_len = len_hash;
        assert_eq!(KeyHash::<str>::hash_key(&by_len, "abc"), 3);

        let ci = |a: &str, b: &str| a.eq_ignore_ascii_case(b);
        assert!(ci.eq_keys("Key", "kEY"));
        assert!(!ci.eq_keys("Key", "Kez"));
    }

    /// Invariant: `Hashed` agrees with the builder's own `hash_one`.
    #[test]
    fn hashed_matches_builder() {
        let b = BuildHasherDefault::<DefaultHasher>::default();
        let h = Hashed(b.clone());
        assert_eq!(KeyHash::<str>::hash_key(&h, "k1"), b.hash_one("k1"));
        assert_eq!(
            KeyHash::<[u8]>::hash_key(&h, b"k1".as_slice()),
            b.hash_one(b"k1".as_slice())
        );
    }

    /// Invariant: a given `Hashed` instance is deterministic.
    #[test]
    fn default_hashed_is_stable_per_instance() {
        let h: Hashed = Hashed::default();
        assert_eq!(
            KeyHash::<str>::hash_key(&h, "same"),
            KeyHash::<str>::hash_key(&h, "same")
        );
    }

    #[test]
    fn native_eq_is_partial_eq() {
        assert!(KeyEq::<str>::eq_keys(&NativeEq, "a", "a"));
        assert!(!KeyEq::<[u8]>::eq_keys(&NativeEq, b"a", b"b"));
    }
}
