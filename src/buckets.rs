//! BucketStore: the bucket-head array and the arena of chain nodes.
//!
//! Chains are singly linked through `NodeKey`s into a `SlotMap` arena
//! rather than through owning pointers. A position inside a chain is a
//! [`Link`]: either a bucket head or the `next` field of a node. Lookup,
//! insert and remove all start from [`BucketStore::find_slot`], which
//! returns the link that holds the match (or the terminal empty link), so
//! callers can splice through it without re-walking the chain.
//!
//! This module never calls user code: matching is delegated to the
//! predicate passed to `find_slot`, and relocation uses the hash stored
//! in each node.

use crate::error::{Result, TableError};
use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Arena key of a chain node.
    pub(crate) struct NodeKey;
}

#[derive(Debug)]
pub(crate) struct Node<O, V> {
    pub(crate) key: O,
    pub(crate) value: V,
    pub(crate) hash: u64,
    next: Option<NodeKey>,
}

/// A link cell: the place a chain pointer lives.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum Link {
    Head(usize),
    Next(NodeKey),
}

/// Result of a chain walk: the link holding `node`, or the terminal empty
/// link of the chain when `node` is `None`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct Slot {
    pub(crate) link: Link,
    pub(crate) node: Option<NodeKey>,
}

pub(crate) struct BucketStore<O, V> {
    heads: Vec<Option<NodeKey>>,
    nodes: SlotMap<NodeKey, Node<O, V>>,
}

fn alloc_heads(capacity: usize) -> Result<Vec<Option<NodeKey>>> {
    if capacity == 0 {
        return Err(TableError::ZeroCapacity);
    }
    let mut heads = Vec::new();
    heads.try_reserve_exact(capacity)?;
    heads.resize(capacity, None);
    Ok(heads)
}

impl<O, V> BucketStore<O, V> {
    pub(crate) fn with_capacity(capacity: usize) -> Result<Self> {
        Ok(Self {
            heads: alloc_heads(capacity)?,
            nodes: SlotMap::with_key(),
        })
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.heads.len()
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub(crate) fn index_of(&self, hash: u64) -> usize {
        (hash % self.heads.len() as u64) as usize
    }

    /// Walks chain `index` until `matches` accepts a node.
    pub(crate) fn find_slot<F>(&self, index: usize, mut matches: F) -> Slot
    where
        F: FnMut(&Node<O, V>) -> bool,
    {
        let mut link = Link::Head(index);
        let mut cur = self.heads[index];
        while let Some(k) = cur {
            let node = &self.nodes[k];
            if matches(node) {
                return Slot {
                    link,
                    node: Some(k),
                };
            }
            link = Link::Next(k);
            cur = node.next;
        }
        Slot { link, node: None }
    }

    #[inline]
    pub(crate) fn node(&self, k: NodeKey) -> &Node<O, V> {
        &self.nodes[k]
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, k: NodeKey) -> &mut Node<O, V> {
        &mut self.nodes[k]
    }

    /// Reserves arena room for one more node so the following
    /// `push_front` does not allocate.
    pub(crate) fn reserve_node(&mut self) -> Result<()> {
        self.nodes.try_reserve(1)?;
        Ok(())
    }

    /// Links a new node at the head of chain `index`. Returns whether the
    /// chain already held an entry.
    pub(crate) fn push_front(&mut self, index: usize, key: O, value: V, hash: u64) -> bool {
        let next = self.heads[index];
        let k = self.nodes.insert(Node {
            key,
            value,
            hash,
            next,
        });
        self.heads[index] = Some(k);
        next.is_some()
    }

    /// Splices `k` out through `link`, which must be the link holding it.
    pub(crate) fn unlink(&mut self, link: Link, k: NodeKey) -> Option<Node<O, V>> {
        let node = self.nodes.remove(k)?;
        match link {
            Link::Head(i) => {
                debug_assert_eq!(self.heads[i], Some(k));
                self.heads[i] = node.next;
            }
            Link::Next(prev) => {
                let prev = &mut self.nodes[prev];
                debug_assert_eq!(prev.next, Some(k));
                prev.next = node.next;
            }
        }
        Some(node)
    }

    /// Empties every chain, keeping the bucket array. Nodes are yielded so
    /// the caller can release their keys.
    pub(crate) fn drain(&mut self) -> impl Iterator<Item = Node<O, V>> + '_ {
        self.heads.fill(None);
        self.nodes.drain().map(|(_, n)| n)
    }

    /// Moves every node into a fresh array of `capacity` buckets, visiting
    /// the old array in index then chain order and linking each node at the
    /// head of its new chain. Returns how many nodes landed in an already
    /// occupied chain. On allocation failure nothing is moved.
    pub(crate) fn relocate(&mut self, capacity: usize) -> Result<usize> {
        let mut heads = alloc_heads(capacity)?;
        let mut collisions = 0;
        for head in std::mem::take(&mut self.heads) {
            let mut cur = head;
            while let Some(k) = cur {
                let node = &mut self.nodes[k];
                cur = node.next;
                let index = (node.hash % capacity as u64) as usize;
                node.next = heads[index];
                if node.next.is_some() {
                    collisions += 1;
                }
                heads[index] = Some(k);
            }
        }
        self.heads = heads;
        Ok(collisions)
    }

    /// Nodes in bucket index then chain order.
    pub(crate) fn iter(&self) -> Entries<'_, O, V> {
        Entries {
            store: self,
            bucket: 0,
            cur: None,
        }
    }

    /// Length of every chain, by bucket index.
    pub(crate) fn chain_lengths(&self) -> impl Iterator<Item = usize> + '_ {
        self.heads.iter().map(move |&head| {
            let mut n = 0;
            let mut cur = head;
            while let Some(k) = cur {
                n += 1;
                cur = self.nodes[k].next;
            }
            n
        })
    }
}

/// Iterator over nodes in bucket index then chain order.
pub(crate) struct Entries<'a, O, V> {
    store: &'a BucketStore<O, V>,
    bucket: usize,
    cur: Option<NodeKey>,
}

impl<'a, O, V> Iterator for Entries<'a, O, V> {
    type Item = &'a Node<O, V>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(k) = self.cur {
                let node = &self.store.nodes[k];
                self.cur = node.next;
                return Some(node);
            }
            if self.bucket >= self.store.heads.len() {
                return None;
            }
            self.cur = self.store.heads[self.bucket];
            self.bucket += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn keys_in_chain(s: &BucketStore<&'static str, i32>, index: usize) -> Vec<&'static str> {
        let mut out = Vec::new();
        let mut cur = s.heads[index];
        while let Some(k) = cur {
            out.push(s.nodes[k].key);
            cur = s.nodes[k].next;
        }
        out
    }

    /// Invariant: a zero-slot array is never allocated.
    #[test]
    fn zero_capacity_rejected() {
        assert!(matches!(
            BucketStore::<u8, u8>::with_capacity(0),
            Err(TableError::ZeroCapacity)
        ));
    }

    /// Invariant: an unreservable array surfaces as `Alloc` instead of aborting.
    #[test]
    fn huge_capacity_fails_with_alloc() {
        assert!(matches!(
            BucketStore::<u8, u8>::with_capacity(usize::MAX),
            Err(TableError::Alloc(_))
        ));
    }

    /// Invariant: `index_of` is the hash modulo capacity.
    #[test]
    fn index_is_hash_mod_capacity() {
        let s = BucketStore::<u8, u8>::with_capacity(7).unwrap();
        assert_eq!(s.index_of(0), 0);
        assert_eq!(s.index_of(13), 6);
        assert_eq!(s.index_of(u64::MAX), (u64::MAX % 7) as usize);
    }

    /// Invariant: reserving room for a node links nothing and leaves
    /// every chain as it was.
    #[test]
    fn reserve_node_keeps_contents() {
        let mut s = BucketStore::with_capacity(2).unwrap();
        s.push_front(0, "a", 1, 0);
        for _ in 0..3 {
            s.reserve_node().unwrap();
        }
        assert_eq!(s.len(), 1);
        assert_eq!(keys_in_chain(&s, 0), ["a"]);
        assert!(keys_in_chain(&s, 1).is_empty());
        assert!(!s.push_front(1, "b", 2, 1));
        assert_eq!(s.len(), 2);
    }

    /// Invariant: new nodes go to the head of their chain, and
    /// `push_front` reports whether the chain was occupied.
    #[test]
    fn push_front_orders_most_recent_first() {
        let mut s = BucketStore::with_capacity(4).unwrap();
        assert!(!s.push_front(1, "a", 1, 1));
        assert!(s.push_front(1, "b", 2, 5));
        assert!(s.push_front(1, "c", 3, 9));
        assert!(!s.push_front(2, "d", 4, 2));
        assert_eq!(keys_in_chain(&s, 1), ["c", "b", "a"]);
        assert_eq!(s.len(), 4);
    }

    /// Invariant: `find_slot` returns the link that points at the match,
    /// or the terminal empty link when nothing matches.
    #[test]
    fn find_slot_returns_link_positions() {
        let mut s = BucketStore::with_capacity(2).unwrap();
        s.push_front(0, "a", 1, 0);
        s.push_front(0, "b", 2, 0);

        let head = s.find_slot(0, |n| n.key == "b");
        assert_eq!(head.link, Link::Head(0));
        let b = head.node.unwrap();

        let inner = s.find_slot(0, |n| n.key == "a");
        assert_eq!(inner.link, Link::Next(b));

        let miss = s.find_slot(0, |n| n.key == "z");
        assert!(miss.node.is_none());
        assert!(matches!(miss.link, Link::Next(_)));

        let empty = s.find_slot(1, |_| true);
        assert_eq!(
            empty,
            Slot {
                link: Link::Head(1),
                node: None
            }
        );
    }

    /// Invariant: unlinking through the returned link splices the chain,
    /// whether the node is the head, in the middle, or the tail.
    #[test]
    fn unlink_head_middle_tail() {
        let mut s = BucketStore::with_capacity(1).unwrap();
        for (i, k) in ["a", "b", "c", "d"].into_iter().enumerate() {
            s.push_front(0, k, i as i32, 0);
        }
        assert_eq!(keys_in_chain(&s, 0), ["d", "c", "b", "a"]);

        for (victim, rest) in [
            ("b", vec!["d", "c", "a"]),
            ("d", vec!["c", "a"]),
            ("a", vec!["c"]),
            ("c", vec![]),
        ] {
            let slot = s.find_slot(0, |n| n.key == victim);
            let node = s.unlink(slot.link, slot.node.unwrap()).unwrap();
            assert_eq!(node.key, victim);
            assert_eq!(keys_in_chain(&s, 0), rest);
        }
        assert_eq!(s.len(), 0);
    }

    /// Invariant: relocation keeps every node and counts landings into
    /// occupied chains.
    #[test]
    fn relocate_rebuilds_chains() {
        let mut s = BucketStore::with_capacity(1).unwrap();
        for h in 0..6u64 {
            s.push_front(0, "k", h as i32, h);
        }
        let collisions = s.relocate(3).unwrap();
        assert_eq!(s.capacity(), 3);
        assert_eq!(s.len(), 6);
        // two per chain: one landing into an occupied chain per bucket
        assert_eq!(collisions, 3);
        assert_eq!(s.chain_lengths().collect::<Vec<_>>(), [2, 2, 2]);
        for node in s.iter() {
            let slot = s.find_slot(s.index_of(node.hash), |n| n.hash == node.hash);
            assert!(slot.node.is_some());
        }
    }

    /// Invariant: a failed relocation leaves the store untouched.
    #[test]
    fn failed_relocate_is_noop() {
        let mut s = BucketStore::with_capacity(2).unwrap();
        s.push_front(0, "a", 1, 0);
        assert!(s.relocate(0).is_err());
        assert!(s.relocate(usize::MAX).is_err());
        assert_eq!(s.capacity(), 2);
        assert_eq!(keys_in_chain(&s, 0), ["a"]);
    }

    /// Invariant: iteration visits buckets in index order, chains head first.
    #[test]
    fn iter_is_index_then_chain_order() {
        let mut s = BucketStore::with_capacity(3).unwrap();
        s.push_front(2, "x", 0, 2);
        s.push_front(0, "a", 0, 0);
        s.push_front(0, "b", 0, 0);
        let order: Vec<_> = s.iter().map(|n| n.key).collect();
        assert_eq!(order, ["b", "a", "x"]);
    }

    /// Invariant: draining empties every chain and keeps the capacity.
    #[test]
    fn drain_empties_chains() {
        let mut s = BucketStore::with_capacity(3).unwrap();
        s.push_front(0, "a", 1, 0);
        s.push_front(1, "b", 2, 1);
        let mut drained: Vec<_> = s.drain().map(|n| n.key).collect();
        drained.sort();
        assert_eq!(drained, ["a", "b"]);
        assert_eq!(s.len(), 0);
        assert_eq!(s.capacity(), 3);
        assert_eq!(s.iter().count(), 0);
    }
}
