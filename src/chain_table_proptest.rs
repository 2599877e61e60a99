#![cfg(test)]

// Property tests for ChainTable kept inside the crate so the collision
// counter and key-release bookkeeping can be checked against an exact model.

use crate::chain_table::ChainTable;
use crate::key_strategy::DupRelease;
use proptest::prelude::*;
use std::cell::Cell;
use std::collections::{BTreeMap, HashMap, HashSet};

fn prefix_hash(k: &str) -> u64 {
    k.bytes()
        .take(3)
        .fold(13u64, |h, b| h.wrapping_mul(11).wrapping_add(b as u64))
}

fn const_hash(_: &str) -> u64 {
    0
}

fn str_eq(a: &str, b: &str) -> bool {
    a == b
}

// Pool-indexed operations: indices shrink to earlier keys, the pool and
// the op list shrink in length.
#[derive(Clone, Debug)]
enum Op {
    Put(usize, i32),
    Remove(usize),
    Get(usize),
    Clear,
    Rehash(usize),
    Stats,
}

fn arb_scenario() -> impl Strategy<Value = (usize, Vec<String>, Vec<Op>)> {
    (1usize..=8, proptest::collection::vec("[a-z]{0,5}", 1..=10)).prop_flat_map(
        |(capacity, pool)| {
            let idx = 0..pool.len();
            let op = prop_oneof![
                4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Put(i, v)),
                2 => idx.clone().prop_map(Op::Remove),
                2 => idx.clone().prop_map(Op::Get),
                1 => Just(Op::Clear),
                1 => (1usize..=16).prop_map(Op::Rehash),
                1 => Just(Op::Stats),
            ];
            proptest::collection::vec(op, 1..80)
                .prop_map(move |ops| (capacity, pool.clone(), ops))
        },
    )
}

fn run(
    hash: fn(&str) -> u64,
    capacity: usize,
    pool: &[String],
    ops: Vec<Op>,
) -> Result<(), TestCaseError> {
    let made = Cell::new(0usize);
    let released = Cell::new(0usize);
    let strategy = DupRelease::new(
        |k: &str| {
            made.set(made.get() + 1);
            Some(k.to_owned())
        },
        |_o: String| released.set(released.get() + 1),
    );
    let mut sut = ChainTable::<str, i32, _, _, _>::new(
        capacity,
        hash,
        str_eq as fn(&str, &str) -> bool,
        strategy,
    )
    .expect("nonzero capacity");

    let mut model: HashMap<String, i32> = HashMap::new();
    let mut cap = capacity;
    let mut collisions = 0usize;
    let bucket = |k: &str, cap: usize| (hash(k) % cap as u64) as usize;

    for op in ops {
        match op {
            Op::Put(i, v) => {
                let k = &pool[i];
                let occupied = model
                    .keys()
                    .any(|m| m != k && bucket(m.as_str(), cap) == bucket(k.as_str(), cap));
                let prev = sut.put(k, v).expect("materialization cannot fail");
                prop_assert_eq!(prev, model.insert(k.clone(), v));
                if prev.is_none() && occupied {
                    collisions += 1;
                }
            }
            Op::Remove(i) => {
                let k = &pool[i];
                let got = sut.remove(k);
                prop_assert_eq!(got, model.remove(k));
                if got.is_some() {
                    collisions = collisions.saturating_sub(1);
                }
            }
            Op::Get(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.get(k), model.get(k));
                prop_assert_eq!(sut.contains_key(k), model.contains_key(k));
            }
            Op::Clear => {
                sut.clear();
                model.clear();
                collisions = 0;
            }
            Op::Rehash(n) => {
                sut.rehash(n).expect("nonzero capacity");
                cap = n;
                let distinct: HashSet<usize> =
                    model.keys().map(|k| bucket(k.as_str(), cap)).collect();
                collisions = model.len() - distinct.len();
            }
            Op::Stats => {
                let s = sut.chain_stats();
                prop_assert_eq!(s.len, model.len());
                prop_assert_eq!(s.capacity, cap);
                prop_assert!(s.longest <= model.len());
            }
        }

        // Post-conditions after each op
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        prop_assert_eq!(sut.capacity(), cap);
        prop_assert_eq!(sut.collisions(), collisions);
        prop_assert_eq!(made.get() - released.get(), model.len());
        let seen: BTreeMap<&str, i32> = sut.iter().map(|(k, v)| (k, *v)).collect();
        let want: BTreeMap<&str, i32> = model.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        prop_assert_eq!(seen, want);
    }

    drop(sut);
    prop_assert_eq!(made.get(), released.get(), "every key copy released");
    Ok(())
}

// Property: state-machine equivalence against std::collections::HashMap.
// Invariants exercised across random operation sequences:
// - put/get/remove/contains_key parity with the model; update returns the old value.
// - `len` equals the number of keys `get` finds; `clear` empties, capacity stays.
// - `collisions()` follows the event-count rule exactly, including rehash rebuilds.
// - Live key copies equal `len`; all are released once the table drops.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((capacity, pool, ops) in arb_scenario()) {
        run(prefix_hash, capacity, &pool, ops)?;
    }
}

// Property: same invariants with every key in one chain, so every lookup
// walks the chain through the equality hook.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((capacity, pool, ops) in arb_scenario()) {
        run(const_hash, capacity, &pool, ops)?;
    }
}
