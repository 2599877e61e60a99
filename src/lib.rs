//! chain-hashmap: a single-threaded separate-chaining hash table whose
//! hashing, equality and key ownership are all supplied by the caller.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: one table engine that works with any hash function, any
//!   equality relation and any way of owning keys, with the chain
//!   bookkeeping kept in safe Rust.
//! - Layers:
//!   - BucketStore<O, V>: the bucket-head array plus a `SlotMap` arena of
//!     chain nodes linked by arena keys. Computes bucket indices, walks
//!     chains, splices nodes in and out, relocates nodes on rehash.
//!   - ChainTable<K, V, H, E, M>: the public engine. Runs the hooks,
//!     keeps the collision counter and implements get/put/remove/clear,
//!     rehash and growth, stats and text export on top of the store.
//!
//! Constraints
//! - Single-threaded: tables are `!Send`/`!Sync` (no locks, no atomics).
//! - Keys are always materialized copies owned by the table; every copy
//!   is released exactly once through the configured `KeyStrategy`.
//! - Values are moved in and handed back by `put`/`remove`; the table
//!   never clones or inspects them.
//! - Capacity is fixed by default; see `GrowthPolicy`.
//!
//! Chain positions
//! - A position in a chain is a `Link` (bucket head or a node's `next`).
//!   `find_slot` returns the link holding the match, so removal splices
//!   through it without a second walk and without interior pointers.
//!
//! Collision accounting
//! - `collisions()` counts inserts that landed in an occupied chain and
//!   is decremented (floored at zero) on every removal. It is a coarse
//!   diagnostic; `chain_stats()` walks the chains for exact numbers.
//! - `rehash` resets the counter and rebuilds it while relinking nodes.
//!
//! Hooks and rehashing
//! - Each node stores the hash computed at insert time; rehash relinks
//!   nodes by that hash and never calls user code. It moves every node,
//!   or none when the new bucket array cannot be allocated.
//! - Hooks must not re-enter the table they are called from; debug builds
//!   panic if they do.
//!
//! Notes and non-goals
//! - No iteration-order guarantee; `iter()` and the text export walk
//!   buckets in index order, chains head first.
//! - Hash quality is the caller's concern.

mod buckets;
pub mod chain_table;
mod chain_table_proptest;
pub mod config;
pub mod error;
pub mod export;
pub mod hooks;
pub mod key_strategy;
mod reentrancy;
pub mod stats;

// Public surface
pub use chain_table::{ChainTable, Iter};
pub use config::{GrowthPolicy, TableConfig};
pub use error::{Result, TableError};
pub use hooks::{Hashed, KeyEq, KeyHash, NativeEq};
pub use key_strategy::{ByteCopy, Cloned, DupRelease, KeyStrategy};
pub use stats::ChainStats;
