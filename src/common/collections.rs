//! Crate-wide collection aliases. Hash maps default to the Fx hasher; keys
//! are small ids, not attacker-controlled input.

pub type HashMap<K, V> = rustc_hash::FxHashMap<K, V>;
pub type HashSet<T> = rustc_hash::FxHashSet<T>;

pub use std::collections::hash_map;
pub use std::collections::{BTreeMap, BTreeSet};
