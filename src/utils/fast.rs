// src/utils/fast.rs

//! Fast hash tables: `hashbrown` with `AHash`, plus small inline vectors.
//!
//! ```ignore
//! use crate::utils::fast::*;
//!
//! let mut m: FastMap<&str, i32> = fast_map();
//! m.insert("a", 1);
//! let s: FastSet<String> = fast_set();
//! ```

pub use ahash::RandomState as AHashBuilder;
pub use smallvec::SmallVec;

/// hashbrown + AHash
pub type FastMap<K, V> = hashbrown::HashMap<K, V, AHashBuilder>;
/// hashbrown + AHash
pub type FastSet<K> = hashbrown::HashSet<K, AHashBuilder>;

#[inline]
pub fn fast_map<K, V>() -> FastMap<K, V> {
    FastMap::with_hasher(AHashBuilder::default())
}

#[inline]
pub fn fast_set<K>() -> FastSet<K> {
    FastSet::with_hasher(AHashBuilder::default())
}

#[inline]
pub fn fast_map_with_cap<K, V>(cap: usize) -> FastMap<K, V> {
    FastMap::with_capacity_and_hasher(cap, AHashBuilder::default())
}

/// Template parameter lists rarely exceed four entries
pub type SmallVec4<T> = SmallVec<[T; 4]>;
