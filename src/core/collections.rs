//! Collection aliases for label-keyed workloads.
//!
//! Hash maps here never see attacker-controlled keys, so the non-DoS-hardened
//! `FxHasher` is the right trade: labels hash in a handful of cycles.

#![forbid(unsafe_code)]

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

/// Hash map for trusted internal keys (labels, file indices).
pub type FastHashMap<K, V> = FxHashMap<K, V>;

/// Hash set for trusted internal keys.
pub type FastHashSet<T> = FxHashSet<T>;

/// Small-capacity vector that stays on the stack for ≤ `N` elements.
///
/// Sized per use case: 3 for per-triangle neighbor and link triples, 8 for
/// typical vertex link fans.
pub type SmallBuffer<T, const N: usize> = SmallVec<[T; N]>;
