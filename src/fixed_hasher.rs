//! Deterministic hashing for the builder's lookup tables.
//!
//! Hull construction must give identical results for identical input, so the
//! connector table and the singular vertex set never use a randomly seeded hasher.

use core::hash::BuildHasher;

use foldhash::fast::{FixedState, FoldHasher};

/// Hashes with a constant [`FixedState`], so table layouts repeat between runs.
#[derive(Copy, Clone, Default, Debug)]
pub struct FixedHasher;

impl FixedHasher {
    const STATE: FixedState = FixedState::with_seed(0x68b1_c52e_9374_ad16);
}

impl BuildHasher for FixedHasher {
    type Hasher = FoldHasher<'static>;

    #[inline]
    fn build_hasher(&self) -> Self::Hasher {
        Self::STATE.build_hasher()
    }
}

/// A [`hashbrown::HashMap`] using the [`FixedHasher`].
pub type FixedHashMap<K, V> = hashbrown::HashMap<K, V, FixedHasher>;

/// A [`hashbrown::HashSet`] using the [`FixedHasher`].
pub type FixedHashSet<T> = hashbrown::HashSet<T, FixedHasher>;
