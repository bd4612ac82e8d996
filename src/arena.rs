//! A "forest" of [`slab::Slab`] arenas addressed by stable [`Loc`]s.
//!
//! The reference implementation keeps every node in one `Slab<TreeNode<T>>`
//! and indexes it with a plain `usize`. That is exactly right for a heap
//! that never needs to combine two separately-allocated arenas in O(1). The
//! strict Fibonacci heap and the Brodal queue both promise a worst-case
//! O(1) `meld`, which rules out copying every node from one heap's arena
//! into the other's — so `Forest` generalizes the teacher's single slab
//! into a small map of independently-addressable slabs ("shards"). Melding
//! two forests is just moving shard ownership (`HashMap::extend`), never
//! touching an individual node, and every [`Loc`] handed out before the
//! meld keeps pointing at the same storage afterward.
//!
//! Binomial and lazy Fibonacci heaps use `Forest` too even though their own
//! `meld` is allowed to cost more than O(1): it keeps `Entry` identity
//! stable across a meld for every variant uniformly, and it costs nothing
//! extra over a plain `Slab` when a heap never merges with another arena.

use std::collections::HashMap;
use std::ops::{Index, IndexMut};
use std::sync::atomic::{AtomicU64, Ordering};

use slab::Slab;

static NEXT_ARENA_ID: AtomicU64 = AtomicU64::new(1);

fn next_arena_id() -> u64 {
    NEXT_ARENA_ID.fetch_add(1, Ordering::Relaxed)
}

/// Stable coordinate of a value stored in a [`Forest`]: which shard, and
/// which key within that shard's `Slab`. Never reassigned, even across a
/// `meld` that absorbs the shard wholesale into another forest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct Loc {
    pub arena: u64,
    pub key: usize,
}

pub(crate) struct Forest<T> {
    primary: u64,
    shards: HashMap<u64, Slab<T>>,
}

impl<T> Forest<T> {
    pub fn new() -> Self {
        let primary = next_arena_id();
        let mut shards = HashMap::with_capacity(1);
        shards.insert(primary, Slab::new());
        Forest { primary, shards }
    }

    pub fn insert(&mut self, value: T) -> Loc {
        let key = self.shards.get_mut(&self.primary).unwrap().insert(value);
        Loc { arena: self.primary, key }
    }

    pub fn get(&self, loc: Loc) -> Option<&T> {
        self.shards.get(&loc.arena).and_then(|s| s.get(loc.key))
    }

    pub fn get_mut(&mut self, loc: Loc) -> Option<&mut T> {
        self.shards.get_mut(&loc.arena).and_then(|s| s.get_mut(loc.key))
    }

    pub fn contains(&self, loc: Loc) -> bool {
        self.shards.get(&loc.arena).map_or(false, |s| s.contains(loc.key))
    }

    pub fn remove(&mut self, loc: Loc) -> T {
        self.shards.get_mut(&loc.arena).expect("stale arena shard").remove(loc.key)
    }

    /// Moves every shard of `other` into `self` in time proportional to the
    /// number of shards (bounded by how many prior melds produced them),
    /// never to the number of nodes they hold.
    pub fn absorb(&mut self, other: Forest<T>) {
        self.shards.extend(other.shards);
    }

    /// Drops every shard, keeping only a fresh, empty primary one so the
    /// forest can keep being inserted into.
    pub fn clear(&mut self) {
        self.shards.clear();
        self.shards.insert(self.primary, Slab::new());
    }

    pub fn is_empty(&self) -> bool {
        self.shards.values().all(|s| s.is_empty())
    }
}

impl<T> Index<Loc> for Forest<T> {
    type Output = T;
    fn index(&self, loc: Loc) -> &T {
        self.get(loc).expect("dangling Loc")
    }
}

impl<T> IndexMut<Loc> for Forest<T> {
    fn index_mut(&mut self, loc: Loc) -> &mut T {
        self.get_mut(loc).expect("dangling Loc")
    }
}
