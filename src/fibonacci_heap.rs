//! Lazy Fibonacci heap: O(1) amortized `insert`/`decrease_key`/`meld`,
//! O(log n) amortized `delete_min`.
//!
//! Roots live in a circular doubly-linked list reachable from `min`. A
//! `decrease_key` that breaks heap order cuts the node free into the root
//! list and, if its parent was already marked, cuts the parent too
//! (cascading cut). `delete_min` consolidates the root list by repeatedly
//! linking same-rank trees until every surviving root has a distinct rank —
//! the consolidation table is keyed by each root's actual `rank` field, not
//! by how many children it happens to have at the moment, since a node can
//! carry a rank higher than its current child count after a cut.

use crate::arena::{Forest, Loc};
use crate::entry::{next_heap_id, Entry};
use crate::error::HeapError;
use crate::heap::PriorityQueue;

struct Node<P, V> {
    value: Option<V>,
    prio: P,
    rank: usize,
    marked: bool,
    parent: Option<Loc>,
    prev: Loc,
    next: Loc,
    child: Option<Loc>,
}

pub struct FibonacciHeap<P, V> {
    heap_id: u64,
    nodes: Forest<Node<P, V>>,
    min: Option<Loc>,
    size: usize,
}

impl<P: Ord, V> Default for FibonacciHeap<P, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Ord, V> FibonacciHeap<P, V> {
    pub fn new() -> Self {
        FibonacciHeap {
            heap_id: next_heap_id(),
            nodes: Forest::new(),
            min: None,
            size: 0,
        }
    }

    fn check_entry(&self, entry: &Entry) -> Result<(), HeapError> {
        if entry.heap_id != self.heap_id || !self.nodes.contains(entry.loc) {
            Err(HeapError::WrongHeap)
        } else {
            Ok(())
        }
    }

    /// Splices `node` out of whatever circular list it currently sits in.
    /// The node's own `prev`/`next` are left dangling (pointing at itself is
    /// the caller's job if it is about to be reinserted solo).
    fn unlink(&mut self, node: Loc) {
        let prev = self.nodes[node].prev;
        let next = self.nodes[node].next;
        self.nodes[prev].next = next;
        self.nodes[next].prev = prev;
    }

    /// Inserts `node` (already isolated, `prev == next == node`) into the
    /// circular list just before `anchor`.
    fn splice_into(&mut self, anchor: Loc, node: Loc) {
        let prev = self.nodes[anchor].prev;
        self.nodes[prev].next = node;
        self.nodes[node].prev = prev;
        self.nodes[node].next = anchor;
        self.nodes[anchor].prev = node;
    }

    fn add_root(&mut self, node: Loc) {
        self.nodes[node].prev = node;
        self.nodes[node].next = node;
        self.nodes[node].parent = None;
        match self.min {
            None => self.min = Some(node),
            Some(m) => {
                self.splice_into(m, node);
                if self.nodes[node].prio < self.nodes[m].prio {
                    self.min = Some(node);
                }
            }
        }
    }

    fn add_child(&mut self, parent: Loc, child: Loc) {
        self.nodes[child].parent = Some(parent);
        self.nodes[child].marked = false;
        match self.nodes[parent].child {
            None => {
                self.nodes[child].prev = child;
                self.nodes[child].next = child;
                self.nodes[parent].child = Some(child);
            }
            Some(c) => {
                self.nodes[child].prev = child;
                self.nodes[child].next = child;
                self.splice_into(c, child);
            }
        }
        self.nodes[parent].rank += 1;
    }

    /// Links two equal-rank trees, the smaller root absorbs the other.
    fn link(&mut self, a: Loc, b: Loc) -> Loc {
        let (winner, loser) = if self.nodes[a].prio < self.nodes[b].prio {
            (a, b)
        } else {
            (b, a)
        };
        self.unlink(loser);
        self.add_child(winner, loser);
        winner
    }

    fn consolidate(&mut self) {
        let Some(start) = self.min else { return };
        log::trace!("consolidating fibonacci heap root list, size={}", self.size);

        let mut roots = Vec::with_capacity(self.size.max(1));
        let mut cur = start;
        loop {
            let next = self.nodes[cur].next;
            roots.push(cur);
            if next == start {
                break;
            }
            cur = next;
        }

        let max_rank = (usize::BITS - (self.size.max(1) as u32).leading_zeros()) as usize + 2;
        let mut by_rank: Vec<Option<Loc>> = vec![None; max_rank];

        for root in roots {
            let mut cur = root;
            loop {
                let rank = self.nodes[cur].rank;
                if rank >= by_rank.len() {
                    by_rank.resize(rank + 1, None);
                }
                match by_rank[rank] {
                    None => {
                        by_rank[rank] = Some(cur);
                        break;
                    }
                    Some(other) => {
                        by_rank[rank] = None;
                        cur = self.link(cur, other);
                    }
                }
            }
        }

        self.min = None;
        for slot in by_rank.into_iter().flatten() {
            self.nodes[slot].prev = slot;
            self.nodes[slot].next = slot;
            self.add_root(slot);
        }
    }

    fn cut(&mut self, node: Loc, parent: Loc) {
        self.unlink(node);
        self.nodes[parent].rank -= 1;
        if self.nodes[parent].child == Some(node) {
            let sibling = self.nodes[node].next;
            self.nodes[parent].child = if sibling == node { None } else { Some(sibling) };
        }
        self.add_root(node);
    }

    fn cascading_cut(&mut self, node: Loc) {
        let mut cur = node;
        while let Some(parent) = self.nodes[cur].parent {
            if !self.nodes[parent].marked {
                self.nodes[parent].marked = true;
                return;
            }
            self.cut(cur, parent);
            cur = parent;
        }
    }
}

impl<P: Ord, V> PriorityQueue<P, V> for FibonacciHeap<P, V> {
    fn insert(&mut self, value: V, prio: P) -> Entry {
        let loc = self.nodes.insert(Node {
            value: Some(value),
            prio,
            rank: 0,
            marked: false,
            parent: None,
            prev: Loc { arena: 0, key: 0 },
            next: Loc { arena: 0, key: 0 },
            child: None,
        });
        self.nodes[loc].prev = loc;
        self.nodes[loc].next = loc;
        self.add_root(loc);
        self.size += 1;
        Entry::new(self.heap_id, loc)
    }

    fn find_min(&self) -> Result<&V, HeapError> {
        let m = self.min.ok_or(HeapError::Empty)?;
        Ok(self.nodes[m].value.as_ref().unwrap())
    }

    fn delete_min(&mut self) -> Result<V, HeapError> {
        let m = self.min.ok_or(HeapError::Empty)?;

        if let Some(child) = self.nodes[m].child {
            let mut cur = child;
            loop {
                self.nodes[cur].parent = None;
                cur = self.nodes[cur].next;
                if cur == child {
                    break;
                }
            }
            // Splice the child list in as siblings of `m`, right before
            // removing `m` from the same list.
            let m_next = self.nodes[m].next;
            let child_prev = self.nodes[child].prev;
            self.nodes[m].next = child;
            self.nodes[child].prev = m;
            self.nodes[child_prev].next = m_next;
            self.nodes[m_next].prev = child_prev;
        }

        let next_root = self.nodes[m].next;
        let was_alone = next_root == m;
        self.unlink(m);
        let mut node = self.nodes.remove(m);
        self.size -= 1;

        if was_alone {
            self.min = None;
        } else {
            self.min = Some(next_root);
            self.consolidate();
        }

        Ok(node.value.take().unwrap())
    }

    fn decrease_key(&mut self, entry: &Entry, new_prio: P) -> Result<(), HeapError> {
        self.check_entry(entry)?;
        let node = entry.loc;
        if new_prio > self.nodes[node].prio {
            return Err(HeapError::KeyNotDecreased);
        }
        self.nodes[node].prio = new_prio;

        if let Some(parent) = self.nodes[node].parent {
            if self.nodes[node].prio < self.nodes[parent].prio {
                log::debug!("decrease_key violated parent, cutting node to root list");
                self.cut(node, parent);
                self.cascading_cut(parent);
            }
        }

        if let Some(m) = self.min {
            if self.nodes[node].prio < self.nodes[m].prio {
                self.min = Some(node);
            }
        }
        Ok(())
    }

    fn meld(mut self, mut other: Self) -> Result<Self, HeapError> {
        log::trace!("melding fibonacci heaps of size {} and {}", self.size, other.size);
        self.nodes.absorb(other.nodes);
        self.size += other.size;

        match (self.min, other.min) {
            (None, _) => self.min = other.min,
            (Some(_), None) => {}
            (Some(a), Some(b)) => {
                let a_prev = self.nodes[a].prev;
                let b_prev = self.nodes[b].prev;
                self.nodes[a_prev].next = b;
                self.nodes[b].prev = a_prev;
                self.nodes[b_prev].next = a;
                self.nodes[a].prev = b_prev;
                if self.nodes[b].prio < self.nodes[a].prio {
                    self.min = Some(b);
                }
            }
        }
        other.min = None;
        other.size = 0;
        Ok(self)
    }

    fn size(&self) -> usize {
        self.size
    }

    fn clear(&mut self) {
        self.nodes.clear();
        self.min = None;
        self.size = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain_all(mut h: FibonacciHeap<i32, i32>) -> Vec<i32> {
        let mut out = Vec::new();
        while !h.is_empty() {
            out.push(h.delete_min().unwrap());
        }
        out
    }

    #[test]
    fn s1_insert_then_drain() {
        let mut h = FibonacciHeap::new();
        for v in [5, 3, 8, 1, 6, 2, 4] {
            h.insert(v, v);
        }
        assert_eq!(drain_all(h), vec![1, 2, 3, 4, 5, 6, 8]);
    }

    #[test]
    fn s2_decrease_key() {
        let mut h = FibonacciHeap::new();
        let entries: Vec<_> = [10, 20, 30, 40, 50].into_iter().map(|p| h.insert(p, p)).collect();
        h.decrease_key(&entries[4], 5).unwrap();
        h.decrease_key(&entries[2], 15).unwrap();
        assert_eq!(drain_all(h), vec![5, 10, 15, 20, 40]);
    }

    #[test]
    fn s3_empty_errors() {
        let mut h: FibonacciHeap<i32, i32> = FibonacciHeap::new();
        assert_eq!(h.find_min().unwrap_err(), HeapError::Empty);
        h.insert(7, 7);
        assert_eq!(*h.find_min().unwrap(), 7);
        assert_eq!(h.delete_min().unwrap(), 7);
        assert_eq!(h.find_min().unwrap_err(), HeapError::Empty);
    }

    #[test]
    fn s4_meld() {
        let mut a = FibonacciHeap::new();
        for v in [2, 9, 4] {
            a.insert(v, v);
        }
        let mut b = FibonacciHeap::new();
        for v in [1, 7, 3] {
            b.insert(v, v);
        }
        let c = a.meld(b).unwrap();
        assert_eq!(drain_all(c), vec![1, 2, 3, 4, 7, 9]);
    }

    #[test]
    fn cascading_cut_after_repeated_decrease() {
        let mut h = FibonacciHeap::new();
        let entries: Vec<_> = (0..16).map(|v| h.insert(v, v)).collect();
        // force linking by draining enough to trigger a consolidation pass
        h.insert(100, 100);
        assert_eq!(h.delete_min().unwrap(), 0);
        for e in entries.iter().skip(1) {
            h.decrease_key(e, -1).ok();
        }
        let mut out = Vec::new();
        while !h.is_empty() {
            out.push(h.delete_min().unwrap());
        }
        let mut sorted = out.clone();
        sorted.sort();
        assert_eq!(out, sorted);
    }

    #[test]
    fn wrong_heap_is_rejected() {
        let mut a = FibonacciHeap::new();
        let e = a.insert(1, 1);
        let mut b: FibonacciHeap<i32, i32> = FibonacciHeap::new();
        b.insert(2, 2);
        assert_eq!(b.decrease_key(&e, 0).unwrap_err(), HeapError::WrongHeap);
    }

    #[test]
    fn large_drain_is_sorted() {
        let mut h = FibonacciHeap::new();
        let input = [17, 3, 44, 9, 21, 0, 12, 6, 38, 5, 2, 19, 1, 27, 14, 50, 33];
        for v in input {
            h.insert(v, v);
        }
        let out = drain_all(h);
        let mut expected = input.to_vec();
        expected.sort();
        assert_eq!(out, expected);
    }

    proptest::proptest! {
        #[test]
        fn drain_is_always_sorted(mut priorities in proptest::collection::vec(-1000i32..1000, 0..200)) {
            let mut h = FibonacciHeap::new();
            for p in priorities.drain(..) {
                h.insert(p, p);
            }
            let mut out = Vec::new();
            while !h.is_empty() {
                out.push(h.delete_min().unwrap());
            }
            let mut sorted = out.clone();
            sorted.sort();
            proptest::prop_assert_eq!(out, sorted);
        }
    }
}
