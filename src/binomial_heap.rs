//! Forest of binomial trees, melded via binary-counter link-merge.
//!
//! A node's priority/value do not live on the node itself: they live in a
//! separate `entries` arena, and a node merely points at whichever entry
//! currently occupies it. `decrease_key` walks the violated entry up the
//! parent chain by swapping which node each of the two entries points at
//! (`swap_entries`), exactly as the reference algorithm's
//! `BinomialTreeNode::swapEntries` does — this keeps the tree shape,
//! defined entirely by node order, untouched by a decrease-key.

use std::cmp::Ordering;

use crate::arena::{Forest, Loc};
use crate::entry::{next_heap_id, Entry};
use crate::error::HeapError;
use crate::heap::PriorityQueue;

struct EntryRec<P, V> {
    value: V,
    prio: P,
    node: Loc,
}

struct Node {
    order: usize,
    parent: Option<Loc>,
    next: Option<Loc>,
    child: Option<Loc>,
    entry: Loc,
}

pub struct BinomialHeap<P, V> {
    heap_id: u64,
    nodes: Forest<Node>,
    entries: Forest<EntryRec<P, V>>,
    roots: Vec<Option<Loc>>,
    size: usize,
}

impl<P: Ord, V> Default for BinomialHeap<P, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Ord, V> BinomialHeap<P, V> {
    pub fn new() -> Self {
        BinomialHeap {
            heap_id: next_heap_id(),
            nodes: Forest::new(),
            entries: Forest::new(),
            roots: vec![None; 4],
            size: 0,
        }
    }

    fn check_entry(&self, entry: &Entry) -> Result<(), HeapError> {
        if entry.heap_id != self.heap_id || !self.entries.contains(entry.loc) {
            Err(HeapError::WrongHeap)
        } else {
            Ok(())
        }
    }

    /// Total order on nodes via their current entry's priority, tie-broken
    /// by entry identity so equal priorities still compare strictly.
    fn node_less(&self, a: Loc, b: Loc) -> bool {
        self.entry_less(self.nodes[a].entry, self.nodes[b].entry)
    }

    fn entry_less(&self, a: Loc, b: Loc) -> bool {
        match self.entries[a].prio.cmp(&self.entries[b].prio) {
            Ordering::Less => true,
            Ordering::Greater => false,
            Ordering::Equal => (a.arena, a.key) < (b.arena, b.key),
        }
    }

    fn swap_entries(&mut self, a: Loc, b: Loc) {
        let ea = self.nodes[a].entry;
        let eb = self.nodes[b].entry;
        self.nodes[a].entry = eb;
        self.nodes[b].entry = ea;
        self.entries[eb].node = a;
        self.entries[ea].node = b;
    }

    fn add_child(&mut self, parent: Loc, child: Loc) {
        self.nodes[child].parent = Some(parent);
        match self.nodes[parent].child {
            None => {
                self.nodes[child].next = Some(child);
                self.nodes[parent].child = Some(child);
            }
            Some(c) => {
                let first = self.nodes[c].next.unwrap();
                self.nodes[c].next = Some(child);
                self.nodes[child].next = Some(first);
                self.nodes[parent].child = Some(child);
            }
        }
        self.nodes[parent].order += 1;
    }

    /// Links two same-order trees, the smaller root wins and adopts the
    /// other, its order rises by one.
    fn meld_trees(&mut self, a: Loc, b: Loc) -> Loc {
        if self.node_less(a, b) {
            self.add_child(a, b);
            a
        } else {
            self.add_child(b, a);
            b
        }
    }

    fn disconnect_children(&mut self, node: Loc) -> Option<Loc> {
        let child = self.nodes[node].child?;
        let head = self.nodes[child].next.unwrap();
        self.nodes[child].next = None;
        let mut it = Some(head);
        while let Some(cur) = it {
            self.nodes[cur].parent = None;
            it = self.nodes[cur].next;
        }
        self.nodes[node].child = None;
        self.nodes[node].order = 0;
        Some(head)
    }

    fn trees_needed(&self) -> usize {
        if self.size == 0 {
            0
        } else {
            (usize::BITS - self.size.leading_zeros()) as usize
        }
    }

    fn tree_count(&self) -> usize {
        let bound = self.trees_needed().min(self.roots.len());
        self.roots[..bound].iter().filter(|r| r.is_some()).count()
    }

    fn ensure_capacity(&mut self) {
        if self.trees_needed() >= self.roots.len() {
            self.roots.resize((self.size.max(2)) << 1, None);
        }
    }

    fn add_items(&mut self, items: Option<Loc>) {
        let mut item = items;
        while let Some(mut it) = item {
            let next_item = self.nodes[it].next;
            self.nodes[it].next = None;
            loop {
                let order = self.nodes[it].order;
                match self.roots[order] {
                    None => {
                        self.roots[order] = Some(it);
                        break;
                    }
                    Some(r) => {
                        self.roots[order] = None;
                        it = self.meld_trees(r, it);
                    }
                }
            }
            item = next_item;
        }
    }

    fn find_max_prio_root(&self) -> Option<Loc> {
        let bound = self.trees_needed().min(self.roots.len().saturating_sub(1));
        let mut max: Option<Loc> = None;
        for slot in &self.roots[..=bound] {
            if let Some(r) = *slot {
                max = Some(match max {
                    None => r,
                    Some(m) => if self.node_less(r, m) { r } else { m },
                });
            }
        }
        max
    }
}

impl<P: Ord, V> PriorityQueue<P, V> for BinomialHeap<P, V> {
    fn insert(&mut self, value: V, prio: P) -> Entry {
        let node_loc = self.nodes.insert(Node {
            order: 0,
            parent: None,
            next: None,
            child: None,
            entry: Loc { arena: 0, key: 0 },
        });
        let entry_loc = self.entries.insert(EntryRec { value, prio, node: node_loc });
        self.nodes[node_loc].entry = entry_loc;

        self.size += 1;
        self.ensure_capacity();
        self.add_items(Some(node_loc));

        Entry::new(self.heap_id, entry_loc)
    }

    fn find_min(&self) -> Result<&V, HeapError> {
        let root = self.find_max_prio_root().ok_or(HeapError::Empty)?;
        Ok(&self.entries[self.nodes[root].entry].value)
    }

    fn delete_min(&mut self) -> Result<V, HeapError> {
        let max = self.find_max_prio_root().ok_or(HeapError::Empty)?;
        let order = self.nodes[max].order;
        self.roots[order] = None;

        let children = self.disconnect_children(max);
        let node = self.nodes.remove(max);
        let entry = self.entries.remove(node.entry);

        self.add_items(children);
        self.size -= 1;
        Ok(entry.value)
    }

    fn decrease_key(&mut self, entry: &Entry, new_prio: P) -> Result<(), HeapError> {
        self.check_entry(entry)?;
        if new_prio > self.entries[entry.loc].prio {
            return Err(HeapError::KeyNotDecreased);
        }
        self.entries[entry.loc].prio = new_prio;

        let mut node = self.entries[entry.loc].node;
        while let Some(parent) = self.nodes[node].parent {
            if self.node_less(node, parent) {
                self.swap_entries(parent, node);
                node = parent;
            } else {
                break;
            }
        }
        Ok(())
    }

    fn meld(self, other: Self) -> Result<Self, HeapError> {
        let (mut to, mut from) = if self.tree_count() >= other.tree_count() {
            (self, other)
        } else {
            (other, self)
        };

        to.nodes.absorb(from.nodes);
        to.entries.absorb(from.entries);
        to.size += from.size;
        to.ensure_capacity();

        for root in from.roots.iter_mut() {
            if let Some(r) = root.take() {
                to.nodes[r].next = None;
                to.add_items(Some(r));
            }
        }

        Ok(to)
    }

    fn size(&self) -> usize {
        self.size
    }

    fn clear(&mut self) {
        self.nodes.clear();
        self.entries.clear();
        self.roots = vec![None; 4];
        self.size = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain_all(mut h: BinomialHeap<i32, i32>) -> Vec<i32> {
        let mut out = Vec::new();
        while !h.is_empty() {
            out.push(h.delete_min().unwrap());
        }
        out
    }

    #[test]
    fn s1_insert_then_drain() {
        let mut h = BinomialHeap::new();
        for v in [5, 3, 8, 1, 6, 2, 4] {
            h.insert(v, v);
        }
        assert_eq!(drain_all(h), vec![1, 2, 3, 4, 5, 6, 8]);
    }

    #[test]
    fn s2_decrease_key() {
        let mut h = BinomialHeap::new();
        let entries: Vec<_> = [10, 20, 30, 40, 50].into_iter().map(|p| h.insert(p, p)).collect();
        h.decrease_key(&entries[4], 5).unwrap();
        h.decrease_key(&entries[2], 15).unwrap();
        assert_eq!(drain_all(h), vec![5, 10, 15, 20, 40]);
    }

    #[test]
    fn s3_empty_errors() {
        let mut h: BinomialHeap<i32, i32> = BinomialHeap::new();
        assert_eq!(h.find_min().unwrap_err(), HeapError::Empty);
        h.insert(7, 7);
        assert_eq!(*h.find_min().unwrap(), 7);
        assert_eq!(h.delete_min().unwrap(), 7);
        assert_eq!(h.find_min().unwrap_err(), HeapError::Empty);
    }

    #[test]
    fn s4_meld() {
        let mut a = BinomialHeap::new();
        for v in [2, 9, 4] {
            a.insert(v, v);
        }
        let mut b = BinomialHeap::new();
        for v in [1, 7, 3] {
            b.insert(v, v);
        }
        let c = a.meld(b).unwrap();
        assert_eq!(drain_all(c), vec![1, 2, 3, 4, 7, 9]);
    }

    #[test]
    fn larger_drain_is_sorted() {
        let mut h = BinomialHeap::new();
        let input = [17, 3, 44, 9, 21, 0, 12, 6, 38, 5, 2, 19, 1, 27, 14];
        for v in input {
            h.insert(v, v);
        }
        let mut out = drain_all(h);
        let mut expected = input.to_vec();
        expected.sort();
        out.sort();
        assert_eq!(out, expected);

        let mut h2 = BinomialHeap::new();
        for v in input {
            h2.insert(v, v);
        }
        let drained = drain_all(h2);
        let mut sorted_check = drained.clone();
        sorted_check.sort();
        assert_eq!(drained, sorted_check);
    }

    #[test]
    fn wrong_heap_is_rejected() {
        let mut a = BinomialHeap::new();
        let e = a.insert(1, 1);
        let mut b: BinomialHeap<i32, i32> = BinomialHeap::new();
        b.insert(2, 2);
        assert_eq!(b.decrease_key(&e, 0).unwrap_err(), HeapError::WrongHeap);
    }

    proptest::proptest! {
        #[test]
        fn drain_is_always_sorted(mut priorities in proptest::collection::vec(-1000i32..1000, 0..200)) {
            let mut h = BinomialHeap::new();
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
