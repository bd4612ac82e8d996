//! Linear-scan priority queue used as a correctness baseline for the
//! benchmark harness: `find_min`/`delete_min` scan every live entry, and
//! `meld` is rejected outright, exactly as the reference `JustListPrioQueue`
//! throws `"Not supported yet."` rather than pretending to support it.

use crate::arena::{Forest, Loc};
use crate::entry::{next_heap_id, Entry};
use crate::error::HeapError;
use crate::heap::PriorityQueue;

struct Node<P, V> {
    value: V,
    prio: P,
}

pub struct ListQueue<P, V> {
    heap_id: u64,
    nodes: Forest<Node<P, V>>,
    order: Vec<Loc>,
}

impl<P: Ord, V> Default for ListQueue<P, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Ord, V> ListQueue<P, V> {
    pub fn new() -> Self {
        ListQueue {
            heap_id: next_heap_id(),
            nodes: Forest::new(),
            order: Vec::new(),
        }
    }

    fn check_entry(&self, entry: &Entry) -> Result<(), HeapError> {
        if entry.heap_id != self.heap_id || !self.nodes.contains(entry.loc) {
            Err(HeapError::WrongHeap)
        } else {
            Ok(())
        }
    }

    fn find_min_index(&self) -> Option<usize> {
        self.order
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| self.nodes[**a].prio.cmp(&self.nodes[**b].prio))
            .map(|(i, _)| i)
    }
}

impl<P: Ord, V> PriorityQueue<P, V> for ListQueue<P, V> {
    fn insert(&mut self, value: V, prio: P) -> Entry {
        let loc = self.nodes.insert(Node { value, prio });
        self.order.push(loc);
        Entry::new(self.heap_id, loc)
    }

    fn find_min(&self) -> Result<&V, HeapError> {
        let idx = self.find_min_index().ok_or(HeapError::Empty)?;
        Ok(&self.nodes[self.order[idx]].value)
    }

    fn delete_min(&mut self) -> Result<V, HeapError> {
        let idx = self.find_min_index().ok_or(HeapError::Empty)?;
        let loc = self.order.swap_remove(idx);
        Ok(self.nodes.remove(loc).value)
    }

    fn decrease_key(&mut self, entry: &Entry, new_prio: P) -> Result<(), HeapError> {
        self.check_entry(entry)?;
        if new_prio > self.nodes[entry.loc].prio {
            return Err(HeapError::KeyNotDecreased);
        }
        self.nodes[entry.loc].prio = new_prio;
        Ok(())
    }

    fn meld(self, _other: Self) -> Result<Self, HeapError> {
        Err(HeapError::NotSupported)
    }

    fn size(&self) -> usize {
        self.order.len()
    }

    fn clear(&mut self) {
        self.nodes.clear();
        self.order.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s1_insert_then_drain() {
        let mut h = ListQueue::new();
        for v in [5, 3, 8, 1, 6, 2, 4] {
            h.insert(v, v);
        }
        let mut out = Vec::new();
        while !h.is_empty() {
            out.push(h.delete_min().unwrap());
        }
        assert_eq!(out, vec![1, 2, 3, 4, 5, 6, 8]);
    }

    #[test]
    fn s2_decrease_key() {
        let mut h = ListQueue::new();
        let entries: Vec<_> = [10, 20, 30].into_iter().map(|p| h.insert(p, p)).collect();
        h.decrease_key(&entries[2], 1).unwrap();
        assert_eq!(h.delete_min().unwrap(), 30);
    }

    #[test]
    fn s3_empty_errors() {
        let mut h: ListQueue<i32, i32> = ListQueue::new();
        assert_eq!(h.find_min().unwrap_err(), HeapError::Empty);
    }

    #[test]
    fn meld_is_not_supported() {
        let mut a = ListQueue::new();
        a.insert(1, 1);
        let b: ListQueue<i32, i32> = ListQueue::new();
        assert_eq!(a.meld(b).unwrap_err(), HeapError::NotSupported);
    }

    #[test]
    fn wrong_heap_is_rejected() {
        let mut a = ListQueue::new();
        let e = a.insert(1, 1);
        let mut b: ListQueue<i32, i32> = ListQueue::new();
        b.insert(2, 2);
        assert_eq!(b.decrease_key(&e, 0).unwrap_err(), HeapError::WrongHeap);
    }
}
