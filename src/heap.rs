use crate::entry::Entry;
use crate::error::HeapError;

/// The uniform contract shared by every addressable meldable priority queue
/// in this crate.
///
/// `P` is the priority type (a strict weak order under `Ord`); `V` is the
/// element carried alongside it. All operations below are the only ones a
/// collaborator such as a Dijkstra driver needs: `insert`, `decrease_key`,
/// `delete_min`, `is_empty`.
pub trait PriorityQueue<P: Ord, V> {
    /// Inserts `value` with priority `prio` and returns a handle that can
    /// later be passed to [`decrease_key`](PriorityQueue::decrease_key).
    fn insert(&mut self, value: V, prio: P) -> Entry;

    /// Reference to the element with the lowest priority.
    ///
    /// Fails with [`HeapError::Empty`] if the heap has no elements.
    fn find_min(&self) -> Result<&V, HeapError>;

    /// Removes and returns the element with the lowest priority.
    ///
    /// Fails with [`HeapError::Empty`] if the heap has no elements.
    fn delete_min(&mut self) -> Result<V, HeapError>;

    /// Lowers the priority of the element named by `entry` to `new_prio`.
    ///
    /// Fails with [`HeapError::KeyNotDecreased`] if `new_prio` is strictly
    /// greater than the entry's current priority, and with
    /// [`HeapError::WrongHeap`] if `entry` was not produced by this heap.
    fn decrease_key(&mut self, entry: &Entry, new_prio: P) -> Result<(), HeapError>;

    /// Consumes both heaps and returns one containing the union of their
    /// elements; `self` and `other` are left empty beforehand, the returned
    /// heap owns everything afterward.
    ///
    /// Variants that cannot meld efficiently may fail with
    /// [`HeapError::NotSupported`] instead of performing the merge.
    fn meld(self, other: Self) -> Result<Self, HeapError>
    where
        Self: Sized;

    /// Number of elements currently stored.
    fn size(&self) -> usize;

    /// Equivalent to `size() == 0`.
    fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Removes every element, leaving `size() == 0`. Idempotent.
    fn clear(&mut self);
}
