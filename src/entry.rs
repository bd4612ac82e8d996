use std::sync::atomic::{AtomicU64, Ordering};

use crate::arena::Loc;

static NEXT_HEAP_ID: AtomicU64 = AtomicU64::new(1);

/// Mints a fresh identifier for a heap instance.
///
/// Every concrete heap stamps one of these on itself at construction and
/// copies it onto every `Entry` it hands out, so `decrease_key` can reject a
/// handle that wandered in from a different heap in O(1) (`WrongHeap`)
/// without needing to search the arena.
pub(crate) fn next_heap_id() -> u64 {
    NEXT_HEAP_ID.fetch_add(1, Ordering::Relaxed)
}

/// Opaque handle returned by `insert`, later passed back to `decrease_key`.
///
/// An `Entry` never exposes the heap's internal node layout: it is a bare
/// arena coordinate ([`Loc`]), stamped with the id of the heap that
/// produced it. The priority and element the specification describes as
/// living "on" the entry are in fact the source of truth stored at that
/// coordinate inside the owning heap's arena; the entry is merely the
/// stable reference that still resolves to the right storage after
/// arbitrary relinking, consolidation, rank changes, or a `meld` elsewhere
/// in the structure.
///
/// Valid from the moment `insert` returns it until the node it names is
/// popped by `delete_min`; using it afterwards, or on a different heap
/// instance, is rejected with [`HeapError::WrongHeap`](crate::HeapError::WrongHeap)
/// wherever that heap can tell the difference, and is otherwise unspecified.
#[derive(Debug, Clone, Copy)]
pub struct Entry {
    pub(crate) heap_id: u64,
    pub(crate) loc: Loc,
}

impl Entry {
    pub(crate) fn new(heap_id: u64, loc: Loc) -> Self {
        Entry { heap_id, loc }
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.heap_id == other.heap_id && self.loc == other.loc
    }
}
impl Eq for Entry {}
