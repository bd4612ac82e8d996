//! Picks a concrete `PriorityQueue` implementation by name, the way the
//! reference benchmark harness selects one via `PrioQueueFactory::makeQueue`.

use crate::binary_heap::BinaryHeap;
use crate::binomial_heap::BinomialHeap;
use crate::brodal_queue::BrodalQueue;
use crate::fibonacci_heap::FibonacciHeap;
use crate::heap::PriorityQueue;
use crate::list_queue::ListQueue;
use crate::strict_fibonacci_heap::StrictFibonacciHeap;

/// The queue variants this crate provides, named after their reference
/// counterparts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PriorityQueueKind {
    BinaryHeap,
    BinomialHeap,
    FibonacciHeap,
    StrictFibonacciHeap,
    BrodalQueue,
    PairingLikeList,
}

/// Any of the six variants boxed behind the shared trait, so a benchmark
/// driver can pick one at runtime by [`PriorityQueueKind`] instead of
/// committing to a concrete type parameter.
pub fn make_queue<P, V>(kind: PriorityQueueKind) -> Box<dyn PriorityQueue<P, V>>
where
    P: Ord + 'static,
    V: 'static,
{
    match kind {
        PriorityQueueKind::BinaryHeap => Box::new(BinaryHeap::new()),
        PriorityQueueKind::BinomialHeap => Box::new(BinomialHeap::new()),
        PriorityQueueKind::FibonacciHeap => Box::new(FibonacciHeap::new()),
        PriorityQueueKind::StrictFibonacciHeap => Box::new(StrictFibonacciHeap::new()),
        PriorityQueueKind::BrodalQueue => Box::new(BrodalQueue::new()),
        PriorityQueueKind::PairingLikeList => Box::new(ListQueue::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [PriorityQueueKind; 6] = [
        PriorityQueueKind::BinaryHeap,
        PriorityQueueKind::BinomialHeap,
        PriorityQueueKind::FibonacciHeap,
        PriorityQueueKind::StrictFibonacciHeap,
        PriorityQueueKind::BrodalQueue,
        PriorityQueueKind::PairingLikeList,
    ];

    #[test]
    fn every_kind_behaves_like_a_priority_queue() {
        for kind in ALL {
            let mut q: Box<dyn PriorityQueue<i32, i32>> = make_queue(kind);
            for v in [5, 1, 4, 2, 3] {
                q.insert(v, v);
            }
            let mut out = Vec::new();
            while !q.is_empty() {
                out.push(q.delete_min().unwrap());
            }
            assert_eq!(out, vec![1, 2, 3, 4, 5]);
        }
    }
}
