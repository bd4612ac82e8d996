//! A library of addressable, meldable priority queues sharing one
//! [`PriorityQueue`] interface, intended as the algorithmic heart of a
//! Dijkstra-style shortest-path benchmark: the same driver loop runs
//! unmodified over a binary heap, a binomial heap, a lazy Fibonacci heap, a
//! strict Fibonacci heap, a Brodal queue, or a linear-scan baseline, and
//! only the handle returned by [`factory::make_queue`] changes.
//!
//! Every variant is built over a shared arena abstraction ([`arena::Forest`])
//! that lets a `meld` move whole arenas between heaps instead of copying
//! individual nodes, which is what makes the strict Fibonacci heap's and
//! Brodal queue's worst-case O(1) `meld` possible without `unsafe` code.

mod arena;
mod binary_heap;
mod binomial_heap;
mod brodal_queue;
mod entry;
mod error;
mod factory;
mod fibonacci_heap;
mod heap;
mod list_queue;
mod strict_fibonacci_heap;

pub use binary_heap::BinaryHeap;
pub use binomial_heap::BinomialHeap;
pub use brodal_queue::BrodalQueue;
pub use entry::Entry;
pub use error::HeapError;
pub use factory::{make_queue, PriorityQueueKind};
pub use fibonacci_heap::FibonacciHeap;
pub use heap::PriorityQueue;
pub use list_queue::ListQueue;
pub use strict_fibonacci_heap::StrictFibonacciHeap;
