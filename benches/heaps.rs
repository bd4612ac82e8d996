#![allow(unused)]

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;

use fibqueue::{
    BinaryHeap, BinomialHeap, BrodalQueue, FibonacciHeap, PriorityQueue, StrictFibonacciHeap,
};

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("bench_insert");
    for &size in &[100u64, 1_000, 10_000, 100_000] {
        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::new("BinaryHeap", size), &size, |b, &size| {
            b.iter(|| {
                let mut heap = BinaryHeap::new();
                for i in 0..size {
                    heap.insert(black_box(i), black_box(i));
                }
            });
        });
        group.bench_with_input(BenchmarkId::new("BinomialHeap", size), &size, |b, &size| {
            b.iter(|| {
                let mut heap = BinomialHeap::new();
                for i in 0..size {
                    heap.insert(black_box(i), black_box(i));
                }
            });
        });
        group.bench_with_input(BenchmarkId::new("FibonacciHeap", size), &size, |b, &size| {
            b.iter(|| {
                let mut heap = FibonacciHeap::new();
                for i in 0..size {
                    heap.insert(black_box(i), black_box(i));
                }
            });
        });
        group.bench_with_input(
            BenchmarkId::new("StrictFibonacciHeap", size),
            &size,
            |b, &size| {
                b.iter(|| {
                    let mut heap = StrictFibonacciHeap::new();
                    for i in 0..size {
                        heap.insert(black_box(i), black_box(i));
                    }
                });
            },
        );
        group.bench_with_input(BenchmarkId::new("BrodalQueue", size), &size, |b, &size| {
            b.iter(|| {
                let mut heap = BrodalQueue::new();
                for i in 0..size {
                    heap.insert(black_box(i), black_box(i));
                }
            });
        });
    }
    group.finish();
}

fn bench_decrease_and_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("bench_decrease_and_drain");
    for &size in &[100u64, 1_000, 10_000] {
        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::new("FibonacciHeap", size), &size, |b, &size| {
            b.iter(|| {
                let mut heap = FibonacciHeap::new();
                let entries: Vec<_> = (0..size).map(|i| heap.insert(i, i)).collect();
                for (i, e) in entries.iter().enumerate() {
                    if i % 2 == 0 {
                        heap.decrease_key(e, 0).ok();
                    }
                }
                while !heap.is_empty() {
                    let _ = heap.delete_min();
                }
            });
        });
        group.bench_with_input(
            BenchmarkId::new("StrictFibonacciHeap", size),
            &size,
            |b, &size| {
                b.iter(|| {
                    let mut heap = StrictFibonacciHeap::new();
                    let entries: Vec<_> = (0..size).map(|i| heap.insert(i, i)).collect();
                    for (i, e) in entries.iter().enumerate() {
                        if i % 2 == 0 {
                            heap.decrease_key(e, 0).ok();
                        }
                    }
                    while !heap.is_empty() {
                        let _ = heap.delete_min();
                    }
                });
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_insert, bench_decrease_and_drain);
criterion_main!(benches);
