//! Minimal Dijkstra driver over a tiny in-memory graph, exercising the
//! factory's external interface end to end. Not a benchmark: no timing, no
//! graph loader, just enough to show the five-operation contract at work.

use fibqueue::{make_queue, HeapError, PriorityQueue, PriorityQueueKind};

struct Graph {
    edges: Vec<Vec<(usize, u32)>>,
}

impl Graph {
    fn new(n: usize) -> Self {
        Graph { edges: vec![Vec::new(); n] }
    }

    fn add_edge(&mut self, from: usize, to: usize, weight: u32) {
        self.edges[from].push((to, weight));
        self.edges[to].push((from, weight));
    }
}

fn shortest_paths(
    graph: &Graph,
    source: usize,
    kind: PriorityQueueKind,
) -> Result<Vec<Option<u32>>, HeapError> {
    let mut queue = make_queue::<u32, usize>(kind);
    let mut dist = vec![None; graph.edges.len()];
    let mut handles = vec![None; graph.edges.len()];

    dist[source] = Some(0);
    handles[source] = Some(queue.insert(source, 0));

    while !queue.is_empty() {
        let u = *queue.find_min()?;
        let d = dist[u].unwrap();
        queue.delete_min()?;

        for &(v, w) in &graph.edges[u] {
            let candidate = d + w;
            if dist[v].map_or(true, |cur| candidate < cur) {
                dist[v] = Some(candidate);
                match &handles[v] {
                    Some(h) => queue.decrease_key(h, candidate)?,
                    None => handles[v] = Some(queue.insert(v, candidate)),
                }
            }
        }
    }

    Ok(dist)
}

fn main() {
    env_logger::init();

    let mut graph = Graph::new(5);
    graph.add_edge(0, 1, 4);
    graph.add_edge(0, 2, 1);
    graph.add_edge(2, 1, 2);
    graph.add_edge(1, 3, 1);
    graph.add_edge(2, 3, 5);
    graph.add_edge(3, 4, 3);

    for kind in [
        PriorityQueueKind::BinaryHeap,
        PriorityQueueKind::BinomialHeap,
        PriorityQueueKind::FibonacciHeap,
        PriorityQueueKind::StrictFibonacciHeap,
        PriorityQueueKind::BrodalQueue,
        PriorityQueueKind::PairingLikeList,
    ] {
        let dist = shortest_paths(&graph, 0, kind).expect("graph has no decrease-key misuse");
        println!("{kind:?}: {dist:?}");
    }
}
