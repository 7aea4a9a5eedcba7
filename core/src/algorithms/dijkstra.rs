use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::graph::{AdjacencyMatrix, EdgeId, VertexId};
use crate::traversal::{reconstruct_path, TraversalResult};

/// Dijkstra with an O(V) linear scan for the next vertex. O(V²) overall.
///
/// Settled vertices are never relaxed again. Stops when `end` is settled or
/// no unsettled vertex has a finite distance.
pub fn dijkstra_array(graph: &AdjacencyMatrix, start: VertexId, end: VertexId) -> TraversalResult {
    let n = graph.vertex_count();
    let mut dist = vec![f32::INFINITY; n];
    let mut settled = vec![false; n];
    let mut parent: Vec<Option<(VertexId, EdgeId)>> = vec![None; n];
    let mut traversed = Vec::new();

    dist[start as usize] = 0.0;

    for _ in 0..n {
        // Strict `<` keeps the lowest index on ties.
        let mut u = None;
        let mut best = f32::INFINITY;
        for (v, &d) in dist.iter().enumerate() {
            if !settled[v] && d < best {
                best = d;
                u = Some(v);
            }
        }
        let Some(u) = u else {
            break;
        };

        settled[u] = true;

        if u == end as usize {
            return TraversalResult {
                traversed_edges: traversed,
                final_edges: reconstruct_path(&parent, end),
                memory: Vec::new(),
            };
        }

        for (v, cell) in graph.row(u as VertexId).iter().enumerate() {
            let Some((weight, edge)) = cell.positive() else {
                continue;
            };
            if settled[v] {
                continue;
            }
            let alt = dist[u] + weight;
            if alt < dist[v] {
                dist[v] = alt;
                parent[v] = Some((u as VertexId, edge));
                traversed.push(edge);
            }
        }
    }

    TraversalResult::empty()
}

/// Min-heap entry ordered by distance, then vertex index.
#[derive(Debug, Clone, Copy, PartialEq)]
struct HeapEntry {
    dist: f32,
    vertex: VertexId,
}

impl Eq for HeapEntry {}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so BinaryHeap pops the smallest distance first.
        other
            .dist
            .total_cmp(&self.dist)
            .then_with(|| other.vertex.cmp(&self.vertex))
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Dijkstra with a binary heap and lazy deletion. O(E log V).
///
/// A vertex may be pushed more than once; entries whose distance is worse
/// than the current best are stale and skipped on pop.
pub fn dijkstra_queue(graph: &AdjacencyMatrix, start: VertexId, end: VertexId) -> TraversalResult {
    let n = graph.vertex_count();
    let mut dist = vec![f32::INFINITY; n];
    let mut parent: Vec<Option<(VertexId, EdgeId)>> = vec![None; n];
    let mut heap = BinaryHeap::new();
    let mut traversed = Vec::new();

    dist[start as usize] = 0.0;
    heap.push(HeapEntry {
        dist: 0.0,
        vertex: start,
    });

    while let Some(HeapEntry { dist: d, vertex: u }) = heap.pop() {
        if d > dist[u as usize] {
            continue;
        }

        if u == end {
            return TraversalResult {
                traversed_edges: traversed,
                final_edges: reconstruct_path(&parent, end),
                memory: Vec::new(),
            };
        }

        for (v, cell) in graph.row(u).iter().enumerate() {
            let Some((weight, edge)) = cell.positive() else {
                continue;
            };
            let alt = d + weight;
            if alt < dist[v] {
                dist[v] = alt;
                parent[v] = Some((u, edge));
                heap.push(HeapEntry {
                    dist: alt,
                    vertex: v as VertexId,
                });
                traversed.push(edge);
            }
        }
    }

    TraversalResult::empty()
}
