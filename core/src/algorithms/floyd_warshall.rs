use crate::graph::{AdjacencyMatrix, VertexId};
use crate::traversal::TraversalResult;

/// Floyd-Warshall all-pairs DP. O(V³) time, O(V²) memory.
///
/// `next[i][j]` is the first hop from `i` toward `j`, so the path is walked
/// forward from `start` once the DP completes. Only improvements to
/// `start`'s own row are recorded as traversed: seeding records the direct
/// edge, and an improvement through `k` records the edge leaving `k` on the
/// new route. Weights `<= 0` are not seeded.
pub fn floyd_warshall(graph: &AdjacencyMatrix, start: VertexId, end: VertexId) -> TraversalResult {
    let n = graph.vertex_count();
    let at = |i: usize, j: usize| i * n + j;
    let mut dist = vec![f32::INFINITY; n * n];
    let mut next: Vec<Option<VertexId>> = vec![None; n * n];
    let mut traversed = Vec::new();
    let source = start as usize;

    for u in 0..n {
        dist[at(u, u)] = 0.0;
        next[at(u, u)] = Some(u as VertexId);
        for (v, cell) in graph.row(u as VertexId).iter().enumerate() {
            if let Some((weight, edge)) = cell.positive() {
                dist[at(u, v)] = weight;
                next[at(u, v)] = Some(v as VertexId);
                if u == source {
                    traversed.push(edge);
                }
            }
        }
    }

    for k in 0..n {
        for i in 0..n {
            let dik = dist[at(i, k)];
            if dik == f32::INFINITY {
                continue;
            }
            for j in 0..n {
                let dkj = dist[at(k, j)];
                if dkj == f32::INFINITY {
                    continue;
                }
                if dist[at(i, j)] > dik + dkj {
                    dist[at(i, j)] = dik + dkj;
                    next[at(i, j)] = next[at(i, k)];
                    if i == source {
                        let leaving_k = next[at(k, j)]
                            .and_then(|hop| graph.cell(k as VertexId, hop).edge());
                        if let Some(edge) = leaving_k {
                            traversed.push(edge);
                        }
                    }
                }
            }
        }
    }

    if dist[at(source, end as usize)] == f32::INFINITY {
        return TraversalResult::empty();
    }

    let mut final_edges = Vec::new();
    let mut current = start;
    while current != end {
        let Some(hop) = next[at(current as usize, end as usize)] else {
            return TraversalResult::empty();
        };
        if let Some(edge) = graph.cell(current, hop).edge() {
            final_edges.push(edge);
        }
        current = hop;
        if final_edges.len() > n {
            return TraversalResult::empty();
        }
    }

    TraversalResult {
        traversed_edges: traversed,
        final_edges,
        memory: Vec::new(),
    }
}
