use crate::graph::{AdjacencyMatrix, EdgeId, VertexId};
use crate::traversal::{reconstruct_path, TraversalResult};

/// Bellman-Ford: up to V-1 full relaxation passes, then one verification pass.
///
/// Accepts negative weights (any non-zero weight counts as an edge). Stops
/// early once a pass changes nothing. If the verification pass can still
/// relax an edge reachable from `start`, a negative cycle exists and the
/// result is empty, indistinguishable from "unreachable".
pub fn bellman_ford(graph: &AdjacencyMatrix, start: VertexId, end: VertexId) -> TraversalResult {
    let n = graph.vertex_count();
    let mut dist = vec![f32::INFINITY; n];
    let mut parent: Vec<Option<(VertexId, EdgeId)>> = vec![None; n];
    let mut traversed = Vec::new();

    dist[start as usize] = 0.0;

    for _ in 1..n {
        let mut changed = false;

        for u in 0..n {
            if dist[u] == f32::INFINITY {
                continue;
            }
            for (v, cell) in graph.row(u as VertexId).iter().enumerate() {
                let Some((weight, edge)) = cell.nonzero() else {
                    continue;
                };
                let alt = dist[u] + weight;
                if alt < dist[v] {
                    dist[v] = alt;
                    parent[v] = Some((u as VertexId, edge));
                    traversed.push(edge);
                    changed = true;
                }
            }
        }

        if !changed {
            break;
        }
    }

    if has_negative_cycle(graph, &dist) || dist[end as usize] == f32::INFINITY {
        return TraversalResult::empty();
    }

    TraversalResult {
        traversed_edges: traversed,
        final_edges: reconstruct_path(&parent, end),
        memory: Vec::new(),
    }
}

fn has_negative_cycle(graph: &AdjacencyMatrix, dist: &[f32]) -> bool {
    dist.iter().enumerate().any(|(u, &du)| {
        du != f32::INFINITY
            && graph
                .row(u as VertexId)
                .iter()
                .enumerate()
                .any(|(v, cell)| matches!(cell.nonzero(), Some((w, _)) if du + w < dist[v]))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::tests::{make_chain, make_cycle};

    #[test]
    fn test_bellman_ford_chain() {
        let g = make_chain(5);
        let result = bellman_ford(&g, 0, 4);
        assert_eq!(result.final_edges, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_bellman_ford_detour() {
        let g = AdjacencyMatrix::from_weighted_edges(3, [(0, 2, 5.0), (0, 1, 1.0), (1, 2, 1.0)])
            .unwrap();
        assert_eq!(bellman_ford(&g, 0, 2).final_edges, vec![1, 2]);
    }

    #[test]
    fn test_bellman_ford_negative_cycle() {
        // An undirected negative edge is a two-vertex negative cycle.
        let g = AdjacencyMatrix::from_weighted_edges(3, [(0, 1, 1.0), (1, 2, -2.0)]).unwrap();
        let result = bellman_ford(&g, 0, 1);
        assert!(result.is_empty());
    }

    #[test]
    fn test_bellman_ford_unreachable_negative_cycle_ignored() {
        // The negative edge sits in a component `start` cannot reach.
        let g = AdjacencyMatrix::from_weighted_edges(4, [(0, 1, 1.0), (2, 3, -1.0)]).unwrap();
        assert_eq!(bellman_ford(&g, 0, 1).final_edges, vec![0]);
    }

    #[test]
    fn test_bellman_ford_early_stop() {
        // A chain settles in one pass when edges are scanned in order.
        let g = make_chain(6);
        let result = bellman_ford(&g, 0, 5);
        assert_eq!(result.traversed_edges, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_bellman_ford_no_path() {
        let g = AdjacencyMatrix::from_weighted_edges(3, [(0, 1, 1.0)]).unwrap();
        assert!(bellman_ford(&g, 0, 2).is_empty());
    }

    #[test]
    fn test_bellman_ford_self_runs_full_relaxation() {
        let g = make_cycle(4);
        let result = bellman_ford(&g, 0, 0);
        assert!(result.final_edges.is_empty());
        assert!(!result.traversed_edges.is_empty());
    }
}
