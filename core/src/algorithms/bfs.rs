use std::collections::VecDeque;

use crate::graph::{AdjacencyMatrix, EdgeId, VertexId};
use crate::traversal::{reconstruct_path, TraversalResult};

/// Breadth-first search: fewest hops, edge weights ignored beyond `> 0`.
///
/// Each vertex is marked visited when it is enqueued, so its discovery edge
/// is recorded exactly once. Returns as soon as `end` is dequeued.
pub fn bfs(graph: &AdjacencyMatrix, start: VertexId, end: VertexId) -> TraversalResult {
    let n = graph.vertex_count();
    let mut visited = vec![false; n];
    let mut parent: Vec<Option<(VertexId, EdgeId)>> = vec![None; n];
    let mut queue: VecDeque<VertexId> = VecDeque::new();
    let mut traversed = Vec::new();

    visited[start as usize] = true;
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        if current == end {
            return TraversalResult {
                traversed_edges: traversed,
                final_edges: reconstruct_path(&parent, end),
                memory: Vec::new(),
            };
        }

        for (v, cell) in graph.row(current).iter().enumerate() {
            let Some((_, edge)) = cell.positive() else {
                continue;
            };
            if !visited[v] {
                visited[v] = true;
                parent[v] = Some((current, edge));
                queue.push_back(v as VertexId);
                traversed.push(edge);
            }
        }
    }

    TraversalResult::empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::tests::{make_chain, make_cycle, make_star};

    #[test]
    fn test_bfs_chain() {
        let g = make_chain(6);
        let result = bfs(&g, 0, 5);
        assert_eq!(result.final_edges, vec![0, 1, 2, 3, 4]);
        assert_eq!(result.traversed_edges, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_bfs_fewest_hops_over_lighter_path() {
        // 0-1-2-3 costs 3, direct 0-3 costs 10; BFS takes the single hop.
        let g = AdjacencyMatrix::from_weighted_edges(
            4,
            [(0, 1, 1.0), (1, 2, 1.0), (2, 3, 1.0), (0, 3, 10.0)],
        )
        .unwrap();
        assert_eq!(bfs(&g, 0, 3).final_edges, vec![3]);
    }

    #[test]
    fn test_bfs_star_records_every_leaf() {
        let g = make_star(20);
        let result = bfs(&g, 0, 20);
        assert_eq!(result.final_edges, vec![19]);
        assert_eq!(result.traversed_edges.len(), 20);
    }

    #[test]
    fn test_bfs_stops_at_end() {
        // End is dequeued before the far side of the cycle is expanded.
        let g = make_cycle(8);
        let result = bfs(&g, 0, 1);
        assert_eq!(result.final_edges, vec![0]);
        assert_eq!(result.traversed_edges, vec![0, 7]);
    }

    #[test]
    fn test_bfs_no_path() {
        let g = AdjacencyMatrix::from_weighted_edges(4, [(0, 1, 1.0), (2, 3, 1.0)]).unwrap();
        assert!(bfs(&g, 0, 3).is_empty());
    }

    #[test]
    fn test_bfs_self() {
        let g = make_chain(3);
        assert!(bfs(&g, 1, 1).is_empty());
    }
}
