use std::collections::VecDeque;

use crate::graph::{AdjacencyMatrix, EdgeId, VertexId};
use crate::traversal::{reconstruct_path, TraversalResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QueueState {
    /// Never queued.
    Unseen,
    Queued,
    /// Dequeued at least once; goes to the front if improved again.
    Dequeued,
}

/// D'Esopo-Pape label-correcting search.
///
/// An improved vertex seen for the first time joins the back of the deque;
/// one that was already dequeued is re-inserted at the front (SLF). Returns
/// when `end` is dequeued and no queued vertex is closer than it, since only
/// those could still shorten its label. Edges with weight `<= 0` are
/// skipped, so the result is only a shortest path for non-negative weights.
pub fn desopo_pape(graph: &AdjacencyMatrix, start: VertexId, end: VertexId) -> TraversalResult {
    let n = graph.vertex_count();
    let mut state = vec![QueueState::Unseen; n];
    let mut dist = vec![f32::INFINITY; n];
    let mut parent: Vec<Option<(VertexId, EdgeId)>> = vec![None; n];
    let mut deque: VecDeque<VertexId> = VecDeque::new();
    let mut traversed = Vec::new();

    dist[start as usize] = 0.0;
    state[start as usize] = QueueState::Queued;
    deque.push_back(start);

    while let Some(u) = deque.pop_front() {
        state[u as usize] = QueueState::Dequeued;

        if u == end && deque.iter().all(|&q| dist[q as usize] >= dist[end as usize]) {
            return TraversalResult {
                traversed_edges: traversed,
                final_edges: reconstruct_path(&parent, end),
                memory: Vec::new(),
            };
        }

        let du = dist[u as usize];
        for (v, cell) in graph.row(u).iter().enumerate() {
            let Some((weight, edge)) = cell.positive() else {
                continue;
            };
            let alt = du + weight;
            if alt < dist[v] {
                dist[v] = alt;
                parent[v] = Some((u, edge));
                traversed.push(edge);

                match state[v] {
                    QueueState::Unseen => {
                        state[v] = QueueState::Queued;
                        deque.push_back(v as VertexId);
                    }
                    QueueState::Dequeued => {
                        state[v] = QueueState::Queued;
                        deque.push_front(v as VertexId);
                    }
                    QueueState::Queued => {}
                }
            }
        }
    }

    // `end` was passed over while closer vertices were queued; its label is
    // final once the deque drains.
    if dist[end as usize] == f32::INFINITY {
        return TraversalResult::empty();
    }
    TraversalResult {
        traversed_edges: traversed,
        final_edges: reconstruct_path(&parent, end),
        memory: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::tests::{make_chain, make_cycle};

    #[test]
    fn test_desopo_pape_chain() {
        let g = make_chain(4);
        let result = desopo_pape(&g, 0, 3);
        assert_eq!(result.final_edges, vec![0, 1, 2]);
    }

    #[test]
    fn test_desopo_pape_requeues_at_front() {
        // 0-1 (5) reaches 1 early; 0-2-1 (1 + 1) improves it after 1 was
        // dequeued, so 1 is pushed to the front and its neighbour 3 improved.
        let g = AdjacencyMatrix::from_weighted_edges(
            4,
            [(0, 1, 5.0), (0, 2, 1.0), (2, 1, 1.0), (1, 3, 1.0)],
        )
        .unwrap();
        let result = desopo_pape(&g, 0, 3);
        assert_eq!(result.final_edges, vec![1, 2, 3]);
        // e3 (1-3) is relaxed twice: once from the stale label, once after re-queue.
        assert_eq!(result.traversed_edges.iter().filter(|&&e| e == 3).count(), 2);
    }

    #[test]
    fn test_desopo_pape_end_not_final_on_first_dequeue() {
        // `end` (2) is dequeued at cost 10 while 3 (cost 1) still waits
        // behind it; 0-3-2 costs 2.
        let g = AdjacencyMatrix::from_weighted_edges(
            4,
            [(0, 1, 5.0), (0, 2, 10.0), (0, 3, 1.0), (3, 2, 1.0)],
        )
        .unwrap();
        let result = desopo_pape(&g, 0, 2);
        assert_eq!(result.final_edges, vec![2, 3]);
        assert_eq!(result.final_edges, crate::algorithms::dijkstra_queue(&g, 0, 2).final_edges);
    }

    #[test]
    fn test_desopo_pape_negative_edge_dropped() {
        let g = AdjacencyMatrix::from_weighted_edges(3, [(0, 1, 1.0), (1, 2, -1.0)]).unwrap();
        assert!(desopo_pape(&g, 0, 2).is_empty());
    }

    #[test]
    fn test_desopo_pape_cycle() {
        let g = make_cycle(4);
        assert_eq!(desopo_pape(&g, 0, 2).final_edges.len(), 2);
    }

    #[test]
    fn test_desopo_pape_self() {
        let g = make_chain(2);
        assert!(desopo_pape(&g, 0, 0).is_empty());
    }
}
