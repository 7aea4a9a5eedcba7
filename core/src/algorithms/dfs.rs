use crate::graph::{AdjacencyMatrix, EdgeId, VertexId};
use crate::traversal::TraversalResult;

/// Depth-first search in pre-order, with an explicit frame stack.
///
/// Each frame holds a vertex and the next neighbour index to try, so the
/// discovery order matches a recursive walk without risking stack overflow
/// on long chains. A discovered edge goes on both `traversed_edges` and the
/// path stack; backtracking pops only the path stack.
///
/// The path found is the first one in neighbour order, not the shortest.
pub fn dfs(graph: &AdjacencyMatrix, start: VertexId, end: VertexId) -> TraversalResult {
    let n = graph.vertex_count();
    let mut visited = vec![false; n];
    let mut frames: Vec<(VertexId, usize)> = vec![(start, 0)];
    let mut path: Vec<EdgeId> = Vec::new();
    let mut traversed = Vec::new();

    visited[start as usize] = true;

    while let Some(frame) = frames.last_mut() {
        let current = frame.0;
        if current == end {
            return TraversalResult {
                traversed_edges: traversed,
                final_edges: path,
                memory: Vec::new(),
            };
        }

        let row = graph.row(current);
        let next = (frame.1..n).find_map(|v| match row[v].positive() {
            Some((_, edge)) if !visited[v] => Some((v, edge)),
            _ => None,
        });

        match next {
            Some((v, edge)) => {
                frame.1 = v + 1;
                visited[v] = true;
                traversed.push(edge);
                path.push(edge);
                frames.push((v as VertexId, 0));
            }
            None => {
                frames.pop();
                path.pop();
            }
        }
    }

    TraversalResult::empty()
}
