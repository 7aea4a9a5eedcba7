use std::fmt;

use serde::{Deserialize, Serialize};

use crate::algorithms;
use crate::graph::{AdjacencyMatrix, EdgeId, VertexId};

/// The seven path-finding algorithms, in benchmark order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlgorithmKind {
    Bfs,
    Dfs,
    DijkstraArray,
    DijkstraQueue,
    DesopoPape,
    BellmanFord,
    FloydWarshall,
}

impl AlgorithmKind {
    pub const COUNT: usize = 7;

    pub const ALL: [AlgorithmKind; Self::COUNT] = [
        AlgorithmKind::Bfs,
        AlgorithmKind::Dfs,
        AlgorithmKind::DijkstraArray,
        AlgorithmKind::DijkstraQueue,
        AlgorithmKind::DesopoPape,
        AlgorithmKind::BellmanFord,
        AlgorithmKind::FloydWarshall,
    ];

    /// Position in [`AlgorithmKind::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            AlgorithmKind::Bfs => "BFS",
            AlgorithmKind::Dfs => "DFS",
            AlgorithmKind::DijkstraArray => "Dijkstra (array)",
            AlgorithmKind::DijkstraQueue => "Dijkstra (heap)",
            AlgorithmKind::DesopoPape => "D'Esopo-Pape",
            AlgorithmKind::BellmanFord => "Bellman-Ford",
            AlgorithmKind::FloydWarshall => "Floyd-Warshall",
        }
    }

    /// Whether the algorithm is expected to return a minimum-weight path.
    pub fn is_weighted(self) -> bool {
        !matches!(self, AlgorithmKind::Bfs | AlgorithmKind::Dfs)
    }

    /// Capability table: the search routine backing each kind.
    fn finder(self) -> PathFinder {
        match self {
            AlgorithmKind::Bfs => algorithms::bfs,
            AlgorithmKind::Dfs => algorithms::dfs,
            AlgorithmKind::DijkstraArray => algorithms::dijkstra_array,
            AlgorithmKind::DijkstraQueue => algorithms::dijkstra_queue,
            AlgorithmKind::DesopoPape => algorithms::desopo_pape,
            AlgorithmKind::BellmanFord => algorithms::bellman_ford,
            AlgorithmKind::FloydWarshall => algorithms::floyd_warshall,
        }
    }
}

impl fmt::Display for AlgorithmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Signature shared by every search routine.
pub type PathFinder = fn(&AdjacencyMatrix, VertexId, VertexId) -> TraversalResult;

/// Output of one algorithm run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TraversalResult {
    /// Edges in the order the algorithm discovered or improved through them.
    /// May contain repeats.
    pub traversed_edges: Vec<EdgeId>,
    /// Path from start to end, in travel order. Empty when there is no path.
    pub final_edges: Vec<EdgeId>,
    /// Cumulative-allocated samples observed during the run.
    pub memory: Vec<usize>,
}

impl TraversalResult {
    /// The "no path" result.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.traversed_edges.is_empty() && self.final_edges.is_empty()
    }
}

/// A single-use algorithm instance.
///
/// `find_path` is the only part that should sit inside a timed region; the
/// path is fully reconstructed before it returns, so `result` is a plain
/// accessor.
#[derive(Debug)]
pub struct Algorithm {
    kind: AlgorithmKind,
    result: TraversalResult,
}

impl Algorithm {
    pub fn new(kind: AlgorithmKind) -> Self {
        Self {
            kind,
            result: TraversalResult::empty(),
        }
    }

    pub fn kind(&self) -> AlgorithmKind {
        self.kind
    }

    /// Run the search. `start` and `end` must be vertices of `graph`.
    ///
    /// Calling it again replaces the previous result rather than extending it.
    pub fn find_path(&mut self, graph: &AdjacencyMatrix, start: VertexId, end: VertexId) {
        debug_assert!(graph.contains_vertex(start) && graph.contains_vertex(end));
        self.result = (self.kind.finder())(graph, start, end);
    }

    pub fn result(&self) -> &TraversalResult {
        &self.result
    }

    pub fn into_result(self) -> TraversalResult {
        self.result
    }
}

/// Walk `parent` links back from `end` to the root, then reverse into
/// start-to-end order. `parent[v]` is `(previous vertex, edge used)`.
pub(crate) fn reconstruct_path(parent: &[Option<(VertexId, EdgeId)>], end: VertexId) -> Vec<EdgeId> {
    let mut edges = Vec::new();
    let mut node = end;

    while let Some((prev, edge)) = parent[node as usize] {
        edges.push(edge);
        node = prev;
        // A parent chain longer than the vertex count means a cycle.
        if edges.len() > parent.len() {
            return Vec::new();
        }
    }

    edges.reverse();
    edges
}
