use std::fmt;

use crate::error::GraphError;

/// Index of a vertex in `0..vertex_count`.
pub type VertexId = u32;

/// Index of an edge in the caller's edge list.
pub type EdgeId = u32;

/// An undirected edge with its resolved cost.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub a: VertexId,
    pub b: VertexId,
    pub weight: f32,
}

/// Caller-owned graph description: opaque vertex payloads plus index pairs.
///
/// The payload is never inspected by the core. It is only handed, two at a
/// time, to the distance function passed to [`AdjacencyMatrix::build`].
#[derive(Debug, Clone, Default)]
pub struct SourceGraph<V> {
    pub vertices: Vec<V>,
    pub edges: Vec<(VertexId, VertexId)>,
}

impl<V> SourceGraph<V> {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            edges: Vec::new(),
        }
    }

    pub fn with_capacity(vertex_count: usize, edge_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            edges: Vec::with_capacity(edge_count),
        }
    }

    /// Append a vertex and return its index.
    pub fn add_vertex(&mut self, vertex: V) -> VertexId {
        self.vertices.push(vertex);
        (self.vertices.len() - 1) as VertexId
    }

    /// Append an undirected edge and return its index.
    pub fn add_edge(&mut self, a: VertexId, b: VertexId) -> EdgeId {
        self.edges.push((a, b));
        (self.edges.len() - 1) as EdgeId
    }
}

/// One cell of the adjacency matrix.
#[derive(Clone, Copy, PartialEq)]
pub struct Cell {
    pub weight: f32,
    edge: EdgeId,
}

impl Cell {
    const NO_EDGE: EdgeId = EdgeId::MAX;

    pub const EMPTY: Cell = Cell {
        weight: 0.0,
        edge: Self::NO_EDGE,
    };

    /// Edge occupying this cell, if any.
    #[inline]
    pub fn edge(&self) -> Option<EdgeId> {
        (self.edge != Self::NO_EDGE).then_some(self.edge)
    }

    /// `(weight, edge)` if the cell holds an edge with strictly positive weight.
    #[inline]
    pub fn positive(&self) -> Option<(f32, EdgeId)> {
        match self.edge() {
            Some(edge) if self.weight > 0.0 => Some((self.weight, edge)),
            _ => None,
        }
    }

    /// `(weight, edge)` if the cell holds an edge with non-zero weight.
    /// Negative weights pass.
    #[inline]
    pub fn nonzero(&self) -> Option<(f32, EdgeId)> {
        match self.edge() {
            Some(edge) if self.weight != 0.0 => Some((self.weight, edge)),
            _ => None,
        }
    }
}

impl fmt::Debug for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.edge() {
            Some(edge) => write!(f, "Cell({} via #{})", self.weight, edge),
            None => f.write_str("Cell(-)"),
        }
    }
}

/// Dense symmetric weight table built once per benchmark pass.
///
/// Cell `(u, v)` and `(v, u)` always carry the same weight and edge id.
/// Rows are stored contiguously so every algorithm scans neighbours in
/// ascending vertex order, which keeps tie-breaking deterministic.
/// Never mutated after construction.
#[derive(Clone)]
pub struct AdjacencyMatrix {
    vertex_count: usize,
    cells: Vec<Cell>,
    edges: Vec<Edge>,
}

impl AdjacencyMatrix {
    /// Build from a caller graph, computing each edge's weight with `distance`.
    pub fn build<V, F>(source: &SourceGraph<V>, distance: F) -> Result<Self, GraphError>
    where
        F: Fn(&V, &V) -> f32,
    {
        let vertex_count = source.vertices.len();
        let mut weighted = Vec::with_capacity(source.edges.len());
        for (index, &(a, b)) in source.edges.iter().enumerate() {
            let (va, vb) = match (source.vertices.get(a as usize), source.vertices.get(b as usize)) {
                (Some(va), Some(vb)) => (va, vb),
                _ => {
                    return Err(GraphError::EdgeOutOfRange {
                        edge: index,
                        a,
                        b,
                        vertex_count,
                    })
                }
            };
            weighted.push((a, b, distance(va, vb)));
        }
        Self::from_weighted_edges(vertex_count, weighted)
    }

    /// Build from `(a, b, weight)` triples. Edge ids follow iteration order.
    pub fn from_weighted_edges<I>(vertex_count: usize, edges: I) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item = (VertexId, VertexId, f32)>,
    {
        if vertex_count >= EdgeId::MAX as usize {
            return Err(GraphError::TooManyVertices(vertex_count));
        }

        let mut matrix = Self {
            vertex_count,
            cells: vec![Cell::EMPTY; vertex_count * vertex_count],
            edges: Vec::new(),
        };

        for (a, b, weight) in edges {
            let index = matrix.edges.len();
            if a as usize >= vertex_count || b as usize >= vertex_count {
                return Err(GraphError::EdgeOutOfRange {
                    edge: index,
                    a,
                    b,
                    vertex_count,
                });
            }
            if weight.is_nan() {
                return Err(GraphError::InvalidWeight { edge: index });
            }
            let id = index as EdgeId;
            matrix.edges.push(Edge { a, b, weight });

            // Self-loops keep their id but never enter the table.
            if a == b {
                continue;
            }

            // Parallel edges: the lighter one wins the cell.
            let existing = matrix.cells[matrix.offset(a, b)];
            if existing.edge().is_some() && existing.weight <= weight {
                continue;
            }
            let cell = Cell { weight, edge: id };
            let ab = matrix.offset(a, b);
            let ba = matrix.offset(b, a);
            matrix.cells[ab] = cell;
            matrix.cells[ba] = cell;
        }

        Ok(matrix)
    }

    #[inline]
    fn offset(&self, u: VertexId, v: VertexId) -> usize {
        u as usize * self.vertex_count + v as usize
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertex_count == 0
    }

    pub fn contains_vertex(&self, v: VertexId) -> bool {
        (v as usize) < self.vertex_count
    }

    #[inline]
    pub fn cell(&self, u: VertexId, v: VertexId) -> Cell {
        self.cells[self.offset(u, v)]
    }

    /// All cells of row `u`, indexed by neighbour vertex.
    #[inline]
    pub fn row(&self, u: VertexId) -> &[Cell] {
        let start = u as usize * self.vertex_count;
        &self.cells[start..start + self.vertex_count]
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id as usize)
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Weight of edge `id`, 0 for unknown ids.
    pub fn edge_weight(&self, id: EdgeId) -> f32 {
        self.edge(id).map(|e| e.weight).unwrap_or(0.0)
    }

    /// Approximate memory usage in bytes.
    pub fn memory_usage(&self) -> usize {
        use std::mem::size_of;

        self.cells.len() * size_of::<Cell>() + self.edges.len() * size_of::<Edge>()
    }
}

impl fmt::Debug for AdjacencyMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdjacencyMatrix")
            .field("vertex_count", &self.vertex_count)
            .field("edge_count", &self.edges.len())
            .finish()
    }
}
