//! Error types for graph-race-core.
//!
//! Algorithms themselves never fail: an unreachable destination or a
//! negative cycle yields an empty `TraversalResult`. Errors here cover
//! contract violations caught before any algorithm is dispatched.

use thiserror::Error;

use crate::graph::VertexId;

/// Result type alias for graph-race-core operations.
pub type Result<T> = std::result::Result<T, BenchmarkError>;

/// Errors raised while building an [`AdjacencyMatrix`](crate::AdjacencyMatrix).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    /// An edge references a vertex outside `0..vertex_count`.
    #[error("edge #{edge} ({a}-{b}) references a vertex outside 0..{vertex_count}")]
    EdgeOutOfRange {
        edge: usize,
        a: VertexId,
        b: VertexId,
        vertex_count: usize,
    },

    /// The distance function produced NaN for an edge.
    #[error("edge #{edge} has a NaN weight")]
    InvalidWeight { edge: usize },

    /// Vertex indices must fit in a `u32` below the no-edge sentinel.
    #[error("graph has {0} vertices, more than the matrix can index")]
    TooManyVertices(usize),
}

/// Errors raised by the allocation tracker.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrackerError {
    /// A tracking session is already open; sessions do not nest.
    #[error("an allocation tracking session is already active")]
    SessionActive,

    /// Sample interval must be finite and non-negative.
    #[error("invalid sample interval: {0} ms")]
    InvalidInterval(f64),

    /// The background sampler thread could not be spawned.
    #[error("failed to spawn sampler thread: {0}")]
    SamplerSpawn(String),
}

/// Errors raised by [`run_benchmark`](crate::run_benchmark) before dispatch.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BenchmarkError {
    /// The graph has no vertices.
    #[error("graph has no vertices")]
    EmptyGraph,

    /// Source or destination is not a vertex of the graph.
    #[error("{role} vertex {index} is outside 0..{vertex_count}")]
    InvalidVertex {
        role: &'static str,
        index: VertexId,
        vertex_count: usize,
    },

    /// Memory tracking could not be started.
    #[error(transparent)]
    Tracker(#[from] TrackerError),
}
