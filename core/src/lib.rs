//! graph-race-core: instrumented shortest-path engine.
//!
//! Runs seven path-finding algorithms (BFS, DFS, two Dijkstras,
//! D'Esopo-Pape, Bellman-Ford, Floyd-Warshall) over one dense weighted
//! graph, strictly one after another, timing each and optionally sampling
//! the heap allocation volume it causes. Raw results are folded into
//! per-algorithm metadata and per-edge timeline stamps for playback.
//!
//! Rendering, input handling, and graph persistence live outside this
//! crate. Allocation sampling needs [`TrackingAllocator`] installed as the
//! binary's global allocator; without it every sample reads zero.

pub mod algorithms;
mod benchmark;
mod config;
mod error;
mod graph;
mod memory;
mod timeline;
mod traversal;

pub use benchmark::{run_benchmark, AlgorithmMetadata, AlgorithmRun, BenchmarkReport, EdgeStamp};
pub use config::{AlgorithmSettings, AlgorithmTable, BenchmarkConfig, DEFAULT_SAMPLE_INTERVAL_MS};
pub use error::{BenchmarkError, GraphError, Result, TrackerError};
pub use graph::{AdjacencyMatrix, Cell, Edge, EdgeId, SourceGraph, VertexId};
pub use memory::{
    cumulative_bytes, is_installed, live_bytes, SamplingConfig, SamplingMode, TrackingAllocator,
    TrackingSession,
};
pub use timeline::{EdgeState, Playback, Progress, Timeline, DEFAULT_CYCLE_SECONDS, PLAYBACK_PADDING};
pub use traversal::{Algorithm, AlgorithmKind, PathFinder, TraversalResult};
