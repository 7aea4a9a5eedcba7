use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::BenchmarkConfig;
use crate::error::{BenchmarkError, Result};
use crate::graph::{AdjacencyMatrix, VertexId};
use crate::memory::{SamplingConfig, TrackingSession};
use crate::timeline::PLAYBACK_PADDING;
use crate::traversal::{Algorithm, AlgorithmKind, TraversalResult};

/// Summary of one algorithm run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AlgorithmMetadata {
    /// The algorithm ran in this pass; false for disabled algorithms.
    pub valid: bool,
    /// A path was found (trivially true when source equals destination).
    pub found_path: bool,
    /// Wall-clock time of `find_path` alone.
    pub duration_ns: u64,
    /// Sum of edge weights along the final path.
    pub total_distance: f64,
    /// Last cumulative-allocated sample, 0 when untracked.
    pub peak_memory_usage: usize,
    /// Distinct traversed edges over all edges, in `0.0..=1.0`.
    pub graph_traversal_percentage: f64,
    pub memory_tracking_data: Vec<usize>,
}

impl AlgorithmMetadata {
    pub fn duration(&self) -> Duration {
        Duration::from_nanos(self.duration_ns)
    }
}

/// When, within its own run, an edge was first traversed and when it was
/// confirmed as part of the final path. Nanoseconds from the run's start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct EdgeStamp {
    pub traversal_time: Option<f64>,
    pub completion_time: Option<f64>,
}

/// One algorithm's contribution to a benchmark pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlgorithmRun {
    pub kind: AlgorithmKind,
    pub metadata: AlgorithmMetadata,
    pub result: TraversalResult,
    /// Indexed by edge id; one entry per edge of the graph, or none when
    /// the algorithm was skipped.
    pub stamps: Vec<EdgeStamp>,
}

impl AlgorithmRun {
    /// Fold a raw result into metadata and per-edge timeline stamps.
    ///
    /// Traversal steps are spread linearly over the run's own duration:
    /// step `i` of `n` lands at `i / n * duration`. A repeated edge takes
    /// the stamp of its last step. Every final-path edge completes at
    /// `duration`.
    pub fn from_result(
        kind: AlgorithmKind,
        graph: &AdjacencyMatrix,
        result: TraversalResult,
        elapsed: Duration,
        trivial_path: bool,
    ) -> Self {
        let duration_ns = elapsed.as_nanos() as f64;
        let mut stamps = vec![EdgeStamp::default(); graph.edge_count()];

        let total_steps = result.traversed_edges.len() as f64;
        for (step, &edge) in result.traversed_edges.iter().enumerate() {
            if let Some(stamp) = stamps.get_mut(edge as usize) {
                stamp.traversal_time = Some(step as f64 / total_steps * duration_ns);
            }
        }
        for &edge in &result.final_edges {
            if let Some(stamp) = stamps.get_mut(edge as usize) {
                stamp.completion_time = Some(duration_ns);
            }
        }

        let unique_traversed = stamps.iter().filter(|s| s.traversal_time.is_some()).count();
        let graph_traversal_percentage = if stamps.is_empty() {
            0.0
        } else {
            unique_traversed as f64 / stamps.len() as f64
        };

        let metadata = AlgorithmMetadata {
            valid: true,
            found_path: trivial_path || !result.final_edges.is_empty(),
            duration_ns: elapsed.as_nanos() as u64,
            total_distance: result
                .final_edges
                .iter()
                .map(|&e| graph.edge_weight(e) as f64)
                .sum(),
            peak_memory_usage: result.memory.last().copied().unwrap_or(0),
            graph_traversal_percentage,
            memory_tracking_data: result.memory.clone(),
        };

        Self {
            kind,
            metadata,
            result,
            stamps,
        }
    }

    /// Placeholder for an algorithm disabled in this pass.
    pub fn skipped(kind: AlgorithmKind) -> Self {
        Self {
            kind,
            metadata: AlgorithmMetadata::default(),
            result: TraversalResult::empty(),
            stamps: Vec::new(),
        }
    }

    pub fn hop_count(&self) -> usize {
        self.result.final_edges.len()
    }
}

/// Aggregate output of [`run_benchmark`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkReport {
    pub source: VertexId,
    pub destination: VertexId,
    pub vertex_count: usize,
    pub edge_count: usize,
    /// One entry per algorithm, indexed by [`AlgorithmKind::index`].
    /// Disabled algorithms carry `valid == false`.
    pub runs: Vec<AlgorithmRun>,
    /// Longest run duration; the shared timeline's length.
    pub duration_ns: u64,
}

impl BenchmarkReport {
    pub fn run(&self, kind: AlgorithmKind) -> Option<&AlgorithmRun> {
        self.runs.iter().find(|r| r.kind == kind)
    }

    /// Runs that actually executed.
    pub fn valid_runs(&self) -> impl Iterator<Item = &AlgorithmRun> {
        self.runs.iter().filter(|r| r.metadata.valid)
    }

    /// Quickest run that found a path.
    pub fn fastest(&self) -> Option<&AlgorithmRun> {
        self.runs
            .iter()
            .filter(|r| r.metadata.found_path)
            .min_by_key(|r| r.metadata.duration_ns)
    }

    /// Shared timeline length with the playback tail added.
    pub fn playback_duration(&self) -> f64 {
        self.duration_ns as f64 * (1.0 + PLAYBACK_PADDING)
    }
}

/// Run every enabled algorithm once, one after another, and aggregate.
///
/// Source and destination are validated up front; algorithms never see
/// out-of-range vertices. Each run is timed around `find_path` only and,
/// when tracking applies, wrapped in its own [`TrackingSession`]. The
/// sample interval is only checked when some algorithm is tracked.
pub fn run_benchmark(
    graph: &AdjacencyMatrix,
    source: VertexId,
    destination: VertexId,
    config: &BenchmarkConfig,
) -> Result<BenchmarkReport> {
    if graph.is_empty() {
        return Err(BenchmarkError::EmptyGraph);
    }
    for (role, index) in [("source", source), ("destination", destination)] {
        if !graph.contains_vertex(index) {
            return Err(BenchmarkError::InvalidVertex {
                role,
                index,
                vertex_count: graph.vertex_count(),
            });
        }
    }
    let sampling = if AlgorithmKind::ALL.iter().any(|&kind| config.tracks(kind)) {
        Some(config.sampling_config()?)
    } else {
        None
    };

    info!(
        vertices = graph.vertex_count(),
        edges = graph.edge_count(),
        source,
        destination,
        "starting benchmark pass"
    );

    let mut runs = Vec::with_capacity(AlgorithmKind::COUNT);
    let mut longest = 0u64;

    for kind in AlgorithmKind::ALL {
        if !config.algorithms.get(kind).enabled {
            debug!(algorithm = %kind, "algorithm disabled");
            runs.push(AlgorithmRun::skipped(kind));
            continue;
        }
        let tracking = sampling.filter(|_| config.tracks(kind));
        let (result, elapsed) = measure(kind, graph, source, destination, tracking)?;
        let run = AlgorithmRun::from_result(kind, graph, result, elapsed, source == destination);

        debug!(
            algorithm = %kind,
            duration_ns = run.metadata.duration_ns,
            traversed = run.result.traversed_edges.len(),
            hops = run.hop_count(),
            distance = run.metadata.total_distance,
            peak_bytes = run.metadata.peak_memory_usage,
            "algorithm finished"
        );
        if !run.metadata.found_path {
            warn!(algorithm = %kind, source, destination, "no path found");
        }

        longest = longest.max(run.metadata.duration_ns);
        runs.push(run);
    }

    info!(
        runs = runs.iter().filter(|r| r.metadata.valid).count(),
        duration_ns = longest,
        "benchmark pass complete"
    );

    Ok(BenchmarkReport {
        source,
        destination,
        vertex_count: graph.vertex_count(),
        edge_count: graph.edge_count(),
        runs,
        duration_ns: longest,
    })
}

/// Time one `find_path` call, optionally inside a tracking session.
fn measure(
    kind: AlgorithmKind,
    graph: &AdjacencyMatrix,
    source: VertexId,
    destination: VertexId,
    tracking: Option<SamplingConfig>,
) -> Result<(TraversalResult, Duration)> {
    let mut algorithm = Algorithm::new(kind);

    let session = tracking.map(TrackingSession::begin).transpose()?;
    let start = Instant::now();
    algorithm.find_path(graph, source, destination);
    let elapsed = start.elapsed();
    let samples = session.map(TrackingSession::end).unwrap_or_default();

    let mut result = algorithm.into_result();
    result.memory = samples;
    Ok((result, elapsed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AlgorithmTable;
    use crate::error::TrackerError;
    use serial_test::serial;

    fn make_cycle(n: u32) -> AdjacencyMatrix {
        AdjacencyMatrix::from_weighted_edges(n as usize, (0..n).map(|i| (i, (i + 1) % n, 1.0))).unwrap()
    }

    fn untracked() -> BenchmarkConfig {
        BenchmarkConfig {
            track_memory: false,
            ..BenchmarkConfig::default()
        }
    }

    #[test]
    fn test_rejects_empty_graph() {
        let g = AdjacencyMatrix::from_weighted_edges(0, []).unwrap();
        assert_eq!(run_benchmark(&g, 0, 0, &untracked()).unwrap_err(), BenchmarkError::EmptyGraph);
    }

    #[test]
    fn test_rejects_out_of_range_vertices() {
        let g = make_cycle(4);
        let err = run_benchmark(&g, 0, 4, &untracked()).unwrap_err();
        assert!(matches!(
            err,
            BenchmarkError::InvalidVertex { role: "destination", index: 4, vertex_count: 4 }
        ));
        let err = run_benchmark(&g, 9, 0, &untracked()).unwrap_err();
        assert!(matches!(err, BenchmarkError::InvalidVertex { role: "source", .. }));
    }

    #[test]
    fn test_runs_in_fixed_order() {
        let g = make_cycle(4);
        let report = run_benchmark(&g, 0, 2, &untracked()).unwrap();
        let kinds: Vec<_> = report.runs.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, AlgorithmKind::ALL.to_vec());
        assert!(report.runs.iter().all(|r| r.metadata.valid));
    }

    #[test]
    fn test_disabled_algorithms_skipped() {
        let g = make_cycle(4);
        let config = BenchmarkConfig {
            algorithms: AlgorithmTable::only(&[AlgorithmKind::Bfs]),
            ..untracked()
        };
        let report = run_benchmark(&g, 0, 2, &config).unwrap();
        assert_eq!(report.runs.len(), AlgorithmKind::COUNT);
        assert_eq!(report.valid_runs().count(), 1);

        let dfs = report.run(AlgorithmKind::Dfs).unwrap();
        assert!(!dfs.metadata.valid);
        assert!(!dfs.metadata.found_path);
        assert!(dfs.stamps.is_empty());
        assert!(report.run(AlgorithmKind::Bfs).unwrap().metadata.valid);
    }

    #[test]
    fn test_runs_indexed_by_kind() {
        let g = make_cycle(4);
        let config = BenchmarkConfig {
            algorithms: AlgorithmTable::only(&[AlgorithmKind::FloydWarshall]),
            ..untracked()
        };
        let report = run_benchmark(&g, 0, 2, &config).unwrap();
        for kind in AlgorithmKind::ALL {
            let run = &report.runs[kind.index()];
            assert_eq!(run.kind, kind);
            assert_eq!(run.metadata.valid, kind == AlgorithmKind::FloydWarshall);
        }
        assert_eq!(report.fastest().map(|r| r.kind), Some(AlgorithmKind::FloydWarshall));
    }

    #[test]
    fn test_metadata_for_four_cycle() {
        let g = make_cycle(4);
        let report = run_benchmark(&g, 0, 2, &untracked()).unwrap();
        for run in &report.runs {
            assert!(run.metadata.found_path, "{}", run.kind);
            assert_eq!(run.metadata.total_distance, 2.0, "{}", run.kind);
            assert_eq!(run.hop_count(), 2, "{}", run.kind);
            assert_eq!(run.metadata.peak_memory_usage, 0);
            assert!(run.metadata.memory_tracking_data.is_empty());
            assert!(run.metadata.graph_traversal_percentage <= 1.0);
        }
        assert_eq!(
            report.duration_ns,
            report.runs.iter().map(|r| r.metadata.duration_ns).max().unwrap()
        );
    }

    #[test]
    fn test_stamps_within_run_duration() {
        let g = make_cycle(6);
        let report = run_benchmark(&g, 0, 3, &untracked()).unwrap();
        for run in &report.runs {
            let duration = run.metadata.duration_ns as f64;
            assert_eq!(run.stamps.len(), g.edge_count());
            for stamp in &run.stamps {
                if let Some(t) = stamp.traversal_time {
                    assert!((0.0..=duration).contains(&t), "{}", run.kind);
                }
            }
            for &edge in &run.result.final_edges {
                assert_eq!(run.stamps[edge as usize].completion_time, Some(duration));
            }
        }
    }

    #[test]
    fn test_stamps_interpolate_and_keep_last() {
        let g = AdjacencyMatrix::from_weighted_edges(3, [(0, 1, 1.0), (1, 2, 1.0)]).unwrap();
        let result = TraversalResult {
            traversed_edges: vec![0, 1, 0, 1],
            final_edges: vec![0, 1],
            memory: vec![0, 64, 128],
        };
        let run = AlgorithmRun::from_result(
            AlgorithmKind::BellmanFord,
            &g,
            result,
            Duration::from_nanos(400),
            false,
        );
        assert_eq!(run.stamps[0].traversal_time, Some(200.0));
        assert_eq!(run.stamps[1].traversal_time, Some(300.0));
        assert_eq!(run.stamps[1].completion_time, Some(400.0));
        assert_eq!(run.metadata.graph_traversal_percentage, 1.0);
        assert_eq!(run.metadata.peak_memory_usage, 128);
        assert_eq!(run.metadata.memory_tracking_data, vec![0, 64, 128]);
        assert_eq!(run.metadata.duration(), Duration::from_nanos(400));
    }

    #[test]
    fn test_disconnected_reports_no_path() {
        let g = AdjacencyMatrix::from_weighted_edges(4, [(0, 1, 1.0), (2, 3, 1.0)]).unwrap();
        let report = run_benchmark(&g, 0, 3, &untracked()).unwrap();
        for run in &report.runs {
            assert!(!run.metadata.found_path, "{}", run.kind);
            assert_eq!(run.metadata.total_distance, 0.0);
            assert!(run.stamps.iter().all(|s| s.completion_time.is_none()));
        }
        assert!(report.fastest().is_none());
    }

    #[test]
    fn test_same_source_and_destination() {
        let g = make_cycle(5);
        let report = run_benchmark(&g, 2, 2, &untracked()).unwrap();
        for run in &report.runs {
            assert!(run.metadata.found_path);
            assert_eq!(run.hop_count(), 0);
        }
    }

    #[test]
    #[serial]
    fn test_tracked_runs_carry_samples() {
        let g = make_cycle(8);
        let config = BenchmarkConfig {
            algorithms: AlgorithmTable::only(&[AlgorithmKind::DijkstraQueue]),
            ..BenchmarkConfig::default()
        };
        let report = run_benchmark(&g, 0, 4, &config).unwrap();
        let run = report.run(AlgorithmKind::DijkstraQueue).unwrap();
        assert!(run.metadata.memory_tracking_data.len() >= 2);
        assert_eq!(
            Some(&run.metadata.peak_memory_usage),
            run.metadata.memory_tracking_data.iter().max()
        );
    }

    #[test]
    #[serial]
    fn test_open_session_surfaces_tracker_error() {
        let g = make_cycle(4);
        let config = BenchmarkConfig::default();
        let held = TrackingSession::begin(config.sampling_config().unwrap()).unwrap();
        let err = run_benchmark(&g, 0, 2, &config).unwrap_err();
        assert!(matches!(err, BenchmarkError::Tracker(_)));
        held.end();
    }

    #[test]
    fn test_untracked_pass_ignores_bad_interval() {
        let g = make_cycle(4);
        let config = BenchmarkConfig {
            sample_interval_ms: f64::NAN,
            ..untracked()
        };
        assert!(run_benchmark(&g, 0, 2, &config).is_ok());

        let mut disabled = BenchmarkConfig {
            sample_interval_ms: -1.0,
            algorithms: AlgorithmTable::only(&[AlgorithmKind::Bfs]),
            ..BenchmarkConfig::default()
        };
        disabled.algorithms.get_mut(AlgorithmKind::Bfs).track_memory = false;
        assert!(run_benchmark(&g, 0, 2, &disabled).is_ok());
    }

    #[test]
    #[serial]
    fn test_tracked_pass_rejects_bad_interval() {
        let g = make_cycle(4);
        let config = BenchmarkConfig {
            sample_interval_ms: f64::NAN,
            ..BenchmarkConfig::default()
        };
        assert!(matches!(
            run_benchmark(&g, 0, 2, &config).unwrap_err(),
            BenchmarkError::Tracker(TrackerError::InvalidInterval(_))
        ));
    }

    #[test]
    fn test_playback_duration_padded() {
        let g = make_cycle(4);
        let mut report = run_benchmark(&g, 0, 2, &untracked()).unwrap();
        report.duration_ns = 1000;
        assert!((report.playback_duration() - 1100.0).abs() < 1e-9);
    }
}
