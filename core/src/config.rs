//! Benchmark configuration.
//!
//! Every section is optional when deserialized; missing fields take the
//! defaults below (all algorithms enabled, memory tracking on, inline
//! sampling every 0.01 ms).
//!
//! ```toml
//! track_memory = true
//! sample_interval_ms = 0.01
//! sampling = "inline"
//!
//! [algorithms.floyd_warshall]
//! enabled = false
//!
//! [algorithms.bellman_ford]
//! track_memory = false
//! ```

use serde::{Deserialize, Serialize};

use crate::error::TrackerError;
use crate::memory::{SamplingConfig, SamplingMode};
use crate::traversal::AlgorithmKind;

pub const DEFAULT_SAMPLE_INTERVAL_MS: f64 = 0.01;

/// Per-algorithm switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlgorithmSettings {
    pub enabled: bool,
    /// Only honoured when [`BenchmarkConfig::track_memory`] is also set.
    pub track_memory: bool,
}

impl Default for AlgorithmSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            track_memory: true,
        }
    }
}

/// One [`AlgorithmSettings`] per [`AlgorithmKind`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlgorithmTable {
    pub bfs: AlgorithmSettings,
    pub dfs: AlgorithmSettings,
    pub dijkstra_array: AlgorithmSettings,
    pub dijkstra_queue: AlgorithmSettings,
    pub desopo_pape: AlgorithmSettings,
    pub bellman_ford: AlgorithmSettings,
    pub floyd_warshall: AlgorithmSettings,
}

impl AlgorithmTable {
    /// Table with only `kinds` enabled.
    pub fn only(kinds: &[AlgorithmKind]) -> Self {
        let mut table = Self::default();
        for kind in AlgorithmKind::ALL {
            table.get_mut(kind).enabled = kinds.contains(&kind);
        }
        table
    }

    pub fn get(&self, kind: AlgorithmKind) -> &AlgorithmSettings {
        match kind {
            AlgorithmKind::Bfs => &self.bfs,
            AlgorithmKind::Dfs => &self.dfs,
            AlgorithmKind::DijkstraArray => &self.dijkstra_array,
            AlgorithmKind::DijkstraQueue => &self.dijkstra_queue,
            AlgorithmKind::DesopoPape => &self.desopo_pape,
            AlgorithmKind::BellmanFord => &self.bellman_ford,
            AlgorithmKind::FloydWarshall => &self.floyd_warshall,
        }
    }

    pub fn get_mut(&mut self, kind: AlgorithmKind) -> &mut AlgorithmSettings {
        match kind {
            AlgorithmKind::Bfs => &mut self.bfs,
            AlgorithmKind::Dfs => &mut self.dfs,
            AlgorithmKind::DijkstraArray => &mut self.dijkstra_array,
            AlgorithmKind::DijkstraQueue => &mut self.dijkstra_queue,
            AlgorithmKind::DesopoPape => &mut self.desopo_pape,
            AlgorithmKind::BellmanFord => &mut self.bellman_ford,
            AlgorithmKind::FloydWarshall => &mut self.floyd_warshall,
        }
    }

    pub fn enabled(&self) -> impl Iterator<Item = AlgorithmKind> + '_ {
        AlgorithmKind::ALL
            .into_iter()
            .filter(move |&kind| self.get(kind).enabled)
    }
}

/// Everything one benchmark pass needs besides the graph and endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkConfig {
    pub algorithms: AlgorithmTable,
    /// Global switch; per-algorithm `track_memory` is ignored when off.
    pub track_memory: bool,
    pub sample_interval_ms: f64,
    pub sampling: SamplingMode,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            algorithms: AlgorithmTable::default(),
            track_memory: true,
            sample_interval_ms: DEFAULT_SAMPLE_INTERVAL_MS,
            sampling: SamplingMode::default(),
        }
    }
}

impl BenchmarkConfig {
    /// Whether `kind` runs inside a tracking session.
    pub fn tracks(&self, kind: AlgorithmKind) -> bool {
        let settings = self.algorithms.get(kind);
        self.track_memory && settings.enabled && settings.track_memory
    }

    pub fn sampling_config(&self) -> Result<SamplingConfig, TrackerError> {
        SamplingConfig::from_millis(self.sample_interval_ms, self.sampling)
    }
}
