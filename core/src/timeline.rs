use crate::benchmark::{AlgorithmRun, BenchmarkReport, EdgeStamp};
use crate::graph::EdgeId;
use crate::traversal::AlgorithmKind;

/// Extra playback time appended after the slowest run, as a fraction of it.
pub const PLAYBACK_PADDING: f64 = 0.1;

/// Real seconds one full playback cycle takes by default.
pub const DEFAULT_CYCLE_SECONDS: f64 = 5.0;

/// Display state of an edge at a point on the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EdgeState {
    Untouched,
    Traversed,
    Completed,
}

impl EdgeStamp {
    /// State at elapsed time `t` (nanoseconds). Completion wins over traversal.
    pub fn state_at(&self, t: f64) -> EdgeState {
        if self.completion_time.is_some_and(|c| t >= c) {
            EdgeState::Completed
        } else if self.traversal_time.is_some_and(|s| t >= s) {
            EdgeState::Traversed
        } else {
            EdgeState::Untouched
        }
    }
}

/// How far one algorithm has got at a given time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    pub traversed: usize,
    pub completed: usize,
}

/// Shared elapsed-time axis over every run in a report.
///
/// Each run's stamps are scaled to that run's own duration, so at a single
/// time `t` a fast algorithm may already be complete while a slow one is
/// still exploring.
#[derive(Debug, Clone, Copy)]
pub struct Timeline<'a> {
    report: &'a BenchmarkReport,
}

impl<'a> Timeline<'a> {
    pub fn new(report: &'a BenchmarkReport) -> Self {
        Self { report }
    }

    /// Length of the axis in nanoseconds: the slowest run.
    pub fn duration(&self) -> f64 {
        self.report.duration_ns as f64
    }

    fn ran(&self, kind: AlgorithmKind) -> Option<&'a AlgorithmRun> {
        self.report.run(kind).filter(|run| run.metadata.valid)
    }

    /// State of `edge` for `kind` at `t`. `None` if the algorithm did not
    /// run or the edge does not exist.
    pub fn edge_state(&self, kind: AlgorithmKind, edge: EdgeId, t: f64) -> Option<EdgeState> {
        let run = self.ran(kind)?;
        run.stamps.get(edge as usize).map(|stamp| stamp.state_at(t))
    }

    /// Counts of traversed (including completed) and completed edges for
    /// `kind` at `t`.
    pub fn progress(&self, kind: AlgorithmKind, t: f64) -> Option<Progress> {
        let run = self.ran(kind)?;
        let mut progress = Progress::default();
        for stamp in &run.stamps {
            match stamp.state_at(t) {
                EdgeState::Untouched => {}
                EdgeState::Traversed => progress.traversed += 1,
                EdgeState::Completed => {
                    progress.traversed += 1;
                    progress.completed += 1;
                }
            }
        }
        Some(progress)
    }
}

/// Playback clock over a timeline, advanced by real elapsed seconds.
///
/// The clock spans the timeline duration plus [`PLAYBACK_PADDING`]; one
/// full span takes `cycle_seconds` of real time. Starts paused and looping.
#[derive(Debug, Clone, PartialEq)]
pub struct Playback {
    length: f64,
    time: f64,
    cycle_seconds: f64,
    paused: bool,
    looping: bool,
}

impl Playback {
    pub fn new(timeline_duration: f64) -> Self {
        Self {
            length: timeline_duration.max(0.0) * (1.0 + PLAYBACK_PADDING),
            time: 0.0,
            cycle_seconds: DEFAULT_CYCLE_SECONDS,
            paused: true,
            looping: true,
        }
    }

    pub fn with_cycle_seconds(mut self, seconds: f64) -> Self {
        self.cycle_seconds = seconds;
        self
    }

    /// Advance by `real_seconds` and return the new time.
    pub fn advance(&mut self, real_seconds: f64) -> f64 {
        if self.length <= 0.0 {
            self.time = 0.0;
            return self.time;
        }
        if !self.paused && self.cycle_seconds > 0.0 {
            self.time += real_seconds / self.cycle_seconds * self.length;
        }
        if self.time > self.length {
            self.time = if self.looping {
                self.time % self.length
            } else {
                self.length
            };
        }
        self.time
    }

    pub fn seek(&mut self, t: f64) {
        self.time = t.clamp(0.0, self.length);
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn play(&mut self) {
        self.paused = false;
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn toggle_loop(&mut self) {
        self.looping = !self.looping;
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }
}
