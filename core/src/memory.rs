//! Process-wide allocation tracking.
//!
//! [`TrackingAllocator`] wraps another global allocator and reports every
//! allocation and deallocation to a set of static counters. A binary opts in
//! by installing it:
//!
//! ```rust,ignore
//! use std::alloc::System;
//! use graph_race_core::TrackingAllocator;
//!
//! #[global_allocator]
//! static ALLOCATOR: TrackingAllocator<System> = TrackingAllocator::system();
//! ```
//!
//! A [`TrackingSession`] opens a measurement window. While it is open, the
//! bytes allocated are summed into a monotone "cumulative allocated" counter
//! (frees never lower it) and snapshotted into a sample series, either from
//! inside the allocation hook or from a background sampler thread. Only one
//! session can be open at a time.
//!
//! Allocations made by the tracker itself (growing the sample buffer, the
//! sampler thread's own work) run with a thread-local suppression flag set
//! and are not counted.
//!
//! If the inner allocator returns null the wrapper passes it through; the
//! standard library then reports the failure through `handle_alloc_error`,
//! which aborts the process.

use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;
use std::sync::atomic::{AtomicBool, AtomicIsize, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::TrackerError;

/// Samples reserved up front so the buffer rarely grows mid-run.
const INITIAL_SAMPLE_CAPACITY: usize = 4096;

/// Hard cap on samples per session.
const MAX_SAMPLES: usize = 1 << 20;

/// Shortest cadence for the background sampler thread.
const MIN_BACKGROUND_PERIOD: Duration = Duration::from_micros(50);

static INSTALLED: AtomicBool = AtomicBool::new(false);
static ENABLED: AtomicBool = AtomicBool::new(false);
static INLINE_SAMPLING: AtomicBool = AtomicBool::new(false);
static SESSION_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Net bytes currently allocated through the wrapper, since process start.
static LIVE: AtomicIsize = AtomicIsize::new(0);
/// Bytes allocated since the current session began.
static CUMULATIVE: AtomicUsize = AtomicUsize::new(0);

static INTERVAL_NS: AtomicU64 = AtomicU64::new(0);
static LAST_SAMPLE_NS: AtomicU64 = AtomicU64::new(0);
static EPOCH: OnceLock<Instant> = OnceLock::new();

static SAMPLES: Mutex<Vec<usize>> = parking_lot::const_mutex(Vec::new());

thread_local! {
    /// Set while the tracker's own code runs on this thread.
    static SUPPRESSED: Cell<bool> = const { Cell::new(false) };
}

/// Global allocator wrapper feeding the tracker's counters.
#[derive(Debug, Default)]
pub struct TrackingAllocator<A = System> {
    inner: A,
}

impl TrackingAllocator<System> {
    pub const fn system() -> Self {
        Self { inner: System }
    }
}

impl<A> TrackingAllocator<A> {
    pub const fn new(inner: A) -> Self {
        Self { inner }
    }
}

// SAFETY: every call is forwarded unchanged to `inner`; the hooks only touch
// atomics, a thread-local `Cell`, and a non-blocking `try_lock`.
unsafe impl<A: GlobalAlloc> GlobalAlloc for TrackingAllocator<A> {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = self.inner.alloc(layout);
        if !ptr.is_null() {
            on_alloc(layout.size());
        }
        ptr
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        let ptr = self.inner.alloc_zeroed(layout);
        if !ptr.is_null() {
            on_alloc(layout.size());
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        self.inner.dealloc(ptr, layout);
        on_dealloc(layout.size());
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let new_ptr = self.inner.realloc(ptr, layout, new_size);
        if !new_ptr.is_null() {
            on_dealloc(layout.size());
            on_alloc(new_size);
        }
        new_ptr
    }
}

#[inline]
fn on_alloc(size: usize) {
    if !INSTALLED.load(Ordering::Relaxed) {
        INSTALLED.store(true, Ordering::Relaxed);
    }
    LIVE.fetch_add(size as isize, Ordering::Relaxed);

    if !ENABLED.load(Ordering::Acquire) || is_suppressed() {
        return;
    }

    let total = CUMULATIVE.fetch_add(size, Ordering::Relaxed) + size;
    if INLINE_SAMPLING.load(Ordering::Relaxed) {
        maybe_sample(total);
    }
}

#[inline]
fn on_dealloc(size: usize) {
    LIVE.fetch_sub(size as isize, Ordering::Relaxed);
}

/// Suppressed threads, and threads whose locals are already torn down,
/// are not counted.
#[inline]
fn is_suppressed() -> bool {
    SUPPRESSED.try_with(Cell::get).unwrap_or(true)
}

/// Run `f` with this thread's allocations hidden from the tracker.
fn suppressed<R>(f: impl FnOnce() -> R) -> R {
    let previous = SUPPRESSED.try_with(|s| s.replace(true)).unwrap_or(true);
    let result = f();
    let _ = SUPPRESSED.try_with(|s| s.set(previous));
    result
}

fn elapsed_ns() -> Option<u64> {
    EPOCH.get().map(|epoch| epoch.elapsed().as_nanos() as u64)
}

/// Push `total` if the interval has elapsed since the last sample.
///
/// The compare-exchange lets exactly one thread claim each slot; losing
/// the race or finding the buffer locked just skips this sample.
fn maybe_sample(total: usize) {
    let Some(now) = elapsed_ns() else {
        return;
    };
    let last = LAST_SAMPLE_NS.load(Ordering::Relaxed);
    if now.saturating_sub(last) < INTERVAL_NS.load(Ordering::Relaxed) {
        return;
    }
    if LAST_SAMPLE_NS
        .compare_exchange(last, now, Ordering::AcqRel, Ordering::Relaxed)
        .is_err()
    {
        return;
    }

    suppressed(|| {
        if let Some(mut samples) = SAMPLES.try_lock() {
            if samples.len() < MAX_SAMPLES {
                samples.push(total);
            }
        }
    });
}

/// Net bytes allocated through [`TrackingAllocator`] and not yet freed.
pub fn live_bytes() -> isize {
    LIVE.load(Ordering::Relaxed)
}

/// Bytes allocated since the current (or last) session began.
pub fn cumulative_bytes() -> usize {
    CUMULATIVE.load(Ordering::Relaxed)
}

/// Whether any allocation has gone through [`TrackingAllocator`], i.e. it
/// is installed as the global allocator.
pub fn is_installed() -> bool {
    INSTALLED.load(Ordering::Relaxed)
}

/// Where samples are taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplingMode {
    /// Inside the allocation hook, whenever the interval has elapsed.
    #[default]
    Inline,
    /// From a dedicated thread polling the counter every interval.
    Background,
}

/// Sample cadence and strategy for one session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingConfig {
    pub interval: Duration,
    pub mode: SamplingMode,
}

impl SamplingConfig {
    pub fn from_millis(interval_ms: f64, mode: SamplingMode) -> Result<Self, TrackerError> {
        if !interval_ms.is_finite() || interval_ms < 0.0 {
            return Err(TrackerError::InvalidInterval(interval_ms));
        }
        Ok(Self {
            interval: Duration::from_nanos((interval_ms * 1_000_000.0).round() as u64),
            mode,
        })
    }
}

/// An open measurement window. At most one exists at a time.
///
/// Dropping a session without calling [`end`](Self::end) closes it and
/// discards the samples.
#[derive(Debug)]
pub struct TrackingSession {
    sampler: Option<Sampler>,
    open: bool,
}

#[derive(Debug)]
struct Sampler {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<Vec<usize>>,
}

impl TrackingSession {
    /// Reset the counters and start tracking. Call immediately before the
    /// measured work.
    pub fn begin(config: SamplingConfig) -> Result<Self, TrackerError> {
        if SESSION_ACTIVE
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(TrackerError::SessionActive);
        }

        // Setup allocations happen before ENABLED flips and are not counted.
        let epoch = *EPOCH.get_or_init(Instant::now);
        {
            let mut samples = SAMPLES.lock();
            samples.clear();
            samples.reserve(INITIAL_SAMPLE_CAPACITY);
            samples.push(0);
        }
        CUMULATIVE.store(0, Ordering::Relaxed);
        INTERVAL_NS.store(config.interval.as_nanos() as u64, Ordering::Relaxed);
        LAST_SAMPLE_NS.store(epoch.elapsed().as_nanos() as u64, Ordering::Relaxed);
        INLINE_SAMPLING.store(config.mode == SamplingMode::Inline, Ordering::Relaxed);

        let sampler = match config.mode {
            SamplingMode::Inline => None,
            SamplingMode::Background => match spawn_sampler(config.interval) {
                Ok(sampler) => Some(sampler),
                Err(err) => {
                    SESSION_ACTIVE.store(false, Ordering::Release);
                    return Err(err);
                }
            },
        };

        ENABLED.store(true, Ordering::Release);
        Ok(Self {
            sampler,
            open: true,
        })
    }

    /// Stop tracking and return the samples.
    ///
    /// The series starts at 0 and ends with the final cumulative count,
    /// which is never below any earlier sample.
    pub fn end(mut self) -> Vec<usize> {
        self.close()
    }

    fn close(&mut self) -> Vec<usize> {
        if !self.open {
            return Vec::new();
        }
        ENABLED.store(false, Ordering::Release);
        self.open = false;

        let mut samples = match self.sampler.take() {
            Some(sampler) => {
                sampler.stop.store(true, Ordering::Release);
                let mut polled = sampler.handle.join().unwrap_or_default();
                polled.insert(0, 0);
                polled
            }
            None => std::mem::take(&mut *SAMPLES.lock()),
        };

        // A racing hook may have pushed a total newer than our read.
        let last = samples
            .iter()
            .copied()
            .max()
            .unwrap_or(0)
            .max(CUMULATIVE.load(Ordering::Relaxed));
        samples.push(last);

        SESSION_ACTIVE.store(false, Ordering::Release);
        samples
    }
}

impl Drop for TrackingSession {
    fn drop(&mut self) {
        self.close();
    }
}

fn spawn_sampler(interval: Duration) -> Result<Sampler, TrackerError> {
    let period = interval.max(MIN_BACKGROUND_PERIOD);
    let stop = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&stop);

    let handle = thread::Builder::new()
        .name("alloc-sampler".into())
        .spawn(move || {
            let _ = SUPPRESSED.try_with(|s| s.set(true));
            let mut samples = Vec::with_capacity(INITIAL_SAMPLE_CAPACITY);
            while !flag.load(Ordering::Acquire) {
                thread::sleep(period);
                if samples.len() < MAX_SAMPLES {
                    samples.push(CUMULATIVE.load(Ordering::Relaxed));
                }
            }
            samples
        })
        .map_err(|err| TrackerError::SamplerSpawn(err.to_string()))?;

    Ok(Sampler { stop, handle })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    // The lib test binary runs on the plain system allocator, so counts stay
    // at zero here; tests/memory_tracking.rs covers the hook itself.

    #[test]
    #[serial]
    fn test_session_samples_bracketed() {
        let config = SamplingConfig::from_millis(0.0, SamplingMode::Inline).unwrap();
        let session = TrackingSession::begin(config).unwrap();
        let samples = session.end();
        assert!(samples.len() >= 2);
        assert_eq!(samples[0], 0);
        assert_eq!(samples.last(), samples.iter().max());
    }

    #[test]
    #[serial]
    fn test_sessions_do_not_nest() {
        let config = SamplingConfig::from_millis(1.0, SamplingMode::Inline).unwrap();
        let first = TrackingSession::begin(config).unwrap();
        assert_eq!(TrackingSession::begin(config).unwrap_err(), TrackerError::SessionActive);
        first.end();
        TrackingSession::begin(config).unwrap().end();
    }

    #[test]
    #[serial]
    fn test_drop_closes_session() {
        let config = SamplingConfig::from_millis(1.0, SamplingMode::Inline).unwrap();
        drop(TrackingSession::begin(config).unwrap());
        assert!(!ENABLED.load(Ordering::Acquire));
        TrackingSession::begin(config).unwrap().end();
    }

    #[test]
    #[serial]
    fn test_background_sampler_joins() {
        let config = SamplingConfig::from_millis(0.1, SamplingMode::Background).unwrap();
        let session = TrackingSession::begin(config).unwrap();
        thread::sleep(Duration::from_millis(2));
        let samples = session.end();
        assert!(samples.len() >= 2);
        assert_eq!(samples[0], 0);
        assert_eq!(samples.last(), samples.iter().max());
    }

    #[test]
    fn test_invalid_interval() {
        assert!(SamplingConfig::from_millis(-1.0, SamplingMode::Inline).is_err());
        assert!(SamplingConfig::from_millis(f64::NAN, SamplingMode::Inline).is_err());
        let config = SamplingConfig::from_millis(2.5, SamplingMode::Background).unwrap();
        assert_eq!(config.interval, Duration::from_micros(2500));
    }

    #[test]
    fn test_suppressed_restores_flag() {
        assert!(!is_suppressed());
        suppressed(|| assert!(is_suppressed()));
        assert!(!is_suppressed());
    }
}
