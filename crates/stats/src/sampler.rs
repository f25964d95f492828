use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::counters::RenderCounters;

/// Number of per-second FPS readings retained for min/max display.
pub const WINDOW_CAPACITY: usize = 10;

/// Length of one measurement window.
const WINDOW_LENGTH: Duration = Duration::from_millis(1000);

/// Display-only approximation of the CPU share of a frame. The host does
/// not measure CPU time directly; the overlay shows this fixed fraction
/// of frame time instead.
const CPU_TIME_RATIO: f32 = 0.4;

/// Bounded FIFO of recent per-second FPS readings.
///
/// # Invariants
/// - `len() <= WINDOW_CAPACITY` at all times; the oldest reading is
///   evicted on overflow.
#[derive(Debug, Clone, Default)]
pub struct FpsWindow {
    readings: VecDeque<u32>,
}

impl FpsWindow {
    pub fn new() -> Self {
        Self {
            readings: VecDeque::with_capacity(WINDOW_CAPACITY),
        }
    }

    /// Append a reading, evicting the oldest when the window is full.
    pub fn push(&mut self, fps: u32) {
        if self.readings.len() == WINDOW_CAPACITY {
            self.readings.pop_front();
        }
        self.readings.push_back(fps);
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn min(&self) -> Option<u32> {
        self.readings.iter().copied().min()
    }

    pub fn max(&self) -> Option<u32> {
        self.readings.iter().copied().max()
    }

    /// Readings in chronological order, oldest first.
    pub fn readings(&self) -> impl Iterator<Item = u32> + '_ {
        self.readings.iter().copied()
    }
}

/// Immutable aggregated performance summary, republished once per second.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatsSnapshot {
    /// Frames per second over the window that just closed.
    pub fps: u32,
    /// Minimum FPS over the retained readings.
    pub fps_min: u32,
    /// Maximum FPS over the retained readings.
    pub fps_max: u32,
    /// Milliseconds per frame, derived from `fps`.
    pub frame_time_ms: f32,
    /// Approximated CPU milliseconds per frame (fixed fraction of
    /// `frame_time_ms`, not a measurement).
    pub cpu_time_ms: f32,
    pub draw_calls: u32,
    pub triangles: u64,
    pub geometries: u32,
    pub textures: u32,
    pub materials: u32,
}

/// Aggregates per-frame ticks into once-per-second [`StatsSnapshot`]s.
///
/// Created once per overlay mount; dropping it tears the overlay's
/// accumulator state down and nothing further is published.
#[derive(Debug)]
pub struct PerfSampler {
    /// Frames observed since the last window boundary.
    frames: u32,
    /// Wall-clock time of the last window boundary.
    boundary: Instant,
    window: FpsWindow,
    latest: Option<StatsSnapshot>,
}

impl PerfSampler {
    pub fn new(start: Instant) -> Self {
        Self {
            frames: 0,
            boundary: start,
            window: FpsWindow::new(),
            latest: None,
        }
    }

    /// Record one render-loop tick.
    ///
    /// Returns the new snapshot when `now` crosses the one-second boundary,
    /// `None` otherwise. All snapshot fields, including the counter
    /// readings, are taken at the moment the boundary is crossed.
    pub fn tick(&mut self, now: Instant, counters: &dyn RenderCounters) -> Option<StatsSnapshot> {
        self.frames += 1;

        let elapsed = now.saturating_duration_since(self.boundary);
        if elapsed < WINDOW_LENGTH {
            return None;
        }

        let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
        let fps = (self.frames as f64 * 1000.0 / elapsed_ms).round() as u32;

        self.window.push(fps);
        let fps_min = self.window.min().unwrap_or(fps);
        let fps_max = self.window.max().unwrap_or(fps);

        let frame_time_ms = if fps > 0 { 1000.0 / fps as f32 } else { 0.0 };

        let snapshot = StatsSnapshot {
            fps,
            fps_min,
            fps_max,
            frame_time_ms,
            cpu_time_ms: frame_time_ms * CPU_TIME_RATIO,
            draw_calls: counters.draw_calls(),
            triangles: counters.triangles(),
            geometries: counters.geometries(),
            textures: counters.textures(),
            materials: counters.materials(),
        };

        tracing::trace!(fps, fps_min, fps_max, "published stats snapshot");

        self.latest = Some(snapshot);
        self.frames = 0;
        self.boundary = now;
        Some(snapshot)
    }

    /// The most recently published snapshot, if a full window has elapsed.
    pub fn latest(&self) -> Option<&StatsSnapshot> {
        self.latest.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counters::CounterReport;

    fn at(start: Instant, ms: u64) -> Instant {
        start + Duration::from_millis(ms)
    }

    fn no_counters() -> CounterReport {
        CounterReport::default()
    }

    /// Drive one full window at a target FPS: `fps - 1` mid-window ticks,
    /// then the boundary tick exactly one second after `from`.
    fn run_window(
        sampler: &mut PerfSampler,
        start: Instant,
        from_ms: u64,
        fps: u32,
    ) -> Option<StatsSnapshot> {
        let counters = no_counters();
        for _ in 0..fps.saturating_sub(1) {
            assert!(
                sampler
                    .tick(at(start, from_ms + 500), &counters)
                    .is_none()
            );
        }
        sampler.tick(at(start, from_ms + 1000), &counters)
    }

    #[test]
    fn one_snapshot_per_boundary() {
        let start = Instant::now();
        let mut sampler = PerfSampler::new(start);
        let counters = no_counters();

        let mut published = 0;
        // Ticks every 10ms for 5 seconds span exactly 5 boundaries.
        for i in 1..=500u64 {
            if sampler.tick(at(start, i * 10), &counters).is_some() {
                published += 1;
            }
        }
        assert_eq!(published, 5);
    }

    #[test]
    fn no_publish_mid_window() {
        let start = Instant::now();
        let mut sampler = PerfSampler::new(start);
        let counters = no_counters();

        assert!(sampler.tick(at(start, 100), &counters).is_none());
        assert!(sampler.tick(at(start, 999), &counters).is_none());
        assert!(sampler.latest().is_none());
    }

    #[test]
    fn sixty_uniform_ticks_give_sixty_fps() {
        let start = Instant::now();
        let mut sampler = PerfSampler::new(start);
        let counters = no_counters();

        let mut snapshots = Vec::new();
        for i in 1..=60u64 {
            // 60 ticks spread uniformly over exactly 1000ms.
            let t = start + Duration::from_nanos(i * 1_000_000_000 / 60);
            if let Some(s) = sampler.tick(t, &counters) {
                snapshots.push(s);
            }
        }
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].fps, 60);
    }

    #[test]
    fn window_holds_last_ten_readings_in_order() {
        let start = Instant::now();
        let mut sampler = PerfSampler::new(start);

        // 15 boundary crossings at 30, 31, ..., 44 fps.
        for (i, fps) in (30u32..45).enumerate() {
            let snap = run_window(&mut sampler, start, i as u64 * 1000, fps);
            assert!(snap.is_some());
        }

        assert_eq!(sampler.window.len(), 10);
        let retained: Vec<u32> = sampler.window.readings().collect();
        assert_eq!(retained, (35u32..45).collect::<Vec<_>>());
    }

    #[test]
    fn window_never_exceeds_capacity() {
        let mut window = FpsWindow::new();
        for fps in 0..100 {
            window.push(fps);
            assert!(window.len() <= WINDOW_CAPACITY);
        }
    }

    #[test]
    fn min_max_bracket_current_fps() {
        let start = Instant::now();
        let mut sampler = PerfSampler::new(start);

        for (i, fps) in [60u32, 58, 61, 30, 59].iter().enumerate() {
            let snap = run_window(&mut sampler, start, i as u64 * 1000, *fps).unwrap();
            assert!(snap.fps_min <= snap.fps);
            assert!(snap.fps <= snap.fps_max);
        }
    }

    #[test]
    fn first_snapshot_min_max_fall_back_to_current() {
        let start = Instant::now();
        let mut sampler = PerfSampler::new(start);
        let snap = run_window(&mut sampler, start, 0, 60).unwrap();
        assert_eq!(snap.fps_min, 60);
        assert_eq!(snap.fps_max, 60);
    }

    #[test]
    fn frame_time_is_reciprocal_of_fps() {
        let start = Instant::now();
        let mut sampler = PerfSampler::new(start);
        let snap = run_window(&mut sampler, start, 0, 60).unwrap();
        assert!((snap.frame_time_ms - 16.67).abs() < 0.01);
    }

    #[test]
    fn zero_fps_does_not_divide() {
        let start = Instant::now();
        let mut sampler = PerfSampler::new(start);
        let counters = no_counters();

        // A single tick after 2001ms rounds to 0 fps.
        let snap = sampler.tick(at(start, 2001), &counters).unwrap();
        assert_eq!(snap.fps, 0);
        assert_eq!(snap.frame_time_ms, 0.0);
        assert_eq!(snap.cpu_time_ms, 0.0);
    }

    #[test]
    fn cpu_time_is_fixed_fraction_of_frame_time() {
        let start = Instant::now();
        let mut sampler = PerfSampler::new(start);
        let snap = run_window(&mut sampler, start, 0, 50).unwrap();
        assert!((snap.cpu_time_ms - snap.frame_time_ms * 0.4).abs() < f32::EPSILON);
    }

    #[test]
    fn counter_readings_reproduced_verbatim() {
        let start = Instant::now();
        let mut sampler = PerfSampler::new(start);
        let counters = CounterReport {
            draw_calls: 42,
            triangles: 10_000,
            geometries: 6,
            textures: 2,
            materials: 4,
        };

        let snap = sampler.tick(at(start, 1000), &counters).unwrap();
        assert_eq!(snap.draw_calls, 42);
        assert_eq!(snap.triangles, 10_000);
        assert_eq!(snap.geometries, 6);
        assert_eq!(snap.textures, 2);
        assert_eq!(snap.materials, 4);
    }

    #[test]
    fn latest_tracks_last_published() {
        let start = Instant::now();
        let mut sampler = PerfSampler::new(start);

        run_window(&mut sampler, start, 0, 60);
        run_window(&mut sampler, start, 1000, 30);
        assert_eq!(sampler.latest().unwrap().fps, 30);

        // Mid-window ticks leave the published snapshot untouched.
        sampler.tick(at(start, 2100), &no_counters());
        assert_eq!(sampler.latest().unwrap().fps, 30);
    }

    #[test]
    fn dropped_sampler_publishes_nothing_further() {
        let start = Instant::now();
        let mut sampler = PerfSampler::new(start);
        run_window(&mut sampler, start, 0, 60);
        sampler.tick(at(start, 1500), &no_counters());
        drop(sampler);
        // Teardown is synchronous; the accumulator and its pending
        // mid-window frames are gone with the value.
    }
}
