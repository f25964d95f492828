//! Frame statistics sampling for the performance overlay.
//!
//! Consumes a per-frame tick plus renderer-reported counters and publishes
//! a smoothed, windowed summary (FPS with min/max, frame time, draw calls,
//! resource counts) once per second.
//!
//! # Invariants
//! - The tick path never blocks and performs no unbounded allocation.
//! - The sampler only reads counters, never mutates renderer state.
//! - A snapshot's fields are all computed at the same window boundary.

mod counters;
mod sampler;

pub use counters::{CounterReport, RenderCounters};
pub use sampler::{FpsWindow, PerfSampler, StatsSnapshot, WINDOW_CAPACITY};
