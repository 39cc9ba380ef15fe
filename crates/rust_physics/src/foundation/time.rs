//! Time management utilities
//!
//! [`Timer`] measures wall-clock frame deltas; [`FixedTimestep`] turns those
//! variable deltas into a whole number of fixed simulation ticks.

use std::time::Instant;

/// High-precision timer for frame timing
pub struct Timer {
    last_frame: Instant,
    delta_time: f32,
    total_time: f32,
    frame_count: u64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Create a new timer
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            last_frame: now,
            delta_time: 0.0,
            total_time: 0.0,
            frame_count: 0,
        }
    }

    /// Update the timer (should be called once per frame)
    pub fn update(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_frame);
        self.delta_time = elapsed.as_secs_f32();
        self.total_time += self.delta_time;
        self.last_frame = now;
        self.frame_count += 1;
    }

    /// Get the time since the last frame in seconds
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Get the total elapsed time since timer creation
    pub fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Get the current frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

/// Fixed-timestep accumulator for the simulation clock
///
/// Frame time is accumulated and drained in steps of `fixed_dt`. When more
/// than `max_ticks` steps are pending the clock is resynchronised: the
/// backlog is dropped instead of being simulated, which keeps a slow frame
/// from snowballing into ever longer catch-up frames.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    fixed_dt: f32,
    max_ticks: u32,
    accumulator: f32,
    resync_count: u64,
}

impl FixedTimestep {
    /// Create an accumulator ticking every `fixed_dt` seconds
    pub fn new(fixed_dt: f32, max_ticks: u32) -> Self {
        Self {
            fixed_dt,
            max_ticks: max_ticks.max(1),
            accumulator: 0.0,
            resync_count: 0,
        }
    }

    /// Length of one simulation tick in seconds
    pub fn fixed_dt(&self) -> f32 {
        self.fixed_dt
    }

    /// Time carried over to the next frame
    pub fn accumulated(&self) -> f32 {
        self.accumulator
    }

    /// How many times the clock dropped a backlog
    pub fn resync_count(&self) -> u64 {
        self.resync_count
    }

    /// Feed a frame delta and return how many ticks to simulate now
    pub fn advance(&mut self, frame_delta: f32) -> u32 {
        if frame_delta.is_finite() && frame_delta > 0.0 {
            self.accumulator += frame_delta;
        }

        let pending = (self.accumulator / self.fixed_dt).floor();
        if pending > self.max_ticks as f32 {
            log::warn!(
                "Simulation fell {pending} ticks behind (limit {}), resynchronising clock",
                self.max_ticks
            );
            self.accumulator = 0.0;
            self.resync_count += 1;
            return 1;
        }

        let ticks = pending as u32;
        self.accumulator -= ticks as f32 * self.fixed_dt;
        ticks
    }

    /// Drop any accumulated time
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}
