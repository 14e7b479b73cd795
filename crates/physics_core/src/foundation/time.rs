//! Time management utilities
//!
//! The physics code only ever asks a timer for the length of the current
//! frame, through the [`DeltaTime`] trait.

use std::time::Instant;

/// Source of the per-frame delta time consumed by the simulation
pub trait DeltaTime {
    /// Time elapsed since the previous frame, in seconds
    fn delta_time(&self) -> f32;
}

/// High-precision wall-clock timer for frame timing
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
        Self {
            last_frame: Instant::now(),
            delta_time: 0.0,
            total_time: 0.0,
            frame_count: 0,
        }
    }

    /// Update the timer (should be called once per frame)
    pub fn update(&mut self) {
        let now = Instant::now();
        self.delta_time = now.duration_since(self.last_frame).as_secs_f32();
        self.total_time += self.delta_time;
        self.last_frame = now;
        self.frame_count += 1;
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

impl DeltaTime for Timer {
    fn delta_time(&self) -> f32 {
        self.delta_time
    }
}

/// Deterministic timer advancing by a constant step
///
/// Used for replays and tests where wall-clock jitter must not leak into
/// the integration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedTimestep {
    step: f32,
    elapsed: f32,
    ticks: u64,
}

impl FixedTimestep {
    /// Create a fixed timestep of `step` seconds
    pub fn new(step: f32) -> Self {
        Self {
            step: step.max(0.0),
            elapsed: 0.0,
            ticks: 0,
        }
    }

    /// Advance by one step
    pub fn tick(&mut self) {
        self.elapsed += self.step;
        self.ticks += 1;
    }

    /// Total simulated time
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Number of ticks advanced so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

impl DeltaTime for FixedTimestep {
    fn delta_time(&self) -> f32 {
        self.step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_timestep_accumulates() {
        let mut clock = FixedTimestep::new(0.5);
        clock.tick();
        clock.tick();
        assert_eq!(clock.delta_time(), 0.5);
        assert_eq!(clock.elapsed(), 1.0);
        assert_eq!(clock.ticks(), 2);
    }

    #[test]
    fn test_negative_step_is_clamped() {
        assert_eq!(FixedTimestep::new(-1.0).delta_time(), 0.0);
    }

    #[test]
    fn test_timer_starts_at_zero_delta() {
        let mut timer = Timer::new();
        assert_eq!(timer.delta_time(), 0.0);
        timer.update();
        assert!(timer.delta_time() >= 0.0);
        assert_eq!(timer.frame_count(), 1);
    }
}
