//! Frame timing
//!
//! `TimeState` turns a monotonic counter into a number of fixed ticks owed
//! this frame. Debt is kept in counter units so it never drifts, and the
//! leftover fraction feeds visual interpolation.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Source of a monotonic high-resolution counter
pub trait Clock: Send {
    /// Current counter value
    fn now(&self) -> u64;
    /// Counter units per second
    fn frequency(&self) -> u64;
}

/// Wall clock backed by `Instant`, counting nanoseconds since creation
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> u64 {
        self.origin.elapsed().as_nanos() as u64
    }

    fn frequency(&self) -> u64 {
        1_000_000_000
    }
}

/// Externally driven clock for headless runs and tests.
///
/// Clones share the same counter, so a test can keep one handle and hand the
/// other to the engine.
#[derive(Debug, Clone)]
pub struct ManualClock {
    counter: Arc<AtomicU64>,
    frequency: u64,
}

impl ManualClock {
    pub fn new(frequency: u64) -> Self {
        Self {
            counter: Arc::new(AtomicU64::new(0)),
            frequency,
        }
    }

    pub fn advance(&self, ticks: u64) {
        self.counter.fetch_add(ticks, Ordering::SeqCst);
    }

    /// Advance by a duration in seconds
    pub fn advance_secs(&self, seconds: f64) {
        self.advance((seconds * self.frequency as f64).round() as u64);
    }

    pub fn set(&self, value: u64) {
        self.counter.store(value, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.counter.load(Ordering::SeqCst)
    }

    fn frequency(&self) -> u64 {
        self.frequency
    }
}

/// Fixed-step accumulator
#[derive(Debug, Clone)]
pub struct TimeState {
    frequency: u64,
    start_counter: u64,
    last_counter: u64,
    /// Counter units not yet consumed by fixed ticks
    accumulator: u64,
    /// One fixed step in counter units
    step_counts: u64,

    time: f64,
    delta_time: f64,
    fixed_time: f64,
    fixed_step: f64,
    fixed_step_progress: f32,
    fixed_update_this_frame: bool,
}

impl TimeState {
    pub fn new(start_counter: u64, frequency: u64, fixed_step: f64) -> Self {
        debug_assert!(frequency > 0, "clock frequency must be positive");
        debug_assert!(fixed_step > 0.0, "fixed step must be positive");

        let step_counts = ((fixed_step * frequency as f64) as u64).max(1);

        Self {
            frequency,
            start_counter,
            last_counter: start_counter,
            accumulator: 0,
            step_counts,
            time: 0.0,
            delta_time: 0.0,
            fixed_time: 0.0,
            fixed_step,
            fixed_step_progress: 0.0,
            fixed_update_this_frame: false,
        }
    }

    /// Advance to `counter` and return how many fixed ticks are owed.
    ///
    /// There is no cap: a long stall is paid back in one frame.
    pub fn update(&mut self, counter: u64) -> u32 {
        let elapsed = counter.saturating_sub(self.last_counter);
        self.last_counter = counter;

        let frequency = self.frequency as f64;
        self.delta_time = elapsed as f64 / frequency;
        self.time = counter.saturating_sub(self.start_counter) as f64 / frequency;

        self.accumulator += elapsed;
        let ticks = self.accumulator / self.step_counts;
        self.accumulator -= ticks * self.step_counts;

        self.fixed_time += ticks as f64 * self.fixed_step;
        self.fixed_step_progress =
            (self.accumulator as f64 / self.step_counts as f64).clamp(0.0, 1.0) as f32;
        self.fixed_update_this_frame = ticks > 0;

        ticks as u32
    }

    /// Seconds since the start counter
    #[inline]
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Seconds since the previous update
    #[inline]
    pub fn delta_time(&self) -> f64 {
        self.delta_time
    }

    /// Simulated seconds, a multiple of the fixed step
    #[inline]
    pub fn fixed_time(&self) -> f64 {
        self.fixed_time
    }

    #[inline]
    pub fn fixed_step(&self) -> f64 {
        self.fixed_step
    }

    /// Fraction of a fixed step accumulated but not yet simulated, in [0, 1]
    #[inline]
    pub fn fixed_step_progress(&self) -> f32 {
        self.fixed_step_progress
    }

    #[inline]
    pub fn fixed_update_this_frame(&self) -> bool {
        self.fixed_update_this_frame
    }

    #[inline]
    pub fn frequency(&self) -> u64 {
        self.frequency
    }
}
