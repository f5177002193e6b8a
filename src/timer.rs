//! Cooperative timers
//!
//! Advanced from the frame's delta time on the loop thread, never on a
//! thread of their own.

/// Accumulates elapsed time until stopped
#[derive(Debug, Clone, Default)]
pub struct Stopwatch {
    elapsed: f64,
    stopped: bool,
}

impl Stopwatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, dt: f64) {
        if !self.stopped {
            self.elapsed += dt;
        }
    }

    pub fn stop(&mut self) {
        self.stopped = true;
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.stopped = false;
    }

    /// Seconds accumulated so far
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }
}

/// Fires once after a duration
#[derive(Debug, Clone)]
pub struct Countdown {
    duration: f64,
    remaining: f64,
    fired: bool,
}

impl Countdown {
    pub fn new(duration: f64) -> Self {
        Self {
            duration,
            remaining: duration,
            fired: false,
        }
    }

    /// Advance by `dt`. Returns true on the tick the countdown expires.
    pub fn tick(&mut self, dt: f64) -> bool {
        if self.fired {
            return false;
        }
        self.remaining -= dt;
        if self.remaining <= 0.0 {
            self.remaining = 0.0;
            self.fired = true;
            return true;
        }
        false
    }

    pub fn restart(&mut self) {
        self.remaining = self.duration;
        self.fired = false;
    }

    pub fn remaining(&self) -> f64 {
        self.remaining
    }

    pub fn is_finished(&self) -> bool {
        self.fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stopwatch_stops_accumulating() {
        let mut sw = Stopwatch::new();
        sw.advance(0.5);
        sw.advance(0.25);
        sw.stop();
        sw.advance(10.0);
        assert_eq!(sw.elapsed(), 0.75);
        assert!(sw.is_stopped());

        sw.reset();
        assert_eq!(sw.elapsed(), 0.0);
    }

    #[test]
    fn test_countdown_fires_once() {
        let mut cd = Countdown::new(1.0);
        assert!(!cd.tick(0.6));
        assert!(cd.tick(0.6));
        assert!(!cd.tick(0.6));
        assert!(cd.is_finished());

        cd.restart();
        assert_eq!(cd.remaining(), 1.0);
        assert!(cd.tick(1.0));
    }
}
