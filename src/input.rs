//! Input snapshot
//!
//! The engine does not poll devices. The application's `process_input` hook
//! writes key transitions into `InputState`, and components read them back.

/// Number of tracked scancodes
pub const NUM_SCANCODES: usize = 512;

/// Current up/down state of every scancode
#[derive(Debug, Clone)]
pub struct InputState {
    key_down: [bool; NUM_SCANCODES],
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            key_down: [false; NUM_SCANCODES],
        }
    }
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get_key(&self, scancode: usize) -> bool {
        debug_assert!(scancode < NUM_SCANCODES, "invalid scancode {scancode}");
        self.key_down.get(scancode).copied().unwrap_or(false)
    }

    pub fn set_key_down(&mut self, scancode: usize) {
        self.set_key(scancode, true);
    }

    pub fn set_key_up(&mut self, scancode: usize) {
        self.set_key(scancode, false);
    }

    fn set_key(&mut self, scancode: usize, down: bool) {
        debug_assert!(scancode < NUM_SCANCODES, "invalid scancode {scancode}");
        if let Some(key) = self.key_down.get_mut(scancode) {
            *key = down;
        }
    }

    /// Release every key
    pub fn clear(&mut self) {
        self.key_down = [false; NUM_SCANCODES];
    }
}

/// Timed record of a single action (press, hold, release).
///
/// Times are engine seconds (`TimeState::time`), passed in explicitly.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ActionData {
    value: bool,
    start_time: Option<f64>,
    end_time: Option<f64>,
}

impl ActionData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin the action. Ignored while it is already held.
    pub fn start(&mut self, value: bool, now: f64) {
        if !(self.is_new() || self.is_expired(now)) {
            return;
        }
        self.start_time = Some(now);
        self.end_time = None;
        self.value = value;
    }

    /// End the action. Ignored if it never started or already expired.
    pub fn stop(&mut self, value: bool, now: f64) {
        if self.is_new() || self.is_expired(now) {
            return;
        }
        self.end_time = Some(now);
        self.value = value;
    }

    pub fn start_time(&self) -> Option<f64> {
        self.start_time
    }

    pub fn end_time(&self) -> Option<f64> {
        self.end_time
    }

    /// Seconds since the action started, zero if it never did
    pub fn duration(&self, now: f64) -> f64 {
        self.start_time.map_or(0.0, |start| now - start)
    }

    pub fn is_held(&self) -> bool {
        self.start_time.is_some() && self.end_time.is_none()
    }

    pub fn in_phase(&self, now: f64) -> bool {
        self.is_started(now) || self.is_performed(now) || self.is_stopped(now)
    }

    /// Started at exactly `now`
    pub fn is_started(&self, now: f64) -> bool {
        self.start_time == Some(now)
    }

    /// Held, and started before `now`
    pub fn is_performed(&self, now: f64) -> bool {
        self.is_held() && !self.is_started(now)
    }

    /// Stopped at exactly `now`
    pub fn is_stopped(&self, now: f64) -> bool {
        self.end_time == Some(now)
    }

    /// Never started
    pub fn is_new(&self) -> bool {
        self.start_time.is_none() && self.end_time.is_none()
    }

    /// Stopped before `now`
    pub fn is_expired(&self, now: f64) -> bool {
        self.end_time.is_some_and(|end| now > end)
    }

    pub fn value(&self) -> bool {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_transitions() {
        let mut input = InputState::new();
        assert!(!input.get_key(44));
        input.set_key_down(44);
        assert!(input.get_key(44));
        input.set_key_up(44);
        assert!(!input.get_key(44));
    }

    #[test]
    fn test_action_phases() {
        let mut action = ActionData::new();
        assert!(action.is_new());

        action.start(true, 1.0);
        assert!(action.is_held());
        assert!(action.is_started(1.0));
        assert!(!action.is_performed(1.0));
        assert!(action.is_performed(1.5));
        assert_eq!(action.duration(1.5), 0.5);

        // Restarting while held is ignored
        action.start(true, 1.2);
        assert_eq!(action.start_time(), Some(1.0));

        action.stop(false, 2.0);
        assert!(action.is_stopped(2.0));
        assert!(!action.is_held());
        assert!(!action.is_expired(2.0));
        assert!(action.is_expired(2.1));
        assert!(!action.in_phase(2.1));

        action.start(true, 3.0);
        assert!(action.is_held());
        assert_eq!(action.start_time(), Some(3.0));
    }

    #[test]
    fn test_stop_before_start_is_ignored() {
        let mut action = ActionData::new();
        action.stop(true, 1.0);
        assert!(action.is_new());
        assert!(!action.value());
    }
}
