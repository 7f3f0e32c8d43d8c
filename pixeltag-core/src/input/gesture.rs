//! Button gesture detection
//!
//! The raw pin is sampled once per tick. The first raw transition is
//! accepted at once and opens a lockout of one debounce interval during
//! which contact bounce is ignored. When the lockout ends, a settled level
//! that differs from the accepted one is taken as the next edge, stamped
//! with the time of its last raw change. Accepted edges drive a small
//! state machine:
//!
//! ```text
//! Idle --press--> FirstPressPending --release--> ReleasedWaiting
//! ReleasedWaiting --press inside window--> Idle (DoubleClick)
//! ReleasedWaiting --window elapsed-------> Idle (SingleClick)
//! ```
//!
//! After any emitted gesture, further gestures are suppressed for the
//! cooldown period.

use crate::config::BadgeConfig;

/// Result of one detector update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonGesture {
    None,
    SingleClick,
    DoubleClick,
}

/// Detector states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum State {
    Idle,
    FirstPressPending,
    ReleasedWaiting { released_at: u64 },
}

/// Accepted level change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Edge {
    pressed: bool,
    at: u64,
}

/// Debounced button gesture detector
#[derive(Debug, Clone)]
pub struct GestureDetector {
    debounce_ms: u64,
    window_ms: u64,
    cooldown_ms: u64,
    state: State,
    /// Debounced level
    stable: bool,
    /// Last raw sample and when it last changed
    raw: bool,
    raw_since: u64,
    /// Raw changes before this instant are bounce
    locked_until: u64,
    last_emit: Option<u64>,
}

impl GestureDetector {
    pub fn new(config: &BadgeConfig) -> Self {
        Self {
            debounce_ms: config.debounce_ms as u64,
            window_ms: config.double_click_ms as u64,
            cooldown_ms: config.cooldown_ms as u64,
            state: State::Idle,
            stable: false,
            raw: false,
            raw_since: 0,
            locked_until: 0,
            last_emit: None,
        }
    }

    /// Restart from a known level without emitting anything
    ///
    /// Used after wake so the press that woke the badge is not counted.
    pub fn reset(&mut self, now: u64, pressed: bool) {
        self.state = State::Idle;
        self.stable = pressed;
        self.raw = pressed;
        self.raw_since = now;
        self.locked_until = now;
    }

    /// True while a gesture is in progress or a level change is settling
    pub fn is_busy(&self) -> bool {
        self.state != State::Idle || self.raw != self.stable
    }

    fn debounce(&mut self, now: u64, pressed: bool) -> Option<Edge> {
        if pressed != self.raw {
            self.raw = pressed;
            self.raw_since = now;
        }
        if now < self.locked_until || self.raw == self.stable {
            return None;
        }
        self.stable = self.raw;
        self.locked_until = now + self.debounce_ms;
        Some(Edge {
            pressed: self.stable,
            at: self.raw_since,
        })
    }

    /// A press is held back by the lockout and may still land inside the window
    fn press_settling(&self) -> bool {
        self.raw && !self.stable
    }

    fn emit(&mut self, now: u64, gesture: ButtonGesture) -> ButtonGesture {
        if let Some(last) = self.last_emit {
            if now.saturating_sub(last) < self.cooldown_ms {
                debug!("Gesture {} suppressed by cooldown", gesture);
                return ButtonGesture::None;
            }
        }
        self.last_emit = Some(now);
        info!("Gesture {}", gesture);
        gesture
    }

    /// Feed one raw sample
    pub fn update(&mut self, now: u64, pressed: bool) -> ButtonGesture {
        let edge = self.debounce(now, pressed);

        match (self.state, edge) {
            (State::Idle, Some(Edge { pressed: true, .. })) => {
                self.state = State::FirstPressPending;
                ButtonGesture::None
            }
            (State::FirstPressPending, Some(Edge { pressed: false, at })) => {
                self.state = State::ReleasedWaiting { released_at: at };
                ButtonGesture::None
            }
            (State::ReleasedWaiting { released_at }, Some(Edge { pressed: true, at }))
                if at.saturating_sub(released_at) < self.window_ms =>
            {
                self.state = State::Idle;
                self.emit(now, ButtonGesture::DoubleClick)
            }
            (State::ReleasedWaiting { .. }, Some(Edge { pressed: true, .. })) => {
                // Press landed after the window; this one starts a new gesture
                self.state = State::FirstPressPending;
                self.emit(now, ButtonGesture::SingleClick)
            }
            (State::ReleasedWaiting { released_at }, None)
                if now.saturating_sub(released_at) >= self.window_ms && !self.press_settling() =>
            {
                self.state = State::Idle;
                self.emit(now, ButtonGesture::SingleClick)
            }
            _ => ButtonGesture::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> GestureDetector {
        GestureDetector::new(&BadgeConfig::default())
    }

    /// Hold `pressed` from `from` to `to` (exclusive), sampling every 10 ms
    fn hold(
        d: &mut GestureDetector,
        from: u64,
        to: u64,
        pressed: bool,
        out: &mut heapless::Vec<(u64, ButtonGesture), 8>,
    ) {
        let mut t = from;
        while t < to {
            let g = d.update(t, pressed);
            if g != ButtonGesture::None {
                out.push((t, g)).unwrap();
            }
            t += 10;
        }
    }

    #[test]
    fn test_single_click_one_window_after_release() {
        let mut d = detector();
        let mut out = heapless::Vec::new();
        hold(&mut d, 0, 100, false, &mut out);
        hold(&mut d, 100, 200, true, &mut out);
        hold(&mut d, 200, 1000, false, &mut out);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0], (550, ButtonGesture::SingleClick));
    }

    #[test]
    fn test_double_click_no_single() {
        let mut d = detector();
        let mut out = heapless::Vec::new();
        hold(&mut d, 0, 100, false, &mut out);
        hold(&mut d, 100, 200, true, &mut out);
        hold(&mut d, 200, 300, false, &mut out);
        hold(&mut d, 300, 400, true, &mut out);
        hold(&mut d, 400, 1500, false, &mut out);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].1, ButtonGesture::DoubleClick);
    }

    #[test]
    fn test_short_press_single_click() {
        let mut d = detector();
        let mut out = heapless::Vec::new();
        // Press at 0, release at 40 ms
        hold(&mut d, 0, 40, true, &mut out);
        hold(&mut d, 40, 1500, false, &mut out);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0], (390, ButtonGesture::SingleClick));
    }

    #[test]
    fn test_presses_at_0_and_200_double_click() {
        let mut d = detector();
        let mut out = heapless::Vec::new();
        hold(&mut d, 0, 40, true, &mut out);
        hold(&mut d, 40, 200, false, &mut out);
        hold(&mut d, 200, 240, true, &mut out);
        hold(&mut d, 240, 1500, false, &mut out);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0], (200, ButtonGesture::DoubleClick));
    }

    #[test]
    fn test_second_press_at_window_edge() {
        let mut d = detector();
        let mut out = heapless::Vec::new();
        hold(&mut d, 0, 100, true, &mut out);
        hold(&mut d, 100, 440, false, &mut out);
        // Raw press 340 ms after the release
        hold(&mut d, 440, 600, true, &mut out);
        hold(&mut d, 600, 1500, false, &mut out);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].1, ButtonGesture::DoubleClick);
    }

    #[test]
    fn test_bounce_filtered() {
        let mut d = detector();
        let mut out = heapless::Vec::new();
        // Contact chatter right after each edge stays inside the lockout
        for (t, level) in [(0, true), (10, false), (20, true), (30, false), (40, true)] {
            assert_eq!(d.update(t, level), ButtonGesture::None);
        }
        hold(&mut d, 50, 150, true, &mut out);
        for (t, level) in [(150, false), (160, true), (170, false), (180, true), (190, false)] {
            assert_eq!(d.update(t, level), ButtonGesture::None);
        }
        hold(&mut d, 200, 2000, false, &mut out);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0], (500, ButtonGesture::SingleClick));
    }

    #[test]
    fn test_release_inside_lockout_stamped_at_raw_edge() {
        let mut d = detector();
        assert_eq!(d.update(0, true), ButtonGesture::None);
        assert!(d.is_busy());
        // Released at 20 ms, still locked out
        assert_eq!(d.update(20, false), ButtonGesture::None);
        assert!(d.is_busy());
        assert_eq!(d.update(50, false), ButtonGesture::None);
        assert_eq!(d.update(369, false), ButtonGesture::None);
        assert_eq!(d.update(370, false), ButtonGesture::SingleClick);
    }

    #[test]
    fn test_cooldown_suppresses_second_gesture() {
        let mut d = detector();
        let mut out = heapless::Vec::new();
        hold(&mut d, 0, 100, true, &mut out);
        hold(&mut d, 100, 1000, false, &mut out);
        hold(&mut d, 1000, 1100, true, &mut out);
        hold(&mut d, 1100, 2000, false, &mut out);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].1, ButtonGesture::SingleClick);

        // After the cooldown a new gesture is accepted
        hold(&mut d, 6000, 6100, true, &mut out);
        hold(&mut d, 6100, 7000, false, &mut out);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_reset_ignores_wake_press() {
        let mut d = detector();
        let mut out = heapless::Vec::new();
        d.reset(0, true);
        hold(&mut d, 0, 200, true, &mut out);
        hold(&mut d, 200, 1500, false, &mut out);
        assert!(out.is_empty());
        assert!(!d.is_busy());
    }

    #[test]
    fn test_busy_during_gesture() {
        let mut d = detector();
        let mut out = heapless::Vec::new();
        hold(&mut d, 0, 100, true, &mut out);
        assert!(d.is_busy());
        hold(&mut d, 100, 1000, false, &mut out);
        assert!(!d.is_busy());
    }
}
