//! Seek bar state and gesture math.

/// Clock and gesture flags of one mounted player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerSeekState {
    pub position_millis: u64,
    pub duration_millis: u64,
    /// While set, status callbacks must not overwrite `position_millis`.
    pub is_scrubbing: bool,
    /// Set by long-press only; tap pauses leave it clear.
    pub is_held_paused: bool,
}

impl PlayerSeekState {
    /// Apply a clock update from the underlying player. Ignored while scrubbing.
    pub fn apply_clock(&mut self, position_millis: u64, duration_millis: u64) -> bool {
        if self.is_scrubbing {
            return false;
        }
        self.position_millis = position_millis;
        self.duration_millis = duration_millis;
        true
    }

    pub fn progress(&self) -> f64 {
        if self.duration_millis == 0 {
            return 0.0;
        }
        (self.position_millis as f64 / self.duration_millis as f64).clamp(0.0, 1.0)
    }
}

/// Fraction of the bar under the finger, clamped to `[0, 1]`.
pub fn scrub_fraction(x: f64, bar_width: f64) -> f64 {
    if !(bar_width > 0.0) || !x.is_finite() {
        return 0.0;
    }
    (x / bar_width).clamp(0.0, 1.0)
}

pub fn fraction_to_millis(fraction: f64, duration_millis: u64) -> u64 {
    let fraction = if fraction.is_nan() { 0.0 } else { fraction.clamp(0.0, 1.0) };
    (fraction * duration_millis as f64).round() as u64
}
