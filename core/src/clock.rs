use web_time::Instant;

/// Limits a frame delta to `[0, max_ms]`. NaN becomes zero.
pub fn clamp_delta(delta_ms: f64, max_ms: f64) -> f64 {
    if delta_ms > 0.0 {
        delta_ms.min(max_ms.max(0.0))
    } else {
        0.0
    }
}

/// Turns wall-clock frame timestamps into clamped deltas for [`crate::SinglePlayer::advance`].
#[derive(Copy, Clone, Debug)]
pub struct FrameClock {
    last: Option<Instant>,
    max_delta_ms: f64,
}

impl FrameClock {
    pub const fn new(max_delta_ms: f64) -> Self {
        Self {
            last: None,
            max_delta_ms,
        }
    }

    pub fn tick(&mut self) -> f64 {
        self.tick_at(Instant::now())
    }

    /// Delta since the previous tick, zero on the first one.
    pub fn tick_at(&mut self, now: Instant) -> f64 {
        let delta = match self.last {
            Some(last) => now.saturating_duration_since(last).as_secs_f64() * 1000.0,
            None => 0.0,
        };
        self.last = Some(now);
        clamp_delta(delta, self.max_delta_ms)
    }

    /// Forgets the previous timestamp, e.g. after the loop was paused.
    pub fn reset(&mut self) {
        self.last = None;
    }
}
