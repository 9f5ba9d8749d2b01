use core::fmt;
use serde::{Deserialize, Serialize};

use super::*;

/// Shape of the time factor handed to a [`Tween`] update.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Easing {
    Linear,
    InCubic,
    OutCubic,
    InOutCubic,
}

impl Easing {
    /// Maps a linear factor in `[0, 1]` to the eased factor, keeping both ends fixed.
    pub fn apply(self, t: f64) -> f64 {
        use Easing::*;

        let t = t.clamp(0.0, 1.0);
        match self {
            Linear => t,
            InCubic => t * t * t,
            OutCubic => 1.0 - (1.0 - t).powi(3),
            InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
        }
    }
}

impl Default for Easing {
    fn default() -> Self {
        Self::Linear
    }
}

/// Runs for a fixed duration, handing `update` the eased time factor each frame.
///
/// The factor is `clamp(elapsed / duration, 0, 1)` passed through the easing.
/// The frame that reaches the duration calls `update` with exactly `1.0` and
/// completes; nothing is called after that.
pub struct Tween<F> {
    duration: f64,
    elapsed: f64,
    easing: Easing,
    update: F,
    done: bool,
}

impl<F> Tween<F> {
    pub fn new<C: ?Sized>(duration_ms: f64, easing: Easing, update: F) -> Self
    where
        F: FnMut(&mut C, f64),
    {
        Self {
            duration: duration_ms,
            elapsed: 0.0,
            easing,
            update,
            done: false,
        }
    }

    pub const fn is_done(&self) -> bool {
        self.done
    }
}

impl<F> fmt::Debug for Tween<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tween")
            .field("duration", &self.duration)
            .field("elapsed", &self.elapsed)
            .field("easing", &self.easing)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

impl<C: ?Sized, F: FnMut(&mut C, f64)> Timeline<C> for Tween<F> {
    fn advance(&mut self, cx: &mut C, delta_ms: f64) -> Progress {
        if self.done {
            return Progress::Done;
        }

        self.elapsed += sanitize_delta(delta_ms);
        let linear = if self.duration > 0.0 {
            (self.elapsed / self.duration).min(1.0)
        } else {
            1.0
        };
        let finished = linear >= 1.0;
        let factor = if finished {
            1.0
        } else {
            self.easing.apply(linear)
        };

        (self.update)(cx, factor);
        self.done = finished;
        Progress::from_done(finished)
    }
}
