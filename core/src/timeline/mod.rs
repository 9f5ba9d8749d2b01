//! Cooperative, frame-stepped timelines.
//!
//! A timeline is a resumable unit of work. The driver feeds it the elapsed time
//! of every frame and it reports [`Progress::Done`] once satisfied. Nothing ever
//! blocks: "waiting" is simply reporting [`Progress::Running`] until enough time
//! has been fed in. Timelines mutate a context `C` they are handed on each
//! advance, so the state they animate stays owned by whoever drives them.

use crate::*;

pub use combinators::*;
pub use tween::*;

mod combinators;
mod tween;

pub trait Timeline<C: ?Sized> {
    /// Advances by `delta_ms` milliseconds.
    ///
    /// Advancing a timeline that already reported [`Progress::Done`] is a no-op
    /// that keeps reporting done.
    fn advance(&mut self, cx: &mut C, delta_ms: f64) -> Progress;
}

pub type BoxedTimeline<C> = Box<dyn Timeline<C>>;

impl<C: ?Sized, T: Timeline<C> + ?Sized> Timeline<C> for Box<T> {
    fn advance(&mut self, cx: &mut C, delta_ms: f64) -> Progress {
        (**self).advance(cx, delta_ms)
    }
}

/// Negative and NaN deltas advance nothing.
pub(crate) fn sanitize_delta(delta_ms: f64) -> f64 {
    if delta_ms > 0.0 { delta_ms } else { 0.0 }
}

/// Completes once the accumulated time reaches its duration.
///
/// A zero, negative or NaN duration completes on the first advance.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Wait {
    duration: f64,
    elapsed: f64,
    done: bool,
}

impl Wait {
    pub const fn new(duration_ms: f64) -> Self {
        Self {
            duration: duration_ms,
            elapsed: 0.0,
            done: false,
        }
    }

    pub fn tick(&mut self, delta_ms: f64) -> Progress {
        if self.done {
            return Progress::Done;
        }

        self.elapsed += sanitize_delta(delta_ms);
        self.done = !(self.duration > 0.0) || self.elapsed >= self.duration;
        Progress::from_done(self.done)
    }

    pub const fn is_done(&self) -> bool {
        self.done
    }

    pub const fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Time fed in past the duration, zero while still running.
    pub fn overshoot(&self) -> f64 {
        if self.done {
            (self.elapsed - self.duration.max(0.0)).max(0.0)
        } else {
            0.0
        }
    }
}

impl<C: ?Sized> Timeline<C> for Wait {
    fn advance(&mut self, _cx: &mut C, delta_ms: f64) -> Progress {
        self.tick(delta_ms)
    }
}
